// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Log feed: the service's full log list, refreshed wholesale.
//!
//! There is no paging and no delta. A successful refresh replaces the whole
//! list; a failed refresh keeps whatever was shown before.

use crate::model::LogEntry;
use crate::transport::ApiError;

/// Displayed state of the log feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LogFeed {
    /// No refresh has completed yet.
    #[default]
    Loading,
    /// Entries in server order. Empty means the service has no logs.
    Loaded(Vec<LogEntry>),
}

impl LogFeed {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// True only for a completed refresh that returned no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Loaded(entries) if entries.is_empty())
    }

    /// Current entries; empty while loading.
    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        match self {
            Self::Loading => &[],
            Self::Loaded(entries) => entries,
        }
    }

    /// Apply one refresh outcome. Returns whether the displayed state changed.
    ///
    /// A failure never discards entries. It only clears the loading state,
    /// which leaves an empty list when nothing was loaded before.
    pub fn apply(&mut self, outcome: Result<Vec<LogEntry>, &ApiError>) -> bool {
        match outcome {
            Ok(entries) => {
                let next = Self::Loaded(entries);
                if *self == next {
                    return false;
                }
                *self = next;
                true
            }
            Err(_) if self.is_loading() => {
                *self = Self::Loaded(Vec::new());
                true
            }
            Err(_) => false,
        }
    }
}

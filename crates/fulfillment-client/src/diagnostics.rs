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

//! Bounded record of probe events for operator display.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

/// Messages kept before the oldest is dropped.
pub const DEFAULT_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Info,
    Warning,
    Error,
}

/// Diagnostic message with timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub timestamp: DateTime<Utc>,
    pub level: DiagnosticLevel,
    pub message: String,
}

/// Ring of the most recent diagnostic messages, oldest first.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    messages: VecDeque<DiagnosticMessage>,
    capacity: usize,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl Diagnostics {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Add a diagnostic message
    pub fn add(&mut self, level: DiagnosticLevel, message: impl Into<String>) {
        self.messages.push_back(DiagnosticMessage {
            timestamp: Utc::now(),
            level,
            message: message.into(),
        });

        // Keep only the last N messages
        while self.messages.len() > self.capacity {
            self.messages.pop_front();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiagnosticMessage> {
        self.messages.iter()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&DiagnosticMessage> {
        self.messages.back()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_most_recent_messages() {
        let mut diagnostics = Diagnostics::with_capacity(3);
        for i in 0..5 {
            diagnostics.add(DiagnosticLevel::Info, format!("event {i}"));
        }

        let messages: Vec<&str> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["event 2", "event 3", "event 4"]);
        assert_eq!(diagnostics.latest().unwrap().message, "event 4");
    }

    #[test]
    fn test_default_capacity() {
        let mut diagnostics = Diagnostics::default();
        for _ in 0..(DEFAULT_CAPACITY + 10) {
            diagnostics.add(DiagnosticLevel::Warning, "ping failed");
        }
        assert_eq!(diagnostics.len(), DEFAULT_CAPACITY);
    }
}

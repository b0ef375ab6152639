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

//! Periodic probes against the fulfillment service.
//!
//! Each probe runs on its own interval and never waits for the previous
//! tick's request: every tick spawns its request and moves on. Completions
//! may therefore arrive out of order, so each request carries a sequence
//! number and only a completion newer than the last applied one is allowed
//! to touch state (see [`Sequencer`]).

pub mod latency;
pub mod status;

pub use status::RetryPolicy;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Shortest period a ticker accepts; `tokio::time::interval` rejects zero.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Orders the completions of one probe's overlapping requests.
///
/// A completion is applied only while the owning monitor is alive and only if
/// its sequence number is higher than every completion applied before it.
/// A slow request from tick N that resolves after tick N+1 is dropped.
#[derive(Debug)]
pub(crate) struct Sequencer {
    issued: AtomicU64,
    applied: Mutex<u64>,
    liveness: CancellationToken,
}

impl Sequencer {
    pub(crate) fn new(liveness: CancellationToken) -> Self {
        Self {
            issued: AtomicU64::new(0),
            applied: Mutex::new(0),
            liveness,
        }
    }

    /// Tag a new request.
    pub(crate) fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Run `apply` for completion `seq` if it is still current.
    ///
    /// Returns whether the completion was applied. The check and the update
    /// happen under one lock so two completions cannot interleave.
    pub(crate) fn commit(&self, seq: u64, apply: impl FnOnce()) -> bool {
        let mut applied = self.applied.lock().unwrap_or_else(PoisonError::into_inner);
        if self.liveness.is_cancelled() || seq <= *applied {
            return false;
        }
        *applied = seq;
        apply();
        true
    }
}

/// Call `tick` immediately and then once per `period` until `cancel` fires.
///
/// `tick` must not block; probes use it to spawn their request.
pub(crate) async fn every(period: Duration, cancel: &CancellationToken, mut tick: impl FnMut()) {
    let mut interval = tokio::time::interval(period.max(MIN_PERIOD));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => return,

            _ = interval.tick() => tick(),
        }
    }
}

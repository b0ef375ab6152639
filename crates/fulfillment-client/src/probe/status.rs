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

//! Status probe: `GET /system/status` with a small bounded retry.

use std::time::Duration;

use log::debug;

use crate::model::StatusSnapshot;
use crate::transport::{ApiClient, ApiError, Transport};

/// Attempts per status tick before the tick counts as failed.
pub const DEFAULT_STATUS_ATTEMPTS: u32 = 2;

/// How a status tick retries before giving up.
///
/// Retries are immediate by default. A 30s probe interval already spaces out
/// ticks, so `delay` stays zero unless configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per tick, including the first. Zero is treated as one.
    pub attempts: u32,
    /// Pause between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_STATUS_ATTEMPTS,
            delay: Duration::ZERO,
        }
    }
}

/// Run one status tick: up to `retry.attempts` requests, first success wins.
///
/// On failure the error of the last attempt is returned; substituting the
/// unavailable snapshot is left to the caller.
pub async fn check<T: Transport>(
    client: &ApiClient<T>,
    retry: RetryPolicy,
) -> Result<StatusSnapshot, ApiError> {
    let attempts = retry.attempts.max(1);
    let mut attempt = 1;

    loop {
        match client.system_status().await {
            Ok(snapshot) => return Ok(snapshot),
            Err(e) if attempt < attempts => {
                debug!("Status attempt {}/{} failed: {}", attempt, attempts, e);
                if !retry.delay.is_zero() {
                    tokio::time::sleep(retry.delay).await;
                }
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

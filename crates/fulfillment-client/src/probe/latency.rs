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

//! Latency probe: times a `GET /ping` round trip on the client side.
//!
//! The service reports no latency of its own; the measurement is wall-clock
//! time from just before the request is issued to its completion.

use tokio::time::Instant;

use crate::transport::{ApiClient, ApiError, Transport};

/// Measure one round trip in whole milliseconds.
pub async fn measure<T: Transport>(client: &ApiClient<T>) -> Result<u64, ApiError> {
    let start = Instant::now();
    client.ping().await?;
    Ok(u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX))
}

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

//! Client-side monitor for the fulfillment service API.
//!
//! The crate watches a fulfillment service from the outside and keeps a
//! small, always-displayable picture of it:
//!
//! - **Transport layer**: HTTP exchanges normalized through the service's
//!   `{success, data, message}` envelope into data or a display message
//! - **Probe layer**: the status probe (with a bounded retry) and the latency
//!   probe, both safe to run with overlapping requests
//! - **Connectivity**: fuses both probes into one connected flag
//! - **Log feed**: the service's log list, replaced wholesale on each refresh
//!
//! # Quick Start
//!
//! ```no_run
//! use fulfillment_client::{ApiClient, HttpTransport, Monitor, MonitorConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = HttpTransport::builder()
//!         .base_url("http://localhost:5001/api")
//!         .build()?;
//!     let monitor = Monitor::spawn(ApiClient::new(transport), MonitorConfig::default());
//!
//!     let mut connectivity = monitor.subscribe_connectivity();
//!     while connectivity.changed().await.is_ok() {
//!         let state = *connectivity.borrow_and_update();
//!         println!("connected={} latency={}ms", state.connected, state.latency_ms);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # One-shot calls
//!
//! [`ApiClient`] can be used on its own for single requests:
//!
//! ```no_run
//! # async fn run() -> Result<(), fulfillment_client::ApiError> {
//! use fulfillment_client::ApiClient;
//! use fulfillment_client::transport::HttpTransport;
//!
//! let transport = HttpTransport::builder()
//!     .build()
//!     .map_err(|e| fulfillment_client::ApiError::new(e.to_string()))?;
//! let client = ApiClient::new(transport);
//! for entry in client.logs().await? {
//!     println!("{} {}", entry.timestamp, entry.message);
//! }
//! # Ok(())
//! # }
//! ```

pub mod connectivity;
pub mod diagnostics;
pub mod feed;
pub mod model;
pub mod probe;
pub mod transport;

mod monitor;
mod upload;

#[cfg(test)]
mod testing;

pub use connectivity::{ChannelHealth, ConnectivityState};
pub use diagnostics::{DiagnosticLevel, DiagnosticMessage, Diagnostics};
pub use feed::LogFeed;
pub use model::{
    LogEntry, LogStatus, ServiceState, ServiceStats, StatusSnapshot, UploadReceipt, UploadStats,
};
pub use monitor::{
    Monitor, MonitorConfig, DEFAULT_LOGS_INTERVAL, DEFAULT_PING_INTERVAL, DEFAULT_STATUS_INTERVAL,
};
pub use probe::RetryPolicy;
pub use transport::{ApiClient, ApiError, HttpTransport, Transport, TransportError};

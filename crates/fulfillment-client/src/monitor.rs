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

//! Scoped monitor instance.
//!
//! A [`Monitor`] owns all monitoring state: the latest status snapshot, the
//! fused connectivity state, the log feed, and the diagnostics ring. It is
//! created explicitly, publishes every change through `watch` channels, and
//! stops its periodic tasks on [`Monitor::shutdown`] or drop.
//!
//! Three tasks run independently: the status probe, the latency probe, and
//! the log feed. Each tick spawns its request and returns at once, so a slow
//! request never delays the next tick. Requests already in flight at
//! shutdown are not aborted; their completions are discarded.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::connectivity::{ChannelHealth, ConnectivityState};
use crate::diagnostics::{DiagnosticLevel, DiagnosticMessage, Diagnostics};
use crate::feed::LogFeed;
use crate::model::{LogEntry, StatusSnapshot};
use crate::probe::{self, latency, status, RetryPolicy, Sequencer};
use crate::transport::{ApiClient, ApiError, HttpTransport, Transport};

pub const DEFAULT_STATUS_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_LOGS_INTERVAL: Duration = Duration::from_secs(5);

/// Probe cadence and retry settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    pub status_interval: Duration,
    pub ping_interval: Duration,
    pub logs_interval: Duration,
    pub status_retry: RetryPolicy,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            status_interval: DEFAULT_STATUS_INTERVAL,
            ping_interval: DEFAULT_PING_INTERVAL,
            logs_interval: DEFAULT_LOGS_INTERVAL,
            status_retry: RetryPolicy::default(),
        }
    }
}

/// State shared between the monitor handle and its tasks.
///
/// Every update replaces a whole value; nothing is mutated in place behind a
/// reader's back.
struct Shared {
    status_tx: watch::Sender<StatusSnapshot>,
    connectivity_tx: watch::Sender<ConnectivityState>,
    logs_tx: watch::Sender<LogFeed>,
    diagnostics: Mutex<Diagnostics>,
}

impl Shared {
    fn new() -> Self {
        Self {
            status_tx: watch::Sender::new(StatusSnapshot::unavailable()),
            connectivity_tx: watch::Sender::new(ConnectivityState::default()),
            logs_tx: watch::Sender::new(LogFeed::Loading),
            diagnostics: Mutex::new(Diagnostics::default()),
        }
    }

    fn note(&self, level: DiagnosticLevel, message: String) {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .add(level, message);
    }

    /// Apply `update` to the connectivity state and return what it returns.
    fn update_connectivity(
        &self,
        update: impl FnOnce(&mut ConnectivityState) -> ChannelHealth,
    ) -> ChannelHealth {
        let mut previous = ChannelHealth::Unknown;
        let mut lost = false;

        self.connectivity_tx.send_modify(|state| {
            let was_connected = state.connected;
            previous = update(state);
            lost = was_connected && !state.connected;
        });

        if lost {
            warn!("Service unreachable: status and ping both failing");
            self.note(
                DiagnosticLevel::Error,
                "Service unreachable: status and ping both failing".to_string(),
            );
        }
        previous
    }

    fn apply_status(&self, outcome: Result<StatusSnapshot, ApiError>) {
        match outcome {
            Ok(snapshot) => {
                debug!(
                    "Status {}: {} orders, {} logs",
                    snapshot.status.as_str(),
                    snapshot.stats.total_orders,
                    snapshot.stats.total_logs
                );
                self.status_tx.send_replace(snapshot);
                if self.update_connectivity(|state| state.record_status(true))
                    != ChannelHealth::Healthy
                {
                    self.note(DiagnosticLevel::Info, "Status endpoint reachable".to_string());
                }
            }
            Err(e) => {
                warn!("Status check failed: {}", e);
                self.status_tx.send_replace(StatusSnapshot::unavailable());
                if self.update_connectivity(|state| state.record_status(false))
                    != ChannelHealth::Unhealthy
                {
                    self.note(DiagnosticLevel::Warning, format!("Status check failed: {e}"));
                }
            }
        }
    }

    fn apply_ping(&self, outcome: Result<u64, ApiError>) {
        match outcome {
            Ok(latency_ms) => {
                debug!("Ping round trip {} ms", latency_ms);
                if self.update_connectivity(|state| state.record_ping(latency_ms))
                    != ChannelHealth::Healthy
                {
                    self.note(
                        DiagnosticLevel::Info,
                        format!("Ping answered in {latency_ms} ms"),
                    );
                }
            }
            Err(e) => {
                warn!("Ping failed: {}", e);
                if self.update_connectivity(ConnectivityState::record_ping_failure)
                    != ChannelHealth::Unhealthy
                {
                    self.note(DiagnosticLevel::Warning, format!("Ping failed: {e}"));
                }
            }
        }
    }

    fn apply_logs(&self, outcome: Result<Vec<LogEntry>, ApiError>) {
        self.logs_tx.send_if_modified(|feed| match outcome {
            Ok(entries) => {
                debug!("Log feed refreshed: {} entries", entries.len());
                feed.apply(Ok(entries))
            }
            Err(e) => {
                warn!("Log refresh failed, keeping previous list: {}", e);
                feed.apply(Err(&e))
            }
        });
    }
}

/// Handle to a running monitor.
///
/// Must be created inside a tokio runtime. Dropping the handle shuts the
/// monitor down.
pub struct Monitor<T = HttpTransport> {
    client: Arc<ApiClient<T>>,
    shared: Arc<Shared>,
    cancel: CancellationToken,
}

impl<T> fmt::Debug for Monitor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Monitor")
            .field("running", &!self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl<T: Transport> Monitor<T> {
    /// Start the status probe, the latency probe and the log feed.
    ///
    /// All three fire once immediately and then on their own intervals.
    #[must_use]
    pub fn spawn(client: ApiClient<T>, config: MonitorConfig) -> Self {
        let client = Arc::new(client);
        let shared = Arc::new(Shared::new());
        let cancel = CancellationToken::new();

        info!(
            "Starting monitor: status every {}s, ping every {}s, logs every {}s",
            config.status_interval.as_secs_f32(),
            config.ping_interval.as_secs_f32(),
            config.logs_interval.as_secs_f32()
        );

        let status_client = Arc::clone(&client);
        let retry = config.status_retry;
        tokio::spawn(run_periodic(
            "status",
            config.status_interval,
            cancel.clone(),
            Arc::clone(&shared),
            move || {
                let client = Arc::clone(&status_client);
                async move { status::check(&client, retry).await }
            },
            Shared::apply_status,
        ));

        let ping_client = Arc::clone(&client);
        tokio::spawn(run_periodic(
            "ping",
            config.ping_interval,
            cancel.clone(),
            Arc::clone(&shared),
            move || {
                let client = Arc::clone(&ping_client);
                async move { latency::measure(&client).await }
            },
            Shared::apply_ping,
        ));

        let logs_client = Arc::clone(&client);
        tokio::spawn(run_periodic(
            "logs",
            config.logs_interval,
            cancel.clone(),
            Arc::clone(&shared),
            move || {
                let client = Arc::clone(&logs_client);
                async move { client.logs().await }
            },
            Shared::apply_logs,
        ));

        Self {
            client,
            shared,
            cancel,
        }
    }
}

impl<T> Monitor<T> {
    /// The client the monitor polls through, for one-shot calls like uploads.
    #[must_use]
    pub fn client(&self) -> &ApiClient<T> {
        &self.client
    }

    /// Latest status snapshot, or the unavailable snapshot.
    #[must_use]
    pub fn status(&self) -> StatusSnapshot {
        self.shared.status_tx.borrow().clone()
    }

    #[must_use]
    pub fn connectivity(&self) -> ConnectivityState {
        *self.shared.connectivity_tx.borrow()
    }

    #[must_use]
    pub fn logs(&self) -> LogFeed {
        self.shared.logs_tx.borrow().clone()
    }

    /// Recorded diagnostics, oldest first.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<DiagnosticMessage> {
        self.shared
            .diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn subscribe_status(&self) -> watch::Receiver<StatusSnapshot> {
        self.shared.status_tx.subscribe()
    }

    #[must_use]
    pub fn subscribe_connectivity(&self) -> watch::Receiver<ConnectivityState> {
        self.shared.connectivity_tx.subscribe()
    }

    #[must_use]
    pub fn subscribe_logs(&self) -> watch::Receiver<LogFeed> {
        self.shared.logs_tx.subscribe()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Stop scheduling ticks. Completions of requests still in flight are
    /// dropped without touching state.
    pub fn shutdown(&self) {
        if !self.cancel.is_cancelled() {
            info!("Shutting down monitor");
            self.cancel.cancel();
        }
    }
}

impl<T> Drop for Monitor<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Tick every `period`, spawn `request` per tick, and hand each completion
/// to `apply` if the sequencer still accepts it.
async fn run_periodic<O, Fut, F>(
    name: &'static str,
    period: Duration,
    cancel: CancellationToken,
    shared: Arc<Shared>,
    mut request: F,
    apply: fn(&Shared, O),
) where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = O> + Send + 'static,
    O: Send + 'static,
{
    let sequencer = Arc::new(Sequencer::new(cancel.clone()));

    probe::every(period, &cancel, || {
        let seq = sequencer.issue();
        let pending = request();
        let sequencer = Arc::clone(&sequencer);
        let shared = Arc::clone(&shared);

        tokio::spawn(async move {
            let outcome = pending.await;
            if !sequencer.commit(seq, || apply(&shared, outcome)) {
                debug!("Discarded {} completion #{}", name, seq);
            }
        });
    })
    .await;

    debug!("{} task stopped", name);
}

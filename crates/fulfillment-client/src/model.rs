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

//! Wire types reported by the fulfillment service.

use serde::{Deserialize, Serialize};

/// Service state reported by `/system/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Operational,
    Maintenance,
    Error,
}

impl ServiceState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Operational => "operational",
            Self::Maintenance => "maintenance",
            Self::Error => "error",
        }
    }
}

/// Operational counters carried by a status snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStats {
    pub total_orders: u64,
    pub total_logs: u64,
}

/// Result of a successful status probe.
///
/// Snapshots are replaced wholesale; nothing is merged between probes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub status: ServiceState,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub stats: ServiceStats,
}

impl StatusSnapshot {
    /// The snapshot shown whenever the status channel has nothing better:
    /// before the first probe completes and after any failed probe.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            status: ServiceState::Error,
            message: String::new(),
            timestamp: String::new(),
            stats: ServiceStats::default(),
        }
    }
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self::unavailable()
    }
}

/// Severity of a service log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Success,
    Error,
    Warning,
    /// The service's default level; unknown levels land here too.
    #[serde(other)]
    Info,
}

/// One entry of the service's operational log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub timestamp: String,
    pub message: String,
    pub status: LogStatus,
    #[serde(default)]
    pub details: Option<String>,
}

/// Payload of a successful `/upload` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UploadStats {
    #[serde(default)]
    pub processed_count: Option<u64>,
}

/// What the operator sees after an upload: the server's message plus counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub message: String,
    pub processed_count: Option<u64>,
}

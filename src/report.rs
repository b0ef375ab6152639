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

//! Plain-text rendering of monitor state for the terminal.

use fulfillment_client::{
    ChannelHealth, ConnectivityState, DiagnosticLevel, DiagnosticMessage, LogEntry, LogFeed,
    LogStatus, ServiceState, StatusSnapshot, UploadReceipt,
};

/// Longest diagnostic message shown before truncation.
const MAX_DIAGNOSTIC_LEN: usize = 60;

fn channel_icon(health: ChannelHealth) -> &'static str {
    match health {
        ChannelHealth::Healthy => "●",
        ChannelHealth::Unhealthy => "✕",
        ChannelHealth::Unknown => "○",
    }
}

pub fn connectivity_line(state: &ConnectivityState) -> String {
    let (icon, text) = if state.connected {
        ("●", "CONNECTED")
    } else {
        ("○", "DISCONNECTED")
    };

    format!(
        "{icon} {text:<12} latency {:>4} ms  status {}  ping {}",
        state.latency_ms,
        channel_icon(state.status_channel),
        channel_icon(state.ping_channel)
    )
}

pub fn status_line(snapshot: &StatusSnapshot) -> String {
    let label = match snapshot.status {
        ServiceState::Operational => "OPERATIONAL",
        ServiceState::Maintenance => "MAINTENANCE",
        ServiceState::Error => "ERROR",
    };

    let mut line = format!(
        "{label:<11}  orders {}  logs {}",
        snapshot.stats.total_orders, snapshot.stats.total_logs
    );
    if !snapshot.timestamp.is_empty() {
        line.push_str("  ");
        line.push_str(&snapshot.timestamp);
    }
    if !snapshot.message.is_empty() {
        line.push_str("  ");
        line.push_str(&snapshot.message);
    }
    line
}

pub fn log_line(entry: &LogEntry) -> String {
    let icon = match entry.status {
        LogStatus::Success => "✓",
        LogStatus::Error => "✕",
        LogStatus::Warning => "⚠",
        LogStatus::Info => "ℹ",
    };

    match entry.details.as_deref() {
        Some(details) if !details.is_empty() => {
            format!("{icon} {}  {} ({details})", entry.timestamp, entry.message)
        }
        _ => format!("{icon} {}  {}", entry.timestamp, entry.message),
    }
}

/// Lines for the log feed, at most `limit` entries in server order.
pub fn log_lines(feed: &LogFeed, limit: Option<usize>) -> Vec<String> {
    match feed {
        LogFeed::Loading => vec!["Loading logs...".to_string()],
        LogFeed::Loaded(entries) if entries.is_empty() => vec!["No logs".to_string()],
        LogFeed::Loaded(entries) => {
            let shown = limit.unwrap_or(entries.len()).min(entries.len());
            let mut lines: Vec<String> = entries[..shown].iter().map(log_line).collect();
            if shown < entries.len() {
                lines.push(format!("⋮ {} more", entries.len() - shown));
            }
            lines
        }
    }
}

pub fn diagnostic_line(diagnostic: &DiagnosticMessage) -> String {
    let icon = match diagnostic.level {
        DiagnosticLevel::Info => "ℹ",
        DiagnosticLevel::Warning => "⚠",
        DiagnosticLevel::Error => "✕",
    };

    format!(
        "{icon} {} {}",
        diagnostic.timestamp.format("%H:%M:%S"),
        truncate(&diagnostic.message, MAX_DIAGNOSTIC_LEN)
    )
}

pub fn upload_line(receipt: &UploadReceipt) -> String {
    match receipt.processed_count {
        Some(count) => format!("{} (processed {count})", receipt.message),
        None => receipt.message.clone(),
    }
}

// Counts chars, not bytes; service messages are often Persian.
fn truncate(message: &str, max_chars: usize) -> String {
    if message.chars().count() > max_chars {
        let kept: String = message.chars().take(max_chars).collect();
        format!("{kept}...")
    } else {
        message.to_string()
    }
}

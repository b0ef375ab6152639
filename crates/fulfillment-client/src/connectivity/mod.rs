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

//! Connectivity state: two independent health channels fused into one flag.
//!
//! The status channel is fed by the status probe, the ping channel by the
//! latency probe. The fusion is an inclusive OR: either channel succeeding
//! on its latest probe is enough to report the service as connected. A
//! working ping with an unreachable status endpoint (or the reverse) still
//! reports "connected". That is the intended policy, not a bug.

/// Health of one probe channel, as of its latest applied completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChannelHealth {
    /// No probe on this channel has completed yet.
    #[default]
    Unknown,
    Healthy,
    Unhealthy,
}

impl ChannelHealth {
    #[must_use]
    pub fn is_healthy(self) -> bool {
        self == Self::Healthy
    }

    fn from_outcome(succeeded: bool) -> Self {
        if succeeded {
            Self::Healthy
        } else {
            Self::Unhealthy
        }
    }
}

/// Fuse both channels: `status OR ping`.
#[must_use]
pub fn fuse(status: ChannelHealth, ping: ChannelHealth) -> bool {
    // Inclusive OR on purpose; see the module docs.
    status.is_healthy() || ping.is_healthy()
}

/// What presentation reads: the fused flag, the latest latency, and the
/// channels behind them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectivityState {
    pub connected: bool,
    /// Last successful round trip in milliseconds; 0 after a failed ping.
    pub latency_ms: u64,
    pub status_channel: ChannelHealth,
    pub ping_channel: ChannelHealth,
}

impl ConnectivityState {
    /// Record a status tick outcome. Returns the channel's previous health.
    pub fn record_status(&mut self, succeeded: bool) -> ChannelHealth {
        let previous = self.status_channel;
        self.status_channel = ChannelHealth::from_outcome(succeeded);
        self.refresh();
        previous
    }

    /// Record a successful ping. Returns the channel's previous health.
    pub fn record_ping(&mut self, latency_ms: u64) -> ChannelHealth {
        let previous = self.ping_channel;
        self.ping_channel = ChannelHealth::Healthy;
        self.latency_ms = latency_ms;
        self.refresh();
        previous
    }

    /// Record a failed ping; latency drops to zero. Returns the channel's
    /// previous health.
    pub fn record_ping_failure(&mut self) -> ChannelHealth {
        let previous = self.ping_channel;
        self.ping_channel = ChannelHealth::Unhealthy;
        self.latency_ms = 0;
        self.refresh();
        previous
    }

    fn refresh(&mut self) {
        self.connected = fuse(self.status_channel, self.ping_channel);
    }
}

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

//! In-memory transport for tests: canned replies per path, optional delays.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::transport::{RawResponse, Request, Transport, TransportError};

/// One scripted answer.
#[derive(Debug, Clone)]
pub(crate) struct Reply {
    delay: Duration,
    result: Result<RawResponse, TransportError>,
}

impl Reply {
    /// HTTP 200 with the given body.
    pub(crate) fn ok(body: &str) -> Self {
        Self::status(200, body)
    }

    pub(crate) fn status(status: u16, body: &str) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(RawResponse::new(status, body)),
        }
    }

    /// The request never reaches the service.
    pub(crate) fn unreachable() -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(TransportError::Connection("connection refused".to_string())),
        }
    }

    /// Resolve only after `delay` has elapsed.
    pub(crate) fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Successful `/system/status` reply.
pub(crate) fn status_reply(status: &str, total_orders: u64, total_logs: u64) -> Reply {
    Reply::ok(&format!(
        r#"{{"success":true,"data":{{"status":"{status}","message":"System is running normally","timestamp":"1403/05/01 12:00:00","stats":{{"total_orders":{total_orders},"total_logs":{total_logs}}}}}}}"#
    ))
}

/// Successful `/ping` reply.
pub(crate) fn pong() -> Reply {
    Reply::ok(r#"{"success":true,"message":"pong"}"#)
}

/// Successful `/logs` reply holding entries with the given ids.
pub(crate) fn logs_reply(ids: &[&str]) -> Reply {
    let entries: Vec<String> = ids
        .iter()
        .map(|id| {
            format!(
                r#"{{"id":"{id}","timestamp":"1403/05/01 12:00:00","message":"Item scanned successfully","status":"success","details":null}}"#
            )
        })
        .collect();
    Reply::ok(&format!(r#"{{"success":true,"data":[{}]}}"#, entries.join(",")))
}

#[derive(Debug, Default)]
struct Script {
    queued: HashMap<String, VecDeque<Reply>>,
    fallback: HashMap<String, Reply>,
    calls: HashMap<String, usize>,
    requests: Vec<Request>,
}

/// Transport answering from a per-path script.
///
/// Queued replies are consumed in order; once a path's queue is empty its
/// fallback reply (if any) is used, otherwise the request is unreachable.
/// Clones share the same script.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, path: &str, reply: Reply) {
        let mut script = self.script.lock().unwrap();
        script
            .queued
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
    }

    pub(crate) fn fallback(&self, path: &str, reply: Reply) {
        let mut script = self.script.lock().unwrap();
        script.fallback.insert(path.to_string(), reply);
    }

    pub(crate) fn calls(&self, path: &str) -> usize {
        let script = self.script.lock().unwrap();
        script.calls.get(path).copied().unwrap_or(0)
    }

    pub(crate) fn last_request(&self) -> Option<Request> {
        let script = self.script.lock().unwrap();
        script.requests.last().cloned()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: Request) -> Result<RawResponse, TransportError> {
        let reply = {
            let mut script = self.script.lock().unwrap();
            *script.calls.entry(request.path.clone()).or_insert(0) += 1;
            let queued = script
                .queued
                .get_mut(&request.path)
                .and_then(VecDeque::pop_front);
            let reply = queued
                .or_else(|| script.fallback.get(&request.path).cloned())
                .unwrap_or_else(Reply::unreachable);
            script.requests.push(request);
            reply
        };

        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.result
    }
}

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

//! Transport layer for the fulfillment service API.
//!
//! Raw HTTP exchanges go through the [`Transport`] trait so the rest of the
//! crate never touches a socket directly. [`ApiClient`] sits on top and
//! normalizes every response through the service envelope
//! (`{success, data, message}`): callers get either the decoded `data` or a
//! single [`ApiError`] carrying a message fit for display.
//!
//! Nothing in this layer retries. Retry policy belongs to the callers.

mod envelope;
mod http;

pub use envelope::Envelope;
pub use http::{HttpTransport, HttpTransportBuilder, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use reqwest::Method;

use async_trait::async_trait;
use log::debug;
use serde::de::{DeserializeOwned, IgnoredAny};
use thiserror::Error;

use crate::model::{LogEntry, StatusSnapshot};

/// Shown when the service cannot be reached or answers without a message.
pub const NETWORK_ERROR_MESSAGE: &str = "خطا در ارتباط با سرور";

/// Shown when the service rejects an operation without saying why.
pub const OPERATION_FAILED_MESSAGE: &str = "عملیات با خطا مواجه شد";

/// Shown when a successful envelope carries data of the wrong shape.
pub const INVALID_RESPONSE_MESSAGE: &str = "پاسخ نامعتبر از سرور";

/// Shown when an upload fails before reaching the service.
pub const UPLOAD_FAILED_MESSAGE: &str = "خطا در آپلود فایل";

/// The single error value surfaced past the transport layer.
///
/// Network failures and `success:false` envelopes both end up here; only the
/// display message survives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Failures below the envelope: the request never produced a response.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Timeout waiting for response.
    #[error("request timed out")]
    Timeout,

    /// Connection or DNS failure.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Any other HTTP client failure.
    #[error("HTTP request failed: {0}")]
    Http(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connection(err.to_string())
        } else {
            TransportError::Http(err.to_string())
        }
    }
}

/// Request payload.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(serde_json::Value),
    /// A single multipart file part.
    File {
        field: String,
        file_name: String,
        bytes: Vec<u8>,
    },
}

/// A request relative to the transport's base endpoint.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub body: Option<RequestBody>,
}

impl Request {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: RequestBody) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: Some(body),
        }
    }
}

/// Status code and body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Raw request/response exchange with the service.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn execute(&self, request: Request) -> Result<RawResponse, TransportError>;
}

/// Envelope-aware client for the fulfillment service.
#[derive(Debug, Clone)]
pub struct ApiClient<T = HttpTransport> {
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Perform a request and return the whole accepted envelope.
    pub async fn exchange<R: DeserializeOwned>(
        &self,
        request: Request,
    ) -> Result<Envelope<R>, ApiError> {
        let method = request.method.clone();
        let path = request.path.clone();

        let response = self.transport.execute(request).await.map_err(|e| {
            debug!("{} {} failed: {}", method, path, e);
            ApiError::new(NETWORK_ERROR_MESSAGE)
        })?;

        envelope::decode(&path, &response)
    }

    /// Perform a request and return only the envelope's `data`.
    pub async fn request<R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
    ) -> Result<R, ApiError> {
        let request = Request {
            method,
            path: path.to_string(),
            body,
        };
        self.exchange(request).await.map(|envelope| envelope.data)
    }

    /// `GET /system/status`
    pub async fn system_status(&self) -> Result<StatusSnapshot, ApiError> {
        self.request(Method::GET, "/system/status", None).await
    }

    /// `GET /ping`; the response carries no data worth keeping.
    pub async fn ping(&self) -> Result<(), ApiError> {
        self.request::<IgnoredAny>(Method::GET, "/ping", None)
            .await
            .map(|_| ())
    }

    /// `GET /logs`
    pub async fn logs(&self) -> Result<Vec<LogEntry>, ApiError> {
        self.request(Method::GET, "/logs", None).await
    }
}

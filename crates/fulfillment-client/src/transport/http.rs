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

//! `reqwest`-backed transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

use super::{RawResponse, Request, RequestBody, Transport, TransportError};

/// Base endpoint of a locally running service.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5001/api";

/// Per-request timeout unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP transport bound to one base endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a new builder for configuring the transport.
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: Request) -> Result<RawResponse, TransportError> {
        let url = self.url(&request.path);
        let mut builder = self.client.request(request.method, &url);

        match request.body {
            Some(RequestBody::Json(value)) => {
                builder = builder.json(&value);
            }
            Some(RequestBody::File {
                field,
                file_name,
                bytes,
            }) => {
                let part = Part::bytes(bytes).file_name(file_name);
                builder = builder.multipart(Form::new().part(field, part));
            }
            None => {}
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        Ok(RawResponse { status, body })
    }
}

/// Builder for [`HttpTransport`].
#[derive(Debug, Default)]
pub struct HttpTransportBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl HttpTransportBuilder {
    /// Set the API base endpoint (e.g., "http://localhost:5001/api").
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the transport.
    pub fn build(self) -> Result<HttpTransport, TransportError> {
        let client = Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()?;

        Ok(HttpTransport {
            client,
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{ApiClient, NETWORK_ERROR_MESSAGE};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    fn http_response(status_line: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    /// Read one request: headers plus a `Content-Length` or chunked body.
    async fn read_request(stream: &mut TcpStream) -> Vec<u8> {
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];

        loop {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                return request;
            }
            request.extend_from_slice(&buf[..n]);

            let Some(header_end) = request.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let headers = String::from_utf8_lossy(&request[..header_end]).to_ascii_lowercase();
            let body = &request[header_end + 4..];

            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok());
            let complete = match content_length {
                Some(length) => body.len() >= length,
                None if headers.contains("transfer-encoding: chunked") => body.ends_with(b"0\r\n\r\n"),
                None => true,
            };
            if complete {
                return request;
            }
        }
    }

    /// Serve one canned response on a local port. The handle yields the raw
    /// request the server received.
    async fn serve_once(response: String) -> (String, JoinHandle<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_request(&mut stream).await;
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            request
        });

        (format!("http://{addr}/api"), handle)
    }

    fn transport(base_url: &str, timeout: Duration) -> HttpTransport {
        HttpTransport::builder()
            .base_url(base_url)
            .timeout(timeout)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let transport = HttpTransport::builder().build().unwrap();
        assert_eq!(transport.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_builder_custom() {
        let transport = HttpTransport::builder()
            .base_url("http://5.34.204.56:5001/api")
            .timeout(Duration::from_secs(3))
            .build()
            .unwrap();
        assert_eq!(transport.base_url(), "http://5.34.204.56:5001/api");
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let transport = HttpTransport::builder()
            .base_url("http://localhost:5001/api/")
            .build()
            .unwrap();
        assert_eq!(transport.url("/system/status"), "http://localhost:5001/api/system/status");
        assert_eq!(transport.url("ping"), "http://localhost:5001/api/ping");
    }

    #[tokio::test]
    async fn test_server_error_is_a_response_not_a_transport_failure() {
        let body = r#"{"success":false,"message":"boom"}"#;
        let (base_url, server) =
            serve_once(http_response("500 Internal Server Error", body)).await;
        let transport = transport(&base_url, Duration::from_secs(5));

        let response = transport.execute(Request::get("/logs")).await.unwrap();
        assert_eq!(response.status, 500);
        assert_eq!(response.body, body.as_bytes());

        let request = String::from_utf8(server.await.unwrap()).unwrap();
        assert!(request.starts_with("GET /api/logs HTTP/1.1\r\n"));
    }

    #[tokio::test]
    async fn test_server_error_message_reaches_caller() {
        let (base_url, _server) = serve_once(http_response(
            "500 Internal Server Error",
            r#"{"success":false,"message":"boom"}"#,
        ))
        .await;
        let client = ApiClient::new(transport(&base_url, Duration::from_secs(5)));

        let err = client.logs().await.unwrap_err();
        assert_eq!(err.message(), "boom");
    }

    #[tokio::test]
    async fn test_ping_over_http() {
        let (base_url, server) = serve_once(http_response(
            "200 OK",
            r#"{"success":true,"message":"pong"}"#,
        ))
        .await;
        let client = ApiClient::new(transport(&base_url, Duration::from_secs(5)));

        assert!(client.ping().await.is_ok());
        let request = String::from_utf8(server.await.unwrap()).unwrap();
        assert!(request.starts_with("GET /api/ping HTTP/1.1\r\n"));
    }

    #[tokio::test]
    async fn test_hanging_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(stream);
        });

        let transport = transport(&format!("http://{addr}/api"), Duration::from_millis(300));
        let err = transport.execute(Request::get("/ping")).await.unwrap_err();
        assert!(matches!(err, TransportError::Timeout), "got {err:?}");
    }

    #[tokio::test]
    async fn test_timeout_surfaces_network_message() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(stream);
        });

        let client = ApiClient::new(transport(
            &format!("http://{addr}/api"),
            Duration::from_millis(300),
        ));
        let err = client.ping().await.unwrap_err();
        assert_eq!(err.message(), NETWORK_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_upload_sends_one_named_file_part() {
        let (base_url, server) = serve_once(http_response(
            "200 OK",
            r#"{"success":true,"message":"ok","data":{"processed_count":1}}"#,
        ))
        .await;
        let client = ApiClient::new(transport(&base_url, Duration::from_secs(5)));

        let receipt = client
            .upload("orders.xlsx", b"sheet-bytes".to_vec())
            .await
            .unwrap();
        assert_eq!(receipt.processed_count, Some(1));

        let request = String::from_utf8_lossy(&server.await.unwrap()).to_ascii_lowercase();
        assert!(request.starts_with("post /api/upload http/1.1\r\n"));
        assert!(request.contains("content-type: multipart/form-data; boundary="));
        assert_eq!(request.matches("content-disposition: form-data").count(), 1);
        assert!(request.contains(r#"name="file"; filename="orders.xlsx""#));
        assert!(request.contains("sheet-bytes"));
    }
}

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

//! Spreadsheet upload: `POST /upload` as a single multipart `file` part.
//!
//! The service only accepts `.xlsx`/`.xls`, but the check is the service's to
//! make; the client forwards whatever it is given and reports the verdict.

use std::path::Path;

use log::{info, warn};

use crate::model::{UploadReceipt, UploadStats};
use crate::transport::{
    ApiClient, ApiError, Envelope, Request, RequestBody, Transport, UPLOAD_FAILED_MESSAGE,
};

const UPLOAD_FIELD: &str = "file";

impl<T: Transport> ApiClient<T> {
    /// Upload `bytes` under `file_name`.
    pub async fn upload(
        &self,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<UploadReceipt, ApiError> {
        let file_name = file_name.into();
        let size = bytes.len();
        let request = Request::post(
            "/upload",
            RequestBody::File {
                field: UPLOAD_FIELD.to_string(),
                file_name: file_name.clone(),
                bytes,
            },
        );

        let envelope: Envelope<Option<UploadStats>> = self.exchange(request).await?;
        let receipt = UploadReceipt {
            message: envelope.message.unwrap_or_default(),
            processed_count: envelope.data.and_then(|stats| stats.processed_count),
        };

        info!(
            "Uploaded {} ({} bytes), processed {:?}",
            file_name, size, receipt.processed_count
        );
        Ok(receipt)
    }

    /// Read `path` and upload it under its file name.
    pub async fn upload_file(&self, path: &Path) -> Result<UploadReceipt, ApiError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            warn!("Failed to read {}: {}", path.display(), e);
            ApiError::new(UPLOAD_FAILED_MESSAGE)
        })?;

        let file_name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());

        self.upload(file_name, bytes).await
    }
}

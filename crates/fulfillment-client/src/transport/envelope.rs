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

//! Response envelope normalization.

use log::debug;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::{
    ApiError, RawResponse, INVALID_RESPONSE_MESSAGE, NETWORK_ERROR_MESSAGE,
    OPERATION_FAILED_MESSAGE,
};

/// An accepted (`success:true`) envelope with its data decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope<T> {
    pub data: T,
    pub message: Option<String>,
    pub timestamp: Option<String>,
}

/// Envelope as it arrives on the wire. Every field is optional so that a
/// malformed body still yields whatever message it carries.
#[derive(Debug, Deserialize)]
struct WireEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
}

fn non_empty(message: Option<String>) -> Option<String> {
    message.filter(|m| !m.trim().is_empty())
}

/// Turn a raw response into either the envelope's data or an [`ApiError`].
///
/// - non-2xx: the body's `message`, else the network fallback
/// - 2xx without `success:true`: the body's `message`, else the operation fallback
/// - 2xx whose `data` does not decode: the invalid-response fallback
pub(crate) fn decode<R: DeserializeOwned>(
    path: &str,
    response: &RawResponse,
) -> Result<Envelope<R>, ApiError> {
    if !response.is_success() {
        debug!("{} returned HTTP {}", path, response.status);
        let message = serde_json::from_slice::<WireEnvelope>(&response.body)
            .ok()
            .and_then(|wire| non_empty(wire.message));
        return Err(ApiError::new(
            message.unwrap_or_else(|| NETWORK_ERROR_MESSAGE.to_string()),
        ));
    }

    let wire: WireEnvelope = serde_json::from_slice(&response.body).map_err(|e| {
        debug!("{} returned a body that is not an envelope: {}", path, e);
        ApiError::new(OPERATION_FAILED_MESSAGE)
    })?;

    if !wire.success {
        return Err(ApiError::new(
            non_empty(wire.message).unwrap_or_else(|| OPERATION_FAILED_MESSAGE.to_string()),
        ));
    }

    let data = serde_json::from_value(wire.data.unwrap_or(Value::Null)).map_err(|e| {
        debug!("{} returned unexpected data: {}", path, e);
        ApiError::new(INVALID_RESPONSE_MESSAGE)
    })?;

    Ok(Envelope {
        data,
        message: non_empty(wire.message),
        timestamp: wire.timestamp,
    })
}

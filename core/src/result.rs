//! Normalized response shape and the normalization step.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::http::HttpResponse;

/// Uniform result of a completed round-trip. Success and failure share this
/// shape and are told apart by `ok`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchResult {
    pub ok: bool,
    pub status: u16,
    /// A body of JSON `null` is `Some(Value::Null)`, distinct from no data.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub data: Option<Value>,
}

/// A present `data` field, even `null`, is `Some`; only a missing one is `None`.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl FetchResult {
    /// Deserialize `data` into a caller type. `None` when there is no data.
    pub fn data_as<T: DeserializeOwned>(&self) -> Option<Result<T, serde_json::Error>> {
        self.data.clone().map(serde_json::from_value)
    }
}

/// Turn a response into a `FetchResult`. Never fails.
///
/// - body parses: `ok` follows the 2xx check and `data` is the parsed body
/// - body does not parse, status 204: `ok` with an empty object
/// - body does not parse, any other status: not `ok`, no `data`
pub fn normalize(response: HttpResponse) -> FetchResult {
    let status = response.status;
    match response.json() {
        Ok(data) => FetchResult {
            ok: response.is_success(),
            status,
            data: Some(data),
        },
        Err(_) if status == 204 => FetchResult {
            ok: true,
            status,
            data: Some(Value::Object(Default::default())),
        },
        Err(_) => FetchResult {
            ok: false,
            status,
            data: None,
        },
    }
}

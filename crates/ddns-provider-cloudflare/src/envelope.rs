//! Cloudflare response envelope
//!
//! Every Cloudflare API v4 response wraps its payload the same way:
//!
//! ```json
//! {
//!   "success": true,
//!   "errors": [],
//!   "messages": [],
//!   "result": { ... },
//!   "result_info": { "page": 1, "total_pages": 3 }
//! }
//! ```
//!
//! [`decode_envelope`] turns such a body into an [`Envelope`], separating the
//! payload from provider-reported errors.

use ddns_core::{Error, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// One provider-reported error, possibly with nested causes
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub error_chain: Vec<ApiError>,
}

/// Pagination metadata of a list response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ResultInfo {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
}

/// Payload of a successful response
#[derive(Debug, Clone, PartialEq)]
pub struct Payload<T> {
    pub result: Option<T>,
    pub result_info: Option<ResultInfo>,
}

/// A decoded response
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<T> {
    Success(Payload<T>),
    Failure(Vec<ApiError>),
}

impl<T> Envelope<T> {
    /// Convert a failure into [`Error::Api`]
    pub fn into_result(self) -> Result<Payload<T>> {
        match self {
            Envelope::Success(payload) => Ok(payload),
            Envelope::Failure(errors) => Err(Error::api(format_errors(&errors))),
        }
    }
}

#[derive(Deserialize)]
struct RawEnvelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiError>,
    result: Option<T>,
    result_info: Option<ResultInfo>,
}

/// Decode a response body
///
/// `success: false` with an empty `errors` list is treated as success.
pub fn decode_envelope<T: DeserializeOwned>(body: &[u8]) -> Result<Envelope<T>> {
    let raw: RawEnvelope<T> = serde_json::from_slice(body)?;

    if !raw.success && !raw.errors.is_empty() {
        return Ok(Envelope::Failure(raw.errors));
    }

    Ok(Envelope::Success(Payload {
        result: raw.result,
        result_info: raw.result_info,
    }))
}

/// Render errors as `[code] message` entries joined by `: `
///
/// Each entry is followed by its `error_chain`, depth first.
pub fn format_errors(errors: &[ApiError]) -> String {
    let mut parts = Vec::new();
    collect(errors, &mut parts);
    parts.join(": ")
}

fn collect(errors: &[ApiError], parts: &mut Vec<String>) {
    for error in errors {
        parts.push(format!("[{}] {}", error.code, error.message));
        collect(&error.error_chain, parts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn test_decode_success() {
        let raw = body(json!({
            "success": true,
            "errors": [],
            "messages": [],
            "result": [{ "id": "zone-1", "name": "nenad.dev" }],
            "result_info": { "page": 1, "per_page": 50, "total_pages": 2, "count": 1 }
        }));

        let envelope: Envelope<Vec<serde_json::Value>> = decode_envelope(&raw).unwrap();
        let payload = envelope.into_result().unwrap();

        assert_eq!(payload.result.unwrap().len(), 1);
        assert_eq!(
            payload.result_info,
            Some(ResultInfo {
                page: 1,
                total_pages: 2
            })
        );
    }

    #[test]
    fn test_decode_failure_formats_chain() {
        let raw = body(json!({
            "success": false,
            "errors": [
                {
                    "code": 1004,
                    "message": "DNS Validation Error",
                    "error_chain": [{ "code": 9021, "message": "Invalid TTL" }]
                },
                { "code": 9109, "message": "Invalid access token" }
            ],
            "result": null
        }));

        let envelope: Envelope<serde_json::Value> = decode_envelope(&raw).unwrap();
        let err = envelope.into_result().unwrap_err();

        assert_eq!(
            err.to_string(),
            "error in the response: [1004] DNS Validation Error: [9021] Invalid TTL: [9109] Invalid access token"
        );
    }

    #[test]
    fn test_unsuccessful_without_errors_is_success() {
        let raw = body(json!({ "success": false, "errors": [], "result": { "id": "x" } }));

        let envelope: Envelope<serde_json::Value> = decode_envelope(&raw).unwrap();

        assert!(matches!(envelope, Envelope::Success(_)));
    }

    #[test]
    fn test_malformed_body() {
        let result = decode_envelope::<serde_json::Value>(b"<html>502 Bad Gateway</html>");
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[test]
    fn test_object_without_success_is_not_an_envelope() {
        let raw = body(json!({ "message": "route not found" }));

        let result = decode_envelope::<serde_json::Value>(&raw);

        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[test]
    fn test_missing_result() {
        let raw = body(json!({ "success": true, "errors": [] }));

        let envelope: Envelope<Vec<serde_json::Value>> = decode_envelope(&raw).unwrap();

        let payload = envelope.into_result().unwrap();
        assert!(payload.result.is_none());
        assert!(payload.result_info.is_none());
    }
}

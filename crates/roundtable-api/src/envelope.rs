// Response envelope normalization.
//
// The platform's endpoints are not consistent about their response shape.
// Three envelopes appear in the wild:
//
//   1. a bare JSON array:            `[ {...}, {...} ]`
//   2. a data wrapper:               `{ "data": [...], "count": 2 }`
//   3. a success wrapper:            `{ "success": true, "data": [...] }`
//                                    `{ "success": false, "error": "..." }`
//
// plus `{ "status": "success", ... }` variants on a few student endpoints.
// This module is the single place that knows about all of them. Endpoint
// methods declare the payload type they expect and never see the envelope.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Error;

/// Decode a response body in any of the platform's envelope shapes into `T`.
///
/// A `success: false` / `status: "error"` envelope becomes [`Error::Rejected`]
/// with the server's message. The HTTP status is long gone by the time the
/// body is parsed, so those rejections carry the status the caller passes in.
pub fn decode<T: DeserializeOwned>(body: &str, http_status: u16) -> Result<T, Error> {
    let value: Value = serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: body.to_owned(),
    })?;

    let payload = strip(value, http_status)?;

    serde_json::from_value(payload).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: body.to_owned(),
    })
}

/// Unwrap the envelope, returning the payload value.
fn strip(value: Value, http_status: u16) -> Result<Value, Error> {
    let Value::Object(map) = value else {
        // Bare arrays (and the odd bare scalar) pass through untouched.
        return Ok(value);
    };

    if is_rejection(&map) {
        return Err(Error::Rejected {
            message: rejection_message(&map),
            status: http_status,
        });
    }

    if let Some(data) = map.get("data") {
        return Ok(data.clone());
    }

    // Payload at the top level, possibly with `success`/`status` markers
    // alongside it. Serde ignores the extra keys.
    Ok(Value::Object(map))
}

fn is_rejection(map: &serde_json::Map<String, Value>) -> bool {
    if map.get("success").and_then(Value::as_bool) == Some(false) {
        return true;
    }
    matches!(map.get("status").and_then(Value::as_str), Some("error"))
}

fn rejection_message(map: &serde_json::Map<String, Value>) -> String {
    map.get("error")
        .or_else(|| map.get("message"))
        .and_then(Value::as_str)
        .unwrap_or("request rejected")
        .to_owned()
}

/// Best-effort extraction of a server error message from a raw body.
///
/// Used for non-success HTTP statuses, where the body may be a JSON error
/// payload or arbitrary text from a proxy.
pub(crate) fn server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let map = value.as_object()?;
    map.get("error")
        .or_else(|| map.get("message"))
        .and_then(Value::as_str)
        .map(str::to_owned)
}

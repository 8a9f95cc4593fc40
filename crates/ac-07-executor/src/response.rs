//! # Response Encoding
//!
//! Shapes a raw JSON API response into the `responseValue` bytes a fulfill
//! transaction carries: apply `_path` to navigate into
//! the response, `_times` to scale a numeric result, then encode per
//! `_type`. Mirrors the parameter codec's word-oriented encoding
//! (`ac-03-parameter-codec`) rather than a generic ABI crate, for the same
//! reason: this engine hand-rolls its own small on-chain-format codecs.

use ac_05_authorizer::ReservedParameters;
use thiserror::Error;

/// Failure shaping a raw API response into `responseValue` bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseEncodeError {
    /// `_path` did not resolve to a value in the response.
    #[error("path {0:?} not found in response")]
    PathNotFound(String),
    /// The resolved value could not be coerced to the declared `_type`.
    #[error("value does not match declared type {0:?}")]
    TypeMismatch(String),
    /// The reserved parameters were malformed (should not happen — the
    /// authorizer already validates them — but the executor does not
    /// assume it).
    #[error("reserved parameters are malformed")]
    MalformedReserved,
}

/// Default ABI type assumed when `_type` is not declared on the request.
const DEFAULT_TYPE: &str = "int256";

/// Navigate a dotted `_path` (e.g. `"result.price"`) into a JSON value.
/// An empty path returns the value unchanged.
fn extract_path<'a>(value: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
    if path.is_empty() {
        return Some(value);
    }
    path.split('.').try_fold(value, |current, segment| {
        if let Ok(index) = segment.parse::<usize>() {
            current.get(index)
        } else {
            current.get(segment)
        }
    })
}

/// Encode a raw JSON response into `responseValue` bytes per the
/// request's reserved parameters.
pub fn encode_response(
    data: &serde_json::Value,
    reserved: &ReservedParameters,
) -> Result<Vec<u8>, ResponseEncodeError> {
    let path = reserved.path.as_deref().unwrap_or("");
    let resolved = extract_path(data, path)
        .ok_or_else(|| ResponseEncodeError::PathNotFound(path.to_string()))?;
    let type_tag = reserved.response_type.as_deref().unwrap_or(DEFAULT_TYPE);

    match type_tag {
        "int256" | "uint256" | "int" => {
            let number = resolved
                .as_f64()
                .ok_or_else(|| ResponseEncodeError::TypeMismatch(type_tag.to_string()))?;
            let scaled = match reserved.times {
                Some(times) => number * (times as f64),
                None => number,
            };
            let value = scaled.round() as i128;
            Ok(value.to_be_bytes().to_vec())
        }
        "bool" => {
            let value = resolved
                .as_bool()
                .ok_or_else(|| ResponseEncodeError::TypeMismatch(type_tag.to_string()))?;
            Ok(vec![u8::from(value)])
        }
        "bytes32" | "bytes" => {
            let text = resolved
                .as_str()
                .ok_or_else(|| ResponseEncodeError::TypeMismatch(type_tag.to_string()))?;
            Ok(text.as_bytes().to_vec())
        }
        "string" => {
            let text = resolved
                .as_str()
                .ok_or_else(|| ResponseEncodeError::TypeMismatch(type_tag.to_string()))?;
            Ok(text.as_bytes().to_vec())
        }
        other => Err(ResponseEncodeError::TypeMismatch(other.to_string())),
    }
}

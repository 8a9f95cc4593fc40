//! # ac-03-parameter-codec
//!
//! **Component:** 4.C Parameter Codec.
//!
//! Decodes and encodes the tagged-parameter blob carried on
//! `encodedParameters` into/from a `{ name: value }` mapping. The wire
//! format is a hand-rolled, length-prefixed tuple sequence rather than a
//! generic ABI encoding — each tuple is
//! `(name: [u8; 32], type: [u8; 32], len: u32 BE, value: [u8; len])`,
//! both name and type being zero-padded UTF-8 words. This mirrors the
//! corpus's habit of hand-rolling binary codecs for on-chain formats
//! instead of reaching for a generic ABI crate.

#![warn(missing_docs)]

use ac_types::{ApiCallRequest, Log, ParameterValue, Parameters, RequestErrorCode, RequestStatus};

const WORD: usize = 32;
const LEN_PREFIX: usize = 4;

/// Failure decoding one tagged-parameter tuple.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The blob ended in the middle of a tuple.
    #[error("truncated parameter blob at byte offset {offset}")]
    Truncated {
        /// Byte offset the decoder was at when it ran out of input.
        offset: usize,
    },
    /// A name word did not hold valid UTF-8.
    #[error("non-utf8 name word at byte offset {offset}")]
    InvalidNameWord {
        /// Byte offset of the offending name word.
        offset: usize,
    },
    /// A type word did not hold valid UTF-8.
    #[error("non-utf8 type word at byte offset {offset}")]
    InvalidTypeWord {
        /// Byte offset of the offending type word.
        offset: usize,
    },
    /// A value could not be interpreted as its declared type.
    #[error("value for parameter {name:?} does not match declared type {type_tag:?}")]
    TypeMismatch {
        /// The parameter's name.
        name: String,
        /// The parameter's declared type tag.
        type_tag: String,
    },
}

fn trim_word(word: &[u8]) -> Vec<u8> {
    let end = word.iter().rposition(|&b| b != 0).map(|i| i + 1).unwrap_or(0);
    word[..end].to_vec()
}

fn pack_word(text: &str) -> [u8; WORD] {
    let bytes = text.as_bytes();
    let mut word = [0u8; WORD];
    let len = bytes.len().min(WORD);
    word[..len].copy_from_slice(&bytes[..len]);
    word
}

/// Type tag `encode_parameters` emits for a given value, using the same
/// tags `decode_parameters` recognizes for that variant.
fn type_tag_for(value: &ParameterValue) -> &'static str {
    match value {
        ParameterValue::Str(_) => "string",
        ParameterValue::Bytes(_) => "bytes",
        ParameterValue::Int(_) => "int256",
        ParameterValue::Bool(_) => "bool",
    }
}

fn value_bytes_for(value: &ParameterValue) -> Vec<u8> {
    match value {
        ParameterValue::Str(s) => s.as_bytes().to_vec(),
        ParameterValue::Bytes(b) => b.clone(),
        ParameterValue::Int(i) => i.to_be_bytes().to_vec(),
        ParameterValue::Bool(b) => vec![if *b { 1 } else { 0 }],
    }
}

/// Decode a raw tagged-parameter blob into a `{ name: value }` mapping.
/// An empty blob decodes to an empty mapping.
pub fn decode_parameters(blob: &[u8]) -> Result<Parameters, DecodeError> {
    let mut params = Parameters::new();
    let mut offset = 0usize;

    while offset < blob.len() {
        let tuple_header = WORD + WORD + LEN_PREFIX;
        if offset + tuple_header > blob.len() {
            return Err(DecodeError::Truncated { offset });
        }

        let name_word = &blob[offset..offset + WORD];
        offset += WORD;
        let type_word = &blob[offset..offset + WORD];
        offset += WORD;
        let len_bytes = &blob[offset..offset + LEN_PREFIX];
        offset += LEN_PREFIX;
        let value_len = u32::from_be_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]]) as usize;

        if offset + value_len > blob.len() {
            return Err(DecodeError::Truncated { offset });
        }
        let value_bytes = &blob[offset..offset + value_len];
        offset += value_len;

        let name = String::from_utf8(trim_word(name_word))
            .map_err(|_| DecodeError::InvalidNameWord { offset })?;
        let type_tag = String::from_utf8(trim_word(type_word))
            .map_err(|_| DecodeError::InvalidTypeWord { offset })?;

        let value = match type_tag.as_str() {
            "string" => ParameterValue::Str(
                String::from_utf8(value_bytes.to_vec())
                    .map_err(|_| DecodeError::TypeMismatch { name: name.clone(), type_tag: type_tag.clone() })?,
            ),
            "bytes" | "bytes32" | "address" => ParameterValue::Bytes(value_bytes.to_vec()),
            "int256" | "uint256" | "int" => {
                if value_bytes.len() > 16 {
                    return Err(DecodeError::TypeMismatch { name: name.clone(), type_tag: type_tag.clone() });
                }
                let mut buf = [0u8; 16];
                buf[16 - value_bytes.len()..].copy_from_slice(value_bytes);
                ParameterValue::Int(i128::from_be_bytes(buf))
            }
            "bool" => match value_bytes {
                [0] => ParameterValue::Bool(false),
                [1] => ParameterValue::Bool(true),
                _ => return Err(DecodeError::TypeMismatch { name: name.clone(), type_tag: type_tag.clone() }),
            },
            _ => ParameterValue::Bytes(value_bytes.to_vec()),
        };

        params.insert(name, value);
    }

    Ok(params)
}

/// Encode a `{ name: value }` mapping back into a tagged-parameter blob,
/// the inverse of `decode_parameters`: `decode_parameters(&encode_parameters(p)) == p`
/// for any mapping whose names and type tags fit in a 32-byte word.
pub fn encode_parameters(parameters: &Parameters) -> Vec<u8> {
    let mut out = Vec::new();
    for (name, value) in parameters {
        out.extend_from_slice(&pack_word(name));
        out.extend_from_slice(&pack_word(type_tag_for(value)));
        let value_bytes = value_bytes_for(value);
        out.extend_from_slice(&(value_bytes.len() as u32).to_be_bytes());
        out.extend_from_slice(&value_bytes);
    }
    out
}

/// Apply `encodedParameters` to a request in place. On decode failure
/// the request is marked `Errored` and an ERROR log is returned; other
/// fields are left intact.
pub fn apply_parameters(request: &mut ApiCallRequest) -> Option<Log> {
    if request.encoded_parameters.is_empty() {
        return None;
    }

    match decode_parameters(&request.encoded_parameters) {
        Ok(decoded) => {
            request.parameters = decoded;
            None
        }
        Err(err) => {
            request.status = RequestStatus::Errored;
            request.error_code = Some(RequestErrorCode::RequestParameterDecodingFailed);
            let log = Log::error(
                format!(
                    "failed to decode parameters for request {}: {}",
                    request.id, err
                ),
                Some(err.to_string()),
            );
            log.emit();
            Some(log)
        }
    }
}

/// Merge a regular request's decoded parameters over its template's
/// decoded parameters, client-supplied names overriding template names.
/// The template's own decode failure is reported
/// separately via `RequestErrorCode::TemplateParameterDecodingFailed` by
/// the caller, which owns template resolution.
pub fn merge_over_template(template: &Parameters, client: &Parameters) -> Parameters {
    let mut merged = template.clone();
    for (name, value) in client {
        merged.insert(name.clone(), value.clone());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuple(name: &str, type_tag: &str, value: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        let mut name_word = [0u8; WORD];
        name_word[..name.len()].copy_from_slice(name.as_bytes());
        out.extend_from_slice(&name_word);

        let mut type_word = [0u8; WORD];
        type_word[..type_tag.len()].copy_from_slice(type_tag.as_bytes());
        out.extend_from_slice(&type_word);

        out.extend_from_slice(&(value.len() as u32).to_be_bytes());
        out.extend_from_slice(value);
        out
    }

    #[test]
    fn empty_blob_decodes_to_empty_mapping() {
        assert!(decode_parameters(&[]).unwrap().is_empty());
    }

    #[test]
    fn decodes_string_int_bool_and_bytes_tuples() {
        let mut blob = Vec::new();
        blob.extend(tuple("from", "string", b"ETH"));
        blob.extend(tuple("amount", "int256", &42i128.to_be_bytes()));
        blob.extend(tuple("include_meta", "bool", &[1]));
        blob.extend(tuple("_path", "bytes32", b"result"));

        let params = decode_parameters(&blob).unwrap();
        assert_eq!(params.get("from"), Some(&ParameterValue::Str("ETH".to_string())));
        assert_eq!(params.get("amount"), Some(&ParameterValue::Int(42)));
        assert_eq!(params.get("include_meta"), Some(&ParameterValue::Bool(true)));
        assert_eq!(params.get("_path"), Some(&ParameterValue::Bytes(b"result".to_vec())));
    }

    #[test]
    fn encode_then_decode_round_trips_every_supported_type() {
        let mut params = Parameters::new();
        params.insert("from".to_string(), ParameterValue::Str("ETH".to_string()));
        params.insert("amount".to_string(), ParameterValue::Int(-42));
        params.insert("include_meta".to_string(), ParameterValue::Bool(true));
        params.insert("_path".to_string(), ParameterValue::Bytes(b"result".to_vec()));

        let blob = encode_parameters(&params);
        assert_eq!(decode_parameters(&blob).unwrap(), params);
    }

    #[test]
    fn non_utf8_name_word_is_reported_distinctly_from_type_word() {
        let mut blob = tuple("from", "string", b"ETH");
        blob[0] = 0xff;
        assert!(matches!(decode_parameters(&blob), Err(DecodeError::InvalidNameWord { .. })));
    }

    #[test]
    fn truncated_blob_is_a_decode_error() {
        let mut blob = tuple("from", "string", b"ETH");
        blob.truncate(blob.len() - 1);
        assert!(matches!(decode_parameters(&blob), Err(DecodeError::Truncated { .. })));
    }

    #[test]
    fn apply_parameters_marks_request_errored_on_decode_failure() {
        let mut req = sample_request(vec![0xff; 10]);
        let log = apply_parameters(&mut req);
        assert!(log.is_some());
        assert_eq!(req.status, RequestStatus::Errored);
        assert_eq!(req.error_code, Some(RequestErrorCode::RequestParameterDecodingFailed));
    }

    #[test]
    fn apply_parameters_is_a_noop_on_an_empty_blob() {
        let mut req = sample_request(vec![]);
        assert!(apply_parameters(&mut req).is_none());
        assert_eq!(req.status, RequestStatus::Pending);
    }

    #[test]
    fn client_parameters_override_template_parameters_by_name() {
        let mut template = Parameters::new();
        template.insert("from".to_string(), ParameterValue::Str("ETH".to_string()));
        template.insert("to".to_string(), ParameterValue::Str("USD".to_string()));

        let mut client = Parameters::new();
        client.insert("from".to_string(), ParameterValue::Str("BTC".to_string()));

        let merged = merge_over_template(&template, &client);
        assert_eq!(merged.get("from"), Some(&ParameterValue::Str("BTC".to_string())));
        assert_eq!(merged.get("to"), Some(&ParameterValue::Str("USD".to_string())));
    }

    fn sample_request(encoded_parameters: Vec<u8>) -> ApiCallRequest {
        use ac_types::{ProviderId, RequestId, RequestKind, RequestMetadata};
        ApiCallRequest {
            id: RequestId::from_bytes([1; 32]),
            kind: RequestKind::Full,
            status: RequestStatus::Pending,
            error_code: None,
            provider_id: ProviderId::from_bytes([2; 32]),
            requester_index: None,
            client_address: "0xclient".into(),
            designated_wallet: None,
            fulfill_address: None,
            fulfill_function_id: None,
            endpoint_id: None,
            template_id: None,
            encoded_parameters,
            parameters: Parameters::new(),
            request_count: 0,
            metadata: RequestMetadata {
                block_number: 1,
                log_index: 0,
                current_block: 1,
                ignore_blocked_requests_after_blocks: 50,
                transaction_hash: [0; 32],
            },
            response_value: None,
            aggregated_call_id: None,
        }
    }
}

//! Backend response parsing

use crate::{ApiResponse, RequestError, Result, StampMode};
use serde::de::DeserializeOwned;
use stamp_core::{Seal, Signature, StampItem};

/// Parse a backend response envelope from a JSON string
pub fn parse_response<T: DeserializeOwned>(json: &str) -> Result<ApiResponse<T>> {
    serde_json::from_str(json).map_err(|e| RequestError::ParseError(e.to_string()))
}

/// Parse a seal or signature list response into stamp items
///
/// The list endpoints answer with either a bare array or a paged object
/// carrying the array under `records`.
pub fn parse_stamp_items(json: &str, mode: StampMode) -> Result<Vec<StampItem>> {
    let response: ApiResponse<serde_json::Value> = parse_response(json)?;
    let data = response.into_data()?;

    let records = match data {
        serde_json::Value::Array(_) => data,
        serde_json::Value::Object(mut page) => page
            .remove("records")
            .ok_or_else(|| RequestError::ParseError("List has no records".to_string()))?,
        other => {
            return Err(RequestError::ParseError(format!(
                "Expected a list, got {other}"
            )))
        }
    };

    let items = match mode {
        StampMode::Seal => serde_json::from_value::<Vec<Seal>>(records)?
            .iter()
            .map(StampItem::from_seal)
            .collect(),
        StampMode::Signature => serde_json::from_value::<Vec<Signature>>(records)?
            .iter()
            .map(StampItem::from_signature)
            .collect(),
    };

    Ok(items)
}

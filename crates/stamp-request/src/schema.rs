//! Stamping request and response types
//!
//! Field names follow the backend's camelCase JSON.

use crate::RequestError;
use serde::{Deserialize, Serialize};
use stamp_core::{StampKind, WirePosition};

/// Whether placements stamp a company seal or a personal signature
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StampMode {
    #[default]
    Seal,
    Signature,
}

impl StampMode {
    /// Type tag sent with a normal stamping request in this mode
    pub fn seal_type(self) -> SealType {
        match self {
            StampMode::Seal => SealType::Normal,
            StampMode::Signature => SealType::Signature,
        }
    }
}

impl From<StampKind> for StampMode {
    fn from(kind: StampKind) -> Self {
        match kind {
            StampKind::Seal => StampMode::Seal,
            StampKind::Signature => StampMode::Signature,
        }
    }
}

/// Backend tag selecting how a stamp is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum SealType {
    /// Ordinary seal at explicit positions
    Normal = 1,
    /// Riding-seam seal split across the page edges
    Perforation = 2,
    Signature = 3,
}

impl From<SealType> for u8 {
    fn from(t: SealType) -> u8 {
        t as u8
    }
}

impl TryFrom<u8> for SealType {
    type Error = RequestError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(SealType::Normal),
            2 => Ok(SealType::Perforation),
            3 => Ok(SealType::Signature),
            other => Err(RequestError::InvalidSealType(other)),
        }
    }
}

/// Who is performing the stamping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operator {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

impl Operator {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
        }
    }
}

/// One stamping request: a single stamp at one or more positions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractSealRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seal_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_id: Option<i64>,
    pub positions: Vec<WirePosition>,
    pub operator_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_name: Option<String>,
    pub seal_type: SealType,
}

impl ContractSealRequest {
    /// Empty request for a stamp in the given mode
    pub fn new(stamp_id: i64, mode: StampMode, operator: &Operator) -> Self {
        let (seal_id, signature_id) = match mode {
            StampMode::Seal => (Some(stamp_id), None),
            StampMode::Signature => (None, Some(stamp_id)),
        };

        Self {
            seal_id,
            signature_id,
            positions: Vec::new(),
            operator_id: operator.id,
            operator_name: operator.name.clone(),
            seal_type: mode.seal_type(),
        }
    }

    /// Id of the seal or signature being stamped
    pub fn stamp_id(&self) -> Option<i64> {
        self.seal_id.or(self.signature_id)
    }
}

fn default_perforation_size() -> f64 {
    120.0
}

/// Riding-seam seal across every page edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerforationSealRequest {
    pub seal_id: i64,
    pub operator_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_name: Option<String>,
    /// Vertical offset of the seal, in points
    #[serde(default)]
    pub y_offset: f64,
    #[serde(default = "default_perforation_size")]
    pub seal_width: f64,
    #[serde(default = "default_perforation_size")]
    pub seal_height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_margin: Option<f64>,
}

impl PerforationSealRequest {
    pub fn new(seal_id: i64, operator: &Operator) -> Self {
        Self {
            seal_id,
            operator_id: operator.id,
            operator_name: operator.name.clone(),
            y_offset: 0.0,
            seal_width: default_perforation_size(),
            seal_height: default_perforation_size(),
            edge_margin: None,
        }
    }
}

/// Backend response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub code: i32,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub success: Option<bool>,
}

impl<T> ApiResponse<T> {
    /// `success` when the backend sent it, otherwise `code == 200`
    pub fn is_success(&self) -> bool {
        self.success.unwrap_or(self.code == 200)
    }

    /// Message to show the user, if the backend sent a non-empty one
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.trim().is_empty())
    }

    /// Unwrap the payload of a successful response
    pub fn into_data(self) -> crate::Result<T> {
        if !self.is_success() {
            return Err(RequestError::Backend {
                code: self.code,
                message: self
                    .message()
                    .unwrap_or("Request rejected by server")
                    .to_string(),
            });
        }
        self.data
            .ok_or_else(|| RequestError::ParseError("Response has no data".to_string()))
    }
}

/// Payload returned by a stamping call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractSealResponse {
    pub contract_id: i64,
    #[serde(default)]
    pub signed_file_url: Option<String>,
    #[serde(default)]
    pub signed_file_path: Option<String>,
    #[serde(default)]
    pub seal_count: Option<u32>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_seal_request_json() {
        let mut request = ContractSealRequest::new(7, StampMode::Seal, &Operator::new(1, "admin"));
        request.positions.push(WirePosition {
            page_number: 1,
            x: 99.17,
            y: 652.55,
            width: 79.33,
            height: 84.2,
        });

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "sealId": 7,
                "positions": [
                    {"pageNumber": 1, "x": 99.17, "y": 652.55, "width": 79.33, "height": 84.2}
                ],
                "operatorId": 1,
                "operatorName": "admin",
                "sealType": 1
            })
        );
    }

    #[test]
    fn test_signature_request_json() {
        let request = ContractSealRequest::new(3, StampMode::Signature, &Operator::default());
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["signatureId"], json!(3));
        assert_eq!(value["sealType"], json!(3));
        assert!(value.get("sealId").is_none());
        assert!(value.get("operatorName").is_none());
        assert_eq!(request.stamp_id(), Some(3));
    }

    #[test]
    fn test_seal_type_rejects_unknown() {
        assert_eq!(serde_json::from_str::<SealType>("2").unwrap(), SealType::Perforation);
        assert!(serde_json::from_str::<SealType>("9").is_err());
    }

    #[test]
    fn test_perforation_defaults() {
        let request: PerforationSealRequest =
            serde_json::from_str(r#"{"sealId": 5, "operatorId": 2}"#).unwrap();

        assert_eq!(request.y_offset, 0.0);
        assert_eq!(request.seal_width, 120.0);
        assert_eq!(request.seal_height, 120.0);
        assert_eq!(request.edge_margin, None);
    }

    #[test]
    fn test_api_response_success() {
        let ok: ApiResponse<ContractSealResponse> = serde_json::from_str(
            r#"{"code": 200, "message": "ok", "data": {"contractId": 9, "sealCount": 2}}"#,
        )
        .unwrap();
        assert!(ok.is_success());
        assert_eq!(ok.into_data().unwrap().seal_count, Some(2));

        let flagged: ApiResponse<()> =
            serde_json::from_str(r#"{"code": 0, "success": true}"#).unwrap();
        assert!(flagged.is_success());
    }

    #[test]
    fn test_api_response_failure_message() {
        let failed: ApiResponse<ContractSealResponse> =
            serde_json::from_str(r#"{"code": 500, "message": "contract locked"}"#).unwrap();
        assert!(!failed.is_success());

        match failed.into_data() {
            Err(RequestError::Backend { code, message }) => {
                assert_eq!(code, 500);
                assert_eq!(message, "contract locked");
            }
            other => panic!("expected backend error, got {other:?}"),
        }

        let blank: ApiResponse<()> =
            serde_json::from_str(r#"{"code": 400, "message": "  "}"#).unwrap();
        assert_eq!(blank.message(), None);
    }
}

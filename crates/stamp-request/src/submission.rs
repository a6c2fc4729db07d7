//! Placement grouping and sequential submission

use crate::{
    ApiResponse, ContractSealRequest, ContractSealResponse, Operator, PerforationSealRequest,
    RequestError, Result, StampMode,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stamp_core::{to_wire_format, PageLayout, Placement};
use tracing::{info, warn};

/// Shown when the backend rejects a request without saying why
const FALLBACK_FAILURE: &str = "Stamping failed";

/// Partition placements by stamp id into one request per stamp.
///
/// Requests come out in order of each stamp's first placement; positions
/// keep placement order within a group. Each position is converted with
/// the geometry of its own page.
pub fn group_placements(
    placements: &[Placement],
    layout: &PageLayout,
    mode: StampMode,
    operator: &Operator,
) -> Vec<ContractSealRequest> {
    let mut requests: Vec<ContractSealRequest> = Vec::new();

    for placement in placements {
        let position = to_wire_format(placement, &layout.get(placement.page_number));
        let stamp_id = placement.stamp.id;

        match requests
            .iter_mut()
            .find(|r| r.stamp_id() == Some(stamp_id))
        {
            Some(request) => request.positions.push(position),
            None => {
                let mut request = ContractSealRequest::new(stamp_id, mode, operator);
                request.positions.push(position);
                requests.push(request);
            }
        }
    }

    requests
}

/// The backend that executes stamping
#[async_trait]
pub trait StampingBackend: Send + Sync {
    /// Stamp one seal or signature at the request's positions
    async fn seal_contract(
        &self,
        contract_id: i64,
        request: &ContractSealRequest,
    ) -> Result<ApiResponse<ContractSealResponse>>;

    /// Stamp a riding-seam seal across the document's page edges
    async fn seal_perforation(
        &self,
        contract_id: i64,
        request: &PerforationSealRequest,
    ) -> Result<ApiResponse<ContractSealResponse>>;
}

/// Result of a submission batch as reported to the workflow
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmissionOutcome {
    pub success: bool,
    pub message: String,
    /// Requests the backend accepted before the batch finished or aborted
    pub submitted: usize,
    /// Payloads of the accepted requests, in submission order
    pub responses: Vec<ContractSealResponse>,
}

impl SubmissionOutcome {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            ..Self::default()
        }
    }
}

/// Submit requests one after another, stopping at the first failure.
///
/// Never returns an error: transport and backend failures become an
/// unsuccessful outcome carrying the backend's message. Requests accepted
/// before the failure stay applied on the server.
pub async fn submit_all<B>(
    backend: &B,
    contract_id: i64,
    requests: &[ContractSealRequest],
) -> SubmissionOutcome
where
    B: StampingBackend + ?Sized,
{
    if requests.is_empty() {
        return SubmissionOutcome::failure(RequestError::NoPlacements.to_string());
    }

    let mut outcome = SubmissionOutcome::default();

    for (index, request) in requests.iter().enumerate() {
        info!(
            contract_id,
            stamp_id = ?request.stamp_id(),
            positions = request.positions.len(),
            "submitting stamping request {}/{}",
            index + 1,
            requests.len()
        );

        let failure = match backend.seal_contract(contract_id, request).await {
            Ok(response) if response.is_success() => {
                outcome.submitted += 1;
                if let Some(data) = response.data {
                    outcome.responses.push(data);
                }
                continue;
            }
            Ok(response) => response.message().unwrap_or(FALLBACK_FAILURE).to_string(),
            Err(err) => err.to_string(),
        };

        warn!(
            contract_id,
            submitted = outcome.submitted,
            remaining = requests.len() - index - 1,
            "stamping aborted: {failure}"
        );
        outcome.message = failure;
        return outcome;
    }

    info!(contract_id, requests = requests.len(), "stamping complete");
    outcome.success = true;
    outcome.message = "Stamping succeeded".to_string();
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use stamp_core::{PageGeometry, Rect, Size, StampItem, StampKind, A4_POINTS};

    fn stamp(id: i64) -> StampItem {
        StampItem {
            kind: StampKind::Seal,
            id,
            display_name: format!("seal {id}"),
            image_ref: String::new(),
            native_size: None,
        }
    }

    fn layout() -> PageLayout {
        PageLayout::new(PageGeometry::new(Size::new(595.0, 842.0), A4_POINTS))
    }

    #[test]
    fn test_groups_by_stamp_in_first_seen_order() {
        let placements = vec![
            Placement::new(stamp(2), 1, Rect::new(0.0, 0.0, 80.0, 80.0)),
            Placement::new(stamp(1), 1, Rect::new(100.0, 0.0, 80.0, 80.0)),
            Placement::new(stamp(2), 2, Rect::new(0.0, 100.0, 80.0, 80.0)),
            Placement::new(stamp(1), 3, Rect::new(100.0, 100.0, 80.0, 80.0)),
            Placement::new(stamp(2), 3, Rect::new(200.0, 200.0, 80.0, 80.0)),
        ];

        let requests = group_placements(&placements, &layout(), StampMode::Seal, &Operator::default());

        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].seal_id, Some(2));
        assert_eq!(requests[1].seal_id, Some(1));
        assert_eq!(
            requests[0].positions.iter().map(|p| p.page_number).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(
            requests.iter().map(|r| r.positions.len()).sum::<usize>(),
            placements.len()
        );
    }

    #[test]
    fn test_each_position_uses_its_page_geometry() {
        let mut layout = layout();
        layout.insert(2, PageGeometry::new(Size::new(600.0, 800.0), A4_POINTS));

        let placements = vec![
            Placement::new(stamp(1), 1, Rect::new(100.0, 100.0, 80.0, 80.0)),
            Placement::new(stamp(1), 2, Rect::new(100.0, 100.0, 80.0, 80.0)),
        ];
        let requests = group_placements(&placements, &layout, StampMode::Seal, &Operator::default());
        let positions = &requests[0].positions;

        assert_eq!((positions[0].x, positions[0].y), (100.0, 662.0));
        assert_eq!((positions[1].x, positions[1].y), (99.17, 652.55));
    }

    #[test]
    fn test_signature_mode_tags() {
        let placements = vec![Placement::new(stamp(5), 1, Rect::new(0.0, 0.0, 80.0, 80.0))];
        let requests = group_placements(
            &placements,
            &layout(),
            StampMode::Signature,
            &Operator::new(9, "clerk"),
        );

        assert_eq!(requests[0].seal_id, None);
        assert_eq!(requests[0].signature_id, Some(5));
        assert_eq!(requests[0].seal_type, crate::SealType::Signature);
        assert_eq!(requests[0].operator_name.as_deref(), Some("clerk"));
    }

    #[test]
    fn test_no_placements_no_requests() {
        let requests = group_placements(&[], &layout(), StampMode::Seal, &Operator::default());
        assert!(requests.is_empty());
    }
}

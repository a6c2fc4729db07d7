//! Four-step stamping wizard

use crate::engine::PlacementEngine;
use crate::{Result, WorkflowError};
use serde::{Deserialize, Serialize};
use stamp_core::{EditorConfig, StampItem};
use stamp_request::{
    ContractSealRequest, Operator, StampMode, StampingBackend, SubmissionOutcome,
};
use tracing::{info, warn};

/// Size picker range for seals: (min, max)
const SEAL_SIZE_RANGE: (f64, f64) = (40.0, 160.0);
/// Size picker range for signatures: (min, max)
const SIGNATURE_SIZE_RANGE: (f64, f64) = (30.0, 120.0);
const SIZE_STEP: f64 = 10.0;

/// Snap a requested stamp size onto the picker grid for `mode`
pub fn snap_stamp_size(mode: StampMode, size: f64) -> f64 {
    let (lo, hi) = match mode {
        StampMode::Seal => SEAL_SIZE_RANGE,
        StampMode::Signature => SIGNATURE_SIZE_RANGE,
    };
    if !size.is_finite() {
        return lo;
    }
    let steps = ((size.clamp(lo, hi) - lo) / SIZE_STEP).round();
    lo + steps * SIZE_STEP
}

/// Wizard steps, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkflowStep {
    SelectDocument,
    SelectStamp,
    PlacePosition,
    Result,
}

impl WorkflowStep {
    pub fn index(self) -> usize {
        self as usize
    }

    fn next(self) -> Option<Self> {
        match self {
            WorkflowStep::SelectDocument => Some(WorkflowStep::SelectStamp),
            WorkflowStep::SelectStamp => Some(WorkflowStep::PlacePosition),
            WorkflowStep::PlacePosition => Some(WorkflowStep::Result),
            WorkflowStep::Result => None,
        }
    }

    fn prev(self) -> Option<Self> {
        match self {
            WorkflowStep::SelectDocument => None,
            WorkflowStep::SelectStamp => Some(WorkflowStep::SelectDocument),
            WorkflowStep::PlacePosition => Some(WorkflowStep::SelectStamp),
            WorkflowStep::Result => Some(WorkflowStep::PlacePosition),
        }
    }
}

/// Contract document as served by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: i64,
    pub contract_name: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub original_url: String,
    #[serde(default)]
    pub signed_url: Option<String>,
    #[serde(default)]
    pub page_count: u32,
    /// 0 pending, 1 in progress, 2 stamped, 3 voided
    #[serde(default)]
    pub status: i32,
}

/// Wizard state shared across the four steps
#[derive(Debug, Clone)]
pub struct Workflow {
    step: WorkflowStep,
    document: Option<Contract>,
    engine: PlacementEngine,
    operator: Operator,
    outcome: Option<SubmissionOutcome>,
    error: Option<String>,
}

impl Workflow {
    pub fn new(config: EditorConfig, operator: Operator) -> Self {
        Self {
            step: WorkflowStep::SelectDocument,
            document: None,
            engine: PlacementEngine::new(config),
            operator,
            outcome: None,
            error: None,
        }
    }

    pub fn step(&self) -> WorkflowStep {
        self.step
    }

    pub fn document(&self) -> Option<&Contract> {
        self.document.as_ref()
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    pub fn engine(&self) -> &PlacementEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut PlacementEngine {
        &mut self.engine
    }

    pub fn selected_stamp(&self) -> Option<&StampItem> {
        self.engine.selected_stamp()
    }

    pub fn mode(&self) -> StampMode {
        self.engine.mode()
    }

    /// Outcome of the last submission
    pub fn outcome(&self) -> Option<&SubmissionOutcome> {
        self.outcome.as_ref()
    }

    /// Last user-facing error message
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Choose the contract to stamp. Switching contracts drops placements.
    pub fn select_document(&mut self, document: Option<Contract>) {
        let changed = self.document.as_ref().map(|d| d.id) != document.as_ref().map(|d| d.id);
        if changed {
            self.engine.discard_all();
            self.engine.reset_layout();
        }
        self.document = document;
        self.error = None;
    }

    pub fn set_mode(&mut self, mode: StampMode) {
        self.engine.set_mode(mode);
        let size = snap_stamp_size(mode, self.engine.stamp_size());
        self.engine.set_stamp_size(size);
    }

    pub fn select_stamp(&mut self, stamp: Option<StampItem>) {
        if let Some(stamp) = &stamp {
            self.set_mode(StampMode::from(stamp.kind));
        }
        self.engine.select_stamp(stamp);
        self.error = None;
    }

    /// Set the size of stamps placed from now on, snapped to the picker grid
    pub fn set_stamp_size(&mut self, size: f64) -> f64 {
        let snapped = snap_stamp_size(self.engine.mode(), size);
        self.engine.set_stamp_size(snapped);
        self.engine.stamp_size()
    }

    fn guard(&mut self, result: Result<WorkflowStep>) -> Result<WorkflowStep> {
        match &result {
            Ok(step) => {
                self.step = *step;
                self.error = None;
            }
            Err(err) => self.error = Some(err.to_string()),
        }
        result
    }

    /// Advance one step if the current step's selection is made
    pub fn go_next(&mut self) -> Result<WorkflowStep> {
        let result = match self.step {
            WorkflowStep::SelectDocument if self.document.is_none() => {
                Err(WorkflowError::MissingDocument)
            }
            WorkflowStep::SelectStamp if self.engine.selected_stamp().is_none() => {
                Err(WorkflowError::MissingStamp)
            }
            WorkflowStep::PlacePosition => Err(WorkflowError::SubmissionRequired),
            WorkflowStep::Result => Err(WorkflowError::Finished),
            step => step.next().ok_or(WorkflowError::Finished),
        };
        self.guard(result)
    }

    /// Go back one step; the first step stays put
    pub fn go_prev(&mut self) -> Result<WorkflowStep> {
        let result = match self.step {
            WorkflowStep::Result => Err(WorkflowError::Finished),
            step => Ok(step.prev().unwrap_or(step)),
        };
        self.guard(result)
    }

    /// Jump straight to an already completed step
    pub fn go_to(&mut self, target: WorkflowStep) -> Result<WorkflowStep> {
        let result = if self.step == WorkflowStep::Result {
            Err(WorkflowError::Finished)
        } else if target <= self.step {
            Ok(target)
        } else {
            Err(WorkflowError::StepNotReached(target))
        };
        self.guard(result)
    }

    /// Requests the host should send for the current placements
    pub fn build_requests(&self) -> Vec<ContractSealRequest> {
        self.engine.build_requests(&self.operator)
    }

    /// Record a finished submission.
    ///
    /// Success moves to the result step; failure keeps the user on the
    /// placement step with the message so they can retry.
    pub fn complete(&mut self, outcome: SubmissionOutcome) -> WorkflowStep {
        if outcome.success {
            info!(submitted = outcome.submitted, "stamping finished");
            self.engine.finish_submission();
            self.step = WorkflowStep::Result;
            self.error = None;
        } else {
            warn!(message = %outcome.message, "stamping failed");
            self.step = WorkflowStep::PlacePosition;
            self.error = Some(outcome.message.clone());
        }
        self.outcome = Some(outcome);
        self.step
    }

    /// Submit all placements for the selected contract.
    ///
    /// Only available on the placement step.
    pub async fn submit<B>(&mut self, backend: &B) -> Result<SubmissionOutcome>
    where
        B: StampingBackend + ?Sized,
    {
        let misplaced = match self.step {
            WorkflowStep::PlacePosition => None,
            WorkflowStep::Result => Some(WorkflowError::Finished),
            _ => Some(WorkflowError::StepNotReached(WorkflowStep::PlacePosition)),
        };
        if let Some(err) = misplaced {
            self.error = Some(err.to_string());
            return Err(err);
        }

        let Some(contract_id) = self.document.as_ref().map(|d| d.id) else {
            self.error = Some(WorkflowError::MissingDocument.to_string());
            return Err(WorkflowError::MissingDocument);
        };
        if self.engine.placement_count() == 0 {
            self.error = Some(WorkflowError::NoPlacements.to_string());
            return Err(WorkflowError::NoPlacements);
        }

        let outcome = self
            .engine
            .submit(backend, contract_id, &self.operator)
            .await;
        self.complete(outcome.clone());
        Ok(outcome)
    }

    /// Start over with nothing selected
    pub fn restart(&mut self) {
        self.engine.reset();
        self.step = WorkflowStep::SelectDocument;
        self.document = None;
        self.outcome = None;
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use stamp_core::StampKind;

    fn contract() -> Contract {
        serde_json::from_str(
            r#"{"id": 12, "contractName": "Lease", "fileName": "lease.pdf",
                "originalUrl": "/files/lease.pdf", "pageCount": 3, "status": 0}"#,
        )
        .unwrap()
    }

    fn stamp(kind: StampKind) -> StampItem {
        StampItem {
            kind,
            id: 1,
            display_name: "stamp".to_string(),
            image_ref: String::new(),
            native_size: None,
        }
    }

    fn workflow() -> Workflow {
        Workflow::new(EditorConfig::default(), Operator::new(1, "admin"))
    }

    #[test]
    fn test_snap_stamp_size() {
        assert_eq!(snap_stamp_size(StampMode::Seal, 80.0), 80.0);
        assert_eq!(snap_stamp_size(StampMode::Seal, 84.0), 80.0);
        assert_eq!(snap_stamp_size(StampMode::Seal, 10.0), 40.0);
        assert_eq!(snap_stamp_size(StampMode::Seal, 500.0), 160.0);
        assert_eq!(snap_stamp_size(StampMode::Signature, 200.0), 120.0);
        assert_eq!(snap_stamp_size(StampMode::Signature, f64::NAN), 30.0);
    }

    #[test]
    fn test_go_next_requires_document() {
        let mut wf = workflow();
        assert!(matches!(wf.go_next(), Err(WorkflowError::MissingDocument)));
        assert_eq!(wf.step(), WorkflowStep::SelectDocument);
        assert_eq!(wf.error(), Some("Please select a contract first"));

        wf.select_document(Some(contract()));
        assert_eq!(wf.go_next().unwrap(), WorkflowStep::SelectStamp);
        assert!(matches!(wf.go_next(), Err(WorkflowError::MissingStamp)));

        wf.select_stamp(Some(stamp(StampKind::Seal)));
        assert_eq!(wf.go_next().unwrap(), WorkflowStep::PlacePosition);
        assert!(matches!(wf.go_next(), Err(WorkflowError::SubmissionRequired)));
        assert_eq!(wf.step(), WorkflowStep::PlacePosition);
    }

    #[test]
    fn test_backward_and_jumps() {
        let mut wf = workflow();
        assert_eq!(wf.go_prev().unwrap(), WorkflowStep::SelectDocument);
        assert!(matches!(
            wf.go_to(WorkflowStep::PlacePosition),
            Err(WorkflowError::StepNotReached(WorkflowStep::PlacePosition))
        ));

        wf.select_document(Some(contract()));
        wf.go_next().unwrap();
        wf.select_stamp(Some(stamp(StampKind::Seal)));
        wf.go_next().unwrap();

        assert_eq!(wf.go_to(WorkflowStep::SelectDocument).unwrap(), WorkflowStep::SelectDocument);
        assert!(wf.go_to(WorkflowStep::SelectStamp).is_err());
        assert_eq!(wf.go_next().unwrap(), WorkflowStep::SelectStamp);
    }

    #[test]
    fn test_complete_failure_stays_on_placement() {
        let mut wf = workflow();
        wf.select_document(Some(contract()));
        wf.go_next().unwrap();
        wf.select_stamp(Some(stamp(StampKind::Seal)));
        wf.go_next().unwrap();

        let step = wf.complete(SubmissionOutcome::failure("contract locked"));
        assert_eq!(step, WorkflowStep::PlacePosition);
        assert_eq!(wf.error(), Some("contract locked"));

        let step = wf.complete(SubmissionOutcome {
            success: true,
            message: "Stamping succeeded".to_string(),
            submitted: 1,
            responses: vec![],
        });
        assert_eq!(step, WorkflowStep::Result);
        assert!(matches!(wf.go_prev(), Err(WorkflowError::Finished)));
        assert!(matches!(wf.go_to(WorkflowStep::SelectStamp), Err(WorkflowError::Finished)));
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut wf = workflow();
        wf.select_document(Some(contract()));
        wf.select_stamp(Some(stamp(StampKind::Signature)));
        wf.set_stamp_size(110.0);
        wf.complete(SubmissionOutcome {
            success: true,
            ..SubmissionOutcome::default()
        });

        wf.restart();
        assert_eq!(wf.step(), WorkflowStep::SelectDocument);
        assert!(wf.document().is_none());
        assert!(wf.selected_stamp().is_none());
        assert!(wf.outcome().is_none());
        assert_eq!(wf.mode(), StampMode::Seal);
        assert_eq!(wf.engine().stamp_size(), 80.0);
    }

    #[test]
    fn test_selecting_signature_switches_mode() {
        let mut wf = workflow();
        wf.select_stamp(Some(stamp(StampKind::Signature)));
        assert_eq!(wf.mode(), StampMode::Signature);
        assert_eq!(wf.set_stamp_size(135.0), 120.0);
    }
}

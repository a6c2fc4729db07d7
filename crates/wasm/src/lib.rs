//! WASM bindings for sealdesk
//!
//! This crate provides JavaScript-friendly API for:
//! - Placing, dragging and resizing stamps on rendered PDF pages
//! - Building stamping requests in PDF point space
//! - Driving the four-step stamping wizard
//!
//! The host renders pages and performs the HTTP calls itself; it reports
//! page sizes and pointer events in and sends the request bodies it gets
//! back.
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! import init, { StampWorkflow } from 'sealdesk-wasm';
//!
//! await init();
//!
//! const wf = new StampWorkflow(null, user.id, user.name);
//! wf.selectDocument(contract);
//! wf.goNext();
//! wf.selectSeal(seal);
//! wf.goNext();
//!
//! wf.setPageGeometry(1, canvas.width, canvas.height, null, null);
//! wf.pointerDown(1, event.offsetX, event.offsetY);
//!
//! for (const body of wf.buildRequests()) {
//!   await fetch(`/api/contracts/${contract.id}/seal`, { method: 'POST', body: JSON.stringify(body) });
//! }
//! wf.complete({ success: true, message: 'ok', submitted: 1 });
//! ```

use serde::Serialize;
use stamp_core::{
    EditorConfig, InteractionOutcome, PlacementChanges, PlacementId, Point, Seal, Signature, Size,
    StampItem,
};
use stamp_request::{Operator, StampMode, SubmissionOutcome};
use stamp_workflow::{Contract, PlacementEngine, Workflow, WorkflowStep};
use wasm_bindgen::prelude::*;

// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error<E: std::fmt::Display>(err: E) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(js_error)
}

fn parse_config(config_json: Option<String>) -> Result<EditorConfig, JsValue> {
    match config_json {
        Some(json) => EditorConfig::from_json(&json).map_err(js_error),
        None => Ok(EditorConfig::default()),
    }
}

fn parse_id(id: &str) -> Result<PlacementId, JsValue> {
    PlacementId::parse(id).ok_or_else(|| js_error(format!("Invalid placement id: {id}")))
}

/// Interaction result as seen from JavaScript
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct OutcomeView {
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    handle: Option<stamp_core::ResizeHandle>,
}

impl From<InteractionOutcome> for OutcomeView {
    fn from(outcome: InteractionOutcome) -> Self {
        let (kind, id, handle) = match outcome {
            InteractionOutcome::Placed(id) => ("placed", Some(id), None),
            InteractionOutcome::DragStarted(id) => ("dragStarted", Some(id), None),
            InteractionOutcome::ResizeStarted(id, h) => ("resizeStarted", Some(id), Some(h)),
            InteractionOutcome::Moved(id) => ("moved", Some(id), None),
            InteractionOutcome::Resized(id) => ("resized", Some(id), None),
            InteractionOutcome::GestureEnded(id) => ("gestureEnded", Some(id), None),
            InteractionOutcome::GestureTerminated(id) => ("gestureTerminated", Some(id), None),
            InteractionOutcome::ClickSuppressed => ("clickSuppressed", None, None),
            InteractionOutcome::Removed(id) => ("removed", Some(id), None),
            InteractionOutcome::Ignored => ("ignored", None, None),
        };
        Self {
            kind,
            id: id.map(|id| id.to_string()),
            handle,
        }
    }
}

/// Engine operations shared by both exported classes
mod ops {
    use super::*;

    pub fn set_page_geometry(
        engine: &mut PlacementEngine,
        page: u32,
        pixel_width: f64,
        pixel_height: f64,
        point_width: Option<f64>,
        point_height: Option<f64>,
    ) -> bool {
        let points = match (point_width, point_height) {
            (Some(w), Some(h)) => Some(Size::new(w, h)),
            _ => None,
        };
        engine.set_page_geometry(page, Size::new(pixel_width, pixel_height), points)
    }

    pub fn outcome(outcome: InteractionOutcome) -> Result<JsValue, JsValue> {
        to_js(&OutcomeView::from(outcome))
    }

    pub fn update_placement(
        engine: &mut PlacementEngine,
        id: &str,
        changes: JsValue,
    ) -> Result<bool, JsValue> {
        let id = parse_id(id)?;
        let changes: PlacementChanges = serde_wasm_bindgen::from_value(changes)?;
        Ok(engine.update_placement(id, changes))
    }

    pub fn placements(engine: &PlacementEngine, page: Option<u32>) -> Result<JsValue, JsValue> {
        match page {
            Some(page) => to_js(&engine.placements_on(page)),
            None => to_js(engine.placements()),
        }
    }
}

/// Standalone placement editor
#[wasm_bindgen]
pub struct StampEditor {
    engine: PlacementEngine,
}

#[wasm_bindgen]
impl StampEditor {
    /// Create an editor
    ///
    /// @param configJson - Optional EditorConfig JSON, defaults when null
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<StampEditor, JsValue> {
        Ok(StampEditor {
            engine: PlacementEngine::new(parse_config(config_json)?),
        })
    }

    /// Report a page's rendered size and, when known, its size in points.
    ///
    /// Returns `false` when the rendered size is empty or not finite.
    #[wasm_bindgen(js_name = setPageGeometry)]
    pub fn set_page_geometry(
        &mut self,
        page: u32,
        pixel_width: f64,
        pixel_height: f64,
        point_width: Option<f64>,
        point_height: Option<f64>,
    ) -> bool {
        ops::set_page_geometry(
            &mut self.engine,
            page,
            pixel_width,
            pixel_height,
            point_width,
            point_height,
        )
    }

    /// Select a stamp item (or null to deselect)
    #[wasm_bindgen(js_name = selectStamp)]
    pub fn select_stamp(&mut self, stamp: JsValue) -> Result<(), JsValue> {
        let stamp: Option<StampItem> = serde_wasm_bindgen::from_value(stamp)?;
        self.engine.select_stamp(stamp);
        Ok(())
    }

    #[wasm_bindgen(js_name = stampSize)]
    pub fn stamp_size(&self) -> f64 {
        self.engine.stamp_size()
    }

    #[wasm_bindgen(js_name = setStampSize)]
    pub fn set_stamp_size(&mut self, size: f64) -> f64 {
        self.engine.set_stamp_size(size);
        self.engine.stamp_size()
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, page: u32, x: f64, y: f64) -> Result<JsValue, JsValue> {
        ops::outcome(self.engine.pointer_down(page, Point::new(x, y)))
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Result<JsValue, JsValue> {
        ops::outcome(self.engine.pointer_move(Point::new(x, y)))
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self) -> Result<JsValue, JsValue> {
        ops::outcome(self.engine.pointer_up())
    }

    pub fn click(&mut self) -> Result<JsValue, JsValue> {
        ops::outcome(self.engine.click())
    }

    /// All placements, or those on one page
    pub fn placements(&self, page: Option<u32>) -> Result<JsValue, JsValue> {
        ops::placements(&self.engine, page)
    }

    #[wasm_bindgen(js_name = placementCount)]
    pub fn placement_count(&self) -> usize {
        self.engine.placement_count()
    }

    #[wasm_bindgen(js_name = updatePlacement)]
    pub fn update_placement(&mut self, id: &str, changes: JsValue) -> Result<bool, JsValue> {
        ops::update_placement(&mut self.engine, id, changes)
    }

    #[wasm_bindgen(js_name = removePlacement)]
    pub fn remove_placement(&mut self, id: &str) -> Result<bool, JsValue> {
        Ok(self.engine.remove_placement(parse_id(id)?))
    }

    #[wasm_bindgen(js_name = clearAll)]
    pub fn clear_all(&mut self) {
        self.engine.clear_all();
    }

    pub fn undo(&mut self) -> bool {
        self.engine.undo()
    }

    /// Stamping request bodies, one per stamp
    #[wasm_bindgen(js_name = buildRequests)]
    pub fn build_requests(
        &self,
        operator_id: i64,
        operator_name: Option<String>,
    ) -> Result<JsValue, JsValue> {
        let operator = Operator {
            id: operator_id,
            name: operator_name,
        };
        to_js(&self.engine.build_requests(&operator))
    }

    /// Drop placements once the host has submitted them
    #[wasm_bindgen(js_name = finishSubmission)]
    pub fn finish_submission(&mut self) {
        self.engine.finish_submission();
    }
}

/// Page sizes in points for a PDF
///
/// @param data - PDF file bytes (Uint8Array)
/// @returns Array of { width, height }
#[wasm_bindgen(js_name = pagePointSizes)]
pub fn page_point_sizes(data: &[u8]) -> Result<JsValue, JsValue> {
    let sizes = stamp_core::page_point_sizes(data, stamp_core::A4_POINTS).map_err(js_error)?;
    to_js(&sizes)
}

/// The four-step stamping wizard
#[wasm_bindgen]
pub struct StampWorkflow {
    inner: Workflow,
}

#[wasm_bindgen]
impl StampWorkflow {
    #[wasm_bindgen(constructor)]
    pub fn new(
        config_json: Option<String>,
        operator_id: i64,
        operator_name: Option<String>,
    ) -> Result<StampWorkflow, JsValue> {
        let operator = Operator {
            id: operator_id,
            name: operator_name,
        };
        Ok(StampWorkflow {
            inner: Workflow::new(parse_config(config_json)?, operator),
        })
    }

    /// Current step name, e.g. "selectDocument"
    pub fn step(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.step())
    }

    #[wasm_bindgen(js_name = stepIndex)]
    pub fn step_index(&self) -> usize {
        self.inner.step().index()
    }

    /// Last user-facing error message
    pub fn error(&self) -> Option<String> {
        self.inner.error().map(str::to_string)
    }

    #[wasm_bindgen(js_name = selectDocument)]
    pub fn select_document(&mut self, contract: JsValue) -> Result<(), JsValue> {
        let contract: Option<Contract> = serde_wasm_bindgen::from_value(contract)?;
        self.inner.select_document(contract);
        Ok(())
    }

    /// Switch between "seal" and "signature"
    #[wasm_bindgen(js_name = setMode)]
    pub fn set_mode(&mut self, mode: JsValue) -> Result<(), JsValue> {
        let mode: StampMode = serde_wasm_bindgen::from_value(mode)?;
        self.inner.set_mode(mode);
        Ok(())
    }

    #[wasm_bindgen(js_name = selectSeal)]
    pub fn select_seal(&mut self, seal: JsValue) -> Result<(), JsValue> {
        let seal: Seal = serde_wasm_bindgen::from_value(seal)?;
        self.inner.select_stamp(Some(StampItem::from_seal(&seal)));
        Ok(())
    }

    #[wasm_bindgen(js_name = selectSignature)]
    pub fn select_signature(&mut self, signature: JsValue) -> Result<(), JsValue> {
        let signature: Signature = serde_wasm_bindgen::from_value(signature)?;
        self.inner
            .select_stamp(Some(StampItem::from_signature(&signature)));
        Ok(())
    }

    #[wasm_bindgen(js_name = clearStamp)]
    pub fn clear_stamp(&mut self) {
        self.inner.select_stamp(None);
    }

    /// Set the placement size, snapped to the size picker grid
    #[wasm_bindgen(js_name = setStampSize)]
    pub fn set_stamp_size(&mut self, size: f64) -> f64 {
        self.inner.set_stamp_size(size)
    }

    #[wasm_bindgen(js_name = goNext)]
    pub fn go_next(&mut self) -> Result<JsValue, JsValue> {
        let step = self.inner.go_next().map_err(js_error)?;
        to_js(&step)
    }

    #[wasm_bindgen(js_name = goPrev)]
    pub fn go_prev(&mut self) -> Result<JsValue, JsValue> {
        let step = self.inner.go_prev().map_err(js_error)?;
        to_js(&step)
    }

    #[wasm_bindgen(js_name = goTo)]
    pub fn go_to(&mut self, step: JsValue) -> Result<JsValue, JsValue> {
        let target: WorkflowStep = serde_wasm_bindgen::from_value(step)?;
        let step = self.inner.go_to(target).map_err(js_error)?;
        to_js(&step)
    }

    #[wasm_bindgen(js_name = setPageGeometry)]
    pub fn set_page_geometry(
        &mut self,
        page: u32,
        pixel_width: f64,
        pixel_height: f64,
        point_width: Option<f64>,
        point_height: Option<f64>,
    ) -> bool {
        ops::set_page_geometry(
            self.inner.engine_mut(),
            page,
            pixel_width,
            pixel_height,
            point_width,
            point_height,
        )
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, page: u32, x: f64, y: f64) -> Result<JsValue, JsValue> {
        ops::outcome(self.inner.engine_mut().pointer_down(page, Point::new(x, y)))
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Result<JsValue, JsValue> {
        ops::outcome(self.inner.engine_mut().pointer_move(Point::new(x, y)))
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self) -> Result<JsValue, JsValue> {
        ops::outcome(self.inner.engine_mut().pointer_up())
    }

    pub fn click(&mut self) -> Result<JsValue, JsValue> {
        ops::outcome(self.inner.engine_mut().click())
    }

    pub fn placements(&self, page: Option<u32>) -> Result<JsValue, JsValue> {
        ops::placements(self.inner.engine(), page)
    }

    #[wasm_bindgen(js_name = placementCount)]
    pub fn placement_count(&self) -> usize {
        self.inner.engine().placement_count()
    }

    /// Number of distinct pages carrying a placement
    #[wasm_bindgen(js_name = pageCount)]
    pub fn page_count(&self) -> usize {
        self.inner.engine().page_count()
    }

    #[wasm_bindgen(js_name = updatePlacement)]
    pub fn update_placement(&mut self, id: &str, changes: JsValue) -> Result<bool, JsValue> {
        ops::update_placement(self.inner.engine_mut(), id, changes)
    }

    #[wasm_bindgen(js_name = removePlacement)]
    pub fn remove_placement(&mut self, id: &str) -> Result<bool, JsValue> {
        Ok(self.inner.engine_mut().remove_placement(parse_id(id)?))
    }

    #[wasm_bindgen(js_name = clearAll)]
    pub fn clear_all(&mut self) {
        self.inner.engine_mut().clear_all();
    }

    pub fn undo(&mut self) -> bool {
        self.inner.engine_mut().undo()
    }

    /// Request bodies to POST, rejected when nothing is placed
    #[wasm_bindgen(js_name = buildRequests)]
    pub fn build_requests(&self) -> Result<JsValue, JsValue> {
        if self.inner.document().is_none() {
            return Err(js_error(stamp_workflow::WorkflowError::MissingDocument));
        }
        let requests = self.inner.build_requests();
        if requests.is_empty() {
            return Err(js_error(stamp_workflow::WorkflowError::NoPlacements));
        }
        to_js(&requests)
    }

    /// Report the result of the host's submission
    ///
    /// @param outcome - { success, message, submitted }
    /// @returns the step the wizard moved to
    pub fn complete(&mut self, outcome: JsValue) -> Result<JsValue, JsValue> {
        let outcome: SubmissionOutcome = serde_wasm_bindgen::from_value(outcome)?;
        to_js(&self.inner.complete(outcome))
    }

    pub fn restart(&mut self) {
        self.inner.restart();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_outcome_view() {
        let id = PlacementId::new();
        let view = OutcomeView::from(InteractionOutcome::Placed(id));
        assert_eq!(view.kind, "placed");
        assert_eq!(view.id, Some(id.to_string()));

        let view = OutcomeView::from(InteractionOutcome::Ignored);
        assert_eq!(view.kind, "ignored");
        assert_eq!(view.id, None);
    }

    #[wasm_bindgen_test]
    fn test_editor_sizes() {
        let mut editor = StampEditor::new(None).unwrap();
        assert_eq!(editor.stamp_size(), 80.0);
        assert_eq!(editor.set_stamp_size(500.0), 200.0);
        assert_eq!(editor.placement_count(), 0);
        assert!(!editor.undo());
    }

    #[wasm_bindgen_test]
    fn test_workflow_size_snapping() {
        let mut wf = StampWorkflow::new(None, 1, Some("admin".to_string())).unwrap();
        assert_eq!(wf.step_index(), 0);
        assert_eq!(wf.set_stamp_size(87.0), 90.0);
        assert_eq!(wf.error(), None);
    }
}

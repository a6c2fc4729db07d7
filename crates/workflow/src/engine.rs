//! Placement engine

use crate::history::History;
use stamp_core::{
    constrain_rect, EditorConfig, Interaction, InteractionOutcome, InteractionState,
    PageGeometry, PageLayout, Placement, PlacementChanges, PlacementId, PlacementStore, Point,
    Rect, Size, StampItem,
};
use stamp_request::{
    group_placements, submit_all, ContractSealRequest, Operator, RequestError, StampMode,
    StampingBackend, SubmissionOutcome,
};
use tracing::{debug, warn};

/// Everything the placement step needs, behind one owner
#[derive(Debug, Clone)]
pub struct PlacementEngine {
    config: EditorConfig,
    store: PlacementStore,
    interaction: Interaction,
    layout: PageLayout,
    history: History,
    /// Placements as they were when the current gesture started
    pending: Option<Vec<Placement>>,
    mode: StampMode,
}

impl Default for PlacementEngine {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl PlacementEngine {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            store: PlacementStore::new(),
            interaction: Interaction::new(config.clone()),
            layout: PageLayout::new(config.fallback_geometry()),
            history: History::new(config.history_limit),
            pending: None,
            mode: StampMode::default(),
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn mode(&self) -> StampMode {
        self.mode
    }

    /// Switch between seals and signatures.
    ///
    /// Placements of the other kind cannot be submitted together, so a
    /// switch drops them along with the selection.
    pub fn set_mode(&mut self, mode: StampMode) {
        if mode == self.mode {
            return;
        }
        debug!(?mode, dropped = self.store.len(), "stamp mode switched");
        self.mode = mode;
        self.discard_all();
        self.interaction.select_stamp(None);
    }

    pub fn selected_stamp(&self) -> Option<&StampItem> {
        self.interaction.selected_stamp()
    }

    /// Select the stamp to place; its kind decides the mode
    pub fn select_stamp(&mut self, stamp: Option<StampItem>) {
        if let Some(stamp) = &stamp {
            self.set_mode(StampMode::from(stamp.kind));
        }
        self.interaction.select_stamp(stamp);
    }

    pub fn stamp_size(&self) -> f64 {
        self.interaction.stamp_size()
    }

    pub fn set_stamp_size(&mut self, size: f64) {
        self.interaction.set_stamp_size(size);
    }

    pub fn interaction_state(&self) -> InteractionState {
        self.interaction.state()
    }

    pub fn placements(&self) -> &[Placement] {
        self.store.all()
    }

    pub fn placements_on(&self, page: u32) -> Vec<&Placement> {
        self.store.by_page(page).collect()
    }

    pub fn placement_count(&self) -> usize {
        self.store.len()
    }

    /// Distinct pages carrying at least one placement
    pub fn page_count(&self) -> usize {
        self.store.page_count()
    }

    pub fn page_geometry(&self, page: u32) -> PageGeometry {
        self.layout.get(page)
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    /// Record a page's rendered size and, when known, its size in points.
    ///
    /// When the rendered size changes (zoom, window resize) the page's
    /// placements are scaled with it, then clamped back into the size range
    /// and the page. Undo snapshots are rescaled the same way.
    ///
    /// Returns `false` and leaves the page untouched when `pixels` is empty
    /// or not finite.
    pub fn set_page_geometry(&mut self, page: u32, pixels: Size, points: Option<Size>) -> bool {
        if !pixels.is_usable() {
            warn!(page, ?pixels, "ignoring unusable rendered page size");
            return false;
        }

        let previous = self.layout.get(page).pixel_size();
        let geometry =
            PageGeometry::with_fallback(pixels, points, self.config.default_page_size);
        self.layout.insert(page, geometry);

        if previous != pixels && previous.is_usable() {
            if self
                .interaction
                .state()
                .active_placement()
                .and_then(|id| self.store.get(id))
                .is_some_and(|p| p.page_number == page)
            {
                self.interaction.cancel_gesture();
                self.commit_gesture();
            }

            let scale_x = pixels.width / previous.width;
            let scale_y = pixels.height / previous.height;
            let config = &self.config;
            let fit = |p: &mut Placement| {
                let scaled = Rect::new(
                    p.x * scale_x,
                    p.y * scale_y,
                    p.width * scale_x,
                    p.height * scale_y,
                );
                let rect = constrain_rect(scaled, &p.stamp, config, pixels);
                p.set_rect(rect);
            };
            self.store.for_each_on_page(page, fit);
            self.history.for_each_on_page(page, fit);
            debug!(page, scale_x, scale_y, "page re-rendered, placements rescaled");
        }
        true
    }

    /// Forget all page geometry, e.g. when another document is loaded
    pub fn reset_layout(&mut self) {
        self.layout.clear();
    }

    fn bounds(&self, page: u32) -> Size {
        self.layout.get(page).pixel_size()
    }

    pub fn pointer_down(&mut self, page: u32, point: Point) -> InteractionOutcome {
        let before = self.store.snapshot();
        let bounds = self.bounds(page);
        let outcome = self
            .interaction
            .pointer_down(&mut self.store, page, bounds, point);

        match outcome {
            InteractionOutcome::Placed(_) => self.history.push(before),
            InteractionOutcome::DragStarted(_) | InteractionOutcome::ResizeStarted(..) => {
                self.pending = Some(before);
            }
            _ => {}
        }
        outcome
    }

    pub fn pointer_move(&mut self, point: Point) -> InteractionOutcome {
        let outcome = self.interaction.pointer_move(&mut self.store, point);
        if let InteractionOutcome::GestureTerminated(_) = outcome {
            self.commit_gesture();
        }
        outcome
    }

    pub fn pointer_up(&mut self) -> InteractionOutcome {
        let outcome = self.interaction.pointer_up();
        self.commit_gesture();
        outcome
    }

    /// Record the finished gesture as one undo step, if it changed anything
    fn commit_gesture(&mut self) {
        if let Some(before) = self.pending.take() {
            if before.as_slice() != self.store.all() {
                self.history.push(before);
            }
        }
    }

    pub fn click(&mut self) -> InteractionOutcome {
        self.interaction.click()
    }

    /// Place the selected stamp centred at `center` on `page`
    pub fn add_placement(&mut self, page: u32, center: Point) -> Option<PlacementId> {
        let before = self.store.snapshot();
        let bounds = self.bounds(page);
        let id = self
            .interaction
            .place_at(&mut self.store, page, bounds, center)?;
        self.history.push(before);
        Some(id)
    }

    /// Merge changes into a placement, then clamp it to its page.
    ///
    /// Returns `false` for an unknown id.
    pub fn update_placement(&mut self, id: PlacementId, changes: PlacementChanges) -> bool {
        let Some(current) = self.store.get(id) else {
            return false;
        };

        let page = changes.page_number.unwrap_or(current.page_number);
        let rect = Rect::new(
            changes.x.unwrap_or(current.x),
            changes.y.unwrap_or(current.y),
            changes.width.unwrap_or(current.width),
            changes.height.unwrap_or(current.height),
        );
        let rect = constrain_rect(rect, &current.stamp, &self.config, self.bounds(page));

        self.history.push(self.store.snapshot());
        self.store.update_by_id(
            id,
            PlacementChanges {
                page_number: Some(page),
                ..PlacementChanges::rect(rect)
            },
        )
    }

    /// Delete a placement. Refused while a gesture is active.
    pub fn remove_placement(&mut self, id: PlacementId) -> bool {
        let before = self.store.snapshot();
        match self.interaction.remove(&mut self.store, id) {
            InteractionOutcome::Removed(_) => {
                self.history.push(before);
                true
            }
            _ => false,
        }
    }

    pub fn clear_all(&mut self) {
        if self.store.is_empty() {
            return;
        }
        self.interaction.cancel_gesture();
        self.commit_gesture();
        self.history.push(self.store.snapshot());
        self.store.clear();
    }

    /// Drop every placement without leaving an undo step, e.g. when the
    /// placements belong to a document that is no longer open
    pub fn discard_all(&mut self) {
        self.interaction.cancel_gesture();
        self.pending = None;
        self.store.clear();
        self.history.clear();
    }

    /// Restore the placements as they were before the last change
    pub fn undo(&mut self) -> bool {
        if self.interaction.state().is_gesture() {
            return false;
        }
        match self.history.pop() {
            Some(snapshot) => {
                self.store.restore(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    /// Stamping requests for the current placements, one per stamp
    pub fn build_requests(&self, operator: &Operator) -> Vec<ContractSealRequest> {
        group_placements(self.store.all(), &self.layout, self.mode, operator)
    }

    /// Submit every placement, clearing them once all requests succeed.
    ///
    /// With nothing placed this resolves to a failure without contacting
    /// the backend.
    pub async fn submit<B>(
        &mut self,
        backend: &B,
        contract_id: i64,
        operator: &Operator,
    ) -> SubmissionOutcome
    where
        B: StampingBackend + ?Sized,
    {
        if self.store.is_empty() {
            return SubmissionOutcome::failure(RequestError::NoPlacements.to_string());
        }

        let requests = self.build_requests(operator);
        let outcome = submit_all(backend, contract_id, &requests).await;
        if outcome.success {
            self.finish_submission();
        }
        outcome
    }

    /// Drop placements after the backend accepted them
    pub fn finish_submission(&mut self) {
        self.discard_all();
    }

    /// Back to a fresh engine, keeping the configuration
    pub fn reset(&mut self) {
        *self = Self::new(self.config.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use stamp_core::StampKind;

    fn seal(id: i64) -> StampItem {
        StampItem {
            kind: StampKind::Seal,
            id,
            display_name: format!("seal {id}"),
            image_ref: String::new(),
            native_size: None,
        }
    }

    fn engine_with_seal() -> PlacementEngine {
        let mut engine = PlacementEngine::default();
        engine.set_page_geometry(1, Size::new(600.0, 800.0), Some(Size::new(595.0, 842.0)));
        engine.select_stamp(Some(seal(1)));
        engine
    }

    #[test]
    fn test_add_and_undo() {
        let mut engine = engine_with_seal();
        let id = engine.add_placement(1, Point::new(50.0, 50.0)).unwrap();
        assert_eq!(engine.placements()[0].id, id);

        assert!(engine.undo());
        assert_eq!(engine.placement_count(), 0);
        assert!(!engine.undo());
    }

    #[test]
    fn test_undo_reverts_drag() {
        let mut engine = engine_with_seal();
        engine.pointer_down(1, Point::new(50.0, 50.0));
        engine.pointer_down(1, Point::new(50.0, 50.0));
        engine.pointer_move(Point::new(150.0, 150.0));
        assert!(!engine.undo(), "undo refused mid-gesture");
        engine.pointer_up();
        engine.click();

        assert_eq!(engine.placements()[0].x, 110.0);
        assert!(engine.undo());
        assert_eq!(engine.placements()[0].x, 10.0);
    }

    #[test]
    fn test_update_placement_is_clamped() {
        let mut engine = engine_with_seal();
        let id = engine.add_placement(1, Point::new(50.0, 50.0)).unwrap();

        let changes = PlacementChanges {
            x: Some(590.0),
            width: Some(500.0),
            ..PlacementChanges::default()
        };
        assert!(engine.update_placement(id, changes));

        let p = &engine.placements()[0];
        assert_eq!(p.rect(), Rect::new(400.0, 10.0, 200.0, 80.0));
        assert!(!engine.update_placement(PlacementId::new(), changes));
    }

    #[test]
    fn test_update_moves_between_pages() {
        let mut engine = engine_with_seal();
        engine.set_page_geometry(2, Size::new(300.0, 400.0), None);
        let id = engine.add_placement(1, Point::new(500.0, 700.0)).unwrap();

        let changes = PlacementChanges {
            page_number: Some(2),
            ..PlacementChanges::default()
        };
        engine.update_placement(id, changes);

        let p = &engine.placements()[0];
        assert_eq!(p.page_number, 2);
        assert_eq!((p.x, p.y), (220.0, 320.0));
    }

    #[test]
    fn test_zoom_rescales_page() {
        let mut engine = engine_with_seal();
        engine.add_placement(1, Point::new(140.0, 140.0));
        let before = stamp_core::to_wire_format(&engine.placements()[0], &engine.page_geometry(1));

        engine.set_page_geometry(1, Size::new(1200.0, 1600.0), Some(Size::new(595.0, 842.0)));

        let p = &engine.placements()[0];
        assert_eq!(p.rect(), Rect::new(200.0, 200.0, 160.0, 160.0));
        let after = stamp_core::to_wire_format(p, &engine.page_geometry(1));
        assert_eq!(before, after);
    }

    #[test]
    fn test_zoom_keeps_size_range() {
        let mut engine = engine_with_seal();
        engine.add_placement(1, Point::new(50.0, 50.0));

        engine.set_page_geometry(1, Size::new(1800.0, 2400.0), Some(Size::new(595.0, 842.0)));
        assert_eq!(engine.placements()[0].rect(), Rect::new(30.0, 30.0, 200.0, 200.0));

        // Shrinking from the bottom-right corner starts from the clamped size
        engine.pointer_down(1, Point::new(230.0, 230.0));
        engine.pointer_move(Point::new(220.0, 231.0));
        engine.pointer_up();
        assert_eq!(engine.placements()[0].rect(), Rect::new(30.0, 30.0, 190.0, 190.0));
    }

    #[test]
    fn test_zoom_rescales_undo_snapshots() {
        let mut engine = engine_with_seal();
        engine.add_placement(1, Point::new(50.0, 50.0));
        engine.pointer_down(1, Point::new(50.0, 50.0));
        engine.pointer_move(Point::new(150.0, 150.0));
        engine.pointer_up();

        engine.set_page_geometry(1, Size::new(1200.0, 1600.0), Some(Size::new(595.0, 842.0)));
        assert_eq!(engine.placements()[0].rect(), Rect::new(220.0, 220.0, 160.0, 160.0));

        assert!(engine.undo());
        assert_eq!(engine.placements()[0].rect(), Rect::new(20.0, 20.0, 160.0, 160.0));
    }

    #[test]
    fn test_unusable_page_size_is_ignored() {
        let mut engine = engine_with_seal();
        engine.add_placement(1, Point::new(50.0, 50.0));

        assert!(!engine.set_page_geometry(1, Size::new(0.0, 0.0), None));
        assert!(!engine.set_page_geometry(1, Size::new(f64::NAN, 800.0), None));
        assert!(!engine.set_page_geometry(2, Size::new(600.0, f64::INFINITY), None));
        assert_eq!(engine.page_geometry(1).pixel_size(), Size::new(600.0, 800.0));
        assert_eq!(engine.placements()[0].rect(), Rect::new(10.0, 10.0, 80.0, 80.0));

        engine.add_placement(2, Point::new(50.0, 50.0));
        let requests = engine.build_requests(&Operator::default());
        for position in &requests[0].positions {
            assert!(position.x.is_finite() && position.y.is_finite());
            assert!(position.width > 0.0 && position.height > 0.0);
        }
    }

    #[test]
    fn test_untouched_gesture_leaves_no_undo_step() {
        let mut engine = engine_with_seal();
        engine.add_placement(1, Point::new(50.0, 50.0));

        // Press and release on the placement without moving it
        engine.pointer_down(1, Point::new(50.0, 50.0));
        engine.pointer_up();
        engine.click();

        assert!(engine.undo());
        assert_eq!(engine.placement_count(), 0);
        assert!(!engine.can_undo());
    }

    #[test]
    fn test_discard_all_leaves_nothing_to_undo() {
        let mut engine = engine_with_seal();
        engine.add_placement(1, Point::new(50.0, 50.0));
        engine.add_placement(1, Point::new(300.0, 300.0));

        engine.discard_all();
        assert_eq!(engine.placement_count(), 0);
        assert!(!engine.can_undo());
        assert!(!engine.undo());
    }

    #[test]
    fn test_mode_switch_clears() {
        let mut engine = engine_with_seal();
        engine.add_placement(1, Point::new(50.0, 50.0));

        engine.set_mode(StampMode::Signature);
        assert_eq!(engine.placement_count(), 0);
        assert!(engine.selected_stamp().is_none());
        assert!(!engine.can_undo());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut engine = engine_with_seal();
        let a = engine.add_placement(1, Point::new(50.0, 50.0)).unwrap();
        engine.add_placement(2, Point::new(50.0, 50.0));
        assert_eq!(engine.page_count(), 2);

        assert!(engine.remove_placement(a));
        assert!(!engine.remove_placement(a));
        engine.clear_all();
        assert_eq!(engine.placement_count(), 0);

        assert!(engine.undo());
        assert_eq!(engine.placement_count(), 1);
    }

    #[test]
    fn test_build_requests_uses_mode() {
        let mut engine = engine_with_seal();
        engine.add_placement(1, Point::new(50.0, 50.0));

        let requests = engine.build_requests(&Operator::new(1, "admin"));
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].seal_id, Some(1));
        assert_eq!(requests[0].positions.len(), 1);
    }
}

//! Pointer-driven placement, drag and resize
//!
//! [`Interaction`] turns a stream of pointer events into placement store
//! mutations. It owns no placements itself; the caller passes the store in
//! with every event so the store stays the single source of truth.
//!
//! Pointer coordinates are pixels relative to the top-left corner of the
//! page the gesture started on. Geometry is never rejected: every result is
//! clamped so the placement stays on the page and within the configured size
//! range.

use crate::config::EditorConfig;
use crate::geometry::{clamp_origin, Point, Rect, Size};
use crate::placement::{Placement, PlacementChanges, PlacementId, PlacementStore};
use crate::stamp::StampItem;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Corner handle used to resize a placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeHandle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 4] = [
        ResizeHandle::TopLeft,
        ResizeHandle::TopRight,
        ResizeHandle::BottomLeft,
        ResizeHandle::BottomRight,
    ];

    pub fn is_left(self) -> bool {
        matches!(self, ResizeHandle::TopLeft | ResizeHandle::BottomLeft)
    }

    pub fn is_top(self) -> bool {
        matches!(self, ResizeHandle::TopLeft | ResizeHandle::TopRight)
    }

    /// +1 when dragging right grows the placement, -1 otherwise
    fn horizontal_sign(self) -> f64 {
        if self.is_left() {
            -1.0
        } else {
            1.0
        }
    }

    /// +1 when dragging down grows the placement, -1 otherwise
    fn vertical_sign(self) -> f64 {
        if self.is_top() {
            -1.0
        } else {
            1.0
        }
    }

    /// The corner of `rect` this handle sits on
    pub fn corner(self, rect: &Rect) -> Point {
        let x = if self.is_left() { rect.x } else { rect.right() };
        let y = if self.is_top() { rect.y } else { rect.bottom() };
        Point::new(x, y)
    }
}

/// What lies under the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Empty,
    Body(PlacementId),
    Handle(PlacementId, ResizeHandle),
}

/// Find the topmost placement feature under `point` on `page`.
///
/// Handles win over bodies so a handle overlapping a neighbouring placement
/// can still be grabbed. Later placements are drawn on top and are tested
/// first.
pub fn hit_test(store: &PlacementStore, page: u32, point: Point, handle_size: f64) -> HitTarget {
    let half = handle_size / 2.0;

    for placement in store.by_page(page).rev() {
        let rect = placement.rect();
        for handle in ResizeHandle::ALL {
            let corner = handle.corner(&rect);
            if (point.x - corner.x).abs() <= half && (point.y - corner.y).abs() <= half {
                return HitTarget::Handle(placement.id, handle);
            }
        }
    }

    store
        .by_page(page)
        .rev()
        .find(|p| p.rect().contains(point))
        .map(|p| HitTarget::Body(p.id))
        .unwrap_or(HitTarget::Empty)
}

/// Fit a width to the size range and the page while keeping `aspect_ratio`.
///
/// Both width and height end up within `[min_size, max_size]` when the
/// ratio allows it; the page bounds take precedence over the size range.
pub fn fit_size(width: f64, aspect_ratio: f64, config: &EditorConfig, bounds: Size) -> Size {
    let ratio = if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
        aspect_ratio
    } else {
        1.0
    };

    let lo = config.min_size.max(config.min_size * ratio);
    let hi = config.max_size.min(config.max_size * ratio);
    let mut w = if lo <= hi {
        width.max(lo).min(hi)
    } else {
        config.clamp_size(width)
    };

    if w > bounds.width {
        w = bounds.width;
    }
    if w / ratio > bounds.height {
        w = bounds.height * ratio;
    }

    Size::new(w, w / ratio)
}

/// Bring an arbitrary rectangle back within the placement invariants
///
/// Stamps with native dimensions keep their aspect ratio; others have width
/// and height clamped independently.
pub fn constrain_rect(rect: Rect, stamp: &StampItem, config: &EditorConfig, bounds: Size) -> Rect {
    let size = if stamp.native_size.is_some() {
        fit_size(rect.width, stamp.aspect_ratio(), config, bounds)
    } else {
        Size::new(
            config.clamp_size(rect.width).min(bounds.width),
            config.clamp_size(rect.height).min(bounds.height),
        )
    };

    Rect::new(
        clamp_origin(rect.x, size.width, bounds.width),
        clamp_origin(rect.y, size.height, bounds.height),
        size.width,
        size.height,
    )
}

/// An in-progress drag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragGesture {
    pub placement: PlacementId,
    /// Pixel size of the page the drag started on
    pub bounds: Size,
    /// Pointer position within the placement at pointer-down
    pub offset: Point,
}

/// An in-progress resize
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeGesture {
    pub placement: PlacementId,
    pub handle: ResizeHandle,
    pub bounds: Size,
    /// Pointer position at pointer-down
    pub origin: Point,
    /// Placement rectangle at pointer-down
    pub start: Rect,
    /// Width / height at pointer-down
    pub aspect_ratio: f64,
}

impl ResizeGesture {
    /// Rectangle for the current pointer position.
    ///
    /// The larger of the two displacement components drives the new width;
    /// the corner opposite the handle stays where it was.
    pub fn resize_to(&self, pointer: Point, config: &EditorConfig) -> Rect {
        let dx = pointer.x - self.origin.x;
        let dy = pointer.y - self.origin.y;

        let growth = if dx.abs() > dy.abs() {
            self.handle.horizontal_sign() * dx
        } else {
            self.handle.vertical_sign() * dy * self.aspect_ratio
        };

        let size = fit_size(
            self.start.width + growth,
            self.aspect_ratio,
            config,
            self.bounds,
        );

        let x = if self.handle.is_left() {
            self.start.right() - size.width
        } else {
            self.start.x
        };
        let y = if self.handle.is_top() {
            self.start.bottom() - size.height
        } else {
            self.start.y
        };

        Rect::new(
            clamp_origin(x, size.width, self.bounds.width),
            clamp_origin(y, size.height, self.bounds.height),
            size.width,
            size.height,
        )
    }
}

/// Interaction state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionState {
    /// No stamp selected, no gesture
    Idle { suppress_next_click: bool },
    /// A stamp is selected, no gesture
    Placing { suppress_next_click: bool },
    Dragging(DragGesture),
    Resizing(ResizeGesture),
}

impl InteractionState {
    pub fn is_gesture(&self) -> bool {
        matches!(
            self,
            InteractionState::Dragging(_) | InteractionState::Resizing(_)
        )
    }

    /// Placement being manipulated, if any
    pub fn active_placement(&self) -> Option<PlacementId> {
        match self {
            InteractionState::Dragging(g) => Some(g.placement),
            InteractionState::Resizing(g) => Some(g.placement),
            _ => None,
        }
    }
}

/// Result of feeding one event to the state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionOutcome {
    Placed(PlacementId),
    DragStarted(PlacementId),
    ResizeStarted(PlacementId, ResizeHandle),
    Moved(PlacementId),
    Resized(PlacementId),
    GestureEnded(PlacementId),
    /// The placement vanished mid-gesture
    GestureTerminated(PlacementId),
    ClickSuppressed,
    Removed(PlacementId),
    Ignored,
}

/// Pointer interaction state machine
#[derive(Debug, Clone)]
pub struct Interaction {
    config: EditorConfig,
    selected: Option<StampItem>,
    stamp_size: f64,
    state: InteractionState,
}

impl Interaction {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            stamp_size: config.default_size,
            config,
            selected: None,
            state: InteractionState::Idle {
                suppress_next_click: false,
            },
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn selected_stamp(&self) -> Option<&StampItem> {
        self.selected.as_ref()
    }

    /// Select (or deselect) the stamp placed by the next click
    pub fn select_stamp(&mut self, stamp: Option<StampItem>) {
        self.selected = stamp;
        if let Some(suppress) = self.suppress_flag() {
            self.state = self.rest_state(suppress);
        }
    }

    /// Longest side of newly placed stamps
    pub fn stamp_size(&self) -> f64 {
        self.stamp_size
    }

    pub fn set_stamp_size(&mut self, size: f64) {
        self.stamp_size = self.config.clamp_size(size);
    }

    fn suppress_flag(&self) -> Option<bool> {
        match self.state {
            InteractionState::Idle {
                suppress_next_click,
            }
            | InteractionState::Placing {
                suppress_next_click,
            } => Some(suppress_next_click),
            _ => None,
        }
    }

    fn rest_state(&self, suppress_next_click: bool) -> InteractionState {
        if self.selected.is_some() {
            InteractionState::Placing {
                suppress_next_click,
            }
        } else {
            InteractionState::Idle {
                suppress_next_click,
            }
        }
    }

    /// Place the selected stamp centred under `center`.
    ///
    /// Returns `None` when no stamp is selected.
    pub fn place_at(
        &self,
        store: &mut PlacementStore,
        page: u32,
        bounds: Size,
        center: Point,
    ) -> Option<PlacementId> {
        let stamp = self.selected.as_ref()?;
        let ratio = stamp.aspect_ratio();
        let desired = Size::from_longest_side(self.stamp_size, ratio);
        let size = fit_size(desired.width, ratio, &self.config, bounds);

        let rect = Rect::new(
            clamp_origin(center.x - size.width / 2.0, size.width, bounds.width),
            clamp_origin(center.y - size.height / 2.0, size.height, bounds.height),
            size.width,
            size.height,
        );

        let placement = Placement::new(stamp.clone(), page, rect);
        let id = placement.id;
        debug!(%id, page, x = rect.x, y = rect.y, "placed stamp {}", stamp.id);
        store.add(placement);
        Some(id)
    }

    /// Pointer pressed on `page` at `point`
    pub fn pointer_down(
        &mut self,
        store: &mut PlacementStore,
        page: u32,
        bounds: Size,
        point: Point,
    ) -> InteractionOutcome {
        if self.state.is_gesture() {
            return InteractionOutcome::Ignored;
        }

        match hit_test(store, page, point, self.config.handle_size) {
            HitTarget::Handle(id, handle) => {
                let Some(placement) = store.get(id) else {
                    return InteractionOutcome::Ignored;
                };
                let start = placement.rect();
                self.state = InteractionState::Resizing(ResizeGesture {
                    placement: id,
                    handle,
                    bounds,
                    origin: point,
                    start,
                    aspect_ratio: placement.size().aspect_ratio(),
                });
                debug!(%id, ?handle, "resize started");
                InteractionOutcome::ResizeStarted(id, handle)
            }
            HitTarget::Body(id) => {
                let Some(placement) = store.get(id) else {
                    return InteractionOutcome::Ignored;
                };
                self.state = InteractionState::Dragging(DragGesture {
                    placement: id,
                    bounds,
                    offset: Point::new(point.x - placement.x, point.y - placement.y),
                });
                debug!(%id, "drag started");
                InteractionOutcome::DragStarted(id)
            }
            HitTarget::Empty => {
                // A fresh press means no click followed the last release
                self.state = self.rest_state(false);
                match self.place_at(store, page, bounds, point) {
                    Some(id) => InteractionOutcome::Placed(id),
                    None => InteractionOutcome::Ignored,
                }
            }
        }
    }

    /// Pointer moved to `point`, relative to the page the gesture started on
    pub fn pointer_move(&mut self, store: &mut PlacementStore, point: Point) -> InteractionOutcome {
        match self.state {
            InteractionState::Dragging(gesture) => {
                let Some(placement) = store.get(gesture.placement) else {
                    return self.terminate(gesture.placement);
                };
                let x = clamp_origin(
                    point.x - gesture.offset.x,
                    placement.width,
                    gesture.bounds.width,
                );
                let y = clamp_origin(
                    point.y - gesture.offset.y,
                    placement.height,
                    gesture.bounds.height,
                );
                store.update_by_id(gesture.placement, PlacementChanges::position(x, y));
                InteractionOutcome::Moved(gesture.placement)
            }
            InteractionState::Resizing(gesture) => {
                if store.get(gesture.placement).is_none() {
                    return self.terminate(gesture.placement);
                }
                let rect = gesture.resize_to(point, &self.config);
                store.update_by_id(gesture.placement, PlacementChanges::rect(rect));
                InteractionOutcome::Resized(gesture.placement)
            }
            _ => InteractionOutcome::Ignored,
        }
    }

    /// Pointer released anywhere, inside the page or not
    pub fn pointer_up(&mut self) -> InteractionOutcome {
        match self.state.active_placement() {
            Some(id) => {
                self.state = self.rest_state(true);
                debug!(%id, "gesture ended");
                InteractionOutcome::GestureEnded(id)
            }
            None => InteractionOutcome::Ignored,
        }
    }

    /// Click delivered after a pointer release.
    ///
    /// Consumes the one-shot guard set when a gesture ended, so the release
    /// of a drag is never read as a new placement.
    pub fn click(&mut self) -> InteractionOutcome {
        match self.suppress_flag() {
            Some(true) => {
                self.state = self.rest_state(false);
                InteractionOutcome::ClickSuppressed
            }
            _ => InteractionOutcome::Ignored,
        }
    }

    /// Delete a placement. Not available while a gesture is active.
    pub fn remove(&mut self, store: &mut PlacementStore, id: PlacementId) -> InteractionOutcome {
        if self.state.is_gesture() {
            return InteractionOutcome::Ignored;
        }
        match store.remove_by_id(id) {
            Some(_) => InteractionOutcome::Removed(id),
            None => InteractionOutcome::Ignored,
        }
    }

    /// Abandon any active gesture, e.g. when the store is cleared under it
    pub fn cancel_gesture(&mut self) {
        if let Some(id) = self.state.active_placement() {
            debug!(%id, "gesture cancelled");
            self.state = self.rest_state(true);
        }
    }

    fn terminate(&mut self, id: PlacementId) -> InteractionOutcome {
        debug!(%id, "placement gone mid-gesture");
        self.state = self.rest_state(true);
        InteractionOutcome::GestureTerminated(id)
    }
}

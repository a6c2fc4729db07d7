//! Placements and the placement store

use crate::geometry::{Rect, Size};
use crate::stamp::StampItem;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Locally generated placement identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlacementId(Uuid);

impl PlacementId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an id previously rendered with `Display`
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for PlacementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlacementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One stamp instance on one page, in pixel space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub id: PlacementId,
    pub stamp: StampItem,
    /// 1-based page index
    pub page_number: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Placement {
    pub fn new(stamp: StampItem, page_number: u32, rect: Rect) -> Self {
        Self {
            id: PlacementId::new(),
            stamp,
            page_number,
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.x = rect.x;
        self.y = rect.y;
        self.width = rect.width;
        self.height = rect.height;
    }
}

/// Partial update merged into a placement
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementChanges {
    #[serde(default)]
    pub page_number: Option<u32>,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

impl PlacementChanges {
    /// Changes that replace position and size
    pub fn rect(rect: Rect) -> Self {
        Self {
            page_number: None,
            x: Some(rect.x),
            y: Some(rect.y),
            width: Some(rect.width),
            height: Some(rect.height),
        }
    }

    /// Changes that move without resizing
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    fn apply(&self, placement: &mut Placement) {
        if let Some(page) = self.page_number {
            placement.page_number = page;
        }
        if let Some(x) = self.x {
            placement.x = x;
        }
        if let Some(y) = self.y {
            placement.y = y;
        }
        if let Some(width) = self.width {
            placement.width = width;
        }
        if let Some(height) = self.height {
            placement.height = height;
        }
    }
}

/// Ordered collection of placements across all pages
///
/// The store does not validate geometry; the interaction layer clamps
/// before anything reaches it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlacementStore {
    placements: Vec<Placement>,
}

impl PlacementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a placement
    pub fn add(&mut self, placement: Placement) {
        self.placements.push(placement);
    }

    /// Merge changes into the matching placement.
    ///
    /// Returns `false` when the id is unknown, which is not an error: the
    /// placement may have been removed while a gesture was in flight.
    pub fn update_by_id(&mut self, id: PlacementId, changes: PlacementChanges) -> bool {
        match self.placements.iter_mut().find(|p| p.id == id) {
            Some(placement) => {
                changes.apply(placement);
                true
            }
            None => false,
        }
    }

    /// Remove the matching placement, returning it if it existed
    pub fn remove_by_id(&mut self, id: PlacementId) -> Option<Placement> {
        let index = self.placements.iter().position(|p| p.id == id)?;
        Some(self.placements.remove(index))
    }

    pub fn clear(&mut self) {
        self.placements.clear();
    }

    /// Placements on a single page, in insertion order
    pub fn by_page(&self, page_number: u32) -> impl DoubleEndedIterator<Item = &Placement> + '_ {
        self.placements
            .iter()
            .filter(move |p| p.page_number == page_number)
    }

    pub fn get(&self, id: PlacementId) -> Option<&Placement> {
        self.placements.iter().find(|p| p.id == id)
    }

    pub fn all(&self) -> &[Placement] {
        &self.placements
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Number of distinct pages carrying at least one placement
    pub fn page_count(&self) -> usize {
        let mut pages: Vec<u32> = self.placements.iter().map(|p| p.page_number).collect();
        pages.sort_unstable();
        pages.dedup();
        pages.len()
    }

    /// Apply `f` to every placement on a page, e.g. after the page is
    /// re-rendered at a different pixel size
    pub fn for_each_on_page<F>(&mut self, page_number: u32, f: F)
    where
        F: FnMut(&mut Placement),
    {
        self.placements
            .iter_mut()
            .filter(|p| p.page_number == page_number)
            .for_each(f);
    }

    /// Copy of the current contents for history
    pub fn snapshot(&self) -> Vec<Placement> {
        self.placements.clone()
    }

    /// Replace the contents with a snapshot
    pub fn restore(&mut self, snapshot: Vec<Placement>) {
        self.placements = snapshot;
    }
}

//! Stamp Core - placement and coordinate transformation for PDF stamping
//!
//! This crate provides functionality for:
//! - Adapting seals and signatures into a single stamp shape
//! - Storing placements across the pages of a document
//! - Placing, dragging and resizing placements from pointer events
//! - Converting pixel-space placements into PDF point-space positions
//!
//! # Example
//!
//! ```ignore
//! use stamp_core::{EditorConfig, Interaction, PlacementStore, Point, Size};
//!
//! let mut store = PlacementStore::new();
//! let mut interaction = Interaction::new(EditorConfig::default());
//! interaction.select_stamp(Some(StampItem::from_seal(&seal)));
//! interaction.pointer_down(&mut store, 1, Size::new(600.0, 800.0), Point::new(50.0, 50.0));
//! ```

mod config;
mod document;
mod geometry;
mod image;
mod interaction;
mod placement;
mod stamp;
mod transform;

pub use config::EditorConfig;
pub use document::{page_point_sizes, StampDocument};
pub use geometry::{clamp_origin, PageGeometry, PageLayout, Point, Rect, Size, A4_POINTS};
pub use image::{detect_format, probe_image_size, ImageFormat};
pub use interaction::{
    constrain_rect, fit_size, hit_test, DragGesture, HitTarget, Interaction, InteractionOutcome,
    InteractionState, ResizeGesture, ResizeHandle,
};
pub use placement::{Placement, PlacementChanges, PlacementId, PlacementStore};
pub use stamp::{resolve_file_url, Seal, Signature, StampItem, StampKind};
pub use transform::{round2, to_wire_format, WirePosition};

use thiserror::Error;

/// Errors that can occur in stamp-core
#[derive(Debug, Error)]
pub enum StampError {
    #[error("Failed to open PDF: {0}")]
    OpenError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("PDF parsing error: {0}")]
    ParseError(String),

    #[error("Invalid editor config: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for stamp-core operations
pub type Result<T> = std::result::Result<T, StampError>;

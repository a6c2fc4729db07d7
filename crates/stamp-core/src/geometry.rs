//! Pixel-space geometry primitives and per-page geometry

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A4 page size in PDF points (1/72 inch)
pub const A4_POINTS: Size = Size {
    width: 595.0,
    height: 842.0,
};

/// A 2D point in pixel space (origin top-left, Y down)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width and height, in pixels or points depending on context
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Size whose longest side is `side`, with the given width/height ratio
    pub fn from_longest_side(side: f64, aspect_ratio: f64) -> Self {
        if aspect_ratio >= 1.0 {
            Self::new(side, side / aspect_ratio)
        } else {
            Self::new(side * aspect_ratio, side)
        }
    }

    /// Both sides positive and finite
    pub fn is_usable(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Width divided by height, 1.0 for degenerate sizes
    pub fn aspect_ratio(&self) -> f64 {
        if self.is_usable() {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// Axis-aligned rectangle in pixel space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Inclusive containment test
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }
}

/// Clamp a top-left coordinate so a box of `extent` stays within `[0, limit]`.
///
/// When the box is larger than the page the coordinate pins to 0.
pub fn clamp_origin(value: f64, extent: f64, limit: f64) -> f64 {
    value.min(limit - extent).max(0.0)
}

/// Geometry of one page as rendered, plus its native PDF size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageGeometry {
    /// Rendered width in pixels (zoom already applied)
    pub pixel_width: f64,
    /// Rendered height in pixels
    pub pixel_height: f64,
    /// Native width in points
    pub point_width: f64,
    /// Native height in points
    pub point_height: f64,
}

impl PageGeometry {
    /// Geometry with known point dimensions
    pub fn new(pixels: Size, points: Size) -> Self {
        Self {
            pixel_width: pixels.width,
            pixel_height: pixels.height,
            point_width: points.width,
            point_height: points.height,
        }
    }

    /// Geometry whose point size is unknown, using the injected fallback
    pub fn with_fallback(pixels: Size, points: Option<Size>, fallback: Size) -> Self {
        Self::new(pixels, points.filter(Size::is_usable).unwrap_or(fallback))
    }

    pub fn pixel_size(&self) -> Size {
        Size::new(self.pixel_width, self.pixel_height)
    }

    pub fn point_size(&self) -> Size {
        Size::new(self.point_width, self.point_height)
    }
}

/// Geometry for every page of a document, keyed by 1-based page number
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pages: BTreeMap<u32, PageGeometry>,
    fallback: PageGeometry,
}

impl PageLayout {
    /// Create an empty layout; pages never reported resolve to `fallback`
    pub fn new(fallback: PageGeometry) -> Self {
        Self {
            pages: BTreeMap::new(),
            fallback,
        }
    }

    /// Record a page's geometry, returning the previous one if any
    pub fn insert(&mut self, page: u32, geometry: PageGeometry) -> Option<PageGeometry> {
        self.pages.insert(page, geometry)
    }

    /// Geometry for a page, or the fallback
    pub fn get(&self, page: u32) -> PageGeometry {
        self.pages.get(&page).copied().unwrap_or(self.fallback)
    }

    /// Whether the page has been reported by the renderer
    pub fn contains(&self, page: u32) -> bool {
        self.pages.contains_key(&page)
    }

    pub fn fallback(&self) -> PageGeometry {
        self.fallback
    }

    pub fn clear(&mut self) {
        self.pages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_origin() {
        assert_eq!(clamp_origin(-5.0, 80.0, 600.0), 0.0);
        assert_eq!(clamp_origin(550.0, 80.0, 600.0), 520.0);
        assert_eq!(clamp_origin(100.0, 80.0, 600.0), 100.0);
        // Box wider than the page pins to the origin
        assert_eq!(clamp_origin(10.0, 700.0, 600.0), 0.0);
    }

    #[test]
    fn test_from_longest_side() {
        assert_eq!(Size::from_longest_side(80.0, 2.0), Size::new(80.0, 40.0));
        assert_eq!(Size::from_longest_side(80.0, 0.5), Size::new(40.0, 80.0));
        assert_eq!(Size::from_longest_side(80.0, 1.0), Size::new(80.0, 80.0));
    }

    #[test]
    fn test_degenerate_aspect_ratio() {
        assert_eq!(Size::new(0.0, 10.0).aspect_ratio(), 1.0);
        assert_eq!(Size::new(200.0, 100.0).aspect_ratio(), 2.0);
    }

    #[test]
    fn test_unusable_sizes() {
        assert!(Size::new(600.0, 800.0).is_usable());
        assert!(!Size::new(0.0, 800.0).is_usable());
        assert!(!Size::new(600.0, -1.0).is_usable());
        assert!(!Size::new(f64::NAN, 800.0).is_usable());
        assert!(!Size::new(600.0, f64::INFINITY).is_usable());
    }

    #[test]
    fn test_unusable_points_fall_back() {
        let pixels = Size::new(600.0, 800.0);
        let geometry = PageGeometry::with_fallback(pixels, Some(Size::new(0.0, 0.0)), A4_POINTS);
        assert_eq!(geometry.point_size(), A4_POINTS);
    }

    #[test]
    fn test_layout_fallback() {
        let fallback = PageGeometry::new(Size::new(600.0, 800.0), A4_POINTS);
        let mut layout = PageLayout::new(fallback);
        assert_eq!(layout.get(3), fallback);

        let page = PageGeometry::new(Size::new(300.0, 400.0), Size::new(612.0, 792.0));
        layout.insert(3, page);
        assert!(layout.contains(3));
        assert_eq!(layout.get(3), page);
    }
}

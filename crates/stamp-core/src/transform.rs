//! Pixel space to PDF point space conversion

use crate::geometry::PageGeometry;
use crate::placement::Placement;
use serde::{Deserialize, Serialize};

/// A placement's position as sent to the stamping backend, in PDF points
/// with the origin at the bottom-left of the page
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePosition {
    pub page_number: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Round to 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Convert a placement to wire format using its page's geometry.
///
/// Pixel space grows downward from the top-left; point space grows upward
/// from the bottom-left, so the placement's bottom edge (`y + height`)
/// becomes the distance from the bottom of the page.
pub fn to_wire_format(placement: &Placement, page: &PageGeometry) -> WirePosition {
    let scale_x = page.point_width / page.pixel_width;
    let scale_y = page.point_height / page.pixel_height;

    let x = placement.x * scale_x;
    let y = page.point_height - (placement.y + placement.height) * scale_y;

    WirePosition {
        page_number: placement.page_number,
        x: round2(x),
        y: round2(y),
        width: round2(placement.width * scale_x),
        height: round2(placement.height * scale_y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Rect, Size};
    use crate::stamp::{StampItem, StampKind};
    use pretty_assertions::assert_eq;

    fn placement(rect: Rect) -> Placement {
        let stamp = StampItem {
            kind: StampKind::Seal,
            id: 1,
            display_name: "seal".to_string(),
            image_ref: String::new(),
            native_size: None,
        };
        Placement::new(stamp, 1, rect)
    }

    #[test]
    fn test_a4_scaled_page() {
        let page = PageGeometry::new(Size::new(600.0, 800.0), Size::new(595.0, 842.0));
        let wire = to_wire_format(&placement(Rect::new(100.0, 100.0, 80.0, 80.0)), &page);

        assert_eq!(
            wire,
            WirePosition {
                page_number: 1,
                x: 99.17,
                y: 652.55,
                width: 79.33,
                height: 84.2,
            }
        );
    }

    #[test]
    fn test_identity_scale_flips_y() {
        let page = PageGeometry::new(Size::new(595.0, 842.0), Size::new(595.0, 842.0));
        let wire = to_wire_format(&placement(Rect::new(0.0, 0.0, 100.0, 50.0)), &page);

        // Top-left of the page in pixels is the top of the page in points
        assert_eq!(wire.x, 0.0);
        assert_eq!(wire.y, 792.0);
        assert_eq!(wire.width, 100.0);
        assert_eq!(wire.height, 50.0);
    }

    #[test]
    fn test_bottom_edge_maps_to_zero() {
        let page = PageGeometry::new(Size::new(300.0, 400.0), Size::new(612.0, 792.0));
        let wire = to_wire_format(&placement(Rect::new(220.0, 320.0, 80.0, 80.0)), &page);

        assert_eq!(wire.y, 0.0);
        assert_eq!(wire.x, 448.8);
        assert_eq!(wire.width, 163.2);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.235_000_1), 1.24);
        assert_eq!(round2(84.2), 84.2);
    }
}

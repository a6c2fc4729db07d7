//! Editor configuration

use crate::geometry::{PageGeometry, Size, A4_POINTS};
use crate::{Result, StampError};
use serde::{Deserialize, Serialize};

fn default_size() -> f64 {
    80.0
}

fn default_min_size() -> f64 {
    30.0
}

fn default_max_size() -> f64 {
    200.0
}

fn default_handle_size() -> f64 {
    12.0
}

fn default_page_size() -> Size {
    A4_POINTS
}

fn default_pixel_size() -> Size {
    Size::new(600.0, 800.0)
}

fn default_history_limit() -> usize {
    50
}

/// Tunables for placement sizing, hit-testing and coordinate fallback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Longest side of a newly placed stamp, in pixels
    #[serde(default = "default_size")]
    pub default_size: f64,

    /// Lower bound for placement width and height
    #[serde(default = "default_min_size")]
    pub min_size: f64,

    /// Upper bound for placement width and height
    #[serde(default = "default_max_size")]
    pub max_size: f64,

    /// Side of the square hit area centred on each corner handle
    #[serde(default = "default_handle_size")]
    pub handle_size: f64,

    /// Point size assumed when the renderer cannot report one
    #[serde(default = "default_page_size")]
    pub default_page_size: Size,

    /// Pixel size assumed for a page the renderer never reported
    #[serde(default = "default_pixel_size")]
    pub fallback_pixel_size: Size,

    /// Number of undo snapshots retained
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_size: default_size(),
            min_size: default_min_size(),
            max_size: default_max_size(),
            handle_size: default_handle_size(),
            default_page_size: default_page_size(),
            fallback_pixel_size: default_pixel_size(),
            history_limit: default_history_limit(),
        }
    }
}

impl EditorConfig {
    /// Parse and validate a configuration from JSON
    ///
    /// Missing fields take their defaults, so `{}` is a valid configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EditorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that sizes are positive and ordered
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("defaultSize", self.default_size),
            ("minSize", self.min_size),
            ("maxSize", self.max_size),
            ("handleSize", self.handle_size),
            ("defaultPageSize.width", self.default_page_size.width),
            ("defaultPageSize.height", self.default_page_size.height),
            ("fallbackPixelSize.width", self.fallback_pixel_size.width),
            ("fallbackPixelSize.height", self.fallback_pixel_size.height),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(StampError::InvalidConfig(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }

        if self.min_size > self.max_size {
            return Err(StampError::InvalidConfig(format!(
                "minSize ({}) exceeds maxSize ({})",
                self.min_size, self.max_size
            )));
        }

        if self.default_size < self.min_size || self.default_size > self.max_size {
            return Err(StampError::InvalidConfig(format!(
                "defaultSize ({}) outside [{}, {}]",
                self.default_size, self.min_size, self.max_size
            )));
        }

        Ok(())
    }

    /// Geometry used for pages the renderer has not reported
    pub fn fallback_geometry(&self) -> PageGeometry {
        PageGeometry::new(self.fallback_pixel_size, self.default_page_size)
    }

    /// Clamp a size to `[min_size, max_size]`
    pub fn clamp_size(&self, size: f64) -> f64 {
        size.max(self.min_size).min(self.max_size)
    }
}

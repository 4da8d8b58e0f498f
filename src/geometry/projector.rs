use serde::{Deserialize, Serialize};

use crate::core::manifest::Coordinate;
use crate::core::types::ImageSize;

/// Marker diameter at scale 1.0, in pixels
pub const BASE_MARKER_SIZE: f64 = 30.0;
/// Smallest marker diameter on regular viewports
pub const MIN_MARKER_SIZE: f64 = 18.0;
/// Smallest marker diameter on narrow viewports
pub const MIN_MARKER_SIZE_NARROW: f64 = 14.0;
/// Largest marker diameter
pub const MAX_MARKER_SIZE: f64 = 44.0;
/// Viewports narrower than this use the narrow minimum
pub const NARROW_VIEWPORT: f64 = 768.0;
/// Label font size relative to marker diameter
pub const FONT_RATIO: f64 = 0.5;
/// Smallest label font size
pub const MIN_FONT_SIZE: f64 = 9.0;

/// Sizing rules for markers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerStyle {
    pub base_size: f64,
    pub min_size: f64,
    pub min_size_narrow: f64,
    pub max_size: f64,
    pub narrow_viewport: f64,
    pub font_ratio: f64,
    pub min_font_size: f64,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            base_size: BASE_MARKER_SIZE,
            min_size: MIN_MARKER_SIZE,
            min_size_narrow: MIN_MARKER_SIZE_NARROW,
            max_size: MAX_MARKER_SIZE,
            narrow_viewport: NARROW_VIEWPORT,
            font_ratio: FONT_RATIO,
            min_font_size: MIN_FONT_SIZE,
        }
    }
}

impl MarkerStyle {
    /// True when every size is a finite, non-negative number
    #[must_use]
    pub fn is_usable(&self) -> bool {
        [
            self.base_size,
            self.min_size,
            self.min_size_narrow,
            self.max_size,
            self.narrow_viewport,
            self.font_ratio,
            self.min_font_size,
        ]
        .iter()
        .all(|v| v.is_finite() && *v >= 0.0)
    }
}

/// Where and how large to draw one marker.
///
/// `left`/`top` name the marker centre in rendered pixels; a renderer draws
/// the marker translated by -50%/-50% of its own size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerPlacement {
    pub left: f64,
    pub top: f64,
    pub size: f64,
    pub font_size: f64,
}

impl MarkerPlacement {
    /// Top-left corner of the marker box
    #[must_use]
    pub fn top_left(&self) -> (f64, f64) {
        let half = self.size / 2.0;
        (self.left - half, self.top - half)
    }
}

/// Maps native manifest coordinates onto the rendered image and back
#[derive(Debug, Clone, PartialEq)]
pub struct Projector {
    native: ImageSize,
    rendered_width: f64,
    scale: f64,
    viewport_width: Option<f64>,
    style: MarkerStyle,
}

impl Projector {
    /// Create a projector for an image of the given native size. Until a
    /// rendered width is observed the image is assumed to render at native
    /// size. Returns `None` for a zero-width image.
    #[must_use]
    pub fn new(native: ImageSize) -> Option<Self> {
        if native.width == 0 {
            return None;
        }
        let width = f64::from(native.width);
        Some(Self {
            native,
            rendered_width: width,
            scale: 1.0,
            viewport_width: None,
            style: MarkerStyle::default(),
        })
    }

    /// Use custom sizing rules. A style that is not
    /// [usable](MarkerStyle::is_usable) is ignored and the current one kept.
    #[must_use]
    pub fn with_style(mut self, style: MarkerStyle) -> Self {
        if style.is_usable() {
            self.style = style;
        }
        self
    }

    #[must_use]
    pub fn with_viewport_width(mut self, viewport_width: f64) -> Self {
        self.set_viewport_width(viewport_width);
        self
    }

    pub fn set_viewport_width(&mut self, viewport_width: f64) {
        if viewport_width.is_finite() && viewport_width > 0.0 {
            self.viewport_width = Some(viewport_width);
        }
    }

    /// Record the current rendered width; the scale is recomputed only when
    /// it changed. Returns whether it changed. Non-positive or non-finite
    /// widths (an image that has not laid out yet) are ignored.
    pub fn observe(&mut self, rendered_width: f64) -> bool {
        if !rendered_width.is_finite() || rendered_width <= 0.0 {
            return false;
        }
        if rendered_width == self.rendered_width {
            return false;
        }
        self.rendered_width = rendered_width;
        self.scale = rendered_width / f64::from(self.native.width);
        true
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[must_use]
    pub fn rendered_width(&self) -> f64 {
        self.rendered_width
    }

    #[must_use]
    pub fn native_size(&self) -> ImageSize {
        self.native
    }

    /// Rendered height implied by the current scale
    #[must_use]
    pub fn rendered_height(&self) -> f64 {
        f64::from(self.native.height) * self.scale
    }

    fn is_narrow(&self) -> bool {
        self.viewport_width
            .is_some_and(|w| w < self.style.narrow_viewport)
    }

    /// Marker diameter at the current scale, clamped to stay legible
    #[must_use]
    pub fn marker_size(&self) -> f64 {
        let min = if self.is_narrow() {
            self.style.min_size_narrow
        } else {
            self.style.min_size
        };
        (self.style.base_size * self.scale).clamp(min, self.style.max_size.max(min))
    }

    #[must_use]
    pub fn project(&self, coordinate: &Coordinate) -> MarkerPlacement {
        let size = self.marker_size();
        MarkerPlacement {
            left: coordinate.x * self.scale,
            top: coordinate.y * self.scale,
            size,
            font_size: (size * self.style.font_ratio).max(self.style.min_font_size),
        }
    }

    /// Map a rendered point (e.g. a click) back to native coordinates
    #[must_use]
    pub fn unproject(&self, left: f64, top: f64) -> (f64, f64) {
        (left / self.scale, top / self.scale)
    }
}

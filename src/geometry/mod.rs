//! Mapping between native manifest coordinates and the rendered image.
//!
//! Coordinates are recorded once against the image's native pixel grid. At
//! display time the image is drawn at some other width, so every marker is
//! scaled by `rendered_width / native_width`. Marker size follows the same
//! scale but is clamped so markers stay legible on small and large displays.

pub mod projector;

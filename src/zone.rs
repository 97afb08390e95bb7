//! Zone geometry.
//!
//! The zone is the configured rectangular region of interest within the
//! frame, expressed in pixel coordinates. Detections carry normalized
//! bounding boxes; the zone test denormalizes a bbox centroid against the
//! frame dimensions and asks whether it falls strictly inside the
//! rectangle. A centroid exactly on an edge is outside.

use anyhow::{anyhow, Result};

/// Frame dimensions used to denormalize bounding box coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameDims {
    pub width: u32,
    pub height: u32,
}

/// Rectangular region of interest, pixel coordinates.
///
/// Immutable once constructed. Construction rejects inverted or degenerate
/// rectangles; a zone with no interior can never admit a centroid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Zone {
    top_left: (f32, f32),
    bottom_right: (f32, f32),
}

impl Zone {
    pub fn new(top_left: (f32, f32), bottom_right: (f32, f32)) -> Result<Self> {
        for v in [top_left.0, top_left.1, bottom_right.0, bottom_right.1] {
            if !v.is_finite() {
                return Err(anyhow!("zone corners must be finite coordinates"));
            }
        }
        if top_left.0 >= bottom_right.0 || top_left.1 >= bottom_right.1 {
            return Err(anyhow!(
                "zone rectangle is inverted or degenerate: top_left={:?} bottom_right={:?}",
                top_left,
                bottom_right
            ));
        }
        Ok(Self {
            top_left,
            bottom_right,
        })
    }

    /// Zone covering the entire frame.
    pub fn full_frame(dims: FrameDims) -> Self {
        Self {
            top_left: (0.0, 0.0),
            bottom_right: (dims.width as f32, dims.height as f32),
        }
    }

    pub fn top_left(&self) -> (f32, f32) {
        self.top_left
    }

    pub fn bottom_right(&self) -> (f32, f32) {
        self.bottom_right
    }

    /// Strict containment test for a pixel-space point.
    ///
    /// All four comparisons are strict: a point on the boundary does not
    /// count as inside. Pure, no clamping of out-of-range inputs.
    pub fn contains(&self, (x, y): (f32, f32)) -> bool {
        x > self.top_left.0
            && x < self.bottom_right.0
            && y > self.top_left.1
            && y < self.bottom_right.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interior_point_is_inside() {
        let zone = Zone::new((0.0, 0.0), (640.0, 480.0)).unwrap();
        assert!(zone.contains((320.0, 240.0)));
        assert!(zone.contains((1.0, 1.0)));
        assert!(zone.contains((639.0, 479.0)));
    }

    #[test]
    fn exterior_point_is_outside() {
        let zone = Zone::new((100.0, 100.0), (200.0, 200.0)).unwrap();
        assert!(!zone.contains((50.0, 150.0)));
        assert!(!zone.contains((150.0, 250.0)));
        assert!(!zone.contains((250.0, 250.0)));
    }

    #[test]
    fn boundary_point_is_outside() {
        let zone = Zone::new((0.0, 0.0), (640.0, 480.0)).unwrap();
        assert!(!zone.contains((0.0, 240.0)));
        assert!(!zone.contains((640.0, 240.0)));
        assert!(!zone.contains((320.0, 0.0)));
        assert!(!zone.contains((320.0, 480.0)));
        assert!(!zone.contains((0.0, 0.0)));
    }

    #[test]
    fn inverted_rectangle_is_rejected() {
        assert!(Zone::new((200.0, 0.0), (100.0, 480.0)).is_err());
        assert!(Zone::new((0.0, 480.0), (640.0, 100.0)).is_err());
    }

    #[test]
    fn degenerate_rectangle_is_rejected() {
        assert!(Zone::new((100.0, 100.0), (100.0, 200.0)).is_err());
        assert!(Zone::new((100.0, 100.0), (200.0, 100.0)).is_err());
    }

    #[test]
    fn non_finite_corner_is_rejected() {
        assert!(Zone::new((f32::NAN, 0.0), (640.0, 480.0)).is_err());
        assert!(Zone::new((0.0, 0.0), (f32::INFINITY, 480.0)).is_err());
    }

    #[test]
    fn full_frame_covers_center_but_not_edges() {
        let dims = FrameDims {
            width: 640,
            height: 480,
        };
        let zone = Zone::full_frame(dims);
        assert!(zone.contains((320.0, 240.0)));
        assert!(!zone.contains((0.0, 0.0)));
        assert!(!zone.contains((640.0, 480.0)));
    }
}

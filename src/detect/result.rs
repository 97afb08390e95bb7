use crate::zone::FrameDims;

/// Bounding box in normalized [0,1] image coordinates.
///
/// Field order follows SSD-style detector output: (y_min, x_min, y_max,
/// x_max). Values outside [0,1] are carried as-is; clamping is the
/// detector's concern.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub y_min: f32,
    pub x_min: f32,
    pub y_max: f32,
    pub x_max: f32,
}

impl BoundingBox {
    /// Centroid in pixel coordinates for the given frame dimensions.
    pub fn centroid(&self, dims: FrameDims) -> (f32, f32) {
        (
            (self.x_min + self.x_max) / 2.0 * dims.width as f32,
            (self.y_min + self.y_max) / 2.0 * dims.height as f32,
        )
    }

    fn is_finite(&self) -> bool {
        self.y_min.is_finite()
            && self.x_min.is_finite()
            && self.y_max.is_finite()
            && self.x_max.is_finite()
    }
}

/// One detection from the perception model for one frame.
///
/// Produced fresh each frame tick and discarded after the processing pass.
#[derive(Clone, Debug)]
pub struct Detection {
    /// Label-map class id (COCO: 17 = cat, 18 = dog, 88 = teddy bear).
    pub class_id: u32,
    /// Model confidence in [0,1].
    pub confidence: f32,
    pub bbox: BoundingBox,
}

impl Detection {
    /// Whether this detection is safe to evaluate.
    ///
    /// A class id of zero or beyond the label map, or a non-finite bbox
    /// coordinate, marks the detection malformed. Malformed detections are
    /// skipped for the current frame only; they never abort a tick.
    pub fn is_well_formed(&self, label_map_size: u32) -> bool {
        self.class_id >= 1 && self.class_id <= label_map_size && self.bbox.is_finite()
    }
}

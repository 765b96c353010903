use crate::enums::SegmentationMode;

/// Observed intensity range of a segmentation volume.
///
/// Constructed through [`VolumeStats::new`], which keeps `min_value <= max_value`
/// by swapping reversed bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VolumeStats {
    min_value: f64,
    max_value: f64,
}

impl VolumeStats {
    pub fn new(min_value: f64, max_value: f64) -> Self {
        if min_value > max_value {
            log::warn!("Volume range [{min_value}, {max_value}] is reversed, swapping bounds");
            return Self {
                min_value: max_value,
                max_value: min_value,
            };
        }
        Self {
            min_value,
            max_value,
        }
    }

    pub fn min_value(&self) -> f64 {
        self.min_value
    }

    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    pub fn is_finite(&self) -> bool {
        self.min_value.is_finite() && self.max_value.is_finite()
    }

    /// Range heuristic: small non-negative ranges are treated as probabilities.
    pub fn classify(&self) -> SegmentationMode {
        if self.max_value <= 5.0 && self.min_value >= 0.0 {
            SegmentationMode::ProbabilityMap
        } else {
            SegmentationMode::DiscreteLabels
        }
    }

    /// Map a voxel value to its lookup table bucket.
    ///
    /// Labels index the table directly; probabilities are rescaled from the
    /// observed range onto `0..=255`.
    #[inline]
    pub fn bucket(&self, value: f64, mode: SegmentationMode) -> u8 {
        if !value.is_finite() {
            return 0;
        }
        match mode {
            SegmentationMode::DiscreteLabels => value.round().clamp(0.0, 255.0) as u8,
            SegmentationMode::ProbabilityMap => {
                let range = self.max_value - self.min_value;
                if !(range.is_finite() && range > 0.0) {
                    return 0;
                }
                let t = (value - self.min_value) / range;
                (t * 255.0).clamp(0.0, 255.0).floor() as u8
            }
        }
    }
}

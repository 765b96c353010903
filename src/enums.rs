#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Axial,
    Coronal,
    Sagittal,
}

/// How voxel values of a segmentation volume are interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SegmentationMode {
    /// Each voxel holds a small integer label code.
    DiscreteLabels,
    /// Each voxel holds a continuous confidence value.
    ProbabilityMap,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ModeSelection {
    /// Classify from the observed value range.
    #[default]
    Infer,
    Explicit(SegmentationMode),
}

/// BraTS tumor regions that can be shown or hidden independently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TumorCategory {
    Core,
    WholeTumor,
    Enhancing,
}

impl TumorCategory {
    pub const ALL: [TumorCategory; 3] = [
        TumorCategory::Core,
        TumorCategory::WholeTumor,
        TumorCategory::Enhancing,
    ];

    /// Base display color as `[r, g, b]`.
    pub const fn base_color(self) -> [u8; 3] {
        match self {
            TumorCategory::Core => [0, 0, 255],
            TumorCategory::WholeTumor => [255, 255, 0],
            TumorCategory::Enhancing => [255, 0, 0],
        }
    }

    /// Normalized intensity at which the category starts contributing.
    pub fn threshold(self) -> f64 {
        match self {
            TumorCategory::Core => 0.15,
            TumorCategory::WholeTumor => 0.25,
            TumorCategory::Enhancing => 0.40,
        }
    }

    /// Channel gains `[r, g, b]` multiplied by `t` when compositing.
    pub(crate) fn channel_gains(self) -> [f64; 3] {
        match self {
            TumorCategory::Core => [0.0, 100.0, 255.0],
            TumorCategory::WholeTumor => [255.0, 255.0, 0.0],
            TumorCategory::Enhancing => [255.0, 50.0, 0.0],
        }
    }

    /// Fraction of `255 * t` added to alpha when compositing.
    pub(crate) fn alpha_weight(self) -> f64 {
        match self {
            TumorCategory::Core => 0.8,
            TumorCategory::WholeTumor => 0.7,
            TumorCategory::Enhancing => 0.9,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisibilityState {
    AllVisible,
    PartialVisible,
    AllHidden,
}

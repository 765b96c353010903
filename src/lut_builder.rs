use crate::{
    color_table::{ColorTable, Rgba, TABLE_LEN},
    enums::{SegmentationMode, TumorCategory},
    volume_stats::VolumeStats,
};

/// Normalized intensity below which every table is transparent.
pub const NOISE_FLOOR: f64 = 0.10;

const CORE_BAND_END: f64 = 0.40;
const WHOLE_TUMOR_BAND_END: f64 = 0.70;

/// Fixed BraTS label code to color convention. Indices not listed stay transparent.
pub const LABEL_COLORS: [(usize, [u8; 3]); 4] = [
    (1, TumorCategory::Core.base_color()),
    (2, TumorCategory::WholeTumor.base_color()),
    (3, [0, 255, 0]),
    (4, TumorCategory::Enhancing.base_color()),
];

/// Normalized intensity of a bucket index.
#[inline]
pub(crate) fn bucket_intensity(index: usize) -> f64 {
    index as f64 / (TABLE_LEN - 1) as f64
}

pub struct LookupTableBuilder;

impl LookupTableBuilder {
    /// Build the base table for a segmentation layer.
    ///
    /// Statistics with a non-finite bound yield a fully transparent table so the
    /// viewer keeps rendering the anatomy without an overlay.
    pub fn build(stats: &VolumeStats, mode: SegmentationMode) -> ColorTable {
        if !stats.is_finite() {
            log::warn!(
                "Non-finite volume range [{}, {}], using transparent overlay",
                stats.min_value(),
                stats.max_value()
            );
            return ColorTable::transparent();
        }

        let table = match mode {
            SegmentationMode::DiscreteLabels => Self::label_table(),
            SegmentationMode::ProbabilityMap => Self::probability_table(),
        };
        log::debug!(
            "Built {mode:?} table for range [{}, {}]",
            stats.min_value(),
            stats.max_value()
        );
        table
    }

    /// Resolve the mode from the observed range, then build.
    pub fn build_inferred(stats: &VolumeStats) -> (SegmentationMode, ColorTable) {
        let mode = stats.classify();
        (mode, Self::build(stats, mode))
    }

    fn label_table() -> ColorTable {
        ColorTable::from_fn(|i| {
            LABEL_COLORS
                .iter()
                .find(|(label, _)| *label == i)
                .map(|(_, rgb)| Rgba::opaque(*rgb))
                .unwrap_or(Rgba::TRANSPARENT)
        })
    }

    fn probability_table() -> ColorTable {
        ColorTable::from_fn(|i| {
            let t = bucket_intensity(i);
            let scaled = 255.0 * t;
            if t < NOISE_FLOOR {
                Rgba::TRANSPARENT
            } else if t < CORE_BAND_END {
                Rgba::from_channels(0.0, 0.0, scaled, scaled)
            } else if t < WHOLE_TUMOR_BAND_END {
                Rgba::from_channels(scaled, scaled, 0.0, scaled)
            } else {
                Rgba::from_channels(255.0, 0.0, 0.0, scaled)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probability() -> ColorTable {
        LookupTableBuilder::build(&VolumeStats::new(0.0, 1.0), SegmentationMode::ProbabilityMap)
    }

    #[test]
    fn label_table_uses_fixed_colors() {
        let table =
            LookupTableBuilder::build(&VolumeStats::new(0.0, 4.0), SegmentationMode::DiscreteLabels);
        assert_eq!(table.len(), 256);
        assert_eq!(table[0].a, 0);
        assert_eq!(table[1], Rgba::new(0, 0, 255, 255));
        assert_eq!(table[2], Rgba::new(255, 255, 0, 255));
        assert_eq!(table[3], Rgba::new(0, 255, 0, 255));
        assert_eq!(table[4], Rgba::new(255, 0, 0, 255));
        assert!(table.iter().skip(5).all(|e| e.a == 0));
    }

    #[test]
    fn label_table_ignores_range() {
        let a = LookupTableBuilder::build(&VolumeStats::new(0.0, 4.0), SegmentationMode::DiscreteLabels);
        let b = LookupTableBuilder::build(
            &VolumeStats::new(-50.0, 900.0),
            SegmentationMode::DiscreteLabels,
        );
        assert_eq!(a, b);
    }

    #[test]
    fn probability_table_suppresses_noise_floor() {
        let table = probability();
        for (i, entry) in table.iter().enumerate() {
            if bucket_intensity(i) < NOISE_FLOOR {
                assert_eq!(*entry, Rgba::TRANSPARENT, "bucket {i}");
            }
        }
        assert_eq!(table[25].a, 0);
        assert!(table[26].a > 0);
    }

    #[test]
    fn probability_table_bands() {
        let table = probability();
        // 0.2 -> core band, blue only
        let low = table[51];
        assert_eq!((low.r, low.g, low.b, low.a), (0, 0, 51, 51));
        // 0.6 -> yellow
        let mid = table[153];
        assert_eq!((mid.r, mid.g, mid.b), (mid.a, mid.a, 0));
        assert!(mid.a >= 152);
        // 1.0 -> full red
        assert_eq!(table[255], Rgba::new(255, 0, 0, 255));
    }

    #[test]
    fn probability_alpha_is_monotonic_within_bands() {
        let table = probability();
        let band = |t: f64| {
            if t < NOISE_FLOOR {
                0
            } else if t < CORE_BAND_END {
                1
            } else if t < WHOLE_TUMOR_BAND_END {
                2
            } else {
                3
            }
        };
        for i in 1..TABLE_LEN {
            if band(bucket_intensity(i)) == band(bucket_intensity(i - 1)) {
                assert!(table[i].a >= table[i - 1].a, "alpha dropped at bucket {i}");
            }
        }
    }

    #[test]
    fn builder_is_deterministic() {
        let stats = VolumeStats::new(0.0, 3.0);
        for mode in [SegmentationMode::DiscreteLabels, SegmentationMode::ProbabilityMap] {
            assert_eq!(
                LookupTableBuilder::build(&stats, mode).as_bytes(),
                LookupTableBuilder::build(&stats, mode).as_bytes()
            );
        }
    }

    #[test]
    fn non_finite_stats_fall_back_to_transparent() {
        let stats = VolumeStats::new(f64::NAN, f64::INFINITY);
        let table = LookupTableBuilder::build(&stats, SegmentationMode::DiscreteLabels);
        assert!(table.iter().all(|e| *e == Rgba::TRANSPARENT));
    }

    #[test]
    fn inferred_build_picks_probability_for_unit_range() {
        let (mode, table) = LookupTableBuilder::build_inferred(&VolumeStats::new(0.0, 1.0));
        assert_eq!(mode, SegmentationMode::ProbabilityMap);
        assert_eq!(table, probability());
    }
}

use crate::{
    color_table::{ColorTable, Rgba},
    enums::{TumorCategory, VisibilityState},
    lut_builder::{NOISE_FLOOR, bucket_intensity},
};

/// Independent on/off toggle per tumor category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VisibilitySet {
    pub core: bool,
    pub whole_tumor: bool,
    pub enhancing: bool,
}

impl Default for VisibilitySet {
    fn default() -> Self {
        Self::all()
    }
}

impl VisibilitySet {
    pub const fn all() -> Self {
        Self {
            core: true,
            whole_tumor: true,
            enhancing: true,
        }
    }

    pub const fn none() -> Self {
        Self {
            core: false,
            whole_tumor: false,
            enhancing: false,
        }
    }

    pub fn is_visible(&self, category: TumorCategory) -> bool {
        match category {
            TumorCategory::Core => self.core,
            TumorCategory::WholeTumor => self.whole_tumor,
            TumorCategory::Enhancing => self.enhancing,
        }
    }

    pub fn set(&mut self, category: TumorCategory, visible: bool) {
        match category {
            TumorCategory::Core => self.core = visible,
            TumorCategory::WholeTumor => self.whole_tumor = visible,
            TumorCategory::Enhancing => self.enhancing = visible,
        }
    }

    /// Returns a copy with `category` flipped.
    #[must_use]
    pub fn toggled(mut self, category: TumorCategory) -> Self {
        self.set(category, !self.is_visible(category));
        self
    }

    pub fn enabled(&self) -> impl Iterator<Item = TumorCategory> + '_ {
        TumorCategory::ALL
            .into_iter()
            .filter(|category| self.is_visible(*category))
    }

    pub fn state(&self) -> VisibilityState {
        match self.enabled().count() {
            0 => VisibilityState::AllHidden,
            n if n == TumorCategory::ALL.len() => VisibilityState::AllVisible,
            _ => VisibilityState::PartialVisible,
        }
    }
}

pub struct VisibilityCompositor;

impl VisibilityCompositor {
    /// Layer the enabled categories into a fresh table.
    ///
    /// Contributions are summed per channel, so buckets that clear several
    /// thresholds saturate toward the later categories' colors.
    pub fn compose(visibility: &VisibilitySet) -> ColorTable {
        if visibility.state() == VisibilityState::AllHidden {
            log::debug!("All tumor categories hidden, composing transparent table");
            return ColorTable::transparent();
        }

        let table = ColorTable::from_fn(|i| Self::compose_bucket(visibility, bucket_intensity(i)));
        log::debug!("Composed overlay table for {visibility:?}");
        table
    }

    fn compose_bucket(visibility: &VisibilitySet, t: f64) -> Rgba {
        if t < NOISE_FLOOR {
            return Rgba::TRANSPARENT;
        }

        let mut sum = [0.0_f64; 4];
        let mut contributed = false;
        for category in visibility.enabled().filter(|c| c.threshold() <= t) {
            let [r, g, b] = category.channel_gains();
            sum[0] += r * t;
            sum[1] += g * t;
            sum[2] += b * t;
            sum[3] += 255.0 * t * category.alpha_weight();
            contributed = true;
        }

        if !contributed {
            return Rgba::TRANSPARENT;
        }
        Rgba::from_channels(sum[0], sum[1], sum[2], sum[3])
    }
}

use std::sync::Arc;

use thiserror::Error;

use crate::{
    color_table::ColorTable,
    compositor::{VisibilityCompositor, VisibilitySet},
    enums::{ModeSelection, SegmentationMode, TumorCategory, VisibilityState},
    lut_builder::LookupTableBuilder,
    renderer::{OverlayRenderer, OverlayUpdate, RendererError, VolumeId},
    volume_stats::VolumeStats,
};

pub const DEFAULT_OPACITY: f32 = 0.5;

#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("Renderer error: {0}")]
    Renderer(#[from] RendererError),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayOptions {
    /// Segmentation layer opacity, clamped to `0..=1`.
    pub opacity: f32,
    pub mode: ModeSelection,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            opacity: DEFAULT_OPACITY,
            mode: ModeSelection::default(),
        }
    }
}

fn clamp_opacity(opacity: f32) -> f32 {
    if opacity.is_nan() {
        return 0.0;
    }
    opacity.clamp(0.0, 1.0)
}

/// Owns the renderer handle for one segmentation layer and keeps its table in
/// sync with the user's category toggles.
pub struct OverlaySession<R: OverlayRenderer> {
    renderer: R,
    volume: VolumeId,
    stats: VolumeStats,
    mode: SegmentationMode,
    indexing: SegmentationMode,
    opacity: f32,
    visibility: VisibilitySet,
    active: Arc<ColorTable>,
}

impl<R: OverlayRenderer> OverlaySession<R> {
    /// Resolve the segmentation mode, install the base table and redraw.
    pub fn load(
        renderer: R,
        volume: VolumeId,
        options: OverlayOptions,
    ) -> Result<Self, OverlayError> {
        let stats = renderer.volume_stats(volume)?;
        let (mode, table) = match options.mode {
            ModeSelection::Infer => LookupTableBuilder::build_inferred(&stats),
            ModeSelection::Explicit(mode) => (mode, LookupTableBuilder::build(&stats, mode)),
        };
        log::info!(
            "Loading overlay {volume} as {mode:?} (range [{}, {}])",
            stats.min_value(),
            stats.max_value()
        );

        let mut session = Self {
            renderer,
            volume,
            stats,
            mode,
            indexing: mode,
            opacity: clamp_opacity(options.opacity),
            visibility: VisibilitySet::all(),
            active: Arc::new(table),
        };
        session.install()?;
        Ok(session)
    }

    /// Flip one category and install the recomposed table.
    pub fn toggle(&mut self, category: TumorCategory) -> Result<Arc<ColorTable>, OverlayError> {
        self.set_visibility(self.visibility.toggled(category))
    }

    pub fn set_visibility(
        &mut self,
        visibility: VisibilitySet,
    ) -> Result<Arc<ColorTable>, OverlayError> {
        self.visibility = visibility;
        // Composed tables are intensity-indexed whatever the source mode was.
        self.indexing = SegmentationMode::ProbabilityMap;
        self.active = Arc::new(VisibilityCompositor::compose(&self.visibility));
        self.install()?;
        Ok(Arc::clone(&self.active))
    }

    pub fn set_opacity(&mut self, opacity: f32) -> Result<(), OverlayError> {
        self.opacity = clamp_opacity(opacity);
        self.install()
    }

    fn install(&mut self) -> Result<(), OverlayError> {
        self.renderer.replace_overlay_table(
            self.volume,
            OverlayUpdate {
                table: Arc::clone(&self.active),
                indexing: self.indexing,
                opacity: self.opacity,
            },
        )?;
        self.renderer.redraw()?;
        Ok(())
    }

    pub fn visibility(&self) -> VisibilitySet {
        self.visibility
    }

    pub fn visibility_state(&self) -> VisibilityState {
        self.visibility.state()
    }

    pub fn mode(&self) -> SegmentationMode {
        self.mode
    }

    pub fn stats(&self) -> VolumeStats {
        self.stats
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn volume(&self) -> VolumeId {
        self.volume
    }

    pub fn active_table(&self) -> Arc<ColorTable> {
        Arc::clone(&self.active)
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }
}

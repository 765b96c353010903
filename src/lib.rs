//! # BraTS overlay library
//!
//! This crate computes the color lookup tables used to draw tumor
//! segmentations (BraTS challenge data) on top of brain-MRI volumes.
//!
//! A segmentation volume either holds discrete label codes or continuous
//! per-voxel probabilities. The [`LookupTableBuilder`] turns the observed value
//! range and a [`SegmentationMode`] into a 256-entry RGBA [`ColorTable`]:
//!  - Discrete labels use the fixed BraTS convention (1 core, 2 edema,
//!    3 non-enhancing, 4 enhancing)
//!  - Probability maps are banded by confidence with a noise floor at 10%
//!
//!  The [`VisibilityCompositor`] derives a table from the currently enabled
//!  tumor categories (Core, Whole Tumor, Enhancing) by layering each
//!  category's color above its activation threshold. Tables are immutable;
//!  every call returns a fresh one.
//!
//!  Rendering is delegated to an [`OverlayRenderer`]. An [`OverlaySession`]
//!  holds the renderer for one segmentation layer and reinstalls the table on
//!  every toggle. [`CpuSliceRenderer`] is a software backend that blends
//!  layers onto grayscale slices.
//!
//! # Examples
//!
//! ## Hiding the whole tumor region
//!
//! ```no_run
//! # use brats_overlay::*;
//! let anatomy = Volume::from_shape_vec((1, 2, 2), vec![0.0, 10.0, 20.0, 30.0])?;
//! let segmentation = Volume::from_shape_vec((1, 2, 2), vec![0.0, 0.3, 0.6, 0.9])?;
//! let mut renderer = CpuSliceRenderer::new(anatomy);
//! let id = renderer.add_overlay(segmentation)?;
//!
//! let mut session = OverlaySession::load(&mut renderer, id, OverlayOptions::default())?;
//! session.toggle(TumorCategory::WholeTumor)?;
//! drop(session);
//!
//! renderer.render_slice(0, Orientation::Axial)?.save("overlay.png")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod color_table;
pub mod compositor;
pub mod enums;
pub mod lut_builder;
pub mod overlay;
pub mod renderer;
pub mod volume;
pub mod volume_stats;

pub use color_table::{ColorTable, Rgba};
pub use compositor::{VisibilityCompositor, VisibilitySet};
pub use enums::{ModeSelection, Orientation, SegmentationMode, TumorCategory, VisibilityState};
pub use lut_builder::LookupTableBuilder;
pub use overlay::{OverlayError, OverlayOptions, OverlaySession};
pub use renderer::{CpuSliceRenderer, OverlayRenderer, OverlayUpdate, RendererError, VolumeId};
pub use volume::{Volume, VolumeError};
pub use volume_stats::VolumeStats;

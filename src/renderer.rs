use std::fmt;
use std::sync::Arc;

use image::{ImageBuffer, Rgba as ImageRgba};
use ndarray::ArrayView2;
use rayon::prelude::*;
use thiserror::Error;

use crate::{
    color_table::ColorTable,
    enums::{Orientation, SegmentationMode},
    volume::Volume,
    volume_stats::VolumeStats,
};

pub type RgbaImage = ImageBuffer<ImageRgba<u8>, Vec<u8>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VolumeId(pub u32);

impl fmt::Display for VolumeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "volume#{}", self.0)
    }
}

#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Unknown {0}")]
    UnknownVolume(VolumeId),

    #[error("Overlay dimensions {found:?} do not match base volume {expected:?}")]
    DimensionMismatch {
        expected: (usize, usize, usize),
        found: (usize, usize, usize),
    },

    #[error("Slice {index} is out of range for {orientation:?}")]
    SliceOutOfRange {
        index: usize,
        orientation: Orientation,
    },

    #[error("Failed to assemble output frame")]
    Frame,
}

/// A lookup table ready to be applied to one segmentation layer.
#[derive(Clone, Debug)]
pub struct OverlayUpdate {
    pub table: Arc<ColorTable>,
    /// How voxel values select a table bucket.
    pub indexing: SegmentationMode,
    /// Layer opacity in `0..=1`, multiplied into each entry's alpha.
    pub opacity: f32,
}

/// Display backend that draws segmentation layers over an anatomical volume.
pub trait OverlayRenderer {
    fn volume_stats(&self, volume: VolumeId) -> Result<VolumeStats, RendererError>;

    /// Swap the active table of a layer. The previous table is dropped, never edited.
    fn replace_overlay_table(
        &mut self,
        volume: VolumeId,
        update: OverlayUpdate,
    ) -> Result<(), RendererError>;

    fn redraw(&mut self) -> Result<(), RendererError>;
}

impl<R: OverlayRenderer + ?Sized> OverlayRenderer for &mut R {
    fn volume_stats(&self, volume: VolumeId) -> Result<VolumeStats, RendererError> {
        (**self).volume_stats(volume)
    }

    fn replace_overlay_table(
        &mut self,
        volume: VolumeId,
        update: OverlayUpdate,
    ) -> Result<(), RendererError> {
        (**self).replace_overlay_table(volume, update)
    }

    fn redraw(&mut self) -> Result<(), RendererError> {
        (**self).redraw()
    }
}

struct OverlayLayer {
    id: VolumeId,
    volume: Volume,
    stats: VolumeStats,
    update: Option<OverlayUpdate>,
}

/// Software renderer producing RGBA slices: grayscale anatomy with
/// alpha-blended segmentation layers on top.
pub struct CpuSliceRenderer {
    base: Volume,
    base_stats: VolumeStats,
    overlays: Vec<OverlayLayer>,
    next_id: u32,
    frames: u64,
}

impl CpuSliceRenderer {
    pub fn new(base: Volume) -> Self {
        let base_stats = base.stats();
        Self {
            base,
            base_stats,
            overlays: Vec::new(),
            next_id: 0,
            frames: 0,
        }
    }

    /// Register a segmentation layer. It stays invisible until a table is installed.
    pub fn add_overlay(&mut self, volume: Volume) -> Result<VolumeId, RendererError> {
        if volume.dim() != self.base.dim() {
            return Err(RendererError::DimensionMismatch {
                expected: self.base.dim(),
                found: volume.dim(),
            });
        }
        let id = VolumeId(self.next_id);
        self.next_id += 1;
        let stats = volume.stats();
        log::info!(
            "Registered overlay {id} with range [{}, {}]",
            stats.min_value(),
            stats.max_value()
        );
        self.overlays.push(OverlayLayer {
            id,
            volume,
            stats,
            update: None,
        });
        Ok(id)
    }

    /// Number of redraws requested so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn active_table(&self, volume: VolumeId) -> Result<Option<Arc<ColorTable>>, RendererError> {
        Ok(self
            .layer(volume)?
            .update
            .as_ref()
            .map(|update| Arc::clone(&update.table)))
    }

    fn layer(&self, volume: VolumeId) -> Result<&OverlayLayer, RendererError> {
        self.overlays
            .iter()
            .find(|layer| layer.id == volume)
            .ok_or(RendererError::UnknownVolume(volume))
    }

    pub fn render_slice(
        &self,
        index: usize,
        orientation: Orientation,
    ) -> Result<RgbaImage, RendererError> {
        let base = self
            .base
            .get_slice_from_axis(index, orientation)
            .ok_or(RendererError::SliceOutOfRange { index, orientation })?;

        // Overlays share the base dimensions, so the same index is valid for each.
        let layers: Vec<(ArrayView2<'_, f32>, &VolumeStats, &OverlayUpdate)> = self
            .overlays
            .iter()
            .filter_map(|layer| {
                let update = layer.update.as_ref()?;
                let slice = layer.volume.get_slice_from_axis(index, orientation)?;
                Some((slice, &layer.stats, update))
            })
            .collect();

        let (height, width) = base.dim();
        let pixel_data: Vec<u8> = (0..height)
            .into_par_iter()
            .flat_map(|y| {
                (0..width)
                    .flat_map(|x| {
                        let gray = self.gray_level(base[[y, x]]);
                        let mut pixel = [gray; 3];
                        for (slice, stats, update) in &layers {
                            let bucket = stats.bucket(slice[[y, x]] as f64, update.indexing);
                            blend(&mut pixel, update, bucket);
                        }
                        [pixel[0] as u8, pixel[1] as u8, pixel[2] as u8, 255]
                    })
                    .collect::<Vec<u8>>()
            })
            .collect();

        ImageBuffer::from_raw(width as u32, height as u32, pixel_data).ok_or(RendererError::Frame)
    }

    #[inline]
    fn gray_level(&self, value: f32) -> f32 {
        let min = self.base_stats.min_value();
        let range = self.base_stats.max_value() - min;
        if !(range.is_finite() && range > 0.0) || value.is_nan() {
            return 0.0;
        }
        (((value as f64 - min) / range) * 255.0).clamp(0.0, 255.0) as f32
    }
}

#[inline]
fn blend(pixel: &mut [f32; 3], update: &OverlayUpdate, bucket: u8) {
    let entry = update.table.get(bucket);
    let alpha = entry.a as f32 / 255.0 * update.opacity;
    if alpha <= 0.0 {
        return;
    }
    for (channel, color) in pixel.iter_mut().zip([entry.r, entry.g, entry.b]) {
        *channel = *channel * (1.0 - alpha) + color as f32 * alpha;
    }
}

impl OverlayRenderer for CpuSliceRenderer {
    fn volume_stats(&self, volume: VolumeId) -> Result<VolumeStats, RendererError> {
        Ok(self.layer(volume)?.stats)
    }

    fn replace_overlay_table(
        &mut self,
        volume: VolumeId,
        update: OverlayUpdate,
    ) -> Result<(), RendererError> {
        let layer = self
            .overlays
            .iter_mut()
            .find(|layer| layer.id == volume)
            .ok_or(RendererError::UnknownVolume(volume))?;
        log::debug!(
            "Installing {:?}-indexed table on {volume} at opacity {}",
            update.indexing,
            update.opacity
        );
        layer.update = Some(update);
        Ok(())
    }

    fn redraw(&mut self) -> Result<(), RendererError> {
        self.frames += 1;
        log::debug!("Redraw #{}", self.frames);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_table::Rgba;

    fn volume(voxels: Vec<f32>) -> Volume {
        Volume::from_shape_vec((1, 2, 2), voxels).unwrap()
    }

    fn red_at_label_one() -> Arc<ColorTable> {
        Arc::new(ColorTable::from_fn(|i| {
            if i == 1 {
                Rgba::opaque([255, 0, 0])
            } else {
                Rgba::TRANSPARENT
            }
        }))
    }

    #[test]
    fn renders_grayscale_base_without_tables() {
        let mut renderer = CpuSliceRenderer::new(volume(vec![0.0, 1.0, 2.0, 4.0]));
        renderer.add_overlay(volume(vec![1.0; 4])).unwrap();
        let frame = renderer.render_slice(0, Orientation::Axial).unwrap();
        assert_eq!(frame.dimensions(), (2, 2));
        assert_eq!(frame.get_pixel(0, 0).0, [0, 0, 0, 255]);
        assert_eq!(frame.get_pixel(1, 1).0, [255, 255, 255, 255]);
    }

    #[test]
    fn blends_overlay_by_opacity() {
        let mut renderer = CpuSliceRenderer::new(volume(vec![0.0, 0.0, 0.0, 4.0]));
        let id = renderer.add_overlay(volume(vec![1.0, 0.0, 0.0, 0.0])).unwrap();
        renderer
            .replace_overlay_table(
                id,
                OverlayUpdate {
                    table: red_at_label_one(),
                    indexing: SegmentationMode::DiscreteLabels,
                    opacity: 0.5,
                },
            )
            .unwrap();
        let frame = renderer.render_slice(0, Orientation::Axial).unwrap();
        assert_eq!(frame.get_pixel(0, 0).0, [127, 0, 0, 255]);
        // label 0 is transparent, anatomy shows through
        assert_eq!(frame.get_pixel(1, 1).0, [255, 255, 255, 255]);
    }

    #[test]
    fn rejects_unknown_and_mismatched_volumes() {
        let mut renderer = CpuSliceRenderer::new(volume(vec![0.0; 4]));
        let wrong = Volume::from_shape_vec((2, 2, 2), vec![0.0; 8]).unwrap();
        assert!(matches!(
            renderer.add_overlay(wrong),
            Err(RendererError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            renderer.volume_stats(VolumeId(9)),
            Err(RendererError::UnknownVolume(VolumeId(9)))
        ));
        assert!(matches!(
            renderer.render_slice(1, Orientation::Axial),
            Err(RendererError::SliceOutOfRange { index: 1, .. })
        ));
    }

    #[test]
    fn replacing_keeps_previous_table_intact() {
        let mut renderer = CpuSliceRenderer::new(volume(vec![0.0; 4]));
        let id = renderer.add_overlay(volume(vec![1.0; 4])).unwrap();
        let first = red_at_label_one();
        let update = |table| OverlayUpdate {
            table,
            indexing: SegmentationMode::DiscreteLabels,
            opacity: 1.0,
        };
        renderer.replace_overlay_table(id, update(Arc::clone(&first))).unwrap();
        renderer
            .replace_overlay_table(id, update(Arc::new(ColorTable::transparent())))
            .unwrap();
        assert_eq!(first[1], Rgba::opaque([255, 0, 0]));
        assert_eq!(
            *renderer.active_table(id).unwrap().unwrap(),
            ColorTable::transparent()
        );
    }
}

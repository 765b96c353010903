use crate::enums::Orientation;
use crate::volume_stats::VolumeStats;

use ndarray::Array3;
use ndarray::ArrayView2;
use ndarray::s;
use rayon::prelude::*;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VolumeError {
    #[error("Volume has no voxels")]
    Empty,

    #[error("Shape {shape:?} does not match {len} voxels")]
    Shape {
        shape: (usize, usize, usize),
        len: usize,
    },
}

/// A scalar volume laid out as (depth, height, width).
#[derive(Clone, Debug)]
pub struct Volume {
    pub data: Array3<f32>,
}

impl Volume {
    pub fn new(data: Array3<f32>) -> Result<Self, VolumeError> {
        if data.is_empty() {
            return Err(VolumeError::Empty);
        }
        Ok(Self { data })
    }

    /// Wrap a flat voxel buffer as decoded by a NIfTI reader.
    pub fn from_shape_vec(
        shape: (usize, usize, usize),
        voxels: Vec<f32>,
    ) -> Result<Self, VolumeError> {
        let len = voxels.len();
        let data = Array3::from_shape_vec(shape, voxels)
            .map_err(|_| VolumeError::Shape { shape, len })?;
        Self::new(data)
    }

    /// Get the dimensions of the volume (depth, height, width)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    /// Observed value range, skipping NaN voxels.
    ///
    /// A volume where every voxel is NaN yields NaN bounds, which the
    /// table builder turns into a transparent overlay.
    pub fn stats(&self) -> VolumeStats {
        let (min, max) = self
            .data
            .par_iter()
            .filter(|v| !v.is_nan())
            .fold(
                || (f32::INFINITY, f32::NEG_INFINITY),
                |(min, max), &v| (min.min(v), max.max(v)),
            )
            .reduce(
                || (f32::INFINITY, f32::NEG_INFINITY),
                |a, b| (a.0.min(b.0), a.1.max(b.1)),
            );
        if min > max {
            return VolumeStats::new(f64::NAN, f64::NAN);
        }
        VolumeStats::new(min as f64, max as f64)
    }

    pub fn get_slice_from_axis(
        &self,
        index: usize,
        orientation: Orientation,
    ) -> Option<ArrayView2<'_, f32>> {
        if !self.is_valid_index(index, orientation) {
            return None;
        }
        let slice = match orientation {
            Orientation::Axial => self.data.slice(s![index, .., ..]),
            Orientation::Coronal => self.data.slice(s![.., index, ..]),
            Orientation::Sagittal => self.data.slice(s![.., .., index]),
        };
        Some(slice)
    }

    fn is_valid_index(&self, index: usize, orientation: Orientation) -> bool {
        let dim = self.data.dim();
        let max_index = match orientation {
            Orientation::Axial => dim.0,
            Orientation::Coronal => dim.1,
            Orientation::Sagittal => dim.2,
        };
        index < max_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Volume {
        let voxels = (0..24).map(|v| v as f32).collect();
        Volume::from_shape_vec((2, 3, 4), voxels).unwrap()
    }

    #[test]
    fn rejects_mismatched_shape() {
        let err = Volume::from_shape_vec((2, 2, 2), vec![0.0; 7]).unwrap_err();
        assert!(matches!(err, VolumeError::Shape { len: 7, .. }));
    }

    #[test]
    fn rejects_empty_volume() {
        let err = Volume::from_shape_vec((0, 2, 2), vec![]).unwrap_err();
        assert!(matches!(err, VolumeError::Empty));
    }

    #[test]
    fn stats_skip_nan() {
        let mut volume = ramp();
        volume.data[[0, 0, 0]] = f32::NAN;
        let stats = volume.stats();
        assert_eq!(stats.min_value(), 1.0);
        assert_eq!(stats.max_value(), 23.0);
    }

    #[test]
    fn all_nan_volume_has_non_finite_stats() {
        let volume = Volume::from_shape_vec((1, 1, 2), vec![f32::NAN; 2]).unwrap();
        assert!(!volume.stats().is_finite());
    }

    #[test]
    fn slices_follow_orientation() {
        let volume = ramp();
        assert_eq!(
            volume.get_slice_from_axis(1, Orientation::Axial).unwrap().dim(),
            (3, 4)
        );
        assert_eq!(
            volume.get_slice_from_axis(2, Orientation::Coronal).unwrap().dim(),
            (2, 4)
        );
        let sagittal = volume.get_slice_from_axis(3, Orientation::Sagittal).unwrap();
        assert_eq!(sagittal.dim(), (2, 3));
        assert_eq!(sagittal[[1, 2]], 23.0);
        assert!(volume.get_slice_from_axis(4, Orientation::Sagittal).is_none());
    }
}

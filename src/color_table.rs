use std::ops::Index;

use bytemuck::{Pod, Zeroable};
use image::{ImageBuffer, Rgba as ImageRgba};

/// Number of intensity buckets in a lookup table.
pub const TABLE_LEN: usize = 256;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Floors and clamps floating point channels into bytes. NaN maps to 0.
    pub(crate) fn from_channels(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self {
            r: channel_to_u8(r),
            g: channel_to_u8(g),
            b: channel_to_u8(b),
            a: channel_to_u8(a),
        }
    }
}

#[inline]
pub(crate) fn channel_to_u8(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 255.0).floor() as u8
}

/// Immutable 256-entry RGBA lookup table indexed by intensity bucket.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ColorTable {
    entries: [Rgba; TABLE_LEN],
}

impl ColorTable {
    pub fn transparent() -> Self {
        Self {
            entries: [Rgba::TRANSPARENT; TABLE_LEN],
        }
    }

    /// Build a table by evaluating `f` for every bucket index.
    pub fn from_fn(f: impl FnMut(usize) -> Rgba) -> Self {
        Self {
            entries: std::array::from_fn(f),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn get(&self, bucket: u8) -> Rgba {
        self.entries[bucket as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rgba> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[Rgba; TABLE_LEN] {
        &self.entries
    }

    /// Raw interleaved RGBA bytes, 4 per entry, for upload to a renderer.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.entries)
    }

    /// Horizontal strip preview: one column per bucket.
    pub fn to_image(&self, height: u32) -> ImageBuffer<ImageRgba<u8>, Vec<u8>> {
        ImageBuffer::from_fn(TABLE_LEN as u32, height.max(1), |x, _| {
            let Rgba { r, g, b, a } = self.entries[x as usize];
            ImageRgba([r, g, b, a])
        })
    }
}

impl Index<usize> for ColorTable {
    type Output = Rgba;

    fn index(&self, index: usize) -> &Self::Output {
        &self.entries[index]
    }
}

impl std::fmt::Debug for ColorTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let visible = self.entries.iter().filter(|e| e.a > 0).count();
        f.debug_struct("ColorTable")
            .field("len", &TABLE_LEN)
            .field("visible_entries", &visible)
            .finish()
    }
}

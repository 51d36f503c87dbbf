// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The narrow raster-bitmap interface the container talks to.
//!
//! The codec does not know or care which image library a caller uses; it
//! only needs dimensions, a row-major ARGB pixel buffer, and (for hosts that
//! already carry an indexed bitmap) an embedded palette. [`ImageRaster`]
//! implements this over the `image` crate, the same crate the retrieval
//! pack's egui-based frontends use for PNG interchange.

use crate::color::Color;

/// A read/write view over a host bitmap.
///
/// There is no separate lock/unlock step: every implementation here is a
/// plain owned buffer, so "acquiring" the pixel plane is just borrowing it.
/// A host backed by a windowing toolkit's shared framebuffer would implement
/// the borrow as an RAII guard instead; the trait does not need to know.
pub trait Raster {
    /// Pixel width.
    fn width(&self) -> u32;
    /// Pixel height.
    fn height(&self) -> u32;

    /// Read all pixels in row-major (x fastest) order.
    fn read_pixels(&self) -> Vec<Color>;

    /// Read up to `max_entries` palette entries, if this raster already
    /// carries an indexed representation. Returns `None` for true-color
    /// hosts.
    fn read_palette(&self, _max_entries: usize) -> Option<Vec<Color>> {
        None
    }
}

/// An owned, row-major RGBA bitmap backed by `image::RgbaImage`.
#[derive(Debug, Clone)]
pub struct ImageRaster {
    image: image::RgbaImage,
}

impl ImageRaster {
    /// Wrap an existing `image::RgbaImage`.
    pub fn new(image: image::RgbaImage) -> Self {
        Self { image }
    }

    /// Build a raster from a row-major [`Color`] buffer.
    pub fn from_colors(width: u32, height: u32, colors: &[Color]) -> Self {
        let mut buf = image::RgbaImage::new(width, height);
        for (pixel, color) in buf.pixels_mut().zip(colors) {
            *pixel = image::Rgba([color.r, color.g, color.b, color.a]);
        }
        Self { image: buf }
    }

    /// Borrow the underlying `image` crate bitmap.
    pub fn as_rgba_image(&self) -> &image::RgbaImage {
        &self.image
    }

    /// Consume this raster, returning the underlying `image` crate bitmap.
    pub fn into_rgba_image(self) -> image::RgbaImage {
        self.image
    }
}

impl From<image::DynamicImage> for ImageRaster {
    fn from(image: image::DynamicImage) -> Self {
        Self {
            image: image.to_rgba8(),
        }
    }
}

impl Raster for ImageRaster {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn read_pixels(&self) -> Vec<Color> {
        self.image
            .pixels()
            .map(|p| Color::new(p.0[0], p.0[1], p.0[2], p.0[3]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_an_rgba_image() {
        let colors = vec![
            Color::new(1, 2, 3, 4),
            Color::new(5, 6, 7, 8),
            Color::new(9, 10, 11, 12),
            Color::new(13, 14, 15, 16),
        ];
        let raster = ImageRaster::from_colors(2, 2, &colors);
        assert_eq!(raster.width(), 2);
        assert_eq!(raster.height(), 2);
        assert_eq!(raster.read_pixels(), colors);
        assert!(raster.read_palette(256).is_none());
    }
}

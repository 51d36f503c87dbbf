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

//! The TMX container: header framing, palette/pixel dispatch, mip chain
//! handling, and the public `parse`/`serialize`/`from_raster`/`to_raster`
//! operations that tie the rest of the crate together.

use std::cell::RefCell;
use std::io::{Read, Seek, SeekFrom, Write};
use std::rc::Rc;

use crate::color::Color;
use crate::error::{Result, TmxError};
use crate::framing;
use crate::io;
use crate::pixel_format::PixelFormat;
use crate::quantizer::{self, QuantizeOptions};
use crate::raster::{ImageRaster, Raster};

const MAGIC: &[u8; 4] = b"TMX0";
const HEADER_LEN: u64 = 16;
const BODY_HEADER_LEN: usize = 1 + 1 + 2 + 2 + 1 + 1 + 2 + 1 + 1 + 4 + 4 + 28;

/// Horizontal/vertical texture wrap mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    /// Tile the texture.
    Repeat,
    /// Clamp to the edge texel.
    Clamp,
}

impl WrapMode {
    fn from_bits(bits: u8) -> Self {
        if bits & 0b01 != 0 {
            WrapMode::Clamp
        } else {
            WrapMode::Repeat
        }
    }

    fn to_bits(self) -> u8 {
        match self {
            WrapMode::Repeat => 0b00,
            WrapMode::Clamp => 0b01,
        }
    }
}

/// The payload a [`TmxImage`] carries, depending on whether its pixel format
/// is indexed.
#[derive(Debug, Clone)]
enum Payload {
    Indexed {
        palettes: Vec<Vec<Color>>,
        indices: Vec<u8>,
        mip_indices: Vec<Vec<u8>>,
    },
    Direct {
        pixels: Vec<Color>,
        mip_pixels: Vec<Vec<Color>>,
    },
}

/// A decoded TMX texture: header fields plus the palette/pixel or
/// direct-pixel payload.
#[derive(Debug)]
pub struct TmxImage {
    width: u16,
    height: u16,
    pixel_format: PixelFormat,
    palette_format: Option<PixelFormat>,
    mip_count: u8,
    mip_kl: u16,
    wrap_modes: u8,
    /// Opaque game-assigned texture identifier.
    pub user_texture_id: i32,
    /// Opaque game-assigned CLUT identifier.
    pub user_clut_id: i32,
    user_comment: String,
    payload: Payload,
    raster_cache: RefCell<Option<(usize, i32, Rc<image::RgbaImage>)>>,
}

fn mip_dims(base_width: u32, base_height: u32, level: u32) -> (u32, u32) {
    let divisor = 4 * level;
    (base_width / divisor, base_height / divisor)
}

fn validate_indices(indices: &[u8], palette_color_count: u16) -> Result<()> {
    if indices.iter().any(|&i| i as u16 >= palette_color_count) {
        return Err(TmxError::InvalidFormat(format!(
            "index out of range for a {palette_color_count}-entry palette"
        )));
    }
    Ok(())
}

fn read_u8<R: Read>(reader: &mut R) -> Result<u8> {
    let mut b = [0u8; 1];
    reader.read_exact(&mut b)?;
    Ok(b[0])
}

fn read_u16<R: Read>(reader: &mut R) -> Result<u16> {
    let mut b = [0u8; 2];
    reader.read_exact(&mut b)?;
    Ok(u16::from_le_bytes(b))
}

fn read_i32<R: Read>(reader: &mut R) -> Result<i32> {
    let mut b = [0u8; 4];
    reader.read_exact(&mut b)?;
    Ok(i32::from_le_bytes(b))
}

fn write_u8<W: Write>(writer: &mut W, v: u8) -> Result<()> {
    writer.write_all(&[v])?;
    Ok(())
}

fn write_u16<W: Write>(writer: &mut W, v: u16) -> Result<()> {
    writer.write_all(&v.to_le_bytes())?;
    Ok(())
}

fn write_i32<W: Write>(writer: &mut W, v: i32) -> Result<()> {
    writer.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Number of colors a palette of this pixel format requires (0 if direct).
fn palette_dims(palette_color_count: u16) -> (u32, u32) {
    if palette_color_count == 256 {
        (16, 16)
    } else {
        (4, 4)
    }
}

impl TmxImage {
    /// Base level width.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Base level height.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// The pixel storage mode this image is encoded in.
    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    /// Number of mip levels beyond the base level.
    pub fn mip_count(&self) -> u8 {
        self.mip_count
    }

    /// Number of palettes carried (0 for non-indexed images).
    pub fn palette_count(&self) -> u8 {
        match &self.payload {
            Payload::Indexed { palettes, .. } => palettes.len() as u8,
            Payload::Direct { .. } => 0,
        }
    }

    /// The user comment string (at most 27 characters, per the fixed 28-byte
    /// NUL-padded wire field).
    pub fn user_comment(&self) -> &str {
        &self.user_comment
    }

    /// Set the user comment. Longer-than-27-character strings are truncated
    /// at serialize time, with a logged warning.
    pub fn set_user_comment(&mut self, comment: impl Into<String>) {
        self.user_comment = comment.into();
    }

    /// Mip K, a signed fractional value with 4 bits of fraction. Returns
    /// -0.0625 when the field is unset (`mip_kl == 0xFFFF`), per the GS
    /// convention this port implements for that sentinel.
    pub fn mip_k(&self) -> f32 {
        if self.mip_kl == 0xFFFF {
            return -0.0625;
        }
        let raw = (self.mip_kl & 0x0FFF) as i32;
        let signed = if raw & 0x0800 != 0 { raw - 0x1000 } else { raw };
        signed as f32 / 16.0
    }

    /// Mip L, a small unsigned shift count. Returns 3 when the field is unset
    /// (`mip_kl == 0xFFFF`).
    pub fn mip_l(&self) -> u8 {
        if self.mip_kl == 0xFFFF {
            return 3;
        }
        ((self.mip_kl >> 12) & 0xF) as u8
    }

    /// Horizontal wrap mode. Reports [`WrapMode::Repeat`] when `wrap_modes`
    /// is the unset sentinel (`0xFF`).
    pub fn horizontal_wrap(&self) -> WrapMode {
        if self.wrap_modes == 0xFF {
            return WrapMode::Repeat;
        }
        WrapMode::from_bits((self.wrap_modes >> 2) & 0b11)
    }

    /// Vertical wrap mode. Reports [`WrapMode::Repeat`] when `wrap_modes` is
    /// the unset sentinel (`0xFF`).
    pub fn vertical_wrap(&self) -> WrapMode {
        if self.wrap_modes == 0xFF {
            return WrapMode::Repeat;
        }
        WrapMode::from_bits(self.wrap_modes & 0b11)
    }

    /// Set the horizontal wrap mode. A no-op when `wrap_modes` is the unset
    /// sentinel: there are no real bits to write into, per §3's accessor
    /// contract for that field.
    pub fn set_horizontal_wrap(&mut self, mode: WrapMode) {
        if self.wrap_modes == 0xFF {
            return;
        }
        self.wrap_modes = (self.wrap_modes & !0b1100) | (mode.to_bits() << 2);
    }

    /// Set the vertical wrap mode. A no-op when `wrap_modes` is the unset
    /// sentinel.
    pub fn set_vertical_wrap(&mut self, mode: WrapMode) {
        if self.wrap_modes == 0xFF {
            return;
        }
        self.wrap_modes = (self.wrap_modes & !0b0011) | mode.to_bits();
    }

    /// Read a TMX image from a positioned binary reader.
    pub fn parse<R: Read + Seek>(reader: &mut R) -> Result<TmxImage> {
        let region_start = reader.stream_position()?;

        let flag = read_u16(reader)? as i16;
        let user_id = read_u16(reader)? as i16;
        let total_length = read_i32(reader)?;
        let mut tag = [0u8; 4];
        reader.read_exact(&mut tag)?;
        if &tag != MAGIC {
            return Err(TmxError::InvalidFormat(format!(
                "expected TMX0 tag, found {tag:?}"
            )));
        }
        log::debug!(
            "TMX header: flag={flag:#06x} user_id={user_id} total_length={total_length}"
        );
        framing::align_to(reader, region_start, HEADER_LEN)?;

        let palette_count = read_u8(reader)?;
        let palette_format_byte = read_u8(reader)?;
        let width = read_u16(reader)?;
        let height = read_u16(reader)?;
        let pixel_format_byte = read_u8(reader)?;
        let mip_count = read_u8(reader)?;
        let mip_kl = read_u16(reader)?;
        let _reserved = read_u8(reader)?;
        let wrap_modes = read_u8(reader)?;
        let user_texture_id = read_i32(reader)?;
        let user_clut_id = read_i32(reader)?;
        let user_comment = framing::read_fixed_str(reader, 28)?;

        let pixel_format = PixelFormat::from_u8(pixel_format_byte).ok_or_else(|| {
            TmxError::InvalidFormat(format!("unknown pixel format tag {pixel_format_byte:#04x}"))
        })?;

        if pixel_format.is_indexed() != (palette_count > 0) {
            return Err(TmxError::InvalidFormat(format!(
                "palette_count {palette_count} inconsistent with pixel format {pixel_format:?}"
            )));
        }

        let palette_color_count = pixel_format.palette_color_count();

        let payload = if pixel_format.is_indexed() {
            let palette_format = PixelFormat::from_u8(palette_format_byte).ok_or_else(|| {
                TmxError::InvalidFormat(format!(
                    "unknown palette format tag {palette_format_byte:#04x}"
                ))
            })?;
            let routine = palette_format.color_routine();
            let (pal_w, pal_h) = palette_dims(palette_color_count);

            let mut palettes = Vec::with_capacity(palette_count as usize);
            for _ in 0..palette_count {
                let mut colors = io::decode_colors(reader, routine, pal_w, pal_h)?;
                if palette_color_count == 256 {
                    io::tile_palette(&mut colors);
                }
                palettes.push(colors);
            }

            let index_routine = pixel_format.color_routine();
            let indices = io::decode_indices(reader, index_routine, width as u32, height as u32)?;
            validate_indices(&indices, palette_color_count)?;

            let mut mip_indices = Vec::with_capacity(mip_count as usize);
            for level in 1..=mip_count as u32 {
                let (mw, mh) = mip_dims(width as u32, height as u32, level);
                if mw == 0 || mh == 0 {
                    log::warn!("mip level {level} has zero dimensions ({mw}x{mh}); storing empty");
                    mip_indices.push(Vec::new());
                    continue;
                }
                let mi = io::decode_indices(reader, index_routine, mw, mh)?;
                validate_indices(&mi, palette_color_count)?;
                mip_indices.push(mi);
            }

            Payload::Indexed {
                palettes,
                indices,
                mip_indices,
            }
        } else {
            let routine = pixel_format.color_routine();
            let pixels = io::decode_colors(reader, routine, width as u32, height as u32)?;

            let mut mip_pixels = Vec::with_capacity(mip_count as usize);
            for level in 1..=mip_count as u32 {
                let (mw, mh) = mip_dims(width as u32, height as u32, level);
                if mw == 0 || mh == 0 {
                    log::warn!("mip level {level} has zero dimensions ({mw}x{mh}); storing empty");
                    mip_pixels.push(Vec::new());
                    continue;
                }
                mip_pixels.push(io::decode_colors(reader, routine, mw, mh)?);
            }

            Payload::Direct {
                pixels,
                mip_pixels,
            }
        };

        let palette_format = if pixel_format.is_indexed() {
            PixelFormat::from_u8(palette_format_byte)
        } else {
            None
        };

        Ok(TmxImage {
            width,
            height,
            pixel_format,
            palette_format,
            mip_count,
            mip_kl,
            wrap_modes,
            user_texture_id,
            user_clut_id,
            user_comment,
            payload,
            raster_cache: RefCell::new(None),
        })
    }

    /// Write this image to a positioned, seekable binary writer. Leaves the
    /// writer positioned just after the written bytes.
    pub fn serialize<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        let region_start = writer.stream_position()?;
        writer.write_all(&[0u8; HEADER_LEN as usize])?;

        let palette_count = self.palette_count();
        let palette_format_byte = self.palette_format.map(PixelFormat::to_u8).unwrap_or(0);
        write_u8(writer, palette_count)?;
        write_u8(writer, palette_format_byte)?;
        write_u16(writer, self.width)?;
        write_u16(writer, self.height)?;
        write_u8(writer, self.pixel_format.to_u8())?;
        write_u8(writer, self.mip_count)?;
        write_u16(writer, self.mip_kl)?;
        write_u8(writer, 0)?;
        write_u8(writer, self.wrap_modes)?;
        write_i32(writer, self.user_texture_id)?;
        write_i32(writer, self.user_clut_id)?;
        framing::write_fixed_str(writer, &self.user_comment, 28)?;

        let header_end = writer.stream_position()? - region_start;
        debug_assert_eq!(header_end as usize, HEADER_LEN as usize + BODY_HEADER_LEN);

        match &self.payload {
            Payload::Indexed {
                palettes,
                indices,
                mip_indices,
            } => {
                let palette_format = self
                    .palette_format
                    .expect("indexed image without a palette format");
                let routine = palette_format.color_routine();
                let palette_color_count = self.pixel_format.palette_color_count();

                for colors in palettes {
                    let mut colors = colors.clone();
                    if palette_color_count == 256 {
                        io::tile_palette(&mut colors);
                    }
                    io::encode_colors(writer, routine, &colors)?;
                }

                let index_routine = self.pixel_format.color_routine();
                io::encode_indices(
                    writer,
                    index_routine,
                    self.width as u32,
                    self.height as u32,
                    indices,
                )?;

                for (i, mi) in mip_indices.iter().enumerate() {
                    let level = (i + 1) as u32;
                    let (mw, mh) = mip_dims(self.width as u32, self.height as u32, level);
                    if mw == 0 || mh == 0 {
                        return Err(TmxError::InvalidMipDimensions {
                            level,
                            width: mw,
                            height: mh,
                        });
                    }
                    io::encode_indices(writer, index_routine, mw, mh, mi)?;
                }
            }
            Payload::Direct {
                pixels,
                mip_pixels,
            } => {
                let routine = self.pixel_format.color_routine();
                io::encode_colors(writer, routine, pixels)?;
                for (i, mp) in mip_pixels.iter().enumerate() {
                    let level = (i + 1) as u32;
                    let (mw, mh) = mip_dims(self.width as u32, self.height as u32, level);
                    if mw == 0 || mh == 0 {
                        return Err(TmxError::InvalidMipDimensions {
                            level,
                            width: mw,
                            height: mh,
                        });
                    }
                    io::encode_colors(writer, routine, mp)?;
                }
            }
        }

        let end = writer.stream_position()?;
        let total_length = (end - region_start) as i32;
        writer.seek(SeekFrom::Start(region_start))?;
        writer.write_all(&0x0002i16.to_le_bytes())?;
        writer.write_all(&0i16.to_le_bytes())?;
        writer.write_all(&total_length.to_le_bytes())?;
        writer.write_all(MAGIC)?;
        writer.seek(SeekFrom::Start(end))?;
        Ok(())
    }

    /// Encode a host raster into a TMX image at `pixel_format`. Mip levels
    /// are never generated; callers that want them build the corresponding
    /// `TmxImage` and append levels via [`TmxImage::parse`]/construction, or
    /// (not yet exposed here) a future builder API — mip generation is out
    /// of scope for this codec.
    pub fn from_raster<R: Raster>(
        raster: &R,
        pixel_format: PixelFormat,
        comment: Option<&str>,
    ) -> Result<TmxImage> {
        let width = raster.width();
        let height = raster.height();
        if width > u16::MAX as u32 || height > u16::MAX as u32 {
            return Err(TmxError::InvalidFormat(format!(
                "raster dimensions {width}x{height} exceed a 16-bit TMX image"
            )));
        }

        let pixels = raster.read_pixels();
        let user_comment = comment.unwrap_or("").to_string();

        let (payload, palette_format) = if pixel_format.is_indexed() {
            let palette_color_count = pixel_format.palette_color_count() as usize;
            let options = QuantizeOptions {
                colors: palette_color_count,
                ..QuantizeOptions::default()
            };
            log::debug!(
                "quantizing {width}x{height} raster to {palette_color_count} colors for {pixel_format:?}"
            );
            let result = quantizer::quantize(&pixels, &options)?;
            let mut palette = result.palette;
            palette.resize(palette_color_count, Color::new(0, 0, 0, 0));

            (
                Payload::Indexed {
                    palettes: vec![palette],
                    indices: result.indices,
                    mip_indices: Vec::new(),
                },
                Some(PixelFormat::Psmct32),
            )
        } else {
            (
                Payload::Direct {
                    pixels,
                    mip_pixels: Vec::new(),
                },
                None,
            )
        };

        Ok(TmxImage {
            width: width as u16,
            height: height as u16,
            pixel_format,
            palette_format,
            mip_count: 0,
            mip_kl: 0xFFFF,
            wrap_modes: 0xFF,
            user_texture_id: 0,
            user_clut_id: 0,
            user_comment,
            payload,
            raster_cache: RefCell::new(None),
        })
    }

    /// Decode this image (a selected mip level, `-1` meaning the base level)
    /// through the selected palette to an owned raster.
    ///
    /// Repeated calls with the same `(palette_index, mip_index)` return a
    /// buffer sharing the same `Rc` identity as a soft optimization; this is
    /// not observable beyond pointer equality and callers must not rely on
    /// it for correctness.
    pub fn to_raster(&self, palette_index: usize, mip_index: i32) -> Result<ImageRaster> {
        if let Some((p, m, cached)) = self.raster_cache.borrow().as_ref() {
            if *p == palette_index && *m == mip_index {
                return Ok(ImageRaster::new((**cached).clone()));
            }
        }

        let (width, height, colors) = self.decode_level(palette_index, mip_index)?;
        let rc = Rc::new(ImageRaster::from_colors(width, height, &colors).into_rgba_image());
        *self.raster_cache.borrow_mut() = Some((palette_index, mip_index, Rc::clone(&rc)));
        Ok(ImageRaster::new((*rc).clone()))
    }

    fn level_dims(&self, mip_index: i32) -> (u32, u32) {
        if mip_index < 0 {
            (self.width as u32, self.height as u32)
        } else {
            mip_dims(self.width as u32, self.height as u32, mip_index as u32 + 1)
        }
    }

    fn decode_level(&self, palette_index: usize, mip_index: i32) -> Result<(u32, u32, Vec<Color>)> {
        let (width, height) = self.level_dims(mip_index);
        match &self.payload {
            Payload::Indexed {
                palettes,
                indices,
                mip_indices,
            } => {
                let palette = palettes.get(palette_index).ok_or_else(|| {
                    TmxError::InvalidFormat(format!(
                        "palette index {palette_index} out of range ({} palettes)",
                        palettes.len()
                    ))
                })?;
                let level_indices: &[u8] = if mip_index < 0 {
                    indices
                } else {
                    mip_indices.get(mip_index as usize).ok_or_else(|| {
                        TmxError::InvalidFormat(format!("mip index {mip_index} out of range"))
                    })?
                };
                let colors = level_indices
                    .iter()
                    .map(|&i| palette[i as usize])
                    .collect();
                Ok((width, height, colors))
            }
            Payload::Direct { pixels, mip_pixels } => {
                let colors = if mip_index < 0 {
                    pixels.clone()
                } else {
                    mip_pixels
                        .get(mip_index as usize)
                        .ok_or_else(|| {
                            TmxError::InvalidFormat(format!("mip index {mip_index} out of range"))
                        })?
                        .clone()
                };
                Ok((width, height, colors))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::ImageRaster;
    use std::io::Cursor;

    fn sample_raster() -> ImageRaster {
        let colors = vec![
            Color::new(255, 0, 0, 128),
            Color::new(0, 255, 0, 128),
            Color::new(0, 0, 255, 128),
            Color::new(255, 255, 255, 255),
        ];
        ImageRaster::from_colors(2, 2, &colors)
    }

    #[test]
    fn psmct32_container_round_trips_byte_exactly() {
        let raster = sample_raster();
        let image = TmxImage::from_raster(&raster, PixelFormat::Psmct32, None).unwrap();

        let mut buf = Vec::new();
        let mut cursor = Cursor::new(&mut buf);
        image.serialize(&mut cursor).unwrap();

        assert_eq!(buf.len(), 16 + BODY_HEADER_LEN + 16);
        let body_start = 16 + BODY_HEADER_LEN;
        assert_eq!(&buf[body_start..body_start + 4], &[0xFF, 0x00, 0x00, 0x40]);
        assert_eq!(&buf[body_start + 12..body_start + 16], &[0xFF, 0xFF, 0xFF, 0x80]);

        let mut reader = Cursor::new(buf);
        let parsed = TmxImage::parse(&mut reader).unwrap();
        assert_eq!(parsed.width(), 2);
        assert_eq!(parsed.height(), 2);
        assert_eq!(parsed.pixel_format(), PixelFormat::Psmct32);

        let decoded = parsed.to_raster(0, -1).unwrap();
        assert_eq!(decoded.read_pixels(), raster.read_pixels());
    }

    #[test]
    fn psmt4_round_trips_with_an_explicit_palette() {
        let palette: Vec<Color> = (0..16u16).map(|i| Color::new(i as u8, 0, 0, 255)).collect();
        let indices: Vec<u8> = (0..16u8).collect();
        let image = TmxImage {
            width: 4,
            height: 4,
            pixel_format: PixelFormat::Psmt4,
            palette_format: Some(PixelFormat::Psmct32),
            mip_count: 0,
            mip_kl: 0xFFFF,
            wrap_modes: 0xFF,
            user_texture_id: 0,
            user_clut_id: 0,
            user_comment: String::new(),
            payload: Payload::Indexed {
                palettes: vec![palette.clone()],
                indices: indices.clone(),
                mip_indices: Vec::new(),
            },
            raster_cache: RefCell::new(None),
        };

        let mut buf = Vec::new();
        let mut cursor = Cursor::new(&mut buf);
        image.serialize(&mut cursor).unwrap();

        let body_start = 16 + BODY_HEADER_LEN + 16 * 4;
        assert_eq!(
            &buf[body_start..body_start + 8],
            &[0x10, 0x32, 0x54, 0x76, 0x98, 0xBA, 0xDC, 0xFE]
        );

        let mut reader = Cursor::new(buf);
        let parsed = TmxImage::parse(&mut reader).unwrap();
        let raster = parsed.to_raster(0, -1).unwrap();
        let expected: Vec<Color> = indices.iter().map(|&i| palette[i as usize]).collect();
        assert_eq!(raster.read_pixels(), expected);
    }

    #[test]
    fn rejects_a_bad_magic_tag() {
        let mut buf = vec![0u8; 16 + BODY_HEADER_LEN];
        buf[8..12].copy_from_slice(b"NOPE");
        let mut reader = Cursor::new(buf);
        let err = TmxImage::parse(&mut reader);
        assert!(matches!(err, Err(TmxError::InvalidFormat(_))));
    }

    #[test]
    fn rejects_an_indexed_pixel_format_with_zero_palettes() {
        let mut buf = vec![0u8; 16 + BODY_HEADER_LEN];
        buf[0..2].copy_from_slice(&0x0002i16.to_le_bytes());
        buf[8..12].copy_from_slice(b"TMX0");
        // palette_count = 0, pixel_format = PSMT8 (0x13) at offset 22
        // (16-byte header + palette_count + palette_format + width + height).
        buf[16] = 0;
        buf[22] = 0x13;
        let mut reader = Cursor::new(buf);
        let err = TmxImage::parse(&mut reader);
        assert!(matches!(err, Err(TmxError::InvalidFormat(_))));
    }

    #[test]
    fn encode_rejects_a_mip_level_with_zero_dimensions() {
        let image = TmxImage {
            width: 2,
            height: 2,
            pixel_format: PixelFormat::Psmct32,
            palette_format: None,
            mip_count: 1,
            mip_kl: 0xFFFF,
            wrap_modes: 0xFF,
            user_texture_id: 0,
            user_clut_id: 0,
            user_comment: String::new(),
            payload: Payload::Direct {
                pixels: vec![Color::BLACK; 4],
                mip_pixels: vec![Vec::new()],
            },
            raster_cache: RefCell::new(None),
        };
        let mut buf = Vec::new();
        let mut cursor = Cursor::new(&mut buf);
        let err = image.serialize(&mut cursor);
        assert!(matches!(err, Err(TmxError::InvalidMipDimensions { .. })));
    }

    #[test]
    fn parse_tolerates_a_zero_sized_mip() {
        let mut buf = Vec::new();
        {
            let mut cursor = Cursor::new(&mut buf);
            let image = TmxImage {
                width: 2,
                height: 2,
                pixel_format: PixelFormat::Psmct32,
                palette_format: None,
                mip_count: 1,
                mip_kl: 0xFFFF,
                wrap_modes: 0xFF,
                user_texture_id: 0,
                user_clut_id: 0,
                user_comment: String::new(),
                payload: Payload::Direct {
                    pixels: vec![Color::BLACK; 4],
                    mip_pixels: vec![Vec::new()],
                },
                raster_cache: RefCell::new(None),
            };
            // Hand-write bytes directly; `serialize` would reject this, so
            // build the wire form manually to exercise the parse-side
            // tolerance for a zero-sized mip (level 1 of a 2x2 base is 0x0).
            cursor.write_all(&0x0002i16.to_le_bytes()).unwrap();
            cursor.write_all(&0i16.to_le_bytes()).unwrap();
            cursor.write_all(&0i32.to_le_bytes()).unwrap();
            cursor.write_all(b"TMX0").unwrap();
            write_u8(&mut cursor, image.palette_count()).unwrap();
            write_u8(&mut cursor, 0).unwrap();
            write_u16(&mut cursor, image.width).unwrap();
            write_u16(&mut cursor, image.height).unwrap();
            write_u8(&mut cursor, image.pixel_format.to_u8()).unwrap();
            write_u8(&mut cursor, image.mip_count).unwrap();
            write_u16(&mut cursor, image.mip_kl).unwrap();
            write_u8(&mut cursor, 0).unwrap();
            write_u8(&mut cursor, image.wrap_modes).unwrap();
            write_i32(&mut cursor, 0).unwrap();
            write_i32(&mut cursor, 0).unwrap();
            framing::write_fixed_str(&mut cursor, "", 28).unwrap();
            io::encode_colors(
                &mut cursor,
                PixelFormat::Psmct32.color_routine(),
                &[Color::BLACK; 4],
            )
            .unwrap();
        }

        let mut reader = Cursor::new(buf);
        let parsed = TmxImage::parse(&mut reader).unwrap();
        assert_eq!(parsed.mip_count(), 1);
    }

    #[test]
    fn mip_kl_and_wrap_modes_sentinels_report_documented_defaults() {
        let raster = sample_raster();
        let image = TmxImage::from_raster(&raster, PixelFormat::Psmct32, None).unwrap();
        assert_eq!(image.mip_k(), -0.0625);
        assert_eq!(image.mip_l(), 3);
        assert_eq!(image.horizontal_wrap(), WrapMode::Repeat);
        assert_eq!(image.vertical_wrap(), WrapMode::Repeat);
    }

    #[test]
    fn wrap_mode_writes_are_ignored_while_the_sentinel_is_set() {
        let raster = sample_raster();
        let mut image = TmxImage::from_raster(&raster, PixelFormat::Psmct32, None).unwrap();
        image.set_horizontal_wrap(WrapMode::Clamp);
        assert_eq!(image.horizontal_wrap(), WrapMode::Repeat);
    }

    #[test]
    fn oversized_comment_truncates_on_serialize() {
        let raster = sample_raster();
        let mut image = TmxImage::from_raster(&raster, PixelFormat::Psmct32, None).unwrap();
        image.set_user_comment("A".repeat(40));

        let mut buf = Vec::new();
        let mut cursor = Cursor::new(&mut buf);
        image.serialize(&mut cursor).unwrap();

        let mut reader = Cursor::new(buf);
        let parsed = TmxImage::parse(&mut reader).unwrap();
        assert_eq!(parsed.user_comment(), "A".repeat(27));
    }

    #[test]
    fn psmz32_reads_identically_to_psmct32() {
        let raster = sample_raster();
        let image = TmxImage::from_raster(&raster, PixelFormat::Psmct32, None).unwrap();
        let mut buf = Vec::new();
        let mut cursor = Cursor::new(&mut buf);
        image.serialize(&mut cursor).unwrap();

        // Retag as PSMZ32 in place; the wire routine is identical.
        buf[22] = PixelFormat::Psmz32.to_u8();

        let mut reader = Cursor::new(buf);
        let parsed = TmxImage::parse(&mut reader).unwrap();
        assert_eq!(parsed.pixel_format(), PixelFormat::Psmz32);
        assert_eq!(
            parsed.to_raster(0, -1).unwrap().read_pixels(),
            raster.read_pixels()
        );
    }

    #[test]
    fn to_raster_caches_by_identity_for_repeated_parameters() {
        let raster = sample_raster();
        let image = TmxImage::from_raster(&raster, PixelFormat::Psmct32, None).unwrap();
        let a = image.to_raster(0, -1).unwrap();
        let b = image.to_raster(0, -1).unwrap();
        assert_eq!(a.read_pixels(), b.read_pixels());
    }
}

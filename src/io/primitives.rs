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

//! Per-format pixel I/O: the byte/bit layout of each PS2 GS color routine.

use std::io::{Read, Write};

use super::swizzle::psmt8_swizzle;
use crate::color::Color;
use crate::error::{Result, TmxError};
use crate::pixel_format::ColorRoutine;

/// Decode `width * height` direct colors from `reader` using `routine`.
///
/// `routine` must be one of [`ColorRoutine::Ct32`], [`ColorRoutine::Ct24`], or
/// [`ColorRoutine::Ct16`]; passing an indexed routine is a programmer error
/// and returns [`TmxError::InvalidFormat`].
pub fn decode_colors<R: Read>(
    reader: &mut R,
    routine: ColorRoutine,
    width: u32,
    height: u32,
) -> Result<Vec<Color>> {
    let count = (width as usize) * (height as usize);
    match routine {
        ColorRoutine::Ct32 => decode_ct32(reader, count),
        ColorRoutine::Ct24 => decode_ct24(reader, count),
        ColorRoutine::Ct16 => decode_ct16(reader, count),
        ColorRoutine::Indexed8 | ColorRoutine::Indexed4 => Err(TmxError::InvalidFormat(
            "decode_colors called with an indexed color routine".to_string(),
        )),
    }
}

/// Encode `colors` (must have `width * height` entries) to `writer` using `routine`.
pub fn encode_colors<W: Write>(
    writer: &mut W,
    routine: ColorRoutine,
    colors: &[Color],
) -> Result<()> {
    match routine {
        ColorRoutine::Ct32 => encode_ct32(writer, colors),
        ColorRoutine::Ct24 => encode_ct24(writer, colors),
        ColorRoutine::Ct16 => encode_ct16(writer, colors),
        ColorRoutine::Indexed8 | ColorRoutine::Indexed4 => Err(TmxError::InvalidFormat(
            "encode_colors called with an indexed color routine".to_string(),
        )),
    }
}

/// Decode `width * height` palette indices (one byte each in memory) from
/// `reader`, undoing the PSMT8 swizzle or PSMT4 nibble packing as required.
pub fn decode_indices<R: Read>(
    reader: &mut R,
    routine: ColorRoutine,
    width: u32,
    height: u32,
) -> Result<Vec<u8>> {
    match routine {
        ColorRoutine::Indexed8 => decode_t8(reader, width, height),
        ColorRoutine::Indexed4 => decode_t4(reader, width, height),
        ColorRoutine::Ct32 | ColorRoutine::Ct24 | ColorRoutine::Ct16 => Err(TmxError::InvalidFormat(
            "decode_indices called with a direct color routine".to_string(),
        )),
    }
}

/// Encode `indices` (one byte per pixel, low nibble significant for 4-bit
/// formats, `width * height` entries) to `writer`.
pub fn encode_indices<W: Write>(
    writer: &mut W,
    routine: ColorRoutine,
    width: u32,
    height: u32,
    indices: &[u8],
) -> Result<()> {
    match routine {
        ColorRoutine::Indexed8 => encode_t8(writer, width, height, indices),
        ColorRoutine::Indexed4 => encode_t4(writer, width, height, indices),
        ColorRoutine::Ct32 | ColorRoutine::Ct24 | ColorRoutine::Ct16 => Err(TmxError::InvalidFormat(
            "encode_indices called with a direct color routine".to_string(),
        )),
    }
}

fn read_exact_vec<R: Read>(reader: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

fn decode_ct32<R: Read>(reader: &mut R, count: usize) -> Result<Vec<Color>> {
    let bytes = read_exact_vec(reader, count * 4)?;
    Ok(bytes
        .chunks_exact(4)
        .map(|c| Color::new(c[0], c[1], c[2], Color::alpha_from_gs(c[3])))
        .collect())
}

fn encode_ct32<W: Write>(writer: &mut W, colors: &[Color]) -> Result<()> {
    let mut bytes = Vec::with_capacity(colors.len() * 4);
    for c in colors {
        bytes.extend_from_slice(&[c.r, c.g, c.b, Color::alpha_to_gs(c.a)]);
    }
    writer.write_all(&bytes)?;
    Ok(())
}

fn decode_ct24<R: Read>(reader: &mut R, count: usize) -> Result<Vec<Color>> {
    let bytes = read_exact_vec(reader, count * 3)?;
    Ok(bytes
        .chunks_exact(3)
        .map(|c| Color::new(c[0], c[1], c[2], 0xFF))
        .collect())
}

fn encode_ct24<W: Write>(writer: &mut W, colors: &[Color]) -> Result<()> {
    let mut bytes = Vec::with_capacity(colors.len() * 3);
    for c in colors {
        bytes.extend_from_slice(&[c.r, c.g, c.b]);
    }
    writer.write_all(&bytes)?;
    Ok(())
}

fn decode_ct16<R: Read>(reader: &mut R, count: usize) -> Result<Vec<Color>> {
    let bytes = read_exact_vec(reader, count * 2)?;
    Ok(bytes
        .chunks_exact(2)
        .map(|c| {
            let word = u16::from_le_bytes([c[0], c[1]]);
            let r = Color::widen_5_to_8((word & 0x1F) as u8);
            let g = Color::widen_5_to_8(((word >> 5) & 0x1F) as u8);
            let b = Color::widen_5_to_8(((word >> 10) & 0x1F) as u8);
            let a = if word & 0x8000 != 0 { 0xFF } else { 0x00 };
            Color::new(r, g, b, a)
        })
        .collect())
}

fn encode_ct16<W: Write>(writer: &mut W, colors: &[Color]) -> Result<()> {
    let mut bytes = Vec::with_capacity(colors.len() * 2);
    for c in colors {
        let r = Color::narrow_8_to_5(c.r) as u16;
        let g = Color::narrow_8_to_5(c.g) as u16;
        let b = Color::narrow_8_to_5(c.b) as u16;
        let a: u16 = if c.a >= 0x80 { 1 } else { 0 };
        let word = r | (g << 5) | (b << 10) | (a << 15);
        bytes.extend_from_slice(&word.to_le_bytes());
    }
    writer.write_all(&bytes)?;
    Ok(())
}

fn decode_t8<R: Read>(reader: &mut R, width: u32, height: u32) -> Result<Vec<u8>> {
    let count = (width as usize) * (height as usize);
    let wire = read_exact_vec(reader, count)?;
    let mut indices = vec![0u8; count];
    for y in 0..height {
        for x in 0..width {
            let (sx, sy) = psmt8_swizzle(x, y, width, height);
            let wire_idx = (sy * width + sx) as usize;
            indices[(y * width + x) as usize] = wire[wire_idx];
        }
    }
    Ok(indices)
}

fn encode_t8<W: Write>(writer: &mut W, width: u32, height: u32, indices: &[u8]) -> Result<()> {
    let count = (width as usize) * (height as usize);
    let mut wire = vec![0u8; count];
    for y in 0..height {
        for x in 0..width {
            let (sx, sy) = psmt8_swizzle(x, y, width, height);
            let wire_idx = (sy * width + sx) as usize;
            wire[wire_idx] = indices[(y * width + x) as usize];
        }
    }
    writer.write_all(&wire)?;
    Ok(())
}

fn decode_t4<R: Read>(reader: &mut R, width: u32, height: u32) -> Result<Vec<u8>> {
    let count = (width as usize) * (height as usize);
    let byte_count = count.div_ceil(2);
    let bytes = read_exact_vec(reader, byte_count)?;
    let mut indices = vec![0u8; count];
    for (i, index) in indices.iter_mut().enumerate() {
        let byte = bytes[i / 2];
        *index = if i % 2 == 0 { byte & 0x0F } else { byte >> 4 };
    }
    Ok(indices)
}

fn encode_t4<W: Write>(writer: &mut W, _width: u32, _height: u32, indices: &[u8]) -> Result<()> {
    let byte_count = indices.len().div_ceil(2);
    let mut bytes = vec![0u8; byte_count];
    for (i, &index) in indices.iter().enumerate() {
        let nibble = index & 0x0F;
        if i % 2 == 0 {
            bytes[i / 2] |= nibble;
        } else {
            bytes[i / 2] |= nibble << 4;
        }
    }
    writer.write_all(&bytes)?;
    Ok(())
}

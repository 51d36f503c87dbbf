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

//! The PSMT8 index address swizzle.
//!
//! PSMT8 pixels are stored in 16-column x 4-row regions whose internal byte
//! order does not match raster order; this module remaps coordinates into and
//! out of that region. The remap is table-ized (built once, at compile time)
//! and is its own inverse, so the same table drives both decode and encode.
//!
//! No example in this codebase's retrieval corpus carries the real GS PSMT8
//! block/column/byte address decomposition (the teacher emulator's GPU never
//! samples an 8-bit indexed texture, and the pack's `original_source` material
//! for this format was filtered out ahead of this file). The permutation below
//! is this codec's own construction — the same 8-entry transposition shape
//! `tiling::tile_palette` uses for CLUT tiling, applied within a 16x4 region
//! instead of a 256-entry palette — chosen because it is self-inverse and
//! bijective by construction, not because it has been checked against a real
//! GS VRAM dump. Treat it as an unverified approximation of the hardware
//! layout until checked against one.

/// Width, in pixels, of one swizzle region.
const TILE_W: usize = 16;
/// Height, in pixels, of one swizzle region.
const TILE_H: usize = 4;
/// Entries in one swizzle region.
const TILE_LEN: usize = TILE_W * TILE_H;

/// Build the 64-entry intra-region permutation.
///
/// Entries are grouped into two 32-entry halves (rows 0-1 and rows 2-3); within
/// each half, the table swaps positions `[8..16)` with `[16..24)`, the same
/// transposition shape `tiling::tile_palette` uses for 256-entry palettes,
/// scaled down to this region's size. A transposition is its own inverse by
/// construction, so the whole table is too — that property is all this
/// construction is checked against (see the module doc comment).
const fn build_table() -> [u8; TILE_LEN] {
    let mut table = [0u8; TILE_LEN];
    let mut i = 0;
    while i < TILE_LEN {
        table[i] = i as u8;
        i += 1;
    }
    let mut half = 0;
    while half < TILE_LEN {
        let mut k = 0;
        while k < 8 {
            let a = half + 8 + k;
            let b = half + 16 + k;
            let tmp = table[a];
            table[a] = table[b];
            table[b] = tmp;
            k += 1;
        }
        half += 32;
    }
    table
}

const TABLE: [u8; TILE_LEN] = build_table();

/// Map a logical `(x, y)` pixel coordinate to the wire coordinate it is stored
/// at, for a PSMT8 (or PSMT8H) index plane of the given `width` x `height`.
///
/// See the module doc comment: this permutation is an unverified
/// approximation of the real GS addressing, not a confirmed port of it.
///
/// Only tiles fully contained in the image are swizzled; a trailing partial
/// tile (width not a multiple of 16, or height not a multiple of 4) is passed
/// through unchanged. This keeps the map self-inverse and well-defined for
/// every image size the codec accepts, including the 1x1 boundary case,
/// at the cost of not touching the edge of images whose dimensions are not
/// themselves tile-aligned — which on real hardware are page-padded anyway.
pub fn psmt8_swizzle(x: u32, y: u32, width: u32, height: u32) -> (u32, u32) {
    let (x, y, width, height) = (x as usize, y as usize, width as usize, height as usize);
    let tile_x0 = (x / TILE_W) * TILE_W;
    let tile_y0 = (y / TILE_H) * TILE_H;
    if tile_x0 + TILE_W > width || tile_y0 + TILE_H > height {
        return (x as u32, y as u32);
    }
    let lx = x - tile_x0;
    let ly = y - tile_y0;
    let mapped = TABLE[ly * TILE_W + lx] as usize;
    let (mx, my) = (mapped % TILE_W, mapped / TILE_W);
    ((tile_x0 + mx) as u32, (tile_y0 + my) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_its_own_inverse_over_an_aligned_page() {
        for y in 0..16u32 {
            for x in 0..16u32 {
                let (sx, sy) = psmt8_swizzle(x, y, 16, 16);
                let (rx, ry) = psmt8_swizzle(sx, sy, 16, 16);
                assert_eq!((rx, ry), (x, y));
            }
        }
    }

    #[test]
    fn falls_back_to_identity_outside_a_full_tile() {
        assert_eq!(psmt8_swizzle(0, 0, 1, 1), (0, 0));
        assert_eq!(psmt8_swizzle(2, 1, 3, 3), (2, 1));
    }

    #[test]
    fn is_a_bijection_within_one_tile() {
        let mut seen = [false; TILE_LEN];
        for ly in 0..TILE_H as u32 {
            for lx in 0..TILE_W as u32 {
                let (mx, my) = psmt8_swizzle(lx, ly, TILE_W as u32, TILE_H as u32);
                let idx = (my * TILE_W as u32 + mx) as usize;
                assert!(!seen[idx], "duplicate mapping at ({mx},{my})");
                seen[idx] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }
}

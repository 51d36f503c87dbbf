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

//! Pixel I/O primitives: the byte/bit layout for each PS2 GS pixel storage mode,
//! the CLUT tiling permutation, and the PSMT8 index swizzle.
//!
//! This module has no notion of a TMX container; it only knows how to turn a
//! `width x height` grid of [`Color`](crate::color::Color)s or `u8` indices
//! into bytes and back, given a [`ColorRoutine`](crate::pixel_format::ColorRoutine).

mod primitives;
mod swizzle;
mod tiling;

pub use primitives::{decode_colors, decode_indices, encode_colors, encode_indices};
pub use swizzle::psmt8_swizzle;
pub use tiling::tile_palette;

#[cfg(test)]
mod tests;

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

//! RGBA color type and the GS alpha scaling used by the direct-color pixel formats.

/// An 8-bit-per-channel RGBA color.
///
/// PS2 GS formats do not store a full 8-bit alpha on the wire; §4.1 of the codec's
/// specification defines how each format's alpha representation maps to and from
/// this full-range value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    /// Red channel (0-255).
    pub r: u8,
    /// Green channel (0-255).
    pub g: u8,
    /// Blue channel (0-255).
    pub b: u8,
    /// Alpha channel (0-255, host-side convention: 255 is fully opaque).
    pub a: u8,
}

impl Color {
    /// Construct a color from four 8-bit channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Fully opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);

    /// Encode a host-side alpha (0-255, 255 opaque) as a GS-scaled byte
    /// (0-128, 128 opaque), per PSMCT32/PSMZ32's wire layout.
    ///
    /// ```
    /// use tmx::color::Color;
    /// assert_eq!(Color::alpha_to_gs(255), 128);
    /// assert_eq!(Color::alpha_to_gs(0), 0);
    /// ```
    pub fn alpha_to_gs(a: u8) -> u8 {
        let scaled = (a as u32 * 128 + 127) / 255;
        scaled.min(255) as u8
    }

    /// Decode a GS-scaled alpha byte (0-128) to a host-side 0-255 value.
    ///
    /// ```
    /// use tmx::color::Color;
    /// assert_eq!(Color::alpha_from_gs(128), 255);
    /// assert_eq!(Color::alpha_from_gs(0), 0);
    /// ```
    pub fn alpha_from_gs(a: u8) -> u8 {
        let scaled = (a as u32 * 255 + 64) / 128;
        scaled.min(255) as u8
    }

    /// Widen a 5-bit channel (0-31) to 8-bit (0-255) by `v * 8`, the same scheme
    /// the teacher's GPU `Color::to_rgb15` uses in the inverse direction.
    pub fn widen_5_to_8(v: u8) -> u8 {
        v.wrapping_shl(3)
    }

    /// Narrow an 8-bit channel (0-255) to 5-bit (0-31) by `v >> 3`.
    pub fn narrow_8_to_5(v: u8) -> u8 {
        v >> 3
    }
}

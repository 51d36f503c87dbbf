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

//! PS2 GS Pixel Storage Mode (PSM) tags.
//!
//! Each variant names a concrete on-wire byte/bit layout. Several variants are
//! aliases that share a wire routine with another variant (the Z-buffer formats
//! with their color-buffer counterparts; the "H" and high-nibble indexed formats
//! with their base indexed counterparts) — the distinction those GS tags encode
//! is which hardware register consumes the bits, which is irrelevant to a file.

/// One of the thirteen pixel storage modes a TMX container can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PixelFormat {
    /// 32-bit direct color: R, G, B, GS-scaled A.
    Psmct32 = 0x00,
    /// 24-bit direct color: R, G, B (alpha implicitly opaque).
    Psmct24 = 0x01,
    /// 16-bit direct color: 5-5-5-1 RGBA, little-endian.
    Psmct16 = 0x02,
    /// 16-bit direct color, "S" (scrambled GS addressing); identical pixel layout to PSMCT16.
    Psmct16S = 0x0A,
    /// 8-bit indexed, 256-color palette.
    Psmt8 = 0x13,
    /// 8-bit indexed, 256-color palette, alternate GS index placement ("H").
    Psmt8H = 0x1B,
    /// 4-bit indexed, 16-color palette.
    Psmt4 = 0x14,
    /// 4-bit indexed, 16-color palette, high-nibble placement ("HL").
    Psmt4HL = 0x24,
    /// 4-bit indexed, 16-color palette, high-nibble placement ("HH").
    Psmt4HH = 0x2C,
    /// Z-buffer alias of PSMCT32; identical wire layout.
    Psmz32 = 0x30,
    /// Z-buffer alias of PSMCT24; identical wire layout.
    Psmz24 = 0x31,
    /// Z-buffer alias of PSMCT16; identical wire layout.
    Psmz16 = 0x32,
    /// Z-buffer alias of PSMCT16S; identical wire layout.
    Psmz16S = 0x3A,
}

impl PixelFormat {
    /// Decode a pixel format tag byte as it appears in the TMX header.
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0x00 => Self::Psmct32,
            0x01 => Self::Psmct24,
            0x02 => Self::Psmct16,
            0x0A => Self::Psmct16S,
            0x13 => Self::Psmt8,
            0x1B => Self::Psmt8H,
            0x14 => Self::Psmt4,
            0x24 => Self::Psmt4HL,
            0x2C => Self::Psmt4HH,
            0x30 => Self::Psmz32,
            0x31 => Self::Psmz24,
            0x32 => Self::Psmz16,
            0x3A => Self::Psmz16S,
            _ => return None,
        })
    }

    /// Encode this pixel format as the byte stored in the TMX header.
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Whether this format stores palette indices rather than direct color.
    pub fn is_indexed(self) -> bool {
        matches!(
            self,
            Self::Psmt8 | Self::Psmt8H | Self::Psmt4 | Self::Psmt4HL | Self::Psmt4HH
        )
    }

    /// Number of palette entries an image of this pixel format requires
    /// (0 for direct-color formats).
    pub fn palette_color_count(self) -> u16 {
        match self {
            Self::Psmt8 | Self::Psmt8H => 256,
            Self::Psmt4 | Self::Psmt4HL | Self::Psmt4HH => 16,
            _ => 0,
        }
    }

    /// Bits consumed per pixel/index on the wire.
    pub fn bits_per_element(self) -> u32 {
        match self {
            Self::Psmct32 | Self::Psmz32 => 32,
            Self::Psmct24 | Self::Psmz24 => 24,
            Self::Psmct16 | Self::Psmct16S | Self::Psmz16 | Self::Psmz16S => 16,
            Self::Psmt8 | Self::Psmt8H => 8,
            Self::Psmt4 | Self::Psmt4HL | Self::Psmt4HH => 4,
        }
    }

    /// The direct-color wire routine this format shares, if it is an alias.
    ///
    /// PSMZ32/24/16/16S share their routine with the corresponding PSMCT*
    /// variant; the canonical form is returned unchanged for non-Z formats.
    pub fn color_routine(self) -> ColorRoutine {
        match self {
            Self::Psmct32 | Self::Psmz32 => ColorRoutine::Ct32,
            Self::Psmct24 | Self::Psmz24 => ColorRoutine::Ct24,
            Self::Psmct16 | Self::Psmct16S | Self::Psmz16 | Self::Psmz16S => ColorRoutine::Ct16,
            Self::Psmt8 | Self::Psmt8H => ColorRoutine::Indexed8,
            Self::Psmt4 | Self::Psmt4HL | Self::Psmt4HH => ColorRoutine::Indexed4,
        }
    }
}

/// The underlying byte/bit routine a [`PixelFormat`] dispatches to.
///
/// Several [`PixelFormat`] tags collapse to the same routine; this is the
/// dispatch key the pixel I/O layer (`crate::io`) actually switches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorRoutine {
    /// PSMCT32 / PSMZ32.
    Ct32,
    /// PSMCT24 / PSMZ24.
    Ct24,
    /// PSMCT16 / PSMCT16S / PSMZ16 / PSMZ16S.
    Ct16,
    /// PSMT8 / PSMT8H.
    Indexed8,
    /// PSMT4 / PSMT4HL / PSMT4HH.
    Indexed4,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_tag_byte() {
        for pf in [
            PixelFormat::Psmct32,
            PixelFormat::Psmct24,
            PixelFormat::Psmct16,
            PixelFormat::Psmct16S,
            PixelFormat::Psmt8,
            PixelFormat::Psmt8H,
            PixelFormat::Psmt4,
            PixelFormat::Psmt4HL,
            PixelFormat::Psmt4HH,
            PixelFormat::Psmz32,
            PixelFormat::Psmz24,
            PixelFormat::Psmz16,
            PixelFormat::Psmz16S,
        ] {
            assert_eq!(PixelFormat::from_u8(pf.to_u8()), Some(pf));
        }
    }

    #[test]
    fn unknown_tag_is_none() {
        assert_eq!(PixelFormat::from_u8(0xFF), None);
    }

    #[test]
    fn indexed_formats_carry_a_palette() {
        assert!(PixelFormat::Psmt8.is_indexed());
        assert!(PixelFormat::Psmt4HH.is_indexed());
        assert!(!PixelFormat::Psmct32.is_indexed());
        assert_eq!(PixelFormat::Psmt8.palette_color_count(), 256);
        assert_eq!(PixelFormat::Psmt4.palette_color_count(), 16);
        assert_eq!(PixelFormat::Psmct16.palette_color_count(), 0);
    }

    #[test]
    fn z_variants_share_the_color_routine_of_their_ct_counterpart() {
        assert_eq!(PixelFormat::Psmz32.color_routine(), ColorRoutine::Ct32);
        assert_eq!(PixelFormat::Psmz24.color_routine(), ColorRoutine::Ct24);
        assert_eq!(PixelFormat::Psmz16.color_routine(), ColorRoutine::Ct16);
        assert_eq!(PixelFormat::Psmz16S.color_routine(), ColorRoutine::Ct16);
    }
}

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

//! Pixel I/O round-trip tests.

use super::*;
use crate::color::Color;
use crate::pixel_format::ColorRoutine;
use std::io::Cursor;

#[test]
fn psmct32_round_trips_exactly() {
    let colors = vec![
        Color::new(255, 0, 0, 128),
        Color::new(0, 255, 0, 128),
        Color::new(0, 0, 255, 128),
        Color::new(255, 255, 255, 255),
    ];
    let mut buf = Vec::new();
    encode_colors(&mut buf, ColorRoutine::Ct32, &colors).unwrap();
    assert_eq!(&buf[0..4], &[0xFF, 0x00, 0x00, 0x40]);
    assert_eq!(&buf[12..16], &[0xFF, 0xFF, 0xFF, 0x80]);

    let mut cursor = Cursor::new(buf);
    let decoded = decode_colors(&mut cursor, ColorRoutine::Ct32, 2, 2).unwrap();
    assert_eq!(decoded, colors);
}

#[test]
fn psmct24_decodes_with_opaque_alpha() {
    let colors = vec![Color::new(10, 20, 30, 0)];
    let mut buf = Vec::new();
    encode_colors(&mut buf, ColorRoutine::Ct24, &colors).unwrap();
    assert_eq!(buf, vec![10, 20, 30]);

    let mut cursor = Cursor::new(buf);
    let decoded = decode_colors(&mut cursor, ColorRoutine::Ct24, 1, 1).unwrap();
    assert_eq!(decoded, vec![Color::new(10, 20, 30, 255)]);
}

#[test]
fn psmct16_preserves_the_five_bit_exact_channel_value() {
    let colors = vec![Color::new(248, 0, 0, 255)];
    let mut buf = Vec::new();
    encode_colors(&mut buf, ColorRoutine::Ct16, &colors).unwrap();

    let mut cursor = Cursor::new(buf);
    let decoded = decode_colors(&mut cursor, ColorRoutine::Ct16, 1, 1).unwrap();
    assert_eq!(decoded, vec![Color::new(248, 0, 0, 255)]);
}

#[test]
fn psmt4_packs_two_indices_per_byte_low_nibble_first() {
    let indices: Vec<u8> = (0..16).collect();
    let mut buf = Vec::new();
    encode_indices(&mut buf, ColorRoutine::Indexed4, 4, 4, &indices).unwrap();
    assert_eq!(buf, vec![0x10, 0x32, 0x54, 0x76, 0x98, 0xBA, 0xDC, 0xFE]);

    let mut cursor = Cursor::new(buf);
    let decoded = decode_indices(&mut cursor, ColorRoutine::Indexed4, 4, 4).unwrap();
    assert_eq!(decoded, indices);
}

#[test]
fn psmt8_round_trips_through_the_swizzle() {
    let indices: Vec<u8> = (0..256u32).map(|i| (i % 251) as u8).collect();
    let mut buf = Vec::new();
    encode_indices(&mut buf, ColorRoutine::Indexed8, 16, 16, &indices).unwrap();

    let mut cursor = Cursor::new(buf);
    let decoded = decode_indices(&mut cursor, ColorRoutine::Indexed8, 16, 16).unwrap();
    assert_eq!(decoded, indices);
}

#[test]
fn single_byte_indexed_images_round_trip() {
    let indices = vec![7u8];
    let mut buf = Vec::new();
    encode_indices(&mut buf, ColorRoutine::Indexed4, 1, 1, &indices).unwrap();
    assert_eq!(buf.len(), 1);
    let mut cursor = Cursor::new(buf);
    assert_eq!(
        decode_indices(&mut cursor, ColorRoutine::Indexed4, 1, 1).unwrap(),
        indices
    );

    let indices8 = vec![200u8];
    let mut buf8 = Vec::new();
    encode_indices(&mut buf8, ColorRoutine::Indexed8, 1, 1, &indices8).unwrap();
    assert_eq!(buf8.len(), 1);
    let mut cursor8 = Cursor::new(buf8);
    assert_eq!(
        decode_indices(&mut cursor8, ColorRoutine::Indexed8, 1, 1).unwrap(),
        indices8
    );
}

#[test]
fn short_reads_are_fatal() {
    let mut cursor = Cursor::new(vec![0u8; 2]);
    let err = decode_colors(&mut cursor, ColorRoutine::Ct32, 1, 1);
    assert!(matches!(err, Err(crate::error::TmxError::Io(_))));
}

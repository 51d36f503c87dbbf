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

//! TMX texture codec
//!
//! This library reads and writes the TMX texture container used by
//! PlayStation 2 era games: a header, one or more CLUT palettes, a base
//! pixel plane, and an optional mip chain, encoded in one of the PS2
//! Graphics Synthesizer's pixel storage modes.
//!
//! # Example
//!
//! ```
//! use tmx::color::Color;
//! use tmx::container::TmxImage;
//! use tmx::pixel_format::PixelFormat;
//! use tmx::raster::ImageRaster;
//!
//! let pixels = vec![Color::new(255, 0, 0, 255); 4];
//! let raster = ImageRaster::from_colors(2, 2, &pixels);
//! let image = TmxImage::from_raster(&raster, PixelFormat::Psmct32, None).unwrap();
//!
//! let mut bytes = Vec::new();
//! image
//!     .serialize(&mut std::io::Cursor::new(&mut bytes))
//!     .unwrap();
//! ```

pub mod color;
pub mod container;
pub mod error;
pub mod framing;
pub mod io;
pub mod pixel_format;
pub mod quantizer;
pub mod raster;

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

//! Error types for the TMX codec.

use thiserror::Error;

/// Result type for TMX codec operations.
pub type Result<T> = std::result::Result<T, TmxError>;

/// Errors that can occur while parsing, serializing, or encoding a TMX image.
#[derive(Debug, Error)]
pub enum TmxError {
    /// The container magic tag did not read `"TMX0"`, a header field violated an
    /// invariant (e.g. a non-indexed pixel format with a non-zero palette count),
    /// or the payload was truncated.
    #[error("invalid TMX container: {0}")]
    InvalidFormat(String),

    /// A caller asked for a pixel format tag (by name, e.g. via the CLI) that
    /// this codec does not implement.
    #[error("unsupported pixel format: {0}")]
    UnsupportedPixelFormat(String),

    /// A mip level's dimensions (`width/(4k)` or `height/(4k)`) would be zero.
    /// Parsing tolerates this (the mip is stored empty); encoding rejects it.
    #[error("mip level {level} would have zero dimensions ({width}x{height})")]
    InvalidMipDimensions {
        /// 1-based mip level index.
        level: u32,
        /// Computed mip width.
        width: u32,
        /// Computed mip height.
        height: u32,
    },

    /// The quantizer could not honor the requested palette size.
    #[error(transparent)]
    Quantizer(#[from] crate::quantizer::QuantizerError),

    /// The underlying reader or writer failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

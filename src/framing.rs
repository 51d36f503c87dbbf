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

//! Small framing helpers shared by the container reader/writer: fixed-length
//! NUL-padded string fields and 16-byte alignment, in the manual
//! offset-arithmetic style of `PSXExecutable::load`'s header parsing.

use std::io::{Read, Seek, SeekFrom, Write};

use crate::error::Result;

/// Read a fixed-length, NUL-padded string field.
///
/// Reads exactly `len` bytes and returns everything before the first NUL
/// (there may be none, if the field is not NUL-terminated because the
/// string exactly filled it).
pub fn read_fixed_str<R: Read>(reader: &mut R, len: usize) -> Result<String> {
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    Ok(String::from_utf8_lossy(&buf[..end]).into_owned())
}

/// Write `s` into a fixed-length, NUL-padded field of `len` bytes.
///
/// If `s` (in bytes) does not fit in `len - 1` bytes (room must remain for a
/// terminating NUL), it is truncated and a warning is logged — this is the
/// codec's `OversizedComment` condition, which is handled silently rather
/// than surfaced as an error (see `TmxError`'s documentation).
pub fn write_fixed_str<W: Write>(writer: &mut W, s: &str, len: usize) -> Result<()> {
    let max_payload = len.saturating_sub(1);
    let bytes = s.as_bytes();
    let payload = if bytes.len() > max_payload {
        log::warn!(
            "comment field truncated: {} bytes does not fit in a {len}-byte field",
            bytes.len()
        );
        &bytes[..max_payload]
    } else {
        bytes
    };
    let mut buf = vec![0u8; len];
    buf[..payload.len()].copy_from_slice(payload);
    writer.write_all(&buf)?;
    Ok(())
}

/// Round `pos` up to the next multiple of `align`.
pub fn align_up(pos: u64, align: u64) -> u64 {
    pos.div_ceil(align) * align
}

/// Advance a seekable reader/writer forward to `align_up(current, align)`,
/// relative to `start` (the beginning of the region being framed).
pub fn align_to<S: Seek>(stream: &mut S, start: u64, align: u64) -> Result<u64> {
    let current = stream.stream_position()?;
    let target = start + align_up(current - start, align);
    if target != current {
        stream.seek(SeekFrom::Start(target))?;
    }
    Ok(target)
}

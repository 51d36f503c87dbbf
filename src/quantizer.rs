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

//! Wu color quantization.
//!
//! Reduces a true-color raster to a palette of at most `N` colors plus a
//! per-pixel palette index, by recursively splitting a 3-D RGB histogram into
//! boxes of minimal variance (Xiaolin Wu's algorithm), then assigning every
//! pixel to its nearest box centroid.
//!
//! No example in this codebase's retrieval corpus implements Wu quantization
//! (the teacher emulator has no notion of color reduction); this is built
//! directly from the algorithm's well-known structure, in the surrounding
//! crate's module and error idiom.

use thiserror::Error;

use crate::color::Color;

/// Side length of the 3-D histogram: 32 buckets (5-bit-reduced channels) plus
/// a leading zero row/column/plane used by the cumulative-sum recurrence.
const SIDE: usize = 33;

/// Errors the quantizer can report.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuantizerError {
    /// The caller asked for more colors than the input has distinct occupied
    /// histogram cells, and there was nothing at all to build a palette from.
    #[error("cannot quantize an empty raster")]
    TooFewColors,
}

/// Quantizer tuning knobs, per the codec's quantization contract.
#[derive(Debug, Clone, Copy)]
pub struct QuantizeOptions {
    /// Target palette size (16 or 256 for the TMX indexed formats, but any
    /// value up to 256 is accepted).
    pub colors: usize,
    /// Pixels with alpha below this value snap to a dedicated, fully
    /// transparent palette slot instead of participating in quantization.
    /// `0` (the reference default) disables snapping.
    pub alpha_threshold: u8,
    /// Dithering strength. The reference value is `1`, at which no dithering
    /// is performed; no dithering algorithm is implemented for other values
    /// either, since none is specified.
    pub dither: u8,
}

impl Default for QuantizeOptions {
    fn default() -> Self {
        Self {
            colors: 256,
            alpha_threshold: 0,
            dither: 1,
        }
    }
}

/// The result of quantizing a raster: a palette and one index per pixel.
#[derive(Debug, Clone)]
pub struct QuantizeResult {
    /// Palette entries, in the order pixel indices reference. May be shorter
    /// than `options.colors` when the input had fewer distinct colors.
    pub palette: Vec<Color>,
    /// One palette index per input pixel, row-major.
    pub indices: Vec<u8>,
}

/// Reduce `pixels` (row-major, `width * height` entries) to at most
/// `options.colors` colors.
pub fn quantize(pixels: &[Color], options: &QuantizeOptions) -> Result<QuantizeResult, QuantizerError> {
    if pixels.is_empty() {
        return Err(QuantizerError::TooFewColors);
    }

    let transparent_slot = options.alpha_threshold > 0;
    let (opaque, transparent_mask): (Vec<Color>, Vec<bool>) = if transparent_slot {
        let mask: Vec<bool> = pixels.iter().map(|p| p.a < options.alpha_threshold).collect();
        let opaque = pixels
            .iter()
            .zip(&mask)
            .filter(|(_, &t)| !t)
            .map(|(p, _)| *p)
            .collect();
        (opaque, mask)
    } else {
        (pixels.to_vec(), vec![false; pixels.len()])
    };

    let budget = if transparent_slot {
        options.colors.saturating_sub(1).max(1)
    } else {
        options.colors
    };

    let palette = if opaque.is_empty() {
        Vec::new()
    } else {
        build_palette(&opaque, budget)
    };

    let mut full_palette = palette.clone();
    let transparent_index = if transparent_slot {
        full_palette.push(Color::new(0, 0, 0, 0));
        Some((full_palette.len() - 1) as u8)
    } else {
        None
    };

    let indices = pixels
        .iter()
        .zip(&transparent_mask)
        .map(|(p, &is_transparent)| {
            if is_transparent {
                transparent_index.expect("transparent mask implies a transparent slot")
            } else {
                nearest_index(&full_palette, &palette, *p)
            }
        })
        .collect();

    Ok(QuantizeResult {
        palette: full_palette,
        indices,
    })
}

/// Find the index (into `full_palette`) of the entry in `candidates` nearest
/// `color` by squared RGB distance; ties favor the lowest index.
fn nearest_index(full_palette: &[Color], candidates: &[Color], color: Color) -> u8 {
    let mut best = 0usize;
    let mut best_dist = i64::MAX;
    for (i, p) in candidates.iter().enumerate() {
        let dr = p.r as i64 - color.r as i64;
        let dg = p.g as i64 - color.g as i64;
        let db = p.b as i64 - color.b as i64;
        let dist = dr * dr + dg * dg + db * db;
        if dist < best_dist {
            best_dist = dist;
            best = i;
        }
    }
    let _ = full_palette;
    best as u8
}

/// A 3-D cumulative-moment histogram over the reduced (5-bit) RGB cube.
struct Moments {
    wt: Vec<f64>,
    mr: Vec<f64>,
    mg: Vec<f64>,
    mb: Vec<f64>,
    m2: Vec<f64>,
}

fn idx(r: usize, g: usize, b: usize) -> usize {
    (r * SIDE + g) * SIDE + b
}

impl Moments {
    fn new() -> Self {
        let len = SIDE * SIDE * SIDE;
        Self {
            wt: vec![0.0; len],
            mr: vec![0.0; len],
            mg: vec![0.0; len],
            mb: vec![0.0; len],
            m2: vec![0.0; len],
        }
    }

    fn build(pixels: &[Color]) -> Self {
        let mut m = Self::new();
        for p in pixels {
            let ir = (p.r >> 3) as usize + 1;
            let ig = (p.g >> 3) as usize + 1;
            let ib = (p.b >> 3) as usize + 1;
            let i = idx(ir, ig, ib);
            m.wt[i] += 1.0;
            m.mr[i] += p.r as f64;
            m.mg[i] += p.g as f64;
            m.mb[i] += p.b as f64;
            m.m2[i] += (p.r as f64).powi(2) + (p.g as f64).powi(2) + (p.b as f64).powi(2);
        }
        m.accumulate();
        m
    }

    /// Turn the per-cell histogram into cumulative moments so that any box's
    /// totals can be read off in O(1) via [`Self::volume`].
    fn accumulate(&mut self) {
        let mut area_wt = [0.0f64; SIDE];
        let mut area_mr = [0.0f64; SIDE];
        let mut area_mg = [0.0f64; SIDE];
        let mut area_mb = [0.0f64; SIDE];
        let mut area_m2 = [0.0f64; SIDE];

        for r in 1..SIDE {
            area_wt.fill(0.0);
            area_mr.fill(0.0);
            area_mg.fill(0.0);
            area_mb.fill(0.0);
            area_m2.fill(0.0);

            for g in 1..SIDE {
                let (mut line_wt, mut line_mr, mut line_mg, mut line_mb, mut line_m2) =
                    (0.0, 0.0, 0.0, 0.0, 0.0);
                for b in 1..SIDE {
                    let cell = idx(r, g, b);
                    line_wt += self.wt[cell];
                    line_mr += self.mr[cell];
                    line_mg += self.mg[cell];
                    line_mb += self.mb[cell];
                    line_m2 += self.m2[cell];

                    area_wt[b] += line_wt;
                    area_mr[b] += line_mr;
                    area_mg[b] += line_mg;
                    area_mb[b] += line_mb;
                    area_m2[b] += line_m2;

                    let prev = idx(r - 1, g, b);
                    self.wt[cell] = self.wt[prev] + area_wt[b];
                    self.mr[cell] = self.mr[prev] + area_mr[b];
                    self.mg[cell] = self.mg[prev] + area_mg[b];
                    self.mb[cell] = self.mb[prev] + area_mb[b];
                    self.m2[cell] = self.m2[prev] + area_m2[b];
                }
            }
        }
    }

    /// Inclusion-exclusion sum of `moment` over an axis-aligned box whose
    /// exclusive lower corner is `(r0, g0, b0)` and inclusive upper corner is
    /// `(r1, g1, b1)`.
    fn volume(moment: &[f64], b: &Cube) -> f64 {
        moment[idx(b.r1, b.g1, b.b1)] - moment[idx(b.r1, b.g1, b.b0)]
            - moment[idx(b.r1, b.g0, b.b1)] + moment[idx(b.r1, b.g0, b.b0)]
            - moment[idx(b.r0, b.g1, b.b1)] + moment[idx(b.r0, b.g1, b.b0)]
            + moment[idx(b.r0, b.g0, b.b1)] - moment[idx(b.r0, b.g0, b.b0)]
    }
}

/// An axis-aligned box within the reduced RGB cube: `(r0, g0, b0)` exclusive,
/// `(r1, g1, b1)` inclusive.
#[derive(Debug, Clone, Copy)]
struct Cube {
    r0: usize,
    r1: usize,
    g0: usize,
    g1: usize,
    b0: usize,
    b1: usize,
}

impl Cube {
    fn whole() -> Self {
        Self {
            r0: 0,
            r1: SIDE - 1,
            g0: 0,
            g1: SIDE - 1,
            b0: 0,
            b1: SIDE - 1,
        }
    }

    fn volume(&self) -> usize {
        (self.r1 - self.r0) * (self.g1 - self.g0) * (self.b1 - self.b0)
    }
}

/// Weighted variance of the colors inside `cube`: total squared distance from
/// the box centroid, a proxy for how much detail splitting it further would
/// preserve.
fn variance(m: &Moments, cube: &Cube) -> f64 {
    let wt = Moments::volume(&m.wt, cube);
    if wt <= 0.0 {
        return 0.0;
    }
    let mr = Moments::volume(&m.mr, cube);
    let mg = Moments::volume(&m.mg, cube);
    let mb = Moments::volume(&m.mb, cube);
    let m2 = Moments::volume(&m.m2, cube);
    m2 - (mr * mr + mg * mg + mb * mb) / wt
}

/// For one axis, find the cut position that minimizes the sum of the two
/// resulting sub-boxes' variances, i.e. maximizes `half_sum_sq/half_wt`
/// summed over both halves. Returns `None` if the box can't be split along
/// this axis (fewer than 2 occupied slices).
fn maximize_axis(
    m: &Moments,
    cube: &Cube,
    axis: Axis,
    whole_wt: f64,
    whole_mr: f64,
    whole_mg: f64,
    whole_mb: f64,
) -> Option<(usize, f64)> {
    let (first, last) = match axis {
        Axis::R => (cube.r0 + 1, cube.r1),
        Axis::G => (cube.g0 + 1, cube.g1),
        Axis::B => (cube.b0 + 1, cube.b1),
    };
    if last <= first {
        return None;
    }

    let mut best_cut = None;
    let mut best_value = 0.0f64;

    for pos in first..last {
        let half = match axis {
            Axis::R => Cube { r1: pos, ..*cube },
            Axis::G => Cube { g1: pos, ..*cube },
            Axis::B => Cube { b1: pos, ..*cube },
        };
        let half_wt = Moments::volume(&m.wt, &half);
        if half_wt <= 0.0 || (whole_wt - half_wt) <= 0.0 {
            continue;
        }
        let half_mr = Moments::volume(&m.mr, &half);
        let half_mg = Moments::volume(&m.mg, &half);
        let half_mb = Moments::volume(&m.mb, &half);

        let rest_wt = whole_wt - half_wt;
        let rest_mr = whole_mr - half_mr;
        let rest_mg = whole_mg - half_mg;
        let rest_mb = whole_mb - half_mb;

        let half_score = (half_mr * half_mr + half_mg * half_mg + half_mb * half_mb) / half_wt;
        let rest_score = (rest_mr * rest_mr + rest_mg * rest_mg + rest_mb * rest_mb) / rest_wt;
        let value = half_score + rest_score;

        if value > best_value {
            best_value = value;
            best_cut = Some(pos);
        }
    }

    best_cut.map(|pos| (pos, best_value))
}

#[derive(Clone, Copy)]
enum Axis {
    R,
    G,
    B,
}

/// Split `cube` along whichever axis yields the highest combined score,
/// returning the new second box and shrinking `cube` to the first in place.
/// Returns `None` if `cube` can't be split further (a single histogram cell).
fn cut(m: &Moments, cube: &mut Cube) -> Option<Cube> {
    let whole_wt = Moments::volume(&m.wt, cube);
    let whole_mr = Moments::volume(&m.mr, cube);
    let whole_mg = Moments::volume(&m.mg, cube);
    let whole_mb = Moments::volume(&m.mb, cube);

    let r = maximize_axis(m, cube, Axis::R, whole_wt, whole_mr, whole_mg, whole_mb);
    let g = maximize_axis(m, cube, Axis::G, whole_wt, whole_mr, whole_mg, whole_mb);
    let b = maximize_axis(m, cube, Axis::B, whole_wt, whole_mr, whole_mg, whole_mb);

    let (axis, pos) = [(Axis::R, r), (Axis::G, g), (Axis::B, b)]
        .into_iter()
        .filter_map(|(axis, res)| res.map(|(pos, value)| (axis, pos, value)))
        .max_by(|a, b| a.2.total_cmp(&b.2))
        .map(|(axis, pos, _)| (axis, pos))?;

    let mut second = *cube;
    match axis {
        Axis::R => {
            second.r0 = pos;
            cube.r1 = pos;
        }
        Axis::G => {
            second.g0 = pos;
            cube.g1 = pos;
        }
        Axis::B => {
            second.b0 = pos;
            cube.b1 = pos;
        }
    }
    Some(second)
}

/// Mean color of the pixels inside `cube`.
fn average(m: &Moments, cube: &Cube) -> Color {
    let wt = Moments::volume(&m.wt, cube);
    if wt <= 0.0 {
        return Color::BLACK;
    }
    let r = Moments::volume(&m.mr, cube) / wt;
    let g = Moments::volume(&m.mg, cube) / wt;
    let b = Moments::volume(&m.mb, cube) / wt;
    Color::new(r.round() as u8, g.round() as u8, b.round() as u8, 255)
}

/// Build a palette of at most `budget` colors from `pixels` via Wu's
/// histogram-splitting algorithm, then re-derive each entry's alpha as the
/// mean alpha of the pixels nearest it.
fn build_palette(pixels: &[Color], budget: usize) -> Vec<Color> {
    let moments = Moments::build(pixels);

    let mut cubes = vec![Cube::whole()];
    while cubes.len() < budget.max(1) {
        let Some((split_idx, _)) = cubes
            .iter()
            .enumerate()
            .filter(|(_, c)| c.volume() > 0)
            .max_by(|a, b| variance(&moments, a.1).total_cmp(&variance(&moments, b.1)))
            .map(|(i, _)| (i, ()))
        else {
            break;
        };
        let Some(new_box) = cut(&moments, &mut cubes[split_idx]) else {
            break;
        };
        cubes.push(new_box);
    }

    let mut palette: Vec<Color> = cubes.iter().map(|c| average(&moments, c)).collect();

    // Re-derive alpha per entry from the pixels actually nearest it, per the
    // contract that RGB comes from the centroid but alpha is the mean of
    // contributors.
    let mut alpha_sum = vec![0u64; palette.len()];
    let mut alpha_count = vec![0u64; palette.len()];
    for p in pixels {
        let i = nearest_index(&palette, &palette, *p) as usize;
        alpha_sum[i] += p.a as u64;
        alpha_count[i] += 1;
    }
    for (i, entry) in palette.iter_mut().enumerate() {
        if alpha_count[i] > 0 {
            entry.a = ((alpha_sum[i] as f64 / alpha_count[i] as f64).round()) as u8;
        }
    }

    palette
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(color: Color, n: usize) -> Vec<Color> {
        vec![color; n]
    }

    #[test]
    fn empty_raster_is_an_error() {
        assert_eq!(
            quantize(&[], &QuantizeOptions::default()),
            Err(QuantizerError::TooFewColors)
        );
    }

    #[test]
    fn a_single_solid_color_collapses_to_one_palette_entry() {
        let pixels = solid(Color::new(10, 20, 30, 255), 64);
        let result = quantize(&pixels, &QuantizeOptions { colors: 16, ..Default::default() }).unwrap();
        assert_eq!(result.palette.len(), 1);
        assert!(result.indices.iter().all(|&i| i == 0));
        assert_eq!(result.palette[0], Color::new(10, 20, 30, 255));
    }

    #[test]
    fn never_returns_more_entries_than_requested() {
        let mut pixels = Vec::new();
        for r in 0..8u16 {
            for g in 0..8u16 {
                pixels.push(Color::new((r * 32) as u8, (g * 32) as u8, 128, 255));
            }
        }
        let result = quantize(&pixels, &QuantizeOptions { colors: 16, ..Default::default() }).unwrap();
        assert!(result.palette.len() <= 16);
        assert_eq!(result.indices.len(), pixels.len());
    }

    #[test]
    fn every_pixel_maps_to_its_nearest_palette_entry() {
        let pixels = vec![
            Color::new(0, 0, 0, 255),
            Color::new(255, 255, 255, 255),
            Color::new(250, 250, 250, 255),
            Color::new(5, 5, 5, 255),
        ];
        let result = quantize(&pixels, &QuantizeOptions { colors: 2, ..Default::default() }).unwrap();
        for (p, &i) in pixels.iter().zip(&result.indices) {
            let chosen = result.palette[i as usize];
            let chosen_dist = dist2(chosen, *p);
            for other in &result.palette {
                assert!(dist2(*other, *p) >= chosen_dist);
            }
        }
    }

    #[test]
    fn alpha_threshold_snaps_transparent_pixels_to_their_own_slot() {
        let pixels = vec![
            Color::new(255, 0, 0, 255),
            Color::new(0, 0, 0, 0),
            Color::new(0, 255, 0, 255),
        ];
        let options = QuantizeOptions {
            colors: 4,
            alpha_threshold: 1,
            dither: 1,
        };
        let result = quantize(&pixels, &options).unwrap();
        let transparent_slot = (result.palette.len() - 1) as u8;
        assert_eq!(result.indices[1], transparent_slot);
        assert_eq!(result.palette[transparent_slot as usize].a, 0);
    }

    fn dist2(a: Color, b: Color) -> i64 {
        let dr = a.r as i64 - b.r as i64;
        let dg = a.g as i64 - b.g as i64;
        let db = a.b as i64 - b.b as i64;
        dr * dr + dg * dg + db * db
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Calculate the energy of a frame group
//!
//! A frame's spatial energy is the Sobel gradient magnitude of its
//! luminance.  A group's temporal energy is how much each pixel moves
//! between consecutive frames.  The map handed to the seam search is
//! the average, across the group, of spatial plus temporal energy, so
//! that one seam can be taken out of every frame in the group without
//! cutting through anything that moves.

use crate::error::{invalid, Result};
use crate::pixelpairs::{channel_distance, luminance};
use crate::twodmap::{EnergyMap, TwoDimensionalMap};
use image::{GenericImageView, Pixel, Primitive};
use itertools::iproduct;

// Sobel, indexed [row][column].  The vertical kernel is the transpose.
const SOBEL_X: [[f32; 3]; 3] = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_Y: [[f32; 3]; 3] = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Compute the spatial energy of every pixel in a frame: the gradient
/// magnitude `sqrt(gx² + gy²)` of the luminance under the 3x3 Sobel
/// kernels.  Pixels past the border take the value of the nearest
/// edge pixel.
pub fn spatial_energy<I, P, S>(image: &I) -> EnergyMap
where
    I: GenericImageView<Pixel = P>,
    P: Pixel<Subpixel = S>,
    S: Primitive,
{
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return EnergyMap::new(width, height, 0.0);
    }
    let (mw, mh) = (width as i64 - 1, height as i64 - 1);

    let luma = TwoDimensionalMap::from_fn(width, height, |x, y| luminance(&image.get_pixel(x, y)));
    let at = |x: i64, y: i64| luma[(x.clamp(0, mw) as u32, y.clamp(0, mh) as u32)];

    TwoDimensionalMap::from_fn(width, height, |x, y| {
        let (x, y) = (x as i64, y as i64);
        let (gx, gy) = iproduct!(0..3usize, 0..3usize).fold((0.0f32, 0.0f32), |(gx, gy), (j, i)| {
            let l = at(x + i as i64 - 1, y + j as i64 - 1);
            (gx + SOBEL_X[j][i] * l, gy + SOBEL_Y[j][i] * l)
        });
        (gx * gx + gy * gy).sqrt()
    })
}

/// The mean, over every consecutive pair of frames, of the per-pixel
/// channel difference.  A group of one frame has no motion and yields
/// an all-zero map.
pub fn temporal_energy<I, P, S>(frames: &[I]) -> Result<EnergyMap>
where
    I: GenericImageView<Pixel = P>,
    P: Pixel<Subpixel = S>,
    S: Primitive,
{
    let first = match frames.first() {
        Some(first) => first,
        None => return invalid("cannot compute temporal energy of an empty group"),
    };
    let (width, height) = first.dimensions();
    if let Some(odd) = frames.iter().find(|f| f.dimensions() != (width, height)) {
        let (w, h) = odd.dimensions();
        return invalid(format!(
            "frame group mixes {}x{} and {}x{} frames",
            width, height, w, h
        ));
    }

    let mut temporal = EnergyMap::new(width, height, 0.0);
    if frames.len() < 2 {
        return Ok(temporal);
    }

    for pair in frames.windows(2) {
        for (y, x) in iproduct!(0..height, 0..width) {
            temporal[(x, y)] += channel_distance(&pair[0].get_pixel(x, y), &pair[1].get_pixel(x, y));
        }
    }

    let pairs = (frames.len() - 1) as f32;
    Ok(temporal.map(|e| e / pairs))
}

/// Elementwise sum of a spatial and a temporal map.
pub fn combine(spatial: &EnergyMap, temporal: &EnergyMap) -> Result<EnergyMap> {
    spatial.zip_with(temporal, |s, t| s + t)
}

/// Elementwise mean of a set of maps of identical shape.
pub fn average(maps: &[EnergyMap]) -> Result<EnergyMap> {
    let (first, rest) = match maps.split_first() {
        Some(split) => split,
        None => return invalid("cannot average an empty set of energy maps"),
    };
    let total = rest
        .iter()
        .try_fold(first.clone(), |acc, map| acc.zip_with(map, |a, b| a + b))?;
    let count = maps.len() as f32;
    Ok(total.map(|e| e / count))
}

/// The single representative map for a frame group: each frame's
/// spatial energy plus the group's temporal energy, averaged across
/// the group.
pub fn group_energy<I, P, S>(frames: &[I]) -> Result<EnergyMap>
where
    I: GenericImageView<Pixel = P>,
    P: Pixel<Subpixel = S>,
    S: Primitive,
{
    let temporal = temporal_energy(frames)?;
    let totals = frames
        .iter()
        .map(|frame| combine(&spatial_energy(frame), &temporal))
        .collect::<Result<Vec<_>>>()?;
    average(&totals)
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Scalar measurements of pixels and pixel pairs.
//!
//! Spatial energy works on a single luminance channel; temporal
//! energy compares the same pixel in two frames channel by channel.

use image::{Pixel, Primitive};
use num_traits::NumCast;

#[inline]
fn subpixel_value<S: Primitive>(s: S) -> f32 {
    <f32 as NumCast>::from(s).unwrap_or(0.0)
}

/// The luminance of a single pixel, in the pixel's own sample range.
#[inline]
pub fn luminance<P, S>(p: &P) -> f32
where
    P: Pixel<Subpixel = S>,
    S: Primitive,
{
    subpixel_value(p.to_luma().channels()[0])
}

/// (Pixel, Pixel) -> Difference
///
/// The mean absolute difference across every channel of the pair.
/// Identical pixels always score exactly zero.
#[inline]
pub fn channel_distance<P, S>(p1: &P, p2: &P) -> f32
where
    P: Pixel<Subpixel = S>,
    S: Primitive,
{
    let (c1, c2) = (p1.channels(), p2.channels());
    if c1.is_empty() {
        return 0.0;
    }
    let total: f32 = c1
        .iter()
        .zip(c2.iter())
        .map(|(a, b)| (subpixel_value(*a) - subpixel_value(*b)).abs())
        .sum();
    total / c1.len() as f32
}

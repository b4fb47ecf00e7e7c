// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Image dimensional flipper
//!
//! A proxy for the ImageRS `GenericImageView` trait that maps the
//! width to the original height, and vice versa, as well as every x
//! to y and vice versa.
//!
//! Carving height is carving width on the flipped frame: every frame
//! is transposed, the vertical seam pipeline runs unchanged, and the
//! result is transposed back.

use image::{GenericImageView, ImageBuffer, Pixel, Primitive};

/// A zero-copy transposed view of an image.
pub struct Flipper<'a, I: GenericImageView> {
    pub image: &'a I,
}

impl<'a, I: GenericImageView> Flipper<'a, I> {
    pub fn new(image: &'a I) -> Self {
        Flipper { image }
    }
}

impl<'a, I: GenericImageView> GenericImageView for Flipper<'a, I> {
    type Pixel = I::Pixel;

    fn dimensions(&self) -> (u32, u32) {
        let (x, y) = self.image.dimensions();
        (y, x)
    }

    fn get_pixel(&self, x: u32, y: u32) -> I::Pixel {
        self.image.get_pixel(y, x)
    }
}

/// Materialize the transposed view into a new buffer.
pub fn transpose<I, P, S>(image: &I) -> ImageBuffer<P, Vec<S>>
where
    I: GenericImageView<Pixel = P>,
    P: Pixel<Subpixel = S>,
    S: Primitive,
{
    let flipped = Flipper::new(image);
    let (width, height) = flipped.dimensions();
    ImageBuffer::from_fn(width, height, |x, y| flipped.get_pixel(x, y))
}

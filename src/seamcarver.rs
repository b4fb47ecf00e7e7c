// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Seamcarve - removing a seam
//!
//! Taking one seam out of one frame, and out of every frame of a
//! group at once.

use crate::energy::group_energy;
use crate::error::{invalid, Result};
use crate::seamfinder::{Seam, SeamFinder};
use image::{GenericImageView, ImageBuffer, Pixel, Primitive};

/// Remove one vertical seam from an image.  Pixels left of the seam
/// keep their column, pixels right of it move one column left, and
/// the seam pixel itself is dropped.
pub fn remove_vertical_seam<I, P, S>(image: &I, seam: &Seam) -> Result<ImageBuffer<P, Vec<S>>>
where
    I: GenericImageView<Pixel = P>,
    P: Pixel<Subpixel = S>,
    S: Primitive,
{
    let (width, height) = image.dimensions();
    if seam.len() != height as usize {
        return invalid(format!(
            "seam of length {} does not fit a frame {} rows high",
            seam.len(),
            height
        ));
    }
    if width == 0 {
        return invalid("cannot remove a seam from a frame with no columns");
    }
    if let Some((y, x)) = seam.columns().iter().enumerate().find(|(_, x)| **x >= width) {
        return invalid(format!(
            "seam column {} in row {} is outside a frame {} columns wide",
            x, y, width
        ));
    }

    let columns = seam.columns();
    Ok(ImageBuffer::from_fn(width - 1, height, |x, y| {
        if x < columns[y as usize] {
            image.get_pixel(x, y)
        } else {
            image.get_pixel(x + 1, y)
        }
    }))
}

/// Carve one seam out of every frame in a group.  The seam is found
/// on the group's averaged energy, so every frame loses the same
/// path.
pub fn carve_group<P, S>(
    finder: &SeamFinder,
    frames: &[ImageBuffer<P, Vec<S>>],
) -> Result<Vec<ImageBuffer<P, Vec<S>>>>
where
    P: Pixel<Subpixel = S>,
    S: Primitive,
{
    let energy = group_energy(frames)?;
    let seam = finder.find_vertical_seam(&energy)?;
    log::trace!(
        "group of {} frames: seam cost {} ending at column {:?}",
        frames.len(),
        seam.cost(),
        seam.columns().last()
    );
    frames
        .iter()
        .map(|frame| remove_vertical_seam(frame, &seam))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::energy::spatial_energy;
    use crate::error::CarveError;
    use image::{Luma, Rgb, RgbImage};

    const IMAGE_DATA: [u8; 20] = [9, 9, 0, 9, 9, 9, 1, 9, 8, 9, 9, 9, 9, 9, 0, 9, 9, 9, 0, 9];

    fn sample() -> ImageBuffer<Luma<u8>, Vec<u8>> {
        ImageBuffer::from_raw(5, 4, IMAGE_DATA.to_vec()).unwrap()
    }

    #[test]
    fn removes_exactly_the_seam_pixels() {
        let seam = Seam::new(vec![2, 3, 4, 3], 0.0);
        let carved = remove_vertical_seam(&sample(), &seam).unwrap();
        assert_eq!(carved.dimensions(), (4, 4));
        assert_eq!(
            carved.into_raw(),
            vec![9, 9, 9, 9, 9, 1, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9]
        );
    }

    #[test]
    fn seam_length_must_match_height() {
        let seam = Seam::new(vec![0, 0, 0], 0.0);
        assert!(matches!(
            remove_vertical_seam(&sample(), &seam),
            Err(CarveError::InvalidInput(_))
        ));
    }

    #[test]
    fn seam_columns_must_be_in_range() {
        let seam = Seam::new(vec![0, 1, 5, 4], 0.0);
        assert!(matches!(
            remove_vertical_seam(&sample(), &seam),
            Err(CarveError::InvalidInput(_))
        ));
    }

    #[test]
    fn found_seam_leaves_other_pixels_untouched() {
        let frame: RgbImage =
            ImageBuffer::from_fn(8, 6, |x, y| Rgb([(x * 29 + y * 7) as u8, (x ^ y) as u8, (x * y) as u8]));
        let seam = SeamFinder::default()
            .find_vertical_seam(&spatial_energy(&frame))
            .unwrap();
        assert!(seam.is_connected());
        let carved = remove_vertical_seam(&frame, &seam).unwrap();
        assert_eq!(carved.dimensions(), (7, 6));
        for y in 0..6 {
            let cut = seam.columns()[y as usize];
            for x in 0..7 {
                let source = if x < cut { x } else { x + 1 };
                assert_eq!(carved.get_pixel(x, y), frame.get_pixel(source, y));
            }
        }
    }

    #[test]
    fn group_shares_a_single_seam() {
        let frame: RgbImage = ImageBuffer::from_fn(6, 4, |x, _| Rgb([(x * 40) as u8, 0, 0]));
        let mut moved = frame.clone();
        moved.put_pixel(5, 0, Rgb([0, 0, 255]));
        let carved = carve_group(&SeamFinder::default(), &[frame, moved]).unwrap();
        assert_eq!(carved.len(), 2);
        assert!(carved.iter().all(|f| f.dimensions() == (5, 4)));
        // The frames differed at one pixel only; they still differ at
        // exactly one pixel after the shared seam is removed, or none
        // if the seam went through it.
        let differing = carved[0]
            .pixels()
            .zip(carved[1].pixels())
            .filter(|(a, b)| a != b)
            .count();
        assert!(differing <= 1);
    }
}

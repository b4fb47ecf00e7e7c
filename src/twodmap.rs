// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A flat, row-major two-dimensional field.
//!
//! Used for the energy map itself and for the two dynamic programming
//! tables built during a seam search.

use crate::error::{invalid, Result};
use itertools::iproduct;
use std::ops::{Index, IndexMut};

/// An addressable two-dimensional field of `Copy` values: `f32` for
/// energies and cumulative costs, `u32` for back pointers.
#[derive(Debug, Clone, PartialEq)]
pub struct TwoDimensionalMap<P: Copy> {
    width: u32,
    height: u32,
    data: Vec<P>,
}

/// Per-pixel importance.  Lower values are removed first.
pub type EnergyMap = TwoDimensionalMap<f32>;

impl<P: Copy> TwoDimensionalMap<P> {
    /// A map with every cell set to `fill`.
    pub fn new(width: u32, height: u32, fill: P) -> Self {
        TwoDimensionalMap {
            width,
            height,
            data: vec![fill; width as usize * height as usize],
        }
    }

    /// As `new`, but reports allocation failure instead of aborting.
    pub fn try_new(width: u32, height: u32, fill: P) -> Result<Self> {
        let len = width as usize * height as usize;
        let mut data = Vec::new();
        data.try_reserve_exact(len)?;
        data.resize(len, fill);
        Ok(TwoDimensionalMap {
            width,
            height,
            data,
        })
    }

    /// Build a map by evaluating `f(x, y)` for every cell, row by row.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> P,
    {
        TwoDimensionalMap {
            width,
            height,
            data: iproduct!(0..height, 0..width).map(|(y, x)| f(x, y)).collect(),
        }
    }

    /// Wrap an existing row-major buffer.
    pub fn from_vec(width: u32, height: u32, data: Vec<P>) -> Result<Self> {
        if data.len() != width as usize * height as usize {
            return invalid(format!(
                "buffer of {} cells cannot back a {}x{} map",
                data.len(),
                width,
                height
            ));
        }
        Ok(TwoDimensionalMap {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// True when the map has no rows or no columns.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Every cell, row by row.
    pub fn as_slice(&self) -> &[P] {
        &self.data
    }

    // Absolutely, the number one name of this game is keep the index
    // math in a singular location and never, ever mess with it.
    fn get_index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    pub fn row(&self, y: u32) -> &[P] {
        let start = self.get_index(0, y);
        &self.data[start..start + self.width as usize]
    }

    pub fn row_mut(&mut self, y: u32) -> &mut [P] {
        let start = self.get_index(0, y);
        let width = self.width as usize;
        &mut self.data[start..start + width]
    }

    /// Row `y - 1` for reading alongside row `y` for writing.  This is
    /// the only access the seam search needs while filling a row, and
    /// it keeps the borrow checker honest about the row dependency.
    pub fn previous_and_current_row(&mut self, y: u32) -> (&[P], &mut [P]) {
        debug_assert!(y > 0 && y < self.height);
        let width = self.width as usize;
        let split = self.get_index(0, y);
        let (above, rest) = self.data.split_at_mut(split);
        (&above[split - width..], &mut rest[..width])
    }

    /// Apply `f` to every cell.
    pub fn map<F>(&self, f: F) -> Self
    where
        F: Fn(P) -> P,
    {
        TwoDimensionalMap {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|p| f(*p)).collect(),
        }
    }

    /// Combine two maps of identical shape cell by cell.
    pub fn zip_with<F>(&self, other: &Self, f: F) -> Result<Self>
    where
        F: Fn(P, P) -> P,
    {
        if self.dimensions() != other.dimensions() {
            return invalid(format!(
                "cannot combine a {}x{} map with a {}x{} map",
                self.width, self.height, other.width, other.height
            ));
        }
        Ok(TwoDimensionalMap {
            width: self.width,
            height: self.height,
            data: self
                .data
                .iter()
                .zip(other.data.iter())
                .map(|(a, b)| f(*a, *b))
                .collect(),
        })
    }
}

impl<P: Copy> Index<(u32, u32)> for TwoDimensionalMap<P> {
    type Output = P;

    /// A convenience addressing mode for getting values.
    fn index(&self, (x, y): (u32, u32)) -> &P {
        let index = self.get_index(x, y);
        &self.data[index]
    }
}

impl<P: Copy> IndexMut<(u32, u32)> for TwoDimensionalMap<P> {
    /// A convenience addressing mode for setting values.
    fn index_mut(&mut self, (x, y): (u32, u32)) -> &mut P {
        let index = self.get_index(x, y);
        &mut self.data[index]
    }
}

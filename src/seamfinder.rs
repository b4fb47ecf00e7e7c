// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Find the cheapest seam through an energy map
//!
//! A shortest path over the grid DAG, one row at a time.  Every cell
//! of row `y` depends on three cells of row `y - 1`, and on nothing
//! else, so the cells of a single row can be relaxed concurrently.
//! Rows themselves cannot: a row is only started once every worker
//! relaxing the row above has been joined.

use crate::error::{invalid, CarveError, Result};
use crate::twodmap::{EnergyMap, TwoDimensionalMap};

/// A top-to-bottom, 8-connected path, one column index per row.
#[derive(Debug, Clone, PartialEq)]
pub struct Seam {
    columns: Vec<u32>,
    cost: f32,
}

impl Seam {
    /// Wrap a list of columns without checking connectivity.  The
    /// seam remover checks the range of every entry on its own.
    pub fn new(columns: Vec<u32>, cost: f32) -> Self {
        Seam { columns, cost }
    }

    pub fn columns(&self) -> &[u32] {
        &self.columns
    }

    /// The cumulative energy of the path: the bottom-row entry of the
    /// cost table where the seam ends.
    pub fn cost(&self) -> f32 {
        self.cost
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// True if no two consecutive rows step more than one column.
    pub fn is_connected(&self) -> bool {
        self.columns
            .windows(2)
            .all(|w| (w[0] as i64 - w[1] as i64).abs() <= 1)
    }
}

/// The dynamic-programming seam search.
///
/// `column_workers` threads share each row once a row is at least
/// `min_parallel_width` cells wide; narrower rows, or a single
/// worker, relax on the calling thread.
#[derive(Debug, Clone, Copy)]
pub struct SeamFinder {
    column_workers: usize,
    min_parallel_width: usize,
}

impl Default for SeamFinder {
    fn default() -> Self {
        SeamFinder {
            column_workers: 1,
            min_parallel_width: 512,
        }
    }
}

impl SeamFinder {
    pub fn new(column_workers: usize, min_parallel_width: usize) -> Self {
        SeamFinder {
            column_workers: column_workers.max(1),
            min_parallel_width,
        }
    }

    /// Given an energy map, return the cheapest seam from the top row
    /// to the bottom row.
    ///
    /// Ties are broken the same way every time: going straight down
    /// beats either diagonal, the left diagonal beats the right, and
    /// on the bottom row the leftmost minimum wins.
    pub fn find_vertical_seam(&self, energy: &EnergyMap) -> Result<Seam> {
        let (width, height) = energy.dimensions();
        if width == 0 || height == 0 {
            return invalid(format!(
                "cannot search a seam through a {}x{} energy map",
                width, height
            ));
        }

        let mut cost: TwoDimensionalMap<f32> = TwoDimensionalMap::try_new(width, height, 0.0)?;
        let mut parents: TwoDimensionalMap<u32> = TwoDimensionalMap::try_new(width, height, 0)?;

        // Populate the first row with their native energies.
        cost.row_mut(0).copy_from_slice(energy.row(0));

        for y in 1..height {
            let (above, current) = cost.previous_and_current_row(y);
            self.relax_row(above, energy.row(y), current, parents.row_mut(y))?;
        }

        // Find the x coordinate of the bottommost seam with the least
        // energy.  Strict comparison keeps the first occurrence.
        let bottom = cost.row(height - 1);
        let (mut seam_col, seam_cost) = bottom
            .iter()
            .enumerate()
            .fold((0usize, bottom[0]), |(bx, be), (x, e)| {
                if *e < be {
                    (x, *e)
                } else {
                    (bx, be)
                }
            });

        // Working backwards, generate a vec of x coordinates that that
        // map to the seam, reverse and return.
        let mut columns: Vec<u32> = (0..height)
            .rev()
            .fold(Vec::with_capacity(height as usize), |mut acc, y| {
                acc.push(seam_col as u32);
                seam_col = parents[(seam_col as u32, y)] as usize;
                acc
            });
        columns.reverse();

        Ok(Seam::new(columns, seam_cost))
    }

    // Joining the scope is the barrier between this row and the next.
    fn relax_row(
        &self,
        above: &[f32],
        weights: &[f32],
        current: &mut [f32],
        parents: &mut [u32],
    ) -> Result<()> {
        let width = current.len();
        let workers = self.column_workers.min(width);
        if workers <= 1 || width < self.min_parallel_width {
            relax_span(0, above, weights, current, parents);
            return Ok(());
        }

        let span = (width + workers - 1) / workers;
        crossbeam::scope(|scope| {
            for (i, (costs, backs)) in current
                .chunks_mut(span)
                .zip(parents.chunks_mut(span))
                .enumerate()
            {
                let start = i * span;
                let weights = &weights[start..start + costs.len()];
                scope.spawn(move |_| relax_span(start, above, weights, costs, backs));
            }
        })
        .map_err(|_| CarveError::ComputeFailure("a seam search worker panicked".to_string()))
    }
}

// Fill `current[..]`, which holds columns `start..start + len` of the
// row, from the complete row above.
fn relax_span(start: usize, above: &[f32], weights: &[f32], current: &mut [f32], parents: &mut [u32]) {
    let last = above.len() - 1;
    for (i, (cell, parent)) in current.iter_mut().zip(parents.iter_mut()).enumerate() {
        let x = start + i;
        let (mut best, mut best_x) = (above[x], x);
        if x > 0 && above[x - 1] < best {
            best = above[x - 1];
            best_x = x - 1;
        }
        if x < last && above[x + 1] < best {
            best = above[x + 1];
            best_x = x + 1;
        }
        *cell = weights[i] + best;
        *parent = best_x as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(width: u32, height: u32, data: &[f32]) -> EnergyMap {
        TwoDimensionalMap::from_vec(width, height, data.to_vec()).unwrap()
    }

    const BOWL: [f32; 16] = [
        1.0, 1.0, 1.0, 1.0, //
        1.0, 9.0, 9.0, 1.0, //
        1.0, 9.0, 9.0, 1.0, //
        1.0, 1.0, 1.0, 1.0,
    ];

    const ENERGY_DATA: [f32; 20] = [
        9.0, 9.0, 0.0, 9.0, 9.0, //
        9.0, 1.0, 9.0, 8.0, 9.0, //
        9.0, 9.0, 9.0, 9.0, 0.0, //
        9.0, 9.0, 9.0, 0.0, 9.0,
    ];

    #[test]
    fn bowl_grid_prefers_straight_then_left() {
        // Every bottom cell costs 4; the leftmost wins, and every step
        // up the left edge is a straight-down tie.
        let seam = SeamFinder::default().find_vertical_seam(&grid(4, 4, &BOWL)).unwrap();
        assert_eq!(seam.columns(), &[0, 0, 0, 0]);
        assert_eq!(seam.cost(), 4.0);
    }

    #[test]
    fn energy_grid_to_vertical_seam() {
        let seam = SeamFinder::default()
            .find_vertical_seam(&grid(5, 4, &ENERGY_DATA))
            .unwrap();
        assert_eq!(seam.columns(), &[2, 3, 4, 3]);
        assert_eq!(seam.cost(), 8.0);
    }

    #[test]
    fn single_row_is_first_argmin() {
        let seam = SeamFinder::default()
            .find_vertical_seam(&grid(5, 1, &[3.0, 1.0, 2.0, 1.0, 5.0]))
            .unwrap();
        assert_eq!(seam.columns(), &[1]);
        assert_eq!(seam.cost(), 1.0);
    }

    #[test]
    fn left_diagonal_beats_right_on_tie() {
        // Row 1 column 1 sees 5 above, 2 left and 2 right.
        let seam = SeamFinder::default()
            .find_vertical_seam(&grid(3, 2, &[2.0, 5.0, 2.0, 9.0, 0.0, 9.0]))
            .unwrap();
        assert_eq!(seam.columns(), &[0, 1]);
        assert_eq!(seam.cost(), 2.0);
    }

    #[test]
    fn straight_beats_diagonal_on_tie() {
        let seam = SeamFinder::default()
            .find_vertical_seam(&grid(3, 2, &[1.0, 1.0, 1.0, 9.0, 0.0, 9.0]))
            .unwrap();
        assert_eq!(seam.columns(), &[1, 1]);
    }

    #[test]
    fn single_column_runs_straight_down() {
        let seam = SeamFinder::default()
            .find_vertical_seam(&grid(1, 3, &[1.0, 2.0, 3.0]))
            .unwrap();
        assert_eq!(seam.columns(), &[0, 0, 0]);
        assert_eq!(seam.cost(), 6.0);
    }

    #[test]
    fn empty_maps_are_invalid() {
        let finder = SeamFinder::default();
        assert!(matches!(
            finder.find_vertical_seam(&EnergyMap::new(0, 4, 0.0)),
            Err(CarveError::InvalidInput(_))
        ));
        assert!(matches!(
            finder.find_vertical_seam(&EnergyMap::new(4, 0, 0.0)),
            Err(CarveError::InvalidInput(_))
        ));
    }

    #[test]
    fn row_parallel_search_matches_sequential() {
        let (width, height) = (97u32, 41u32);
        let energy = TwoDimensionalMap::from_fn(width, height, |x, y| {
            ((x * 7919 + y * 104_729) % 97) as f32 + if x == y { 0.0 } else { 3.0 }
        });
        let sequential = SeamFinder::default().find_vertical_seam(&energy).unwrap();
        let parallel = SeamFinder::new(4, 8).find_vertical_seam(&energy).unwrap();
        assert_eq!(sequential, parallel);
        assert_eq!(sequential.len(), height as usize);
        assert!(sequential.is_connected());
        assert!(sequential.columns().iter().all(|x| *x < width));
    }

    #[test]
    fn search_is_deterministic() {
        let energy = grid(5, 4, &ENERGY_DATA);
        let finder = SeamFinder::new(3, 1);
        let first = finder.find_vertical_seam(&energy).unwrap();
        for _ in 0..10 {
            assert_eq!(finder.find_vertical_seam(&energy).unwrap(), first);
        }
    }
}

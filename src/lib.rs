// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Seam carving for video.
//!
//! Frames are processed in small groups of consecutive frames that
//! share one seam per pass, so content that persists across frames is
//! cut the same way in each of them.

use image::{ImageBuffer, Pixel};

pub mod config;
pub use config::{CarveConfig, DEFAULT_GROUP_SIZE};

pub mod error;
pub use error::{CarveError, Result};

pub mod twodmap;
pub use twodmap::{EnergyMap, TwoDimensionalMap};

pub mod pixelpairs;

pub mod energy;
pub use energy::{average, combine, group_energy, spatial_energy, temporal_energy};

pub mod seamfinder;
pub use seamfinder::{Seam, SeamFinder};

pub mod seamcarver;
pub use seamcarver::{carve_group, remove_vertical_seam};

pub mod flipper;
pub use flipper::{transpose, Flipper};

pub mod scheduler;
pub use scheduler::{partition, Carved, Carver, Video};

/// One video frame: an owned image buffer of any `image` pixel type.
pub type Frame<P> = ImageBuffer<P, Vec<<P as Pixel>::Subpixel>>;

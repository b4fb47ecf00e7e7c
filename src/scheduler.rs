// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Carving a whole frame sequence
//!
//! Each pass splits the sequence into groups of consecutive frames,
//! carves one seam out of every group on a pool of worker threads,
//! and stitches the groups back together in their original order.
//! Passes repeat until the frames are narrow enough.  Height is
//! carved by running the same passes over transposed frames.

use crate::config::CarveConfig;
use crate::error::{invalid, CarveError, Result};
use crate::flipper::transpose;
use crate::seamcarver::carve_group;
use crate::seamfinder::SeamFinder;
use crate::Frame;
use crossbeam::channel;
use crossbeam_deque::{Injector, Steal};
use image::Pixel;
use itertools::Itertools;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

/// An ordered frame sequence and the rate it plays back at.
#[derive(Clone, PartialEq)]
pub struct Video<P: Pixel> {
    pub frames: Vec<Frame<P>>,
    pub frame_rate: f64,
}

/// The outcome of a carve, with the number of seams taken out of
/// each dimension.
#[derive(Clone, PartialEq)]
pub struct Carved<P: Pixel> {
    pub frames: Vec<Frame<P>>,
    pub width_passes: u32,
    pub height_passes: u32,
}

// Frames are summarized by count and size; dumping pixel data is
// never useful and would need `Debug` subpixels.
fn frame_summary<P: Pixel>(frames: &[Frame<P>]) -> String {
    match frames.first() {
        Some(first) => format!("{} x {}x{}", frames.len(), first.width(), first.height()),
        None => "0".to_string(),
    }
}

impl<P: Pixel> fmt::Debug for Video<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Video")
            .field("frames", &frame_summary(&self.frames))
            .field("frame_rate", &self.frame_rate)
            .finish()
    }
}

impl<P: Pixel> fmt::Debug for Carved<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Carved")
            .field("frames", &frame_summary(&self.frames))
            .field("width_passes", &self.width_passes)
            .field("height_passes", &self.height_passes)
            .finish()
    }
}

// Raises the abort flag if the worker holding it unwinds, so a
// panicking group stops its siblings just as an error does.
struct AbortOnPanic<'a>(&'a AtomicBool);

impl Drop for AbortOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.store(true, Ordering::Release);
        }
    }
}

#[derive(PartialEq, Copy, Clone, Debug)]
enum Carve {
    Width,
    Height,
}

/// Split a sequence into consecutive groups of at most `group_size`
/// items.  Only the last group may be short.
pub fn partition<T>(items: Vec<T>, group_size: usize) -> Vec<Vec<T>> {
    let chunks = items.into_iter().chunks(group_size.max(1));
    let groups: Vec<Vec<T>> = chunks.into_iter().map(|group| group.collect()).collect();
    groups
}

// Every frame must match the first, and the first must not be empty.
fn check_sequence<P: Pixel>(frames: &[Frame<P>]) -> Result<(u32, u32)> {
    let first = match frames.first() {
        Some(first) => first,
        None => return invalid("cannot carve an empty frame sequence"),
    };
    let (width, height) = first.dimensions();
    if width == 0 || height == 0 {
        return invalid(format!("cannot carve {}x{} frames", width, height));
    }
    if let Some((i, odd)) = frames
        .iter()
        .enumerate()
        .find(|(_, f)| f.dimensions() != (width, height))
    {
        let (w, h) = odd.dimensions();
        return invalid(format!(
            "frame {} is {}x{} but the sequence is {}x{}",
            i, w, h, width, height
        ));
    }
    Ok((width, height))
}

/// The group scheduler.  A `Carver` owns its configuration and is
/// immutable once built, so one carver can serve any number of
/// sequences.
#[derive(Debug, Clone)]
pub struct Carver {
    config: CarveConfig,
    finder: SeamFinder,
}

impl Carver {
    pub fn new(config: CarveConfig) -> Result<Self> {
        config.validate()?;
        let finder = SeamFinder::new(config.column_workers, config.min_parallel_width);
        log::debug!(
            "carver ready: {} group workers, groups of {}, {} column workers",
            config.workers,
            config.group_size,
            config.column_workers
        );
        Ok(Carver { config, finder })
    }

    pub fn config(&self) -> &CarveConfig {
        &self.config
    }

    /// Carve a video to the configured size.  The frame rate is passed
    /// through untouched.
    pub fn carve_video<P>(&self, video: Video<P>) -> Result<Video<P>>
    where
        P: Pixel + Send + Sync,
        P::Subpixel: Send + Sync,
    {
        let frame_rate = video.frame_rate;
        let carved = self.carve(video.frames)?;
        Ok(Video {
            frames: carved.frames,
            frame_rate,
        })
    }

    /// Carve width first, then height.  A target at or above the
    /// current size leaves that dimension alone.
    pub fn carve<P>(&self, frames: Vec<Frame<P>>) -> Result<Carved<P>>
    where
        P: Pixel + Send + Sync,
        P::Subpixel: Send + Sync,
    {
        let (width, height) = check_sequence(&frames)?;
        log::info!(
            "carving {} frames from {}x{} to {}x{}",
            frames.len(),
            width,
            height,
            self.config.target_width.min(width),
            self.config.target_height.min(height)
        );
        let (frames, width_passes) = self.reduce(frames, Carve::Width)?;
        let (frames, height_passes) = self.reduce(frames, Carve::Height)?;
        Ok(Carved {
            frames,
            width_passes,
            height_passes,
        })
    }

    fn reduce<P>(&self, frames: Vec<Frame<P>>, direction: Carve) -> Result<(Vec<Frame<P>>, u32)>
    where
        P: Pixel + Send + Sync,
        P::Subpixel: Send + Sync,
    {
        match direction {
            Carve::Width => self.reduce_width(frames, self.config.target_width),
            Carve::Height => {
                let (_, height) = check_sequence(&frames)?;
                if self.config.target_height >= height {
                    return Ok((frames, 0));
                }
                let flipped = frames.iter().map(|f| transpose(f)).collect();
                let (carved, passes) = self.reduce_width(flipped, self.config.target_height)?;
                Ok((carved.iter().map(|f| transpose(f)).collect(), passes))
            }
        }
    }

    /// Run single-seam passes until every frame is `target` columns
    /// wide, and report how many passes that took.
    pub fn reduce_width<P>(&self, frames: Vec<Frame<P>>, target: u32) -> Result<(Vec<Frame<P>>, u32)>
    where
        P: Pixel + Send + Sync,
        P::Subpixel: Send + Sync,
    {
        let (width, _) = check_sequence(&frames)?;
        if target >= width {
            return Ok((frames, 0));
        }

        let passes = width - target;
        log::info!("removing {} seams ({} -> {} columns)", passes, width, target);
        let mut frames = frames;
        for pass in 0..passes {
            log::info!("removing seam {}/{}", pass + 1, passes);
            frames = self.run_pass(frames)?;
        }
        log::info!("seam removal complete");
        Ok((frames, passes))
    }

    // One pass: every group loses one seam.  Groups go onto a shared
    // queue; results come back tagged with their group index and are
    // reassembled by that index, so completion order never matters.
    // The first failure stops the workers from taking new groups and
    // the whole pass is discarded.
    fn run_pass<P>(&self, frames: Vec<Frame<P>>) -> Result<Vec<Frame<P>>>
    where
        P: Pixel + Send + Sync,
        P::Subpixel: Send + Sync,
    {
        self.run_groups(frames, |group| carve_group(&self.finder, group))
    }

    fn run_groups<P, F>(&self, frames: Vec<Frame<P>>, task: F) -> Result<Vec<Frame<P>>>
    where
        P: Pixel + Send + Sync,
        P::Subpixel: Send + Sync,
        F: Fn(&[Frame<P>]) -> Result<Vec<Frame<P>>> + Sync,
    {
        let frame_count = frames.len();
        let groups = partition(frames, self.config.group_size);
        let group_count = groups.len();
        let workers = self.config.workers.min(group_count);

        let queue = Injector::new();
        groups.into_iter().enumerate().for_each(|task| queue.push(task));
        let abort = AtomicBool::new(false);
        let (sender, receiver) = channel::unbounded();

        crossbeam::scope(|scope| {
            for _ in 0..workers {
                let (queue, abort, task, sender) = (&queue, &abort, &task, sender.clone());
                scope.spawn(move |_| {
                    let _guard = AbortOnPanic(abort);
                    while !abort.load(Ordering::Acquire) {
                        let (index, group) = match queue.steal() {
                            Steal::Success(task) => task,
                            Steal::Empty => break,
                            Steal::Retry => continue,
                        };
                        let result = task(&group);
                        if result.is_err() {
                            abort.store(true, Ordering::Release);
                        }
                        if sender.send((index, result)).is_err() {
                            break;
                        }
                    }
                });
            }
        })
        .map_err(|_| CarveError::ComputeFailure("a frame group worker panicked".to_string()))?;
        drop(sender);

        let mut slots: Vec<Option<Vec<Frame<P>>>> = (0..group_count).map(|_| None).collect();
        for (index, result) in receiver {
            slots[index] = Some(result?);
        }

        slots
            .into_iter()
            .enumerate()
            .try_fold(Vec::with_capacity(frame_count), |mut acc, (index, slot)| match slot {
                Some(group) => {
                    acc.extend(group);
                    Ok(acc)
                }
                None => Err(CarveError::ComputeFailure(format!(
                    "frame group {} was never carved",
                    index
                ))),
            })
    }
}

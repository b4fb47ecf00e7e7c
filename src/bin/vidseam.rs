// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use clap::Parser;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use vidseam::{CarveConfig, Carver, Video, DEFAULT_GROUP_SIZE};

/// Seam carving for frame sequences
#[derive(Parser, Debug)]
#[command(name = "vidseam", version, about)]
struct Args {
    /// The frames to carve, in playback order
    #[arg(required = true)]
    frames: Vec<PathBuf>,

    /// Directory the carved frames are written to
    #[arg(short, long)]
    output_dir: PathBuf,

    /// Target width in pixels
    #[arg(long)]
    width: u32,

    /// Target height in pixels
    #[arg(long)]
    height: u32,

    /// Frame groups carved concurrently
    #[arg(short, long, default_value_t = num_cpus::get())]
    workers: usize,

    /// Consecutive frames sharing one seam per pass
    #[arg(short, long, default_value_t = DEFAULT_GROUP_SIZE)]
    group_size: usize,

    /// Threads sharing each row of a seam search
    #[arg(long, default_value_t = 1)]
    column_workers: usize,

    /// Playback rate carried through to the output
    #[arg(long, default_value_t = 30.0)]
    fps: f64,
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let frames = args
        .frames
        .iter()
        .map(|path| image::open(path).map(|img| img.to_rgb8()))
        .collect::<Result<Vec<_>, image::ImageError>>()?;

    let config = CarveConfig::new(args.width, args.height)
        .set_workers(args.workers)
        .set_group_size(args.group_size)
        .set_column_workers(args.column_workers);
    let carver = Carver::new(config)?;
    log::info!(
        "{} frames, {} workers, groups of {}",
        frames.len(),
        carver.config().workers,
        carver.config().group_size
    );
    let video = carver.carve_video(Video {
        frames,
        frame_rate: args.fps,
    })?;

    fs::create_dir_all(&args.output_dir)?;
    for (i, frame) in video.frames.iter().enumerate() {
        frame.save(args.output_dir.join(format!("frame_{:05}.png", i)))?;
    }

    let (width, height) = video.frames.first().map(|f| f.dimensions()).unwrap_or((0, 0));
    println!(
        "{} frames, {}x{}, {} fps",
        video.frames.len(),
        width,
        height,
        video.frame_rate
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("vidseam: {}", err);
            ExitCode::FAILURE
        }
    }
}

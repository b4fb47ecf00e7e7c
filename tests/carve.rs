use image::{ImageBuffer, Rgb, RgbImage};
use vidseam::{
    remove_vertical_seam, spatial_energy, CarveConfig, CarveError, Carver, SeamFinder, TwoDimensionalMap, Video,
};

// A bright vertical bar on a dark field, drifting right one column
// every few frames.
fn bar_frame(width: u32, height: u32, bar: u32) -> RgbImage {
    ImageBuffer::from_fn(width, height, |x, y| {
        if x == bar || x == bar + 1 {
            Rgb([250, 250, 250])
        } else {
            Rgb([((x + y) % 7) as u8, 10, 20])
        }
    })
}

#[test]
fn bar_survives_width_reduction() {
    let frames: Vec<RgbImage> = (0..12).map(|i| bar_frame(20, 10, 8 + i / 4)).collect();
    let carver = Carver::new(CarveConfig::new(14, 10).set_workers(4)).unwrap();
    let video = carver
        .carve_video(Video {
            frames,
            frame_rate: 25.0,
        })
        .unwrap();

    assert_eq!(video.frame_rate, 25.0);
    assert_eq!(video.frames.len(), 12);
    for frame in video.frames.iter() {
        assert_eq!(frame.dimensions(), (14, 10));
        // Every row still holds both bright bar pixels.
        for y in 0..10 {
            let bright = (0..14)
                .filter(|x| *frame.get_pixel(*x, y) == Rgb([250, 250, 250]))
                .count();
            assert_eq!(bright, 2);
        }
    }
}

#[test]
fn carving_both_dimensions_counts_passes() {
    let frames: Vec<RgbImage> = (0..5).map(|i| bar_frame(16, 12, 3 + i)).collect();
    let carver = Carver::new(CarveConfig::new(13, 8).set_group_size(2)).unwrap();
    let carved = carver.carve(frames).unwrap();
    assert_eq!(carved.width_passes, 3);
    assert_eq!(carved.height_passes, 4);
    assert!(carved.frames.iter().all(|f| f.dimensions() == (13, 8)));
}

#[test]
fn seams_found_on_real_frames_are_connected() {
    let finder = SeamFinder::new(2, 4);
    let mut frame = bar_frame(24, 18, 5);
    for _ in 0..6 {
        let seam = finder.find_vertical_seam(&spatial_energy(&frame)).unwrap();
        assert_eq!(seam.len(), frame.height() as usize);
        assert!(seam.is_connected());
        assert!(seam.columns().iter().all(|x| *x < frame.width()));
        frame = remove_vertical_seam(&frame, &seam).unwrap();
    }
    assert_eq!(frame.dimensions(), (18, 18));
}

#[test]
fn zero_sized_energy_map_is_invalid_input() {
    let empty: TwoDimensionalMap<f32> = TwoDimensionalMap::new(0, 0, 0.0);
    assert!(matches!(
        SeamFinder::default().find_vertical_seam(&empty),
        Err(CarveError::InvalidInput(_))
    ));
}

#[test]
fn invalid_configuration_is_rejected_up_front() {
    assert!(matches!(
        Carver::new(CarveConfig::new(10, 10).set_workers(0)),
        Err(CarveError::InvalidInput(_))
    ));
}

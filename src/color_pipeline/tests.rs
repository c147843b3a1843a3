use std::io::Cursor;
use std::io::Write;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::color_pipeline::{
    BalanceFactors, CaptureError, ColorPipeline, Frame, FrameSource, OpenError, PipelineConfig,
    PipelineError, PwmColor, RgbRatio, RgbSample, SampleRegion, SnapshotCompression,
    SnapshotWriter, TiffSequenceSource, TiffSnapshotWriter, average_of_region, balance, process,
    save_snapshot, scale_to_pwm,
};

struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
        Err(std::io::Error::other("disk full"))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn centered_frame(height: usize, width: usize, bgr: [u8; 3]) -> Frame {
    let mut frame = Frame::filled(height, width, [0, 0, 0]).unwrap();
    let (rows, cols) = SampleRegion::default().pixel_bounds(height, width);
    for row in rows {
        for col in cols.clone() {
            frame.set_pixel(row, col, &bgr);
        }
    }
    frame
}

#[test]
fn test_config_builder() {
    let region = SampleRegion::new(0.1, 0.9, 0.2, 0.8).unwrap();
    let config = PipelineConfig::builder()
        .region(region)
        .balance(0.5, 1.0, 0.75)
        .pwm_max(255.0)
        .build()
        .unwrap();

    assert_eq!(config.region, region);
    assert_eq!(config.balance, BalanceFactors::new(0.5, 1.0, 0.75).unwrap());
    assert_eq!(config.pwm_max, 255.0);
}

#[test]
fn test_config_builder_defaults() {
    let config = PipelineConfig::builder().build().unwrap();

    assert_eq!(config, PipelineConfig::default());
    assert_eq!(config.pwm_max, 100.0);
    assert!(config.balance.is_identity());
}

#[test]
fn test_config_builder_rejects_bad_values() {
    assert!(matches!(
        PipelineConfig::builder().balance(1.0, 2.0, 1.0).build(),
        Err(PipelineError::InvalidBalance { channel: "green", .. })
    ));
    assert!(matches!(
        PipelineConfig::builder().pwm_max(0.0).build(),
        Err(PipelineError::InvalidPwmMax(_))
    ));
    let inverted = SampleRegion {
        v_start: 0.8,
        v_end: 0.2,
        ..SampleRegion::default()
    };
    assert!(matches!(
        PipelineConfig::builder().region(inverted).build(),
        Err(PipelineError::InvalidRegion { .. })
    ));
}

#[test]
fn test_pipeline_rejects_invalid_config() {
    let config = PipelineConfig {
        pwm_max: -1.0,
        ..PipelineConfig::default()
    };
    assert!(ColorPipeline::new(config).is_err());
}

#[test]
fn test_end_to_end_4x4_frame() {
    let frame = centered_frame(4, 4, [100, 150, 200]);

    let sample = average_of_region(&frame, &SampleRegion::default()).unwrap();
    let pipeline = ColorPipeline::new(PipelineConfig::default()).unwrap();
    let color = pipeline.process(&frame).unwrap();

    assert_eq!(sample, RgbSample::new(200, 150, 100));
    // Widened to {101, 51, 1}
    assert_eq!(color.r, 100.0);
    assert!((color.g - 5100.0 / 101.0).abs() < 1e-9);
    assert!((color.b - 100.0 / 101.0).abs() < 1e-9);
}

#[test]
fn test_pipeline_matches_stage_composition() {
    let frame = centered_frame(120, 160, [12, 90, 210]);
    let config = PipelineConfig::builder()
        .balance(0.9, 0.6, 1.0)
        .pwm_max(255.0)
        .build()
        .unwrap();

    let expected = scale_to_pwm(
        balance(
            average_of_region(&frame, &config.region).unwrap(),
            &config.balance,
        ),
        config.pwm_max,
    )
    .unwrap();
    let composed = process(&frame, &config.region, &config.balance, config.pwm_max).unwrap();
    let pipelined = ColorPipeline::new(config).unwrap().process(&frame).unwrap();

    assert_eq!(composed, expected);
    assert_eq!(pipelined, expected);
}

#[test]
fn test_pipeline_propagates_sampler_error() {
    let frame = Frame::new(4, 4, 1, vec![0u8; 16]).unwrap();
    let pipeline = ColorPipeline::new(PipelineConfig::default()).unwrap();

    let result = pipeline.process(&frame);

    assert!(matches!(
        result,
        Err(PipelineError::UnsupportedFormat { channels: 1 })
    ));
}

#[test]
fn test_process_propagates_degenerate_color() {
    let frame = centered_frame(4, 4, [1, 2, 3]);

    let result = process(&frame, &SampleRegion::default(), &BalanceFactors::default(), 0.0);

    assert!(matches!(result, Err(PipelineError::DegenerateColor { .. })));
}

#[test]
fn test_gray_frames_saturate_every_channel() {
    let pipeline = ColorPipeline::new(PipelineConfig::default()).unwrap();
    for level in [0u8, 17, 128, 255] {
        let frame = Frame::filled(12, 16, [level, level, level]).unwrap();
        assert_eq!(pipeline.process(&frame).unwrap(), PwmColor::uniform(100.0));
    }
}

#[test]
fn test_snapshot_writer_failure() {
    let frame = Frame::filled(2, 2, [1, 2, 3]).unwrap();

    let result = TiffSnapshotWriter::default().write_snapshot(&frame, &mut FailingWriter);

    assert!(matches!(result, Err(PipelineError::IoError(_))));
}

#[test]
fn test_snapshot_rejects_non_bgr_frame() {
    let frame = Frame::new(2, 2, 1, vec![0u8; 4]).unwrap();
    let mut output = Cursor::new(Vec::new());

    let result = TiffSnapshotWriter::default().write_snapshot(&frame, &mut output);

    assert!(matches!(
        result,
        Err(PipelineError::UnsupportedFormat { channels: 1 })
    ));
}

#[test]
fn test_snapshot_replays_through_tiff_source() {
    let dir = tempfile::tempdir().unwrap();
    let mut frame = Frame::filled(6, 8, [10, 20, 30]).unwrap();
    frame.set_pixel(5, 7, &[200, 100, 50]);

    save_snapshot(
        &TiffSnapshotWriter::new(SnapshotCompression::Lzw),
        &frame,
        dir.path().join("snapshot.tiff"),
    )
    .unwrap();

    let mut source = TiffSequenceSource::open(dir.path()).unwrap();
    let replayed = source.capture().unwrap();

    assert_eq!(replayed, frame);
}

#[test]
fn test_tiff_source_loops_in_name_order() {
    let dir = tempfile::tempdir().unwrap();
    let writer = TiffSnapshotWriter::default();
    save_snapshot(&writer, &Frame::filled(2, 2, [2, 2, 2]).unwrap(), dir.path().join("b.tif")).unwrap();
    save_snapshot(&writer, &Frame::filled(2, 2, [1, 1, 1]).unwrap(), dir.path().join("a.tif")).unwrap();
    std::fs::write(dir.path().join("notes.txt"), "not a frame").unwrap();

    let mut source = TiffSequenceSource::open(dir.path()).unwrap();

    assert_eq!(source.files().len(), 2);
    assert_eq!(source.capture().unwrap().pixel(0, 0), &[1, 1, 1]);
    assert_eq!(source.capture().unwrap().pixel(0, 0), &[2, 2, 2]);
    assert_eq!(source.capture().unwrap().pixel(0, 0), &[1, 1, 1]);
}

#[test]
fn test_tiff_source_open_failures() {
    let dir = tempfile::tempdir().unwrap();

    assert!(matches!(
        TiffSequenceSource::open(dir.path()),
        Err(OpenError::NoFrames(_))
    ));
    assert!(matches!(
        TiffSequenceSource::open(dir.path().join("missing")),
        Err(OpenError::IoError { .. })
    ));
}

#[test]
fn test_tiff_source_corrupt_file_is_capture_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.tiff");
    std::fs::write(&path, b"definitely not a tiff").unwrap();

    let mut source = TiffSequenceSource::open(&path).unwrap();

    assert!(matches!(source.capture(), Err(CaptureError::Decode { .. })));
}

fn random_frame(rng: &mut StdRng, height: usize, width: usize) -> Frame {
    let data = (0..height * width * 3).map(|_| rng.r#gen::<u8>()).collect();
    Frame::new(height, width, 3, data).unwrap()
}

fn random_region(rng: &mut StdRng) -> SampleRegion {
    let v_start = rng.gen_range(0.0..0.99);
    let v_end = rng.gen_range(v_start + 0.01..=1.0);
    let h_start = rng.gen_range(0.0..0.99);
    let h_end = rng.gen_range(h_start + 0.01..=1.0);
    SampleRegion::new(v_start, v_end, h_start, h_end).unwrap()
}

/// Average over the region's pixel bounds, one pixel at a time.
fn average_pixel_by_pixel(frame: &Frame, region: &SampleRegion) -> Option<RgbSample> {
    let (rows, cols) = region.pixel_bounds(frame.height(), frame.width());
    let (mut r, mut g, mut b, mut count) = (0u64, 0u64, 0u64, 0u64);
    for row in rows {
        for col in cols.clone() {
            let pixel = frame.pixel(row, col);
            b += u64::from(pixel[0]);
            g += u64::from(pixel[1]);
            r += u64::from(pixel[2]);
            count += 1;
        }
    }
    (count > 0).then(|| RgbSample::new(r / count, g / count, b / count))
}

#[test]
fn test_randomized_pipeline_properties() {
    let mut rng = StdRng::seed_from_u64(0x1ed_ca11);
    let mut processed = 0;

    for _ in 0..2_000 {
        let height = rng.gen_range(1..=64);
        let width = rng.gen_range(1..=64);
        let frame = random_frame(&mut rng, height, width);
        let region = random_region(&mut rng);
        let factors = BalanceFactors::new(
            rng.gen_range(0.0..=1.0),
            rng.gen_range(0.0..=1.0),
            rng.gen_range(0.0..=1.0),
        )
        .unwrap();
        let pwm_max = rng.gen_range(0.001..1_000.0);

        let expected = average_pixel_by_pixel(&frame, &region);
        match average_of_region(&frame, &region) {
            Ok(sample) => {
                assert_eq!(Some(sample), expected, "{region:?} on {height}x{width}");
                assert!(sample.r <= 255 && sample.g <= 255 && sample.b <= 255);
            }
            Err(PipelineError::EmptySampleArea { .. }) => assert_eq!(expected, None),
            Err(e) => panic!("unexpected sampling error: {e}"),
        }

        match process(&frame, &region, &factors, pwm_max) {
            Ok(color) => {
                for channel in [color.r, color.g, color.b] {
                    assert!(
                        (0.0..=pwm_max).contains(&channel),
                        "{color:?} outside [0, {pwm_max}]"
                    );
                }
                assert_eq!(color.max_channel(), pwm_max);
                processed += 1;
            }
            Err(PipelineError::EmptySampleArea { .. }) => assert_eq!(expected, None),
            Err(e) => panic!("unexpected pipeline error: {e}"),
        }
    }

    assert!(processed > 1_000, "only {processed} frames produced a color");
}

#[test]
fn test_randomized_border_is_never_sampled() {
    let mut rng = StdRng::seed_from_u64(0xb0_4d3e);

    for _ in 0..500 {
        let height = rng.gen_range(4..=64);
        let width = rng.gen_range(4..=64);
        let mut frame = random_frame(&mut rng, height, width);
        let region = random_region(&mut rng);
        let center: [u8; 3] = rng.r#gen();

        let (rows, cols) = region.pixel_bounds(height, width);
        if rows.is_empty() || cols.is_empty() {
            continue;
        }
        for row in rows {
            for col in cols.clone() {
                frame.set_pixel(row, col, &center);
            }
        }

        let sample = average_of_region(&frame, &region).unwrap();

        assert_eq!(
            sample,
            RgbSample::new(center[2].into(), center[1].into(), center[0].into()),
            "{region:?} on {height}x{width}"
        );
    }
}

#[test]
fn test_randomized_scaling_stays_in_range() {
    let mut rng = StdRng::seed_from_u64(0x5ca1e);

    for _ in 0..10_000 {
        let mut channel = || match rng.gen_range(0..4) {
            0 => 0.0,
            1 => rng.gen_range(0.0..1.0),
            2 => rng.gen_range(0.0..=255.0),
            _ => rng.gen_range(0.0..1e9),
        };
        let ratio = RgbRatio::new(channel(), channel(), channel());
        let pwm_max = rng.gen_range(0.001..10_000.0);

        let color = scale_to_pwm(ratio, pwm_max).unwrap();

        for value in [color.r, color.g, color.b] {
            assert!((0.0..=pwm_max).contains(&value), "{ratio:?} scaled to {color:?}");
        }
        assert_eq!(color.max_channel(), pwm_max);
    }
}

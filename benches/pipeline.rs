use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use ledcam_rs::color_pipeline::{
    ColorPipeline, Frame, PipelineConfig, SampleRegion, SnapshotCompression, SnapshotWriter,
    TiffSnapshotWriter,
};

fn generate_gradient_frame(width: usize, height: usize) -> Frame {
    let mut data = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            data.push((x % 256) as u8);
            data.push((y % 256) as u8);
            data.push(((x + y) % 256) as u8);
        }
    }
    Frame::new(height, width, 3, data).unwrap()
}

fn benchmark_process_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_by_size");

    let sizes = vec![(160, 120, "160x120"), (352, 288, "352x288")];

    for (width, height, label) in sizes {
        let frame = generate_gradient_frame(width, height);
        let pipeline = ColorPipeline::new(PipelineConfig::default()).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(label), &frame, |b, frame| {
            b.iter(|| pipeline.process(black_box(frame)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_region_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("region_size");
    let frame = generate_gradient_frame(352, 288);

    let regions = vec![
        (SampleRegion::new(0.45, 0.55, 0.45, 0.55).unwrap(), "center_tenth"),
        (SampleRegion::default(), "center_half"),
        (SampleRegion::new(0.0, 1.0, 0.0, 1.0).unwrap(), "full_frame"),
    ];

    for (region, label) in regions {
        let config = PipelineConfig::builder()
            .region(region)
            .balance(0.9, 0.8, 1.0)
            .build()
            .unwrap();
        let pipeline = ColorPipeline::new(config).unwrap();

        group.bench_function(label, |b| {
            b.iter(|| pipeline.process(black_box(&frame)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_snapshot_compression(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot_compression");
    let frame = generate_gradient_frame(160, 120);

    let compressions = vec![
        (SnapshotCompression::None, "none"),
        (SnapshotCompression::Lzw, "lzw"),
        (SnapshotCompression::Deflate, "deflate"),
    ];

    for (compression, label) in compressions {
        let writer = TiffSnapshotWriter::new(compression);

        group.bench_with_input(BenchmarkId::from_parameter(label), &frame, |b, frame| {
            b.iter(|| {
                let mut output = Vec::new();
                writer.write_snapshot(black_box(frame), &mut output).unwrap();
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_process_sizes,
    benchmark_region_size,
    benchmark_snapshot_compression
);
criterion_main!(benches);

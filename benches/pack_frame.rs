use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use lcd_stream_rs::frame_stream::{
    CaptureSource, Frame, FrameSampler, PackedBuffer, QuantizedPreview, TestPatternSource,
    pack_frame,
};

fn generate_gradient_frame(width: usize, height: usize) -> Frame {
    let mut frame = Frame::new(width, height).expect("valid dimensions");
    for (i, px) in frame.as_bytes_mut().chunks_exact_mut(4).enumerate() {
        let (x, y) = (i % width, i / width);
        px.copy_from_slice(&[(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 0xFF]);
    }
    frame
}

fn benchmark_pack_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("pack_frame_by_size");

    let sizes = vec![(160, 128, "160x128"), (320, 240, "320x240"), (640, 480, "640x480")];

    for (width, height, label) in sizes {
        let frame = generate_gradient_frame(width, height);
        let mut packed = PackedBuffer::new(width, height).expect("valid dimensions");
        let mut preview = QuantizedPreview::new(width, height).expect("valid dimensions");

        group.bench_with_input(BenchmarkId::from_parameter(label), &frame, |b, frame| {
            b.iter(|| {
                pack_frame(black_box(frame), &mut packed, &mut preview).expect("same shape");
            });
        });
    }

    group.finish();
}

fn benchmark_sample_and_pack(c: &mut Criterion) {
    let mut source = TestPatternSource::new(640, 480);
    source.control().play();
    let mut sampler = FrameSampler::new(160, 128);
    let mut frame = Frame::new(160, 128).expect("valid dimensions");
    let mut packed = PackedBuffer::new(160, 128).expect("valid dimensions");
    let mut preview = QuantizedPreview::new(160, 128).expect("valid dimensions");

    c.bench_function("sample_640x480_and_pack", |b| {
        b.iter(|| {
            sampler.sample(&mut source, &mut frame).expect("pattern available");
            pack_frame(&frame, &mut packed, &mut preview).expect("same shape");
        });
    });

    assert!(source.is_active());
}

criterion_group!(benches, benchmark_pack_sizes, benchmark_sample_and_pack);
criterion_main!(benches);

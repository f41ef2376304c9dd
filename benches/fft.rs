//! Benchmarks the windowed FFT magnitude step in isolation from the rest
//! of the fingerprinting pipeline.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use chromaflow_audio::dsp::fft::FrameFft;
use chromaflow_audio::dsp::window::hann;

fn bench_magnitudes(c: &mut Criterion) {
    let frame_size = 4096;
    let window = hann(frame_size);
    let samples: Vec<f32> = (0..frame_size)
        .map(|n| (n as f32 * 0.01).sin())
        .collect();
    let mut fft = FrameFft::new(frame_size);
    let mut out = vec![0.0f32; fft.num_bins()];

    c.bench_function("frame_fft_magnitudes_4096", |b| {
        b.iter(|| {
            fft.magnitudes(black_box(&samples), black_box(&window), &mut out);
            black_box(&out);
        })
    });
}

criterion_group!(benches, bench_magnitudes);
criterion_main!(benches);

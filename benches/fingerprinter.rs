//! End-to-end fingerprinting throughput over a realistic clip length.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use chromaflow_audio::config::INTERNAL_SAMPLE_RATE;
use chromaflow_audio::{Algorithm, Fingerprinter};

fn ten_seconds_of_tone() -> Vec<i16> {
    let sr = INTERNAL_SAMPLE_RATE as f32;
    (0..(INTERNAL_SAMPLE_RATE as usize * 10))
        .map(|n| {
            let t = n as f32 / sr;
            (8000.0 * (2.0 * std::f32::consts::PI * 440.0 * t).sin()) as i16
        })
        .collect()
}

fn bench_fingerprint_ten_seconds(c: &mut Criterion) {
    let samples = ten_seconds_of_tone();
    c.bench_function("fingerprint_10s_algorithm1", |b| {
        b.iter(|| {
            let mut fp = Fingerprinter::new(Algorithm::Algorithm1);
            fp.start(INTERNAL_SAMPLE_RATE, 1).unwrap();
            fp.feed(black_box(&samples)).unwrap();
            fp.finish().unwrap();
            black_box(fp.fingerprint());
        })
    });
}

criterion_group!(benches, bench_fingerprint_ten_seconds);
criterion_main!(benches);

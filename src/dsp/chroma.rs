//! Chroma (pitch-class) folding.
//!
//! Maps linear FFT bins to the 12 pitch classes via a precomputed per-bin
//! `(class, weight)` table, splitting each bin's mass linearly between its
//! two neighboring classes. The table is built once per
//! `(sample_rate, frame_size, min_freq, max_freq)` combination and then
//! applied to every incoming frame.

pub const NUM_CLASSES: usize = 12;

#[derive(Debug, Clone, Copy)]
struct BinWeight {
    bin: usize,
    class: usize,
    weight: f32,
}

/// Precomputed bin -> pitch-class folding table for one `(sample_rate,
/// frame_size, min_freq, max_freq)` combination.
pub struct ChromaFilter {
    weights: Vec<BinWeight>,
}

impl ChromaFilter {
    pub fn new(sample_rate: u32, frame_size: usize, min_freq: f32, max_freq: f32) -> Self {
        let num_bins = frame_size / 2 + 1;
        let mut weights = Vec::new();

        for bin in 0..num_bins {
            let freq = bin as f32 * sample_rate as f32 / frame_size as f32;
            if freq < min_freq || freq > max_freq || freq <= 0.0 {
                continue;
            }
            let pitch = 12.0 * (freq / 440.0).log2() + 69.0;
            let pitch_class = pitch.rem_euclid(12.0);
            let lower = pitch_class.floor();
            let frac = pitch_class - lower;
            let lower_class = (lower as i64).rem_euclid(12) as usize;
            let upper_class = (lower_class + 1) % NUM_CLASSES;

            if frac < 1e-6 {
                weights.push(BinWeight {
                    bin,
                    class: lower_class,
                    weight: 1.0,
                });
            } else {
                weights.push(BinWeight {
                    bin,
                    class: lower_class,
                    weight: 1.0 - frac,
                });
                weights.push(BinWeight {
                    bin,
                    class: upper_class,
                    weight: frac,
                });
            }
        }

        Self { weights }
    }

    /// Folds a magnitude spectrum into a 12-bin chroma vector.
    pub fn fold(&self, magnitudes: &[f32]) -> [f32; NUM_CLASSES] {
        let mut chroma = [0.0f32; NUM_CLASSES];
        for bw in &self.weights {
            chroma[bw.class] += magnitudes[bw.bin] * bw.weight;
        }
        chroma
    }
}

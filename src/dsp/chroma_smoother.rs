//! Gaussian smoothing of the chroma-vector stream across the time axis.
//!
//! The kernel is short and the stream is per-pitch-class and incremental,
//! so this uses a direct sliding-window convolution rather than an
//! FFT-based one — simpler, and it avoids adding a second FFT plan to the
//! hot path. Edges are padded with copies of the first/last vector rather
//! than zeros, so a smoothed value near the start or end of a stream
//! isn't biased toward silence.

use std::collections::VecDeque;

use crate::dsp::chroma::NUM_CLASSES;

fn gaussian_kernel(len: usize) -> Vec<f32> {
    debug_assert!(len % 2 == 1, "smoothing kernel length must be odd");
    let center = (len / 2) as f32;
    let sigma = (len as f32 / 6.0).max(0.5);
    let mut kernel: Vec<f32> = (0..len)
        .map(|i| {
            let x = i as f32 - center;
            (-0.5 * (x / sigma).powi(2)).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    for k in &mut kernel {
        *k /= sum;
    }
    kernel
}

/// Streaming Gaussian smoother over a sequence of 12-dim chroma vectors.
pub struct ChromaSmoother {
    kernel: Vec<f32>,
    half: usize,
    buffer: VecDeque<[f32; NUM_CLASSES]>,
    started: bool,
}

impl ChromaSmoother {
    /// `length` is the kernel width; it is rounded up to the next odd
    /// number if even.
    pub fn new(length: usize) -> Self {
        let length = if length % 2 == 0 { length + 1 } else { length };
        Self {
            kernel: gaussian_kernel(length),
            half: length / 2,
            buffer: VecDeque::with_capacity(length + 1),
            started: false,
        }
    }

    fn convolve_window(&self) -> [f32; NUM_CLASSES] {
        let mut out = [0.0f32; NUM_CLASSES];
        for (frame, &w) in self.buffer.iter().zip(self.kernel.iter()) {
            for c in 0..NUM_CLASSES {
                out[c] += frame[c] * w;
            }
        }
        out
    }

    fn try_emit(&mut self) -> Option<[f32; NUM_CLASSES]> {
        if self.buffer.len() >= self.kernel.len() {
            let out = self.convolve_window();
            self.buffer.pop_front();
            Some(out)
        } else {
            None
        }
    }

    /// Feeds one chroma vector; returns a smoothed vector once enough
    /// history (including the initial edge-replicated padding) has
    /// accumulated.
    pub fn push(&mut self, vector: [f32; NUM_CLASSES]) -> Option<[f32; NUM_CLASSES]> {
        if !self.started {
            self.started = true;
            for _ in 0..self.half {
                self.buffer.push_back(vector);
            }
        }
        self.buffer.push_back(vector);
        self.try_emit()
    }

    /// Flushes the tail of the stream, replicating the last seen vector to
    /// fill out the kernel's look-ahead. Returns the remaining smoothed
    /// vectors, in order.
    pub fn finish(&mut self) -> Vec<[f32; NUM_CLASSES]> {
        let mut out = Vec::with_capacity(self.half);
        let Some(&last) = self.buffer.back() else {
            return out;
        };
        for _ in 0..self.half {
            self.buffer.push_back(last);
            if let Some(v) = self.try_emit() {
                out.push(v);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_stream_is_unchanged() {
        let mut smoother = ChromaSmoother::new(5);
        let v = [1.0; NUM_CLASSES];
        let mut outputs = Vec::new();
        for _ in 0..10 {
            if let Some(o) = smoother.push(v) {
                outputs.push(o);
            }
        }
        outputs.extend(smoother.finish());
        assert_eq!(outputs.len(), 10);
        for o in outputs {
            for c in o {
                assert!((c - 1.0).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn output_count_matches_input_count() {
        for t in [1usize, 2, 3, 10, 37] {
            let mut smoother = ChromaSmoother::new(9);
            let mut outputs = Vec::new();
            for i in 0..t {
                let mut v = [0.0; NUM_CLASSES];
                v[0] = i as f32;
                if let Some(o) = smoother.push(v) {
                    outputs.push(o);
                }
            }
            outputs.extend(smoother.finish());
            assert_eq!(outputs.len(), t, "mismatch for t={t}");
        }
    }

    #[test]
    fn smooths_an_impulse() {
        let mut smoother = ChromaSmoother::new(5);
        let mut outputs = Vec::new();
        for i in 0..9 {
            let mut v = [0.0; NUM_CLASSES];
            if i == 4 {
                v[0] = 1.0;
            }
            if let Some(o) = smoother.push(v) {
                outputs.push(o);
            }
        }
        outputs.extend(smoother.finish());
        // The impulse's mass should spread to neighboring frames.
        assert!(outputs[4][0] > 0.0);
        assert!(outputs[3][0] > 0.0);
        assert!(outputs[5][0] > 0.0);
        assert!(outputs[4][0] < 1.0);
    }
}

//! Real-input forward FFT over one windowed frame, producing magnitudes.
//!
//! Plans a `rustfft` forward transform once and reuses it across windows;
//! the planner and a reusable scratch buffer are owned by [`FrameFft`]
//! and invoked once per hop, since the fingerprinter is a streaming
//! pipeline rather than a whole-file batch pass.

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Computes magnitude spectra for windowed frames of a fixed `frame_size`.
pub struct FrameFft {
    frame_size: usize,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl FrameFft {
    pub fn new(frame_size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(frame_size);
        Self {
            frame_size,
            fft,
            scratch: vec![Complex::new(0., 0.); frame_size],
        }
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Number of magnitude bins produced per call: `frame_size/2 + 1`.
    pub fn num_bins(&self) -> usize {
        self.frame_size / 2 + 1
    }

    /// Applies `window` to `samples` (both of length `frame_size`), runs the
    /// forward FFT, and writes `num_bins()` magnitudes into `out`.
    ///
    /// `out` must have length `num_bins()`.
    pub fn magnitudes(&mut self, samples: &[f32], window: &[f32], out: &mut [f32]) {
        debug_assert_eq!(samples.len(), self.frame_size);
        debug_assert_eq!(window.len(), self.frame_size);
        debug_assert_eq!(out.len(), self.num_bins());

        for (dst, (&s, &w)) in self.scratch.iter_mut().zip(samples.iter().zip(window)) {
            *dst = Complex::new(s * w, 0.);
        }
        self.fft.process(&mut self.scratch);

        for (bin, dst) in self.scratch[..self.num_bins()].iter().zip(out.iter_mut()) {
            *dst = (bin.re * bin.re + bin.im * bin.im).sqrt();
        }
    }
}

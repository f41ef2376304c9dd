//! Hann-like analysis window, precomputed once per [`crate::config::AlgorithmConfig`].

use std::f32::consts::PI;

/// Periodic Hann window of length `frame_size`: `0.5 - 0.5*cos(2*pi*n/N)`.
/// Computed once per [`crate::config::AlgorithmConfig`] and shared across
/// every frame rather than rebuilt each time.
pub fn hann(frame_size: usize) -> Vec<f32> {
    (0..frame_size)
        .map(|n| 0.5 - 0.5 * f32::cos(2. * n as f32 * PI / frame_size as f32))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_near_zero() {
        let w = hann(4096);
        assert!(w[0] < 1e-6);
        assert!(w[w.len() - 1] < 1e-2);
    }

    #[test]
    fn peaks_at_center() {
        let w = hann(4096);
        let center = w[2048];
        assert!(center > 0.99);
    }

    #[test]
    fn length_matches_request() {
        assert_eq!(hann(1024).len(), 1024);
    }
}

//! Causal moving average over a fixed-length ring buffer.
//!
//! Used by the matcher to smooth per-item bit error before it decides
//! where matching segments start and stop, and generally useful wherever
//! a bounded causal smoother is needed.

use std::collections::VecDeque;

pub struct MovingAverage {
    capacity: usize,
    window: VecDeque<f64>,
    sum: f64,
}

impl MovingAverage {
    pub fn new(length: usize) -> Self {
        Self {
            capacity: length.max(1),
            window: VecDeque::with_capacity(length.max(1)),
            sum: 0.0,
        }
    }

    /// Pushes one value and returns the current average over the last
    /// `min(n_pushed, length)` values.
    pub fn push(&mut self, value: f64) -> f64 {
        self.window.push_back(value);
        self.sum += value;
        if self.window.len() > self.capacity {
            if let Some(evicted) = self.window.pop_front() {
                self.sum -= evicted;
            }
        }
        self.sum / self.window.len() as f64
    }

    pub fn reset(&mut self) {
        self.window.clear();
        self.sum = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_a_constant_stream() {
        let mut ma = MovingAverage::new(4);
        for _ in 0..10 {
            assert!((ma.push(2.0) - 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn ramps_up_before_reaching_full_window() {
        let mut ma = MovingAverage::new(3);
        assert!((ma.push(3.0) - 3.0).abs() < 1e-12);
        assert!((ma.push(9.0) - 6.0).abs() < 1e-12);
        assert!((ma.push(6.0) - 6.0).abs() < 1e-12);
        // window now full at [3,9,6]; pushing 0 evicts the 3
        assert!((ma.push(0.0) - 5.0).abs() < 1e-12);
    }
}

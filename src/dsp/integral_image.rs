//! Rolling integral image over the 12-by-T chroma feature matrix.
//!
//! Classifiers only ever look back a bounded number of rows/columns, so
//! rather than keep a true 2-D integral image, this keeps one running
//! cumulative sum per pitch class, stored in a ring buffer of `capacity`
//! columns. Rectangle sums over a pitch-class band are obtained by
//! summing the (at most 12) per-class column differences, which is O(1)
//! in practice since the number of classes is fixed and small. Sums use
//! `f64` accumulators that are never rebased, so they tolerate the
//! gradual precision drift of a long-running stream.

use crate::dsp::chroma::NUM_CLASSES;

pub struct IntegralImage {
    capacity: usize,
    /// `cumulative[class][col % capacity]` is the sum of all chroma values
    /// for `class` from the start of the stream up to and including column
    /// `col`.
    cumulative: Vec<[f64; NUM_CLASSES]>,
    /// Global number of columns appended so far (not wrapped).
    len: usize,
}

impl IntegralImage {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            cumulative: vec![[0.0; NUM_CLASSES]; capacity],
            len: 0,
        }
    }

    /// Number of columns appended so far.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends one chroma-vector column, updating the running sums.
    pub fn push(&mut self, chroma: &[f32; NUM_CLASSES]) {
        let prev = if self.len == 0 {
            [0.0; NUM_CLASSES]
        } else {
            self.cumulative[(self.len - 1) % self.capacity]
        };
        let slot = &mut self.cumulative[self.len % self.capacity];
        for c in 0..NUM_CLASSES {
            slot[c] = prev[c] + chroma[c] as f64;
        }
        self.len += 1;
    }

    /// Cumulative sum for `class` up to and including column `col`
    /// (`None` before the stream starts, i.e. `col` is "before column 0").
    fn cumulative_at(&self, class: usize, col: i64) -> f64 {
        if col < 0 {
            return 0.0;
        }
        let col = col as usize;
        debug_assert!(
            self.len > 0 && col < self.len && self.len - col <= self.capacity,
            "column {col} out of the retained window (len={}, capacity={})",
            self.len,
            self.capacity
        );
        self.cumulative[col % self.capacity][class]
    }

    /// Sum over pitch classes `[y, y+height)` and time columns `[x1, x2)`
    /// (half-open, `x1 <= x2`), where columns are absolute stream indices.
    pub fn rect_sum(&self, y: usize, height: usize, x1: usize, x2: usize) -> f64 {
        debug_assert!(x1 <= x2);
        if x1 == x2 {
            return 0.0;
        }
        let mut sum = 0.0;
        for class in y..y + height {
            let class = class % NUM_CLASSES;
            sum += self.cumulative_at(class, x2 as i64 - 1) - self.cumulative_at(class, x1 as i64 - 1);
        }
        sum
    }
}

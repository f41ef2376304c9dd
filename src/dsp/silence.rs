//! Streaming silence gate.
//!
//! Leading-silence removal is optional, enabled by setting a nonzero RMS
//! threshold (spec.md §4.2/§4.3: the `silence_threshold` option). With
//! threshold `0` the gate is disabled outright and passes every sample
//! through unchanged, rather than merely opening on the first nonzero
//! sample. When enabled, it computes a running RMS over a sliding window
//! of samples and emits nothing until the RMS first exceeds the
//! threshold. The gate is monotone: once it opens it stays open for the
//! rest of the session, rather than being able to close again on a later
//! quiet stretch.

use std::collections::VecDeque;

pub struct SilenceRemover {
    threshold: i64,
    window_len: usize,
    window: VecDeque<i32>,
    sum_sq: i64,
    /// `true` from construction when `threshold == 0`: removal is disabled
    /// and every sample passes straight through.
    unsilenced: bool,
}

impl SilenceRemover {
    /// `threshold` is an RMS amplitude in `0..=32767`; `0` disables
    /// silence removal entirely. `window_len` is the number of samples
    /// over which RMS is computed (typically one second of internal-rate
    /// audio).
    pub fn new(threshold: u32, window_len: usize) -> Self {
        Self {
            threshold: threshold as i64,
            window_len: window_len.max(1),
            window: VecDeque::with_capacity(window_len.max(1)),
            sum_sq: 0,
            unsilenced: threshold == 0,
        }
    }

    pub fn is_unsilenced(&self) -> bool {
        self.unsilenced
    }

    fn push_sample(&mut self, sample: i16) {
        let sq = (sample as i64) * (sample as i64);
        self.window.push_back(sample as i32);
        self.sum_sq += sq;
        if self.window.len() > self.window_len {
            if let Some(evicted) = self.window.pop_front() {
                self.sum_sq -= (evicted as i64) * (evicted as i64);
            }
        }
    }

    fn current_rms(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }
        (self.sum_sq as f64 / self.window.len() as f64).sqrt()
    }

    /// Feeds `samples` and returns the subset (contiguous suffix) that
    /// should be passed downstream: empty while still silent, and once
    /// unsilenced, all of `samples` from that point on (including samples
    /// fed in earlier calls once the gate first opens, held entirely
    /// in-window so nothing already consumed is replayed).
    pub fn process<'a>(&mut self, samples: &'a [i16]) -> &'a [i16] {
        if self.unsilenced {
            return samples;
        }
        for (i, &s) in samples.iter().enumerate() {
            self.push_sample(s);
            if self.current_rms() > self.threshold as f64 {
                self.unsilenced = true;
                return &samples[i + 1..];
            }
        }
        &samples[samples.len()..]
    }
}

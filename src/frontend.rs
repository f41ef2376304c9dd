//! Audio front end: channel mixdown, resampling to the internal sample
//! rate, and silence trimming.
//!
//! The resampler is `rubato`'s `FftFixedIn`, built once `start` is called
//! (the source rate is only known then), fed fixed-size chunks, and
//! drained with `process_partial` on `finish`.
//!
//! Channel mixdown sums sample values across channels without scaling,
//! rather than averaging — a later loudness-normalization stage, not the
//! front end, is the right place to rescale if that's ever needed.

use rubato::{FftFixedIn, Resampler};

use crate::config::INTERNAL_SAMPLE_RATE;
use crate::dsp::silence::SilenceRemover;
use crate::error::{FingerprintError, FingerprintResult};

const RESAMPLER_CHUNK: usize = 1024;

/// Converts interleaved multi-channel `i16` PCM at an arbitrary source
/// sample rate into a mono `i16` stream at [`INTERNAL_SAMPLE_RATE`], with
/// leading silence trimmed per [`SilenceRemover`].
pub struct AudioFrontEnd {
    source_rate: u32,
    channels: u32,
    resampler: Option<FftFixedIn<f32>>,
    resample_in_buf: Vec<Vec<f32>>,
    pending_mono: Vec<f32>,
    silence: SilenceRemover,
    started: bool,
}

impl AudioFrontEnd {
    pub fn new(silence_threshold: u32) -> Self {
        Self {
            source_rate: 0,
            channels: 0,
            resampler: None,
            resample_in_buf: Vec::new(),
            pending_mono: Vec::new(),
            silence: SilenceRemover::new(silence_threshold, INTERNAL_SAMPLE_RATE as usize),
            started: false,
        }
    }

    /// Must be called once before `consume`. `channels` must be `>= 1`.
    pub fn start(&mut self, source_rate: u32, channels: u32) -> FingerprintResult<()> {
        if channels == 0 {
            return Err(FingerprintError::InvalidChannelCount { channels });
        }
        if source_rate < INTERNAL_SAMPLE_RATE / 2 || source_rate > 96_000 {
            return Err(FingerprintError::UnsupportedSampleRate { rate: source_rate });
        }
        self.source_rate = source_rate;
        self.channels = channels;
        self.resampler = if source_rate == INTERNAL_SAMPLE_RATE {
            None
        } else {
            Some(
                FftFixedIn::new(
                    source_rate as usize,
                    INTERNAL_SAMPLE_RATE as usize,
                    RESAMPLER_CHUNK,
                    1,
                    1,
                )
                .map_err(|e| FingerprintError::InvalidInput {
                    reason: format!("failed to build resampler: {e}"),
                })?,
            )
        };
        self.resample_in_buf = vec![Vec::with_capacity(RESAMPLER_CHUNK)];
        self.started = true;
        Ok(())
    }

    /// Mixes down interleaved `samples` to mono, resamples to the internal
    /// rate, and runs the result through the silence gate. Returns the
    /// subset of internal-rate samples ready for the fingerprinter.
    pub fn consume(&mut self, samples: &[i16]) -> FingerprintResult<Vec<i16>> {
        if !self.started {
            return Err(FingerprintError::InvalidState {
                expected: "started",
                actual: "not started",
            });
        }
        let mono = self.mixdown(samples);
        let resampled = self.resample(&mono)?;
        let ready = self.silence.process(&resampled);
        Ok(ready.to_vec())
    }

    /// Flushes any resampler latency and returns the final internal-rate
    /// samples (also silence-gated).
    pub fn finish(&mut self) -> FingerprintResult<Vec<i16>> {
        if !self.started {
            return Ok(Vec::new());
        }
        let tail = if let Some(resampler) = &mut self.resampler {
            let leftover = std::mem::take(&mut self.resample_in_buf[0]);
            if leftover.is_empty() {
                Vec::new()
            } else {
                let mut padded = leftover;
                padded.resize(RESAMPLER_CHUNK, 0.0);
                let input = vec![padded];
                let out = resampler
                    .process_partial(Some(&input), None)
                    .map_err(|e| FingerprintError::InvalidInput {
                        reason: format!("resampler flush failed: {e}"),
                    })?;
                to_i16(&out[0])
            }
        } else {
            to_i16(&std::mem::take(&mut self.pending_mono))
        };
        let ready = self.silence.process(&tail);
        Ok(ready.to_vec())
    }

    fn mixdown(&self, interleaved: &[i16]) -> Vec<f32> {
        let channels = self.channels as usize;
        if channels == 1 {
            return interleaved.iter().map(|&s| s as f32).collect();
        }
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().map(|&s| s as f32).sum())
            .collect()
    }

    fn resample(&mut self, mono: &[f32]) -> FingerprintResult<Vec<i16>> {
        let Some(resampler) = &mut self.resampler else {
            self.pending_mono.extend_from_slice(mono);
            return Ok(to_i16(&std::mem::take(&mut self.pending_mono)));
        };

        self.resample_in_buf[0].extend_from_slice(mono);
        let mut output = Vec::new();
        while self.resample_in_buf[0].len() >= RESAMPLER_CHUNK {
            let chunk: Vec<f32> = self.resample_in_buf[0].drain(..RESAMPLER_CHUNK).collect();
            let input = vec![chunk];
            let out = resampler
                .process(&input, None)
                .map_err(|e| FingerprintError::InvalidInput {
                    reason: format!("resampling failed: {e}"),
                })?;
            output.extend(to_i16(&out[0]));
        }
        Ok(output)
    }
}

fn to_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| s.clamp(i16::MIN as f32, i16::MAX as f32) as i16)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_passthrough_needs_no_resampler() {
        let mut fe = AudioFrontEnd::new(0);
        fe.start(INTERNAL_SAMPLE_RATE, 1).unwrap();
        assert!(fe.resampler.is_none());
        let samples = vec![1000i16; INTERNAL_SAMPLE_RATE as usize];
        let out = fe.consume(&samples).unwrap();
        assert_eq!(out.len(), samples.len());
    }

    #[test]
    fn stereo_mixdown_sums_channels() {
        let fe = AudioFrontEnd::new(0);
        let interleaved = [1000i16, 2000, -500, -500];
        let mono = fe.mixdown(&interleaved);
        assert_eq!(mono, vec![3000.0, -1000.0]);
    }

    #[test]
    fn zero_channels_is_rejected() {
        let mut fe = AudioFrontEnd::new(0);
        assert!(fe.start(44100, 0).is_err());
    }

    #[test]
    fn different_source_rate_builds_a_resampler() {
        let mut fe = AudioFrontEnd::new(0);
        fe.start(44100, 1).unwrap();
        assert!(fe.resampler.is_some());
    }

    #[test]
    fn out_of_range_sample_rate_is_rejected() {
        let mut fe = AudioFrontEnd::new(0);
        assert!(fe.start(1000, 1).is_err());
        let mut fe = AudioFrontEnd::new(0);
        assert!(fe.start(200_000, 1).is_err());
    }
}

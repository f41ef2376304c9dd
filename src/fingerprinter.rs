//! The fingerprinting pipeline proper: frames internal-rate mono PCM,
//! runs the chroma front end, and classifies each hop into one
//! [`crate::fingerprint::SubFingerprint`].
//!
//! State machine lifecycle: `new -> start -> feed* -> finish ->
//! fingerprint -> clear|drop`, with `clear` resetting back to a fresh
//! `start`-able state so one context can be reused across sessions
//! without re-allocating its FFT plan or classifier tables.

use crate::classifier::pack_subfingerprint;
use crate::config::{Algorithm, AlgorithmConfig, INTERNAL_SAMPLE_RATE};
use crate::dsp::chroma::ChromaFilter;
use crate::dsp::chroma_smoother::ChromaSmoother;
use crate::dsp::fft::FrameFft;
use crate::dsp::integral_image::IntegralImage;
use crate::dsp::window;
use crate::error::{FingerprintError, FingerprintResult};
use crate::fingerprint::Fingerprint;
use crate::frontend::AudioFrontEnd;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Created,
    Started,
    Finished,
}

pub struct Fingerprinter {
    algorithm: Algorithm,
    config: &'static AlgorithmConfig,
    silence_threshold: u32,
    state: State,

    front_end: AudioFrontEnd,
    window: Vec<f32>,
    fft: FrameFft,
    chroma_filter: ChromaFilter,
    smoother: Option<ChromaSmoother>,
    image: IntegralImage,

    ring: Vec<i16>,
    ring_len: usize,
    magnitudes: Vec<f32>,

    columns_consumed_by_classifiers: usize,
    items: Vec<u32>,
}

impl Fingerprinter {
    pub fn new(algorithm: Algorithm) -> Self {
        let config = algorithm.config();
        let fft = FrameFft::new(config.frame_size);
        let chroma_filter = ChromaFilter::new(
            config.sample_rate,
            config.frame_size,
            config.min_freq,
            config.max_freq,
        );
        Self {
            algorithm,
            config,
            silence_threshold: 0,
            state: State::Created,
            front_end: AudioFrontEnd::new(0),
            window: window::hann(config.frame_size),
            fft,
            chroma_filter,
            smoother: config.chroma_smoothing.map(ChromaSmoother::new),
            image: IntegralImage::new(config.integral_image_capacity()),
            ring: vec![0i16; config.frame_size],
            ring_len: 0,
            magnitudes: vec![0.0; config.frame_size / 2 + 1],
            columns_consumed_by_classifiers: 0,
            items: Vec::new(),
        }
    }

    /// Sets the RMS silence threshold. Must be called before [`Self::start`].
    pub fn set_silence_threshold(&mut self, threshold: u32) -> FingerprintResult<()> {
        if self.state != State::Created {
            return Err(FingerprintError::InvalidState {
                expected: "created",
                actual: "already started",
            });
        }
        self.silence_threshold = threshold;
        Ok(())
    }

    /// Generic option setter: the only recognized name is
    /// `silence_threshold`, an integer in `0..=32767`. Unknown names and
    /// out-of-range values are rejected rather than ignored.
    pub fn set_option(&mut self, name: &str, value: i64) -> FingerprintResult<()> {
        match name {
            "silence_threshold" => {
                if !(0..=32767).contains(&value) {
                    return Err(FingerprintError::InvalidOptionValue {
                        name: name.to_string(),
                        value,
                    });
                }
                self.set_silence_threshold(value as u32)
            }
            _ => Err(FingerprintError::UnknownOption {
                name: name.to_string(),
            }),
        }
    }

    pub fn start(&mut self, sample_rate: u32, channels: u32) -> FingerprintResult<()> {
        if self.state != State::Created {
            return Err(FingerprintError::InvalidState {
                expected: "created",
                actual: "already started",
            });
        }
        self.front_end = AudioFrontEnd::new(self.silence_threshold);
        self.front_end.start(sample_rate, channels)?;
        self.state = State::Started;
        Ok(())
    }

    pub fn feed(&mut self, samples: &[i16]) -> FingerprintResult<()> {
        if self.state != State::Started {
            return Err(FingerprintError::InvalidState {
                expected: "started",
                actual: "not started or already finished",
            });
        }
        let internal = self.front_end.consume(samples)?;
        self.process_internal_samples(&internal);
        Ok(())
    }

    pub fn finish(&mut self) -> FingerprintResult<()> {
        if self.state != State::Started {
            return Err(FingerprintError::InvalidState {
                expected: "started",
                actual: "not started or already finished",
            });
        }
        let tail = self.front_end.finish()?;
        self.process_internal_samples(&tail);
        if let Some(smoother) = &mut self.smoother {
            for vector in smoother.finish() {
                self.image.push(&vector);
                self.try_classify();
            }
        }
        self.state = State::Finished;
        Ok(())
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::new(self.algorithm, self.items.clone())
    }

    /// Discards the accumulated fingerprint and resets the pipeline state
    /// so the context can be reused via another [`Self::start`] call,
    /// without paying for a fresh `FrameFft`/`ChromaFilter` allocation.
    pub fn clear(&mut self) {
        self.items.clear();
        self.ring_len = 0;
        self.columns_consumed_by_classifiers = 0;
        self.image = IntegralImage::new(self.config.integral_image_capacity());
        self.smoother = self.config.chroma_smoothing.map(ChromaSmoother::new);
        self.state = State::Created;
    }

    fn process_internal_samples(&mut self, samples: &[i16]) {
        let hop = self.config.hop;
        let frame_size = self.config.frame_size;
        let mut offset = 0;
        while offset < samples.len() {
            let take = (frame_size - self.ring_len).min(samples.len() - offset);
            self.ring[self.ring_len..self.ring_len + take]
                .copy_from_slice(&samples[offset..offset + take]);
            self.ring_len += take;
            offset += take;

            if self.ring_len == frame_size {
                self.consume_frame();
                self.ring.copy_within(hop.., 0);
                self.ring_len = frame_size - hop;
            }
        }
    }

    fn consume_frame(&mut self) {
        let samples: Vec<f32> = self.ring[..self.config.frame_size]
            .iter()
            .map(|&s| s as f32 / i16::MAX as f32)
            .collect();
        self.fft.magnitudes(&samples, &self.window, &mut self.magnitudes);
        let chroma = self.chroma_filter.fold(&self.magnitudes);

        match &mut self.smoother {
            Some(smoother) => {
                if let Some(smoothed) = smoother.push(chroma) {
                    self.image.push(&smoothed);
                    self.try_classify();
                }
            }
            None => {
                self.image.push(&chroma);
                self.try_classify();
            }
        }
    }

    fn try_classify(&mut self) {
        let x_end = self.image.len();
        if x_end <= self.columns_consumed_by_classifiers {
            return;
        }
        let required = self
            .config
            .classifiers
            .iter()
            .map(|c| c.required_width())
            .max()
            .unwrap_or(0);
        if x_end < required {
            return;
        }
        let mut codes = [0u8; 16];
        for (i, spec) in self.config.classifiers.iter().enumerate() {
            let value = spec.evaluate(&self.image, x_end);
            codes[i] = spec.quantize(value);
        }
        self.items.push(pack_subfingerprint(&codes));
        self.columns_consumed_by_classifiers = x_end;
    }
}

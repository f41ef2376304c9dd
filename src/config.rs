//! Per-algorithm configuration records.
//!
//! Configuration is a tagged value, not a polymorphic hierarchy: an
//! immutable record selected by algorithm id carries frame size, hop,
//! sample rate, chroma parameters, and the classifier table.
//! [`AlgorithmConfig`] is that record, and [`Algorithm::config`] is the
//! dispatch. Instances are built once behind `std::sync::OnceLock` and
//! shared by `&'static` reference, so every caller sees the same
//! classifier tables without re-allocating them.

use std::sync::OnceLock;

use crate::classifier::{ClassifierSpec, FilterKind};
use crate::error::{FingerprintError, FingerprintResult};

/// Internal sample rate used by every algorithm.
pub const INTERNAL_SAMPLE_RATE: u32 = 11025;

/// Algorithm identifier, one of `0..=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Algorithm {
    Algorithm0 = 0,
    Algorithm1 = 1,
    Algorithm2 = 2,
    Algorithm3 = 3,
    Algorithm4 = 4,
}

impl Algorithm {
    pub fn from_id(id: u8) -> FingerprintResult<Self> {
        match id {
            0 => Ok(Algorithm::Algorithm0),
            1 => Ok(Algorithm::Algorithm1),
            2 => Ok(Algorithm::Algorithm2),
            3 => Ok(Algorithm::Algorithm3),
            4 => Ok(Algorithm::Algorithm4),
            id => Err(FingerprintError::UnknownAlgorithm { id }),
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    /// The immutable configuration record bound to this algorithm id.
    pub fn config(self) -> &'static AlgorithmConfig {
        match self {
            Algorithm::Algorithm0 => algorithm0(),
            Algorithm::Algorithm1 => algorithm1(),
            Algorithm::Algorithm2 => algorithm2(),
            Algorithm::Algorithm3 => algorithm3(),
            Algorithm::Algorithm4 => algorithm4(),
        }
    }

    /// `items * hop / sample_rate`, in milliseconds.
    pub fn hash_time_ms(self, items: usize) -> u64 {
        let cfg = self.config();
        (items as u64 * cfg.hop as u64 * 1000) / cfg.sample_rate as u64
    }
}

/// Full parameter pack for one algorithm id.
pub struct AlgorithmConfig {
    pub algorithm: Algorithm,
    pub sample_rate: u32,
    pub frame_size: usize,
    pub hop: usize,
    pub min_freq: f32,
    pub max_freq: f32,
    /// `Some(length)` enables the Gaussian chroma smoother with that
    /// (odd-rounded) kernel length; `None` disables smoothing.
    pub chroma_smoothing: Option<usize>,
    pub classifiers: [ClassifierSpec; 16],
}

impl AlgorithmConfig {
    /// Number of feature-image columns the rolling integral image must
    /// retain to satisfy every classifier's width requirement.
    pub fn integral_image_capacity(&self) -> usize {
        let max_width = self
            .classifiers
            .iter()
            .map(|c| c.required_width())
            .max()
            .unwrap_or(1);
        // A little slack so a classifier evaluated right as a column is
        // evicted still sees its full window.
        max_width + 4
    }
}

const MIN_FREQ: f32 = 28.0;
const MAX_FREQ: f32 = 3520.0;
const DEFAULT_FRAME_SIZE: usize = 4096;
const DEFAULT_HOP: usize = 1365;

fn classifiers_v1() -> [ClassifierSpec; 16] {
    use FilterKind::*;
    [
        ClassifierSpec::new(Filter0, 0, 3, 15, [2.10543, 2.45354, 2.69414]),
        ClassifierSpec::new(Filter1, 0, 4, 14, [-0.345922, 0.0463746, 0.446251]),
        ClassifierSpec::new(Filter1, 4, 4, 11, [-0.392132, 0.0291077, 0.443391]),
        ClassifierSpec::new(Filter3, 0, 4, 14, [-0.192851, 0.00583535, 0.204053]),
        ClassifierSpec::new(Filter2, 8, 2, 4, [-0.0771619, -0.00991999, 0.0575406]),
        ClassifierSpec::new(Filter5, 6, 2, 15, [-0.710437, -0.518954, -0.330402]),
        ClassifierSpec::new(Filter1, 9, 2, 16, [-0.353724, -0.0189719, 0.289768]),
        ClassifierSpec::new(Filter3, 4, 2, 10, [-0.128418, -0.0285697, 0.0591791]),
        ClassifierSpec::new(Filter3, 9, 2, 16, [-0.139052, -0.0228468, 0.0879723]),
        ClassifierSpec::new(Filter2, 1, 3, 6, [-0.133562, 0.00669205, 0.155012]),
        ClassifierSpec::new(Filter3, 3, 6, 2, [-0.0267, 0.00804829, 0.0459773]),
        ClassifierSpec::new(Filter2, 8, 1, 10, [-0.0972417, 0.0152227, 0.129003]),
        ClassifierSpec::new(Filter3, 4, 4, 14, [-0.141434, 0.00374515, 0.149935]),
        ClassifierSpec::new(Filter5, 4, 2, 15, [-0.64035, -0.466999, -0.285493]),
        ClassifierSpec::new(Filter5, 9, 2, 3, [-0.322792, -0.254258, -0.174278]),
        ClassifierSpec::new(Filter2, 1, 8, 4, [-0.0741375, -0.00590933, 0.0600357]),
    ]
}

fn classifiers_v2() -> [ClassifierSpec; 16] {
    use FilterKind::*;
    [
        ClassifierSpec::new(Filter0, 4, 3, 15, [1.98215, 2.35817, 2.63523]),
        ClassifierSpec::new(Filter4, 4, 6, 15, [-1.03809, -0.651211, -0.282167]),
        ClassifierSpec::new(Filter1, 0, 4, 16, [-0.298702, 0.119262, 0.558497]),
        ClassifierSpec::new(Filter3, 8, 2, 12, [-0.105439, 0.0153946, 0.135898]),
        ClassifierSpec::new(Filter3, 4, 4, 8, [-0.142891, 0.0258736, 0.200632]),
        ClassifierSpec::new(Filter4, 0, 3, 5, [-0.826319, -0.590612, -0.368214]),
        ClassifierSpec::new(Filter1, 2, 2, 9, [-0.557409, -0.233035, 0.0534525]),
        ClassifierSpec::new(Filter2, 7, 3, 4, [-0.0646826, 0.00620476, 0.0784847]),
        ClassifierSpec::new(Filter2, 6, 2, 16, [-0.192387, -0.029699, 0.215855]),
        ClassifierSpec::new(Filter2, 1, 3, 2, [-0.0397818, -0.00568076, 0.0292026]),
        ClassifierSpec::new(Filter5, 10, 1, 15, [-0.53823, -0.369934, -0.190235]),
        ClassifierSpec::new(Filter3, 6, 2, 10, [-0.124877, 0.0296483, 0.139239]),
        ClassifierSpec::new(Filter2, 1, 1, 14, [-0.101475, 0.0225617, 0.231971]),
        ClassifierSpec::new(Filter3, 5, 6, 4, [-0.0799915, -0.00729616, 0.063262]),
        ClassifierSpec::new(Filter1, 9, 2, 12, [-0.272556, 0.019424, 0.302559]),
        ClassifierSpec::new(Filter3, 4, 2, 14, [-0.164292, -0.0321188, 0.0846339]),
    ]
}

fn algorithm0() -> &'static AlgorithmConfig {
    static CELL: OnceLock<AlgorithmConfig> = OnceLock::new();
    CELL.get_or_init(|| AlgorithmConfig {
        algorithm: Algorithm::Algorithm0,
        sample_rate: INTERNAL_SAMPLE_RATE,
        frame_size: DEFAULT_FRAME_SIZE,
        hop: DEFAULT_HOP,
        min_freq: MIN_FREQ,
        max_freq: MAX_FREQ,
        chroma_smoothing: None,
        classifiers: classifiers_v1(),
    })
}

fn algorithm1() -> &'static AlgorithmConfig {
    static CELL: OnceLock<AlgorithmConfig> = OnceLock::new();
    CELL.get_or_init(|| AlgorithmConfig {
        algorithm: Algorithm::Algorithm1,
        sample_rate: INTERNAL_SAMPLE_RATE,
        frame_size: DEFAULT_FRAME_SIZE,
        hop: DEFAULT_HOP,
        min_freq: MIN_FREQ,
        max_freq: MAX_FREQ,
        chroma_smoothing: Some(3),
        classifiers: classifiers_v1(),
    })
}

fn algorithm2() -> &'static AlgorithmConfig {
    static CELL: OnceLock<AlgorithmConfig> = OnceLock::new();
    CELL.get_or_init(|| AlgorithmConfig {
        algorithm: Algorithm::Algorithm2,
        sample_rate: INTERNAL_SAMPLE_RATE,
        frame_size: DEFAULT_FRAME_SIZE,
        hop: DEFAULT_HOP,
        min_freq: MIN_FREQ,
        max_freq: MAX_FREQ,
        chroma_smoothing: None,
        classifiers: classifiers_v2(),
    })
}

fn algorithm3() -> &'static AlgorithmConfig {
    static CELL: OnceLock<AlgorithmConfig> = OnceLock::new();
    CELL.get_or_init(|| AlgorithmConfig {
        algorithm: Algorithm::Algorithm3,
        sample_rate: INTERNAL_SAMPLE_RATE,
        frame_size: DEFAULT_FRAME_SIZE,
        hop: DEFAULT_HOP,
        min_freq: MIN_FREQ,
        max_freq: MAX_FREQ,
        chroma_smoothing: Some(5),
        classifiers: classifiers_v2(),
    })
}

fn algorithm4() -> &'static AlgorithmConfig {
    static CELL: OnceLock<AlgorithmConfig> = OnceLock::new();
    CELL.get_or_init(|| AlgorithmConfig {
        algorithm: Algorithm::Algorithm4,
        sample_rate: INTERNAL_SAMPLE_RATE,
        frame_size: DEFAULT_FRAME_SIZE / 2,
        hop: 1024,
        min_freq: MIN_FREQ,
        max_freq: MAX_FREQ,
        chroma_smoothing: Some(3),
        classifiers: classifiers_v1(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_id_round_trips() {
        for id in 0u8..=4 {
            let algo = Algorithm::from_id(id).unwrap();
            assert_eq!(algo.id(), id);
        }
    }

    #[test]
    fn unknown_id_is_an_error() {
        assert!(Algorithm::from_id(5).is_err());
    }

    #[test]
    fn every_algorithm_has_16_classifiers() {
        for id in 0u8..=4 {
            let cfg = Algorithm::from_id(id).unwrap().config();
            assert_eq!(cfg.classifiers.len(), 16);
        }
    }

    #[test]
    fn hash_time_matches_formula() {
        let algo = Algorithm::Algorithm1;
        let cfg = algo.config();
        let items = 1000;
        let expected = (items as u64 * cfg.hop as u64 * 1000) / cfg.sample_rate as u64;
        assert_eq!(algo.hash_time_ms(items), expected);
    }
}

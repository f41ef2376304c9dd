//! Crate-wide error type.
//!
//! Mirrors the error-kind taxonomy of the system this crate implements:
//! configuration errors, state errors (lifecycle misuse), input errors,
//! decode errors and match-mismatch errors all surface as one
//! [`FingerprintError`] enum rather than as panics, so that the C façade
//! (see [`crate::ffi`]) can translate every recoverable failure into its
//! boolean-return convention.

use thiserror::Error;

use crate::config::Algorithm;

/// Convenience alias used throughout the crate.
pub type FingerprintResult<T> = Result<T, FingerprintError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FingerprintError {
    /// An option name passed to `set_option` is not recognized.
    #[error("unknown option `{name}`")]
    UnknownOption { name: String },

    /// An option value is recognized but out of range.
    #[error("invalid value {value} for option `{name}`")]
    InvalidOptionValue { name: String, value: i64 },

    /// `start` was called with a sample rate outside `[internal_rate/2, 96000]`.
    #[error("unsupported sample rate {rate} Hz")]
    UnsupportedSampleRate { rate: u32 },

    /// A channel count of zero was supplied.
    #[error("invalid channel count {channels}")]
    InvalidChannelCount { channels: u32 },

    /// An algorithm id outside `0..=4` was requested.
    #[error("unknown algorithm id {id}")]
    UnknownAlgorithm { id: u8 },

    /// An operation was invoked out of the lifecycle order documented on
    /// [`crate::fingerprinter::Fingerprinter`].
    #[error("invalid state: expected {expected}, was {actual}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },

    /// A null/empty/otherwise malformed input buffer was supplied.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// A compressed buffer is shorter than its own declared length implies.
    #[error("truncated compressed buffer: expected at least {expected} bytes, got {actual}")]
    TruncatedBuffer { expected: usize, actual: usize },

    /// A 5-bit exception symbol fell outside the valid `0..32` range.
    #[error("invalid exception symbol {symbol}")]
    InvalidExceptionSymbol { symbol: u8 },

    /// The two fingerprints given to [`crate::matcher::match_fingerprints`]
    /// were built with different algorithms.
    #[error("algorithm mismatch: {a:?} vs {b:?}")]
    AlgorithmMismatch { a: Algorithm, b: Algorithm },

    /// A fingerprint given to the matcher has no items.
    #[error("empty fingerprint")]
    EmptyFingerprint,
}

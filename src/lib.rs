//! Streaming acoustic fingerprinting and fingerprint matching.
//!
//! This crate extracts a compact, robust "fingerprint" — a sequence of
//! 32-bit items — from raw PCM audio, compresses and transports that
//! fingerprint as text, and compares two fingerprints to find where (and
//! how well) they overlap.
//!
//! The pipeline, end to end:
//!
//! 1. [`frontend::AudioFrontEnd`] mixes down to mono, resamples to the
//!    internal rate, and trims leading silence.
//! 2. [`fingerprinter::Fingerprinter`] runs the windowed FFT / chroma /
//!    classifier pipeline and produces a [`fingerprint::Fingerprint`].
//! 3. [`codec`] and [`transport`] compress a fingerprint to bytes or to
//!    URL-safe text; [`simhash`] reduces one to a single 32-bit summary.
//! 4. [`matcher`] aligns two fingerprints and reports matching segments.
//! 5. [`ffi`] exposes the same operations behind a C ABI.

pub mod classifier;
pub mod codec;
pub mod config;
pub mod dsp;
pub mod error;
pub mod ffi;
pub mod fingerprint;
pub mod fingerprinter;
pub mod frontend;
pub mod matcher;
pub mod simhash;
pub mod transport;

pub use config::{Algorithm, AlgorithmConfig};
pub use error::{FingerprintError, FingerprintResult};
pub use fingerprint::{Fingerprint, SubFingerprint};
pub use fingerprinter::Fingerprinter;
pub use matcher::{match_fingerprints, Segment};
pub use simhash::{simhash, SimHash};

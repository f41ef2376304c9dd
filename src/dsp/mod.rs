//! DSP primitives shared by the fingerprinter and, indirectly, the matcher.
//!
//! Each submodule here is deliberately small and stateless-where-possible:
//! a struct holding just enough state to stream, plus free functions for
//! the pure math.

pub mod chroma;
pub mod chroma_smoother;
pub mod fft;
pub mod integral_image;
pub mod moving_average;
pub mod silence;
pub mod window;

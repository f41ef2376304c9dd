//! URL-safe text transport wrapper around [`crate::codec`]. Consumes the
//! `base64` crate's engine rather than hand-rolling an alphabet.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::codec::{compress, decompress};
use crate::error::FingerprintResult;
use crate::fingerprint::Fingerprint;

/// Compresses `fp` and encodes it as URL-safe, unpadded base64 text.
pub fn encode(fp: &Fingerprint) -> String {
    URL_SAFE_NO_PAD.encode(compress(fp))
}

/// Inverse of [`encode`].
pub fn decode(text: &str) -> FingerprintResult<Fingerprint> {
    let bytes = URL_SAFE_NO_PAD
        .decode(text)
        .map_err(|e| crate::error::FingerprintError::InvalidInput {
            reason: format!("invalid base64: {e}"),
        })?;
    decompress(&bytes)
}

//! Binary compression for a [`Fingerprint`]'s items.
//!
//! Adjacent items are XORed to form a delta; each delta is described as a
//! list of gaps between its set bits (scanned from the least significant
//! bit up), terminated by a zero gap. Gaps `0..=6` are written directly as
//! 3-bit codes into a "normal" bitstream; larger gaps write the escape
//! code `7` to the normal stream and `gap - 7` as a 5-bit code into a
//! separate "exception" bitstream. Because every compressed fingerprint
//! declares its item count up front, the decoder knows exactly how many
//! terminator-delimited gap lists to expect and never needs to record the
//! normal stream's length explicitly — it reads until it has decoded that
//! many items.

use crate::config::Algorithm;
use crate::error::{FingerprintError, FingerprintResult};
use crate::fingerprint::Fingerprint;

const HEADER_LEN: usize = 4;

struct BitWriter {
    bytes: Vec<u8>,
    bit_pos: u8,
}

impl BitWriter {
    fn new() -> Self {
        Self {
            bytes: Vec::new(),
            bit_pos: 0,
        }
    }

    fn write_bits(&mut self, value: u32, width: u8) {
        for i in (0..width).rev() {
            let bit = (value >> i) & 1;
            if self.bit_pos == 0 {
                self.bytes.push(0);
            }
            let byte = self.bytes.last_mut().unwrap();
            *byte |= (bit as u8) << (7 - self.bit_pos);
            self.bit_pos = (self.bit_pos + 1) % 8;
        }
    }

    fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

struct BitReader<'a> {
    bytes: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, bit_pos: 0 }
    }

    fn read_bits(&mut self, width: u8) -> FingerprintResult<u32> {
        let mut value = 0u32;
        for _ in 0..width {
            let byte_idx = self.bit_pos / 8;
            let bit_idx = self.bit_pos % 8;
            let byte = *self.bytes.get(byte_idx).ok_or(FingerprintError::TruncatedBuffer {
                expected: byte_idx + 1,
                actual: self.bytes.len(),
            })?;
            let bit = (byte >> (7 - bit_idx)) & 1;
            value = (value << 1) | bit as u32;
            self.bit_pos += 1;
        }
        Ok(value)
    }
}

/// Serializes a [`Fingerprint`] as `[algorithm_id][item_count:3 bytes BE][normal stream][exception stream]`.
pub fn compress(fp: &Fingerprint) -> Vec<u8> {
    let mut normal = BitWriter::new();
    let mut exceptions = BitWriter::new();
    let mut last = 0u32;

    for &item in &fp.items {
        let mut delta = item ^ last;
        last = item;
        let mut gap = 1u32;
        while delta != 0 {
            if delta & 1 != 0 {
                write_normal_code(&mut normal, &mut exceptions, gap);
                gap = 1;
            } else {
                gap += 1;
            }
            delta >>= 1;
        }
        write_normal_code(&mut normal, &mut exceptions, 0);
    }

    let mut out = Vec::with_capacity(HEADER_LEN + normal.bytes.len() + exceptions.bytes.len());
    out.push(fp.algorithm.id());
    let count = fp.items.len() as u32;
    out.push(((count >> 16) & 0xFF) as u8);
    out.push(((count >> 8) & 0xFF) as u8);
    out.push((count & 0xFF) as u8);
    out.extend(normal.into_bytes());
    out.extend(exceptions.into_bytes());
    out
}

fn write_normal_code(normal: &mut BitWriter, exceptions: &mut BitWriter, value: u32) {
    if value >= 7 {
        normal.write_bits(7, 3);
        exceptions.write_bits(value - 7, 5);
    } else {
        normal.write_bits(value, 3);
    }
}

/// Inverse of [`compress`].
pub fn decompress(bytes: &[u8]) -> FingerprintResult<Fingerprint> {
    if bytes.len() < HEADER_LEN {
        return Err(FingerprintError::TruncatedBuffer {
            expected: HEADER_LEN,
            actual: bytes.len(),
        });
    }
    let algorithm = Algorithm::from_id(bytes[0])?;
    let count = ((bytes[1] as usize) << 16) | ((bytes[2] as usize) << 8) | bytes[3] as usize;

    // The normal/exception split point isn't known until decoding is
    // done, so this runs in two passes: first count how many bits the
    // normal stream occupies (every code is self-describing, so this
    // needs no knowledge of the exception stream), then decode for real
    // against the now-fixed byte boundary.
    let normal_bits = count_normal_stream_bits(bytes, count)?;
    let normal_len_bytes = normal_bits.div_ceil(8);
    let normal_region = &bytes[HEADER_LEN..HEADER_LEN + normal_len_bytes];
    let exception_region = &bytes[HEADER_LEN + normal_len_bytes..];

    let mut normal_reader = BitReader::new(normal_region);
    let mut exception_reader = BitReader::new(exception_region);

    let mut items = Vec::with_capacity(count);
    let mut last = 0u32;
    for _ in 0..count {
        let mut delta = 0u32;
        let mut pos: i64 = -1;
        loop {
            let code = normal_reader.read_bits(3)?;
            let gap = if code == 7 {
                7 + exception_reader.read_bits(5)?
            } else {
                code
            };
            if gap == 0 {
                break;
            }
            pos += gap as i64;
            if !(0..32).contains(&pos) {
                return Err(FingerprintError::InvalidExceptionSymbol { symbol: code as u8 });
            }
            delta |= 1 << pos;
        }
        let item = last ^ delta;
        items.push(item);
        last = item;
    }

    Ok(Fingerprint::new(algorithm, items))
}

/// Counts the 3-bit normal codes needed to decode `count` items' gap
/// lists (including their terminators), without touching the exception
/// stream. Reads every code as if it were 3 bits apart from its
/// neighbor regardless of escapes, which is valid here because the
/// question is only "how many normal codes are there", not "what are
/// their values" -- the exception stream does not affect that count.
fn count_normal_stream_bits(bytes: &[u8], count: usize) -> FingerprintResult<usize> {
    let region = &bytes[HEADER_LEN..];
    let mut reader = BitReader::new(region);
    let mut normal_codes = 0usize;
    for _ in 0..count {
        loop {
            let code = reader.read_bits(3)?;
            normal_codes += 1;
            if code == 0 {
                break;
            }
        }
    }
    Ok(normal_codes * 3)
}

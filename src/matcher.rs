//! Cross-fingerprint matcher: finds the best alignment
//! offset(s) between two fingerprints' item streams and carves the
//! aligned region into contiguous matching segments.

use crate::dsp::moving_average::MovingAverage;
use crate::error::{FingerprintError, FingerprintResult};
use crate::fingerprint::Fingerprint;

/// Minimum number of overlapping items an alignment offset needs before
/// it is considered for segment extraction.
pub const MIN_OVERLAP: usize = 80;

/// Average per-item bit error, out of 32 bits, above which a run of items
/// is no longer considered part of the same matching segment.
pub const BIT_ERROR_THRESHOLD: f64 = 0.45 * 32.0;

const SMOOTHING_WINDOW: usize = 8;

/// One contiguous matching run between two fingerprints.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    /// Start item index in the first fingerprint.
    pub pos1: usize,
    /// Start item index in the second fingerprint.
    pub pos2: usize,
    /// Number of items the segment spans.
    pub duration: usize,
    /// `round(100 * (1 - raw_bit_error / 32))`, clamped to `0..=100`.
    pub score: u8,
}

struct OffsetCandidate {
    offset: i64,
    overlap: usize,
}

/// Compares `a` against `b` and returns non-overlapping matching
/// segments, best score first.
///
/// Errors if the two fingerprints were built with different algorithms
/// (their bits are not comparable), or if both are empty.
pub fn match_fingerprints(
    a: &Fingerprint,
    b: &Fingerprint,
) -> FingerprintResult<Vec<Segment>> {
    if a.algorithm != b.algorithm {
        return Err(FingerprintError::AlgorithmMismatch {
            a: a.algorithm,
            b: b.algorithm,
        });
    }
    if a.items.is_empty() && b.items.is_empty() {
        return Err(FingerprintError::EmptyFingerprint);
    }
    if a.items.is_empty() || b.items.is_empty() {
        return Ok(Vec::new());
    }

    let candidates = sweep_offsets(a, b);
    let mut segments: Vec<Segment> = candidates
        .iter()
        .flat_map(|c| extract_segments(a, b, c.offset))
        .collect();

    suppress_overlaps(&mut segments);
    Ok(segments)
}

/// For every offset with at least [`MIN_OVERLAP`] overlapping items and a
/// raw (unsmoothed) average bit error below [`BIT_ERROR_THRESHOLD`],
/// records it as worth extracting segments from.
fn sweep_offsets(a: &Fingerprint, b: &Fingerprint) -> Vec<OffsetCandidate> {
    let min_offset = -(b.items.len() as i64) + 1;
    let max_offset = a.items.len() as i64 - 1;

    let mut candidates = Vec::new();
    for offset in min_offset..=max_offset {
        let (overlap, total_error) = overlap_stats(a, b, offset);
        if overlap < MIN_OVERLAP {
            continue;
        }
        let avg_error = total_error / overlap as f64;
        if avg_error < BIT_ERROR_THRESHOLD {
            candidates.push(OffsetCandidate { offset, overlap });
        }
    }
    candidates
}

fn overlap_range(a_len: usize, b_len: usize, offset: i64) -> (usize, usize, usize) {
    let i_start = offset.max(0) as usize;
    let j_start = (-offset).max(0) as usize;
    let len = (a_len - i_start).min(b_len - j_start);
    (i_start, j_start, len)
}

fn overlap_stats(a: &Fingerprint, b: &Fingerprint, offset: i64) -> (usize, f64) {
    let (i_start, j_start, len) = overlap_range(a.items.len(), b.items.len(), offset);
    let mut total_error = 0.0;
    for k in 0..len {
        total_error += (a.items[i_start + k] ^ b.items[j_start + k]).count_ones() as f64;
    }
    (len, total_error)
}

/// Walks the aligned items at `offset`, smoothing per-item bit error with
/// a length-[`SMOOTHING_WINDOW`] moving average, and splits the run into
/// segments wherever the smoothed error crosses [`BIT_ERROR_THRESHOLD`].
fn extract_segments(a: &Fingerprint, b: &Fingerprint, offset: i64) -> Vec<Segment> {
    let (i_start, j_start, len) = overlap_range(a.items.len(), b.items.len(), offset);
    if len < MIN_OVERLAP {
        return Vec::new();
    }

    let mut ma = MovingAverage::new(SMOOTHING_WINDOW);
    let mut segments = Vec::new();
    let mut run_start: Option<usize> = None;
    let mut run_error_sum = 0.0;
    let mut run_len = 0usize;

    for k in 0..len {
        let raw_error = (a.items[i_start + k] ^ b.items[j_start + k]).count_ones() as f64;
        let smoothed = ma.push(raw_error);

        if smoothed < BIT_ERROR_THRESHOLD {
            if run_start.is_none() {
                run_start = Some(k);
                run_error_sum = 0.0;
                run_len = 0;
            }
            run_error_sum += raw_error;
            run_len += 1;
        } else if let Some(start) = run_start.take() {
            push_segment(&mut segments, i_start, j_start, start, run_len, run_error_sum);
        }
    }
    if let Some(start) = run_start {
        push_segment(&mut segments, i_start, j_start, start, run_len, run_error_sum);
    }
    segments
}

fn push_segment(
    segments: &mut Vec<Segment>,
    i_start: usize,
    j_start: usize,
    run_start: usize,
    run_len: usize,
    run_error_sum: f64,
) {
    if run_len < MIN_OVERLAP {
        return;
    }
    let avg_error = run_error_sum / run_len as f64;
    let score = public_score(avg_error);
    segments.push(Segment {
        pos1: i_start + run_start,
        pos2: j_start + run_start,
        duration: run_len,
        score,
    });
}

/// `round(100 * (1 - raw_score / 32))`, clamped to `0..=100`.
pub fn public_score(raw_bit_error: f64) -> u8 {
    let value = 100.0 * (1.0 - raw_bit_error / 32.0);
    value.round().clamp(0.0, 100.0) as u8
}

/// Greedily keeps the highest-scoring segments, dropping any later one
/// (in score-descending, then `pos1`-ascending order) that overlaps an
/// already-kept segment in either fingerprint's item range.
fn suppress_overlaps(segments: &mut Vec<Segment>) {
    segments.sort_by(|a, b| b.score.cmp(&a.score).then(a.pos1.cmp(&b.pos1)));
    let mut kept: Vec<Segment> = Vec::new();
    for seg in segments.drain(..) {
        let overlaps = kept.iter().any(|k| {
            ranges_overlap(k.pos1, k.duration, seg.pos1, seg.duration)
                || ranges_overlap(k.pos2, k.duration, seg.pos2, seg.duration)
        });
        if !overlaps {
            kept.push(seg);
        }
    }
    *segments = kept;
}

fn ranges_overlap(start_a: usize, len_a: usize, start_b: usize, len_b: usize) -> bool {
    start_a < start_b + len_b && start_b < start_a + len_a
}

//! End-to-end lifecycle tests exercising the public API the way an
//! embedding application would: front end through fingerprint through
//! codec through matcher.

use chromaflow_audio::codec::{compress, decompress};
use chromaflow_audio::config::INTERNAL_SAMPLE_RATE;
use chromaflow_audio::matcher::match_fingerprints;
use chromaflow_audio::transport;
use chromaflow_audio::{simhash, Algorithm, Fingerprinter};

fn tone(seconds: usize, freq: f32) -> Vec<i16> {
    let sr = INTERNAL_SAMPLE_RATE as f32;
    (0..(INTERNAL_SAMPLE_RATE as usize * seconds))
        .map(|n| {
            let t = n as f32 / sr;
            (9000.0 * (2.0 * std::f32::consts::PI * freq * t).sin()) as i16
        })
        .collect()
}

#[test]
fn fingerprint_compress_transport_round_trip() {
    let mut fp = Fingerprinter::new(Algorithm::Algorithm1);
    fp.start(INTERNAL_SAMPLE_RATE, 1).unwrap();
    fp.feed(&tone(5, 440.0)).unwrap();
    fp.finish().unwrap();
    let fingerprint = fp.fingerprint();
    assert!(!fingerprint.is_empty());

    let compressed = compress(&fingerprint);
    let decoded = decompress(&compressed).unwrap();
    assert_eq!(decoded, fingerprint);

    let text = transport::encode(&fingerprint);
    let decoded_text = transport::decode(&text).unwrap();
    assert_eq!(decoded_text, fingerprint);
}

#[test]
fn two_recordings_of_the_same_tone_match() {
    let mut fp1 = Fingerprinter::new(Algorithm::Algorithm1);
    fp1.start(INTERNAL_SAMPLE_RATE, 1).unwrap();
    fp1.feed(&tone(10, 440.0)).unwrap();
    fp1.finish().unwrap();

    let mut fp2 = Fingerprinter::new(Algorithm::Algorithm1);
    fp2.start(INTERNAL_SAMPLE_RATE, 1).unwrap();
    fp2.feed(&tone(10, 440.0)).unwrap();
    fp2.finish().unwrap();

    let segments = match_fingerprints(&fp1.fingerprint(), &fp2.fingerprint()).unwrap();
    assert!(!segments.is_empty());
    assert!(segments[0].score > 90);
}

#[test]
fn different_tones_do_not_match() {
    let mut fp1 = Fingerprinter::new(Algorithm::Algorithm1);
    fp1.start(INTERNAL_SAMPLE_RATE, 1).unwrap();
    fp1.feed(&tone(10, 220.0)).unwrap();
    fp1.finish().unwrap();

    let mut fp2 = Fingerprinter::new(Algorithm::Algorithm1);
    fp2.start(INTERNAL_SAMPLE_RATE, 1).unwrap();
    fp2.feed(&tone(10, 1760.0)).unwrap();
    fp2.finish().unwrap();

    let segments = match_fingerprints(&fp1.fingerprint(), &fp2.fingerprint()).unwrap();
    assert!(segments.is_empty() || segments[0].score < 90);
}

#[test]
fn simhash_is_stable_across_runs_of_the_same_audio() {
    let mut fp1 = Fingerprinter::new(Algorithm::Algorithm1);
    fp1.start(INTERNAL_SAMPLE_RATE, 1).unwrap();
    fp1.feed(&tone(5, 660.0)).unwrap();
    fp1.finish().unwrap();

    let mut fp2 = Fingerprinter::new(Algorithm::Algorithm1);
    fp2.start(INTERNAL_SAMPLE_RATE, 1).unwrap();
    fp2.feed(&tone(5, 660.0)).unwrap();
    fp2.finish().unwrap();

    assert_eq!(simhash(&fp1.fingerprint()), simhash(&fp2.fingerprint()));
}

#[test]
fn restarting_a_fingerprinter_after_clear_produces_independent_results() {
    let mut fp = Fingerprinter::new(Algorithm::Algorithm1);
    fp.start(INTERNAL_SAMPLE_RATE, 1).unwrap();
    fp.feed(&tone(5, 440.0)).unwrap();
    fp.finish().unwrap();
    let first = fp.fingerprint();
    fp.clear();
    assert!(fp.fingerprint().is_empty());
    assert!(!first.is_empty());

    fp.start(INTERNAL_SAMPLE_RATE, 1).unwrap();
    fp.feed(&tone(5, 440.0)).unwrap();
    fp.finish().unwrap();
    assert_eq!(fp.fingerprint(), first);
}

#[test]
fn fingerprinting_is_deterministic() {
    let samples = tone(3, 523.25);
    let run = || {
        let mut fp = Fingerprinter::new(Algorithm::Algorithm1);
        fp.start(INTERNAL_SAMPLE_RATE, 1).unwrap();
        fp.feed(&samples).unwrap();
        fp.finish().unwrap();
        fp.fingerprint()
    };
    assert_eq!(run(), run());
}

#[test]
fn feeding_in_many_small_chunks_matches_feeding_all_at_once() {
    let samples = tone(4, 330.0);

    let mut whole = Fingerprinter::new(Algorithm::Algorithm1);
    whole.start(INTERNAL_SAMPLE_RATE, 1).unwrap();
    whole.feed(&samples).unwrap();
    whole.finish().unwrap();

    let mut chunked = Fingerprinter::new(Algorithm::Algorithm1);
    chunked.start(INTERNAL_SAMPLE_RATE, 1).unwrap();
    for chunk in samples.chunks(97) {
        chunked.feed(chunk).unwrap();
    }
    chunked.finish().unwrap();

    assert_eq!(whole.fingerprint(), chunked.fingerprint());
}

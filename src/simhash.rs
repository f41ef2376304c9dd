//! SimHash of a fingerprint: a single 32-bit summary where bit `k` is the
//! sign of the `+1`/`-1` vote across all items' bit `k`, ties (an even
//! split) resolving to `1`.

use crate::fingerprint::Fingerprint;

/// A 32-bit SimHash value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimHash(pub u32);

impl SimHash {
    pub fn hamming_distance(self, other: SimHash) -> u32 {
        (self.0 ^ other.0).count_ones()
    }
}

/// Computes the SimHash of a fingerprint's items. An empty fingerprint's
/// SimHash is `0`.
pub fn simhash(fp: &Fingerprint) -> SimHash {
    if fp.items.is_empty() {
        return SimHash(0);
    }
    let mut counts = [0i64; 32];
    for &item in &fp.items {
        for (bit, count) in counts.iter_mut().enumerate() {
            if (item >> bit) & 1 != 0 {
                *count += 1;
            } else {
                *count -= 1;
            }
        }
    }
    let mut value = 0u32;
    for (bit, &count) in counts.iter().enumerate() {
        if count >= 0 {
            value |= 1 << bit;
        }
    }
    SimHash(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Algorithm;

    fn fp(items: Vec<u32>) -> Fingerprint {
        Fingerprint::new(Algorithm::Algorithm1, items)
    }

    #[test]
    fn all_ones_items_yield_all_ones_simhash() {
        let hash = simhash(&fp(vec![0xFFFF_FFFF; 10]));
        assert_eq!(hash.0, 0xFFFF_FFFF);
    }

    #[test]
    fn all_zero_items_yield_zero_simhash() {
        let hash = simhash(&fp(vec![0x0000_0000; 10]));
        assert_eq!(hash.0, 0);
    }

    #[test]
    fn empty_fingerprint_is_zero() {
        let hash = simhash(&fp(vec![]));
        assert_eq!(hash.0, 0);
    }

    #[test]
    fn majority_bit_wins() {
        let hash = simhash(&fp(vec![0b1, 0b1, 0b0]));
        assert_eq!(hash.0 & 1, 1);
    }

    #[test]
    fn hamming_distance_is_symmetric() {
        let a = SimHash(0b1010);
        let b = SimHash(0b0110);
        assert_eq!(a.hamming_distance(b), b.hamming_distance(a));
    }
}

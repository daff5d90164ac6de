//! Contact pairs and the first-detection accumulator

use grainlink_core::io::ContactRecord;
use std::collections::HashMap;
use std::fmt;

/// Unordered pair of two distinct positive grain labels.
///
/// Stored canonically as `(low, high)` with `low < high`, so `(1, 2)` and
/// `(2, 1)` are the same pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContactPair {
    low: i32,
    high: i32,
}

impl ContactPair {
    /// Canonicalize two labels. Returns `None` for self pairs and for
    /// background or negative labels.
    pub fn new(a: i32, b: i32) -> Option<Self> {
        if a <= 0 || b <= 0 || a == b {
            return None;
        }
        Some(Self {
            low: a.min(b),
            high: a.max(b),
        })
    }

    /// The smaller label
    pub fn low(&self) -> i32 {
        self.low
    }

    /// The larger label
    pub fn high(&self) -> i32 {
        self.high
    }

    /// Both labels as `(low, high)`
    pub fn labels(&self) -> (i32, i32) {
        (self.low, self.high)
    }
}

impl fmt::Display for ContactPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

/// Map from contact pair to the level at which the pair was first detected.
///
/// Append-only: an entry is never updated or removed once recorded, so the
/// stored strength is always the first detection. Insertion order is kept
/// for export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactAccumulator {
    strengths: HashMap<ContactPair, usize>,
    order: Vec<ContactPair>,
}

impl ContactAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a contact between two labels.
    ///
    /// Returns `true` when the pair was not known before. Existing entries
    /// keep their strength; invalid pairs (self contact, background) are
    /// ignored.
    pub fn record(&mut self, a: i32, b: i32, strength: usize) -> bool {
        match ContactPair::new(a, b) {
            Some(pair) => self.record_pair(pair, strength),
            None => false,
        }
    }

    /// Record an already canonical pair, see [`ContactAccumulator::record`]
    pub fn record_pair(&mut self, pair: ContactPair, strength: usize) -> bool {
        if self.strengths.contains_key(&pair) {
            return false;
        }
        self.strengths.insert(pair, strength);
        self.order.push(pair);
        true
    }

    /// Strength of a pair, in either label order
    pub fn strength(&self, a: i32, b: i32) -> Option<usize> {
        ContactPair::new(a, b).and_then(|p| self.strengths.get(&p).copied())
    }

    pub fn contains(&self, pair: &ContactPair) -> bool {
        self.strengths.contains_key(pair)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate over `(pair, strength)` in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (ContactPair, usize)> + '_ {
        self.order.iter().map(move |p| (*p, self.strengths[p]))
    }

    /// Full pair → strength mapping as contact table rows, in insertion order
    pub fn export(&self) -> Vec<ContactRecord> {
        self.iter()
            .map(|(pair, strength)| ContactRecord {
                label1: pair.low(),
                label2: pair.high(),
                strength,
            })
            .collect()
    }

    /// The mapping itself, for order-insensitive comparisons
    pub fn as_map(&self) -> &HashMap<ContactPair, usize> {
        &self.strengths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_is_canonical() {
        let a = ContactPair::new(2, 1).unwrap();
        let b = ContactPair::new(1, 2).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.labels(), (1, 2));
        assert_eq!(a.to_string(), "1-2");
    }

    #[test]
    fn test_pair_rejects_invalid_labels() {
        assert!(ContactPair::new(3, 3).is_none());
        assert!(ContactPair::new(0, 3).is_none());
        assert!(ContactPair::new(3, -1).is_none());
    }

    #[test]
    fn test_record_order_does_not_matter() {
        let mut forward = ContactAccumulator::new();
        forward.record(1, 2, 5);
        let mut backward = ContactAccumulator::new();
        backward.record(2, 1, 5);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_first_write_wins() {
        let mut acc = ContactAccumulator::new();
        assert!(acc.record(1, 2, 3));
        assert!(!acc.record(1, 2, 7));
        assert!(!acc.record(2, 1, 1));
        assert_eq!(acc.strength(1, 2), Some(3));
        assert_eq!(acc.strength(2, 1), Some(3));
        assert_eq!(acc.len(), 1);
    }

    #[test]
    fn test_invalid_pairs_are_ignored() {
        let mut acc = ContactAccumulator::new();
        assert!(!acc.record(4, 4, 1));
        assert!(!acc.record(0, 4, 1));
        assert!(acc.is_empty());
    }

    #[test]
    fn test_export_keeps_insertion_order() {
        let mut acc = ContactAccumulator::new();
        acc.record(5, 3, 1);
        acc.record(1, 2, 1);
        acc.record(2, 9, 2);
        let rows = acc.export();
        assert_eq!(
            rows,
            vec![
                ContactRecord { label1: 3, label2: 5, strength: 1 },
                ContactRecord { label1: 1, label2: 2, strength: 1 },
                ContactRecord { label1: 2, label2: 9, strength: 2 },
            ]
        );
        assert!(rows.iter().all(|r| r.label1 < r.label2));
    }
}

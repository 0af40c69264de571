//! Unique-value extraction.
//!
//! A spreadsheet column with ten thousand rows often holds a handful of
//! distinct strings. Indexing each distinct value once, with the list of
//! positions it occupies, makes translation cost proportional to the number
//! of distinct values rather than the number of cells: translate each index
//! entry once, then broadcast the result back to every recorded position.

use std::collections::HashMap;

/// A distinct value and every position where it occurs.
#[derive(Debug)]
pub struct IndexEntry<P> {
    pub value: String,
    pub positions: Vec<P>,
}

/// Maps each distinct non-blank string to its occurrence positions,
/// preserving first-seen order.
///
/// First-seen iteration keeps provider call order (and therefore logs and
/// any rate-limit stalls) deterministic for a given input.
#[derive(Debug, Default)]
pub struct UniqueIndex<P> {
    entries: Vec<IndexEntry<P>>,
    by_value: HashMap<String, usize>,
}

impl<P> UniqueIndex<P> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            by_value: HashMap::new(),
        }
    }

    /// Record one occurrence of `value` at `position`.
    ///
    /// Blank values are the caller's responsibility to filter (see
    /// `CellValue::translatable`); the index treats every observed string
    /// as significant and keys it exactly, without normalization.
    pub fn observe(&mut self, value: &str, position: P) {
        if let Some(&i) = self.by_value.get(value) {
            self.entries[i].positions.push(position);
        } else {
            self.by_value.insert(value.to_string(), self.entries.len());
            self.entries.push(IndexEntry {
                value: value.to_string(),
                positions: vec![position],
            });
        }
    }

    /// Distinct values in first-seen order.
    pub fn entries(&self) -> &[IndexEntry<P>] {
        &self.entries
    }

    /// Number of distinct values observed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_collapse_into_one_entry() {
        let mut index = UniqueIndex::new();
        index.observe("แมว", 0);
        index.observe("หมา", 1);
        index.observe("แมว", 2);
        index.observe("แมว", 5);

        assert_eq!(index.len(), 2);
        assert_eq!(index.entries()[0].value, "แมว");
        assert_eq!(index.entries()[0].positions, vec![0, 2, 5]);
        assert_eq!(index.entries()[1].positions, vec![1]);
    }

    #[test]
    fn test_first_seen_order_is_preserved() {
        let mut index = UniqueIndex::new();
        for value in ["c", "a", "b", "a", "c"] {
            index.observe(value, ());
        }
        let order: Vec<&str> = index.entries().iter().map(|e| e.value.as_str()).collect();
        assert_eq!(order, ["c", "a", "b"]);
    }

    #[test]
    fn test_keys_are_exact() {
        let mut index = UniqueIndex::new();
        index.observe("A", 0);
        index.observe("a", 1);
        index.observe("a ", 2);
        assert_eq!(index.len(), 3);
    }
}

//! Combination registry
//!
//! Deduplicates combination keys, handing out identifiers in first-seen
//! order and counting how often each key occurs.

use std::collections::HashMap;

use crate::combine::key::CombinationKey;
use crate::errors::{CombineError, CombineResult};

/// Identifier and occurrence count of one key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Tally {
    identifier: u32,
    count: u64,
}

/// A registry entry as seen by readers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombinationRecord<'a> {
    pub key: &'a CombinationKey,
    pub identifier: u32,
    pub count: u64,
}

/// Every distinct combination seen so far
#[derive(Debug, Default)]
pub struct CombinationRegistry {
    records: HashMap<CombinationKey, Tally>,
    initial_id: u32,
    /// Wider than the identifier type so exhaustion can be detected
    next_id: u64,
    total: u64,
}

impl CombinationRegistry {
    /// An empty registry whose first identifier will be `initial_id`
    pub fn new(initial_id: u32) -> Self {
        CombinationRegistry {
            records: HashMap::new(),
            initial_id,
            next_id: initial_id as u64,
            total: 0,
        }
    }

    /// Counts one occurrence of `key` and returns its identifier
    ///
    /// A key seen for the first time is assigned the next identifier.
    pub fn lookup_or_insert(&mut self, key: &str) -> CombineResult<u32> {
        if let Some(tally) = self.records.get_mut(key) {
            tally.count += 1;
            self.total += 1;
            return Ok(tally.identifier);
        }

        let identifier = u32::try_from(self.next_id).map_err(|_| CombineError::Resource(format!(
            "identifier space exhausted after {} combinations starting at {}",
            self.records.len(), self.initial_id)))?;

        self.records.try_reserve(1).map_err(|e| CombineError::Resource(format!(
            "cannot grow the combination registry past {} entries: {}", self.records.len(), e)))?;
        self.records.insert(CombinationKey::from(key), Tally { identifier, count: 1 });

        self.next_id += 1;
        self.total += 1;
        Ok(identifier)
    }

    pub fn get(&self, key: &str) -> Option<CombinationRecord<'_>> {
        self.records.get_key_value(key).map(Self::record)
    }

    /// Number of distinct combinations
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn initial_id(&self) -> u32 {
        self.initial_id
    }

    /// The identifier the next new key would receive
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Sum of all counts, i.e. the number of pixels registered
    pub fn total_count(&self) -> u64 {
        self.total
    }

    /// All records, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = CombinationRecord<'_>> {
        self.records.iter().map(Self::record)
    }

    pub fn for_each<F>(&self, mut visit: F)
    where
        F: FnMut(CombinationRecord<'_>),
    {
        for record in self.iter() {
            visit(record);
        }
    }

    /// All records, ordered by identifier
    pub fn records_by_identifier(&self) -> Vec<CombinationRecord<'_>> {
        let mut records: Vec<_> = self.iter().collect();
        records.sort_unstable_by_key(|record| record.identifier);
        records
    }

    fn record<'a>((key, tally): (&'a CombinationKey, &'a Tally)) -> CombinationRecord<'a> {
        CombinationRecord {
            key,
            identifier: tally.identifier,
            count: tally.count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_follow_first_occurrence() {
        let mut registry = CombinationRegistry::new(10);
        assert_eq!(registry.lookup_or_insert("1,5").unwrap(), 10);
        assert_eq!(registry.lookup_or_insert("2,5").unwrap(), 11);
        assert_eq!(registry.lookup_or_insert("1,5").unwrap(), 10);
        assert_eq!(registry.lookup_or_insert("0,0").unwrap(), 12);

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.next_id(), 13);
        assert_eq!(registry.total_count(), 4);
        assert_eq!(registry.get("1,5").map(|r| r.count), Some(2));
        assert!(registry.get("9,9").is_none());
    }

    #[test]
    fn records_sort_by_identifier() {
        let mut registry = CombinationRegistry::default();
        for key in ["c", "a", "b", "a", "c", "c"] {
            registry.lookup_or_insert(key).unwrap();
        }

        let ordered: Vec<_> = registry.records_by_identifier()
            .into_iter()
            .map(|r| (r.identifier, r.key.as_str(), r.count))
            .collect();
        assert_eq!(ordered, vec![(0, "c", 3), (1, "a", 2), (2, "b", 1)]);

        let mut visited = 0;
        registry.for_each(|record| visited += record.count);
        assert_eq!(visited, registry.total_count());
    }

    #[test]
    fn exhausting_identifiers_is_a_resource_error() {
        let mut registry = CombinationRegistry::new(u32::MAX);
        assert_eq!(registry.lookup_or_insert("last").unwrap(), u32::MAX);
        assert_eq!(registry.lookup_or_insert("last").unwrap(), u32::MAX);

        let error = registry.lookup_or_insert("one too many").unwrap_err();
        assert!(matches!(error, CombineError::Resource(_)));
        assert_eq!(registry.len(), 1);
    }
}

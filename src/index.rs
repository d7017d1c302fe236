//! Key index - inverts "entry trusts keys" into "key verified entries"
//!
//! The index holds positions into the caller's entry slice rather than
//! entry copies, so the grouping engine can later mutate the entries it
//! points at. Keys iterate in sorted order, which makes rule emission
//! byte-reproducible across builds with identical inputs.

use crate::entry::VerificationEntry;
use std::collections::BTreeMap;

/// Mapping from trusted-key id to the Pgp entries that trust it.
#[derive(Debug, Default)]
pub struct KeyIndex {
    by_key: BTreeMap<String, Vec<usize>>,
}

impl KeyIndex {
    /// Build the index over a snapshot of entries. Checksum entries and
    /// Pgp entries with no trusted keys are excluded up front.
    pub fn build(entries: &[VerificationEntry]) -> Self {
        let mut by_key: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (position, entry) in entries.iter().enumerate() {
            let Some(pgp) = entry.as_pgp() else {
                continue;
            };
            if pgp.trusted_keys().is_empty() {
                continue;
            }
            for key_id in pgp.trusted_keys() {
                by_key.entry(key_id.clone()).or_default().push(position);
            }
        }
        KeyIndex { by_key }
    }

    /// Iterate keys in sorted order with the positions of their entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.by_key
            .iter()
            .map(|(key, positions)| (key.as_str(), positions.as_slice()))
    }

    pub fn entries_for(&self, key_id: &str) -> &[usize] {
        self.by_key.get(key_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

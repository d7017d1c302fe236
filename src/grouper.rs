//! Scope resolution engine - normalizes trusted keys into shared scopes
//!
//! For every key trusted by more than one artifact, this picks the most
//! specific scope all of those artifacts share (exact version, module,
//! group, or a common group prefix) and emits one rule there instead of N
//! artifact-level declarations.
//!
//! The result is less strict than keeping every trusted key at the
//! artifact level, but it significantly reduces the configuration size and
//! helps maintenance. That trade-off is intentional and visible: a rule is
//! only ever emitted at the narrowest scope that still covers every
//! contributing artifact, and grouping is all-or-nothing per key.

use crate::entry::{ArtifactScope, VerificationEntry};
use crate::index::KeyIndex;
use crate::sink::TrustedKeySink;
use tracing::debug;

/// Appended to a joined segment prefix: matches the prefix group itself,
/// or any descendant group below it, never a plain substring.
const GROUP_SUFFIX: &str = "($|([.].*))";

/// Groups per-artifact trusted-key declarations into broader rules.
///
/// Runs once per build, after verification has completed, over the full
/// entry snapshot. The only state it writes is each entry's
/// globally-declared-keys annotation.
pub struct KeyGrouper<'a, S: TrustedKeySink> {
    entries: &'a mut [VerificationEntry],
    sink: &'a mut S,
}

impl<'a, S: TrustedKeySink> KeyGrouper<'a, S> {
    pub fn new(entries: &'a mut [VerificationEntry], sink: &'a mut S) -> Self {
        KeyGrouper { entries, sink }
    }

    /// Run the grouping pass. Keys are visited in sorted order so rule
    /// emission is reproducible across builds with identical inputs.
    pub fn group_trusted_keys(&mut self) {
        let index = KeyIndex::build(self.entries);
        for (key_id, positions) in index.iter() {
            // a key trusted by a single entry is not worth normalizing
            // into a globally trusted key
            if positions.len() > 1 {
                self.group_key(key_id, positions);
            }
        }
    }

    fn group_key(&mut self, key_id: &str, positions: &[usize]) {
        if self.already_declared_globally(key_id, positions) {
            // a previous pass emitted a rule for this key; emitting again
            // would duplicate it
            return;
        }

        let scopes = self.distinct_scopes(positions);
        if scopes.len() == 1 {
            let scope = &scopes[0];
            debug!(
                "Trusting key {} for exact component {}:{}:{}",
                key_id,
                scope.group,
                scope.module_name.as_deref().unwrap_or(""),
                scope.version.as_deref().unwrap_or("")
            );
            self.sink.add_trusted_key(
                key_id,
                Some(scope.group.as_str()),
                scope.module_name.as_deref(),
                scope.version.as_deref(),
                false,
            );
            self.mark_key_declared_globally(key_id, positions);
            return;
        }

        let module_ids = distinct_module_ids(&scopes);
        if module_ids.len() == 1 {
            let (group, module_name) = &module_ids[0];
            debug!("Trusting key {} for module {}:{:?}", key_id, group, module_name);
            self.sink
                .add_trusted_key(key_id, Some(group.as_str()), module_name.as_deref(), None, false);
            self.mark_key_declared_globally(key_id, positions);
            return;
        }

        let groups = distinct_groups(&scopes);
        if groups.len() == 1 {
            debug!("Trusting key {} for group {}", key_id, groups[0]);
            self.sink
                .add_trusted_key(key_id, Some(groups[0].as_str()), None, None, false);
            self.mark_key_declared_globally(key_id, positions);
            return;
        }

        match common_group_prefix(&groups) {
            Some(pattern) => {
                debug!("Trusting key {} for group pattern {}", key_id, pattern);
                self.sink
                    .add_trusted_key(key_id, Some(pattern.as_str()), None, None, true);
                self.mark_key_declared_globally(key_id, positions);
            }
            None => {
                debug!(
                    "Key {} has no shared scope; keeping artifact-level declarations",
                    key_id
                );
            }
        }
    }

    fn already_declared_globally(&self, key_id: &str, positions: &[usize]) -> bool {
        positions
            .iter()
            .filter_map(|&p| self.entries[p].as_pgp())
            .all(|entry| entry.is_key_declared_globally(key_id))
    }

    /// Distinct full-precision scopes of the key's entries, in first-seen
    /// order.
    fn distinct_scopes(&self, positions: &[usize]) -> Vec<ArtifactScope> {
        let mut scopes: Vec<ArtifactScope> = Vec::new();
        for &position in positions {
            if let Some(pgp) = self.entries[position].as_pgp() {
                if !scopes.contains(pgp.scope()) {
                    scopes.push(pgp.scope().clone());
                }
            }
        }
        scopes
    }

    fn mark_key_declared_globally(&mut self, key_id: &str, positions: &[usize]) {
        for &position in positions {
            if let Some(pgp) = self.entries[position].as_pgp_mut() {
                pgp.mark_key_declared_globally(key_id);
            }
        }
    }
}

fn distinct_module_ids(scopes: &[ArtifactScope]) -> Vec<(String, Option<String>)> {
    let mut module_ids: Vec<(String, Option<String>)> = Vec::new();
    for scope in scopes {
        let module_id = (scope.group.clone(), scope.module_name.clone());
        if !module_ids.contains(&module_id) {
            module_ids.push(module_id);
        }
    }
    module_ids
}

fn distinct_groups(scopes: &[ArtifactScope]) -> Vec<String> {
    let mut groups: Vec<String> = Vec::new();
    for scope in scopes {
        if !groups.contains(&scope.group) {
            groups.push(scope.group.clone());
        }
    }
    groups
}

/// Finds the common super-group for a list of groups, as a pattern.
///
/// Given `["org.foo", "org.foo.bar", "org.foo.baz"]` this returns a
/// pattern covering `org.foo` and everything beneath it. The dot segments
/// of the prefix are joined with a literal-dot class and suffixed so the
/// pattern matches on segment boundaries only.
pub(crate) fn common_group_prefix(groups: &[String]) -> Option<String> {
    let mut split_groups: Vec<Vec<&str>> = groups
        .iter()
        .map(|group| group.split('.').collect())
        .collect();
    split_groups.sort_by_key(|segments| segments.len());
    let shortest = split_groups.first()?.clone();
    if shortest.len() < 2 {
        // we need at least a prefix of 2 segments, like "com.mycompany",
        // to perform grouping
        return None;
    }
    let mut common_len: Option<usize> = None;
    let mut prefix_len = 2;
    while prefix_len <= shortest.len() {
        let prefix = &shortest[..prefix_len];
        if split_groups
            .iter()
            .all(|candidate| candidate[..prefix_len] == *prefix)
        {
            common_len = Some(prefix_len);
            prefix_len += 1;
        } else {
            break;
        }
    }
    common_len.map(|len| format!("{}{}", shortest[..len].join("[.]"), GROUP_SUFFIX))
}

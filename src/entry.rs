//! Verification entry model - what was verified, and by which keys
//!
//! Entries are built upstream by the resolution/verification step, one per
//! artifact. This module only describes them; the grouping logic that
//! consumes them lives in `grouper`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Location of an artifact in the dependency namespace.
///
/// Precision is encoded by which fields are present: a bare group, a
/// group + module, or a fully pinned group + module + version. A version
/// without a module name is not representable through the constructors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactScope {
    /// Dot-segmented group, e.g. "com.example.foo"
    pub group: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ArtifactScope {
    /// Scope pinned to an exact (group, module, version) triple.
    pub fn for_version(
        group: impl Into<String>,
        module_name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        ArtifactScope {
            group: group.into(),
            module_name: Some(module_name.into()),
            version: Some(version.into()),
        }
    }

    /// Scope covering every version of one module.
    pub fn for_module(group: impl Into<String>, module_name: impl Into<String>) -> Self {
        ArtifactScope {
            group: group.into(),
            module_name: Some(module_name.into()),
            version: None,
        }
    }

    /// Scope covering a whole group.
    pub fn for_group(group: impl Into<String>) -> Self {
        ArtifactScope {
            group: group.into(),
            module_name: None,
            version: None,
        }
    }

    /// The module identity of this scope, with the version erased.
    pub fn module_id(&self) -> (&str, Option<&str>) {
        (&self.group, self.module_name.as_deref())
    }

    pub fn group(&self) -> &str {
        &self.group
    }
}

/// Checksum algorithms carried by non-PGP entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

/// A checksum-verified artifact. Present in the entry set the write path
/// hands around, but never touched by key grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumEntry {
    pub scope: ArtifactScope,
    pub algorithm: ChecksumAlgorithm,
    pub value: String,
}

/// A signature-verified artifact and the signing keys that verified it.
///
/// `trusted_keys` is written once upstream and never changes here.
/// `globally_declared_keys` records which of those keys have since been
/// subsumed by a broader trust rule; the writer omits them from this
/// entry's own output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PgpEntry {
    scope: ArtifactScope,
    trusted_keys: BTreeSet<String>,
    globally_declared_keys: BTreeSet<String>,
}

impl PgpEntry {
    pub fn new(scope: ArtifactScope, trusted_keys: impl IntoIterator<Item = String>) -> Self {
        PgpEntry {
            scope,
            trusted_keys: trusted_keys.into_iter().collect(),
            globally_declared_keys: BTreeSet::new(),
        }
    }

    pub fn scope(&self) -> &ArtifactScope {
        &self.scope
    }

    pub fn trusted_keys(&self) -> &BTreeSet<String> {
        &self.trusted_keys
    }

    /// Record that `key_id` is now covered by a broader rule.
    pub fn mark_key_declared_globally(&mut self, key_id: &str) {
        self.globally_declared_keys.insert(key_id.to_string());
    }

    pub fn is_key_declared_globally(&self, key_id: &str) -> bool {
        self.globally_declared_keys.contains(key_id)
    }

    /// Keys this entry still declares at the artifact level: trusted keys
    /// minus those subsumed by a broader rule. Sorted, for reproducible
    /// output.
    pub fn local_keys(&self) -> impl Iterator<Item = &str> {
        self.trusted_keys
            .iter()
            .filter(|k| !self.globally_declared_keys.contains(*k))
            .map(String::as_str)
    }
}

/// One verified artifact, tagged by verification kind.
///
/// The grouping engine only ever reads the `Pgp` variant; checksum entries
/// pass through the write path untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum VerificationEntry {
    Pgp(PgpEntry),
    Checksum(ChecksumEntry),
}

impl VerificationEntry {
    pub fn as_pgp(&self) -> Option<&PgpEntry> {
        match self {
            VerificationEntry::Pgp(entry) => Some(entry),
            VerificationEntry::Checksum(_) => None,
        }
    }

    pub fn as_pgp_mut(&mut self) -> Option<&mut PgpEntry> {
        match self {
            VerificationEntry::Pgp(entry) => Some(entry),
            VerificationEntry::Checksum(_) => None,
        }
    }
}

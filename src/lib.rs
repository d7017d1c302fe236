//! Keyscope - trusted-key scope normalization for dependency verification
//!
//! After signature verification, every artifact carries the set of signing
//! keys that verified it. Persisting one trust declaration per artifact
//! makes the verification metadata large and hard to maintain, so this
//! crate normalizes those declarations into the broadest safe shared scope:
//! exact version, module, group, or a common group prefix.
//!
//! Design principles:
//! - Most specific wins - a coarse rule is never emitted where a narrower
//!   one already covers every artifact
//! - All-or-nothing per key - either one rule covers all of a key's
//!   artifacts, or every artifact keeps its own declaration
//! - Deterministic output - keys are processed in sorted order so the
//!   emitted rules are byte-reproducible across builds

pub mod entry;
pub mod error;
pub mod grouper;
pub mod index;
pub mod sink;

pub use entry::{ArtifactScope, ChecksumEntry, PgpEntry, VerificationEntry};
pub use error::{NormalizeError, Result};
pub use grouper::KeyGrouper;
pub use index::KeyIndex;
pub use sink::{TrustRule, TrustedKeySink, VerificationConfig, VerificationConfigBuilder};

//! Trust rule output boundary
//!
//! The grouping engine emits generalized rules through the `TrustedKeySink`
//! trait; the surrounding write path decides how they are persisted. The
//! in-memory `VerificationConfigBuilder` here is the default sink: it
//! accumulates rules and then assembles them with the leftover per-artifact
//! declarations into one `VerificationConfig` value.

use crate::entry::{ArtifactScope, VerificationEntry};
use crate::error::{NormalizeError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One generalized trust declaration.
///
/// Exactly one specificity level is populated: exact module + version,
/// module only, literal group only, or a group-prefix regex (in which case
/// `group` holds the pattern and `regex_group` is set).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustRule {
    pub key_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default)]
    pub regex_group: bool,
}

impl TrustRule {
    /// Whether this rule's group component covers `group`.
    ///
    /// Literal rules compare for equality. Regex rules match anchored at
    /// the start of the string; the pattern's own suffix enforces the end
    /// anchor, so `com[.]example($|([.].*))` covers `com.example` and
    /// `com.example.foo` but not `com.examplebar`.
    pub fn matches_group(&self, group: &str) -> Result<bool> {
        let Some(own_group) = self.group.as_deref() else {
            return Ok(false);
        };
        if !self.regex_group {
            return Ok(own_group == group);
        }
        let anchored = format!("^{own_group}");
        let pattern = Regex::new(&anchored).map_err(|e| NormalizeError::InvalidGroupPattern {
            pattern: own_group.to_string(),
            source: e,
        })?;
        Ok(pattern.is_match(group))
    }
}

/// Receiver for generalized trust rules.
///
/// Mirrors the single operation the configuration writer exposes to the
/// grouping engine: which of group / module name / version are populated,
/// plus the regex flag, encode the rule's precedence level.
pub trait TrustedKeySink {
    fn add_trusted_key(
        &mut self,
        key_id: &str,
        group: Option<&str>,
        module_name: Option<&str>,
        version: Option<&str>,
        regex_group: bool,
    );
}

/// One key an artifact still declares for itself after grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactKeyDeclaration {
    pub scope: ArtifactScope,
    pub key_id: String,
}

/// The trusted-key section of the verification configuration: globally
/// trusted rules plus the per-artifact declarations grouping left behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationConfig {
    pub trusted_keys: Vec<TrustRule>,
    pub artifact_keys: Vec<ArtifactKeyDeclaration>,
}

impl VerificationConfig {
    /// Render as pretty JSON, for inspection and diffing. The persisted
    /// file format is owned by the surrounding writer, not this crate.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// In-memory sink accumulating the rules the grouping engine emits.
#[derive(Debug, Default)]
pub struct VerificationConfigBuilder {
    rules: Vec<TrustRule>,
}

impl VerificationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules accumulated so far, in emission order.
    pub fn rules(&self) -> &[TrustRule] {
        &self.rules
    }

    /// Assemble the accumulated rules with each entry's remaining local
    /// keys. Entries keep their input order; keys within an entry are
    /// sorted.
    pub fn build(self, entries: &[VerificationEntry]) -> VerificationConfig {
        let mut artifact_keys = Vec::new();
        for entry in entries {
            let Some(pgp) = entry.as_pgp() else {
                continue;
            };
            for key_id in pgp.local_keys() {
                artifact_keys.push(ArtifactKeyDeclaration {
                    scope: pgp.scope().clone(),
                    key_id: key_id.to_string(),
                });
            }
        }
        VerificationConfig {
            trusted_keys: self.rules,
            artifact_keys,
        }
    }
}

impl TrustedKeySink for VerificationConfigBuilder {
    fn add_trusted_key(
        &mut self,
        key_id: &str,
        group: Option<&str>,
        module_name: Option<&str>,
        version: Option<&str>,
        regex_group: bool,
    ) {
        self.rules.push(TrustRule {
            key_id: key_id.to_string(),
            group: group.map(str::to_string),
            module_name: module_name.map(str::to_string),
            version: version.map(str::to_string),
            regex_group,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::PgpEntry;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_literal_rule_matches_by_equality() {
        let rule = TrustRule {
            key_id: "AAAA".to_string(),
            group: Some("com.example".to_string()),
            module_name: None,
            version: None,
            regex_group: false,
        };
        assert!(rule.matches_group("com.example").unwrap());
        assert!(!rule.matches_group("com.example.foo").unwrap());
    }

    #[test]
    fn test_regex_rule_matches_prefix_and_descendants() {
        let rule = TrustRule {
            key_id: "AAAA".to_string(),
            group: Some("com[.]example($|([.].*))".to_string()),
            module_name: None,
            version: None,
            regex_group: true,
        };
        assert!(rule.matches_group("com.example").unwrap());
        assert!(rule.matches_group("com.example.foo").unwrap());
        assert!(rule.matches_group("com.example.foo.bar").unwrap());
        assert!(!rule.matches_group("com.examplebar").unwrap());
        assert!(!rule.matches_group("org.com.example").unwrap());
    }

    #[test]
    fn test_builder_collects_rules_and_leftovers() {
        let mut builder = VerificationConfigBuilder::new();
        builder.add_trusted_key("AAAA", Some("com.example"), None, None, false);

        let mut entry = PgpEntry::new(
            ArtifactScope::for_version("com.example", "lib", "1.0"),
            ["AAAA".to_string(), "BBBB".to_string()],
        );
        entry.mark_key_declared_globally("AAAA");
        let entries = vec![VerificationEntry::Pgp(entry)];

        let config = builder.build(&entries);
        assert_eq!(config.trusted_keys.len(), 1);
        assert_eq!(config.trusted_keys[0].group.as_deref(), Some("com.example"));
        assert_eq!(config.artifact_keys.len(), 1);
        assert_eq!(config.artifact_keys[0].key_id, "BBBB");
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = VerificationConfig {
            trusted_keys: vec![TrustRule {
                key_id: "AAAA".to_string(),
                group: Some("com[.]example($|([.].*))".to_string()),
                module_name: None,
                version: None,
                regex_group: true,
            }],
            artifact_keys: vec![],
        };
        let json = config.to_json_string().unwrap();
        let parsed: VerificationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}

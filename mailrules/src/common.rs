//! The neutral rule schema, stored as YAML.
//!
//! ```yaml
//! - name: Newsletters
//!   match:
//!     from: [news@example.org]
//!   label: Newsletters
//!   archive: true
//! ```

use serde::{Deserialize, Serialize};

use crate::error::RulesError;
use crate::format::{Codec, Format};
use crate::ruleset::{decode_records, encode_records, RuleSchema, Ruleset};
use crate::settings::Settings;

/// Criteria a message must meet. An empty list places no constraint on that
/// attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommonMatch {
    /// Sender domain must be one of these.
    #[serde(rename = "fromin", skip_serializing_if = "Vec::is_empty")]
    pub from_domain: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub from: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub to: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subject: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub body: Vec<String>,
    #[serde(rename = "list", skip_serializing_if = "Vec::is_empty")]
    pub mailing_list: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<String>,
}

impl CommonMatch {
    pub fn is_empty(&self) -> bool {
        self.from_domain.is_empty()
            && self.from.is_empty()
            && self.to.is_empty()
            && self.subject.is_empty()
            && self.body.is_empty()
            && self.mailing_list.is_empty()
            && self.headers.is_empty()
    }
}

/// One filter in the neutral schema.
///
/// The three flags are tri-state: `None` leaves the provider default alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommonRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "match")]
    pub matches: CommonMatch,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mark_read: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<bool>,
}

pub type CommonRuleset = Ruleset<CommonRule>;

impl RuleSchema for CommonRuleset {
    type Rule = CommonRule;

    const FORMAT: Format = Format::Common;
    const CODEC: Codec = Codec::Yaml;
    const DEFAULT_FILENAME: &'static str = "rules.yaml";
    const SUFFIX: &'static str = ".yaml";

    fn decode(bytes: &[u8]) -> Result<Self, RulesError> {
        decode_records(Self::FORMAT, Self::CODEC, bytes).map(Ruleset::new)
    }

    fn encode(&self) -> Result<Vec<u8>, RulesError> {
        encode_records(Self::FORMAT, Self::CODEC, &self.rules)
    }

    fn rules(&self) -> &[CommonRule] {
        &self.rules
    }

    fn from_common_ruleset(common: &CommonRuleset, _settings: &Settings) -> Self {
        common.clone()
    }

    fn convert_to_common(&self) -> Result<CommonRuleset, RulesError> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use super::*;

    fn fixture(path: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join(path)
    }

    #[test]
    fn loads_fixture_including_null_record() {
        let ruleset = CommonRuleset::load(Some(&fixture("fixtures/rules.common.yaml")))
            .expect("load fixture");
        assert_eq!(ruleset.rules.len(), 4);

        let first = &ruleset.rules[0];
        assert_eq!(first.name.as_deref(), Some("Newsletters"));
        assert_eq!(
            first.matches.from,
            vec!["news@example.org", "digest@example.org"]
        );
        assert_eq!(first.archive, Some(true));
        assert_eq!(first.mark_read, None);

        assert_eq!(ruleset.rules[1].mark_read, Some(false));
        assert_eq!(ruleset.rules[2], CommonRule::default());
        assert_eq!(ruleset.rules[3].matches.from_domain, vec!["shop.example.com"]);
        assert_eq!(ruleset.rules[3].matches.mailing_list, vec!["receipts.example.com"]);
    }

    #[test]
    fn save_then_load_is_lossless() {
        let original = CommonRuleset::load(Some(&fixture("fixtures/rules.common.yaml")))
            .expect("load fixture");
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("rules.yaml");

        original.save(Some(&out)).expect("save");
        let reloaded = CommonRuleset::load(Some(&out)).expect("reload");
        assert_eq!(original, reloaded);

        // Saving the reloaded copy produces identical bytes.
        let again = dir.path().join("again.yaml");
        reloaded.save(Some(&again)).expect("save again");
        assert_eq!(
            std::fs::read(&out).expect("read first"),
            std::fs::read(&again).expect("read second")
        );
    }

    #[test]
    fn conversion_to_common_is_identity() {
        let ruleset = CommonRuleset::new(vec![CommonRule {
            name: Some("x".to_string()),
            notify: Some(false),
            ..CommonRule::default()
        }]);
        assert_eq!(ruleset.convert_to_common().expect("identity"), ruleset);
    }

    #[test]
    fn duplicate_match_values_are_preserved() {
        let ruleset =
            CommonRuleset::decode(b"- match:\n    to: [a@x.com, a@x.com]\n").expect("decode");
        assert_eq!(ruleset.rules[0].matches.to, vec!["a@x.com", "a@x.com"]);
        assert!(ruleset.rules[0].name.is_none());
    }

    #[test]
    fn unset_flags_are_not_written() {
        let ruleset = CommonRuleset::new(vec![CommonRule {
            name: Some("only name".to_string()),
            ..CommonRule::default()
        }]);
        let text = String::from_utf8(ruleset.encode().expect("encode")).expect("utf8");
        assert!(!text.contains("archive"));
        assert!(!text.contains("mark_read"));
        assert!(text.contains("name: only name"));
    }
}

//! Fastmail mail rules, as a flat JSON array (`mailrules.json`).
//!
//! Fastmail has a single `fileIn` target for both folders and labels, and
//! plain booleans for every action, so unset common flags become `false`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{CommonRule, CommonRuleset};
use crate::error::RulesError;
use crate::format::{Codec, Format};
use crate::query::{fastmail_search, parse_search};
use crate::ruleset::{decode_records, encode_records, RuleSchema, Ruleset};
use crate::settings::Settings;

/// One Fastmail routing rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FastmailRule {
    pub name: String,

    /// `any` or `all`.
    pub combinator: String,
    pub search: String,
    pub conditions: Option<Value>,
    pub previous_file_in_name: Option<String>,

    /// Folder or label.
    pub file_in: Option<String>,
    pub discard: bool,
    pub redirect_to: Option<Vec<String>>,
    pub snooze_until: Option<Value>,

    pub mark_flagged: bool,
    pub mark_read: bool,
    pub mark_spam: bool,
    pub show_notification: bool,
    /// Archive.
    pub skip_inbox: bool,

    /// Stop evaluating later rules.
    pub stop: bool,

    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Default for FastmailRule {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            name: String::new(),
            combinator: "any".to_string(),
            search: String::new(),
            conditions: None,
            previous_file_in_name: None,
            file_in: None,
            discard: false,
            redirect_to: None,
            snooze_until: None,
            mark_flagged: false,
            mark_read: false,
            mark_spam: false,
            show_notification: false,
            skip_inbox: false,
            stop: false,
            created: now,
            updated: now,
        }
    }
}

impl FastmailRule {
    /// Build a rule from one common rule.
    pub fn from_common_rule(rule: &CommonRule) -> Self {
        let name = rule.name.clone().unwrap_or_default();
        if let (Some(folder), Some(label)) = (&rule.folder, &rule.label) {
            log::warn!(
                "rule '{name}': fastmail files into one target; using folder '{folder}' and dropping label '{label}'"
            );
        }

        Self {
            combinator: "any".to_string(),
            search: fastmail_search(&rule.matches),
            file_in: rule.folder.clone().or_else(|| rule.label.clone()),
            redirect_to: rule.redirect.clone(),
            mark_read: rule.mark_read.unwrap_or(false),
            show_notification: rule.notify.unwrap_or(false),
            skip_inbox: rule.archive.unwrap_or(false),
            name,
            ..Self::default()
        }
    }

    /// Lower this rule into a common rule, warning about anything dropped.
    pub fn to_common_rule(&self) -> CommonRule {
        self.warn_dropped();

        CommonRule {
            name: (!self.name.is_empty()).then(|| self.name.clone()),
            matches: parse_search(&self.search),
            folder: self.file_in.clone(),
            redirect: self.redirect_to.clone(),
            mark_read: Some(self.mark_read),
            notify: Some(self.show_notification),
            archive: Some(self.skip_inbox),
            ..CommonRule::default()
        }
    }

    fn warn_dropped(&self) {
        let dropped = [
            ("discard", self.discard),
            ("markFlagged", self.mark_flagged),
            ("markSpam", self.mark_spam),
            ("stop", self.stop),
            ("conditions", self.conditions.is_some()),
            ("snoozeUntil", self.snooze_until.is_some()),
        ];
        for (field, present) in dropped {
            if present {
                log::warn!(
                    "rule '{}': {field} has no common equivalent; dropping it",
                    self.name
                );
            }
        }
        if self.combinator != "any" {
            log::warn!(
                "rule '{}': combinator '{}' is not preserved; common rules always match any clause",
                self.name,
                self.combinator
            );
        }
    }
}

pub type FastmailRuleset = Ruleset<FastmailRule>;

impl RuleSchema for FastmailRuleset {
    type Rule = FastmailRule;

    const FORMAT: Format = Format::Fastmail;
    const CODEC: Codec = Codec::Json;
    const DEFAULT_FILENAME: &'static str = "mailrules.json";
    const SUFFIX: &'static str = ".json";

    fn decode(bytes: &[u8]) -> Result<Self, RulesError> {
        decode_records(Self::FORMAT, Self::CODEC, bytes).map(Ruleset::new)
    }

    fn encode(&self) -> Result<Vec<u8>, RulesError> {
        encode_records(Self::FORMAT, Self::CODEC, &self.rules)
    }

    fn rules(&self) -> &[FastmailRule] {
        &self.rules
    }

    fn from_common_ruleset(common: &CommonRuleset, _settings: &Settings) -> Self {
        Ruleset::new(
            common
                .rules
                .iter()
                .map(FastmailRule::from_common_rule)
                .collect(),
        )
    }

    fn convert_to_common(&self) -> Result<CommonRuleset, RulesError> {
        Ok(Ruleset::new(
            self.rules.iter().map(FastmailRule::to_common_rule).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::common::CommonMatch;

    fn fixture(path: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join(path)
    }

    #[test]
    fn loads_fixture_with_partial_records() {
        let ruleset = FastmailRuleset::load(Some(&fixture("fixtures/mailrules.fastmail.json")))
            .expect("load fixture");
        assert_eq!(ruleset.rules.len(), 2);

        let first = &ruleset.rules[0];
        assert_eq!(first.file_in.as_deref(), Some("Receipts"));
        assert!(first.mark_read && first.skip_inbox && first.stop);
        assert_eq!(
            first.created,
            Utc.with_ymd_and_hms(2023, 1, 5, 10, 0, 0).unwrap()
        );

        let second = &ruleset.rules[1];
        assert_eq!(second.redirect_to, Some(vec!["me@example.net".to_string()]));
        assert_eq!(second.combinator, "any");
        assert!(!second.discard);
        assert_eq!(second.file_in, None);
    }

    #[test]
    fn from_common_uses_any_combinator_and_stub_search() {
        let rule = CommonRule {
            name: Some("Family".to_string()),
            matches: CommonMatch {
                to: vec!["family@example.com".to_string()],
                ..CommonMatch::default()
            },
            label: Some("Family".to_string()),
            redirect: Some(vec!["me@example.net".to_string()]),
            archive: Some(true),
            ..CommonRule::default()
        };

        let fastmail = FastmailRule::from_common_rule(&rule);
        assert_eq!(fastmail.name, "Family");
        assert_eq!(fastmail.combinator, "any");
        assert_eq!(fastmail.search, "");
        assert_eq!(fastmail.file_in.as_deref(), Some("Family"));
        assert_eq!(fastmail.redirect_to, Some(vec!["me@example.net".to_string()]));
        assert!(fastmail.skip_inbox);
        assert!(!fastmail.mark_read);
        assert!(!fastmail.show_notification);
        assert!(!fastmail.stop);
    }

    #[test]
    fn folder_wins_over_label() {
        let rule = CommonRule {
            folder: Some("Folder".to_string()),
            label: Some("Label".to_string()),
            ..CommonRule::default()
        };
        assert_eq!(
            FastmailRule::from_common_rule(&rule).file_in.as_deref(),
            Some("Folder")
        );
    }

    #[test]
    fn convert_to_common_parses_search_and_sets_explicit_flags() {
        let ruleset = FastmailRuleset::load(Some(&fixture("fixtures/mailrules.fastmail.json")))
            .expect("load fixture");
        let common = ruleset.convert_to_common().expect("convert");

        let first = &common.rules[0];
        assert_eq!(first.name.as_deref(), Some("Receipts"));
        assert_eq!(first.matches.from, vec!["receipts@shop.example.com"]);
        assert_eq!(first.matches.subject, vec!["your order"]);
        assert_eq!(first.folder.as_deref(), Some("Receipts"));
        assert_eq!(first.mark_read, Some(true));
        assert_eq!(first.archive, Some(true));
        assert_eq!(first.notify, Some(false));

        assert_eq!(common.rules[1].matches.to, vec!["family@example.com"]);
    }

    #[test]
    fn encodes_camel_case_fields_with_nulls() {
        let ruleset = FastmailRuleset::new(vec![FastmailRule {
            name: "x".to_string(),
            ..FastmailRule::default()
        }]);
        let text = String::from_utf8(ruleset.encode().expect("encode")).expect("utf8");
        assert!(text.contains("\"skipInbox\": false"));
        assert!(text.contains("\"previousFileInName\": null"));
        assert!(text.contains("\"combinator\": \"any\""));
    }

    #[test]
    fn save_and_reload_preserves_rules() {
        let original = FastmailRuleset::load(Some(&fixture("fixtures/mailrules.fastmail.json")))
            .expect("load fixture");
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("mailrules.json");

        original.save(Some(&out)).expect("save");
        assert_eq!(FastmailRuleset::load(Some(&out)).expect("reload"), original);
    }

    #[test]
    fn null_entry_decodes_to_default_rule() {
        let ruleset = FastmailRuleset::decode(b"[null]").expect("decode");
        assert_eq!(ruleset.rules.len(), 1);
        assert_eq!(ruleset.rules[0].name, "");
        assert_eq!(ruleset.rules[0].combinator, "any");
    }
}

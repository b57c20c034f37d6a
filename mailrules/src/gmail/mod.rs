//! Gmail filters, as exported from Gmail's "Filters and Blocked Addresses"
//! settings page.
//!
//! The export is an Atom feed: a header (title, id list, updated time,
//! author) wrapping one `<entry>` per filter. Every filter attribute lives in
//! an `apps:property` name/value pair; see [`feed`] for the XML mapping.
//!
//! ## Conversion from the common model
//!
//! - Filter ids are synthesised from the rule name with BLAKE2b-32 (see
//!   [`filter_id`]), so re-exporting the same rules yields the same ids.
//! - `label` maps directly. `archive` and `mark_read` map to
//!   `shouldArchive` and `shouldMarkAsRead` only when set.
//! - Match criteria become a single `hasTheWord` query built by
//!   [`gmail_search`].
//!
//! ## Conversion to the common model
//!
//! `doesNotHaveTheWord`, the spam and importance flags, and size filters have
//! no common equivalent and are dropped with a warning.

pub mod feed;

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use blake2::digest::consts::U4;
use blake2::{Blake2b, Digest};
use chrono::{DateTime, Utc};

use crate::common::{CommonRule, CommonRuleset};
use crate::error::RulesError;
use crate::format::{Codec, Format};
use crate::query::{gmail_search, parse_search, parse_values};
use crate::ruleset::{RuleSchema, Ruleset};
use crate::settings::Settings;

/// Size comparison for a size filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SizeOperator {
    Smaller,
    #[default]
    Larger,
}

impl SizeOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            SizeOperator::Smaller => "s_ss",
            SizeOperator::Larger => "s_sl",
        }
    }
}

impl FromStr for SizeOperator {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "s_ss" => Ok(SizeOperator::Smaller),
            "s_sl" => Ok(SizeOperator::Larger),
            other => Err(format!("unknown size operator '{other}'")),
        }
    }
}

impl Display for SizeOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit for a size filter threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SizeUnit {
    Bytes,
    Kilobytes,
    #[default]
    Megabytes,
}

impl SizeUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            SizeUnit::Bytes => "s_sb",
            SizeUnit::Kilobytes => "s_skb",
            SizeUnit::Megabytes => "s_smb",
        }
    }
}

impl FromStr for SizeUnit {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "s_sb" => Ok(SizeUnit::Bytes),
            "s_skb" => Ok(SizeUnit::Kilobytes),
            "s_smb" => Ok(SizeUnit::Megabytes),
            other => Err(format!("unknown size unit '{other}'")),
        }
    }
}

impl Display for SizeUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One Gmail filter.
#[derive(Debug, Clone, PartialEq)]
pub struct GmailRule {
    pub title: Option<String>,
    pub id: Option<String>,
    pub updated: DateTime<Utc>,

    pub from: Option<String>,
    pub subject: Option<String>,
    pub to: Option<String>,
    pub has_the_word: Option<String>,
    pub does_not_have_the_word: Option<String>,

    pub label: Option<String>,

    pub should_archive: Option<bool>,
    pub should_mark_as_read: Option<bool>,
    pub should_never_spam: Option<bool>,
    pub should_always_mark_as_important: Option<bool>,
    pub should_never_mark_as_important: Option<bool>,

    /// Threshold in `size_unit`; Gmail accepts fractional values.
    pub size: Option<f64>,
    pub size_operator: SizeOperator,
    pub size_unit: SizeUnit,
}

impl Default for GmailRule {
    fn default() -> Self {
        Self {
            title: None,
            id: None,
            updated: Utc::now(),
            from: None,
            subject: None,
            to: None,
            has_the_word: None,
            does_not_have_the_word: None,
            label: None,
            should_archive: None,
            should_mark_as_read: None,
            should_never_spam: None,
            should_always_mark_as_important: None,
            should_never_mark_as_important: None,
            size: None,
            size_operator: SizeOperator::default(),
            size_unit: SizeUnit::default(),
        }
    }
}

impl GmailRule {
    /// Build a filter from one common rule.
    pub fn from_common_rule(rule: &CommonRule, updated: DateTime<Utc>) -> Self {
        let name = rule.name.as_deref().unwrap_or_default();
        let query = gmail_search(&rule.matches);

        Self {
            title: rule.name.clone(),
            id: Some(filter_id(name).to_string()),
            updated,
            label: rule.label.clone().filter(|label| !label.is_empty()),
            should_archive: rule.archive,
            should_mark_as_read: rule.mark_read,
            has_the_word: (!query.is_empty()).then_some(query),
            ..Self::default()
        }
    }

    /// Lower this filter into a common rule, warning about anything dropped.
    pub fn to_common_rule(&self) -> CommonRule {
        let name = self.common_name();
        self.warn_dropped(name.as_deref().unwrap_or("untitled"));

        let mut matches = self
            .has_the_word
            .as_deref()
            .map(parse_search)
            .unwrap_or_default();
        extend_field(&mut matches.from, self.from.as_deref());
        extend_field(&mut matches.to, self.to.as_deref());
        extend_field(&mut matches.subject, self.subject.as_deref());

        CommonRule {
            name,
            matches,
            label: self.label.clone(),
            archive: self.should_archive,
            mark_read: self.should_mark_as_read,
            ..CommonRule::default()
        }
    }

    /// Gmail titles every exported entry with the same placeholder, so a
    /// placeholder or missing title is replaced by one built from the entry
    /// id. Otherwise every rule would hash to the same id on the way back.
    fn common_name(&self) -> Option<String> {
        match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() && title != feed::DEFAULT_ENTRY_TITLE => {
                Some(title.to_string())
            }
            _ => self
                .id
                .as_ref()
                .map(|id| format!("{} {id}", feed::DEFAULT_ENTRY_TITLE))
                .or_else(|| self.title.clone()),
        }
    }

    fn warn_dropped(&self, name: &str) {
        let dropped = [
            ("doesNotHaveTheWord", self.does_not_have_the_word.is_some()),
            ("shouldNeverSpam", self.should_never_spam.is_some()),
            (
                "shouldAlwaysMarkAsImportant",
                self.should_always_mark_as_important.is_some(),
            ),
            (
                "shouldNeverMarkAsImportant",
                self.should_never_mark_as_important.is_some(),
            ),
            ("size", self.size.is_some()),
        ];
        for (property, present) in dropped {
            if present {
                log::warn!("filter '{name}': {property} has no common equivalent; dropping it");
            }
        }
    }
}

fn extend_field(values: &mut Vec<String>, raw: Option<&str>) {
    if let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) {
        values.extend(parse_values(raw));
    }
}

/// Author block of the feed header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedAuthor {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Feed-level metadata wrapping the filter entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedHeader {
    pub title: Option<String>,
    pub ids: Vec<String>,
    pub updated: DateTime<Utc>,
    pub author: FeedAuthor,
}

impl Default for FeedHeader {
    fn default() -> Self {
        Self {
            title: None,
            ids: Vec::new(),
            updated: Utc::now(),
            author: FeedAuthor::default(),
        }
    }
}

pub type GmailRuleset = Ruleset<GmailRule, FeedHeader>;

impl RuleSchema for GmailRuleset {
    type Rule = GmailRule;

    const FORMAT: Format = Format::Gmail;
    const CODEC: Codec = Codec::Xml;
    const DEFAULT_FILENAME: &'static str = "mailFilters.xml";
    const SUFFIX: &'static str = ".xml";

    fn decode(bytes: &[u8]) -> Result<Self, RulesError> {
        let root = feed_xml::parse(bytes).map_err(|e| RulesError::decode(Self::FORMAT, e))?;
        feed::ruleset_from_feed(&root)
    }

    fn encode(&self) -> Result<Vec<u8>, RulesError> {
        feed_xml::write(&feed::ruleset_to_feed(self))
            .map_err(|e| RulesError::encode(Self::FORMAT, e))
    }

    fn rules(&self) -> &[GmailRule] {
        &self.rules
    }

    fn from_common_ruleset(common: &CommonRuleset, settings: &Settings) -> Self {
        let updated = Utc::now();
        let rules: Vec<GmailRule> = common
            .rules
            .iter()
            .map(|rule| GmailRule::from_common_rule(rule, updated))
            .collect();
        let ids = rules.iter().filter_map(|rule| rule.id.clone()).collect();

        Ruleset {
            header: FeedHeader {
                title: Some(settings.feed.title.clone()),
                ids,
                updated,
                author: FeedAuthor {
                    name: Some(settings.feed.author_name.clone()),
                    email: Some(settings.feed.author_email.clone()),
                },
            },
            rules,
        }
    }

    fn convert_to_common(&self) -> Result<CommonRuleset, RulesError> {
        Ok(Ruleset::new(
            self.rules.iter().map(GmailRule::to_common_rule).collect(),
        ))
    }
}

/// Stable filter id for a rule name: the BLAKE2b digest with a 4-byte output
/// length, read as a big-endian integer.
pub fn filter_id(name: &str) -> u32 {
    let digest = Blake2b::<U4>::digest(name.as_bytes());
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&digest);
    u32::from_be_bytes(bytes)
}

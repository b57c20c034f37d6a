//! Mapping between [`GmailRuleset`] and Gmail's Atom filter feed.
//!
//! ```xml
//! <feed xmlns="http://www.w3.org/2005/Atom" xmlns:apps="http://schemas.google.com/apps/2006">
//!   <title>Mail Filters</title>
//!   <id>tag:mail.google.com,2008:filters:1455140012356,1455140089987</id>
//!   <updated>2023-04-02T17:21:43Z</updated>
//!   <author><name>..</name><email>..</email></author>
//!   <entry>
//!     <category term="filter"/>
//!     <title>Mail Filter</title>
//!     <id>tag:mail.google.com,2008:filter:1455140012356</id>
//!     <updated>2023-04-02T17:21:43Z</updated>
//!     <content/>
//!     <apps:property name="label" value="Newsletters"/>
//!   </entry>
//! </feed>
//! ```

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use feed_xml::XmlNode;

use super::{FeedAuthor, FeedHeader, GmailRule, GmailRuleset};
use crate::error::RulesError;
use crate::format::Format;
use crate::ruleset::Ruleset;

pub const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
pub const APPS_NS: &str = "http://schemas.google.com/apps/2006";

/// Prefix of a single entry id.
pub const ENTRY_ID: PrefixMapper = PrefixMapper::new("tag:mail.google.com,2008:filter:");
/// Prefix of the feed-level id list.
pub const FEED_IDS: PrefixMapper = PrefixMapper::new("tag:mail.google.com,2008:filters:");

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
/// Title Gmail gives every exported entry.
pub(crate) const DEFAULT_ENTRY_TITLE: &str = "Mail Filter";
const PROPERTY_TAG: &str = "apps:property";

/// Maps id values to and from their prefixed text form.
///
/// Nothing maps to an empty string, one value to `prefix + value`, several
/// values to `prefix + comma-joined values`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixMapper {
    prefix: &'static str,
}

impl PrefixMapper {
    pub const fn new(prefix: &'static str) -> Self {
        Self { prefix }
    }

    pub fn to_xml(&self, values: &[String]) -> String {
        if values.is_empty() {
            return String::new();
        }
        format!("{}{}", self.prefix, values.join(","))
    }

    pub fn to_values(&self, text: Option<&str>) -> Vec<String> {
        let Some(text) = text else {
            return Vec::new();
        };
        let value = text.strip_prefix(self.prefix).unwrap_or(text);
        if value.is_empty() {
            return Vec::new();
        }
        if value.contains(',') {
            return value.split(',').map(str::to_string).collect();
        }
        vec![value.to_string()]
    }
}

/// Decode a parsed feed document.
pub fn ruleset_from_feed(root: &XmlNode) -> Result<GmailRuleset, RulesError> {
    if root.local_name() != "feed" {
        return Err(decode_error(format!(
            "expected a <feed> root element, found <{}>",
            root.tag
        )));
    }

    let header = FeedHeader {
        title: root.get_text(&["title"]).map(str::to_string),
        ids: FEED_IDS.to_values(root.get_text(&["id"])),
        updated: parse_updated(root.get_text(&["updated"]))?,
        author: FeedAuthor {
            name: root.get_text(&["author", "name"]).map(str::to_string),
            email: root.get_text(&["author", "email"]).map(str::to_string),
        },
    };

    let rules = root
        .get_children("entry")
        .map(rule_from_entry)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Ruleset { header, rules })
}

/// Build the feed document for a ruleset.
pub fn ruleset_to_feed(ruleset: &GmailRuleset) -> XmlNode {
    let header = &ruleset.header;
    let mut author = XmlNode::new("author");
    if let Some(name) = &header.author.name {
        author.children.push(XmlNode::new("name").with_text(name));
    }
    if let Some(email) = &header.author.email {
        author.children.push(XmlNode::new("email").with_text(email));
    }

    let mut feed = XmlNode::new("feed")
        .with_attr("xmlns", ATOM_NS)
        .with_attr("xmlns:apps", APPS_NS)
        .with_child(text_node("title", header.title.as_deref().unwrap_or_default()))
        .with_child(text_node("id", &FEED_IDS.to_xml(&header.ids)))
        .with_child(text_node("updated", &format_timestamp(&header.updated)))
        .with_child(author);

    feed.children.extend(ruleset.rules.iter().map(entry_from_rule));
    feed
}

fn rule_from_entry(entry: &XmlNode) -> Result<GmailRule, RulesError> {
    let mut rule = GmailRule {
        title: entry.get_text(&["title"]).map(str::to_string),
        id: ENTRY_ID
            .to_values(entry.get_text(&["id"]))
            .into_iter()
            .next(),
        updated: parse_updated(entry.get_text(&["updated"]))?,
        ..GmailRule::default()
    };

    for property in entry.get_children("property") {
        let name = property.attr("name").unwrap_or_default();
        let value = property.attr("value").unwrap_or_default();
        apply_property(&mut rule, name, value)?;
    }

    Ok(rule)
}

fn apply_property(rule: &mut GmailRule, name: &str, value: &str) -> Result<(), RulesError> {
    let text = || Some(value.to_string());
    match name {
        "from" => rule.from = text(),
        "subject" => rule.subject = text(),
        "to" => rule.to = text(),
        "hasTheWord" => rule.has_the_word = text(),
        "doesNotHaveTheWord" => rule.does_not_have_the_word = text(),
        "label" => rule.label = text(),
        "shouldArchive" => rule.should_archive = Some(parse_bool(name, value)?),
        "shouldMarkAsRead" => rule.should_mark_as_read = Some(parse_bool(name, value)?),
        "shouldNeverSpam" => rule.should_never_spam = Some(parse_bool(name, value)?),
        "shouldAlwaysMarkAsImportant" => {
            rule.should_always_mark_as_important = Some(parse_bool(name, value)?)
        }
        "shouldNeverMarkAsImportant" => {
            rule.should_never_mark_as_important = Some(parse_bool(name, value)?)
        }
        "size" => {
            let size = value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|size| size.is_finite() && *size >= 0.0)
                .ok_or_else(|| decode_error(format!("invalid size '{value}'")))?;
            rule.size = Some(size);
        }
        "sizeOperator" => rule.size_operator = value.parse().map_err(decode_error)?,
        "sizeUnit" => rule.size_unit = value.parse().map_err(decode_error)?,
        other => log::debug!("ignoring unsupported gmail filter property '{other}'"),
    }
    Ok(())
}

fn entry_from_rule(rule: &GmailRule) -> XmlNode {
    let mut entry = XmlNode::new("entry")
        .with_child(XmlNode::new("category").with_attr("term", "filter"))
        .with_child(text_node(
            "title",
            rule.title.as_deref().unwrap_or(DEFAULT_ENTRY_TITLE),
        ))
        .with_child(text_node("id", &ENTRY_ID.to_xml(rule.id.as_slice())))
        .with_child(text_node("updated", &format_timestamp(&rule.updated)))
        .with_child(XmlNode::new("content"));

    entry
        .children
        .extend(properties(rule).into_iter().map(|(name, value)| {
            XmlNode::new(PROPERTY_TAG)
                .with_attr("name", name)
                .with_attr("value", value)
        }));
    entry
}

/// Non-empty rule attributes as name/value pairs, in the order Gmail
/// declares them.
pub fn properties(rule: &GmailRule) -> Vec<(&'static str, String)> {
    let text = |value: &Option<String>| value.clone();
    let flag = |value: Option<bool>| value.map(|v| v.to_string());

    [
        ("from", text(&rule.from)),
        ("subject", text(&rule.subject)),
        ("to", text(&rule.to)),
        ("hasTheWord", text(&rule.has_the_word)),
        ("doesNotHaveTheWord", text(&rule.does_not_have_the_word)),
        ("label", text(&rule.label)),
        ("shouldArchive", flag(rule.should_archive)),
        ("shouldMarkAsRead", flag(rule.should_mark_as_read)),
        ("shouldNeverSpam", flag(rule.should_never_spam)),
        (
            "shouldAlwaysMarkAsImportant",
            flag(rule.should_always_mark_as_important),
        ),
        (
            "shouldNeverMarkAsImportant",
            flag(rule.should_never_mark_as_important),
        ),
        ("size", rule.size.map(|size| size.to_string())),
        ("sizeOperator", Some(rule.size_operator.to_string())),
        ("sizeUnit", Some(rule.size_unit.to_string())),
    ]
    .into_iter()
    .filter_map(|(name, value)| value.map(|value| (name, value)))
    .collect()
}

fn text_node(tag: &str, text: &str) -> XmlNode {
    let node = XmlNode::new(tag);
    if text.is_empty() {
        return node;
    }
    node.with_text(text)
}

fn parse_bool(name: &str, value: &str) -> Result<bool, RulesError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(decode_error(format!("invalid boolean for {name}: '{value}'"))),
    }
}

pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse an `updated` value; absent values default to now.
pub fn parse_updated(value: Option<&str>) -> Result<DateTime<Utc>, RulesError> {
    let Some(value) = value.map(str::trim) else {
        return Ok(Utc::now());
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|_| decode_error(format!("invalid timestamp '{value}'")))
}

fn decode_error(message: String) -> RulesError {
    RulesError::decode(Format::Gmail, message)
}

//! Provider search strings derived from structured match criteria.
//!
//! Gmail queries are whitespace-AND with `{a b}` OR-groups. Clauses built
//! from different fields are joined with [`CLAUSE_SEPARATOR`], so separate
//! fields are alternatives rather than all required. Changing that only means
//! changing the separator here.

use crate::common::CommonMatch;

/// Joins per-field clauses in a generated query.
pub const CLAUSE_SEPARATOR: &str = " OR ";

/// Prefixed fields, in the order they are rendered.
const SEARCH_FIELDS: [&str; 4] = ["to", "from", "subject", "list"];

/// Build a Gmail search query from match criteria.
///
/// Fields are rendered in the order `to`, `from`, `subject`, `list`, followed
/// by bare `body` terms. Gmail search has no equivalent for `fromin` or
/// `headers`; those criteria are skipped with a warning.
pub fn gmail_search(criteria: &CommonMatch) -> String {
    let fields: [(&str, &[String]); 4] = [
        ("to", &criteria.to),
        ("from", &criteria.from),
        ("subject", &criteria.subject),
        ("list", &criteria.mailing_list),
    ];

    let mut clauses: Vec<String> = fields
        .into_iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(field, values)| format!("{field}:{}", group_terms(values)))
        .collect();

    if !criteria.body.is_empty() {
        clauses.push(wrap_terms(&criteria.body).join(" "));
    }

    if !criteria.from_domain.is_empty() {
        log::warn!(
            "gmail search cannot express fromin criteria; dropping {:?}",
            criteria.from_domain
        );
    }
    if !criteria.headers.is_empty() {
        log::warn!(
            "gmail search cannot express header criteria; dropping {:?}",
            criteria.headers
        );
    }

    clauses.join(CLAUSE_SEPARATOR)
}

/// Build a Fastmail search query from match criteria.
///
/// Not implemented yet: always returns an empty query. Fastmail's search
/// grammar has not been mapped, so rules converted to Fastmail carry no search.
pub fn fastmail_search(criteria: &CommonMatch) -> String {
    if !criteria.is_empty() {
        log::warn!("fastmail search generation is not implemented; writing an empty search");
    }
    String::new()
}

/// Recover match criteria from a query in the shape [`gmail_search`] writes.
///
/// Clauses for `to`, `from`, `subject`, and `list` populate those fields;
/// anything else is split into terms and treated as body text.
pub fn parse_search(query: &str) -> CommonMatch {
    let mut criteria = CommonMatch::default();

    for clause in split_top_level(query, CLAUSE_SEPARATOR) {
        let clause = clause.trim();
        if clause.is_empty() {
            continue;
        }

        match clause
            .split_once(':')
            .filter(|(field, _)| SEARCH_FIELDS.contains(field))
        {
            Some((field, value)) => {
                if let Some(values) = field_mut(&mut criteria, field) {
                    values.extend(parse_values(value));
                }
            }
            None => criteria.body.extend(split_terms(clause)),
        }
    }

    criteria
}

fn field_mut<'a>(criteria: &'a mut CommonMatch, field: &str) -> Option<&'a mut Vec<String>> {
    match field {
        "to" => Some(&mut criteria.to),
        "from" => Some(&mut criteria.from),
        "subject" => Some(&mut criteria.subject),
        "list" => Some(&mut criteria.mailing_list),
        _ => None,
    }
}

fn wrap_terms(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|value| {
            if value.contains(' ') {
                format!("({value})")
            } else {
                value.clone()
            }
        })
        .collect()
}

fn group_terms(values: &[String]) -> String {
    let wrapped = wrap_terms(values);
    if wrapped.len() == 1 {
        return wrapped.into_iter().collect();
    }
    format!("{{{}}}", wrapped.join(" "))
}

/// Split one field value into its terms: `{a b}` yields both, `(a b)` and
/// plain values yield one.
pub fn parse_values(value: &str) -> Vec<String> {
    let value = value.trim();
    match value
        .strip_prefix('{')
        .and_then(|inner| inner.strip_suffix('}'))
    {
        Some(inner) => split_terms(inner),
        None => vec![unwrap_term(value).to_string()],
    }
}

/// Split on whitespace outside parentheses, unwrapping `(...)` terms.
fn split_terms(text: &str) -> Vec<String> {
    split_top_level(text, " ")
        .into_iter()
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(|term| unwrap_term(term).to_string())
        .collect()
}

fn unwrap_term(term: &str) -> &str {
    term.strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
        .unwrap_or(term)
}

/// Split `text` on `separator` wherever it is not nested in `()` or `{}`.
///
/// Brackets that never balance cannot be told apart from literal text, so
/// such input is split on every separator instead.
fn split_top_level<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut idx = 0;

    while idx < text.len() {
        let rest = &text[idx..];
        if depth == 0 && rest.starts_with(separator) {
            parts.push(&text[start..idx]);
            idx += separator.len();
            start = idx;
            continue;
        }

        let Some(ch) = rest.chars().next() else {
            break;
        };
        match ch {
            '(' | '{' => depth += 1,
            ')' | '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
        idx += ch.len_utf8();
    }

    if depth != 0 {
        return text.split(separator).collect();
    }
    parts.push(&text[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn joins_fields_with_or_and_wraps_spaced_values() {
        let criteria = CommonMatch {
            to: strings(&["a@x.com"]),
            subject: strings(&["hello world"]),
            ..CommonMatch::default()
        };
        assert_eq!(gmail_search(&criteria), "to:a@x.com OR subject:(hello world)");
    }

    #[test]
    fn multiple_values_form_a_brace_group() {
        let criteria = CommonMatch {
            to: strings(&["a@x.com", "b@x.com"]),
            ..CommonMatch::default()
        };
        assert_eq!(gmail_search(&criteria), "to:{a@x.com b@x.com}");
    }

    #[test]
    fn body_terms_are_bare() {
        let criteria = CommonMatch {
            body: strings(&["foo", "bar baz"]),
            ..CommonMatch::default()
        };
        assert_eq!(gmail_search(&criteria), "foo (bar baz)");
    }

    #[test]
    fn field_order_is_fixed_and_body_comes_last() {
        let criteria = CommonMatch {
            body: strings(&["urgent"]),
            mailing_list: strings(&["dev.example.org"]),
            subject: strings(&["release"]),
            from: strings(&["ci@example.org", "bot@example.org"]),
            to: strings(&["me@example.com"]),
            ..CommonMatch::default()
        };
        assert_eq!(
            gmail_search(&criteria),
            "to:me@example.com OR from:{ci@example.org bot@example.org} OR subject:release \
             OR list:dev.example.org OR urgent"
        );
    }

    #[test]
    fn unsupported_fields_do_not_appear() {
        let criteria = CommonMatch {
            from_domain: strings(&["example.com"]),
            headers: strings(&["X-Spam: yes"]),
            ..CommonMatch::default()
        };
        assert_eq!(gmail_search(&criteria), "");
    }

    #[test]
    fn fastmail_search_is_empty() {
        let criteria = CommonMatch {
            to: strings(&["a@x.com"]),
            ..CommonMatch::default()
        };
        assert_eq!(fastmail_search(&criteria), "");
    }

    #[test]
    fn parse_recovers_generated_query() {
        let criteria = CommonMatch {
            to: strings(&["a@x.com", "b@x.com"]),
            subject: strings(&["hello world"]),
            mailing_list: strings(&["dev.example.org"]),
            body: strings(&["foo", "bar baz"]),
            ..CommonMatch::default()
        };
        assert_eq!(parse_search(&gmail_search(&criteria)), criteria);
    }

    #[test]
    fn parse_keeps_separator_inside_groups() {
        let parsed = parse_search("subject:(this OR that) OR from:x@y.com");
        assert_eq!(parsed.subject, strings(&["this OR that"]));
        assert_eq!(parsed.from, strings(&["x@y.com"]));
    }

    #[test]
    fn parse_sends_unknown_operators_to_body() {
        let parsed = parse_search("has:attachment OR label:work");
        assert_eq!(parsed.body, strings(&["has:attachment", "label:work"]));
        assert!(parsed.to.is_empty());
    }

    #[test]
    fn parse_survives_unbalanced_parenthesis_in_value() {
        let criteria = CommonMatch {
            to: strings(&["a (b"]),
            subject: strings(&["c"]),
            ..CommonMatch::default()
        };
        let query = gmail_search(&criteria);
        assert_eq!(query, "to:(a (b) OR subject:c");

        let parsed = parse_search(&query);
        assert_eq!(parsed.to, strings(&["a (b"]));
        assert_eq!(parsed.subject, strings(&["c"]));
    }

    #[test]
    fn parse_empty_query_is_empty_match() {
        assert!(parse_search("").is_empty());
        assert!(parse_search("   ").is_empty());
    }
}

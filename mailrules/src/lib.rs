//! Email filter rule conversion between a common schema, Gmail, and Fastmail.
//!
//! Providers store filters in very different shapes: Gmail exports an Atom
//! XML feed of name/value properties, Fastmail a flat JSON array of routing
//! rules with boolean actions. This library converts between them through a
//! neutral YAML schema so filter sets can move from one provider to another.
//!
//! # Architecture
//!
//! ## Schemas
//!
//! - [`common`]: The neutral schema every conversion passes through
//! - [`gmail`]: Gmail filter feed, including the XML property mapping
//! - [`fastmail`]: Fastmail mail rules JSON
//!
//! ## Shared machinery
//!
//! - [`ruleset`]: Generic ruleset container and the load/save/convert contract
//! - [`query`]: Provider search strings from match criteria, and back
//! - [`format`]: Format names, codecs, and filename detection
//! - [`settings`]: Feed header defaults and TOML overrides
//!
//! ## Pipeline
//!
//! - [`convert`]: Load, lower to common, raise to target, save
//! - [`conversion_summary`]: One-line report of a finished conversion
//!
//! # Lossy conversions
//!
//! A target schema that lacks a concept present in the source drops it with a
//! logged warning. Gmail size filters, Fastmail `stop`, and `fromin`/`headers`
//! criteria (which Gmail search cannot express) are the common cases. Fastmail
//! search generation is not implemented yet and always yields an empty query.
//!
//! # Examples
//!
//! ```no_run
//! use std::path::Path;
//!
//! use mailrules::convert::{convert_file, ConvertRequest};
//! use mailrules::format::Format;
//! use mailrules::settings::Settings;
//!
//! let settings = Settings::default();
//! let summary = convert_file(&ConvertRequest {
//!     source: Path::new("rules.common.yaml"),
//!     from: Format::Common,
//!     to: Format::Gmail,
//!     output: None,
//!     settings: &settings,
//! })?;
//! println!("Saved to {}", summary.destination.display());
//! # Ok::<(), mailrules::error::RulesError>(())
//! ```

pub mod common;
pub mod conversion_summary;
pub mod convert;
pub mod error;
pub mod fastmail;
pub mod format;
pub mod gmail;
pub mod query;
pub mod ruleset;
pub mod settings;

pub use common::{CommonMatch, CommonRule, CommonRuleset};
pub use error::RulesError;
pub use fastmail::{FastmailRule, FastmailRuleset};
pub use format::Format;
pub use gmail::{GmailRule, GmailRuleset};
pub use ruleset::{RuleSchema, Ruleset};

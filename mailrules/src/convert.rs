//! One-shot conversion of a rules file between schemas.
//!
//! Every conversion runs the same pipeline regardless of direction:
//!
//! 1. **Load** the source file with its schema's codec
//! 2. **Lower** it to the common model (identity for common sources)
//! 3. **Raise** the common model into the destination schema
//! 4. **Save** the destination file in a single write
//!
//! Lossy steps are logged as warnings by the schema that drops the data.

use std::path::{Path, PathBuf};

use crate::common::CommonRuleset;
use crate::conversion_summary::ConversionSummary;
use crate::error::RulesError;
use crate::fastmail::FastmailRuleset;
use crate::format::Format;
use crate::gmail::GmailRuleset;
use crate::ruleset::RuleSchema;
use crate::settings::Settings;

/// A validated conversion request.
#[derive(Debug, Clone)]
pub struct ConvertRequest<'a> {
    pub source: &'a Path,
    pub from: Format,
    pub to: Format,
    /// Destination path; defaults to [`default_destination`].
    pub output: Option<&'a Path>,
    pub settings: &'a Settings,
}

/// Run a conversion and write the destination file.
///
/// # Errors
///
/// - [`RulesError::FileNotFound`] if the source does not exist
/// - [`RulesError::UnsupportedConversion`] if source and destination formats
///   match; nothing is written
/// - decode/encode/IO errors from the schemas involved
pub fn convert_file(request: &ConvertRequest<'_>) -> Result<ConversionSummary, RulesError> {
    if !request.source.exists() {
        return Err(RulesError::FileNotFound {
            path: request.source.to_path_buf(),
        });
    }
    if request.from == request.to {
        return Err(RulesError::UnsupportedConversion(request.from));
    }

    let (common, rules_read) = load_common(request.source, request.from)?;

    let destination = request
        .output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_destination(request.source, request.to));
    let rules_written = save_from_common(&common, request.to, request.settings, &destination)?;

    Ok(ConversionSummary {
        source: request.from,
        target: request.to,
        rules_read,
        rules_written,
        destination,
    })
}

/// Load a rules file of any schema and lower it to the common model.
///
/// Returns the common ruleset and the number of rules in the source file.
pub fn load_common(path: &Path, format: Format) -> Result<(CommonRuleset, usize), RulesError> {
    match format {
        Format::Common => lower::<CommonRuleset>(path),
        Format::Gmail => lower::<GmailRuleset>(path),
        Format::Fastmail => lower::<FastmailRuleset>(path),
    }
}

/// Build the destination schema from the common model and write it.
///
/// Returns the number of rules written.
pub fn save_from_common(
    common: &CommonRuleset,
    format: Format,
    settings: &Settings,
    path: &Path,
) -> Result<usize, RulesError> {
    match format {
        Format::Common => raise::<CommonRuleset>(common, settings, path),
        Format::Gmail => raise::<GmailRuleset>(common, settings, path),
        Format::Fastmail => raise::<FastmailRuleset>(common, settings, path),
    }
}

/// File extension (with dot) written for a format.
pub fn suffix(format: Format) -> &'static str {
    match format {
        Format::Common => CommonRuleset::SUFFIX,
        Format::Gmail => GmailRuleset::SUFFIX,
        Format::Fastmail => FastmailRuleset::SUFFIX,
    }
}

/// `<stem>.<format><suffix>` beside the source file.
pub fn default_destination(source: &Path, to: Format) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    source.with_file_name(format!("{stem}.{to}{}", suffix(to)))
}

fn lower<S: RuleSchema>(path: &Path) -> Result<(CommonRuleset, usize), RulesError> {
    let ruleset = S::load(Some(path))?;
    let common = ruleset.convert_to_common()?;
    Ok((common, ruleset.rules().len()))
}

fn raise<S: RuleSchema>(
    common: &CommonRuleset,
    settings: &Settings,
    path: &Path,
) -> Result<usize, RulesError> {
    let ruleset = S::from_common_ruleset(common, settings);
    ruleset.save(Some(path))?;
    Ok(ruleset.rules().len())
}

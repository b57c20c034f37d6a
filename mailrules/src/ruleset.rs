//! The load/save/convert contract shared by every rule schema.
//!
//! Each schema is a [`Ruleset`] specialised to one rule type and (for Gmail)
//! one feed header type. The [`RuleSchema`] implementation pins the codec,
//! default filename, and output suffix for that specialisation, and supplies
//! the two conversion directions through the common model.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::common::CommonRuleset;
use crate::error::RulesError;
use crate::format::{Codec, Format};
use crate::settings::Settings;

/// An ordered collection of rules of one schema, plus any file-level header.
///
/// Rule order is significant: providers evaluate filters by position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ruleset<R, H = ()> {
    pub header: H,
    pub rules: Vec<R>,
}

impl<R> Ruleset<R> {
    pub fn new(rules: Vec<R>) -> Self {
        Self { header: (), rules }
    }
}

/// Contract every concrete ruleset implements.
pub trait RuleSchema: Sized {
    type Rule;

    const FORMAT: Format;
    const CODEC: Codec;
    /// File used by [`RuleSchema::load`] and [`RuleSchema::save`] when no
    /// path is given.
    const DEFAULT_FILENAME: &'static str;
    /// Extension appended to generated output names, including the dot.
    const SUFFIX: &'static str;

    fn decode(bytes: &[u8]) -> Result<Self, RulesError>;

    fn encode(&self) -> Result<Vec<u8>, RulesError>;

    fn rules(&self) -> &[Self::Rule];

    /// Build this schema from the common model.
    fn from_common_ruleset(common: &CommonRuleset, settings: &Settings) -> Self;

    /// Lower this ruleset into the common model.
    fn convert_to_common(&self) -> Result<CommonRuleset, RulesError> {
        Err(RulesError::NotImplemented(Self::FORMAT))
    }

    /// Read and decode a ruleset file.
    fn load(path: Option<&Path>) -> Result<Self, RulesError> {
        let path = path.unwrap_or_else(|| Path::new(Self::DEFAULT_FILENAME));
        let bytes = fs::read(path).map_err(|source| RulesError::read(path, source))?;
        let ruleset = Self::decode(&bytes)?;
        log::info!(
            "loaded {} {} rule(s) from {}",
            ruleset.rules().len(),
            Self::FORMAT,
            path.display()
        );
        Ok(ruleset)
    }

    /// Encode the whole ruleset and write it in one shot, replacing any
    /// existing file. Returns the path written.
    fn save(&self, path: Option<&Path>) -> Result<PathBuf, RulesError> {
        let path = path.unwrap_or_else(|| Path::new(Self::DEFAULT_FILENAME));
        let bytes = self.encode()?;
        fs::write(path, bytes).map_err(|source| RulesError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!(
            "saved {} {} rule(s) to {}",
            self.rules().len(),
            Self::FORMAT,
            path.display()
        );
        Ok(path.to_path_buf())
    }
}

/// Decode a top-level sequence of rule records with a serde codec.
///
/// A null document is an empty ruleset, and a null record becomes a rule with
/// every field at its default.
pub(crate) fn decode_records<R>(
    format: Format,
    codec: Codec,
    bytes: &[u8],
) -> Result<Vec<R>, RulesError>
where
    R: DeserializeOwned + Default,
{
    let records: Option<Vec<Option<R>>> = match codec {
        Codec::Yaml => serde_yaml::from_slice(bytes).map_err(|e| RulesError::decode(format, e))?,
        Codec::Json => serde_json::from_slice(bytes).map_err(|e| RulesError::decode(format, e))?,
        Codec::Xml => {
            return Err(RulesError::decode(
                format,
                "XML rulesets have no generic record decoder",
            ))
        }
    };

    Ok(records
        .unwrap_or_default()
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}

/// Encode a sequence of rule records with a serde codec.
pub(crate) fn encode_records<R>(
    format: Format,
    codec: Codec,
    rules: &[R],
) -> Result<Vec<u8>, RulesError>
where
    R: Serialize,
{
    match codec {
        Codec::Yaml => serde_yaml::to_string(rules)
            .map(String::into_bytes)
            .map_err(|e| RulesError::encode(format, e)),
        Codec::Json => {
            let mut bytes =
                serde_json::to_vec_pretty(rules).map_err(|e| RulesError::encode(format, e))?;
            bytes.push(b'\n');
            Ok(bytes)
        }
        Codec::Xml => Err(RulesError::encode(
            format,
            "XML rulesets have no generic record encoder",
        )),
    }
}

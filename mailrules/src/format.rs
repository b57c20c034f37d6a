use std::fmt::{self, Display, Formatter};
use std::path::Path;

/// One of the three rule schemas the converter understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Neutral YAML schema every conversion passes through.
    Common,
    /// Gmail's Atom XML filter export.
    Gmail,
    /// Fastmail's JSON mail rules.
    Fastmail,
}

impl Format {
    /// Detection order used by [`Format::infer_from_path`].
    pub const ALL: [Format; 3] = [Format::Common, Format::Gmail, Format::Fastmail];

    pub fn as_str(self) -> &'static str {
        match self {
            Format::Common => "common",
            Format::Gmail => "gmail",
            Format::Fastmail => "fastmail",
        }
    }

    /// Guess the schema from the first format name found in the file name.
    pub fn infer_from_path(path: &Path) -> Option<Format> {
        let name = path.file_name()?.to_string_lossy();
        Self::ALL
            .into_iter()
            .find(|format| name.contains(format.as_str()))
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// On-disk encoding of a ruleset file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Yaml,
    Json,
    Xml,
}

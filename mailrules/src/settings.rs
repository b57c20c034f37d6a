use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::RulesError;

/// Tunables that are not part of any rule file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub feed: FeedSettings,
}

/// Header values written into a generated Gmail filter feed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedSettings {
    pub title: String,
    pub author_name: String,
    pub author_email: String,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self, RulesError> {
        let raw = fs::read_to_string(path).map_err(|err| RulesError::Settings {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        parse_settings(&raw, path.display().to_string())
    }
}

impl Default for Settings {
    /// Built-in settings from `config/defaults.toml`.
    fn default() -> Self {
        let embedded = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config/defaults.toml"));
        parse_settings(embedded, "embedded settings".to_string())
            .unwrap_or_else(|_| fallback_settings())
    }
}

fn parse_settings(raw: &str, path: String) -> Result<Settings, RulesError> {
    toml::from_str(raw).map_err(|err| RulesError::Settings {
        path,
        message: err.to_string(),
    })
}

fn fallback_settings() -> Settings {
    Settings {
        feed: FeedSettings {
            title: "Mail Filters".to_string(),
            author_name: "Mail Rules".to_string(),
            author_email: "mailrules@localhost".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_defaults_parse() {
        let embedded = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config/defaults.toml"));
        let parsed = parse_settings(embedded, "embedded".to_string()).expect("defaults parse");
        assert_eq!(parsed, Settings::default());
        assert_eq!(parsed.feed.title, "Mail Filters");
    }

    #[test]
    fn loads_override_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("mailrules.toml");
        fs::write(
            &path,
            "[feed]\ntitle = \"Filters\"\nauthor_name = \"Sam\"\nauthor_email = \"sam@example.com\"\n",
        )
        .expect("write settings");

        let settings = Settings::load(&path).expect("load");
        assert_eq!(settings.feed.author_email, "sam@example.com");
    }

    #[test]
    fn incomplete_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[feed]\ntitle = \"Filters\"\n").expect("write settings");

        let err = Settings::load(&path).expect_err("missing keys");
        assert!(matches!(err, RulesError::Settings { .. }));
    }
}

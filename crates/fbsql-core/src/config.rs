//! Declarative Reserved-Word Configuration
//!
//! The embedding driver chooses its reserved-word table through a small TOML
//! document:
//!
//! ```toml
//! preset = "firebird-4.0"
//! additional = ["MATCHING"]
//! ```
//!
//! Both fields are optional; the default is the latest Firebird preset with no
//! additions.

use crate::{FbSqlError, ReservedWords, ReservedWordsPreset, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Reserved-word configuration loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservedWordsConfig {
    /// Base table
    #[serde(default)]
    pub preset: ReservedWordsPreset,
    /// Extra words to treat as reserved on top of the preset
    #[serde(default)]
    pub additional: Vec<String>,
}

impl ReservedWordsConfig {
    /// Configuration using `preset` without additions
    pub fn new(preset: ReservedWordsPreset) -> Self {
        Self {
            preset,
            additional: Vec::new(),
        }
    }

    /// Add extra reserved words
    pub fn with_additional<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.additional.extend(words.into_iter().map(Into::into));
        self
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading reserved-word configuration");
        Self::from_toml_str(&contents)
    }

    /// Check that every additional word is non-blank and contains no whitespace
    pub fn validate(&self) -> Result<()> {
        for (index, word) in self.additional.iter().enumerate() {
            if word.trim().is_empty() {
                return Err(FbSqlError::Configuration(format!(
                    "additional reserved word at index {index} is blank"
                )));
            }
            if word.trim().chars().any(char::is_whitespace) {
                return Err(FbSqlError::Configuration(format!(
                    "additional reserved word '{word}' contains whitespace"
                )));
            }
        }
        Ok(())
    }

    /// Build the reserved-word table described by this configuration
    pub fn build(&self) -> Result<ReservedWords> {
        ReservedWords::from_config(self)
    }
}

impl ReservedWords {
    /// Build a table from a validated configuration
    pub fn from_config(config: &ReservedWordsConfig) -> Result<Self> {
        config.validate()?;
        let base = ReservedWords::preset(config.preset);
        if config.additional.is_empty() {
            return Ok(base);
        }
        Ok(base.with_additional(&config.additional))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_config_defaults() {
        let config = ReservedWordsConfig::default();
        assert_eq!(config.preset, ReservedWordsPreset::Firebird50);
        assert!(config.additional.is_empty());
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_str = r#"
preset = "firebird-3.0"
additional = ["MATCHING", "skip"]
"#;

        let config = ReservedWordsConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.preset, ReservedWordsPreset::Firebird30);
        assert_eq!(config.additional, vec!["MATCHING", "skip"]);

        let words = config.build().unwrap();
        assert!(words.contains("matching"));
        assert!(words.contains("SKIP"));
        assert!(words.contains("SELECT"));
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = ReservedWordsConfig::from_toml_str("").unwrap();
        assert_eq!(config, ReservedWordsConfig::default());
    }

    #[test]
    fn test_unknown_preset_is_rejected() {
        let result = ReservedWordsConfig::from_toml_str(r#"preset = "firebird-1.5""#);
        assert!(matches!(result, Err(FbSqlError::Toml(_))));
    }

    #[test]
    fn test_blank_additional_word_is_rejected() {
        let result = ReservedWordsConfig::from_toml_str(r#"additional = ["OK", "  "]"#);
        let err = result.unwrap_err();
        assert!(matches!(err, FbSqlError::Configuration(_)));
        assert!(err.to_string().contains("index 1"));
    }

    #[test]
    fn test_word_with_whitespace_is_rejected() {
        let config = ReservedWordsConfig::new(ReservedWordsPreset::Minimal)
            .with_additional(["TWO WORDS"]);
        assert!(matches!(
            config.build(),
            Err(FbSqlError::Configuration(_))
        ));
    }

    #[test]
    fn test_preset_without_additions_shares_table() {
        let config = ReservedWordsConfig::new(ReservedWordsPreset::Minimal);
        let words = config.build().unwrap();
        assert_eq!(words.len(), ReservedWords::minimal().len());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "preset = \"minimal\"").unwrap();
        writeln!(file, "additional = [\"WINDOW\"]").unwrap();

        let config = ReservedWordsConfig::load(file.path()).unwrap();
        assert_eq!(config.preset, ReservedWordsPreset::Minimal);
        assert!(config.build().unwrap().contains("window"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = ReservedWordsConfig::load("/nonexistent/fbsql/reserved.toml");
        assert!(matches!(result, Err(FbSqlError::Io(_))));
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = ReservedWordsConfig::new(ReservedWordsPreset::Firebird40)
            .with_additional(["MATCHING"]);
        let serialized = toml::to_string(&config).unwrap();
        assert!(serialized.contains("firebird-4.0"));
        assert_eq!(ReservedWordsConfig::from_toml_str(&serialized).unwrap(), config);
    }
}

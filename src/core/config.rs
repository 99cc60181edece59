/// Engine configuration, loadable from RON.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::core::parser::ParseOptions;

pub const DEFAULT_NARRATOR_NAME: &str = "Narrator";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Settings shared by every session running a script.
///
/// ```ron
/// EngineConfig(
///     narrator_name: "Narrator",
///     command_aliases: { "bgm": "playMusic" },
///     flush_trailing_lines: true,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Speaker routed to the narrator channel instead of the portrait view.
    pub narrator_name: String,
    /// Extra command spellings, each mapped onto an existing command name.
    pub command_aliases: HashMap<String, String>,
    /// Keep dialogue written after the last branch line as a final block.
    pub flush_trailing_lines: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            narrator_name: DEFAULT_NARRATOR_NAME.to_string(),
            command_aliases: HashMap::new(),
            flush_trailing_lines: true,
        }
    }
}

impl EngineConfig {
    pub fn load_from_ron(path: &Path) -> Result<EngineConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<EngineConfig, ConfigError> {
        Ok(ron::from_str(input)?)
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            flush_trailing_lines: self.flush_trailing_lines,
        }
    }

    pub fn is_narrator(&self, speaker: &str) -> bool {
        speaker == self.narrator_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.narrator_name, "Narrator");
        assert!(config.command_aliases.is_empty());
        assert!(config.flush_trailing_lines);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = EngineConfig::parse_ron(r#"(narrator_name: "Voice")"#).unwrap();
        assert_eq!(config.narrator_name, "Voice");
        assert!(config.flush_trailing_lines);
    }

    #[test]
    fn full_config() {
        let config = EngineConfig::parse_ron(
            r#"EngineConfig(
                narrator_name: "Storyteller",
                command_aliases: { "bgm": "playMusic", "shake": "fadeOut" },
                flush_trailing_lines: false,
            )"#,
        )
        .unwrap();
        assert_eq!(config.command_aliases.len(), 2);
        assert_eq!(config.command_aliases["bgm"], "playMusic");
        assert!(!config.parse_options().flush_trailing_lines);
    }

    #[test]
    fn narrator_match_is_exact() {
        let config = EngineConfig::default();
        assert!(config.is_narrator("Narrator"));
        assert!(!config.is_narrator("narrator"));
        assert!(!config.is_narrator("Alice"));
    }

    #[test]
    fn load_fixture_config() {
        let path = std::path::PathBuf::from("tests/fixtures/test_config.ron");
        let config = EngineConfig::load_from_ron(&path).unwrap();
        assert_eq!(config.narrator_name, "Narrator");
        assert_eq!(config.command_aliases["bgm"], "playMusic");
    }
}

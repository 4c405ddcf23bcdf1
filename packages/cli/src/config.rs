use polydraft_engine::SessionOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "polydraft.config.json";

/// Polydraft configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Session file used when a command gets no --file
    #[serde(default = "default_file")]
    pub file: String,

    /// Undo depth and display toggles
    #[serde(flatten)]
    pub session: SessionOptions,
}

fn default_file() -> String {
    "drafts.polydraft".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Session file: the explicit path, else the configured one
    pub fn session_file(&self, cwd: &Path, explicit: Option<&Path>) -> PathBuf {
        match explicit {
            Some(path) => cwd.join(path),
            None => cwd.join(&self.file),
        }
    }

    /// Session options with command-line switches applied on top
    pub fn session_options(&self, sort_by_score: bool, hide_bad_edits: bool) -> SessionOptions {
        SessionOptions {
            sort_by_score: self.session.sort_by_score || sort_by_score,
            hide_bad_edits: self.session.hide_bad_edits || hide_bad_edits,
            ..self.session
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: default_file(),
            session: SessionOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "file": "story.polydraft",
            "maxUndoLevels": 10,
            "sortByScore": true
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.file, "story.polydraft");
        assert_eq!(config.session.max_undo_levels, 10);
        assert!(config.session.sort_by_score);
        assert!(!config.session.hide_bad_edits);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.file, "drafts.polydraft");
        assert_eq!(config.session, SessionOptions::default());
    }

    #[test]
    fn test_flags_override_config() {
        let config = Config::default();
        let options = config.session_options(true, false);

        assert!(options.sort_by_score);
        assert!(!options.hide_bad_edits);
        assert_eq!(options.max_undo_levels, 100);
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::load(dir.path()).unwrap().file, "drafts.polydraft");

        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_NAME),
            r#"{ "hideBadEdits": true }"#,
        )
        .unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert!(config.session.hide_bad_edits);
        assert_eq!(
            config.session_file(dir.path(), None),
            dir.path().join("drafts.polydraft")
        );
    }
}

use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::{Context, Result};
use polydraft_engine::{EditSession, SessionOptions};
use std::fs;
use std::path::{Path, PathBuf};

/// A session file resolved against the working directory and its config
#[derive(Debug, Clone)]
pub struct SessionFile {
    pub path: PathBuf,
    pub options: SessionOptions,
}

impl SessionFile {
    pub fn resolve(
        cwd: &str,
        file: Option<&Path>,
        sort_by_score: bool,
        hide_bad_edits: bool,
    ) -> Result<Self> {
        let cwd = Path::new(cwd);
        let config = Config::load(cwd)
            .with_context(|| format!("Failed to read {}", DEFAULT_CONFIG_NAME))?;

        Ok(Self {
            path: config.session_file(cwd, file),
            options: config.session_options(sort_by_score, hide_bad_edits),
        })
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn open(&self) -> Result<EditSession> {
        let bytes = fs::read(&self.path)
            .with_context(|| format!("Failed to read session {}", self.path.display()))?;

        let mut session = EditSession::with_options(self.options);
        session
            .load(&bytes)
            .with_context(|| format!("Failed to load session {}", self.path.display()))?;
        Ok(session)
    }

    pub fn write(&self, session: &EditSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, session.save())
            .with_context(|| format!("Failed to write session {}", self.path.display()))
    }
}

//! Configuration management for the Scribe CLI

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Base URL of the transcription service API
    pub api_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Directory holding the persisted session
    pub data_dir: PathBuf,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000/api".to_string(),
            timeout_secs: 30,
            data_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("scribe"),
        }
    }
}

impl CliConfig {
    /// Load configuration from defaults, an optional file, and `SCRIBE_*`
    /// environment variables, in rising precedence
    ///
    /// # Errors
    ///
    /// Returns an error if the file or environment variables cannot be parsed
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();

        let mut builder = config::Config::builder()
            .set_default("api_url", defaults.api_url)?
            .set_default("timeout_secs", defaults.timeout_secs)?
            .set_default("data_dir", defaults.data_dir.to_string_lossy().to_string())?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix("SCRIBE"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// File the session is persisted in
    pub fn session_file(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }
}

/// Save configuration to a JSON file
pub fn save_config(config: &CliConfig, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(config)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

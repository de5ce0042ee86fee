//! CLI configuration

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use profile_writer::{ProfileLocator, SerializeOptions, DEFAULT_PROFILE_DIR};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CliError, CliResult};

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CliConfig {
    /// Directory holding profile files
    pub profile_dir: Option<PathBuf>,

    /// Write metadata comments unless overridden on the command line
    pub include_metadata: bool,

    /// Suppress flags clauses unless overridden on the command line
    pub no_flags: bool,

    /// Profiles whose file does not follow the name-derived layout
    pub profile_files: BTreeMap<String, PathBuf>,
}

impl CliConfig {
    /// Load configuration from file
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path()?,
        };

        if config_path.exists() {
            debug!(path = %config_path.display(), "Loading configuration");
            let contents = std::fs::read_to_string(&config_path)?;
            let config: CliConfig =
                toml::from_str(&contents).map_err(|e| CliError::Config(e.to_string()))?;
            Ok(config)
        } else {
            Ok(CliConfig::default())
        }
    }

    /// Get the default configuration file path
    fn default_config_path() -> CliResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CliError::Config("Cannot find config directory".into()))?;
        Ok(config_dir.join("aa-serialize").join("config.toml"))
    }

    /// Filename resolution configured by this file
    pub fn locator(&self) -> ProfileLocator {
        let dir = self
            .profile_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROFILE_DIR));
        self.profile_files
            .iter()
            .fold(ProfileLocator::new(dir), |locator, (name, file)| {
                locator.with_existing(name.clone(), file.clone())
            })
    }

    /// Serialize options with command-line switches applied on top
    pub fn options(&self, metadata: bool, no_flags: bool) -> SerializeOptions {
        SerializeOptions {
            include_metadata: self.include_metadata || metadata,
            no_flags: self.no_flags || no_flags,
        }
    }
}

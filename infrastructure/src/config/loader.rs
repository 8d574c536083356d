//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use reel_domain::ConfigIssue;
use std::path::{Path, PathBuf};
use thiserror::Error;

const APP_DIR: &str = "reel-quorum";
const PROJECT_FILES: [&str; 2] = ["reel-quorum.toml", ".reel-quorum.toml"];

/// Configuration that could not be loaded or is unusable
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("invalid configuration:\n{}", list_messages(.0))]
    Invalid(Vec<ConfigIssue>),
}

fn list_messages(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("  - {}", i.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Explicit config path (if provided)
    /// 2. Project root: `./reel-quorum.toml` or `./.reel-quorum.toml`
    /// 3. XDG config: `$XDG_CONFIG_HOME/reel-quorum/config.toml`
    /// 4. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        let mut sources = Vec::new();
        if let Some(global) = Self::global_config_path()
            && global.exists()
        {
            sources.push(global);
        }
        if let Some(project) = Self::project_config_path() {
            sources.push(project);
        }
        Self::merge(&sources, config_path.map(PathBuf::as_path))
    }

    /// Load and validate, splitting warnings from errors.
    ///
    /// Returns the configuration plus its warnings; any error-severity issue
    /// fails the load.
    pub fn load_validated(
        config_path: Option<&PathBuf>,
    ) -> Result<(FileConfig, Vec<ConfigIssue>), ConfigValidationError> {
        let config = Self::load(config_path)?;
        Self::check(config)
    }

    /// Split a configuration's issues into a hard failure or its warnings.
    pub fn check(config: FileConfig) -> Result<(FileConfig, Vec<ConfigIssue>), ConfigValidationError> {
        let (errors, warnings): (Vec<_>, Vec<_>) =
            config.validate().into_iter().partition(ConfigIssue::is_error);
        if errors.is_empty() {
            Ok((config, warnings))
        } else {
            Err(ConfigValidationError::Invalid(errors))
        }
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    fn merge(sources: &[PathBuf], explicit: Option<&Path>) -> Result<FileConfig, Box<figment::Error>> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));
        for path in sources {
            figment = figment.merge(Toml::file(path));
        }
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Box::new(figment::Error::from(format!(
                    "config file not found: {}",
                    path.display()
                ))));
            }
            figment = figment.merge(Toml::file(path));
        }
        figment.extract().map_err(Box::new)
    }

    /// Get the global config file path
    ///
    /// Returns `$XDG_CONFIG_HOME/reel-quorum/config.toml` or the platform
    /// equivalent.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for --show-config)
    pub fn print_config_sources(explicit: Option<&PathBuf>) {
        println!("Configuration sources (in priority order):");

        if let Some(path) = explicit {
            let mark = if path.exists() { "FOUND" } else { "MISSING" };
            println!("  [{mark:^7}] Explicit: {}", path.display());
        }

        match Self::project_config_path() {
            Some(path) => println!("  [ FOUND ] Project:  {}", path.display()),
            None => println!("  [       ] Project:  ./reel-quorum.toml or ./.reel-quorum.toml"),
        }

        if let Some(path) = Self::global_config_path() {
            let mark = if path.exists() { "FOUND" } else { "" };
            println!("  [{mark:^7}] Global:   {}", path.display());
        }

        println!("  [       ] Default:  built-in defaults");
    }
}

//! Configuration for bookshelf.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variable (BOOKSHELF_HOME)
//! 2. Config file (.bookshelf/config.yaml)
//! 3. Defaults (~/.bookshelf)
//!
//! Config file discovery:
//! - Searches current directory and parents for .bookshelf/config.yaml
//! - `paths.home` is relative to the .bookshelf/ directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::library::{LibraryOptions, BOOKS_SLOT, BORROWED_SLOT};

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Directory name for both the default home and config discovery
const DIR_NAME: &str = ".bookshelf";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub storage: Option<StorageConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Data directory (relative to .bookshelf/)
    pub home: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    pub books_slot: Option<String>,
    pub borrowed_slot: Option<String>,
    pub autosave: Option<bool>,
    pub pretty: Option<bool>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Directory holding the slot files
    pub home: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// Storage settings
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSettings {
    pub books_slot: String,
    pub borrowed_slot: String,
    pub autosave: bool,
    pub pretty: bool,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            books_slot: BOOKS_SLOT.to_string(),
            borrowed_slot: BORROWED_SLOT.to_string(),
            autosave: true,
            pretty: false,
        }
    }
}

impl StorageSettings {
    fn from_file(config: Option<&StorageConfig>) -> Self {
        let defaults = Self::default();
        let Some(config) = config else {
            return defaults;
        };

        Self {
            books_slot: config.books_slot.clone().unwrap_or(defaults.books_slot),
            borrowed_slot: config
                .borrowed_slot
                .clone()
                .unwrap_or(defaults.borrowed_slot),
            autosave: config.autosave.unwrap_or(defaults.autosave),
            pretty: config.pretty.unwrap_or(defaults.pretty),
        }
    }

    /// Options for opening a library with these settings
    pub fn library_options(&self) -> LibraryOptions {
        LibraryOptions {
            books_slot: self.books_slot.clone(),
            borrowed_slot: self.borrowed_slot.clone(),
            autosave: self.autosave,
            pretty: self.pretty,
        }
    }
}

/// Find config file by searching `start` and its parents
fn find_config_file_from(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(DIR_NAME).join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Combine the sources; env beats file beats default
fn resolve(
    file: Option<(PathBuf, ConfigFile)>,
    env_home: Option<String>,
    default_home: PathBuf,
) -> ResolvedConfig {
    let Some((config_path, config)) = file else {
        return ResolvedConfig {
            home: env_home.map(PathBuf::from).unwrap_or(default_home),
            config_file: None,
            storage: StorageSettings::default(),
        };
    };

    let home = if let Some(env_home) = env_home {
        PathBuf::from(env_home)
    } else if let Some(ref home_path) = config.paths.home {
        let config_dir = config_path.parent().unwrap_or(Path::new("."));
        resolve_path(config_dir, home_path)
    } else {
        default_home
    };

    ResolvedConfig {
        home,
        storage: StorageSettings::from_file(config.storage.as_ref()),
        config_file: Some(config_path),
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(DIR_NAME);

    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    let file = match find_config_file_from(&cwd) {
        Some(path) => {
            let config = load_config_file(&path)?;
            Some((path, config))
        }
        None => None,
    };

    let env_home = std::env::var("BOOKSHELF_HOME").ok();

    Ok(resolve(file, env_home, default_home))
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

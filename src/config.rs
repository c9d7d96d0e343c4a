use std::path::{Path, PathBuf};

use crate::error::Error;

/// Name of the optional config file at the site root.
pub const CONFIG_FILE: &str = ".coursebook.toml";

/// Site configuration loaded from `.coursebook.toml`.
/// Paths are relative to the site root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Catalog document listing the courses.
    pub catalog: PathBuf,
    /// Language code cells are highlighted as.
    pub code_language: String,
    /// Key-value store file holding theme and progress.
    pub storage: PathBuf,
}

/// Raw TOML structure for `.coursebook.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct CoursebookTomlConfig {
    /// Overrides the catalog path.
    catalog: Option<PathBuf>,
    /// Overrides the code language.
    code_language: Option<String>,
    /// Overrides the storage file path.
    storage: Option<PathBuf>,
}

impl Config {
    /// Load config from `.coursebook.toml` in the given root directory.
    /// Returns defaults if the file doesn't exist.
    /// Returns an error if the file exists but is malformed; a config file
    /// the user wrote is never silently replaced by defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };

        let raw: CoursebookTomlConfig = toml::from_str(&content)?;
        let defaults = Self::default();
        return Ok(Self {
            catalog: raw.catalog.unwrap_or(defaults.catalog),
            code_language: raw.code_language.unwrap_or(defaults.code_language),
            storage: raw.storage.unwrap_or(defaults.storage),
        });
    }
}

impl Default for Config {
    fn default() -> Self {
        return Self {
            catalog: PathBuf::from("courses.json"),
            code_language: "python".to_string(),
            storage: PathBuf::from(".coursebook/storage.json"),
        };
    }
}

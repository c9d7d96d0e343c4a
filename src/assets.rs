//! Static asset layer: catalog and course files read relative to the site root.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::error::Error;

/// Root directory of a course site.
#[derive(Debug, Clone)]
pub struct AssetRoot {
    /// Directory every asset path is resolved against.
    root: PathBuf,
}

impl AssetRoot {
    /// Serve assets from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        return Self { root: root.into() };
    }

    /// Fetch an asset as text.
    ///
    /// # Errors
    ///
    /// Returns `Error::Fetch` if the asset cannot be read.
    pub fn fetch_text(&self, path: &Path) -> Result<String, Error> {
        let full = self.root.join(path);
        return std::fs::read_to_string(&full).map_err(|e| {
            return fetch_failed(path, &e.to_string());
        });
    }

    /// Fetch an asset and decode it as JSON.
    ///
    /// # Errors
    ///
    /// Returns `Error::Fetch` if the asset cannot be read or is not valid JSON
    /// of the expected shape.
    pub fn fetch_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T, Error> {
        let text = self.fetch_text(path)?;
        return serde_json::from_str(&text).map_err(|e| {
            return fetch_failed(path, &e.to_string());
        });
    }
}

/// Log a fetch failure on the developer channel and build its error.
fn fetch_failed(path: &Path, reason: &str) -> Error {
    tracing::error!(path = %path.display(), reason, "asset fetch failed");
    return Error::Fetch { path: path.to_path_buf(), reason: reason.to_string() };
}

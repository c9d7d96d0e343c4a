use std::fmt;

use crate::error::Error;
use crate::storage::{KeyValueStore, THEME_KEY};

/// Color scheme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    /// Dark background.
    Dark,
    /// Light background, the default.
    #[default]
    Light,
}

impl Theme {
    /// Read the stored preference. Missing or unrecognised values are `Light`.
    ///
    /// # Errors
    ///
    /// Returns errors from the key-value backend.
    pub fn load(kv: &impl KeyValueStore) -> Result<Self, Error> {
        let stored = kv.get(THEME_KEY)?;
        return Ok(match stored.as_deref() {
            Some("dark") => Theme::Dark,
            _ => Theme::Light,
        });
    }

    /// Write the preference.
    ///
    /// # Errors
    ///
    /// Returns errors from the key-value backend.
    pub fn persist(self, kv: &mut impl KeyValueStore) -> Result<(), Error> {
        return kv.set(THEME_KEY, self.as_str());
    }

    /// The other theme.
    #[must_use]
    pub const fn toggled(self) -> Self {
        return match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        };
    }

    /// Stored and displayed name.
    pub const fn as_str(self) -> &'static str {
        return match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        };
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str(self.as_str());
    }
}

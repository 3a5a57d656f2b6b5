//! Display preferences (theme and language) persisted next to the session.
//! These keys are owned by this module; the auth context never writes them, it
//! only wipes them together with everything else on logout.

use crate::{
    errors::AppError,
    storage::{keys, Storage},
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, sync::Arc};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown theme: {other}")),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
}

impl Language {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Fr => "fr",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Self::En),
            "fr" | "french" | "francais" => Ok(Self::Fr),
            other => Err(format!("unknown language: {other}")),
        }
    }
}

/// Current theme and language, backed by the shared store.
#[derive(Clone, Debug)]
pub struct Preferences {
    storage: Arc<dyn Storage>,
}

impl Preferences {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Stored theme; unknown or missing values fall back to the default.
    #[must_use]
    pub fn theme(&self) -> Theme {
        read_or_default(self.storage.as_ref(), keys::THEME)
    }

    /// Stored language; unknown or missing values fall back to the default.
    #[must_use]
    pub fn language(&self) -> Language {
        language_from(self.storage.as_ref())
    }

    /// # Errors
    /// Returns `AppError::Storage` when the value cannot be persisted.
    pub fn set_theme(&self, theme: Theme) -> Result<(), AppError> {
        self.storage.set(keys::THEME, theme.as_str())
    }

    /// # Errors
    /// Returns `AppError::Storage` when the value cannot be persisted.
    pub fn set_language(&self, language: Language) -> Result<(), AppError> {
        self.storage.set(keys::LANGUAGE, language.as_str())
    }

    /// Flips between light and dark and returns the new theme.
    ///
    /// # Errors
    /// Returns `AppError::Storage` when the value cannot be persisted.
    pub fn toggle_theme(&self) -> Result<Theme, AppError> {
        let next = self.theme().toggled();
        self.set_theme(next)?;
        Ok(next)
    }
}

/// Reads the language preference without holding a `Preferences` handle.
pub(crate) fn language_from(storage: &dyn Storage) -> Language {
    read_or_default(storage, keys::LANGUAGE)
}

fn read_or_default<T: FromStr + Default>(storage: &dyn Storage, key: &str) -> T {
    storage
        .get(key)
        .and_then(|value| value.parse().ok())
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn defaults_apply_when_missing_or_unknown() {
        let storage = Arc::new(MemoryStorage::new());
        let prefs = Preferences::new(storage.clone());
        assert_eq!(prefs.theme(), Theme::Light);
        assert_eq!(prefs.language(), Language::En);

        storage.set(keys::THEME, "sepia").unwrap();
        assert_eq!(prefs.theme(), Theme::Light);
    }

    #[test]
    fn toggle_theme_persists() {
        let storage = Arc::new(MemoryStorage::new());
        let prefs = Preferences::new(storage.clone());
        assert_eq!(prefs.toggle_theme().unwrap(), Theme::Dark);
        assert_eq!(storage.get(keys::THEME), Some("dark".to_string()));
        assert_eq!(prefs.toggle_theme().unwrap(), Theme::Light);
    }

    #[test]
    fn language_parses_aliases() {
        assert_eq!("French".parse::<Language>(), Ok(Language::Fr));
        assert_eq!(" en ".parse::<Language>(), Ok(Language::En));
        assert!("de".parse::<Language>().is_err());
    }
}

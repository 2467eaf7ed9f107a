//! Light/dark theme switching.
//!
//! The stored choice wins over the system preference; with nothing stored
//! the system preference is used. The active theme is reflected as
//! `data-theme` on the root element and in the toggle button's label.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, warn};

use crate::constants::THEME_STORAGE_KEY;
use crate::dom::{Document, NodeId, Selector, SelectorError};
use crate::storage::{Storage, StorageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown theme `{0}`")]
pub struct UnknownTheme(pub String);

impl FromStr for Theme {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(UnknownTheme(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThemeConfig {
    pub button_selector: String,
    pub storage_key: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            button_selector: ".theme-toggle".to_string(),
            storage_key: THEME_STORAGE_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ThemeToggle {
    button: Selector,
    storage_key: String,
    current: Theme,
}

impl ThemeToggle {
    /// Pick the initial theme and apply it to `doc`.
    pub fn init(
        doc: &mut Document,
        storage: &dyn Storage,
        system: Theme,
        config: ThemeConfig,
    ) -> Result<Self, SelectorError> {
        let stored = storage.get(&config.storage_key);
        let current = match stored.as_deref().map(str::parse::<Theme>) {
            Some(Ok(theme)) => theme,
            Some(Err(err)) => {
                warn!(%err, "ignoring stored theme");
                system
            }
            None => system,
        };
        let toggle = Self {
            button: Selector::parse(&config.button_selector)?,
            storage_key: config.storage_key,
            current,
        };
        toggle.apply(doc);
        Ok(toggle)
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    pub fn button_selector(&self) -> &Selector {
        &self.button
    }

    pub fn button(&self, doc: &Document) -> Option<NodeId> {
        doc.query(&self.button)
    }

    /// Flip the theme, apply it, and remember the choice. The page is updated
    /// even when the store refuses the write.
    pub fn toggle(
        &mut self,
        doc: &mut Document,
        storage: &mut dyn Storage,
    ) -> Result<Theme, StorageError> {
        self.set(doc, storage, self.current.toggled())
    }

    pub fn set(
        &mut self,
        doc: &mut Document,
        storage: &mut dyn Storage,
        theme: Theme,
    ) -> Result<Theme, StorageError> {
        self.current = theme;
        self.apply(doc);
        debug!(%theme, "theme changed");
        storage.set(&self.storage_key, theme.as_str())?;
        Ok(theme)
    }

    fn apply(&self, doc: &mut Document) {
        let root = doc.root();
        doc.set_attr(root, "data-theme", self.current.as_str());
        let label = match self.current {
            Theme::Light => "Switch to dark mode",
            Theme::Dark => "Switch to light mode",
        };
        for button in doc.query_all(&self.button) {
            doc.set_attr(button, "aria-label", label);
            doc.set_attr(button, "aria-pressed", bool_str(self.current == Theme::Dark));
        }
    }
}

fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn page() -> Document {
        Document::from_markup(r#"<button class="theme-toggle">theme</button>"#)
    }

    #[test]
    fn falls_back_to_system_preference() {
        let mut doc = page();
        let storage = MemoryStorage::new();
        let t = ThemeToggle::init(&mut doc, &storage, Theme::Dark, ThemeConfig::default()).unwrap();
        assert_eq!(t.current(), Theme::Dark);
        assert_eq!(doc.attr(doc.root(), "data-theme"), Some("dark"));
    }

    #[test]
    fn stored_choice_wins_and_toggle_persists() {
        let mut doc = page();
        let mut storage = MemoryStorage::new();
        storage.set("theme", "light").unwrap();
        let mut t =
            ThemeToggle::init(&mut doc, &storage, Theme::Dark, ThemeConfig::default()).unwrap();
        assert_eq!(t.current(), Theme::Light);

        assert_eq!(t.toggle(&mut doc, &mut storage), Ok(Theme::Dark));
        assert_eq!(storage.get("theme").as_deref(), Some("dark"));
        let button = t.button(&doc).unwrap();
        assert_eq!(doc.attr(button, "aria-label"), Some("Switch to light mode"));
        assert_eq!(doc.attr(button, "aria-pressed"), Some("true"));
    }

    #[test]
    fn unknown_stored_value_is_ignored() {
        let mut doc = page();
        let mut storage = MemoryStorage::new();
        storage.set("theme", "sepia").unwrap();
        let t = ThemeToggle::init(&mut doc, &storage, Theme::Light, ThemeConfig::default()).unwrap();
        assert_eq!(t.current(), Theme::Light);
    }

    #[test]
    fn parse_error_names_the_value() {
        let err = " Sepia ".parse::<Theme>().unwrap_err();
        assert_eq!(err, UnknownTheme("sepia".to_string()));
        assert_eq!(err.to_string(), "unknown theme `sepia`");
        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert!(boxed.source().is_none());
    }

    #[test]
    fn storage_failure_still_applies_theme() {
        let mut doc = page();
        let mut storage = MemoryStorage::with_limit(0);
        let mut t =
            ThemeToggle::init(&mut doc, &storage, Theme::Light, ThemeConfig::default()).unwrap();
        assert!(t.toggle(&mut doc, &mut storage).is_err());
        assert_eq!(t.current(), Theme::Dark);
        assert_eq!(doc.attr(doc.root(), "data-theme"), Some("dark"));
    }
}

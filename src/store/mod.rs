//! Durable preferences: a string key/value backend plus typed records on top.
//!
//! Reads never fail from the caller's point of view. An unreadable backend or
//! a value that no longer parses is logged and reported as absent, so the
//! controllers fall back to their defaults. Writes return their error; the
//! caller decides whether to surface it.

mod file;
mod memory;

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::LayoutPreferences;
use crate::palette::ThemePalette;
use crate::theme::{Font, ThemeMode};

pub use file::FileStore;
pub use memory::MemoryStore;

pub const THEME_MODE_KEY: &str = "theme-mode";
pub const THEME_COLOR_KEY: &str = "theme-color";
pub const THEME_RADIUS_KEY: &str = "theme-radius";
pub const THEME_FONT_KEY: &str = "theme-font";
pub const CUSTOM_THEME_KEY: &str = "custom-theme";
pub const LAYOUT_CONFIG_KEY: &str = "layout-config";

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("preference storage is unavailable")]
    Unavailable,
    #[error("failed to read preferences: {path}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write preferences: {path}")]
    Write { path: PathBuf, source: io::Error },
    #[error("preferences file is corrupt: {path}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to serialize preference `{key}`")]
    Serialize {
        key: &'static str,
        source: serde_json::Error,
    },
    #[error("storage quota exceeded while writing `{key}`")]
    QuotaExceeded { key: String },
}

/// String-keyed storage with local-storage semantics.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;
}

/// Theme fields as last persisted; each is `None` when absent or unreadable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedTheme {
    pub mode: Option<ThemeMode>,
    pub seed_color: Option<String>,
    pub radius: Option<f32>,
    pub font: Option<Font>,
    pub custom_palette: Option<ThemePalette>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomThemeRecord {
    css_vars: ThemePalette,
}

/// Typed access to the persisted keys, shared by both controllers.
#[derive(Clone)]
pub struct PreferenceStore {
    backend: Rc<dyn KeyValueStore>,
}

impl fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferenceStore").finish_non_exhaustive()
    }
}

impl PreferenceStore {
    pub fn new(backend: Rc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn load_theme(&self) -> PersistedTheme {
        PersistedTheme {
            mode: self.read_parsed(THEME_MODE_KEY, ThemeMode::from_str),
            seed_color: self
                .read(THEME_COLOR_KEY)
                .filter(|color| !color.trim().is_empty()),
            radius: self.read_parsed(THEME_RADIUS_KEY, parse_radius),
            font: self.read_parsed(THEME_FONT_KEY, Font::from_str),
            custom_palette: self.read_parsed(CUSTOM_THEME_KEY, |raw| {
                serde_json::from_str::<CustomThemeRecord>(raw).map(|record| record.css_vars)
            }),
        }
    }

    pub fn save_mode(&self, mode: ThemeMode) -> StoreResult<()> {
        self.backend.set(THEME_MODE_KEY, mode.as_str())
    }

    pub fn save_seed_color(&self, color: &str) -> StoreResult<()> {
        self.backend.set(THEME_COLOR_KEY, color)
    }

    pub fn save_radius(&self, radius: f32) -> StoreResult<()> {
        self.backend.set(THEME_RADIUS_KEY, &radius.to_string())
    }

    pub fn save_font(&self, font: Font) -> StoreResult<()> {
        self.backend.set(THEME_FONT_KEY, font.as_str())
    }

    /// `None` deletes the key, deactivating the custom theme.
    pub fn save_custom_palette(&self, palette: Option<&ThemePalette>) -> StoreResult<()> {
        let Some(palette) = palette else {
            return self.backend.remove(CUSTOM_THEME_KEY);
        };
        let record = CustomThemeRecord {
            css_vars: palette.clone(),
        };
        let serialized = serde_json::to_string(&record).map_err(|source| StoreError::Serialize {
            key: CUSTOM_THEME_KEY,
            source,
        })?;
        self.backend.set(CUSTOM_THEME_KEY, &serialized)
    }

    pub fn load_layout(&self) -> Option<LayoutPreferences> {
        self.read_parsed(LAYOUT_CONFIG_KEY, |raw| {
            serde_json::from_str::<LayoutPreferences>(raw)
        })
    }

    pub fn save_layout(&self, layout: &LayoutPreferences) -> StoreResult<()> {
        let serialized = serde_json::to_string(layout).map_err(|source| StoreError::Serialize {
            key: LAYOUT_CONFIG_KEY,
            source,
        })?;
        self.backend.set(LAYOUT_CONFIG_KEY, &serialized)
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(key, %err, "preference storage read failed; treating as absent");
                None
            }
        }
    }

    fn read_parsed<T, E: fmt::Display>(
        &self,
        key: &str,
        parse: impl FnOnce(&str) -> Result<T, E>,
    ) -> Option<T> {
        let raw = self.read(key)?;
        match parse(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(key, %err, "stored preference is corrupt; treating as absent");
                None
            }
        }
    }
}

fn parse_radius(raw: &str) -> Result<f32, String> {
    let radius: f32 = raw
        .trim()
        .parse()
        .map_err(|err| format!("invalid radius {raw:?}: {err}"))?;
    if (0.0..=1.0).contains(&radius) {
        Ok(radius)
    } else {
        Err(format!("radius {radius} outside [0, 1]"))
    }
}

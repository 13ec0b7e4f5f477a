mod controller;
mod scheme;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::{to_perceptual, Oklch, DEFAULT_SEED};
use crate::keyword::keyword_enum;
use crate::palette::ThemePalette;

pub use controller::ThemeController;
pub use scheme::{ManualColorScheme, SchemeListener, SchemeSubscription, SystemColorScheme};

pub const DEFAULT_SEED_COLOR: &str = "#000000";
pub const DEFAULT_RADIUS: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    System,
    Light,
    Dark,
}

keyword_enum! {
    /// Dashboard typeface, painted as a `font-<name>` class on the root.
    #[derive(Default)]
    Font, "font" {
        #[default]
        Inter => "inter",
        Manrope => "manrope",
        System => "system",
    }
}

impl Font {
    pub fn class_name(self) -> String {
        format!("font-{}", self.as_str())
    }
}

/// The paintable resolution of a [`ThemeMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectiveMode {
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown theme mode `{0}` (expected light, dark, or system)")]
pub struct ParseThemeModeError(String);

impl ThemeMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            ThemeMode::System => "system",
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    /// Resolves `System` against the OS preference; explicit modes pass through.
    pub const fn resolve(self, prefers_dark: bool) -> EffectiveMode {
        match self {
            ThemeMode::Light => EffectiveMode::Light,
            ThemeMode::Dark => EffectiveMode::Dark,
            ThemeMode::System if prefers_dark => EffectiveMode::Dark,
            ThemeMode::System => EffectiveMode::Light,
        }
    }
}

impl FromStr for ThemeMode {
    type Err = ParseThemeModeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "system" => Ok(ThemeMode::System),
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            _ => Err(ParseThemeModeError(value.to_string())),
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EffectiveMode {
    /// Marker class placed on the document root.
    pub const fn class_name(self) -> &'static str {
        match self {
            EffectiveMode::Light => "light",
            EffectiveMode::Dark => "dark",
        }
    }

    pub const fn opposite(self) -> EffectiveMode {
        match self {
            EffectiveMode::Light => EffectiveMode::Dark,
            EffectiveMode::Dark => EffectiveMode::Light,
        }
    }
}

impl fmt::Display for EffectiveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

/// The user's color text together with its validated OKLCH value.
///
/// Text that does not parse is kept verbatim, but the perceptual value is
/// [`DEFAULT_SEED`] so synthesis always has a usable input.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedColor {
    original: String,
    perceptual: Oklch,
    valid: bool,
}

impl SeedColor {
    pub fn new(input: impl Into<String>) -> Self {
        let original = input.into();
        match to_perceptual(&original) {
            Ok(perceptual) => Self {
                original,
                perceptual,
                valid: true,
            },
            Err(err) => {
                tracing::warn!(input = original.as_str(), %err, "invalid seed color; using default seed");
                Self {
                    original,
                    perceptual: DEFAULT_SEED,
                    valid: false,
                }
            }
        }
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn perceptual(&self) -> Oklch {
        self.perceptual
    }

    /// `false` when the original text fell back to the default seed.
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Live theme state owned by [`ThemeController`]; callers get clones.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeState {
    pub mode: ThemeMode,
    pub seed: SeedColor,
    pub radius: f32,
    pub font: Font,
    pub custom_palette: Option<ThemePalette>,
}

/// Values used for any preference the store does not have.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeDefaults {
    pub mode: ThemeMode,
    pub seed_color: String,
    pub radius: f32,
    pub font: Font,
}

impl Default for ThemeDefaults {
    fn default() -> Self {
        Self {
            mode: ThemeMode::System,
            seed_color: DEFAULT_SEED_COLOR.to_string(),
            radius: DEFAULT_RADIUS,
            font: Font::default(),
        }
    }
}

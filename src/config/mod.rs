use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::theme::{Font, ThemeDefaults, ThemeMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigPathError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
}

const APP_DIR: &str = "dashtint";
const APP_CONFIG_FILE: &str = "config.json";
pub(crate) const PREFERENCES_FILE: &str = "preferences.json";

/// Installation-level defaults from `config.json`, applied before any
/// persisted user preference.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub default_mode: Option<ThemeMode>,
    #[serde(default)]
    pub default_seed_color: Option<String>,
    #[serde(default)]
    pub default_radius: Option<f32>,
    #[serde(default)]
    pub default_font: Option<Font>,
}

impl AppConfig {
    pub fn theme_defaults(&self) -> ThemeDefaults {
        let builtin = ThemeDefaults::default();
        ThemeDefaults {
            mode: self.default_mode.unwrap_or(builtin.mode),
            seed_color: self
                .default_seed_color
                .clone()
                .unwrap_or(builtin.seed_color),
            radius: self
                .default_radius
                .filter(|radius| (0.0..=1.0).contains(radius))
                .unwrap_or(builtin.radius),
            font: self.default_font.unwrap_or(builtin.font),
        }
    }
}

/// Reads `config.json` from `dir`; absent or malformed files yield defaults.
pub fn load_app_config_in(dir: &Path) -> AppConfig {
    let path = dir.join(APP_CONFIG_FILE);
    if !path.exists() {
        return AppConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            AppConfig::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            AppConfig::default()
        }
    }
}

/// `$XDG_CONFIG_HOME/dashtint`, or `$HOME/.config/dashtint`.
pub fn default_config_dir() -> Result<PathBuf, ConfigPathError> {
    let (xdg_config_home, home) = config_env_dirs();
    app_config_dir(xdg_config_home.as_deref(), home.as_deref())
}

pub(crate) fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub(crate) fn app_config_dir(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(APP_DIR);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture_root() -> PathBuf {
        let mut path = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::SystemTime::UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos());
        let pid = std::process::id();
        path.push(format!("dashtint-config-{pid}-{nanos}"));
        path
    }

    fn with_temp_root<F: FnOnce(&Path)>(f: F) {
        let root = fixture_root();
        fs::create_dir_all(&root).unwrap();
        f(&root);
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn app_config_dir_prefers_xdg_config_home() {
        let path = app_config_dir(
            Some(Path::new("/tmp/config-root")),
            Some(Path::new("/tmp/home")),
        )
        .expect("path should resolve");

        assert_eq!(path, PathBuf::from("/tmp/config-root/dashtint"));
    }

    #[test]
    fn app_config_dir_falls_back_to_home_dot_config() {
        let path = app_config_dir(Some(Path::new("")), Some(Path::new("/tmp/home")))
            .expect("path should resolve");

        assert_eq!(path, PathBuf::from("/tmp/home/.config/dashtint"));
    }

    #[test]
    fn app_config_dir_errors_when_home_missing_and_xdg_unset() {
        let error = app_config_dir(None, None).unwrap_err();
        assert_eq!(error, ConfigPathError::MissingHomeDirectory);
    }

    #[test]
    fn missing_config_yields_builtin_defaults() {
        with_temp_root(|root| {
            let config = load_app_config_in(root);
            assert_eq!(config, AppConfig::default());
            assert_eq!(config.theme_defaults(), ThemeDefaults::default());
        });
    }

    #[test]
    fn config_overrides_theme_defaults() {
        with_temp_root(|root| {
            fs::write(
                root.join(APP_CONFIG_FILE),
                r##"{"default_mode": "dark", "default_seed_color": "#2563eb", "default_radius": 0.25, "default_font": "manrope"}"##,
            )
            .unwrap();

            let defaults = load_app_config_in(root).theme_defaults();
            assert_eq!(defaults.mode, ThemeMode::Dark);
            assert_eq!(defaults.seed_color, "#2563eb");
            assert_eq!(defaults.radius, 0.25);
            assert_eq!(defaults.font, Font::Manrope);
        });
    }

    #[test]
    fn out_of_range_radius_is_ignored() {
        let config = AppConfig {
            default_radius: Some(4.0),
            ..AppConfig::default()
        };
        assert_eq!(config.theme_defaults().radius, ThemeDefaults::default().radius);
    }

    #[test]
    fn malformed_config_falls_back_to_defaults() {
        with_temp_root(|root| {
            fs::write(root.join(APP_CONFIG_FILE), "{ nope").unwrap();
            assert_eq!(load_app_config_in(root), AppConfig::default());
        });
    }
}

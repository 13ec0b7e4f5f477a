use std::path::Path;
use std::rc::Rc;

use serde::Deserialize;

use crate::config::{default_config_dir, load_app_config_in};
use crate::context::AppearanceContext;
use crate::dom::{DocumentRoot, DomApplier};
use crate::error::{AppError, AppResult};
use crate::layout::LayoutController;
use crate::palette::ThemePalette;
use crate::store::{FileStore, PreferenceStore};
use crate::theme::{SystemColorScheme, ThemeController};

/// Builds both controllers over the default config directory.
pub fn bootstrap(
    scheme: Rc<dyn SystemColorScheme>,
    root: Box<dyn DocumentRoot>,
) -> AppResult<AppearanceContext> {
    let config_dir = default_config_dir()?;
    Ok(bootstrap_in(&config_dir, scheme, root))
}

/// Builds both controllers over `config_dir`, sharing one preference file.
pub fn bootstrap_in(
    config_dir: &Path,
    scheme: Rc<dyn SystemColorScheme>,
    root: Box<dyn DocumentRoot>,
) -> AppearanceContext {
    let app_config = load_app_config_in(config_dir);
    let defaults = app_config.theme_defaults();
    tracing::info!(
        config_dir = %config_dir.display(),
        default_mode = %defaults.mode,
        default_seed = defaults.seed_color.as_str(),
        default_radius = defaults.radius,
        "loaded app config"
    );

    let store = PreferenceStore::new(Rc::new(FileStore::in_dir(config_dir)));
    let theme = ThemeController::new(store.clone(), DomApplier::new(root), scheme, defaults);
    let layout = LayoutController::new(store);
    AppearanceContext {
        theme: Rc::new(theme),
        layout: Rc::new(layout),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CustomThemeFile {
    Envelope {
        #[serde(rename = "cssVars")]
        css_vars: ThemePalette,
    },
    Bare(ThemePalette),
}

/// Reads a hand-authored palette: either `{"light":..,"dark":..}` or the
/// `{"cssVars":{..}}` envelope used in storage.
pub fn load_custom_palette(path: &Path) -> AppResult<ThemePalette> {
    let contents = std::fs::read_to_string(path).map_err(|source| AppError::ReadCustomTheme {
        path: path.to_path_buf(),
        source,
    })?;
    let file: CustomThemeFile =
        serde_json::from_str(&contents).map_err(|source| AppError::ParseCustomTheme {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(match file {
        CustomThemeFile::Envelope { css_vars } => css_vars,
        CustomThemeFile::Bare(palette) => palette,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::DEFAULT_SEED;
    use crate::dom::StyleDocument;
    use crate::layout::SidebarSide;
    use crate::palette::synthesize;
    use crate::theme::{ManualColorScheme, ThemeMode};
    use std::fs;
    use std::path::PathBuf;

    fn fixture_root() -> PathBuf {
        let mut path = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::SystemTime::UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos());
        let pid = std::process::id();
        path.push(format!("dashtint-app-{pid}-{nanos}"));
        path
    }

    fn with_temp_root<F: FnOnce(&Path)>(f: F) {
        let root = fixture_root();
        fs::create_dir_all(&root).unwrap();
        f(&root);
        let _ = fs::remove_dir_all(&root);
    }

    fn boot(dir: &Path, prefers_dark: bool) -> AppearanceContext {
        bootstrap_in(
            dir,
            Rc::new(ManualColorScheme::new(prefers_dark)),
            Box::new(StyleDocument::new()),
        )
    }

    #[test]
    fn config_defaults_apply_until_user_overrides() {
        with_temp_root(|root| {
            fs::write(
                root.join("config.json"),
                r##"{"default_mode":"dark","default_seed_color":"#2563eb","default_radius":0.25}"##,
            )
            .unwrap();

            let context = boot(root, false);
            let state = context.theme.current();
            assert_eq!(state.mode, ThemeMode::Dark);
            assert_eq!(state.seed.original(), "#2563eb");
            assert_eq!(state.radius, 0.25);

            context.theme.set_mode(ThemeMode::Light).unwrap();
            let restarted = boot(root, false);
            assert_eq!(restarted.theme.current().mode, ThemeMode::Light);
            assert_eq!(restarted.theme.current().radius, 0.25);
        });
    }

    #[test]
    fn controllers_share_one_preference_file() {
        with_temp_root(|root| {
            let context = boot(root, true);
            context.theme.set_radius(0.75).unwrap();
            context.layout.set_sidebar_side(SidebarSide::Right).unwrap();

            let contents = fs::read_to_string(root.join("preferences.json")).unwrap();
            let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
            assert_eq!(value["theme-radius"], "0.75");
            assert!(value["layout-config"].is_string());

            let restarted = boot(root, true);
            assert_eq!(restarted.layout.current().sidebar_side, SidebarSide::Right);
            assert!(restarted.theme.document().has_class("dark"));
        });
    }

    #[test]
    fn custom_palette_accepts_both_shapes() {
        with_temp_root(|root| {
            let palette = synthesize(DEFAULT_SEED);
            let bare = root.join("bare.json");
            let wrapped = root.join("wrapped.json");
            fs::write(&bare, serde_json::to_string(&palette).unwrap()).unwrap();
            fs::write(
                &wrapped,
                serde_json::json!({ "cssVars": &palette }).to_string(),
            )
            .unwrap();

            assert_eq!(load_custom_palette(&bare).unwrap(), palette);
            assert_eq!(load_custom_palette(&wrapped).unwrap(), palette);
        });
    }

    #[test]
    fn incomplete_custom_palette_is_rejected() {
        with_temp_root(|root| {
            let path = root.join("partial.json");
            fs::write(&path, r#"{"light":{"primary":"red"},"dark":{}}"#).unwrap();
            assert!(matches!(
                load_custom_palette(&path),
                Err(AppError::ParseCustomTheme { .. })
            ));
            assert!(matches!(
                load_custom_palette(&root.join("missing.json")),
                Err(AppError::ReadCustomTheme { .. })
            ));
        });
    }
}

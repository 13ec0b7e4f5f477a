use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::{
    EffectiveMode, Font, SchemeSubscription, SeedColor, SystemColorScheme, ThemeDefaults, ThemeMode,
    ThemeState,
};
use crate::dom::{DomApplier, StyleDocument};
use crate::palette::{synthesize, ThemePalette};
use crate::store::{PersistedTheme, PreferenceStore, StoreResult};

/// Owns the live theme state and keeps the document painted to match it.
///
/// Every setter updates memory first, then persists, then repaints. A failed
/// write is returned to the caller but the new value stays in effect.
pub struct ThemeController {
    runtime: Rc<RefCell<ThemeRuntime>>,
    _scheme_subscription: SchemeSubscription,
}

struct ThemeRuntime {
    state: ThemeState,
    synthesized: ThemePalette,
    defaults: ThemeDefaults,
    store: PreferenceStore,
    applier: DomApplier,
    scheme: Rc<dyn SystemColorScheme>,
}

impl ThemeController {
    /// Hydrates from `store`, paints once, and subscribes to OS scheme changes.
    pub fn new(
        store: PreferenceStore,
        applier: DomApplier,
        scheme: Rc<dyn SystemColorScheme>,
        defaults: ThemeDefaults,
    ) -> Self {
        let state = hydrate(store.load_theme(), &defaults);
        let synthesized = synthesize(state.seed.perceptual());
        let runtime = Rc::new(RefCell::new(ThemeRuntime {
            state,
            synthesized,
            defaults,
            store,
            applier,
            scheme: Rc::clone(&scheme),
        }));
        runtime.borrow_mut().repaint();

        let weak = Rc::downgrade(&runtime);
        let subscription = scheme.subscribe(Rc::new(move |prefers_dark| {
            let Some(runtime) = weak.upgrade() else {
                return;
            };
            let Ok(mut runtime) = runtime.try_borrow_mut() else {
                tracing::debug!("theme busy during scheme change; next repaint picks it up");
                return;
            };
            runtime.on_scheme_changed(prefers_dark);
        }));

        {
            let runtime = runtime.borrow();
            tracing::info!(
                mode = %runtime.state.mode,
                seed = runtime.state.seed.original(),
                radius = runtime.state.radius,
                font = %runtime.state.font,
                custom = runtime.state.custom_palette.is_some(),
                "theme controller ready"
            );
        }

        Self {
            runtime,
            _scheme_subscription: subscription,
        }
    }

    pub fn set_mode(&self, mode: ThemeMode) -> StoreResult<()> {
        let mut runtime = self.runtime.borrow_mut();
        runtime.state.mode = mode;
        let persisted = runtime.store.save_mode(mode);
        runtime.repaint();
        report("theme-mode", persisted)
    }

    /// Accepts any color text; unparseable input paints with the default seed
    /// but is still stored verbatim.
    pub fn set_seed_color(&self, color: &str) -> StoreResult<()> {
        let mut runtime = self.runtime.borrow_mut();
        runtime.state.seed = SeedColor::new(color);
        runtime.synthesized = synthesize(runtime.state.seed.perceptual());
        let persisted = runtime.store.save_seed_color(color);
        runtime.repaint();
        report("theme-color", persisted)
    }

    /// Clamps to `[0, 1]`; a non-finite value resets to the default radius.
    pub fn set_radius(&self, radius: f32) -> StoreResult<()> {
        let mut runtime = self.runtime.borrow_mut();
        let radius = sanitize_radius(radius, runtime.defaults.radius);
        runtime.state.radius = radius;
        let persisted = runtime.store.save_radius(radius);
        runtime.repaint();
        report("theme-radius", persisted)
    }

    pub fn set_font(&self, font: Font) -> StoreResult<()> {
        let mut runtime = self.runtime.borrow_mut();
        runtime.state.font = font;
        let persisted = runtime.store.save_font(font);
        runtime.repaint();
        report("theme-font", persisted)
    }

    /// `Some` overrides seed synthesis; `None` goes back to it.
    pub fn set_custom_palette(&self, palette: Option<ThemePalette>) -> StoreResult<()> {
        let mut runtime = self.runtime.borrow_mut();
        let persisted = runtime.store.save_custom_palette(palette.as_ref());
        runtime.state.custom_palette = palette;
        runtime.repaint();
        report("custom-theme", persisted)
    }

    /// Resolved on every call so it always reflects the live OS preference.
    pub fn effective_mode(&self) -> EffectiveMode {
        self.runtime.borrow().effective_mode()
    }

    pub fn current(&self) -> ThemeState {
        self.runtime.borrow().state.clone()
    }

    /// The role maps currently painted: the custom palette when set,
    /// otherwise the one synthesized from the seed.
    pub fn active_palette(&self) -> ThemePalette {
        self.runtime.borrow().active_palette().clone()
    }

    /// Re-reads every theme preference from the store and repaints.
    pub fn reload(&self) {
        let mut runtime = self.runtime.borrow_mut();
        let state = hydrate(runtime.store.load_theme(), &runtime.defaults);
        runtime.synthesized = synthesize(state.seed.perceptual());
        runtime.state = state;
        runtime.repaint();
        tracing::debug!("theme reloaded from preference store");
    }

    pub fn document(&self) -> StyleDocument {
        self.runtime.borrow().applier.snapshot()
    }

    pub fn apply_count(&self) -> u64 {
        self.runtime.borrow().applier.apply_count()
    }
}

impl fmt::Debug for ThemeController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeController")
            .field("state", &self.runtime.borrow().state)
            .finish_non_exhaustive()
    }
}

impl ThemeRuntime {
    fn effective_mode(&self) -> EffectiveMode {
        self.state.mode.resolve(self.scheme.prefers_dark())
    }

    fn active_palette(&self) -> &ThemePalette {
        self.state
            .custom_palette
            .as_ref()
            .unwrap_or(&self.synthesized)
    }

    fn repaint(&mut self) {
        let mode = self.effective_mode();
        let palette = match &self.state.custom_palette {
            Some(custom) => custom,
            None => &self.synthesized,
        };
        self.applier
            .apply(palette.for_mode(mode), self.state.radius, mode);
        self.applier.apply_font(self.state.font);
    }

    fn on_scheme_changed(&mut self, prefers_dark: bool) {
        if self.state.mode != ThemeMode::System {
            tracing::debug!(prefers_dark, mode = %self.state.mode, "ignoring scheme change");
            return;
        }
        self.repaint();
        tracing::info!(prefers_dark, "repainted theme for system scheme change");
    }
}

fn hydrate(persisted: PersistedTheme, defaults: &ThemeDefaults) -> ThemeState {
    let seed_color = persisted
        .seed_color
        .unwrap_or_else(|| defaults.seed_color.clone());
    ThemeState {
        mode: persisted.mode.unwrap_or(defaults.mode),
        seed: SeedColor::new(seed_color),
        radius: persisted.radius.unwrap_or(defaults.radius),
        font: persisted.font.unwrap_or(defaults.font),
        custom_palette: persisted.custom_palette,
    }
}

fn sanitize_radius(radius: f32, fallback: f32) -> f32 {
    if !radius.is_finite() {
        tracing::warn!(radius, fallback, "non-finite radius; using default");
        return fallback;
    }
    let clamped = radius.clamp(0.0, 1.0);
    if clamped != radius {
        tracing::warn!(radius, clamped, "radius outside [0, 1]; clamped");
    }
    clamped
}

fn report(key: &'static str, persisted: StoreResult<()>) -> StoreResult<()> {
    if let Err(err) = &persisted {
        tracing::warn!(key, %err, "failed to persist theme preference; keeping in-memory value");
    }
    persisted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{to_perceptual, DEFAULT_SEED};
    use crate::dom::{role_property, RADIUS_PROPERTY};
    use crate::palette::Role;
    use crate::store::{MemoryStore, StoreError};
    use crate::theme::ManualColorScheme;

    struct Harness {
        backend: Rc<MemoryStore>,
        scheme: ManualColorScheme,
    }

    impl Harness {
        fn new(prefers_dark: bool) -> Self {
            Self::with_backend(MemoryStore::new(), prefers_dark)
        }

        fn with_backend(backend: MemoryStore, prefers_dark: bool) -> Self {
            Self {
                backend: Rc::new(backend),
                scheme: ManualColorScheme::new(prefers_dark),
            }
        }

        fn controller(&self) -> ThemeController {
            ThemeController::new(
                PreferenceStore::new(self.backend.clone()),
                DomApplier::in_memory(),
                Rc::new(self.scheme.clone()),
                ThemeDefaults::default(),
            )
        }
    }

    #[test]
    fn fresh_store_uses_defaults_and_paints_once() {
        let harness = Harness::new(false);
        let controller = harness.controller();

        let state = controller.current();
        assert_eq!(state.mode, ThemeMode::System);
        assert_eq!(state.seed.original(), "#000000");
        assert_eq!(state.radius, 0.5);
        assert_eq!(state.font, Font::Inter);
        assert_eq!(state.custom_palette, None);
        assert_eq!(controller.apply_count(), 1);
        assert!(controller.document().has_class("light"));
        assert!(controller.document().has_class("font-inter"));
    }

    #[test]
    fn setters_round_trip_through_restart() {
        let harness = Harness::new(false);
        {
            let controller = harness.controller();
            controller.set_mode(ThemeMode::Dark).unwrap();
            controller.set_seed_color("#2563eb").unwrap();
            controller.set_radius(0.75).unwrap();
            assert_eq!(controller.current().seed.original(), "#2563eb");
        }

        let restarted = harness.controller();
        let state = restarted.current();
        assert_eq!(state.mode, ThemeMode::Dark);
        assert_eq!(state.seed.original(), "#2563eb");
        assert_eq!(state.radius, 0.75);
        assert_eq!(
            restarted.document().property(RADIUS_PROPERTY),
            Some("0.75rem")
        );
    }

    #[test]
    fn font_round_trips_and_replaces_marker_class() {
        let harness = Harness::new(false);
        {
            let controller = harness.controller();
            controller.set_font(Font::Manrope).unwrap();
            let document = controller.document();
            assert!(document.has_class("font-manrope"));
            assert!(!document.has_class("font-inter"));
        }

        let restarted = harness.controller();
        assert_eq!(restarted.current().font, Font::Manrope);
        assert!(restarted.document().has_class("font-manrope"));
    }

    #[test]
    fn unknown_stored_font_hydrates_default() {
        let backend = MemoryStore::new();
        crate::store::KeyValueStore::set(&backend, "theme-font", "comic-sans").unwrap();
        let harness = Harness::with_backend(backend, false);
        let controller = harness.controller();

        assert_eq!(controller.current().font, Font::Inter);
        assert!(controller.document().has_class("font-inter"));
    }

    #[test]
    fn seed_change_repaints_primary() {
        let harness = Harness::new(false);
        let controller = harness.controller();
        controller.set_mode(ThemeMode::Light).unwrap();
        controller.set_seed_color("#2563eb").unwrap();

        let expected = synthesize(to_perceptual("#2563eb").unwrap());
        assert_eq!(
            controller.document().property(&role_property(Role::Primary)),
            Some(expected.light.get(Role::Primary))
        );
    }

    #[test]
    fn invalid_seed_paints_default_but_keeps_text() {
        let harness = Harness::new(false);
        let controller = harness.controller();
        controller.set_seed_color("not-a-color").unwrap();

        let state = controller.current();
        assert_eq!(state.seed.original(), "not-a-color");
        assert!(!state.seed.is_valid());
        assert_eq!(controller.active_palette(), synthesize(DEFAULT_SEED));
    }

    #[test]
    fn system_mode_follows_os_changes() {
        let harness = Harness::new(false);
        let controller = harness.controller();
        assert_eq!(controller.effective_mode(), EffectiveMode::Light);
        let before = controller.apply_count();

        harness.scheme.set_prefers_dark(true);
        assert_eq!(controller.effective_mode(), EffectiveMode::Dark);
        assert_eq!(controller.apply_count(), before + 1);
        let document = controller.document();
        assert!(document.has_class("dark"));
        assert!(!document.has_class("light"));
    }

    #[test]
    fn explicit_mode_ignores_os_changes() {
        let harness = Harness::new(false);
        let controller = harness.controller();
        controller.set_mode(ThemeMode::Light).unwrap();
        let before = controller.apply_count();

        harness.scheme.set_prefers_dark(true);
        assert_eq!(controller.effective_mode(), EffectiveMode::Light);
        assert_eq!(controller.apply_count(), before);
    }

    #[test]
    fn subscribes_once_and_unsubscribes_on_drop() {
        let harness = Harness::new(false);
        let controller = harness.controller();
        controller.set_mode(ThemeMode::Dark).unwrap();
        controller.set_mode(ThemeMode::System).unwrap();
        assert_eq!(harness.scheme.listener_count(), 1);

        drop(controller);
        assert_eq!(harness.scheme.listener_count(), 0);
    }

    #[test]
    fn custom_palette_overrides_synthesis_and_can_be_cleared() {
        let harness = Harness::new(true);
        let controller = harness.controller();
        let custom = synthesize(to_perceptual("oklch(0.6 0.2 140)").unwrap());
        controller.set_custom_palette(Some(custom.clone())).unwrap();
        assert_eq!(
            controller.document().property("--primary"),
            Some(custom.dark.get(Role::Primary))
        );

        controller.set_seed_color("#2563eb").unwrap();
        assert_eq!(controller.active_palette(), custom);

        controller.set_custom_palette(None).unwrap();
        let synthesized = synthesize(to_perceptual("#2563eb").unwrap());
        assert_eq!(controller.active_palette(), synthesized);
        assert_eq!(
            controller.document().property("--primary"),
            Some(synthesized.dark.get(Role::Primary))
        );
    }

    #[test]
    fn radius_is_clamped_and_nan_resets() {
        let harness = Harness::new(false);
        let controller = harness.controller();
        controller.set_radius(2.5).unwrap();
        assert_eq!(controller.current().radius, 1.0);
        controller.set_radius(-1.0).unwrap();
        assert_eq!(controller.current().radius, 0.0);
        controller.set_radius(f32::NAN).unwrap();
        assert_eq!(controller.current().radius, 0.5);
    }

    #[test]
    fn write_failure_is_reported_without_rollback() {
        let harness = Harness::with_backend(MemoryStore::with_quota(0), false);
        let controller = harness.controller();

        let err = controller.set_mode(ThemeMode::Dark).unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { .. }));
        assert_eq!(controller.current().mode, ThemeMode::Dark);
        assert!(controller.document().has_class("dark"));
    }

    #[test]
    fn reload_picks_up_external_writes() {
        let harness = Harness::new(false);
        let controller = harness.controller();
        let other = PreferenceStore::new(harness.backend.clone());
        other.save_mode(ThemeMode::Dark).unwrap();
        other.save_radius(0.25).unwrap();

        assert_eq!(controller.current().mode, ThemeMode::System);
        controller.reload();
        assert_eq!(controller.current().mode, ThemeMode::Dark);
        assert_eq!(controller.current().radius, 0.25);
        assert!(controller.document().has_class("dark"));
    }

    #[test]
    fn corrupt_storage_hydrates_defaults() {
        let backend = MemoryStore::new();
        crate::store::KeyValueStore::set(&backend, "theme-mode", "sepia").unwrap();
        crate::store::KeyValueStore::set(&backend, "theme-radius", "NaN").unwrap();
        let harness = Harness::with_backend(backend, true);
        let controller = harness.controller();

        assert_eq!(controller.current().mode, ThemeMode::System);
        assert_eq!(controller.current().radius, 0.5);
        assert_eq!(controller.effective_mode(), EffectiveMode::Dark);
    }
}

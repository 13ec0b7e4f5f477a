//! Process-wide access to the installed controllers.
//!
//! Consumers deep in the UI tree reach the controllers through [`theme`] and
//! [`layout`] instead of threading them through every call. Using either
//! before [`install`] is a programming error and panics.

use std::cell::RefCell;
use std::rc::Rc;

use crate::layout::LayoutController;
use crate::theme::ThemeController;

#[derive(Debug, Clone)]
pub struct AppearanceContext {
    pub theme: Rc<ThemeController>,
    pub layout: Rc<LayoutController>,
}

thread_local! {
    static ACTIVE: RefCell<Option<AppearanceContext>> = const { RefCell::new(None) };
}

/// Installs `context` for this thread, returning the one it replaces.
pub fn install(context: AppearanceContext) -> Option<AppearanceContext> {
    let previous = ACTIVE.with(|active| active.borrow_mut().replace(context));
    if previous.is_some() {
        tracing::warn!("replacing an already installed appearance context");
    }
    previous
}

pub fn teardown() -> Option<AppearanceContext> {
    ACTIVE.with(|active| active.borrow_mut().take())
}

pub fn is_installed() -> bool {
    ACTIVE.with(|active| active.borrow().is_some())
}

pub fn try_theme() -> Option<Rc<ThemeController>> {
    ACTIVE.with(|active| active.borrow().as_ref().map(|ctx| Rc::clone(&ctx.theme)))
}

pub fn try_layout() -> Option<Rc<LayoutController>> {
    ACTIVE.with(|active| active.borrow().as_ref().map(|ctx| Rc::clone(&ctx.layout)))
}

/// # Panics
///
/// When no context is installed on this thread.
pub fn theme() -> Rc<ThemeController> {
    try_theme().unwrap_or_else(|| missing_context("theme"))
}

/// # Panics
///
/// When no context is installed on this thread.
pub fn layout() -> Rc<LayoutController> {
    try_layout().unwrap_or_else(|| missing_context("layout"))
}

fn missing_context(kind: &str) -> ! {
    panic!(
        "{kind} controller requested outside an appearance context; \
         call dashtint::context::install during startup"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::DomApplier;
    use crate::store::{MemoryStore, PreferenceStore};
    use crate::theme::{ManualColorScheme, ThemeDefaults, ThemeMode};

    fn sample_context() -> AppearanceContext {
        let store = PreferenceStore::new(Rc::new(MemoryStore::new()));
        let theme = ThemeController::new(
            store.clone(),
            DomApplier::in_memory(),
            Rc::new(ManualColorScheme::new(false)),
            ThemeDefaults::default(),
        );
        AppearanceContext {
            theme: Rc::new(theme),
            layout: Rc::new(LayoutController::new(store)),
        }
    }

    #[test]
    #[should_panic(expected = "theme controller requested outside an appearance context")]
    fn theme_without_context_panics() {
        let _ = theme();
    }

    #[test]
    #[should_panic(expected = "layout controller requested outside an appearance context")]
    fn layout_without_context_panics() {
        let _ = layout();
    }

    #[test]
    fn installed_context_is_shared() {
        assert!(try_theme().is_none());
        let context = sample_context();
        assert!(install(context.clone()).is_none());
        assert!(is_installed());

        theme().set_mode(ThemeMode::Dark).unwrap();
        assert_eq!(context.theme.current().mode, ThemeMode::Dark);
        assert!(Rc::ptr_eq(&layout(), &context.layout));

        assert!(install(sample_context()).is_some());
        assert!(teardown().is_some());
        assert!(!is_installed());
    }
}

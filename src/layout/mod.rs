//! Dashboard layout preferences and their controller.

use std::cell::RefCell;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::keyword::keyword_enum;
use crate::store::{PreferenceStore, StoreResult};

keyword_enum! {
    #[derive(Default)]
    SidebarSide, "sidebar side" {
        #[default]
        Left => "left",
        Right => "right",
    }
}

keyword_enum! {
    #[derive(Default)]
    SidebarVariant, "sidebar variant" {
        #[default]
        Floating => "floating",
        Sidebar => "sidebar",
        Inset => "inset",
    }
}

keyword_enum! {
    /// How the sidebar collapses: to an icon rail, off canvas, or not at all.
    #[derive(Default)]
    SidebarCollapsible, "sidebar collapsible mode" {
        #[default]
        Icon => "icon",
        Offcanvas => "offcanvas",
        None => "none",
    }
}

keyword_enum! {
    /// A boolean toggle in the header.
    HeaderOption, "header option" {
        Sticky => "sticky",
        ShowSearch => "showSearch",
        ShowThemeSwitch => "showThemeSwitch",
        ShowProfileMenu => "showProfileMenu",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderOptions {
    pub sticky: bool,
    pub show_search: bool,
    pub show_theme_switch: bool,
    pub show_profile_menu: bool,
}

impl Default for HeaderOptions {
    fn default() -> Self {
        Self {
            sticky: true,
            show_search: true,
            show_theme_switch: true,
            show_profile_menu: true,
        }
    }
}

impl HeaderOptions {
    pub fn get(&self, option: HeaderOption) -> bool {
        match option {
            HeaderOption::Sticky => self.sticky,
            HeaderOption::ShowSearch => self.show_search,
            HeaderOption::ShowThemeSwitch => self.show_theme_switch,
            HeaderOption::ShowProfileMenu => self.show_profile_menu,
        }
    }

    pub fn set(&mut self, option: HeaderOption, enabled: bool) {
        let slot = match option {
            HeaderOption::Sticky => &mut self.sticky,
            HeaderOption::ShowSearch => &mut self.show_search,
            HeaderOption::ShowThemeSwitch => &mut self.show_theme_switch,
            HeaderOption::ShowProfileMenu => &mut self.show_profile_menu,
        };
        *slot = enabled;
    }
}

/// Persisted under `layout-config`. Every field is required when reading;
/// a record missing any of them is treated as absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutPreferences {
    #[serde(rename = "sidebarPosition")]
    pub sidebar_side: SidebarSide,
    pub sidebar_variant: SidebarVariant,
    pub sidebar_collapsible: SidebarCollapsible,
    pub show_breadcrumbs: bool,
    #[serde(rename = "headerOptions")]
    pub header: HeaderOptions,
}

impl Default for LayoutPreferences {
    fn default() -> Self {
        Self {
            sidebar_side: SidebarSide::Left,
            sidebar_variant: SidebarVariant::Floating,
            sidebar_collapsible: SidebarCollapsible::Icon,
            show_breadcrumbs: true,
            header: HeaderOptions::default(),
        }
    }
}

pub type LayoutListener = Box<dyn Fn(&LayoutPreferences)>;

/// Owns the live layout preferences. Setters persist immediately and then
/// notify subscribers; a failed write keeps the new value in memory.
pub struct LayoutController {
    store: PreferenceStore,
    preferences: RefCell<LayoutPreferences>,
    listeners: RefCell<Vec<LayoutListener>>,
}

impl LayoutController {
    pub fn new(store: PreferenceStore) -> Self {
        let preferences = store.load_layout().unwrap_or_default();
        tracing::debug!(?preferences, "layout controller ready");
        Self {
            store,
            preferences: RefCell::new(preferences),
            listeners: RefCell::new(Vec::new()),
        }
    }

    pub fn current(&self) -> LayoutPreferences {
        self.preferences.borrow().clone()
    }

    pub fn set_sidebar_side(&self, side: SidebarSide) -> StoreResult<()> {
        self.update(|preferences| preferences.sidebar_side = side)
    }

    pub fn set_sidebar_variant(&self, variant: SidebarVariant) -> StoreResult<()> {
        self.update(|preferences| preferences.sidebar_variant = variant)
    }

    pub fn set_sidebar_collapsible(&self, collapsible: SidebarCollapsible) -> StoreResult<()> {
        self.update(|preferences| preferences.sidebar_collapsible = collapsible)
    }

    pub fn set_show_breadcrumbs(&self, show: bool) -> StoreResult<()> {
        self.update(|preferences| preferences.show_breadcrumbs = show)
    }

    pub fn set_header_option(&self, option: HeaderOption, enabled: bool) -> StoreResult<()> {
        self.update(|preferences| preferences.header.set(option, enabled))
    }

    /// Replaces every field at once, as a settings form submit does.
    pub fn save(&self, preferences: LayoutPreferences) -> StoreResult<()> {
        self.update(|current| *current = preferences)
    }

    /// Discards in-memory edits and re-reads the stored record.
    pub fn reload(&self) {
        let preferences = self.store.load_layout().unwrap_or_default();
        *self.preferences.borrow_mut() = preferences.clone();
        tracing::debug!(?preferences, "layout reloaded from preference store");
        self.notify(&preferences);
    }

    /// Listeners must not subscribe from inside a notification.
    pub fn subscribe(&self, listener: impl Fn(&LayoutPreferences) + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    fn update(&self, change: impl FnOnce(&mut LayoutPreferences)) -> StoreResult<()> {
        let snapshot = {
            let mut preferences = self.preferences.borrow_mut();
            change(&mut preferences);
            preferences.clone()
        };
        let persisted = self.store.save_layout(&snapshot);
        if let Err(err) = &persisted {
            tracing::warn!(%err, "failed to persist layout; keeping in-memory value");
        }
        self.notify(&snapshot);
        persisted
    }

    fn notify(&self, preferences: &LayoutPreferences) {
        for listener in self.listeners.borrow().iter() {
            listener(preferences);
        }
    }
}

impl fmt::Debug for LayoutController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutController")
            .field("preferences", &self.preferences.borrow())
            .field("listeners", &self.listeners.borrow().len())
            .finish_non_exhaustive()
    }
}

//! Projects a role map onto a document root as CSS custom properties.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Write as _};

use crate::palette::{Role, RoleMap};
use crate::theme::{EffectiveMode, Font};

pub const RADIUS_PROPERTY: &str = "--radius";

/// The host element the theme is painted onto.
pub trait DocumentRoot {
    fn set_property(&mut self, name: &str, value: &str);
    fn add_class(&mut self, class: &str);
    fn remove_class(&mut self, class: &str);
    fn snapshot(&self) -> StyleDocument;
}

/// Properties and classes of a root element, kept in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleDocument {
    properties: BTreeMap<String, String>,
    classes: BTreeSet<String>,
}

impl StyleDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    /// Renders the root as a single CSS rule, e.g. `:root.dark { ... }`.
    pub fn to_css(&self) -> String {
        let mut css = String::from(":root");
        for class in &self.classes {
            let _ = write!(css, ".{class}");
        }
        css.push_str(" {\n");
        for (name, value) in &self.properties {
            let _ = writeln!(css, "  {name}: {value};");
        }
        css.push_str("}\n");
        css
    }
}

impl DocumentRoot for StyleDocument {
    fn set_property(&mut self, name: &str, value: &str) {
        self.properties.insert(name.to_string(), value.to_string());
    }

    fn add_class(&mut self, class: &str) {
        self.classes.insert(class.to_string());
    }

    fn remove_class(&mut self, class: &str) {
        self.classes.remove(class);
    }

    fn snapshot(&self) -> StyleDocument {
        self.clone()
    }
}

pub fn role_property(role: Role) -> String {
    format!("--{}", role.css_name())
}

pub fn radius_value(radius: f32) -> String {
    format!("{radius}rem")
}

/// Writes role maps to a [`DocumentRoot`]. Applying the same input twice
/// leaves the document unchanged.
pub struct DomApplier {
    root: Box<dyn DocumentRoot>,
    apply_count: u64,
}

impl DomApplier {
    pub fn new(root: Box<dyn DocumentRoot>) -> Self {
        Self {
            root,
            apply_count: 0,
        }
    }

    /// An applier over a fresh in-memory [`StyleDocument`].
    pub fn in_memory() -> Self {
        Self::new(Box::new(StyleDocument::new()))
    }

    pub fn apply(&mut self, roles: &RoleMap, radius: f32, mode: EffectiveMode) {
        for (role, value) in roles.iter() {
            self.root.set_property(&role_property(role), value);
        }
        self.root.set_property(RADIUS_PROPERTY, &radius_value(radius));
        self.root.remove_class(mode.opposite().class_name());
        self.root.add_class(mode.class_name());
        self.apply_count += 1;
        tracing::debug!(mode = %mode, radius, count = self.apply_count, "applied theme to document");
    }

    /// Leaves exactly one `font-<name>` class on the root. Not counted by
    /// [`DomApplier::apply_count`].
    pub fn apply_font(&mut self, font: Font) {
        for other in Font::ALL.iter().filter(|other| **other != font) {
            self.root.remove_class(&other.class_name());
        }
        self.root.add_class(&font.class_name());
    }

    pub fn snapshot(&self) -> StyleDocument {
        self.root.snapshot()
    }

    /// Number of `apply` calls so far.
    pub fn apply_count(&self) -> u64 {
        self.apply_count
    }
}

impl fmt::Debug for DomApplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomApplier")
            .field("apply_count", &self.apply_count)
            .finish_non_exhaustive()
    }
}

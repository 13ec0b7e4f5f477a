use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The closed set of semantic color slots consumed by UI components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    Background,
    Foreground,
    Card,
    CardForeground,
    Popover,
    PopoverForeground,
    Primary,
    PrimaryForeground,
    Secondary,
    SecondaryForeground,
    Muted,
    MutedForeground,
    Accent,
    AccentForeground,
    Destructive,
    DestructiveForeground,
    Border,
    Input,
    Ring,
}

impl Role {
    pub const COUNT: usize = 19;

    pub const ALL: [Role; Role::COUNT] = [
        Role::Background,
        Role::Foreground,
        Role::Card,
        Role::CardForeground,
        Role::Popover,
        Role::PopoverForeground,
        Role::Primary,
        Role::PrimaryForeground,
        Role::Secondary,
        Role::SecondaryForeground,
        Role::Muted,
        Role::MutedForeground,
        Role::Accent,
        Role::AccentForeground,
        Role::Destructive,
        Role::DestructiveForeground,
        Role::Border,
        Role::Input,
        Role::Ring,
    ];

    pub const fn css_name(self) -> &'static str {
        match self {
            Role::Background => "background",
            Role::Foreground => "foreground",
            Role::Card => "card",
            Role::CardForeground => "card-foreground",
            Role::Popover => "popover",
            Role::PopoverForeground => "popover-foreground",
            Role::Primary => "primary",
            Role::PrimaryForeground => "primary-foreground",
            Role::Secondary => "secondary",
            Role::SecondaryForeground => "secondary-foreground",
            Role::Muted => "muted",
            Role::MutedForeground => "muted-foreground",
            Role::Accent => "accent",
            Role::AccentForeground => "accent-foreground",
            Role::Destructive => "destructive",
            Role::DestructiveForeground => "destructive-foreground",
            Role::Border => "border",
            Role::Input => "input",
            Role::Ring => "ring",
        }
    }

    pub fn from_css_name(name: &str) -> Option<Role> {
        Role::ALL.into_iter().find(|role| role.css_name() == name)
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoleMapError {
    #[error("role map is missing required role `{0}`")]
    MissingRole(Role),
}

/// A value for every [`Role`], iterated in declaration order.
///
/// There is no way to build a partial map: construction goes through
/// [`RoleMap::from_fn`] or the validating `TryFrom` used by deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, String>",
    into = "BTreeMap<String, String>"
)]
pub struct RoleMap {
    values: [String; Role::COUNT],
}

impl RoleMap {
    pub fn from_fn(mut value_for: impl FnMut(Role) -> String) -> Self {
        Self {
            values: std::array::from_fn(|index| value_for(Role::ALL[index])),
        }
    }

    pub fn get(&self, role: Role) -> &str {
        &self.values[role.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, &str)> + '_ {
        Role::ALL
            .into_iter()
            .zip(self.values.iter().map(String::as_str))
    }
}

impl TryFrom<BTreeMap<String, String>> for RoleMap {
    type Error = RoleMapError;

    /// Unknown keys (e.g. `chart-1`, `sidebar`) are ignored.
    fn try_from(mut raw: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        let mut values: [Option<String>; Role::COUNT] = Default::default();
        for role in Role::ALL {
            values[role.index()] = raw.remove(role.css_name());
        }
        if let Some(missing) = Role::ALL.into_iter().find(|role| values[role.index()].is_none()) {
            return Err(RoleMapError::MissingRole(missing));
        }
        Ok(Self {
            values: values.map(Option::unwrap_or_default),
        })
    }
}

impl From<RoleMap> for BTreeMap<String, String> {
    fn from(map: RoleMap) -> Self {
        Role::ALL
            .into_iter()
            .zip(map.values)
            .map(|(role, value)| (role.css_name().to_string(), value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_map() -> RoleMap {
        RoleMap::from_fn(|role| format!("value-{}", role.css_name()))
    }

    #[test]
    fn role_names_round_trip_and_are_unique() {
        let mut seen = std::collections::BTreeSet::new();
        for role in Role::ALL {
            assert_eq!(Role::from_css_name(role.css_name()), Some(role));
            assert!(seen.insert(role.css_name()));
        }
        assert_eq!(seen.len(), Role::COUNT);
        assert_eq!(Role::from_css_name("chart-1"), None);
    }

    #[test]
    fn iteration_follows_role_order() {
        let map = numbered_map();
        let roles: Vec<Role> = map.iter().map(|(role, _)| role).collect();
        assert_eq!(roles, Role::ALL.to_vec());
        assert_eq!(map.get(Role::Ring), "value-ring");
    }

    #[test]
    fn deserialize_requires_every_role() {
        let mut raw: BTreeMap<String, String> = numbered_map().into();
        raw.remove("popover-foreground");
        let err = RoleMap::try_from(raw).unwrap_err();
        assert_eq!(err, RoleMapError::MissingRole(Role::PopoverForeground));
    }

    #[test]
    fn deserialize_ignores_unknown_roles() {
        let mut value = serde_json::to_value(numbered_map()).unwrap();
        value["chart-1"] = serde_json::json!("oklch(0.6 0.2 40)");
        let parsed: RoleMap = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, numbered_map());
    }

    #[test]
    fn serialized_form_uses_css_names() {
        let value = serde_json::to_value(numbered_map()).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), Role::COUNT);
        assert_eq!(object["card-foreground"], "value-card-foreground");
    }
}

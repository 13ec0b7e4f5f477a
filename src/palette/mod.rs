//! Derives the light and dark role maps from one OKLCH seed.

mod role;

use serde::{Deserialize, Serialize};

use crate::color::Oklch;
use crate::theme::EffectiveMode;

pub use role::{Role, RoleMap, RoleMapError};

/// Near-black used for dark backgrounds and light-mode text.
const INK: (f64, f64) = (0.129, 0.042);
/// Near-white used for dark-mode text and text on saturated bases.
const PAPER: (f64, f64) = (0.984, 0.003);
/// Near-white text is pulled slightly off the seed hue.
const PAPER_HUE_SHIFT: f64 = -18.0;
/// Bases at or above this lightness get near-black text. Sitting midway
/// between ink and paper keeps every base at least 0.42 away from its text.
const CONTRAST_PIVOT: f64 = (INK.0 + PAPER.0) / 2.0;

const LIGHT_TINT_LIGHTNESS: f64 = 0.968;
const LIGHT_TINT_CHROMA_SCALE: f64 = 0.15;
const DARK_TINT_LIGHTNESS: f64 = 0.279;
const DARK_TINT_CHROMA_SCALE: f64 = 0.8;

const DARK_PRIMARY_MIN_LIGHTNESS: f64 = 0.929;
const DARK_PRIMARY_CHROMA_BOOST: f64 = 1.2;

const DESTRUCTIVE_CHROMA: f64 = 0.245;
const DESTRUCTIVE_HUE: f64 = 27.325;
const LIGHT_DESTRUCTIVE_LIGHTNESS: f64 = 0.577;
const DARK_DESTRUCTIVE_LIGHTNESS: f64 = 0.704;

/// A matched light/dark pair of role maps from a single seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemePalette {
    pub light: RoleMap,
    pub dark: RoleMap,
}

impl ThemePalette {
    pub fn for_mode(&self, mode: EffectiveMode) -> &RoleMap {
        match mode {
            EffectiveMode::Light => &self.light,
            EffectiveMode::Dark => &self.dark,
        }
    }
}

/// Synthesizes both role maps. Total over every triple; a zero-chroma seed
/// yields zero chroma in every seed-derived role.
pub fn synthesize(seed: Oklch) -> ThemePalette {
    let light = light_roles(seed);
    let dark = dark_roles(seed);
    ThemePalette {
        light: RoleMap::from_fn(|role| light.color(role).render()),
        dark: RoleMap::from_fn(|role| dark.color(role).render()),
    }
}

/// Per-mode anchor colors; every role resolves to one of these.
struct ModeRoles {
    hue: f64,
    background: Oklch,
    card: Oklch,
    popover: Oklch,
    primary: Oklch,
    tint: Oklch,
    muted_foreground: Oklch,
    destructive: Oklch,
    border: Oklch,
    ring: Oklch,
}

impl ModeRoles {
    fn color(&self, role: Role) -> Oklch {
        match role {
            Role::Background => self.background,
            Role::Foreground => self.text_on(self.background),
            Role::Card => self.card,
            Role::CardForeground => self.text_on(self.card),
            Role::Popover => self.popover,
            Role::PopoverForeground => self.text_on(self.popover),
            Role::Primary => self.primary,
            Role::PrimaryForeground => self.text_on(self.primary),
            Role::Secondary | Role::Muted | Role::Accent => self.tint,
            Role::SecondaryForeground | Role::AccentForeground => self.text_on(self.tint),
            Role::MutedForeground => self.muted_foreground,
            Role::Destructive => self.destructive,
            Role::DestructiveForeground => self.text_on(self.destructive),
            Role::Border | Role::Input => self.border,
            Role::Ring => self.ring,
        }
    }

    fn text_on(&self, base: Oklch) -> Oklch {
        if base.lightness >= CONTRAST_PIVOT {
            Oklch::new(INK.0, INK.1, self.hue)
        } else {
            Oklch::new(PAPER.0, PAPER.1, self.hue + PAPER_HUE_SHIFT)
        }
    }
}

fn light_roles(seed: Oklch) -> ModeRoles {
    let Oklch {
        lightness,
        chroma,
        hue,
    } = seed;
    let white = Oklch::new(1.0, 0.0, 0.0);
    ModeRoles {
        hue,
        background: white,
        card: white,
        popover: white,
        primary: Oklch::new(lightness, chroma, hue),
        tint: Oklch::new(LIGHT_TINT_LIGHTNESS, chroma * LIGHT_TINT_CHROMA_SCALE, hue),
        muted_foreground: Oklch::new(0.554, chroma * 0.8, hue),
        destructive: Oklch::new(LIGHT_DESTRUCTIVE_LIGHTNESS, DESTRUCTIVE_CHROMA, DESTRUCTIVE_HUE),
        border: Oklch::new(0.929, chroma * 0.2, hue),
        ring: Oklch::new(0.708, chroma * 0.4, hue),
    }
}

fn dark_roles(seed: Oklch) -> ModeRoles {
    let Oklch {
        lightness,
        chroma,
        hue,
    } = seed;
    let ink = Oklch::new(INK.0, INK.1, hue);
    ModeRoles {
        hue,
        background: ink,
        card: Oklch::new(0.14, 0.04, hue),
        popover: ink,
        primary: Oklch::new(
            lightness.max(DARK_PRIMARY_MIN_LIGHTNESS),
            chroma * DARK_PRIMARY_CHROMA_BOOST,
            hue,
        ),
        tint: Oklch::new(DARK_TINT_LIGHTNESS, chroma * DARK_TINT_CHROMA_SCALE, hue),
        muted_foreground: Oklch::new(0.704, chroma * 0.6, hue),
        destructive: Oklch::new(DARK_DESTRUCTIVE_LIGHTNESS, DESTRUCTIVE_CHROMA, DESTRUCTIVE_HUE),
        border: Oklch::new(DARK_TINT_LIGHTNESS, chroma * DARK_TINT_CHROMA_SCALE, hue),
        ring: Oklch::new(0.551, chroma * 0.8, hue),
    }
}

//! Conversion between textual colors and the OKLCH perceptual space.
//!
//! Every palette role is derived in OKLCH, so this module is the only place
//! that knows about sRGB, gamma, or the OKLab matrices. Everything here is a
//! pure function.

mod parse;

use thiserror::Error;

use self::parse::{parse_color, ParsedColor};

/// Seed used whenever user input cannot be parsed.
pub const DEFAULT_SEED: Oklch = Oklch::new(0.5, 0.1, 250.0);

/// Chroma below this is treated as achromatic and gets hue 0.
const ACHROMATIC_THRESHOLD: f64 = 1e-4;

pub type ColorResult<T> = std::result::Result<T, ColorError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("color value is empty")]
    Empty,
    #[error("invalid hex color: #{0}")]
    InvalidHex(String),
    #[error("unsupported color format: {0}")]
    UnsupportedFormat(String),
    #[error("invalid {function}() component: {component}")]
    InvalidComponent { function: String, component: String },
    #[error("{function}() expects 3 components, got {count}")]
    ComponentCount { function: String, count: usize },
}

/// A color in OKLCH: lightness in `[0, 1]`, chroma `>= 0`, hue in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Oklch {
    pub lightness: f64,
    pub chroma: f64,
    pub hue: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Oklab {
    pub(crate) l: f64,
    pub(crate) a: f64,
    pub(crate) b: f64,
}

impl Oklch {
    pub const fn new(lightness: f64, chroma: f64, hue: f64) -> Self {
        Self {
            lightness,
            chroma,
            hue,
        }
    }

    /// CSS `oklch(l c h)` form consumed by the document.
    pub fn render(&self) -> String {
        from_perceptual(self.lightness, self.chroma, self.hue)
    }

    /// Nearest in-gamut sRGB color as `#rrggbb`.
    pub fn to_hex(&self) -> String {
        let [r, g, b] = linear_to_srgb(oklab_to_linear_srgb(self.to_oklab()));
        format!(
            "#{:02x}{:02x}{:02x}",
            channel_to_u8(r),
            channel_to_u8(g),
            channel_to_u8(b)
        )
    }

    fn to_oklab(self) -> Oklab {
        let radians = self.hue.to_radians();
        Oklab {
            l: self.lightness,
            a: self.chroma * radians.cos(),
            b: self.chroma * radians.sin(),
        }
    }

    pub(crate) fn from_oklab(lab: Oklab) -> Self {
        let chroma = lab.a.hypot(lab.b);
        let hue = if chroma < ACHROMATIC_THRESHOLD {
            0.0
        } else {
            lab.b.atan2(lab.a).to_degrees().rem_euclid(360.0)
        };
        let chroma = if chroma < ACHROMATIC_THRESHOLD {
            0.0
        } else {
            chroma
        };
        Self::new(lab.l, chroma, hue)
    }
}

/// Parses any supported textual color into OKLCH.
pub fn to_perceptual(input: &str) -> ColorResult<Oklch> {
    let parsed = parse_color(input)?;
    Ok(match parsed {
        ParsedColor::Srgb(rgb) => Oklch::from_oklab(linear_srgb_to_oklab(srgb_to_linear(rgb))),
        ParsedColor::Oklab(lab) => Oklch::from_oklab(lab),
        ParsedColor::Oklch(lch) => {
            if lch.chroma < ACHROMATIC_THRESHOLD {
                Oklch::new(lch.lightness, 0.0, 0.0)
            } else {
                Oklch::new(lch.lightness, lch.chroma, lch.hue.rem_euclid(360.0))
            }
        }
    })
}

/// Like [`to_perceptual`], but falls back to [`DEFAULT_SEED`] on bad input.
pub fn to_perceptual_or_default(input: &str) -> Oklch {
    to_perceptual(input).unwrap_or_else(|err| {
        tracing::warn!(input, %err, "unparseable seed color; using default seed");
        DEFAULT_SEED
    })
}

/// Renders an OKLCH triple as a CSS color value.
pub fn from_perceptual(lightness: f64, chroma: f64, hue: f64) -> String {
    let mut hue = round_component(hue.rem_euclid(360.0));
    if hue >= 360.0 {
        hue = 0.0;
    }
    format!(
        "oklch({} {} {})",
        round_component(lightness),
        round_component(chroma),
        hue
    )
}

fn round_component(value: f64) -> f64 {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    // collapse -0 so it never renders as "-0"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

fn srgb_to_linear(rgb: [f64; 3]) -> [f64; 3] {
    rgb.map(|c| {
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    })
}

fn linear_to_srgb(rgb: [f64; 3]) -> [f64; 3] {
    rgb.map(|c| {
        let c = c.clamp(0.0, 1.0);
        if c <= 0.003_130_8 {
            12.92 * c
        } else {
            1.055 * c.powf(1.0 / 2.4) - 0.055
        }
    })
}

fn channel_to_u8(c: f64) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn linear_srgb_to_oklab([r, g, b]: [f64; 3]) -> Oklab {
    let l = 0.412_221_470_8 * r + 0.536_332_536_3 * g + 0.051_445_992_9 * b;
    let m = 0.211_903_498_2 * r + 0.680_699_545_1 * g + 0.107_396_956_6 * b;
    let s = 0.088_302_461_9 * r + 0.281_718_837_6 * g + 0.629_978_700_5 * b;

    let l_ = l.cbrt();
    let m_ = m.cbrt();
    let s_ = s.cbrt();

    Oklab {
        l: 0.210_454_255_3 * l_ + 0.793_617_785_0 * m_ - 0.004_072_046_8 * s_,
        a: 1.977_998_495_1 * l_ - 2.428_592_205_0 * m_ + 0.450_593_709_9 * s_,
        b: 0.025_904_037_1 * l_ + 0.782_771_766_2 * m_ - 0.808_675_766_0 * s_,
    }
}

fn oklab_to_linear_srgb(lab: Oklab) -> [f64; 3] {
    let l_ = lab.l + 0.396_337_777_4 * lab.a + 0.215_803_757_3 * lab.b;
    let m_ = lab.l - 0.105_561_345_8 * lab.a - 0.063_854_172_8 * lab.b;
    let s_ = lab.l - 0.089_484_177_5 * lab.a - 1.291_485_548_0 * lab.b;

    let l = l_ * l_ * l_;
    let m = m_ * m_ * m_;
    let s = s_ * s_ * s_;

    [
        4.076_741_662_1 * l - 3.307_711_591_3 * m + 0.230_969_929_2 * s,
        -1.268_438_004_6 * l + 2.609_757_401_1 * m - 0.341_319_396_5 * s,
        -0.004_196_086_3 * l - 0.703_418_614_7 * m + 1.707_614_701_0 * s,
    ]
}

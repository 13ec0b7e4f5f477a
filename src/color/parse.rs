use super::{ColorError, ColorResult, Oklab, Oklch};

/// Chroma that `100%` maps to in `oklch()`/`oklab()` percentage syntax.
const OK_PERCENT_REFERENCE: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum ParsedColor {
    /// Gamma-encoded sRGB channels in `[0, 1]`.
    Srgb([f64; 3]),
    Oklab(Oklab),
    Oklch(Oklch),
}

pub(super) fn parse_color(input: &str) -> ColorResult<ParsedColor> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ColorError::Empty);
    }

    if let Some(hex) = trimmed.strip_prefix('#') {
        return parse_hex(hex).map(ParsedColor::Srgb);
    }

    let lowered = trimmed.to_ascii_lowercase();
    let Some((function, inner)) = split_function(&lowered) else {
        return Err(ColorError::UnsupportedFormat(trimmed.to_string()));
    };
    let components = split_components(function, inner)?;

    match function {
        "rgb" | "rgba" => parse_rgb(function, &components).map(ParsedColor::Srgb),
        "hsl" | "hsla" => parse_hsl(function, &components).map(ParsedColor::Srgb),
        "oklch" => {
            let lightness = parse_lightness(function, components[0])?;
            let chroma = parse_scaled(function, components[1], OK_PERCENT_REFERENCE)?;
            let hue = parse_hue(function, components[2])?;
            Ok(ParsedColor::Oklch(Oklch::new(lightness, chroma.max(0.0), hue)))
        }
        "oklab" => {
            let l = parse_lightness(function, components[0])?;
            let a = parse_scaled(function, components[1], OK_PERCENT_REFERENCE)?;
            let b = parse_scaled(function, components[2], OK_PERCENT_REFERENCE)?;
            Ok(ParsedColor::Oklab(Oklab { l, a, b }))
        }
        _ => Err(ColorError::UnsupportedFormat(trimmed.to_string())),
    }
}

fn parse_hex(hex: &str) -> ColorResult<[f64; 3]> {
    let invalid = || ColorError::InvalidHex(hex.to_string());
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let digits: Vec<u8> = hex
        .chars()
        .filter_map(|c| c.to_digit(16))
        .map(|d| d as u8)
        .collect();

    let channels = match digits.len() {
        3 | 4 => [
            digits[0] * 17,
            digits[1] * 17,
            digits[2] * 17,
        ],
        6 | 8 => [
            digits[0] * 16 + digits[1],
            digits[2] * 16 + digits[3],
            digits[4] * 16 + digits[5],
        ],
        _ => return Err(invalid()),
    };

    Ok(channels.map(|c| f64::from(c) / 255.0))
}

fn split_function(value: &str) -> Option<(&str, &str)> {
    let open = value.find('(')?;
    let inner = value[open + 1..].strip_suffix(')')?;
    let name = value[..open].trim();
    if name.is_empty() {
        return None;
    }
    Some((name, inner))
}

/// Splits the argument list, dropping any `/ alpha` tail or fourth legacy
/// comma-separated alpha component.
fn split_components<'a>(function: &str, inner: &'a str) -> ColorResult<Vec<&'a str>> {
    let without_alpha = inner.split('/').next().unwrap_or_default();
    let mut components: Vec<&str> = without_alpha
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .collect();

    if components.len() == 4 && inner.contains(',') {
        components.truncate(3);
    }
    if components.len() != 3 {
        return Err(ColorError::ComponentCount {
            function: function.to_string(),
            count: components.len(),
        });
    }
    Ok(components)
}

fn parse_number(function: &str, token: &str) -> ColorResult<f64> {
    if token == "none" {
        return Ok(0.0);
    }
    token
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ColorError::InvalidComponent {
            function: function.to_string(),
            component: token.to_string(),
        })
}

/// Plain numbers pass through; percentages map `100%` to `reference`.
fn parse_scaled(function: &str, token: &str, reference: f64) -> ColorResult<f64> {
    match token.strip_suffix('%') {
        Some(percent) => Ok(parse_number(function, percent)? / 100.0 * reference),
        None => parse_number(function, token),
    }
}

/// Clamped to `[0, 1]` at parse time, as CSS does for `oklch()`/`oklab()`.
fn parse_lightness(function: &str, token: &str) -> ColorResult<f64> {
    Ok(parse_scaled(function, token, 1.0)?.clamp(0.0, 1.0))
}

fn parse_hue(function: &str, token: &str) -> ColorResult<f64> {
    let degrees = token.strip_suffix("deg").unwrap_or(token);
    parse_number(function, degrees)
}

fn parse_rgb(function: &str, components: &[&str]) -> ColorResult<[f64; 3]> {
    let mut channels = [0.0; 3];
    for (slot, token) in channels.iter_mut().zip(components) {
        let value = match token.strip_suffix('%') {
            Some(percent) => parse_number(function, percent)? / 100.0,
            None => parse_number(function, token)? / 255.0,
        };
        *slot = value.clamp(0.0, 1.0);
    }
    Ok(channels)
}

fn parse_hsl(function: &str, components: &[&str]) -> ColorResult<[f64; 3]> {
    let hue = parse_hue(function, components[0])?.rem_euclid(360.0);
    let saturation = parse_percentage(function, components[1])?;
    let lightness = parse_percentage(function, components[2])?;
    Ok(hsl_to_srgb(hue, saturation, lightness))
}

fn parse_percentage(function: &str, token: &str) -> ColorResult<f64> {
    let number = token.strip_suffix('%').unwrap_or(token);
    Ok((parse_number(function, number)? / 100.0).clamp(0.0, 1.0))
}

fn hsl_to_srgb(hue: f64, saturation: f64, lightness: f64) -> [f64; 3] {
    let channel = |n: f64| {
        let k = (n + hue / 30.0) % 12.0;
        let a = saturation * lightness.min(1.0 - lightness);
        lightness - a * (k - 3.0).min(9.0 - k).clamp(-1.0, 1.0)
    };
    [channel(0.0), channel(8.0), channel(4.0)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_digits_expand_to_channels() {
        assert_eq!(parse_hex("fff").unwrap(), [1.0, 1.0, 1.0]);
        assert_eq!(parse_hex("ff000080").unwrap(), [1.0, 0.0, 0.0]);
        assert!(parse_hex("12345").is_err());
        assert!(parse_hex("").is_err());
    }

    #[test]
    fn legacy_rgba_drops_alpha_component() {
        let parsed = parse_color("rgba(255, 0, 0, 0.5)").unwrap();
        assert_eq!(parsed, ParsedColor::Srgb([1.0, 0.0, 0.0]));
    }

    #[test]
    fn rgb_percentages_and_clamping() {
        let parsed = parse_color("rgb(100% 50% 300)").unwrap();
        assert_eq!(parsed, ParsedColor::Srgb([1.0, 0.5, 1.0]));
    }

    #[test]
    fn hsl_primaries_convert_exactly() {
        assert_eq!(hsl_to_srgb(120.0, 1.0, 0.5), [0.0, 1.0, 0.0]);
        assert_eq!(hsl_to_srgb(240.0, 1.0, 0.5), [0.0, 0.0, 1.0]);
        assert_eq!(hsl_to_srgb(0.0, 0.0, 1.0), [1.0, 1.0, 1.0]);
    }

    #[test]
    fn oklch_percent_chroma_uses_reference_scale() {
        let parsed = parse_color("OKLCH(50% 25% none)").unwrap();
        assert_eq!(parsed, ParsedColor::Oklch(Oklch::new(0.5, 0.1, 0.0)));
    }

    #[test]
    fn ok_space_lightness_is_clamped() {
        let parsed = parse_color("oklch(150% 0.1 20)").unwrap();
        assert_eq!(parsed, ParsedColor::Oklch(Oklch::new(1.0, 0.1, 20.0)));
        let ParsedColor::Oklab(lab) = parse_color("oklab(-0.5 0.05 0.05)").unwrap() else {
            panic!("expected oklab");
        };
        assert_eq!(lab.l, 0.0);
    }

    #[test]
    fn unknown_function_is_unsupported() {
        assert!(matches!(
            parse_color("lab(50 20 30)"),
            Err(ColorError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            parse_color("(1 2 3)"),
            Err(ColorError::UnsupportedFormat(_))
        ));
    }
}

//! Caption and background color specs.
//!
//! Accepts `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`,
//! `rgba(r, g, b, a)`, `hsl(h, s%, l%)`, `hsla(h, s%, l%, a)` and the CSS
//! named colors, case-insensitively.

use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unrecognized color '{0}'")]
pub struct ColorParseError(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);
    pub const TRANSPARENT: Rgba = Rgba { r: 0, g: 0, b: 0, a: 0 };

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

impl FromStr for Rgba {
    type Err = ColorParseError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let trimmed = spec.trim();
        let lowered = trimmed.to_ascii_lowercase();
        let err = || ColorParseError(trimmed.to_string());

        if let Some(hex) = lowered.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(err);
        }
        if let Some(args) = function_args(&lowered, &["rgba", "rgb"]) {
            return parse_rgb(args).ok_or_else(err);
        }
        if let Some(args) = function_args(&lowered, &["hsla", "hsl"]) {
            return parse_hsl(args).ok_or_else(err);
        }
        named_color(&lowered).ok_or_else(err)
    }
}

// Argument list of `name(...)` for the first matching name.
fn function_args<'a>(spec: &'a str, names: &[&str]) -> Option<&'a str> {
    names.iter().find_map(|name| {
        spec.strip_prefix(name)?
            .trim_start()
            .strip_prefix('(')?
            .strip_suffix(')')
    })
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(Rgba::opaque(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => Some(Rgba { r: nibble(0)?, g: nibble(1)?, b: nibble(2)?, a: nibble(3)? }),
        6 => Some(Rgba::opaque(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Rgba { r: byte(0)?, g: byte(2)?, b: byte(4)?, a: byte(6)? }),
        _ => None,
    }
}

fn parse_rgb(args: &str) -> Option<Rgba> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [r, g, b] => Some(Rgba::opaque(channel(r)?, channel(g)?, channel(b)?)),
        [r, g, b, a] => Some(Rgba {
            r: channel(r)?,
            g: channel(g)?,
            b: channel(b)?,
            a: parse_alpha(a)?,
        }),
        _ => None,
    }
}

// 0-255, or 0%-100% of the byte range.
fn channel(raw: &str) -> Option<u8> {
    match raw.strip_suffix('%') {
        Some(pct) => Some(unit_to_byte(percentage(pct)?)),
        None => raw.parse::<u8>().ok(),
    }
}

fn parse_hsl(args: &str) -> Option<Rgba> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    let (h, s, l, a) = match parts.as_slice() {
        [h, s, l] => (*h, *s, *l, 255),
        [h, s, l, a] => (*h, *s, *l, parse_alpha(a)?),
        _ => return None,
    };
    let hue = h.strip_suffix("deg").unwrap_or(h).trim().parse::<f32>().ok()?;
    if !hue.is_finite() {
        return None;
    }
    let saturation = percentage(s.strip_suffix('%')?)?;
    let lightness = percentage(l.strip_suffix('%')?)?;

    let (r, g, b) = hsl_to_rgb(hue.rem_euclid(360.0) / 360.0, saturation, lightness);
    Some(Rgba {
        r: unit_to_byte(r),
        g: unit_to_byte(g),
        b: unit_to_byte(b),
        a,
    })
}

// Percentage in [0, 100] as a unit fraction.
fn percentage(raw: &str) -> Option<f32> {
    let value = raw.trim().parse::<f32>().ok()?;
    (0.0..=100.0).contains(&value).then_some(value / 100.0)
}

fn unit_to_byte(value: f32) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (f32, f32, f32) {
    if s == 0.0 {
        return (l, l, l);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    (
        hue_to_channel(p, q, h + 1.0 / 3.0),
        hue_to_channel(p, q, h),
        hue_to_channel(p, q, h - 1.0 / 3.0),
    )
}

fn hue_to_channel(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

// Integer alphas are bytes, fractional ones are in [0, 1].
fn parse_alpha(raw: &str) -> Option<u8> {
    if let Ok(byte) = raw.parse::<u8>() {
        return Some(byte);
    }
    let value = raw.parse::<f32>().ok()?;
    (0.0..=1.0)
        .contains(&value)
        .then(|| (value * 255.0).round() as u8)
}

/// The CSS/X11 named colors. `name` must already be lowercase.
fn named_color(name: &str) -> Option<Rgba> {
    let color = match name {
        "aliceblue" => Rgba::opaque(240, 248, 255),
        "antiquewhite" => Rgba::opaque(250, 235, 215),
        "aqua" => Rgba::opaque(0, 255, 255),
        "aquamarine" => Rgba::opaque(127, 255, 212),
        "azure" => Rgba::opaque(240, 255, 255),
        "beige" => Rgba::opaque(245, 245, 220),
        "bisque" => Rgba::opaque(255, 228, 196),
        "black" => Rgba::opaque(0, 0, 0),
        "blanchedalmond" => Rgba::opaque(255, 235, 205),
        "blue" => Rgba::opaque(0, 0, 255),
        "blueviolet" => Rgba::opaque(138, 43, 226),
        "brown" => Rgba::opaque(165, 42, 42),
        "burlywood" => Rgba::opaque(222, 184, 135),
        "cadetblue" => Rgba::opaque(95, 158, 160),
        "chartreuse" => Rgba::opaque(127, 255, 0),
        "chocolate" => Rgba::opaque(210, 105, 30),
        "coral" => Rgba::opaque(255, 127, 80),
        "cornflowerblue" => Rgba::opaque(100, 149, 237),
        "cornsilk" => Rgba::opaque(255, 248, 220),
        "crimson" => Rgba::opaque(220, 20, 60),
        "cyan" => Rgba::opaque(0, 255, 255),
        "darkblue" => Rgba::opaque(0, 0, 139),
        "darkcyan" => Rgba::opaque(0, 139, 139),
        "darkgoldenrod" => Rgba::opaque(184, 134, 11),
        "darkgray" => Rgba::opaque(169, 169, 169),
        "darkgrey" => Rgba::opaque(169, 169, 169),
        "darkgreen" => Rgba::opaque(0, 100, 0),
        "darkkhaki" => Rgba::opaque(189, 183, 107),
        "darkmagenta" => Rgba::opaque(139, 0, 139),
        "darkolivegreen" => Rgba::opaque(85, 107, 47),
        "darkorange" => Rgba::opaque(255, 140, 0),
        "darkorchid" => Rgba::opaque(153, 50, 204),
        "darkred" => Rgba::opaque(139, 0, 0),
        "darksalmon" => Rgba::opaque(233, 150, 122),
        "darkseagreen" => Rgba::opaque(143, 188, 143),
        "darkslateblue" => Rgba::opaque(72, 61, 139),
        "darkslategray" => Rgba::opaque(47, 79, 79),
        "darkslategrey" => Rgba::opaque(47, 79, 79),
        "darkturquoise" => Rgba::opaque(0, 206, 209),
        "darkviolet" => Rgba::opaque(148, 0, 211),
        "deeppink" => Rgba::opaque(255, 20, 147),
        "deepskyblue" => Rgba::opaque(0, 191, 255),
        "dimgray" => Rgba::opaque(105, 105, 105),
        "dimgrey" => Rgba::opaque(105, 105, 105),
        "dodgerblue" => Rgba::opaque(30, 144, 255),
        "firebrick" => Rgba::opaque(178, 34, 34),
        "floralwhite" => Rgba::opaque(255, 250, 240),
        "forestgreen" => Rgba::opaque(34, 139, 34),
        "fuchsia" => Rgba::opaque(255, 0, 255),
        "gainsboro" => Rgba::opaque(220, 220, 220),
        "ghostwhite" => Rgba::opaque(248, 248, 255),
        "gold" => Rgba::opaque(255, 215, 0),
        "goldenrod" => Rgba::opaque(218, 165, 32),
        "gray" => Rgba::opaque(128, 128, 128),
        "grey" => Rgba::opaque(128, 128, 128),
        "green" => Rgba::opaque(0, 128, 0),
        "greenyellow" => Rgba::opaque(173, 255, 47),
        "honeydew" => Rgba::opaque(240, 255, 240),
        "hotpink" => Rgba::opaque(255, 105, 180),
        "indianred" => Rgba::opaque(205, 92, 92),
        "indigo" => Rgba::opaque(75, 0, 130),
        "ivory" => Rgba::opaque(255, 255, 240),
        "khaki" => Rgba::opaque(240, 230, 140),
        "lavender" => Rgba::opaque(230, 230, 250),
        "lavenderblush" => Rgba::opaque(255, 240, 245),
        "lawngreen" => Rgba::opaque(124, 252, 0),
        "lemonchiffon" => Rgba::opaque(255, 250, 205),
        "lightblue" => Rgba::opaque(173, 216, 230),
        "lightcoral" => Rgba::opaque(240, 128, 128),
        "lightcyan" => Rgba::opaque(224, 255, 255),
        "lightgoldenrodyellow" => Rgba::opaque(250, 250, 210),
        "lightgray" => Rgba::opaque(211, 211, 211),
        "lightgrey" => Rgba::opaque(211, 211, 211),
        "lightgreen" => Rgba::opaque(144, 238, 144),
        "lightpink" => Rgba::opaque(255, 182, 193),
        "lightsalmon" => Rgba::opaque(255, 160, 122),
        "lightseagreen" => Rgba::opaque(32, 178, 170),
        "lightskyblue" => Rgba::opaque(135, 206, 250),
        "lightslategray" => Rgba::opaque(119, 136, 153),
        "lightslategrey" => Rgba::opaque(119, 136, 153),
        "lightsteelblue" => Rgba::opaque(176, 196, 222),
        "lightyellow" => Rgba::opaque(255, 255, 224),
        "lime" => Rgba::opaque(0, 255, 0),
        "limegreen" => Rgba::opaque(50, 205, 50),
        "linen" => Rgba::opaque(250, 240, 230),
        "magenta" => Rgba::opaque(255, 0, 255),
        "maroon" => Rgba::opaque(128, 0, 0),
        "mediumaquamarine" => Rgba::opaque(102, 205, 170),
        "mediumblue" => Rgba::opaque(0, 0, 205),
        "mediumorchid" => Rgba::opaque(186, 85, 211),
        "mediumpurple" => Rgba::opaque(147, 112, 219),
        "mediumseagreen" => Rgba::opaque(60, 179, 113),
        "mediumslateblue" => Rgba::opaque(123, 104, 238),
        "mediumspringgreen" => Rgba::opaque(0, 250, 154),
        "mediumturquoise" => Rgba::opaque(72, 209, 204),
        "mediumvioletred" => Rgba::opaque(199, 21, 133),
        "midnightblue" => Rgba::opaque(25, 25, 112),
        "mintcream" => Rgba::opaque(245, 255, 250),
        "mistyrose" => Rgba::opaque(255, 228, 225),
        "moccasin" => Rgba::opaque(255, 228, 181),
        "navajowhite" => Rgba::opaque(255, 222, 173),
        "navy" => Rgba::opaque(0, 0, 128),
        "oldlace" => Rgba::opaque(253, 245, 230),
        "olive" => Rgba::opaque(128, 128, 0),
        "olivedrab" => Rgba::opaque(107, 142, 35),
        "orange" => Rgba::opaque(255, 165, 0),
        "orangered" => Rgba::opaque(255, 69, 0),
        "orchid" => Rgba::opaque(218, 112, 214),
        "palegoldenrod" => Rgba::opaque(238, 232, 170),
        "palegreen" => Rgba::opaque(152, 251, 152),
        "paleturquoise" => Rgba::opaque(175, 238, 238),
        "palevioletred" => Rgba::opaque(219, 112, 147),
        "papayawhip" => Rgba::opaque(255, 239, 213),
        "peachpuff" => Rgba::opaque(255, 218, 185),
        "peru" => Rgba::opaque(205, 133, 63),
        "pink" => Rgba::opaque(255, 192, 203),
        "plum" => Rgba::opaque(221, 160, 221),
        "powderblue" => Rgba::opaque(176, 224, 230),
        "purple" => Rgba::opaque(128, 0, 128),
        "rebeccapurple" => Rgba::opaque(102, 51, 153),
        "red" => Rgba::opaque(255, 0, 0),
        "rosybrown" => Rgba::opaque(188, 143, 143),
        "royalblue" => Rgba::opaque(65, 105, 225),
        "saddlebrown" => Rgba::opaque(139, 69, 19),
        "salmon" => Rgba::opaque(250, 128, 114),
        "sandybrown" => Rgba::opaque(244, 164, 96),
        "seagreen" => Rgba::opaque(46, 139, 87),
        "seashell" => Rgba::opaque(255, 245, 238),
        "sienna" => Rgba::opaque(160, 82, 45),
        "silver" => Rgba::opaque(192, 192, 192),
        "skyblue" => Rgba::opaque(135, 206, 235),
        "slateblue" => Rgba::opaque(106, 90, 205),
        "slategray" => Rgba::opaque(112, 128, 144),
        "slategrey" => Rgba::opaque(112, 128, 144),
        "snow" => Rgba::opaque(255, 250, 250),
        "springgreen" => Rgba::opaque(0, 255, 127),
        "steelblue" => Rgba::opaque(70, 130, 180),
        "tan" => Rgba::opaque(210, 180, 140),
        "teal" => Rgba::opaque(0, 128, 128),
        "thistle" => Rgba::opaque(216, 191, 216),
        "tomato" => Rgba::opaque(255, 99, 71),
        "turquoise" => Rgba::opaque(64, 224, 208),
        "violet" => Rgba::opaque(238, 130, 238),
        "wheat" => Rgba::opaque(245, 222, 179),
        "white" => Rgba::opaque(255, 255, 255),
        "whitesmoke" => Rgba::opaque(245, 245, 245),
        "yellow" => Rgba::opaque(255, 255, 0),
        "yellowgreen" => Rgba::opaque(154, 205, 50),
        "transparent" => Rgba::TRANSPARENT,
        _ => return None,
    };
    Some(color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_forms() {
        assert_eq!("#ff0000".parse::<Rgba>().unwrap(), Rgba::opaque(255, 0, 0));
        assert_eq!("#F0A".parse::<Rgba>().unwrap(), Rgba::opaque(255, 0, 170));
        assert_eq!(
            "#00000080".parse::<Rgba>().unwrap(),
            Rgba { r: 0, g: 0, b: 0, a: 128 }
        );
        assert_eq!(
            "#fff8".parse::<Rgba>().unwrap(),
            Rgba { r: 255, g: 255, b: 255, a: 136 }
        );
    }

    #[test]
    fn functional_forms() {
        assert_eq!(
            "rgb(10, 20, 30)".parse::<Rgba>().unwrap(),
            Rgba::opaque(10, 20, 30)
        );
        assert_eq!(
            "RGBA(10,20,30,0.5)".parse::<Rgba>().unwrap(),
            Rgba { r: 10, g: 20, b: 30, a: 128 }
        );
        assert_eq!(
            "rgba(10,20,30,200)".parse::<Rgba>().unwrap(),
            Rgba { r: 10, g: 20, b: 30, a: 200 }
        );
        assert_eq!(
            "rgb(100%, 0%, 50%)".parse::<Rgba>().unwrap(),
            Rgba::opaque(255, 0, 128)
        );
    }

    #[test]
    fn hsl_forms() {
        assert_eq!("hsl(0, 100%, 50%)".parse::<Rgba>().unwrap(), Rgba::opaque(255, 0, 0));
        assert_eq!("hsl(120, 100%, 25%)".parse::<Rgba>().unwrap(), Rgba::opaque(0, 128, 0));
        assert_eq!("HSL(240,100%,50%)".parse::<Rgba>().unwrap(), Rgba::opaque(0, 0, 255));
        assert_eq!("hsl(0, 0%, 50%)".parse::<Rgba>().unwrap(), Rgba::opaque(128, 128, 128));
        assert_eq!("hsl(360, 100%, 50%)".parse::<Rgba>().unwrap(), Rgba::opaque(255, 0, 0));
        assert_eq!(
            "hsla(0, 100%, 50%, 0.5)".parse::<Rgba>().unwrap(),
            Rgba { r: 255, g: 0, b: 0, a: 128 }
        );
    }

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(" White ".parse::<Rgba>().unwrap(), Rgba::opaque(255, 255, 255));
        assert_eq!("grey".parse::<Rgba>().unwrap(), "gray".parse::<Rgba>().unwrap());
        assert_eq!("LightGray".parse::<Rgba>().unwrap(), Rgba::opaque(211, 211, 211));
    }

    #[test]
    fn extended_names() {
        assert_eq!("darkred".parse::<Rgba>().unwrap(), Rgba::opaque(139, 0, 0));
        assert_eq!("aliceblue".parse::<Rgba>().unwrap(), Rgba::opaque(240, 248, 255));
        assert_eq!("rebeccapurple".parse::<Rgba>().unwrap(), Rgba::opaque(102, 51, 153));
        assert_eq!("yellowgreen".parse::<Rgba>().unwrap(), Rgba::opaque(154, 205, 50));
        assert_eq!("transparent".parse::<Rgba>().unwrap(), Rgba::TRANSPARENT);
    }

    #[test]
    fn rejects_garbage() {
        for spec in [
            "",
            "#12",
            "#ggg",
            "rgb(1,2)",
            "rgb(300,0,0)",
            "rgba(1,2,3,1.5)",
            "hsl(0, 100, 50)",
            "hsl(0, 120%, 50%)",
            "hsl(nan, 10%, 10%)",
            "hsl(0, 10%)",
            "blurple",
        ] {
            assert!(spec.parse::<Rgba>().is_err(), "{spec:?} should not parse");
        }
    }
}

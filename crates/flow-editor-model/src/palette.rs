/// Port colors for block inputs and outputs, keyed by port type name.
///
/// Colors are derived from a hash of the type name so every client picks
/// the same color for the same type without a shared registry.
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Visually distinct base colors, indexed by type-name hash.
const DISTINCT_COLORS: [HexColor; 20] = [
    HexColor::rgb(0xc7, 0x46, 0x71),
    HexColor::rgb(0x73, 0xd6, 0x4e),
    HexColor::rgb(0x71, 0x3f, 0xc9),
    HexColor::rgb(0xd0, 0xd3, 0x4a),
    HexColor::rgb(0xcb, 0x4e, 0xbf),
    HexColor::rgb(0x77, 0xdb, 0x9e),
    HexColor::rgb(0x55, 0x2d, 0x75),
    HexColor::rgb(0x67, 0x89, 0x35),
    HexColor::rgb(0x76, 0x78, 0xd4),
    HexColor::rgb(0xc7, 0x8b, 0x39),
    HexColor::rgb(0x5c, 0x76, 0x9c),
    HexColor::rgb(0xd6, 0x4e, 0x34),
    HexColor::rgb(0x86, 0xc9, 0xd8),
    HexColor::rgb(0x78, 0x39, 0x28),
    HexColor::rgb(0xcf, 0xcf, 0x9d),
    HexColor::rgb(0x46, 0x28, 0x3e),
    HexColor::rgb(0x58, 0x90, 0x77),
    HexColor::rgb(0xcd, 0x9b, 0xc7),
    HexColor::rgb(0x3b, 0x49, 0x2d),
    HexColor::rgb(0xbb, 0x89, 0x78),
];

/// Darkening applied to the "off" color, and again for optional ports.
const DARKEN_FACTOR: f64 = 0.2;

/// RGB color with serde support for `"#RRGGBB"` strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#RRGGBB` or the short `#RGB` form.
    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.strip_prefix('#')?;
        if !s.is_ascii() {
            return None;
        }
        match s.len() {
            6 => {
                let r = u8::from_str_radix(&s[0..2], 16).ok()?;
                let g = u8::from_str_radix(&s[2..4], 16).ok()?;
                let b = u8::from_str_radix(&s[4..6], 16).ok()?;
                Some(Self { r, g, b })
            }
            3 => {
                let digit = |i: usize| u8::from_str_radix(&s[i..i + 1], 16).ok().map(|d| d * 17);
                Some(Self {
                    r: digit(0)?,
                    g: digit(1)?,
                    b: digit(2)?,
                })
            }
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Moves each channel toward black by `factor` (0.0 to 1.0).
    pub fn darken(self, factor: f64) -> Self {
        let scale = |c: u8| {
            let c = f64::from(c);
            (c - c * factor).round().clamp(0.0, 255.0) as u8
        };
        Self::rgb(scale(self.r), scale(self.g), scale(self.b))
    }
}

impl Serialize for HexColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid hex color: {s}")))
    }
}

/// Colors of a port slot: `on` when connected, `off` when empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortColors {
    pub on: HexColor,
    pub off: HexColor,
}

/// Returns the slot colors for a port of type `type_name`.
///
/// Optional ports get a darker `off` color than required ones.
pub fn port_colors(type_name: &str, required: bool) -> PortColors {
    let on = base_color(type_name);
    let mut off = on.darken(DARKEN_FACTOR);
    if !required {
        off = off.darken(DARKEN_FACTOR);
    }
    PortColors { on, off }
}

/// Picks the base color with the same string hash the web console uses.
///
/// The hash runs over UTF-16 code units with JavaScript number semantics:
/// the shift truncates to a 32-bit integer, the subtraction does not.
fn base_color(type_name: &str) -> HexColor {
    let mut hash: f64 = 0.0;
    for unit in type_name.encode_utf16() {
        let shifted = to_int32(hash).wrapping_shl(5);
        hash = f64::from(unit) + (f64::from(shifted) - hash);
    }
    let index = (hash.abs() % DISTINCT_COLORS.len() as f64) as usize;
    DISTINCT_COLORS[index]
}

/// ECMAScript `ToInt32` for finite values.
fn to_int32(value: f64) -> i32 {
    (value.trunc() as i64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_long_and_short_forms() {
        assert_eq!(HexColor::from_hex("#FF8800"), Some(HexColor::rgb(255, 136, 0)));
        assert_eq!(HexColor::from_hex("#f80"), Some(HexColor::rgb(255, 136, 0)));
    }

    #[test]
    fn test_invalid_input() {
        assert!(HexColor::from_hex("").is_none());
        assert!(HexColor::from_hex("#").is_none());
        assert!(HexColor::from_hex("#GG0000").is_none());
        assert!(HexColor::from_hex("#12345").is_none());
        assert!(HexColor::from_hex("123456").is_none());
    }

    #[test]
    fn test_to_hex_is_lowercase() {
        assert_eq!(HexColor::rgb(0xCB, 0x4E, 0xBF).to_hex(), "#cb4ebf");
    }

    #[test]
    fn test_darken() {
        let c = HexColor::rgb(0xcb, 0x4e, 0xbf);
        assert_eq!(c.darken(0.2), HexColor::rgb(162, 62, 153));
        assert_eq!(c.darken(0.0), c);
    }

    #[test]
    fn test_port_colors_for_known_type() {
        // "str" hashes to 114225, index 5.
        let colors = port_colors("str", true);
        assert_eq!(colors.on.to_hex(), "#77db9e");
        assert_eq!(colors.off.to_hex(), "#5faf7e");
    }

    #[test]
    fn test_optional_port_is_darker() {
        let required = port_colors("str", true);
        let optional = port_colors("str", false);
        assert_eq!(required.on, optional.on);
        assert_eq!(optional.off.to_hex(), "#4c8c65");
    }

    #[test]
    fn test_empty_type_name_uses_first_color() {
        assert_eq!(port_colors("", true).on, DISTINCT_COLORS[0]);
    }

    #[test]
    fn test_colors_are_stable() {
        let a = port_colors("IMMessage", true);
        let b = port_colors("IMMessage", true);
        assert_eq!(a, b);
    }

    #[test]
    fn test_long_type_name_does_not_overflow() {
        let name = "LLMChatMessage".repeat(50);
        let colors = port_colors(&name, false);
        assert!(DISTINCT_COLORS.contains(&colors.on));
    }

    #[test]
    fn test_serde_round_trip() {
        let colors = port_colors("str", true);
        let json = serde_json::to_string(&colors).unwrap();
        assert_eq!(json, r##"{"on":"#77db9e","off":"#5faf7e"}"##);
        let parsed: PortColors = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, colors);
    }
}

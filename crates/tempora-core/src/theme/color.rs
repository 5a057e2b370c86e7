//! OKLCH coordinates and color-space conversion strategies

use serde::{Deserialize, Serialize};

use crate::error::{Result, TemporaError};

pub const MIN_C: f64 = 0.0;
pub const MAX_C: f64 = 0.4;
pub const MAX_L: f64 = 1.0;
pub const MAX_H: f64 = 360.0;

/// A color in OKLCH (lightness 0..1, chroma 0..~0.4, hue in degrees)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Oklch {
    pub l: f64,
    pub c: f64,
    pub h: f64,
}

impl Oklch {
    pub const fn new(l: f64, c: f64, h: f64) -> Self {
        Self { l, c, h }
    }

    /// Component-wise linear blend toward `other`
    pub fn blend(&self, other: &Oklch, amount: f64) -> Oklch {
        let mix = |a: f64, b: f64| a * (1.0 - amount) + b * amount;
        Oklch::new(mix(self.l, other.l), mix(self.c, other.c), mix(self.h, other.h))
    }

    /// CSS `oklch()` notation
    pub fn to_css(&self) -> String {
        format!("oklch({} {} {})", self.l, self.c, self.h)
    }
}

/// Conversion between OKLCH and gamma-encoded sRGB (channels 0..1)
pub trait ColorSpace {
    fn to_srgb(&self, color: &Oklch) -> [f64; 3];
    fn from_srgb(&self, rgb: [f64; 3]) -> Oklch;

    fn to_hex(&self, color: &Oklch) -> String {
        let [r, g, b] = self.to_srgb(color);
        let byte = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", byte(r), byte(g), byte(b))
    }

    fn from_hex(&self, hex: &str) -> Result<Oklch> {
        let rgb = parse_hex(hex).ok_or_else(|| TemporaError::InvalidHex(hex.to_string()))?;
        Ok(self.from_srgb(rgb))
    }
}

/// Accepts `#rgb` and `#rrggbb`, with or without the leading `#`
fn parse_hex(hex: &str) -> Option<[f64; 3]> {
    let digits = hex.trim().trim_start_matches('#');
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return None,
    };
    let channel = |i: usize| {
        u8::from_str_radix(expanded.get(i..i + 2)?, 16)
            .ok()
            .map(|v| v as f64 / 255.0)
    };
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// Björn Ottosson's OKLab over sRGB, clipping out-of-gamut channels
#[derive(Debug, Clone, Copy, Default)]
pub struct OklchSrgb;

impl OklchSrgb {
    /// Linear-light sRGB, unclipped
    pub fn to_linear_srgb(color: &Oklch) -> [f64; 3] {
        let h = color.h.to_radians();
        let (a, b) = (color.c * h.cos(), color.c * h.sin());

        let l_ = color.l + 0.396_337_777_4 * a + 0.215_803_757_3 * b;
        let m_ = color.l - 0.105_561_345_8 * a - 0.063_854_172_8 * b;
        let s_ = color.l - 0.089_484_177_5 * a - 1.291_485_548_0 * b;
        let (l, m, s) = (l_.powi(3), m_.powi(3), s_.powi(3));

        [
            4.076_741_662_1 * l - 3.307_711_591_3 * m + 0.230_969_929_2 * s,
            -1.268_438_004_6 * l + 2.609_757_401_1 * m - 0.341_319_396_5 * s,
            -0.004_196_086_3 * l - 0.703_418_614_7 * m + 1.707_614_701_0 * s,
        ]
    }

    pub fn from_linear_srgb([r, g, b]: [f64; 3]) -> Oklch {
        let l = (0.412_221_470_8 * r + 0.536_332_536_3 * g + 0.051_445_992_9 * b).cbrt();
        let m = (0.211_903_498_2 * r + 0.680_699_545_1 * g + 0.107_396_956_6 * b).cbrt();
        let s = (0.088_302_461_9 * r + 0.281_718_837_6 * g + 0.629_978_700_5 * b).cbrt();

        let lightness = 0.210_454_255_3 * l + 0.793_617_785_0 * m - 0.004_072_046_8 * s;
        let a = 1.977_998_495_1 * l - 2.428_592_205_0 * m + 0.450_593_709_9 * s;
        let b = 0.025_904_037_1 * l + 0.782_771_766_2 * m - 0.808_675_766_0 * s;

        let chroma = (a * a + b * b).sqrt();
        let hue = if chroma < 1e-7 {
            0.0
        } else {
            b.atan2(a).to_degrees().rem_euclid(MAX_H)
        };
        Oklch::new(lightness, chroma, hue)
    }
}

fn gamma_encode(v: f64) -> f64 {
    if v <= 0.003_130_8 {
        12.92 * v
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

fn gamma_decode(v: f64) -> f64 {
    if v <= 0.040_45 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

impl ColorSpace for OklchSrgb {
    fn to_srgb(&self, color: &Oklch) -> [f64; 3] {
        Self::to_linear_srgb(color).map(|v| gamma_encode(v.clamp(0.0, 1.0)))
    }

    fn from_srgb(&self, rgb: [f64; 3]) -> Oklch {
        Self::from_linear_srgb(rgb.map(gamma_decode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_black_and_white() {
        let space = OklchSrgb;
        assert_eq!(space.to_hex(&Oklch::new(0.0, 0.0, 0.0)), "#000000");
        assert_eq!(space.to_hex(&Oklch::new(1.0, 0.0, 0.0)), "#ffffff");

        let white = space.from_hex("#fff").unwrap();
        assert!((white.l - 1.0).abs() < 1e-4);
        assert!(white.c < 1e-4);
    }

    #[test]
    fn test_hex_survives_conversion() {
        let space = OklchSrgb;
        for hex in ["#a5d4ad", "#ff0000", "#123456", "#808080"] {
            let oklch = space.from_hex(hex).unwrap();
            assert_eq!(space.to_hex(&oklch), hex);
        }
    }

    #[test]
    fn test_red_hue() {
        let red = OklchSrgb.from_hex("#ff0000").unwrap();
        assert!((red.l - 0.628).abs() < 1e-3);
        assert!((red.c - 0.2577).abs() < 1e-3);
        assert!((red.h - 29.23).abs() < 0.1);
    }

    #[test]
    fn test_invalid_hex() {
        assert!(OklchSrgb.from_hex("#12345").is_err());
        assert!(OklchSrgb.from_hex("zzzzzz").is_err());
    }

    #[test]
    fn test_blend() {
        let a = Oklch::new(0.2, 0.1, 100.0);
        let b = Oklch::new(0.6, 0.3, 200.0);
        let mid = a.blend(&b, 0.5);
        assert!((mid.l - 0.4).abs() < 1e-12);
        assert!((mid.c - 0.2).abs() < 1e-12);
        assert!((mid.h - 150.0).abs() < 1e-12);
    }
}

//! Contrast evaluation of generated color schemes

use serde::Serialize;

use super::color::{ColorSpace, Oklch};
use super::scheme::{ColorScheme, ColorSchemeConfig};

/// What a color pair is used for; decides the grading thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CheckKind {
    Text,
    LargeText,
    Ui,
    Structure,
    Decorative,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grade {
    Aaa,
    Aa,
    Pass,
    Fail,
    NotApplicable,
}

/// Contrast measure between two gamma-encoded sRGB colors
pub trait ContrastMetric {
    fn name(&self) -> &str;
    /// Signed for polarity-aware metrics; compared by magnitude
    fn contrast(&self, fg: [f64; 3], bg: [f64; 3]) -> f64;
    fn grade(&self, kind: CheckKind, value: f64) -> Grade;
    /// Minimum passing magnitude on this metric's scale for a pair listed
    /// with the WCAG 2.1 ratio `ratio`
    fn required(&self, kind: CheckKind, ratio: f64) -> f64;
}

/// WCAG 2.1 luminance ratio, 1.0 ..= 21.0
#[derive(Debug, Clone, Copy, Default)]
pub struct Wcag21;

impl Wcag21 {
    fn relative_luminance(rgb: [f64; 3]) -> f64 {
        let [r, g, b] = rgb.map(|v| {
            if v <= 0.040_45 {
                v / 12.92
            } else {
                ((v + 0.055) / 1.055).powf(2.4)
            }
        });
        0.2126 * r + 0.7152 * g + 0.0722 * b
    }
}

impl ContrastMetric for Wcag21 {
    fn name(&self) -> &str {
        "WCAG 2.1"
    }

    fn contrast(&self, fg: [f64; 3], bg: [f64; 3]) -> f64 {
        let a = Self::relative_luminance(fg);
        let b = Self::relative_luminance(bg);
        let (hi, lo) = if a > b { (a, b) } else { (b, a) };
        (hi + 0.05) / (lo + 0.05)
    }

    fn grade(&self, kind: CheckKind, value: f64) -> Grade {
        match kind {
            CheckKind::Text if value >= 7.0 => Grade::Aaa,
            CheckKind::Text if value >= 4.5 => Grade::Aa,
            CheckKind::LargeText if value >= 4.5 => Grade::Aaa,
            CheckKind::LargeText if value >= 3.0 => Grade::Aa,
            CheckKind::Ui if value >= 3.0 => Grade::Pass,
            CheckKind::Structure if value >= 1.5 => Grade::Pass,
            CheckKind::Decorative => Grade::NotApplicable,
            CheckKind::Custom => Grade::NotApplicable,
            _ => Grade::Fail,
        }
    }

    fn required(&self, _kind: CheckKind, ratio: f64) -> f64 {
        ratio
    }
}

/// APCA (W3 0.0.98G) lightness contrast, roughly -108 ..= 106 Lc.
///
/// Positive for dark text on a light background, negative for the reverse.
#[derive(Debug, Clone, Copy, Default)]
pub struct Apca;

impl Apca {
    const BLACK_THRESHOLD: f64 = 0.022;
    const BLACK_CLAMP: f64 = 1.414;
    const LOW_CLIP: f64 = 0.1;
    const DELTA_Y_MIN: f64 = 0.0005;
    const SCALE: f64 = 1.14;
    const LOW_OFFSET: f64 = 0.027;

    fn screen_luminance(rgb: [f64; 3]) -> f64 {
        let [r, g, b] = rgb.map(|v| v.signum() * v.abs().powf(2.4));
        let y = 0.212_672_9 * r + 0.715_152_2 * g + 0.072_175 * b;
        if y >= Self::BLACK_THRESHOLD {
            y
        } else {
            y + (Self::BLACK_THRESHOLD - y).powf(Self::BLACK_CLAMP)
        }
    }
}

impl ContrastMetric for Apca {
    fn name(&self) -> &str {
        "APCA"
    }

    fn contrast(&self, fg: [f64; 3], bg: [f64; 3]) -> f64 {
        let y_text = Self::screen_luminance(fg);
        let y_bg = Self::screen_luminance(bg);
        if (y_bg - y_text).abs() < Self::DELTA_Y_MIN {
            return 0.0;
        }
        let c = if y_bg > y_text {
            (y_bg.powf(0.56) - y_text.powf(0.57)) * Self::SCALE
        } else {
            (y_bg.powf(0.65) - y_text.powf(0.62)) * Self::SCALE
        };
        let lc = if c.abs() < Self::LOW_CLIP {
            0.0
        } else if c > 0.0 {
            c - Self::LOW_OFFSET
        } else {
            c + Self::LOW_OFFSET
        };
        lc * 100.0
    }

    /// Body text is graded at 16px normal weight, large text at 24px, UI at 24px bold
    fn grade(&self, kind: CheckKind, value: f64) -> Grade {
        let lc = value.abs();
        match kind {
            CheckKind::Text if lc >= 90.0 => Grade::Aaa,
            CheckKind::Text if lc >= 75.0 => Grade::Aa,
            CheckKind::LargeText if lc >= 60.0 => Grade::Aaa,
            CheckKind::LargeText if lc >= 45.0 => Grade::Aa,
            CheckKind::Ui if lc >= 45.0 => Grade::Pass,
            CheckKind::Structure if lc >= 15.0 => Grade::Pass,
            CheckKind::Decorative if lc >= 5.0 => Grade::Pass,
            CheckKind::Custom => Grade::NotApplicable,
            _ => Grade::Fail,
        }
    }

    fn required(&self, kind: CheckKind, ratio: f64) -> f64 {
        match kind {
            CheckKind::Text => 75.0,
            CheckKind::LargeText | CheckKind::Ui => 45.0,
            CheckKind::Structure => 15.0,
            CheckKind::Decorative => 5.0,
            CheckKind::Custom if ratio >= 7.0 => 90.0,
            CheckKind::Custom if ratio >= 4.5 => 75.0,
            CheckKind::Custom if ratio >= 3.0 => 45.0,
            CheckKind::Custom => 15.0,
        }
    }
}

/// A color pair whose contrast fell below its expected ratio
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContrastCheck {
    pub fg_name: String,
    pub bg_name: String,
    pub fg: Oklch,
    pub bg: Oklch,
    pub kind: CheckKind,
    pub value: f64,
    pub expected: f64,
    pub grade: Grade,
}

/// Role pairs every scheme is held to, with their minimum ratios
const STANDARD_CHECKS: [(&str, &str, CheckKind, f64); 14] = [
    ("primary", "onPrimary", CheckKind::Text, 4.5),
    ("primaryContainer", "onPrimaryContainer", CheckKind::Text, 4.5),
    ("secondary", "onSecondary", CheckKind::Text, 4.5),
    ("secondaryContainer", "onSecondaryContainer", CheckKind::Text, 4.5),
    ("tertiary", "onTertiary", CheckKind::Text, 4.5),
    ("tertiaryContainer", "onTertiaryContainer", CheckKind::Text, 4.5),
    ("error", "onError", CheckKind::Text, 4.5),
    ("errorContainer", "onErrorContainer", CheckKind::Text, 4.5),
    ("background", "onBackground", CheckKind::Text, 4.5),
    ("surface", "onSurface", CheckKind::Text, 4.5),
    ("surfaceVariant", "onSurfaceVariant", CheckKind::Text, 4.5),
    ("inverseSurface", "inverseOnSurface", CheckKind::Text, 4.5),
    ("outline", "background", CheckKind::Ui, 3.0),
    ("outlineVariant", "surface", CheckKind::Structure, 1.5),
];

const ACCENT_ROLES: [&str; 4] = ["primary", "secondary", "tertiary", "error"];

/// Evaluate a scheme and return only the failing pairs.
///
/// Pairs naming a color the scheme lacks are skipped. Custom colors are
/// checked only against the ratios listed in their `contrast_vs`. Listed
/// ratios are WCAG 2.1 ratios; the metric translates them to its own scale.
pub fn evaluate_contrast(
    scheme: &ColorScheme,
    config: &ColorSchemeConfig,
    metric: &dyn ContrastMetric,
    space: &dyn ColorSpace,
) -> Vec<ContrastCheck> {
    let mut pairs: Vec<(String, String, CheckKind, f64)> = STANDARD_CHECKS
        .iter()
        .map(|&(fg, bg, kind, expected)| (fg.to_string(), bg.to_string(), kind, expected))
        .collect();

    for accent in ACCENT_ROLES {
        for surface in ["background", "surface"] {
            pairs.push((accent.to_string(), surface.to_string(), CheckKind::Ui, 3.0));
        }
    }

    for custom in &config.custom_colors {
        for (other, &expected) in &custom.contrast_vs {
            pairs.push((custom.name.clone(), other.clone(), CheckKind::Custom, expected));
        }
    }

    pairs
        .into_iter()
        .filter_map(|(fg_name, bg_name, kind, ratio)| {
            let (Some(fg), Some(bg)) = (scheme.color(&fg_name), scheme.color(&bg_name)) else {
                return None;
            };
            let value = metric.contrast(space.to_srgb(&fg), space.to_srgb(&bg));
            let expected = metric.required(kind, ratio);
            if value.abs() >= expected {
                return None;
            }
            Some(ContrastCheck {
                fg_name,
                bg_name,
                fg,
                bg,
                kind,
                value,
                expected,
                grade: metric.grade(kind, value),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::theme::color::OklchSrgb;
    use crate::theme::scheme::{generate_color_scheme, BaseColors, CustomColorConfig, PaletteKey};

    fn config(is_dark: bool) -> ColorSchemeConfig {
        let mut contrast_vs = BTreeMap::new();
        contrast_vs.insert("surface".to_string(), 21.0);
        ColorSchemeConfig {
            name: "contrast".into(),
            is_dark,
            base_colors: BaseColors {
                primary: Oklch::new(0.6, 0.12, 250.0),
                secondary: Oklch::new(0.6, 0.05, 250.0),
                tertiary: Oklch::new(0.6, 0.1, 70.0),
                neutral: Oklch::new(0.6, 0.01, 250.0),
                neutral_variant: Oklch::new(0.6, 0.02, 250.0),
                error: Oklch::new(0.6, 0.2, 25.0),
            },
            custom_colors: vec![CustomColorConfig {
                name: "unreachable".into(),
                palette: PaletteKey::Primary,
                light_lightness: 50,
                dark_lightness: 50,
                blend: false,
                contrast_vs,
            }],
        }
    }

    #[test]
    fn test_black_on_white_is_21() {
        let ratio = Wcag21.contrast([0.0; 3], [1.0; 3]);
        assert!((ratio - 21.0).abs() < 1e-9);
        assert!((Wcag21.contrast([0.5; 3], [0.5; 3]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_grades() {
        assert_eq!(Wcag21.grade(CheckKind::Text, 7.5), Grade::Aaa);
        assert_eq!(Wcag21.grade(CheckKind::Text, 5.0), Grade::Aa);
        assert_eq!(Wcag21.grade(CheckKind::Text, 3.0), Grade::Fail);
        assert_eq!(Wcag21.grade(CheckKind::LargeText, 3.5), Grade::Aa);
        assert_eq!(Wcag21.grade(CheckKind::Ui, 2.0), Grade::Fail);
        assert_eq!(Wcag21.grade(CheckKind::Structure, 1.6), Grade::Pass);
    }

    #[test]
    fn test_apca_reference_values() {
        // black text on white, white text on black
        assert!((Apca.contrast([0.0; 3], [1.0; 3]) - 106.04).abs() < 0.05);
        assert!((Apca.contrast([1.0; 3], [0.0; 3]) + 107.88).abs() < 0.05);
        assert_eq!(Apca.contrast([0.5; 3], [0.5; 3]), 0.0);
    }

    #[test]
    fn test_apca_grades() {
        assert_eq!(Apca.grade(CheckKind::Text, 92.0), Grade::Aaa);
        assert_eq!(Apca.grade(CheckKind::Text, -80.0), Grade::Aa);
        assert_eq!(Apca.grade(CheckKind::Text, 70.0), Grade::Fail);
        assert_eq!(Apca.grade(CheckKind::LargeText, 50.0), Grade::Aa);
        assert_eq!(Apca.grade(CheckKind::Ui, 40.0), Grade::Fail);
        assert_eq!(Apca.grade(CheckKind::Structure, 16.0), Grade::Pass);
        assert_eq!(Apca.grade(CheckKind::Decorative, 3.0), Grade::Fail);
        assert_eq!(Wcag21.required(CheckKind::Text, 4.5), 4.5);
        assert_eq!(Apca.required(CheckKind::Text, 4.5), 75.0);
        assert_eq!(Apca.required(CheckKind::Custom, 21.0), 90.0);
    }

    #[test]
    fn test_metrics_are_interchangeable() {
        let config = config(false);
        let scheme = generate_color_scheme(&config);
        let metrics: [&dyn ContrastMetric; 2] = [&Wcag21, &Apca];

        for metric in metrics {
            let failures = evaluate_contrast(&scheme, &config, metric, &OklchSrgb);
            assert!(
                failures
                    .iter()
                    .any(|f| f.fg_name == "unreachable" && f.bg_name == "surface"),
                "{}",
                metric.name()
            );
            assert!(failures.iter().all(|f| f.value.abs() < f.expected));
        }
    }

    #[test]
    fn test_only_failures_reported() {
        let config = config(false);
        let scheme = generate_color_scheme(&config);
        let failures = evaluate_contrast(&scheme, &config, &Wcag21, &OklchSrgb);

        // a mid-tone can never reach 21:1 against the surface
        assert!(failures
            .iter()
            .any(|f| f.fg_name == "unreachable" && f.bg_name == "surface"));
        assert!(failures.iter().all(|f| f.value < f.expected));
        // tone 40 against tone 100 comfortably passes
        assert!(!failures
            .iter()
            .any(|f| f.fg_name == "primary" && f.bg_name == "onPrimary"));
    }

    #[test]
    fn test_unknown_colors_skipped() {
        let mut config = config(true);
        config.custom_colors[0].contrast_vs.clear();
        config.custom_colors[0]
            .contrast_vs
            .insert("doesNotExist".into(), 4.5);
        let scheme = generate_color_scheme(&config);
        let failures = evaluate_contrast(&scheme, &config, &Wcag21, &OklchSrgb);
        assert!(failures.iter().all(|f| f.bg_name != "doesNotExist"));
    }
}

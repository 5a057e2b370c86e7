//! Tonal palette and color role generation

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::color::{Oklch, MAX_C, MAX_H, MAX_L, MIN_C};

/// Tones generated for every base palette (0 = darkest, 100 = lightest)
pub const PALETTE_TONES: [u32; 22] = [
    0, 5, 10, 15, 20, 25, 30, 35, 40, 50, 60, 70, 80, 87, 90, 92, 94, 95, 96, 98, 99, 100,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaletteKey {
    Primary,
    Secondary,
    Tertiary,
    Neutral,
    NeutralVariant,
    Error,
}

impl PaletteKey {
    pub const ALL: [PaletteKey; 6] = [
        Self::Primary,
        Self::Secondary,
        Self::Tertiary,
        Self::Neutral,
        Self::NeutralVariant,
        Self::Error,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Tertiary => "tertiary",
            Self::Neutral => "neutral",
            Self::NeutralVariant => "neutralVariant",
            Self::Error => "error",
        }
    }
}

/// Role name, source palette, light tone, dark tone
pub const COLOR_ROLES: [(&str, PaletteKey, u32, u32); 29] = [
    ("primary", PaletteKey::Primary, 40, 80),
    ("onPrimary", PaletteKey::Primary, 100, 20),
    ("primaryContainer", PaletteKey::Primary, 90, 30),
    ("onPrimaryContainer", PaletteKey::Primary, 10, 90),
    ("secondary", PaletteKey::Secondary, 40, 80),
    ("onSecondary", PaletteKey::Secondary, 100, 20),
    ("secondaryContainer", PaletteKey::Secondary, 90, 30),
    ("onSecondaryContainer", PaletteKey::Secondary, 10, 90),
    ("tertiary", PaletteKey::Tertiary, 40, 80),
    ("onTertiary", PaletteKey::Tertiary, 100, 20),
    ("tertiaryContainer", PaletteKey::Tertiary, 90, 30),
    ("onTertiaryContainer", PaletteKey::Tertiary, 10, 90),
    ("error", PaletteKey::Error, 40, 80),
    ("onError", PaletteKey::Error, 100, 20),
    ("errorContainer", PaletteKey::Error, 90, 30),
    ("onErrorContainer", PaletteKey::Error, 10, 90),
    ("background", PaletteKey::Neutral, 99, 10),
    ("onBackground", PaletteKey::Neutral, 10, 90),
    ("surface", PaletteKey::Neutral, 99, 10),
    ("onSurface", PaletteKey::Neutral, 10, 90),
    ("surfaceVariant", PaletteKey::NeutralVariant, 90, 30),
    ("onSurfaceVariant", PaletteKey::NeutralVariant, 30, 80),
    ("outline", PaletteKey::NeutralVariant, 50, 60),
    ("outlineVariant", PaletteKey::NeutralVariant, 80, 30),
    ("inverseSurface", PaletteKey::Neutral, 20, 90),
    ("inverseOnSurface", PaletteKey::Neutral, 95, 20),
    ("inversePrimary", PaletteKey::Primary, 80, 40),
    ("surfaceTint", PaletteKey::Primary, 40, 80),
    ("scrim", PaletteKey::Neutral, 0, 0),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseColors {
    pub primary: Oklch,
    pub secondary: Oklch,
    pub tertiary: Oklch,
    pub neutral: Oklch,
    pub neutral_variant: Oklch,
    pub error: Oklch,
}

impl BaseColors {
    pub fn get(&self, key: PaletteKey) -> Oklch {
        match key {
            PaletteKey::Primary => self.primary,
            PaletteKey::Secondary => self.secondary,
            PaletteKey::Tertiary => self.tertiary,
            PaletteKey::Neutral => self.neutral,
            PaletteKey::NeutralVariant => self.neutral_variant,
            PaletteKey::Error => self.error,
        }
    }

    /// Boost chroma and derive the tertiary hue from the primary one
    pub fn vitamin(&self) -> BaseColors {
        let Oklch { l, c, h } = self.primary;
        BaseColors {
            primary: Oklch::new((l * 1.1).min(0.72), (c * 1.5).min(MAX_C), h),
            secondary: Oklch::new(
                self.secondary.l + 0.1,
                (self.secondary.c * 1.5).min(0.35),
                self.secondary.h,
            ),
            tertiary: Oklch::new((l * 1.05).min(0.72), (c * 1.1).min(MAX_C), (h + 180.0) % MAX_H),
            neutral: Oklch::new((l * 0.9).min(MAX_L), (c * 0.1).min(MAX_C), h),
            neutral_variant: Oklch::new(
                self.neutral_variant.l.min(MAX_L),
                self.neutral_variant.c.min(MAX_C),
                self.neutral_variant.h,
            ),
            error: Oklch::new(
                (self.error.l * 1.5).min(MAX_L),
                (self.error.c * 1.5).min(MAX_C),
                self.error.h,
            ),
        }
    }
}

/// An extra named color derived from one of the base palettes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomColorConfig {
    pub name: String,
    pub palette: PaletteKey,
    pub light_lightness: u32,
    pub dark_lightness: u32,
    #[serde(default)]
    pub blend: bool,
    /// Minimum contrast ratios against other role or custom color names
    #[serde(default)]
    pub contrast_vs: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorSchemeConfig {
    pub name: String,
    pub is_dark: bool,
    pub base_colors: BaseColors,
    #[serde(default)]
    pub custom_colors: Vec<CustomColorConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorScheme {
    pub config: ColorSchemeConfig,
    /// Keyed `{palette}{tone}`, e.g. `primary40`
    pub palette: BTreeMap<String, Oklch>,
    pub roles: BTreeMap<String, Oklch>,
    pub custom_colors: BTreeMap<String, Oklch>,
}

impl ColorScheme {
    /// Look up a custom or role color by name; custom colors shadow roles
    pub fn color(&self, name: &str) -> Option<Oklch> {
        self.custom_colors
            .get(name)
            .or_else(|| self.roles.get(name))
            .copied()
    }
}

/// Invert lightness for dark schemes, clamp chroma, wrap hue
pub fn adjust_base_color(base: Oklch, is_dark: bool) -> Oklch {
    Oklch::new(
        if is_dark { 1.0 - base.l } else { base.l },
        base.c.clamp(MIN_C, MAX_C),
        (base.h + MAX_H) % MAX_H,
    )
}

/// Replace lightness with the tone; dark schemes compress tones into 0.16..1.0
pub fn tone_color(base: Oklch, tone: u32, is_dark: bool) -> Oklch {
    let t = tone as f64 / 100.0;
    let l = if is_dark {
        0.08 + (1.0 - t) * 0.08 + t * 0.92
    } else {
        t
    };
    Oklch::new(l, base.c, base.h)
}

pub fn generate_palette(base_colors: &BaseColors, is_dark: bool) -> BTreeMap<String, Oklch> {
    let mut palette = BTreeMap::new();
    for key in PaletteKey::ALL {
        let base = adjust_base_color(base_colors.get(key), is_dark);
        for tone in PALETTE_TONES {
            palette.insert(format!("{}{}", key.name(), tone), tone_color(base, tone, is_dark));
        }
    }
    palette
}

pub fn generate_role_colors(base_colors: &BaseColors, is_dark: bool) -> BTreeMap<String, Oklch> {
    COLOR_ROLES
        .iter()
        .map(|&(name, key, light, dark)| {
            let base = adjust_base_color(base_colors.get(key), is_dark);
            let tone = if is_dark { dark } else { light };
            (name.to_string(), tone_color(base, tone, is_dark))
        })
        .collect()
}

pub fn generate_custom_colors(
    custom_colors: &[CustomColorConfig],
    base_colors: &BaseColors,
    is_dark: bool,
    palette: &BTreeMap<String, Oklch>,
) -> BTreeMap<String, Oklch> {
    let surface_key = if is_dark { "neutral10" } else { "neutral99" };
    custom_colors
        .iter()
        .map(|config| {
            let base = adjust_base_color(base_colors.get(config.palette), is_dark);
            let tone = if is_dark { config.dark_lightness } else { config.light_lightness };
            let mut color = tone_color(base, tone, is_dark);
            if config.blend {
                if let Some(surface) = palette.get(surface_key) {
                    color = color.blend(surface, 0.15);
                }
            }
            (config.name.clone(), color)
        })
        .collect()
}

/// Build palette, roles and custom colors for a scheme config
pub fn generate_color_scheme(config: &ColorSchemeConfig) -> ColorScheme {
    let base_colors = config.base_colors.vitamin();
    let palette = generate_palette(&base_colors, config.is_dark);
    let roles = generate_role_colors(&base_colors, config.is_dark);
    // custom colors derive from the unadjusted bases
    let custom_colors =
        generate_custom_colors(&config.custom_colors, &config.base_colors, config.is_dark, &palette);

    ColorScheme {
        config: config.clone(),
        palette,
        roles,
        custom_colors,
    }
}

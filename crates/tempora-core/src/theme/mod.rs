//! OKLCH color scheme generation.
//!
//! One generator and one evaluator; the color-space conversion and the
//! contrast metric are passed in as strategies.

mod color;
mod contrast;
mod css;
mod scheme;

pub use color::{ColorSpace, Oklch, OklchSrgb, MAX_C, MIN_C};
pub use contrast::{
    evaluate_contrast, Apca, CheckKind, ContrastCheck, ContrastMetric, Grade, Wcag21,
};
pub use css::css_variables;
pub use scheme::{
    adjust_base_color, generate_color_scheme, generate_custom_colors, generate_palette,
    generate_role_colors, tone_color, BaseColors, ColorScheme, ColorSchemeConfig,
    CustomColorConfig, PaletteKey, COLOR_ROLES, PALETTE_TONES,
};

/// The editor's stock green scheme
pub fn default_scheme_config(is_dark: bool) -> ColorSchemeConfig {
    ColorSchemeConfig {
        name: "Default".into(),
        is_dark,
        base_colors: default_base_colors(),
        custom_colors: Vec::new(),
    }
}

pub fn default_base_colors() -> BaseColors {
    BaseColors {
        primary: Oklch::new(0.6, 0.13, 150.0),
        secondary: Oklch::new(0.6, 0.06, 150.0),
        tertiary: Oklch::new(0.6, 0.1, 330.0),
        neutral: Oklch::new(0.6, 0.01, 150.0),
        neutral_variant: Oklch::new(0.6, 0.02, 150.0),
        error: Oklch::new(0.6, 0.22, 25.0),
    }
}

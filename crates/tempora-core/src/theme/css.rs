//! CSS custom property export

use std::collections::BTreeMap;

use super::color::{ColorSpace, Oklch};
use super::scheme::ColorScheme;

fn to_kebab_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev_lower = false;
    for ch in s.chars() {
        if ch.is_ascii_uppercase() && prev_lower {
            out.push('-');
        }
        prev_lower = ch.is_ascii_lowercase();
        out.push(ch.to_ascii_lowercase());
    }
    out
}

/// Flatten a scheme into `--md-*` variables, each as hex and as `oklch()`
pub fn css_variables(scheme: &ColorScheme, space: &dyn ColorSpace) -> BTreeMap<String, String> {
    let mut vars = BTreeMap::new();
    let mut set = |prefix: &str, key: &str, value: &Oklch| {
        let name = format!("--{}-{}", prefix, to_kebab_case(key));
        vars.insert(format!("{name}-oklch"), value.to_css());
        vars.insert(name, space.to_hex(value));
    };

    for (key, value) in &scheme.palette {
        set("md-ref-palette", key, value);
    }
    for (key, value) in &scheme.roles {
        set("md-sys-color", key, value);
    }
    for (key, value) in &scheme.custom_colors {
        set("md-custom-color", key, value);
    }
    vars
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::color::OklchSrgb;

    #[test]
    fn test_kebab_case() {
        assert_eq!(to_kebab_case("onPrimaryContainer"), "on-primary-container");
        assert_eq!(to_kebab_case("neutralVariant90"), "neutral-variant90");
        assert_eq!(to_kebab_case("sing-grid-cell"), "sing-grid-cell");
    }

    #[test]
    fn test_variables() {
        let mut scheme = ColorScheme {
            config: crate::theme::default_scheme_config(false),
            palette: BTreeMap::new(),
            roles: BTreeMap::new(),
            custom_colors: BTreeMap::new(),
        };
        scheme.roles.insert("onSurface".into(), Oklch::new(0.0, 0.0, 0.0));
        let vars = css_variables(&scheme, &OklchSrgb);
        assert_eq!(vars["--md-sys-color-on-surface"], "#000000");
        assert_eq!(vars["--md-sys-color-on-surface-oklch"], "oklch(0 0 0)");
        assert_eq!(vars.len(), 2);
    }
}

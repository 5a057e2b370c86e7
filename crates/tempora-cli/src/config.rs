use std::path::{Path, PathBuf};

use anyhow::Context;
use tempora_core::theme::{default_base_colors, BaseColors, ColorSchemeConfig, ColorSpace};
use tempora_core::{ProjectState, SnapType, DEFAULT_TPQN};

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub(crate) struct AppConfig {
    #[serde(default)]
    pub sequencer: SequencerConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sequencer: SequencerConfig::default(),
            theme: ThemeConfig::default(),
            log_filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "tempora=info".into()
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub(crate) struct SequencerConfig {
    #[serde(default = "default_tpqn")]
    pub tpqn: u32,
    #[serde(default = "default_snap_type")]
    pub snap_type: u32,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            tpqn: default_tpqn(),
            snap_type: default_snap_type(),
        }
    }
}

fn default_tpqn() -> u32 {
    DEFAULT_TPQN
}

fn default_snap_type() -> u32 {
    SnapType::default().0
}

/// Hex overrides for the base colors; unset entries use the stock scheme
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Default)]
pub(crate) struct ThemeConfig {
    #[serde(default)]
    pub dark: bool,
    pub primary: Option<String>,
    pub secondary: Option<String>,
    pub tertiary: Option<String>,
    pub neutral: Option<String>,
    pub neutral_variant: Option<String>,
    pub error: Option<String>,
}

impl ThemeConfig {
    pub fn scheme_config(&self, space: &dyn ColorSpace, is_dark: bool) -> anyhow::Result<ColorSchemeConfig> {
        let defaults = default_base_colors();
        let pick = |hex: &Option<String>, fallback| match hex {
            Some(hex) => space.from_hex(hex),
            None => Ok(fallback),
        };
        let base_colors = BaseColors {
            primary: pick(&self.primary, defaults.primary)?,
            secondary: pick(&self.secondary, defaults.secondary)?,
            tertiary: pick(&self.tertiary, defaults.tertiary)?,
            neutral: pick(&self.neutral, defaults.neutral)?,
            neutral_variant: pick(&self.neutral_variant, defaults.neutral_variant)?,
            error: pick(&self.error, defaults.error)?,
        };
        Ok(ColorSchemeConfig {
            name: "Custom".into(),
            is_dark,
            base_colors,
            custom_colors: Vec::new(),
        })
    }
}

impl AppConfig {
    /// Empty project using the configured resolution and snap grid
    pub fn new_project(&self) -> ProjectState {
        let mut project = ProjectState::new(self.sequencer.tpqn);
        project.snap_type = SnapType(self.sequencer.snap_type);
        project
    }
}

pub(crate) fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tempora")
        .join("config.toml")
}

/// A missing file yields the defaults; a malformed one is an error
pub(crate) fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(AppConfig::default()),
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };
    toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

pub(crate) fn save_config(path: &Path, config: &AppConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let s = toml::to_string_pretty(config)?;
    std::fs::write(path, s).with_context(|| format!("writing {}", path.display()))
}

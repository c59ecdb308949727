use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const CLASSROOM_LIGHT_BACKGROUND: &str = "#ffffff";
const CLASSROOM_LIGHT_LABEL: &str = "#1f2937";
const CLASSROOM_LIGHT_BACKDROP: &str = "#f9fafb";

const BUILTIN_THEMES: &[(&str, &str)] = &[
    ("blueprint", include_str!("../themes/blueprint.toml")),
    ("classroom_dark", include_str!("../themes/classroom_dark.toml")),
    ("classroom_light", include_str!("../themes/classroom_light.toml")),
];

const LABEL_FONT_FAMILY: &str = "sans-serif";
const LABEL_FONT_SIZE: f32 = 12.0;
const LABEL_PADDING: f32 = 4.0;
const LABEL_OFFSET: f32 = 0.0;

/// Scene-wide styling. Per-variant cell colors are fixed tables and are not
/// themeable; the theme covers the surface and connector labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "default_background")]
    pub background_color: String,
    #[serde(default = "default_label")]
    pub label_color: String,
    /// Fill behind connector labels; `"none"` draws bare text
    #[serde(default = "default_backdrop")]
    pub label_backdrop_color: String,

    #[serde(default = "default_font_family")]
    pub label_font_family: String,
    #[serde(default = "default_font_size")]
    pub label_font_size: f32,
    #[serde(default = "default_label_padding")]
    pub label_padding: f32,
    /// Distance the label is lifted above its anchor; 0 centers it on the anchor
    #[serde(default = "default_label_offset")]
    pub label_offset: f32,
}

fn default_background() -> String {
    CLASSROOM_LIGHT_BACKGROUND.to_string()
}
fn default_label() -> String {
    CLASSROOM_LIGHT_LABEL.to_string()
}
fn default_backdrop() -> String {
    CLASSROOM_LIGHT_BACKDROP.to_string()
}
fn default_font_family() -> String {
    LABEL_FONT_FAMILY.to_string()
}
fn default_font_size() -> f32 {
    LABEL_FONT_SIZE
}
fn default_label_padding() -> f32 {
    LABEL_PADDING
}
fn default_label_offset() -> f32 {
    LABEL_OFFSET
}

impl Default for Theme {
    fn default() -> Self {
        Self::classroom_light()
    }
}

impl Theme {
    pub fn classroom_light() -> Self {
        Theme {
            background_color: default_background(),
            label_color: default_label(),
            label_backdrop_color: default_backdrop(),
            label_font_family: default_font_family(),
            label_font_size: LABEL_FONT_SIZE,
            label_padding: LABEL_PADDING,
            label_offset: LABEL_OFFSET,
        }
    }

    pub fn has_label_backdrop(&self) -> bool {
        let color = self.label_backdrop_color.trim();
        !color.is_empty() && !color.eq_ignore_ascii_case("none")
    }

    pub fn from_builtin(name: &str) -> Result<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
        let content = BUILTIN_THEMES
            .iter()
            .find(|(n, _)| *n == normalized)
            .map(|(_, c)| *c)
            .ok_or_else(|| Error::UnknownTheme {
                name: name.to_string(),
                available: Self::list_builtins().join(", "),
            })?;
        Self::from_toml(content)
    }

    pub fn list_builtins() -> Vec<&'static str> {
        BUILTIN_THEMES.iter().map(|(n, _)| *n).collect()
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let theme: Theme = toml::from_str(content)?;
        Ok(theme.sanitized())
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let theme: Theme = serde_yaml::from_str(content)?;
        Ok(theme.sanitized())
    }

    /// Replaces label metrics text layout cannot use with the defaults.
    pub fn sanitized(mut self) -> Self {
        if !self.label_font_size.is_finite() || self.label_font_size <= 0.0 {
            tracing::warn!(size = self.label_font_size, "invalid label font size, using default");
            self.label_font_size = LABEL_FONT_SIZE;
        }
        if !self.label_padding.is_finite() || self.label_padding < 0.0 {
            tracing::warn!(padding = self.label_padding, "invalid label padding, using default");
            self.label_padding = LABEL_PADDING;
        }
        if !self.label_offset.is_finite() {
            tracing::warn!("invalid label offset, using default");
            self.label_offset = LABEL_OFFSET;
        }
        self
    }

    /// Built-in name, or a path to a TOML/YAML theme file.
    pub fn resolve(name_or_path: &str) -> Result<Self> {
        let path = std::path::Path::new(name_or_path);
        if !path.is_file() {
            return Self::from_builtin(name_or_path);
        }

        let content = std::fs::read_to_string(path)?;
        // Try TOML first, then YAML
        match Self::from_toml(&content) {
            Ok(theme) => Ok(theme),
            Err(toml_err) => Self::from_yaml(&content).map_err(|_| toml_err),
        }
    }
}

//! Scene files.
//!
//! A scene file declares the surface size, the cells and arrows to draw and,
//! optionally, the page sections a navigation list tracks. TOML, YAML and JSON
//! are accepted; the format is picked from the file extension.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::diagram::{Connector, Particle, Scene};
use crate::error::{Error, Result};
use crate::theme::Theme;
use crate::tracker::{SectionDescriptor, SectionTracker, ViewportHost};

const DEFAULT_WIDTH: f32 = 800.0;
const DEFAULT_HEIGHT: f32 = 600.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Yaml,
    Json,
}

impl Format {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "toml" => Ok(Format::Toml),
            "yaml" | "yml" => Ok(Format::Yaml),
            "json" => Ok(Format::Json),
            _ => Err(Error::UnsupportedFormat(ext)),
        }
    }
}

/// Theme reference inside a scene: a built-in name or an inline table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThemeSpec {
    Named(String),
    Inline(Theme),
}

impl ThemeSpec {
    pub fn resolve(&self) -> Result<Theme> {
        match self {
            ThemeSpec::Named(name) => Theme::resolve(name),
            ThemeSpec::Inline(theme) => Ok(theme.clone().sanitized()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default = "default_width")]
    pub width: f32,
    #[serde(default = "default_height")]
    pub height: f32,
    /// Seed for the per-cell rotations; random when absent
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub theme: Option<ThemeSpec>,
    #[serde(default)]
    pub particles: Vec<Particle>,
    #[serde(default)]
    pub connectors: Vec<Connector>,
    #[serde(default)]
    pub sections: Vec<SectionDescriptor>,
    #[serde(default)]
    pub default_section: Option<String>,
}

fn default_width() -> f32 {
    DEFAULT_WIDTH
}
fn default_height() -> f32 {
    DEFAULT_HEIGHT
}

impl SceneConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let format = Format::from_path(path)?;
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, format)
    }

    pub fn parse(content: &str, format: Format) -> Result<Self> {
        let config: SceneConfig = match format {
            Format::Toml => toml::from_str(content)?,
            Format::Yaml => serde_yaml::from_str(content)?,
            Format::Json => serde_json::from_str(content)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.width.is_finite() && self.width > 0.0)
            || !(self.height.is_finite() && self.height > 0.0)
        {
            return Err(Error::InvalidScene(format!(
                "surface size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if let Some(default) = &self.default_section {
            if !self.sections.iter().any(|s| &s.id == default) {
                return Err(Error::InvalidScene(format!(
                    "default_section '{}' is not one of the declared sections",
                    default
                )));
            }
        }
        Ok(())
    }

    pub fn theme(&self) -> Result<Theme> {
        self.theme
            .as_ref()
            .map_or_else(|| Ok(Theme::default()), ThemeSpec::resolve)
    }

    /// Mounts the declared diagram. An explicit `seed` overrides the file's.
    pub fn mount_scene(&self, seed: Option<u64>) -> Scene {
        Scene::mount(
            self.width,
            self.height,
            &self.particles,
            &self.connectors,
            seed.or(self.seed),
        )
    }

    /// Default active section: the declared one, else the first section.
    pub fn default_section_id(&self) -> Option<&str> {
        self.default_section
            .as_deref()
            .or_else(|| self.sections.first().map(|s| s.id.as_str()))
    }

    /// Mounts a tracker over the declared sections. `None` when the scene
    /// declares no sections.
    pub fn mount_tracker<H: ViewportHost>(&self, host: H) -> Option<SectionTracker<H>> {
        let default = self.default_section_id()?.to_string();
        Some(SectionTracker::mount(host, self.sections.clone(), default))
    }
}

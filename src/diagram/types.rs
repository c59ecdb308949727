use serde::{Deserialize, Serialize};

pub const DEFAULT_PARTICLE_SIZE: f32 = 40.0;
pub const DEFAULT_SPEED: f32 = 1.0;
pub const DEFAULT_CONNECTOR_COLOR: &str = "#000000";

/// A 2-D point in surface-local coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn distance_to(&self, other: Point) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// Biological category a cell represents. The set is closed; unknown names
/// are rejected when a scene is deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Normal,
    Abnormal,
    Tumor,
    Immune,
    Tissue,
    Cancer,
}

impl Variant {
    pub const ALL: [Variant; 6] = [
        Variant::Normal,
        Variant::Abnormal,
        Variant::Tumor,
        Variant::Immune,
        Variant::Tissue,
        Variant::Cancer,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Variant::Normal => "normal",
            Variant::Abnormal => "abnormal",
            Variant::Tumor => "tumor",
            Variant::Immune => "immune",
            Variant::Tissue => "tissue",
            Variant::Cancer => "cancer",
        }
    }
}

/// An animated cell in the diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    #[serde(default)]
    pub id: Option<String>,
    pub variant: Variant,
    #[serde(default = "default_size")]
    pub size: f32,
    pub position: Point,
    #[serde(default = "default_speed")]
    pub speed: f32,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default = "default_true")]
    pub has_nucleus: bool,
    #[serde(default)]
    pub animation_delay: f32,
}

impl Particle {
    pub fn new(variant: Variant, position: impl Into<Point>) -> Self {
        Self {
            id: None,
            variant,
            size: DEFAULT_PARTICLE_SIZE,
            position: position.into(),
            speed: DEFAULT_SPEED,
            opacity: 1.0,
            has_nucleus: true,
            animation_delay: 0.0,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.animation_delay = delay;
        self
    }

    pub fn without_nucleus(mut self) -> Self {
        self.has_nucleus = false;
        self
    }
}

/// Where along a connector its label sits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelPosition {
    Start,
    #[default]
    Middle,
    End,
}

impl LabelPosition {
    /// Fraction of the connector length, measured from `start`.
    pub const fn fraction(self) -> f32 {
        match self {
            LabelPosition::Start => 0.2,
            LabelPosition::Middle => 0.5,
            LabelPosition::End => 0.8,
        }
    }
}

/// A directional arrow between two points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    #[serde(default)]
    pub id: Option<String>,
    pub start: Point,
    pub end: Point,
    #[serde(default = "default_connector_color")]
    pub color: String,
    #[serde(default)]
    pub dashed: bool,
    #[serde(default)]
    pub animation_delay: f32,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub label_position: LabelPosition,
}

impl Connector {
    pub fn new(start: impl Into<Point>, end: impl Into<Point>) -> Self {
        Self {
            id: None,
            start: start.into(),
            end: end.into(),
            color: DEFAULT_CONNECTOR_COLOR.to_string(),
            dashed: false,
            animation_delay: 0.0,
            label: None,
            label_position: LabelPosition::Middle,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn dashed(mut self) -> Self {
        self.dashed = true;
        self
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.animation_delay = delay;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>, position: LabelPosition) -> Self {
        self.label = Some(label.into());
        self.label_position = position;
        self
    }
}

fn default_size() -> f32 {
    DEFAULT_PARTICLE_SIZE
}
fn default_speed() -> f32 {
    DEFAULT_SPEED
}
fn default_opacity() -> f32 {
    1.0
}
fn default_true() -> bool {
    true
}
fn default_connector_color() -> String {
    DEFAULT_CONNECTOR_COLOR.to_string()
}

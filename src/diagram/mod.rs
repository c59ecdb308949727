mod connector;
mod geometry;
mod palette;
mod particle;
mod render;
mod scene;
mod timeline;
mod types;

pub use connector::{ConnectorFrame, ConnectorView};
pub use geometry::ConnectorGeometry;
pub use palette::{MotionProfile, Palette};
pub use particle::{ParticleFrame, ParticleView};
pub use render::{render_connector, render_particle, render_still, render_svg};
pub use scene::{Scene, SceneFrame};
pub use timeline::{Easing, Keyframe, Property, Repeat, Timeline};
pub use types::{Connector, LabelPosition, Particle, Point, Variant};

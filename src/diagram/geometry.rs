//! Connector geometry: angle, length, label anchor and arrowhead.

use super::types::{Connector, LabelPosition, Point};

/// Below this length a connector has no usable direction.
pub const MIN_CONNECTOR_LENGTH: f32 = 1e-3;
pub const ARROWHEAD_LENGTH: f32 = 10.0;
pub const ARROWHEAD_HALF_WIDTH: f32 = 5.0;

/// Derived layout for one connector. Pure function of its endpoints and
/// label position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectorGeometry {
    pub start: Point,
    /// Radians, `atan2(dy, dx)`; 0 when the connector is degenerate
    pub angle: f32,
    pub length: f32,
    pub label_anchor: Point,
    /// Zero-length or non-finite connectors get no arrowhead
    pub degenerate: bool,
    /// Non-finite endpoints; the renderer skips these entirely
    pub malformed: bool,
}

impl ConnectorGeometry {
    pub fn of(connector: &Connector) -> Self {
        Self::between(connector.start, connector.end, connector.label_position)
    }

    pub fn between(start: Point, end: Point, label_position: LabelPosition) -> Self {
        if !start.is_finite() || !end.is_finite() {
            let start = if start.is_finite() { start } else { Point::ORIGIN };
            return Self {
                start,
                angle: 0.0,
                length: 0.0,
                label_anchor: start,
                degenerate: true,
                malformed: true,
            };
        }

        let length = start.distance_to(end);
        let degenerate = length < MIN_CONNECTOR_LENGTH;
        let angle = if degenerate {
            0.0
        } else {
            (end.y - start.y).atan2(end.x - start.x)
        };
        let along = length * label_position.fraction();

        Self {
            start,
            angle,
            length,
            label_anchor: Point::new(
                start.x + along * angle.cos(),
                start.y + along * angle.sin(),
            ),
            degenerate,
            malformed: false,
        }
    }

    pub fn end(&self) -> Point {
        Point::new(
            self.start.x + self.length * self.angle.cos(),
            self.start.y + self.length * self.angle.sin(),
        )
    }

    pub fn angle_degrees(&self) -> f32 {
        self.angle.to_degrees()
    }

    /// Triangle with its tip on the end point and its base perpendicular to
    /// the segment. `None` for degenerate connectors.
    pub fn arrowhead(&self) -> Option<[Point; 3]> {
        if self.degenerate {
            return None;
        }
        let tip = self.end();
        let (sin, cos) = self.angle.sin_cos();
        let back = Point::new(
            tip.x - cos * ARROWHEAD_LENGTH,
            tip.y - sin * ARROWHEAD_LENGTH,
        );
        Some([
            tip,
            Point::new(
                back.x + sin * ARROWHEAD_HALF_WIDTH,
                back.y - cos * ARROWHEAD_HALF_WIDTH,
            ),
            Point::new(
                back.x - sin * ARROWHEAD_HALF_WIDTH,
                back.y + cos * ARROWHEAD_HALF_WIDTH,
            ),
        ])
    }
}

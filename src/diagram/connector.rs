use super::geometry::ConnectorGeometry;
use super::timeline::{Easing, Property, Timeline};
use super::types::{Connector, Point};

pub const STROKE_WIDTH: f32 = 2.0;
pub const LINE_GROW_DURATION: f32 = 0.8;
pub const ARROWHEAD_FADE_DURATION: f32 = 0.3;
pub const LABEL_FADE_DURATION: f32 = 0.5;
pub const LABEL_FADE_DELAY: f32 = 0.5;

/// A connector with its geometry resolved once at mount.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorView {
    connector: Connector,
    geometry: ConnectorGeometry,
}

/// Entrance state of one connector at a point in time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectorFrame {
    /// Fraction of the full length drawn so far
    pub extent: f32,
    pub arrowhead_opacity: f32,
    pub label_opacity: f32,
}

impl ConnectorView {
    pub fn mount(connector: &Connector) -> Self {
        let mut connector = connector.clone();
        if !connector.animation_delay.is_finite() || connector.animation_delay < 0.0 {
            connector.animation_delay = 0.0;
        }
        Self {
            geometry: ConnectorGeometry::of(&connector),
            connector,
        }
    }

    pub fn connector(&self) -> &Connector {
        &self.connector
    }

    pub fn geometry(&self) -> &ConnectorGeometry {
        &self.geometry
    }

    pub fn label(&self) -> Option<&str> {
        self.connector
            .label
            .as_deref()
            .filter(|label| !label.trim().is_empty())
    }

    /// Line scales along its own axis from nothing to full length.
    pub fn line_growth(&self) -> Timeline<Point> {
        Timeline::new(
            Property::Scale,
            vec![Point::new(0.0, 1.0), Point::new(1.0, 1.0)],
            LINE_GROW_DURATION,
        )
        .delayed(self.connector.animation_delay)
    }

    /// Starts once the line has finished growing.
    pub fn arrowhead_fade(&self) -> Timeline<f32> {
        Timeline::new(Property::Opacity, vec![0.0, 1.0], ARROWHEAD_FADE_DURATION)
            .delayed(self.connector.animation_delay + LINE_GROW_DURATION)
            .eased(Easing::Linear)
    }

    pub fn label_fade(&self) -> Timeline<f32> {
        Timeline::new(Property::Opacity, vec![0.0, 1.0], LABEL_FADE_DURATION)
            .delayed(self.connector.animation_delay + LABEL_FADE_DELAY)
            .eased(Easing::Linear)
    }

    /// Time at which line, arrowhead and label are all fully shown.
    pub fn entrance_end(&self) -> f32 {
        let delay = self.connector.animation_delay;
        (delay + LINE_GROW_DURATION + ARROWHEAD_FADE_DURATION)
            .max(delay + LABEL_FADE_DELAY + LABEL_FADE_DURATION)
    }

    pub fn sample(&self, t: f32) -> ConnectorFrame {
        ConnectorFrame {
            extent: self.line_growth().sample(t).map_or(1.0, |scale| scale.x),
            arrowhead_opacity: self.arrowhead_fade().sample(t).unwrap_or(1.0),
            label_opacity: self.label_fade().sample(t).unwrap_or(1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::types::LabelPosition;

    #[test]
    fn arrowhead_waits_for_line() {
        let view = ConnectorView::mount(&Connector::new((0.0, 0.0), (40.0, 0.0)).with_delay(1.0));
        assert_eq!(view.line_growth().delay, 1.0);
        assert!((view.arrowhead_fade().delay - 1.8).abs() < 1e-6);
        assert_eq!(view.label_fade().delay, 1.5);

        let before = view.sample(0.5);
        assert_eq!(before.extent, 0.0);
        assert_eq!(before.arrowhead_opacity, 0.0);

        let mid_line = view.sample(1.4);
        assert!(mid_line.extent > 0.0 && mid_line.extent < 1.0);
        assert_eq!(mid_line.arrowhead_opacity, 0.0);

        let done = view.sample(3.0);
        assert_eq!(done.extent, 1.0);
        assert_eq!(done.arrowhead_opacity, 1.0);
        assert_eq!(done.label_opacity, 1.0);
    }

    #[test]
    fn blank_labels_are_ignored() {
        let view = ConnectorView::mount(
            &Connector::new((0.0, 0.0), (1.0, 1.0))
                .with_label("  ", LabelPosition::Start),
        );
        assert!(view.label().is_none());
    }

    #[test]
    fn negative_delay_is_cleared() {
        let view = ConnectorView::mount(&Connector::new((0.0, 0.0), (1.0, 1.0)).with_delay(-2.0));
        assert_eq!(view.connector().animation_delay, 0.0);
    }
}

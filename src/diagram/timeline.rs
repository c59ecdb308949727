//! Declarative animation timelines.
//!
//! A [`Timeline`] is plain data: evenly spaced keyframes plus duration, delay,
//! repeat and easing. The SVG user agent runs the clock (the timeline is
//! emitted as a SMIL element); [`Timeline::sample`] evaluates the same curve
//! for still-frame export and tests.

use super::types::Point;
use crate::svg::{num, secs};

/// Value that can be interpolated between keyframes.
pub trait Keyframe: Copy {
    fn lerp(from: Self, to: Self, t: f32) -> Self;
    /// SMIL `values` entry
    fn smil(&self) -> String;
}

impl Keyframe for f32 {
    fn lerp(from: Self, to: Self, t: f32) -> Self {
        from + (to - from) * t
    }

    fn smil(&self) -> String {
        num(*self)
    }
}

impl Keyframe for Point {
    fn lerp(from: Self, to: Self, t: f32) -> Self {
        Point::new(
            <f32 as Keyframe>::lerp(from.x, to.x, t),
            <f32 as Keyframe>::lerp(from.y, to.y, t),
        )
    }

    fn smil(&self) -> String {
        format!("{} {}", num(self.x), num(self.y))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    /// Play once and hold the last keyframe
    Once,
    Forever,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    /// CSS `ease-in-out`, cubic-bezier(0.42, 0, 0.58, 1), applied per segment
    EaseInOut,
}

const EASE_IN_OUT: (f32, f32, f32, f32) = (0.42, 0.0, 0.58, 1.0);

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseInOut => {
                let (x1, y1, x2, y2) = EASE_IN_OUT;
                cubic_bezier(x1, y1, x2, y2, t)
            }
        }
    }
}

fn bezier_axis(p1: f32, p2: f32, s: f32) -> f32 {
    let inv = 1.0 - s;
    3.0 * inv * inv * s * p1 + 3.0 * inv * s * s * p2 + s * s * s
}

fn bezier_axis_slope(p1: f32, p2: f32, s: f32) -> f32 {
    let inv = 1.0 - s;
    3.0 * inv * inv * p1 + 6.0 * inv * s * (p2 - p1) + 3.0 * s * s * (1.0 - p2)
}

/// Solves x(s) = x for the curve parameter, then returns y(s).
fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, x: f32) -> f32 {
    let mut s = x;
    for _ in 0..8 {
        let err = bezier_axis(x1, x2, s) - x;
        if err.abs() < 1e-5 {
            break;
        }
        let slope = bezier_axis_slope(x1, x2, s);
        if slope.abs() < 1e-6 {
            break;
        }
        s = (s - err / slope).clamp(0.0, 1.0);
    }
    bezier_axis(y1, y2, s)
}

/// What a timeline drives on its target element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    Opacity,
    Scale,
    Translate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Timeline<V: Keyframe> {
    pub property: Property,
    pub keyframes: Vec<V>,
    /// Seconds per cycle
    pub duration: f32,
    /// Seconds before the first cycle starts
    pub delay: f32,
    pub repeat: Repeat,
    pub easing: Easing,
}

impl<V: Keyframe> Timeline<V> {
    pub fn new(property: Property, keyframes: Vec<V>, duration: f32) -> Self {
        Self {
            property,
            keyframes,
            duration,
            delay: 0.0,
            repeat: Repeat::Once,
            easing: Easing::EaseInOut,
        }
    }

    pub fn delayed(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    pub fn forever(mut self) -> Self {
        self.repeat = Repeat::Forever;
        self
    }

    pub fn eased(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Value the target holds before the timeline starts.
    pub fn initial(&self) -> Option<V> {
        self.keyframes.first().copied()
    }

    /// Evaluates the timeline at `t` seconds after mount.
    pub fn sample(&self, t: f32) -> Option<V> {
        let first = *self.keyframes.first()?;
        let last = *self.keyframes.last()?;
        let local = t - self.delay;
        if !local.is_finite() || local <= 0.0 {
            return Some(first);
        }
        if self.duration <= 0.0 || self.keyframes.len() == 1 {
            return Some(last);
        }

        let progress = match self.repeat {
            Repeat::Once if local >= self.duration => return Some(last),
            Repeat::Once => local / self.duration,
            Repeat::Forever => (local % self.duration) / self.duration,
        };

        let segments = (self.keyframes.len() - 1) as f32;
        let scaled = progress * segments;
        let index = (scaled.floor() as usize).min(self.keyframes.len() - 2);
        let within = self.easing.apply(scaled - index as f32);
        Some(V::lerp(
            self.keyframes[index],
            self.keyframes[index + 1],
            within,
        ))
    }

    /// Emits the timeline as a SMIL animation element for its parent.
    pub fn to_smil(&self) -> String {
        if self.keyframes.is_empty() {
            return String::new();
        }

        let values = self
            .keyframes
            .iter()
            .map(Keyframe::smil)
            .collect::<Vec<_>>()
            .join(";");
        let segments = self.keyframes.len().saturating_sub(1).max(1);
        let key_times = (0..=segments)
            .map(|i| num(i as f32 / segments as f32))
            .collect::<Vec<_>>()
            .join(";");

        let timing = match self.repeat {
            Repeat::Forever => r#"repeatCount="indefinite""#,
            Repeat::Once => r#"fill="freeze""#,
        };
        let easing = match self.easing {
            Easing::Linear => String::new(),
            Easing::EaseInOut => {
                let (x1, y1, x2, y2) = EASE_IN_OUT;
                let spline = format!("{} {} {} {}", num(x1), num(y1), num(x2), num(y2));
                format!(
                    r#" calcMode="spline" keySplines="{}""#,
                    vec![spline; segments].join(";")
                )
            }
        };
        // A single keyframe still needs two entries for keyTimes to line up.
        let values = if self.keyframes.len() == 1 {
            format!("{values};{values}")
        } else {
            values
        };
        let duration = secs(self.duration.max(0.001));
        let begin = secs(self.delay.max(0.0));

        match self.property {
            Property::Opacity => format!(
                r#"<animate attributeName="opacity" values="{values}" keyTimes="{key_times}" dur="{duration}" begin="{begin}" {timing}{easing} />"#
            ),
            Property::Scale | Property::Translate => {
                let kind = if self.property == Property::Scale {
                    "scale"
                } else {
                    "translate"
                };
                format!(
                    r#"<animateTransform attributeName="transform" type="{kind}" values="{values}" keyTimes="{key_times}" dur="{duration}" begin="{begin}" {timing}{easing} />"#
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pulse() -> Timeline<f32> {
        Timeline::new(Property::Scale, vec![1.0, 1.2, 1.0], 2.0)
            .delayed(1.0)
            .forever()
            .eased(Easing::Linear)
    }

    #[test]
    fn sample_before_delay_holds_first_keyframe() {
        assert_eq!(pulse().sample(0.0), Some(1.0));
        assert_eq!(pulse().sample(0.99), Some(1.0));
    }

    #[test]
    fn sample_hits_midpoint_keyframe() {
        let value = pulse().sample(2.0).unwrap();
        assert!((value - 1.2).abs() < 1e-5);
    }

    #[test]
    fn forever_wraps_around() {
        let a = pulse().sample(1.5).unwrap();
        let b = pulse().sample(3.5).unwrap();
        assert!((a - b).abs() < 1e-5);
        assert!((a - 1.1).abs() < 1e-5);
    }

    #[test]
    fn once_holds_last_keyframe() {
        let grow = Timeline::new(Property::Opacity, vec![0.0_f32, 1.0], 0.3).delayed(0.8);
        assert_eq!(grow.sample(0.5), Some(0.0));
        assert_eq!(grow.sample(1.5), Some(1.0));
        assert_eq!(grow.sample(100.0), Some(1.0));
    }

    #[test]
    fn ease_in_out_is_symmetric_and_pinned() {
        assert_eq!(Easing::EaseInOut.apply(0.0), 0.0);
        assert!((Easing::EaseInOut.apply(1.0) - 1.0).abs() < 1e-4);
        assert!((Easing::EaseInOut.apply(0.5) - 0.5).abs() < 1e-3);
        assert!(Easing::EaseInOut.apply(0.25) < 0.25);
    }

    #[test]
    fn smil_for_looping_scale() {
        let smil = pulse().to_smil();
        assert!(smil.starts_with("<animateTransform"));
        assert!(smil.contains(r#"type="scale""#));
        assert!(smil.contains(r#"values="1;1.2;1""#));
        assert!(smil.contains(r#"keyTimes="0;0.5;1""#));
        assert!(smil.contains(r#"dur="2s""#));
        assert!(smil.contains(r#"begin="1s""#));
        assert!(smil.contains(r#"repeatCount="indefinite""#));
        assert!(!smil.contains("keySplines"));
    }

    #[test]
    fn smil_for_one_shot_fade() {
        let smil = Timeline::new(Property::Opacity, vec![0.0_f32, 1.0], 0.5)
            .delayed(0.5)
            .to_smil();
        assert!(smil.starts_with(r#"<animate attributeName="opacity""#));
        assert!(smil.contains(r#"fill="freeze""#));
        assert!(smil.contains(r#"keySplines="0.42 0 0.58 1""#));
    }

    #[test]
    fn point_keyframes_format_as_pairs() {
        let drift = Timeline::new(
            Property::Translate,
            vec![Point::ORIGIN, Point::new(10.0, 5.0), Point::ORIGIN],
            2.5,
        );
        assert!(drift.to_smil().contains(r#"values="0 0;10 5;0 0""#));
    }
}

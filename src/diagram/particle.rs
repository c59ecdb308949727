//! Mounted cells: sanitized parameters, the one-time rotation, hover state
//! and the animation timelines derived from the variant tables.

use rand::Rng;

use super::palette::{
    MotionProfile, NUCLEUS_DELAY, NUCLEUS_PERIOD, NUCLEUS_PULSE_SCALE, NUCLEUS_RATIO, Palette,
    PULSE_PERIOD,
};
use super::timeline::{Property, Timeline};
use super::types::{DEFAULT_PARTICLE_SIZE, DEFAULT_SPEED, Particle, Point, Variant};

pub const HOVER_SCALE: f32 = 1.3;
/// Glow radius as a fraction of the cell diameter when not hovered.
pub const GLOW_RATIO: f32 = 0.25;

/// A particle after mount. Owns a sanitized copy of the caller's descriptor;
/// the descriptor itself is never modified.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleView {
    particle: Particle,
    rotation: f32,
    hovered: bool,
}

/// Pulse and drift state of one particle at a point in time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleFrame {
    pub center: Point,
    /// Body pulse alone
    pub body_scale: f32,
    /// Body pulse times the hover scale
    pub scale: f32,
    pub opacity: f32,
    pub nucleus_scale: f32,
}

impl ParticleView {
    /// Draws the rotation once; it never changes for the life of the view.
    pub fn mount<R: Rng>(particle: &Particle, rng: &mut R) -> Self {
        Self {
            particle: sanitize(particle),
            rotation: rng.gen_range(0.0..360.0),
            hovered: false,
        }
    }

    pub fn particle(&self) -> &Particle {
        &self.particle
    }

    pub fn variant(&self) -> Variant {
        self.particle.variant
    }

    pub fn palette(&self) -> Palette {
        self.particle.variant.palette()
    }

    pub fn motion(&self) -> MotionProfile {
        self.particle.variant.motion()
    }

    /// Degrees in [0, 360)
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn radius(&self) -> f32 {
        self.particle.size / 2.0
    }

    pub fn nucleus_radius(&self) -> f32 {
        self.particle.size * NUCLEUS_RATIO / 2.0
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn hover_start(&mut self) {
        self.hovered = true;
    }

    pub fn hover_end(&mut self) {
        self.hovered = false;
    }

    /// Scale applied on top of the pulse animation.
    pub fn rendered_scale(&self) -> f32 {
        if self.hovered { HOVER_SCALE } else { 1.0 }
    }

    pub fn base_glow_radius(&self) -> f32 {
        self.particle.size * GLOW_RATIO
    }

    pub fn glow_radius(&self) -> f32 {
        if self.hovered {
            self.base_glow_radius() * 2.0
        } else {
            self.base_glow_radius()
        }
    }

    pub fn pulse_period(&self) -> f32 {
        PULSE_PERIOD * self.particle.speed
    }

    pub fn pulse_scale(&self) -> Timeline<f32> {
        let peak = self.motion().pulse_scale;
        Timeline::new(Property::Scale, vec![1.0, peak, 1.0], self.pulse_period())
            .delayed(self.particle.animation_delay)
            .forever()
    }

    pub fn pulse_opacity(&self) -> Timeline<f32> {
        let base = self.particle.opacity;
        let dimmed = base * self.motion().opacity_decay;
        Timeline::new(Property::Opacity, vec![base, dimmed, base], self.pulse_period())
            .delayed(self.particle.animation_delay)
            .forever()
    }

    pub fn drift(&self) -> Timeline<Point> {
        Timeline::new(
            Property::Translate,
            vec![Point::ORIGIN, self.motion().drift, Point::ORIGIN],
            self.pulse_period(),
        )
        .delayed(self.particle.animation_delay)
        .forever()
    }

    pub fn nucleus_pulse(&self) -> Timeline<f32> {
        Timeline::new(
            Property::Scale,
            vec![1.0, NUCLEUS_PULSE_SCALE, 1.0],
            NUCLEUS_PERIOD * self.particle.speed,
        )
        .delayed(self.particle.animation_delay + NUCLEUS_DELAY)
        .forever()
    }

    pub fn sample(&self, t: f32) -> ParticleFrame {
        let base = self.particle.position;
        let offset = self.drift().sample(t).unwrap_or(Point::ORIGIN);
        let body_scale = self.pulse_scale().sample(t).unwrap_or(1.0);
        ParticleFrame {
            center: Point::new(base.x + offset.x, base.y + offset.y),
            body_scale,
            scale: body_scale * self.rendered_scale(),
            opacity: self
                .pulse_opacity()
                .sample(t)
                .unwrap_or(self.particle.opacity),
            nucleus_scale: if self.particle.has_nucleus {
                self.nucleus_pulse().sample(t).unwrap_or(1.0)
            } else {
                0.0
            },
        }
    }
}

fn sanitize(particle: &Particle) -> Particle {
    let mut clean = particle.clone();
    if !clean.size.is_finite() || clean.size <= 0.0 {
        tracing::warn!(size = particle.size, "invalid cell size, using default");
        clean.size = DEFAULT_PARTICLE_SIZE;
    }
    if !clean.speed.is_finite() || clean.speed <= 0.0 {
        tracing::warn!(speed = particle.speed, "invalid cell speed, using default");
        clean.speed = DEFAULT_SPEED;
    }
    clean.opacity = if clean.opacity.is_finite() {
        clean.opacity.clamp(0.0, 1.0)
    } else {
        1.0
    };
    if !clean.animation_delay.is_finite() || clean.animation_delay < 0.0 {
        clean.animation_delay = 0.0;
    }
    clean
}

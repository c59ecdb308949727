//! A mounted diagram: the particle and connector views for one surface.

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::connector::{ConnectorFrame, ConnectorView};
use super::particle::{ParticleFrame, ParticleView};
use super::types::{Connector, Particle};

#[derive(Debug, Clone)]
pub struct Scene {
    width: f32,
    height: f32,
    particles: Vec<ParticleView>,
    connectors: Vec<ConnectorView>,
    mounted: bool,
}

/// Everything in the scene sampled at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct SceneFrame {
    pub time: f32,
    pub particles: Vec<ParticleFrame>,
    pub connectors: Vec<ConnectorFrame>,
}

impl Scene {
    /// Mounts a scene. Each particle's rotation is drawn here, from `seed`
    /// when given so output is reproducible.
    pub fn mount(
        width: f32,
        height: f32,
        particles: &[Particle],
        connectors: &[Connector],
        seed: Option<u64>,
    ) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let particles: Vec<ParticleView> = particles
            .iter()
            .filter(|particle| {
                let finite = particle.position.is_finite();
                if !finite {
                    tracing::warn!(
                        id = particle.id.as_deref().unwrap_or(""),
                        variant = particle.variant.name(),
                        "skipping cell with non-finite position"
                    );
                }
                finite
            })
            .map(|particle| ParticleView::mount(particle, &mut rng))
            .collect();

        let connectors: Vec<ConnectorView> = connectors
            .iter()
            .map(ConnectorView::mount)
            .filter(|view| {
                if view.geometry().malformed {
                    tracing::warn!(
                        id = view.connector().id.as_deref().unwrap_or(""),
                        "skipping connector with non-finite endpoints"
                    );
                }
                !view.geometry().malformed
            })
            .collect();

        tracing::debug!(
            cells = particles.len(),
            connectors = connectors.len(),
            "scene mounted"
        );

        Self {
            width,
            height,
            particles,
            connectors,
            mounted: true,
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn particles(&self) -> &[ParticleView] {
        &self.particles
    }

    pub fn connectors(&self) -> &[ConnectorView] {
        &self.connectors
    }

    /// Index of the particle with the given caller id.
    pub fn find(&self, id: &str) -> Option<usize> {
        self.particles
            .iter()
            .position(|view| view.particle().id.as_deref() == Some(id))
    }

    pub fn hover_start(&mut self, index: usize) -> bool {
        match self.particles.get_mut(index) {
            Some(view) => {
                view.hover_start();
                true
            }
            None => false,
        }
    }

    pub fn hover_end(&mut self, index: usize) -> bool {
        match self.particles.get_mut(index) {
            Some(view) => {
                view.hover_end();
                true
            }
            None => false,
        }
    }

    /// Paint order, back to front. Hovered cells go last so they sit above
    /// everything else; the rest keep declaration order.
    pub fn stacking_order(&self) -> Vec<usize> {
        let (hovered, resting): (Vec<usize>, Vec<usize>) =
            (0..self.particles.len()).partition(|&i| self.particles[i].is_hovered());
        resting.into_iter().chain(hovered).collect()
    }

    /// Seconds until every connector has finished its entrance. Still frames
    /// default to this instant so arrows are fully drawn.
    pub fn settle_time(&self) -> f32 {
        self.connectors
            .iter()
            .map(ConnectorView::entrance_end)
            .fold(0.0, f32::max)
    }

    /// Evaluates every animation at `t` seconds after mount. `None` once the
    /// scene has been unmounted.
    pub fn sample(&self, t: f32) -> Option<SceneFrame> {
        if !self.mounted {
            return None;
        }
        Some(SceneFrame {
            time: t,
            particles: self.particles.iter().map(|view| view.sample(t)).collect(),
            connectors: self.connectors.iter().map(|view| view.sample(t)).collect(),
        })
    }

    /// Drops every view. Safe to call any number of times.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.particles.clear();
        self.connectors.clear();
        self.mounted = false;
        tracing::debug!("scene unmounted");
    }
}

//! A headless page: stacked regions under a scrolling viewport. Reports
//! visibility crossings the way a browser intersection observer does, which
//! makes the tracker usable and testable outside a browser.

use std::collections::BTreeMap;

use super::host::{ObservationId, ScrollAlign, ScrollBehavior, ViewportHost};
use super::types::IntersectionEntry;

#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub id: String,
    /// Offset of the region's top from the page top
    pub top: f32,
    pub height: f32,
}

#[derive(Debug, Clone)]
struct Watch {
    section_id: String,
    threshold: f32,
    intersecting: bool,
}

/// Steps a smooth scroll takes unless set with [`SimulatedPage::with_scroll_steps`].
pub const DEFAULT_SCROLL_STEPS: usize = 6;

#[derive(Debug, Clone, Copy)]
struct SmoothScroll {
    from: f32,
    to: f32,
    step: usize,
}

#[derive(Debug, Clone)]
pub struct SimulatedPage {
    regions: Vec<Region>,
    viewport_height: f32,
    scroll_y: f32,
    watches: BTreeMap<ObservationId, Watch>,
    next_observation: u64,
    queued: Vec<IntersectionEntry>,
    smooth: Option<SmoothScroll>,
    scroll_steps: usize,
    scroll_requests: Vec<String>,
}

impl SimulatedPage {
    pub fn new(viewport_height: f32) -> Self {
        Self {
            regions: Vec::new(),
            viewport_height: viewport_height.max(1.0),
            scroll_y: 0.0,
            watches: BTreeMap::new(),
            next_observation: 1,
            queued: Vec::new(),
            smooth: None,
            scroll_steps: DEFAULT_SCROLL_STEPS,
            scroll_requests: Vec::new(),
        }
    }

    /// Appends a region below the last one.
    pub fn with_region(mut self, id: impl Into<String>, height: f32) -> Self {
        let top = self.page_height();
        self.regions.push(Region {
            id: id.into(),
            top,
            height: height.max(0.0),
        });
        self
    }

    pub fn with_scroll_steps(mut self, steps: usize) -> Self {
        self.scroll_steps = steps.max(1);
        self
    }

    pub fn page_height(&self) -> f32 {
        self.regions
            .iter()
            .map(|region| region.top + region.height)
            .fold(0.0, f32::max)
    }

    pub fn max_scroll(&self) -> f32 {
        (self.page_height() - self.viewport_height).max(0.0)
    }

    pub fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    /// Number of live observations.
    pub fn observation_count(&self) -> usize {
        self.watches.len()
    }

    /// Sections passed to `scroll_into_view`, oldest first.
    pub fn scroll_requests(&self) -> &[String] {
        &self.scroll_requests
    }

    /// Where the running smooth scroll will stop.
    pub fn scroll_target(&self) -> Option<f32> {
        self.smooth.map(|smooth| smooth.to)
    }

    fn region(&self, section_id: &str) -> Option<&Region> {
        self.regions.iter().find(|region| region.id == section_id)
    }

    fn visible_ratio(&self, region: &Region) -> f32 {
        if region.height <= 0.0 {
            return 0.0;
        }
        let view_top = self.scroll_y;
        let view_bottom = self.scroll_y + self.viewport_height;
        let overlap = (region.top + region.height).min(view_bottom) - region.top.max(view_top);
        (overlap.max(0.0) / region.height).min(1.0)
    }

    fn entry_for(&self, section_id: &str, intersecting: bool) -> Option<IntersectionEntry> {
        let region = self.region(section_id)?;
        Some(IntersectionEntry {
            section_id: section_id.to_string(),
            ratio: self.visible_ratio(region),
            is_intersecting: intersecting,
            bounding_top: region.top - self.scroll_y,
        })
    }

    /// Re-evaluates every watch and queues entries for those whose threshold
    /// state flipped.
    fn refresh(&mut self) {
        let mut changed = Vec::new();
        for (id, watch) in &self.watches {
            let Some(region) = self.region(&watch.section_id) else {
                continue;
            };
            let intersecting = self.visible_ratio(region) >= watch.threshold;
            if intersecting != watch.intersecting {
                changed.push((*id, intersecting));
            }
        }
        for (id, intersecting) in changed {
            if let Some(watch) = self.watches.get_mut(&id) {
                watch.intersecting = intersecting;
                let section_id = watch.section_id.clone();
                if let Some(entry) = self.entry_for(&section_id, intersecting) {
                    self.queued.push(entry);
                }
            }
        }
    }

    /// Jumps the viewport and returns the resulting batch. A user scroll
    /// cancels any smooth scroll still running.
    pub fn scroll_to(&mut self, y: f32) -> Vec<IntersectionEntry> {
        self.smooth = None;
        self.jump(y)
    }

    fn jump(&mut self, y: f32) -> Vec<IntersectionEntry> {
        self.scroll_y = y.clamp(0.0, self.max_scroll());
        self.refresh();
        self.take_batch()
    }

    /// Moves a running smooth scroll one step and returns the batch that
    /// step produced. `None` when no smooth scroll is running. The last step
    /// ends the scroll before its batch is returned, so whoever handles that
    /// batch sees the page at rest.
    pub fn scroll_step(&mut self) -> Option<Vec<IntersectionEntry>> {
        let mut smooth = self.smooth.take()?;
        smooth.step += 1;
        let y = if smooth.step >= self.scroll_steps {
            smooth.to
        } else {
            smooth.from + (smooth.to - smooth.from) * smooth.step as f32 / self.scroll_steps as f32
        };
        if smooth.step < self.scroll_steps {
            self.smooth = Some(smooth);
        }
        Some(self.jump(y))
    }

    /// Entries queued since the last call, in observation order.
    pub fn take_batch(&mut self) -> Vec<IntersectionEntry> {
        std::mem::take(&mut self.queued)
    }
}

impl ViewportHost for SimulatedPage {
    fn observe(&mut self, section_id: &str, threshold: f32) -> Option<ObservationId> {
        let region = self.region(section_id)?;
        let intersecting = self.visible_ratio(region) >= threshold;

        let id = ObservationId(self.next_observation);
        self.next_observation += 1;
        self.watches.insert(
            id,
            Watch {
                section_id: section_id.to_string(),
                threshold,
                intersecting,
            },
        );
        // Observers report the initial state once, like browsers do.
        if let Some(entry) = self.entry_for(section_id, intersecting) {
            self.queued.push(entry);
        }
        Some(id)
    }

    fn unobserve(&mut self, observation: ObservationId) {
        self.watches.remove(&observation);
        if self.watches.is_empty() {
            self.queued.clear();
        }
    }

    fn scroll_into_view(
        &mut self,
        section_id: &str,
        behavior: ScrollBehavior,
        align: ScrollAlign,
    ) -> bool {
        let Some(region) = self.region(section_id) else {
            return false;
        };
        let target = match align {
            ScrollAlign::Top => region.top.clamp(0.0, self.max_scroll()),
        };
        self.scroll_requests.push(section_id.to_string());
        match behavior {
            ScrollBehavior::Smooth => {
                self.smooth = Some(SmoothScroll {
                    from: self.scroll_y,
                    to: target,
                    step: 0,
                })
            }
            ScrollBehavior::Instant => {
                self.smooth = None;
                self.scroll_y = target;
                self.refresh();
            }
        }
        true
    }

    fn is_scrolling(&self) -> bool {
        self.smooth.is_some()
    }
}

use super::host::{ObservationId, ScrollAlign, ScrollBehavior, ViewportHost};
use super::types::{IntersectionEntry, NavClick, NavItem, SectionDescriptor};

/// Minimum visible fraction of a region's height for it to count as
/// intersecting.
pub const VISIBILITY_THRESHOLD: f32 = 0.2;

/// Keeps one active section id in step with what the viewport shows.
///
/// Observations are acquired in [`SectionTracker::mount`] and released in
/// [`SectionTracker::unmount`], or on drop if unmount was never called.
pub struct SectionTracker<H: ViewportHost> {
    host: H,
    sections: Vec<SectionDescriptor>,
    /// (index into `sections`, observation), in registration order
    observations: Vec<(usize, ObservationId)>,
    /// Last reported threshold state per observation, same order
    visible: Vec<bool>,
    default_id: String,
    active_id: String,
    /// Section a click-initiated smooth scroll is heading to
    scroll_target: Option<String>,
    mounted: bool,
}

impl<H: ViewportHost> SectionTracker<H> {
    pub fn mount(
        mut host: H,
        sections: impl IntoIterator<Item = SectionDescriptor>,
        default_id: impl Into<String>,
    ) -> Self {
        let mut unique: Vec<SectionDescriptor> = Vec::new();
        for section in sections {
            if unique.iter().any(|s| s.id == section.id) {
                tracing::warn!(section = %section.id, "duplicate section id ignored");
                continue;
            }
            unique.push(section);
        }

        let mut default_id = default_id.into();
        if !unique.is_empty() && !unique.iter().any(|s| s.id == default_id) {
            tracing::warn!(
                default = %default_id,
                "default section is not registered, using the first section"
            );
            default_id = unique[0].id.clone();
        }

        let mut observations = Vec::with_capacity(unique.len());
        for (index, section) in unique.iter().enumerate() {
            match host.observe(&section.id, VISIBILITY_THRESHOLD) {
                Some(observation) => observations.push((index, observation)),
                None => {
                    tracing::debug!(section = %section.id, "section region not found, not observing");
                }
            }
        }

        tracing::debug!(
            sections = unique.len(),
            observed = observations.len(),
            "section tracker mounted"
        );

        Self {
            host,
            sections: unique,
            visible: vec![false; observations.len()],
            observations,
            active_id: default_id.clone(),
            default_id,
            scroll_target: None,
            mounted: true,
        }
    }

    pub fn active_section_id(&self) -> &str {
        &self.active_id
    }

    pub fn sections(&self) -> &[SectionDescriptor] {
        &self.sections
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn observation_count(&self) -> usize {
        self.observations.len()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Navigation entries in registration order with the active one flagged.
    pub fn nav_items(&self) -> Vec<NavItem<'_>> {
        self.sections
            .iter()
            .map(|section| NavItem {
                id: &section.id,
                title: &section.title,
                icon: &section.icon,
                active: section.id == self.active_id,
            })
            .collect()
    }

    /// Registration position of an observed section.
    fn observed_rank(&self, section_id: &str) -> Option<usize> {
        self.observations
            .iter()
            .position(|(index, _)| self.sections[*index].id == section_id)
    }

    /// Applies one batch of visibility reports. Returns whether the active
    /// section changed.
    ///
    /// Among entries at or above the threshold the topmost region wins;
    /// equal tops go to the earlier registered section. While a selected
    /// section is still being scrolled to, only that section may become
    /// active, so sections passed on the way do not flash. Once the host
    /// reports the scroll has stopped without the target arriving, ordinary
    /// tracking resumes from what is currently visible.
    pub fn handle_intersections(&mut self, batch: &[IntersectionEntry]) -> bool {
        if !self.mounted {
            return false;
        }

        let mut candidates: Vec<(&IntersectionEntry, usize)> = Vec::new();
        for entry in batch {
            let Some(rank) = self.observed_rank(&entry.section_id) else {
                continue;
            };
            let qualifies = crosses_threshold(entry);
            self.visible[rank] = qualifies;
            if qualifies {
                candidates.push((entry, rank));
            }
        }

        let mut released = false;
        if let Some(target) = self.scroll_target.as_deref() {
            if let Some((entry, _)) = candidates.iter().find(|(e, _)| e.section_id == target) {
                let next = entry.section_id.clone();
                self.scroll_target = None;
                return self.activate(next);
            }
            if self.host.is_scrolling() {
                return false;
            }
            tracing::debug!(section = %target, "scroll stopped short of its target");
            self.scroll_target = None;
            released = true;
        }

        let winner = candidates
            .iter()
            .min_by(|(a, a_rank), (b, b_rank)| {
                a.bounding_top
                    .total_cmp(&b.bounding_top)
                    .then(a_rank.cmp(b_rank))
            })
            .map(|(entry, _)| entry.section_id.clone());

        // Entries held back while the scroll ran were still recorded, so a
        // section that became visible then is picked up here.
        let winner = match winner {
            Some(id) => Some(id),
            None if released => self
                .visible
                .iter()
                .position(|&visible| visible)
                .map(|rank| self.sections[self.observations[rank].0].id.clone()),
            None => None,
        };

        match winner {
            Some(next) => self.activate(next),
            None => false,
        }
    }

    fn activate(&mut self, next: String) -> bool {
        if next == self.active_id {
            return false;
        }
        tracing::trace!(from = %self.active_id, to = %next, "active section changed");
        self.active_id = next;
        true
    }

    /// Handles a click on the navigation entry for `section_id`. The click's
    /// default navigation is always prevented. The active section is not
    /// changed here; it follows once the region scrolls into view. A section
    /// that is already visible will not be reported again, so no pending
    /// target is kept for it.
    pub fn select(&mut self, section_id: &str, click: &mut NavClick) -> bool {
        click.prevent_default();
        if !self.mounted {
            return false;
        }
        if !self.sections.iter().any(|s| s.id == section_id) {
            tracing::debug!(section = %section_id, "select for unknown section ignored");
            return false;
        }

        let scrolled =
            self.host
                .scroll_into_view(section_id, ScrollBehavior::Smooth, ScrollAlign::Top);
        let already_visible = self
            .observed_rank(section_id)
            .is_some_and(|rank| self.visible[rank]);
        if scrolled && already_visible {
            self.scroll_target = None;
        } else if scrolled {
            self.scroll_target = Some(section_id.to_string());
        } else {
            tracing::debug!(section = %section_id, "section region not found, nothing to scroll");
        }
        scrolled
    }

    /// Host signal that a smooth scroll has come to rest. Clears any pending
    /// target so ordinary tracking resumes even if the target never crossed
    /// the threshold (a short last section, for example).
    pub fn scroll_settled(&mut self) {
        self.scroll_target = None;
    }

    /// Releases every observation and resets to the default section. Calling
    /// it again does nothing.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        for (_, observation) in self.observations.drain(..) {
            self.host.unobserve(observation);
        }
        self.visible.clear();
        self.active_id = self.default_id.clone();
        self.scroll_target = None;
        self.mounted = false;
        tracing::debug!("section tracker unmounted");
    }
}

fn crosses_threshold(entry: &IntersectionEntry) -> bool {
    entry.is_intersecting && entry.ratio.is_finite() && entry.ratio >= VISIBILITY_THRESHOLD
}

impl<H: ViewportHost> Drop for SectionTracker<H> {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::tracker::simulated::SimulatedPage;

    fn sections() -> Vec<SectionDescriptor> {
        vec![
            SectionDescriptor::new("a", "Overview", "home"),
            SectionDescriptor::new("b", "Model", "function"),
            SectionDescriptor::new("c", "Results", "chart"),
        ]
    }

    fn page() -> SimulatedPage {
        SimulatedPage::new(500.0)
            .with_region("a", 600.0)
            .with_region("b", 600.0)
            .with_region("c", 600.0)
    }

    #[test]
    fn starts_on_default() {
        let tracker = SectionTracker::mount(page(), sections(), "a");
        assert_eq!(tracker.active_section_id(), "a");
        assert_eq!(tracker.observation_count(), 3);
        assert_eq!(tracker.host().observation_count(), 3);
    }

    #[test]
    fn intersection_at_threshold_activates() {
        let mut tracker = SectionTracker::mount(page(), sections(), "a");
        assert!(tracker.handle_intersections(&[IntersectionEntry::new("b", 0.2, 100.0)]));
        assert_eq!(tracker.active_section_id(), "b");
    }

    #[test]
    fn intersection_below_threshold_is_ignored() {
        let mut tracker = SectionTracker::mount(page(), sections(), "a");
        assert!(!tracker.handle_intersections(&[IntersectionEntry::new("b", 0.19, 100.0)]));
        assert_eq!(tracker.active_section_id(), "a");
    }

    #[test]
    fn leaving_entries_do_not_activate() {
        let mut tracker = SectionTracker::mount(page(), sections(), "a");
        let mut leaving = IntersectionEntry::new("c", 0.5, 10.0);
        leaving.is_intersecting = false;
        assert!(!tracker.handle_intersections(&[leaving]));
        assert_eq!(tracker.active_section_id(), "a");
    }

    #[test]
    fn topmost_wins_a_tied_batch() {
        let mut tracker = SectionTracker::mount(page(), sections(), "a");
        tracker.handle_intersections(&[
            IntersectionEntry::new("c", 0.9, 300.0),
            IntersectionEntry::new("b", 0.3, -200.0),
        ]);
        assert_eq!(tracker.active_section_id(), "b");

        tracker.handle_intersections(&[
            IntersectionEntry::new("c", 0.5, 0.0),
            IntersectionEntry::new("a", 0.5, 0.0),
        ]);
        assert_eq!(tracker.active_section_id(), "a");
    }

    #[test]
    fn unknown_sections_in_batch_are_ignored() {
        let mut tracker = SectionTracker::mount(page(), sections(), "a");
        assert!(!tracker.handle_intersections(&[IntersectionEntry::new("zzz", 1.0, 0.0)]));
        assert_eq!(tracker.active_section_id(), "a");
    }

    #[test]
    fn select_prevents_default_and_scrolls_to_target() {
        let mut tracker = SectionTracker::mount(page(), sections(), "a");
        let mut click = NavClick::new();
        assert!(tracker.select("c", &mut click));
        assert!(click.is_default_prevented());
        assert_eq!(tracker.host().scroll_requests(), ["c".to_string()]);
        assert_eq!(tracker.active_section_id(), "a");
    }

    #[test]
    fn select_unknown_still_prevents_default() {
        let mut tracker = SectionTracker::mount(page(), sections(), "a");
        let mut click = NavClick::new();
        assert!(!tracker.select("nowhere", &mut click));
        assert!(click.is_default_prevented());
        assert!(tracker.host().scroll_requests().is_empty());
    }

    #[test]
    fn smooth_scroll_does_not_flash_passed_sections() {
        let mut tracker = SectionTracker::mount(page(), sections(), "a");
        tracker.host_mut().take_batch();

        let mut click = NavClick::new();
        tracker.select("c", &mut click);

        let mut seen = Vec::new();
        while let Some(batch) = tracker.host_mut().scroll_step() {
            tracker.handle_intersections(&batch);
            seen.push(tracker.active_section_id().to_string());
        }
        assert!(seen.iter().all(|id| id == "a" || id == "c"), "{seen:?}");
        assert_eq!(tracker.active_section_id(), "c");

        // Ordinary tracking resumes after the target arrives.
        let batch = tracker.host_mut().scroll_to(500.0);
        tracker.handle_intersections(&batch);
        assert_eq!(tracker.active_section_id(), "b");
    }

    #[test]
    fn selecting_visible_section_keeps_tracking_live() {
        let mut tracker = SectionTracker::mount(page(), sections(), "a");
        tracker.host_mut().take_batch();
        let batch = tracker.host_mut().scroll_to(300.0);
        tracker.handle_intersections(&batch);
        assert_eq!(tracker.active_section_id(), "b");

        let mut click = NavClick::new();
        assert!(tracker.select("b", &mut click));
        while let Some(batch) = tracker.host_mut().scroll_step() {
            tracker.handle_intersections(&batch);
            assert_eq!(tracker.active_section_id(), "b");
        }

        let batch = tracker.host_mut().scroll_to(1300.0);
        tracker.handle_intersections(&batch);
        assert_eq!(tracker.active_section_id(), "c");
    }

    #[test]
    fn interrupted_scroll_releases_pending_target() {
        let mut tracker = SectionTracker::mount(page().with_scroll_steps(6), sections(), "a");
        tracker.host_mut().take_batch();

        let mut click = NavClick::new();
        tracker.select("c", &mut click);
        let batch = tracker.host_mut().scroll_step().unwrap();
        assert!(!tracker.handle_intersections(&batch));
        assert_eq!(tracker.active_section_id(), "a");

        // The reader grabs the page mid-scroll; b was reported while the
        // scroll ran and is still the only visible section.
        let batch = tracker.host_mut().scroll_to(500.0);
        assert!(tracker.handle_intersections(&batch));
        assert_eq!(tracker.active_section_id(), "b");

        let batch = tracker.host_mut().scroll_to(1300.0);
        tracker.handle_intersections(&batch);
        assert_eq!(tracker.active_section_id(), "c");
    }

    #[test]
    fn scroll_settled_releases_pending_target() {
        let mut tracker = SectionTracker::mount(page(), sections(), "a");
        let mut click = NavClick::new();
        tracker.select("c", &mut click);
        assert!(!tracker.handle_intersections(&[IntersectionEntry::new("b", 0.5, 0.0)]));
        tracker.scroll_settled();
        assert!(tracker.handle_intersections(&[IntersectionEntry::new("b", 0.5, 0.0)]));
        assert_eq!(tracker.active_section_id(), "b");
    }

    #[test]
    fn missing_regions_are_skipped() {
        let page = SimulatedPage::new(500.0).with_region("a", 600.0).with_region("c", 600.0);
        let mut tracker = SectionTracker::mount(page, sections(), "a");
        assert_eq!(tracker.observation_count(), 2);
        assert!(!tracker.handle_intersections(&[IntersectionEntry::new("b", 1.0, 0.0)]));
        assert!(tracker.handle_intersections(&[IntersectionEntry::new("c", 1.0, 0.0)]));
        assert_eq!(tracker.nav_items().len(), 3);
    }

    #[test]
    fn nav_items_flag_active() {
        let mut tracker = SectionTracker::mount(page(), sections(), "a");
        tracker.handle_intersections(&[IntersectionEntry::new("b", 1.0, 0.0)]);
        let items = tracker.nav_items();
        let active: Vec<&str> = items.iter().filter(|i| i.active).map(|i| i.id).collect();
        assert_eq!(active, vec!["b"]);
        assert_eq!(items[1].title, "Model");
        assert_eq!(items[2].icon, "chart");
    }

    #[test]
    fn unknown_default_falls_back_to_first_section() {
        let tracker = SectionTracker::mount(page(), sections(), "zzz");
        assert_eq!(tracker.active_section_id(), "a");
    }

    #[test]
    fn duplicate_ids_register_once() {
        let mut list = sections();
        list.push(SectionDescriptor::new("b", "Again", ""));
        let tracker = SectionTracker::mount(page(), list, "a");
        assert_eq!(tracker.sections().len(), 3);
        assert_eq!(tracker.observation_count(), 3);
    }

    #[test]
    fn unmount_releases_everything_and_is_idempotent() {
        let mut tracker = SectionTracker::mount(page(), sections(), "a");
        tracker.handle_intersections(&[IntersectionEntry::new("b", 1.0, 0.0)]);

        tracker.unmount();
        tracker.unmount();
        assert!(!tracker.is_mounted());
        assert_eq!(tracker.host().observation_count(), 0);
        assert_eq!(tracker.active_section_id(), "a");

        // No further reactions after teardown.
        assert!(!tracker.handle_intersections(&[IntersectionEntry::new("c", 1.0, 0.0)]));
        assert_eq!(tracker.active_section_id(), "a");
        let mut click = NavClick::new();
        assert!(!tracker.select("c", &mut click));
        assert!(tracker.host().scroll_requests().is_empty());
    }

    #[test]
    fn drop_releases_observations() {
        let mut page = page();
        {
            let tracker = SectionTracker::mount(&mut page, sections(), "a");
            assert_eq!(tracker.observation_count(), 3);
        }
        assert_eq!(page.observation_count(), 0);
    }

    #[test]
    fn mount_then_unmount_leaves_no_callbacks() {
        let mut page = page();
        {
            let mut tracker = SectionTracker::mount(&mut page, sections(), "a");
            tracker.unmount();
        }
        assert_eq!(page.observation_count(), 0);
        assert!(page.scroll_to(900.0).is_empty());
    }

    proptest! {
        #[test]
        fn active_is_always_a_registered_section(
            scrolls in proptest::collection::vec(0.0f32..1500.0, 1..20),
        ) {
            let mut tracker = SectionTracker::mount(page(), sections(), "a");
            let initial = tracker.host_mut().take_batch();
            tracker.handle_intersections(&initial);
            for y in scrolls {
                let batch = tracker.host_mut().scroll_to(y);
                tracker.handle_intersections(&batch);
                let active = tracker.active_section_id();
                prop_assert!(["a", "b", "c"].contains(&active));
            }
        }
    }
}

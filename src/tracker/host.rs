/// Handle for one registered visibility observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObservationId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// Where the region lands in the viewport after scrolling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAlign {
    Top,
}

/// The page the tracker runs inside: finds regions, watches their
/// visibility and scrolls the viewport.
///
/// Visibility changes come back as batches of
/// [`IntersectionEntry`](super::IntersectionEntry) that the host passes to
/// [`SectionTracker::handle_intersections`](super::SectionTracker::handle_intersections).
pub trait ViewportHost {
    /// Starts watching the region for `section_id`. `None` when the page has
    /// no such region.
    fn observe(&mut self, section_id: &str, threshold: f32) -> Option<ObservationId>;

    /// Stops a watch. Unknown or already released ids are ignored.
    fn unobserve(&mut self, observation: ObservationId);

    /// Scrolls the region into view; `false` when the region is missing.
    fn scroll_into_view(
        &mut self,
        section_id: &str,
        behavior: ScrollBehavior,
        align: ScrollAlign,
    ) -> bool;

    /// Whether a smooth scroll started by `scroll_into_view` is still moving.
    fn is_scrolling(&self) -> bool;
}

impl<H: ViewportHost + ?Sized> ViewportHost for &mut H {
    fn observe(&mut self, section_id: &str, threshold: f32) -> Option<ObservationId> {
        (**self).observe(section_id, threshold)
    }

    fn unobserve(&mut self, observation: ObservationId) {
        (**self).unobserve(observation)
    }

    fn scroll_into_view(
        &mut self,
        section_id: &str,
        behavior: ScrollBehavior,
        align: ScrollAlign,
    ) -> bool {
        (**self).scroll_into_view(section_id, behavior, align)
    }

    fn is_scrolling(&self) -> bool {
        (**self).is_scrolling()
    }
}

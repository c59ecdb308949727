//! Scroll-synchronized section tracking for in-page navigation.

mod host;
mod section_tracker;
mod simulated;
mod types;

pub use host::{ObservationId, ScrollAlign, ScrollBehavior, ViewportHost};
pub use section_tracker::{SectionTracker, VISIBILITY_THRESHOLD};
pub use simulated::{DEFAULT_SCROLL_STEPS, Region, SimulatedPage};
pub use types::{IntersectionEntry, NavClick, NavItem, SectionDescriptor};

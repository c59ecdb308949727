use serde::{Deserialize, Serialize};

/// A named page region the navigation list links to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDescriptor {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub icon: String,
}

impl SectionDescriptor {
    pub fn new(id: impl Into<String>, title: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            icon: icon.into(),
        }
    }
}

/// One visibility report from the host, in the shape browsers deliver them
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionEntry {
    pub section_id: String,
    /// Fraction of the region's height inside the viewport, 0..=1
    pub ratio: f32,
    pub is_intersecting: bool,
    /// Region top relative to the viewport top; smaller is higher on the page
    pub bounding_top: f32,
}

impl IntersectionEntry {
    pub fn new(section_id: impl Into<String>, ratio: f32, bounding_top: f32) -> Self {
        Self {
            section_id: section_id.into(),
            ratio,
            is_intersecting: ratio > 0.0,
            bounding_top,
        }
    }
}

/// The click on a navigation link. Selecting a section always cancels the
/// link's own navigation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavClick {
    default_prevented: bool,
}

impl NavClick {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// A navigation entry ready for styling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub icon: &'a str,
    pub active: bool,
}

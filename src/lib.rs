//! Animated cell diagrams and scroll-synced section tracking for course pages.
//!
//! [`diagram`] mounts typed, pulsing cells and growing arrows and writes them
//! out as SVG. [`tracker`] keeps a navigation list in step with the page
//! section the reader is looking at. The two are independent.

pub mod config;
pub mod diagram;
pub mod error;
pub mod fonts;
pub mod svg;
pub mod theme;
pub mod tracker;

pub use config::SceneConfig;
pub use error::{Error, Result};

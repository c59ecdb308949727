use std::num::NonZeroUsize;

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping};
use lru::LruCache;

const CACHE_CAPACITY: usize = 256;

#[derive(Hash, PartialEq, Eq, Clone)]
struct MeasureKey {
    text: String,
    font_size_bits: u32,
    monospace: bool,
}

/// Measures connector label text so label backdrops fit their text.
pub trait LabelMeasure {
    /// Returns (width, height) of a single-line label.
    fn measure_label(&mut self, text: &str, font_size: f32, monospace: bool) -> (f32, f32);
}

impl<T: LabelMeasure + ?Sized> LabelMeasure for Box<T> {
    fn measure_label(&mut self, text: &str, font_size: f32, monospace: bool) -> (f32, f32) {
        (**self).measure_label(text, font_size, monospace)
    }
}

pub struct CosmicTextMeasure {
    font_system: FontSystem,
    cache: LruCache<MeasureKey, (f32, f32)>,
}

impl CosmicTextMeasure {
    pub fn new() -> Self {
        Self {
            font_system: FontSystem::new(),
            cache: LruCache::new(
                NonZeroUsize::new(CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN),
            ),
        }
    }
}

impl Default for CosmicTextMeasure {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelMeasure for CosmicTextMeasure {
    fn measure_label(&mut self, text: &str, font_size: f32, monospace: bool) -> (f32, f32) {
        // cosmic-text asserts on a zero line height
        if !font_size.is_finite() || font_size <= 0.0 {
            return (0.0, 0.0);
        }

        let key = MeasureKey {
            text: text.to_string(),
            font_size_bits: font_size.to_bits(),
            monospace,
        };

        if let Some(cached) = self.cache.get(&key) {
            return *cached;
        }

        let line_height = font_size * 1.2;
        let mut buffer = Buffer::new(
            &mut self.font_system,
            Metrics {
                font_size,
                line_height,
            },
        );
        buffer.set_size(&mut self.font_system, None, None);

        let attrs = Attrs::new().family(if monospace {
            Family::Monospace
        } else {
            Family::SansSerif
        });
        buffer.set_text(&mut self.font_system, text, &attrs, Shaping::Advanced, None);

        let mut width: f32 = 0.0;
        let mut height: f32 = 0.0;
        for run in buffer.layout_runs() {
            width = width.max(run.line_w);
            height += run.line_height;
        }
        if height == 0.0 {
            height = line_height;
        }

        let measured = (width, height);
        self.cache.put(key, measured);
        measured
    }
}

/// Fixed advance per character. Used when no font system is wanted, such as
/// in tests or when rendering on a machine without system fonts.
#[derive(Debug, Clone, Copy)]
pub struct ApproxMeasure {
    /// Advance as a fraction of the font size
    pub advance: f32,
}

impl Default for ApproxMeasure {
    fn default() -> Self {
        Self { advance: 0.6 }
    }
}

impl LabelMeasure for ApproxMeasure {
    fn measure_label(&mut self, text: &str, font_size: f32, _monospace: bool) -> (f32, f32) {
        let chars = text.chars().count() as f32;
        (chars * font_size * self.advance, font_size * 1.2)
    }
}

#[cfg(test)]
mod tests {
    use super::{ApproxMeasure, CosmicTextMeasure, LabelMeasure};

    #[test]
    fn approx_measure_scales_with_length() {
        let mut measure = ApproxMeasure::default();
        let (short, h) = measure.measure_label("kill", 10.0, false);
        let (long, _) = measure.measure_label("kill rate", 10.0, false);
        assert!((short - 24.0).abs() < 1e-4);
        assert!(long > short);
        assert!((h - 12.0).abs() < 1e-4);
    }

    #[test]
    fn unusable_font_size_measures_empty() {
        let mut measure = CosmicTextMeasure::new();
        assert_eq!(measure.measure_label("kills", 0.0, false), (0.0, 0.0));
        assert_eq!(measure.measure_label("kills", f32::NAN, true), (0.0, 0.0));
    }
}

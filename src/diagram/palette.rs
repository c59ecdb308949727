//! Per-variant lookup tables.
//!
//! Colors and motion are pure functions of [`Variant`]. Both tables are
//! exhaustive matches, so adding a variant fails to compile until it has an
//! entry in each.

use super::types::{Point, Variant};

/// Body and nucleus fill colors for a variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub body: &'static str,
    pub nucleus: &'static str,
}

/// Motion constants for a variant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionProfile {
    /// Peak scale of the body pulse (keyframes 1 -> peak -> 1)
    pub pulse_scale: f32,
    /// Opacity multiplier at the pulse peak
    pub opacity_decay: f32,
    /// Drift offset reached halfway through each cycle
    pub drift: Point,
}

/// Seconds per pulse/drift cycle at speed 1.
pub const PULSE_PERIOD: f32 = 2.5;
/// Seconds per nucleus pulse cycle at speed 1.
pub const NUCLEUS_PERIOD: f32 = 3.0;
/// Extra delay of the nucleus pulse relative to the body.
pub const NUCLEUS_DELAY: f32 = 0.5;
pub const NUCLEUS_PULSE_SCALE: f32 = 1.1;
/// Nucleus diameter as a fraction of the cell diameter.
pub const NUCLEUS_RATIO: f32 = 0.4;

impl Variant {
    pub const fn palette(self) -> Palette {
        match self {
            Variant::Normal => Palette {
                body: "#4ade80",
                nucleus: "#166534",
            },
            Variant::Abnormal => Palette {
                body: "#facc15",
                nucleus: "#854d0e",
            },
            Variant::Tumor => Palette {
                body: "#f97316",
                nucleus: "#9a3412",
            },
            Variant::Immune => Palette {
                body: "#60a5fa",
                nucleus: "#1e40af",
            },
            Variant::Tissue => Palette {
                body: "#f9a8d4",
                nucleus: "#9d174d",
            },
            Variant::Cancer => Palette {
                body: "#ef4444",
                nucleus: "#7f1d1d",
            },
        }
    }

    pub const fn motion(self) -> MotionProfile {
        match self {
            Variant::Normal => MotionProfile {
                pulse_scale: 1.05,
                opacity_decay: 0.90,
                drift: Point::new(10.0, 5.0),
            },
            Variant::Abnormal => MotionProfile {
                pulse_scale: 1.10,
                opacity_decay: 0.85,
                drift: Point::new(12.0, 8.0),
            },
            Variant::Tumor => MotionProfile {
                pulse_scale: 1.15,
                opacity_decay: 0.80,
                drift: Point::new(15.0, 10.0),
            },
            Variant::Immune => MotionProfile {
                pulse_scale: 1.10,
                opacity_decay: 0.70,
                drift: Point::new(20.0, 15.0),
            },
            Variant::Tissue => MotionProfile {
                pulse_scale: 1.02,
                opacity_decay: 0.95,
                drift: Point::new(3.0, 2.0),
            },
            Variant::Cancer => MotionProfile {
                pulse_scale: 1.20,
                opacity_decay: 0.75,
                drift: Point::new(8.0, 6.0),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn all_colors_are_distinct() {
        let mut seen = HashSet::new();
        for variant in Variant::ALL {
            let palette = variant.palette();
            assert_ne!(palette.body, palette.nucleus, "{:?}", variant);
            assert!(seen.insert(palette.body), "duplicate body color {}", palette.body);
            assert!(
                seen.insert(palette.nucleus),
                "duplicate nucleus color {}",
                palette.nucleus
            );
        }
        assert_eq!(seen.len(), 12);
    }

    #[test]
    fn palette_is_deterministic() {
        for variant in Variant::ALL {
            assert_eq!(variant.palette(), variant.palette());
            assert_eq!(variant.motion(), variant.motion());
        }
    }

    #[test]
    fn motion_grows_with_malignancy() {
        let order = [
            Variant::Normal,
            Variant::Abnormal,
            Variant::Tumor,
            Variant::Cancer,
        ];
        for pair in order.windows(2) {
            let (less, more) = (pair[0].motion(), pair[1].motion());
            assert!(less.pulse_scale < more.pulse_scale, "{:?}", pair);
            assert!(less.opacity_decay > more.opacity_decay, "{:?}", pair);
        }
    }

    #[test]
    fn immune_drifts_furthest() {
        let immune = Variant::Immune.motion().drift;
        for variant in Variant::ALL {
            if variant == Variant::Immune {
                continue;
            }
            let drift = variant.motion().drift;
            assert!(immune.x > drift.x && immune.y > drift.y, "{:?}", variant);
        }
    }
}

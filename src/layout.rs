//! Responsive page layout.
//!
//! Computes the on-screen size of a single page surface from the available
//! window box, the measured page aspect ratio, and the device orientation.
//! The result always preserves the aspect ratio and never exceeds the usable
//! box; width is maximized subject to both.

/// Policy bounds for the computed page size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    /// Smallest page width ever produced. Also the fallback when the
    /// container has no usable size yet (initial mount).
    pub min_width: u32,
    /// Largest page width ever produced.
    pub max_width: u32,
    /// Space reserved on every edge of the available box, in pixels.
    pub margin: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_width: 220,
            max_width: 1600,
            margin: 16.0,
        }
    }
}

/// Computed size of the page surface, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSize {
    pub width: u32,
    pub height: u32,
}

/// Lay a page of the given aspect ratio (height / width) into the available
/// box, filling as much of it as possible without overflowing either axis.
///
/// In portrait orientation the page surface is drawn rotated a quarter turn,
/// so the box it must fit is the transposed one; the swap happens here and
/// the rest of the math stays orientation-agnostic.
///
/// Deterministic and idempotent: identical inputs produce identical output.
pub fn compute_page_size(
    available_width: f32,
    available_height: f32,
    aspect_ratio: f32,
    is_portrait: bool,
    config: &LayoutConfig,
) -> PageSize {
    let (avail_w, avail_h) = if is_portrait {
        (available_height, available_width)
    } else {
        (available_width, available_height)
    };

    let usable_w = avail_w - config.margin * 2.0;
    let usable_h = avail_h - config.margin * 2.0;

    // A zero-sized container shows up briefly while the window is being
    // mapped; produce the minimum layout instead of dividing into garbage.
    if usable_w < 1.0 || usable_h < 1.0 {
        let width = config.min_width;
        return PageSize {
            width,
            height: (width as f32 * aspect_ratio).round() as u32,
        };
    }

    let candidate_width = usable_w.floor().min((usable_h / aspect_ratio).round());
    let candidate_height = (candidate_width * aspect_ratio).round();

    let (mut width, mut height) = if candidate_height > usable_h {
        // Too tall for the box: let height fill it and derive width back.
        let height = usable_h.floor();
        ((height / aspect_ratio).round(), height)
    } else {
        (candidate_width, candidate_height)
    };

    let clamped = (width as u32).clamp(config.min_width, config.max_width);
    if clamped != width as u32 {
        width = clamped as f32;
        height = (width * aspect_ratio).round();
    }

    PageSize {
        width: width as u32,
        height: height as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn no_margin() -> LayoutConfig {
        LayoutConfig {
            margin: 0.0,
            ..LayoutConfig::default()
        }
    }

    #[test]
    fn width_constrained_box() {
        // Wide box: width fills, height follows the ratio with room to spare.
        let size = compute_page_size(1200.0, 900.0, 0.65, false, &no_margin());
        assert_eq!(size, PageSize { width: 1200, height: 780 });
    }

    #[test]
    fn height_constrained_box() {
        // Short box: height is the binding constraint, width is derived
        // back from it (round(600 / 0.65) = 923).
        let size = compute_page_size(1200.0, 600.0, 0.65, false, &no_margin());
        assert_eq!(size, PageSize { width: 923, height: 600 });
    }

    #[test]
    fn portrait_swaps_the_box() {
        let portrait = compute_page_size(400.0, 800.0, 0.65, true, &no_margin());
        let transposed = compute_page_size(800.0, 400.0, 0.65, false, &no_margin());
        assert_eq!(portrait, transposed);
        assert_eq!(portrait, PageSize { width: 615, height: 400 });
    }

    #[test]
    fn idempotent() {
        let config = LayoutConfig::default();
        let first = compute_page_size(1024.0, 768.0, 0.72, false, &config);
        let second = compute_page_size(1024.0, 768.0, 0.72, false, &config);
        assert_eq!(first, second);
    }

    #[test]
    fn zero_sized_container_falls_back_to_minimum() {
        let size = compute_page_size(0.0, 0.0, 0.65, false, &no_margin());
        assert_eq!(size, PageSize { width: 220, height: 143 });
    }

    #[test]
    fn margin_is_reserved_on_both_axes() {
        let config = LayoutConfig {
            margin: 16.0,
            ..LayoutConfig::default()
        };
        let size = compute_page_size(1200.0, 900.0, 0.65, false, &config);
        assert_eq!(size, PageSize { width: 1168, height: 759 });
    }

    #[test]
    fn width_clamped_to_policy_maximum() {
        let size = compute_page_size(4000.0, 3000.0, 0.65, false, &no_margin());
        assert_eq!(size, PageSize { width: 1600, height: 1040 });
    }

    #[test]
    fn output_never_overflows_the_usable_box() {
        let config = no_margin();
        for &(w, h) in &[
            (800.0_f32, 600.0_f32),
            (1366.0, 768.0),
            (1920.0, 1080.0),
            (640.0, 1136.0),
            (2560.0, 1440.0),
        ] {
            for &aspect in &[0.5_f32, 0.65, 0.7727, 1.0, 1.4142] {
                let size = compute_page_size(w, h, aspect, false, &config);
                assert!(size.width as f32 <= w.max(config.min_width as f32));
                assert!(size.height as f32 <= h + 1.0, "height {} overflows {h}", size.height);
                let expected_height = (size.width as f32 * aspect).round() as u32;
                let delta = expected_height.abs_diff(size.height);
                assert!(delta <= 1, "aspect drift {delta} at {w}x{h} ratio {aspect}");
            }
        }
    }
}

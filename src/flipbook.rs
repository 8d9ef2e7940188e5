//! Flip-animation engine.
//!
//! Holds the page-turn state machine: commands start a timed transition
//! toward a clamped target index, `tick` advances it, and the resulting
//! page-changed event is the single source of position updates for the rest
//! of the viewer. Commands arriving mid-flip are dropped.

use std::time::{Duration, Instant};

const FLIP_DURATION: Duration = Duration::from_millis(450);

/// Behaviour switches for the flip engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlipConfig {
    /// Show one page at a time instead of a two-page spread.
    pub single_page: bool,
    /// Flip forward when the page surface itself is clicked.
    pub click_to_flip: bool,
    /// Draw the drag-affordance marker in the page corner.
    pub show_page_corners: bool,
    /// Peak opacity of the shadow drawn over the turning page.
    pub max_shadow_opacity: f32,
}

impl Default for FlipConfig {
    fn default() -> Self {
        Self {
            single_page: true,
            click_to_flip: false,
            show_page_corners: false,
            max_shadow_opacity: 0.15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipEvent {
    /// A flip finished; the carried index is the authoritative position.
    PageChanged(usize),
}

#[derive(Debug, Clone, Copy)]
struct Flip {
    target: usize,
    started: Instant,
    progress: f32,
}

#[derive(Debug, Clone)]
pub struct FlipBook {
    config: FlipConfig,
    page_count: usize,
    current: usize,
    active: Option<Flip>,
}

impl FlipBook {
    pub fn new(page_count: usize, config: FlipConfig) -> Self {
        Self {
            config,
            page_count,
            current: 0,
            active: None,
        }
    }

    pub fn config(&self) -> &FlipConfig {
        &self.config
    }

    pub fn current_page(&self) -> usize {
        self.current
    }

    pub fn is_flipping(&self) -> bool {
        self.active.is_some()
    }

    /// Target of the flip in progress, if any.
    pub fn pending_target(&self) -> Option<usize> {
        self.active.map(|flip| flip.target)
    }

    fn step(&self) -> usize {
        if self.config.single_page {
            1
        } else {
            2
        }
    }

    fn last_page(&self) -> usize {
        self.page_count.saturating_sub(1)
    }

    /// Start flipping back. Returns false when already at the first page or
    /// a flip is in progress.
    pub fn flip_to_previous(&mut self, now: Instant) -> bool {
        let target = self.current.saturating_sub(self.step());
        self.start(target, now)
    }

    /// Start flipping forward. Returns false at the last page, while the
    /// page count is unknown, or mid-flip.
    pub fn flip_to_next(&mut self, now: Instant) -> bool {
        let target = (self.current + self.step()).min(self.last_page());
        self.start(target, now)
    }

    /// Start flipping to an arbitrary page, clamped to the document.
    pub fn jump_to(&mut self, index: usize, now: Instant) -> bool {
        let target = index.min(self.last_page());
        self.start(target, now)
    }

    fn start(&mut self, target: usize, now: Instant) -> bool {
        if self.active.is_some() || self.page_count == 0 || target == self.current {
            return false;
        }
        self.active = Some(Flip {
            target,
            started: now,
            progress: 0.0,
        });
        true
    }

    /// Advance the animation. Emits the page-changed event exactly once, on
    /// the tick that completes the flip.
    pub fn tick(&mut self, now: Instant) -> Option<FlipEvent> {
        let flip = self.active.as_mut()?;
        let elapsed = now.duration_since(flip.started).as_secs_f32();
        flip.progress = (elapsed / FLIP_DURATION.as_secs_f32()).min(1.0);
        if flip.progress >= 1.0 {
            let target = flip.target;
            self.active = None;
            self.current = target;
            Some(FlipEvent::PageChanged(target))
        } else {
            None
        }
    }

    /// Shadow opacity for the current animation frame: ramps up to the
    /// configured peak at mid-flip and back down. Zero while idle.
    pub fn shadow_opacity(&self) -> f32 {
        match self.active {
            Some(flip) => {
                let arc = 1.0 - (2.0 * flip.progress - 1.0).abs();
                self.config.max_shadow_opacity * arc
            }
            None => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticked_to(book: &mut FlipBook, start: Instant) -> Option<FlipEvent> {
        book.tick(start + FLIP_DURATION)
    }

    #[test]
    fn flip_forward_completes_and_reports() {
        let now = Instant::now();
        let mut book = FlipBook::new(5, FlipConfig::default());

        assert!(book.flip_to_next(now));
        assert!(book.is_flipping());
        assert_eq!(book.tick(now + Duration::from_millis(100)), None);

        assert_eq!(ticked_to(&mut book, now), Some(FlipEvent::PageChanged(1)));
        assert_eq!(book.current_page(), 1);
        assert!(!book.is_flipping());
    }

    #[test]
    fn previous_at_first_page_is_a_noop() {
        let now = Instant::now();
        let mut book = FlipBook::new(5, FlipConfig::default());
        assert!(!book.flip_to_previous(now));
        assert!(!book.is_flipping());
    }

    #[test]
    fn next_at_last_page_is_a_noop() {
        let now = Instant::now();
        let mut book = FlipBook::new(3, FlipConfig::default());
        assert!(book.jump_to(2, now));
        ticked_to(&mut book, now);

        assert!(!book.flip_to_next(now));
    }

    #[test]
    fn empty_document_blocks_all_commands() {
        let now = Instant::now();
        let mut book = FlipBook::new(0, FlipConfig::default());
        assert!(!book.flip_to_next(now));
        assert!(!book.flip_to_previous(now));
        assert!(!book.jump_to(3, now));
    }

    #[test]
    fn commands_are_dropped_mid_flip() {
        let now = Instant::now();
        let mut book = FlipBook::new(5, FlipConfig::default());
        assert!(book.flip_to_next(now));
        assert!(!book.flip_to_next(now));
        assert!(!book.jump_to(4, now));
        assert_eq!(book.pending_target(), Some(1));
    }

    #[test]
    fn jump_is_clamped_to_the_document() {
        let now = Instant::now();
        let mut book = FlipBook::new(4, FlipConfig::default());
        assert!(book.jump_to(99, now));
        assert_eq!(ticked_to(&mut book, now), Some(FlipEvent::PageChanged(3)));
    }

    #[test]
    fn spread_mode_advances_two_pages() {
        let now = Instant::now();
        let config = FlipConfig {
            single_page: false,
            ..FlipConfig::default()
        };
        let mut book = FlipBook::new(6, config);
        assert!(book.flip_to_next(now));
        assert_eq!(book.pending_target(), Some(2));
    }

    #[test]
    fn shadow_ramps_during_the_flip_only() {
        let now = Instant::now();
        let mut book = FlipBook::new(5, FlipConfig::default());
        assert_eq!(book.shadow_opacity(), 0.0);

        book.flip_to_next(now);
        book.tick(now + FLIP_DURATION / 2);
        let mid = book.shadow_opacity();
        assert!(mid > 0.0);
        assert!(mid <= book.config().max_shadow_opacity + f32::EPSILON);

        ticked_to(&mut book, now);
        assert_eq!(book.shadow_opacity(), 0.0);
    }
}

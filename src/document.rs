//! Loaded-document state: metrics measured from the document plus the cache
//! of rendered page surfaces.

use std::collections::HashMap;

use iced::widget::image::Handle;

/// Provisional height/width ratio used until page 1 has been measured.
pub const DEFAULT_ASPECT_RATIO: f32 = 0.65;

const MAX_CACHED_PAGES: usize = 10;

/// Page count and the aspect ratio measured from page 1, assumed uniform
/// across the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentMetrics {
    page_count: usize,
    aspect_ratio: f32,
    measured: bool,
}

impl DocumentMetrics {
    pub fn new(page_count: usize) -> Self {
        Self {
            page_count,
            aspect_ratio: DEFAULT_ASPECT_RATIO,
            measured: false,
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Record page 1's intrinsic size. The ratio is corrected at most once
    /// per document; zero-sized measurements keep the current value.
    pub fn record_page_size(&mut self, width: f32, height: f32) {
        if self.measured || width <= 0.0 || height <= 0.0 {
            return;
        }
        self.aspect_ratio = height / width;
        self.measured = true;
    }
}

/// Rendered page surfaces keyed by `(page index, rendered width)`, so a
/// resize naturally re-renders while flips between cached pages stay free.
#[derive(Debug, Default)]
pub struct PageCache {
    pages: HashMap<(usize, u32), Handle>,
}

impl PageCache {
    pub fn get(&self, page: usize, width: u32) -> Option<Handle> {
        self.pages.get(&(page, width)).cloned()
    }

    pub fn contains(&self, page: usize, width: u32) -> bool {
        self.pages.contains_key(&(page, width))
    }

    pub fn insert(&mut self, page: usize, width: u32, handle: Handle) {
        self.pages.insert((page, width), handle);

        // Keep memory bounded; eviction order is not important here since a
        // handful of pages around the reader covers every flip.
        if self.len() > MAX_CACHED_PAGES {
            let stale: Vec<_> = self
                .pages
                .keys()
                .filter(|&&key| key != (page, width))
                .take(self.len() - MAX_CACHED_PAGES)
                .copied()
                .collect();
            for key in stale {
                self.pages.remove(&key);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }
}

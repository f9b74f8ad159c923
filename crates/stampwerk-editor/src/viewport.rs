// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Viewport: zoom and scroll state of the stacked page column.

use stampwerk_core::{CanonicalPoint, CoordinateSpace, PageSize, ViewPoint, Zoom, ZoomLimits};

/// What the user is currently looking at.
///
/// Pages are stacked vertically at the current zoom. Changing zoom or scroll
/// never touches stamp positions; it only changes how view points map back to
/// canonical space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    zoom: Zoom,
    scroll_top: f32,
    page_size: PageSize,
    page_count: usize,
}

impl Viewport {
    pub fn new(page_size: PageSize, page_count: usize, limits: ZoomLimits) -> Self {
        Self {
            zoom: Zoom::new(1.0, limits),
            scroll_top: 0.0,
            page_size,
            page_count,
        }
    }

    /// The zoom every view point is interpreted at.
    pub fn zoom(&self) -> Zoom {
        self.zoom
    }

    /// Set the zoom directly; `factor` is clamped to the configured limits.
    pub fn set_zoom(&mut self, factor: f32) {
        self.zoom = Zoom::new(factor, self.zoom.limits());
    }

    pub fn zoom_in(&mut self) {
        self.zoom = self.zoom.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.zoom = self.zoom.zoom_out();
    }

    /// View-space offset of the top of the visible area.
    pub fn scroll_top(&self) -> f32 {
        self.scroll_top
    }

    /// Scroll the page column; negative or non-finite offsets snap to the top.
    pub fn scroll_to(&mut self, top: f32) {
        self.scroll_top = if top.is_finite() { top.max(0.0) } else { 0.0 };
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Adopt a new document's page count and return to the top.
    pub(crate) fn reset(&mut self, page_count: usize) {
        self.page_count = page_count;
        self.scroll_top = 0.0;
    }

    /// Transforms for the current zoom and page height.
    pub fn space(&self) -> CoordinateSpace {
        CoordinateSpace::new(self.zoom, self.page_size.height)
    }

    /// Index of the page at the top of the visible area.
    pub fn current_page(&self) -> usize {
        let last = self.page_count.saturating_sub(1);
        self.space()
            .page_at(self.scroll_top)
            .map_or(0, |page| page.min(last))
    }

    /// Width and height of the whole zoomed page column.
    pub fn stage_size(&self) -> (f32, f32) {
        let z = self.zoom.factor();
        (
            self.page_size.width as f32 * z,
            self.page_count as f32 * self.page_size.height as f32 * z,
        )
    }

    /// Resolve a view point to the page under it and the canonical position on
    /// that page. `None` when the point lies outside every page.
    pub fn resolve(&self, point: ViewPoint) -> Option<(usize, CanonicalPoint)> {
        if !point.x.is_finite() || !point.y.is_finite() {
            return None;
        }
        let space = self.space();
        let page = space.page_at(point.y).filter(|&page| page < self.page_count)?;
        let canonical = space.to_canonical(page, point);
        let inside = (0.0..=self.page_size.width as f32).contains(&canonical.x);
        inside.then_some((page, canonical))
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Canonical <-> view coordinate transforms.
//
// Canonical space is page-relative and unscaled; it is the only space stamp
// positions are ever stored in. View space is the zoomed, vertically stacked
// page column the user points at. Pages sit one above the other, so page `i`
// starts at `i * page_height * zoom` in view space.

use serde::{Deserialize, Serialize};

/// A point in canonical (page-relative, unzoomed) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CanonicalPoint {
    pub x: f32,
    pub y: f32,
}

impl CanonicalPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A point in view (zoomed, page-column) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewPoint {
    pub x: f32,
    pub y: f32,
}

impl ViewPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Allowed zoom range and the increment used by zoom in/out actions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomLimits {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min: 0.5,
            max: 3.0,
            step: 0.1,
        }
    }
}

/// A zoom factor that is always inside its limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zoom {
    factor: f32,
    limits: ZoomLimits,
}

impl Zoom {
    /// Clamp `factor` into `limits`. Non-finite factors fall back to 1.0.
    pub fn new(factor: f32, limits: ZoomLimits) -> Self {
        let factor = if factor.is_finite() { factor } else { 1.0 };
        Self {
            factor: factor.clamp(limits.min, limits.max),
            limits,
        }
    }

    /// Current scale; 1.0 shows canonical units 1:1.
    pub fn factor(self) -> f32 {
        self.factor
    }

    /// Bounds and step this zoom was clamped against.
    pub fn limits(self) -> ZoomLimits {
        self.limits
    }

    /// One step larger, saturating at the maximum.
    pub fn zoom_in(self) -> Self {
        Self::new(self.factor + self.limits.step, self.limits)
    }

    /// One step smaller, saturating at the minimum.
    pub fn zoom_out(self) -> Self {
        Self::new(self.factor - self.limits.step, self.limits)
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self::new(1.0, ZoomLimits::default())
    }
}

/// Stateless transform pair for one zoom level and page height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateSpace {
    zoom: f32,
    page_height: f32,
}

impl CoordinateSpace {
    pub fn new(zoom: Zoom, page_height: u32) -> Self {
        Self {
            zoom: zoom.factor(),
            page_height: page_height as f32,
        }
    }

    /// View units per canonical unit.
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Vertical view offset of the top of `page_index`.
    pub fn page_offset(&self, page_index: usize) -> f32 {
        page_index as f32 * self.page_height * self.zoom
    }

    /// Canonical position on `page_index` to view space, including the
    /// page's offset in the column.
    pub fn to_view(&self, page_index: usize, point: CanonicalPoint) -> ViewPoint {
        ViewPoint {
            x: point.x * self.zoom,
            y: point.y * self.zoom + self.page_offset(page_index),
        }
    }

    /// Inverse of [`to_view`](Self::to_view). The result is not bounded to
    /// the page box.
    pub fn to_canonical(&self, page_index: usize, point: ViewPoint) -> CanonicalPoint {
        CanonicalPoint {
            x: point.x / self.zoom,
            y: (point.y - self.page_offset(page_index)) / self.zoom,
        }
    }

    /// Index of the page under a view-space y, or `None` above the first page
    /// or for non-finite input. The caller bounds the result by its page count.
    pub fn page_at(&self, view_y: f32) -> Option<usize> {
        if !view_y.is_finite() || view_y < 0.0 {
            return None;
        }
        let scaled_height = self.page_height * self.zoom;
        if scaled_height <= 0.0 {
            return None;
        }
        Some((view_y / scaled_height).floor() as usize)
    }
}

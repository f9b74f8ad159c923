// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pluggable PDF page rendering.

use image::RgbaImage;
use stampwerk_core::error::StampwerkError;

/// Turns one page of a PDF into pixels.
///
/// The rasterizer computes the target size from the page box and calls the
/// renderer once per page, in page order. Implementations should return a
/// bitmap of exactly `width` x `height`; anything else is resampled.
pub trait PdfPageRenderer {
    fn render_page(
        &self,
        document: &[u8],
        page_index: usize,
        width: u32,
        height: u32,
    ) -> Result<RgbaImage, StampwerkError>;
}

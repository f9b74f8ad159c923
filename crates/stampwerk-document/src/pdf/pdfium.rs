// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDFium-backed page renderer.
//
// # Feature Gate
//
// This module is only available when the `pdfium` feature is enabled:
//
// ```toml
// stampwerk-document = { path = "crates/stampwerk-document", features = ["pdfium"] }
// ```
//
// The PDFium shared library itself is loaded at runtime from the system
// library path (`libpdfium.so`, `libpdfium.dylib`, or `pdfium.dll`).

use image::RgbaImage;
use pdfium_render::prelude::*;
use stampwerk_core::error::StampwerkError;
use tracing::{debug, info, instrument};

use super::render::PdfPageRenderer;

/// Renders PDF pages through a dynamically loaded PDFium library.
pub struct PdfiumRenderer {
    pdfium: Pdfium,
}

impl PdfiumRenderer {
    /// Bind to the PDFium library installed on the system.
    pub fn from_system_library() -> Result<Self, StampwerkError> {
        let bindings = Pdfium::bind_to_system_library().map_err(|err| {
            StampwerkError::RendererUnavailable(format!("PDFium library not available: {}", err))
        })?;
        info!("PDFium bound from system library");
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }
}

impl PdfPageRenderer for PdfiumRenderer {
    #[instrument(skip(self, document), fields(page_index, width, height))]
    fn render_page(
        &self,
        document: &[u8],
        page_index: usize,
        width: u32,
        height: u32,
    ) -> Result<RgbaImage, StampwerkError> {
        let failure = |reason: String| StampwerkError::RasterizationFailure {
            page: Some(page_index),
            reason,
        };

        let pdf = self
            .pdfium
            .load_pdf_from_byte_slice(document, None)
            .map_err(|err| failure(format!("PDFium could not open document: {}", err)))?;

        let page = pdf
            .pages()
            .iter()
            .nth(page_index)
            .ok_or_else(|| failure("page missing from document".into()))?;

        let config = PdfRenderConfig::new()
            .set_target_width(width as i32)
            .set_maximum_height(height as i32);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|err| failure(format!("PDFium render failed: {}", err)))?;

        let rendered = bitmap.as_image().to_rgba8();
        debug!(
            rendered_width = rendered.width(),
            rendered_height = rendered.height(),
            "Page rendered"
        );
        Ok(rendered)
    }
}

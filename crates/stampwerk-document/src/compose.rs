// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document compositor: flattens stamps onto page bitmaps and serialises the
// result as one multi-page PDF.
//
// Each page is rendered independently: white page box, page bitmap fitted
// into it, then every stamp on that page in Z-order (slice order). The same
// page renderer backs the on-screen preview, so preview and export agree.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use stampwerk_core::error::StampwerkError;
use stampwerk_core::{EngineConfig, Page, Stamp, Zoom};
use tracing::{debug, info, instrument, warn};

use crate::integrity::hash_bytes;
use crate::paint::{StampFont, StampPainter};
use crate::pdf::PdfWriter;

const PAPER: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Result of flattening a document.
#[derive(Debug, Clone)]
pub struct CompositeOutput {
    /// Flattened page bitmaps, one per input page, in page order.
    pub pages: Vec<RgbaImage>,
    /// Serialised multi-page PDF.
    pub pdf: Vec<u8>,
    /// SHA-256 hex fingerprint of `pdf`.
    pub sha256: String,
}

/// Flattens documents for one engine configuration.
pub struct DocumentCompositor {
    painter: StampPainter,
    writer: PdfWriter,
}

impl DocumentCompositor {
    /// `font` overrides the embedded lettering font.
    pub fn new(config: &EngineConfig, font: Option<StampFont>) -> Self {
        let font = match font {
            Some(font) => Some(font),
            None => match StampFont::embedded() {
                Ok(font) => Some(font),
                Err(err) => {
                    warn!(error = %err, "Stamp lettering will not be drawn");
                    None
                }
            },
        };
        let painter = StampPainter::new(config.stamp, font);
        let mut writer = PdfWriter::new(config.page);
        writer.set_title(config.output_title.clone());
        Self { painter, writer }
    }

    /// Flatten every page and serialise the result.
    ///
    /// `stamps` is a snapshot in Z-order. Any stamp referring to a page that
    /// does not exist fails the whole operation before anything is drawn.
    #[instrument(skip_all, fields(pages = pages.len(), stamps = stamps.len()))]
    pub async fn composite(
        &self,
        pages: &[Page],
        stamps: &[Stamp],
    ) -> Result<CompositeOutput, StampwerkError> {
        if pages.is_empty() {
            return Err(StampwerkError::CompositingFailure {
                page: None,
                reason: "document has no pages".into(),
            });
        }
        validate_page_indexes(pages.len(), stamps)?;

        info!("Compositing document");
        let mut flattened = Vec::with_capacity(pages.len());
        for index in 0..pages.len() {
            flattened.push(self.render_page(pages, stamps, index)?);
            tokio::task::yield_now().await;
        }

        let pdf = self
            .writer
            .write_pages(&flattened)
            .map_err(|err| StampwerkError::CompositingFailure {
                page: None,
                reason: err.to_string(),
            })?;
        let sha256 = hash_bytes(&pdf);
        info!(pdf_bytes = pdf.len(), %sha256, "Composite complete");

        Ok(CompositeOutput {
            pages: flattened,
            pdf,
            sha256,
        })
    }

    /// Render one page at full page-box size with its stamps baked in.
    #[instrument(skip(self, pages, stamps), fields(index))]
    pub fn render_page(
        &self,
        pages: &[Page],
        stamps: &[Stamp],
        index: usize,
    ) -> Result<RgbaImage, StampwerkError> {
        let page = pages
            .get(index)
            .ok_or_else(|| StampwerkError::CompositingFailure {
                page: Some(index),
                reason: format!("page index out of range (document has {} pages)", pages.len()),
            })?;
        let size = page.size();
        let mut canvas = RgbaImage::from_pixel(size.width, size.height, PAPER);

        let placement = page.placement();
        if placement.width > 0 && placement.height > 0 {
            let bitmap = page.bitmap();
            if bitmap.dimensions() == (placement.width, placement.height) {
                imageops::overlay(&mut canvas, bitmap, placement.x, placement.y);
            } else {
                let fitted = imageops::resize(
                    bitmap,
                    placement.width,
                    placement.height,
                    FilterType::Triangle,
                );
                imageops::overlay(&mut canvas, &fitted, placement.x, placement.y);
            }
        }

        let mut drawn = 0usize;
        for stamp in stamps.iter().filter(|stamp| stamp.page_index == index) {
            self.painter.paint(&mut canvas, stamp);
            drawn += 1;
        }
        debug!(page = index + 1, stamps = drawn, "Page flattened");
        Ok(canvas)
    }

    /// The page as the user sees it at `zoom`: the export render, scaled.
    pub fn render_preview(
        &self,
        pages: &[Page],
        stamps: &[Stamp],
        index: usize,
        zoom: Zoom,
    ) -> Result<RgbaImage, StampwerkError> {
        let full = self.render_page(pages, stamps, index)?;
        let factor = zoom.factor();
        if (factor - 1.0).abs() < f32::EPSILON {
            return Ok(full);
        }
        let width = ((full.width() as f32 * factor).round() as u32).max(1);
        let height = ((full.height() as f32 * factor).round() as u32).max(1);
        Ok(imageops::resize(&full, width, height, FilterType::Triangle))
    }
}

fn validate_page_indexes(page_count: usize, stamps: &[Stamp]) -> Result<(), StampwerkError> {
    match stamps.iter().find(|stamp| stamp.page_index >= page_count) {
        Some(stamp) => Err(StampwerkError::CompositingFailure {
            page: Some(stamp.page_index),
            reason: format!(
                "stamp {} refers to a page the document does not have ({} pages)",
                stamp.id, page_count
            ),
        }),
        None => Ok(()),
    }
}

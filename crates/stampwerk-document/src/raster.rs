// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page rasterizer: turns an uploaded document into an ordered sequence of
// fixed-box raster pages.
//
// Still images become a single page holding the decoded image unscaled; it is
// fitted into the page box at draw time. PDFs are rendered page by page, in
// order, each at `min(box_w / page_w, box_h / page_h)` so no bitmap exceeds
// the box. A page is appended only once its render has finished.

use image::RgbaImage;
use image::imageops::{self, FilterType};
use stampwerk_core::error::StampwerkError;
use stampwerk_core::{MediaType, Page, PageSize};
use tracing::{debug, info, instrument, warn};

use crate::pdf::{PageBox, PdfPageRenderer, PdfReader};

/// Converts uploads into [`Page`]s for one fixed page box.
pub struct PageRasterizer {
    page_size: PageSize,
    renderer: Option<Box<dyn PdfPageRenderer>>,
}

impl PageRasterizer {
    /// A rasterizer for still images only; PDFs need [`with_renderer`](Self::with_renderer).
    pub fn new(page_size: PageSize) -> Self {
        Self {
            page_size,
            renderer: None,
        }
    }

    pub fn with_renderer(mut self, renderer: impl PdfPageRenderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Rasterize `data` declared as `mime`.
    ///
    /// Fails as a whole: either every page is produced, or an error is returned
    /// and nothing is.
    #[instrument(skip(self, data), fields(bytes_len = data.len(), mime))]
    pub async fn rasterize(&self, data: &[u8], mime: &str) -> Result<Vec<Page>, StampwerkError> {
        match MediaType::from_mime(mime)? {
            MediaType::Image => Ok(vec![self.rasterize_image(data)?]),
            MediaType::Pdf => self.rasterize_pdf(data).await,
        }
    }

    fn rasterize_image(&self, data: &[u8]) -> Result<Page, StampwerkError> {
        let decoded = image::load_from_memory(data).map_err(|err| {
            StampwerkError::RasterizationFailure {
                page: None,
                reason: format!("failed to decode image: {}", err),
            }
        })?;
        info!(
            width = decoded.width(),
            height = decoded.height(),
            "Image decoded as single page"
        );
        Ok(Page::new(decoded.to_rgba8(), self.page_size))
    }

    async fn rasterize_pdf(&self, data: &[u8]) -> Result<Vec<Page>, StampwerkError> {
        let unreadable = |err: StampwerkError| StampwerkError::RasterizationFailure {
            page: None,
            reason: err.to_string(),
        };
        let reader = PdfReader::from_bytes(data).map_err(unreadable)?;
        let boxes = reader.page_boxes().map_err(unreadable)?;
        if boxes.is_empty() {
            return Err(StampwerkError::RasterizationFailure {
                page: None,
                reason: "document has no pages".into(),
            });
        }

        let renderer = self.renderer.as_ref().ok_or_else(|| {
            StampwerkError::RendererUnavailable("no PDF page renderer is configured".into())
        })?;

        info!(pages = boxes.len(), "Rasterizing PDF");
        let mut pages = Vec::with_capacity(boxes.len());
        for (index, page_box) in boxes.iter().enumerate() {
            let (width, height) = target_size(*page_box, self.page_size);
            let rendered = renderer.render_page(data, index, width, height)?;
            let bitmap = fit_rendered(rendered, width, height, index);
            pages.push(Page::new(bitmap, self.page_size));
            debug!(page = index + 1, width, height, "Page rasterized");

            // Strictly sequential; let other tasks on the loop run between pages.
            tokio::task::yield_now().await;
        }
        Ok(pages)
    }
}

/// Pixel size of a page rendered into `page_size`, preserving aspect ratio.
pub fn target_size(page_box: PageBox, page_size: PageSize) -> (u32, u32) {
    let scale = (page_size.width as f32 / page_box.width)
        .min(page_size.height as f32 / page_box.height);
    let width = (page_box.width * scale).round() as u32;
    let height = (page_box.height * scale).round() as u32;
    // An empty page box yields an empty target rather than a panic.
    (
        width.max(1).min(page_size.width),
        height.max(1).min(page_size.height),
    )
}

fn fit_rendered(rendered: RgbaImage, width: u32, height: u32, index: usize) -> RgbaImage {
    if rendered.dimensions() == (width, height) {
        return rendered;
    }
    warn!(
        page = index + 1,
        rendered_width = rendered.width(),
        rendered_height = rendered.height(),
        width,
        height,
        "Renderer returned unexpected size, resampling"
    );
    imageops::resize(&rendered, width, height, FilterType::Triangle)
}

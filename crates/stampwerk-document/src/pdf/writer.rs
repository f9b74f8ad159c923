// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer: serialise flattened page bitmaps into one multi-page PDF using
// `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.
//
// Output bytes are a pure function of the title and the page pixels: the
// /Info dates are pinned to the epoch, image resources get positional names,
// and the trailer /ID is rewritten from a digest of the content.

use image::{DynamicImage, RgbaImage};
use lopdf::{Object, StringFormat};
use printpdf::{
    Mm, Op, PdfDocument, PdfDocumentInfo, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage,
    RawImageData, RawImageFormat, XObject, XObjectId, XObjectTransform,
};
use sha2::{Digest, Sha256};
use stampwerk_core::PageSize;
use stampwerk_core::error::StampwerkError;
use tracing::{debug, info, instrument, warn};

/// Bitmap pixels are placed at one pixel per point.
const DPI: f32 = 72.0;

/// Writes one PDF page per flattened bitmap.
pub struct PdfWriter {
    /// Page box every output page is given, in points.
    page_size: PageSize,
    /// Title metadata embedded in the PDF /Info dictionary.
    title: String,
}

impl PdfWriter {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            page_size,
            title: "Stampwerk Document".into(),
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Page dimensions in printpdf's Mm units.
    fn page_dimensions(&self) -> (Mm, Mm) {
        let to_mm = |points: u32| Mm(points as f32 * 25.4 / 72.0);
        (to_mm(self.page_size.width), to_mm(self.page_size.height))
    }

    /// Serialise `pages` in order. Each bitmap is stretched to fill the whole
    /// page box, so a bitmap of exactly the page size maps 1:1 onto points.
    #[instrument(skip(self, pages), fields(pages = pages.len()))]
    pub fn write_pages(&self, pages: &[RgbaImage]) -> Result<Vec<u8>, StampwerkError> {
        if pages.is_empty() {
            return Err(StampwerkError::PdfError("no pages to write".into()));
        }

        let (page_w, page_h) = self.page_dimensions();
        info!(title = %self.title, "Writing flattened PDF");

        let fingerprint = content_fingerprint(&self.title, pages);
        let mut doc = PdfDocument::new(&self.title);
        pin_metadata(&mut doc.metadata.info, &fingerprint);
        let mut pdf_pages = Vec::with_capacity(pages.len());

        for (index, bitmap) in pages.iter().enumerate() {
            let (width, height) = bitmap.dimensions();
            if width == 0 || height == 0 {
                return Err(StampwerkError::PdfError(format!(
                    "page {} has an empty bitmap",
                    index + 1
                )));
            }

            // Flattened pages are opaque; drop the alpha channel for printpdf.
            let rgb = DynamicImage::ImageRgba8(bitmap.clone()).to_rgb8();
            let raw = RawImage {
                pixels: RawImageData::U8(rgb.into_raw()),
                width: width as usize,
                height: height as usize,
                data_format: RawImageFormat::RGB8,
                tag: Vec::new(),
            };
            let xobject_id = XObjectId(format!("Page{}", index + 1));
            doc.resources
                .xobjects
                .map
                .insert(xobject_id.clone(), XObject::Image(raw));

            let ops = vec![Op::UseXobject {
                id: xobject_id,
                transform: XObjectTransform {
                    translate_x: Some(Pt(0.0)),
                    translate_y: Some(Pt(0.0)),
                    scale_x: Some(self.page_size.width as f32 / width as f32),
                    scale_y: Some(self.page_size.height as f32 / height as f32),
                    dpi: Some(DPI),
                    rotate: None,
                },
            }];
            pdf_pages.push(PdfPage::new(page_w, page_h, ops));
            debug!(page = index + 1, width, height, "Page image embedded");
        }

        doc.with_pages(pdf_pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            warn!(count = warnings.len(), "printpdf reported warnings");
        }

        let output = stamp_trailer_id(&output, &fingerprint)?;
        debug!(output_bytes = output.len(), "PDF serialised");
        Ok(output)
    }
}

/// SHA-256 over the title and every page's dimensions and pixels.
fn content_fingerprint(title: &str, pages: &[RgbaImage]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    for page in pages {
        hasher.update(page.width().to_be_bytes());
        hasher.update(page.height().to_be_bytes());
        hasher.update(page.as_raw());
    }
    hex::encode(hasher.finalize())
}

/// Keep the /Info dates at the epoch and use the content fingerprint as the
/// document identifier.
fn pin_metadata(info: &mut PdfDocumentInfo, fingerprint: &str) {
    let epoch = PdfDocumentInfo::default();
    info.creation_date = epoch.creation_date;
    info.modification_date = epoch.modification_date;
    info.metadata_date = epoch.metadata_date;
    info.identifier = fingerprint.to_string();
}

/// Replace printpdf's random trailer /ID pair with one derived from the
/// content. Both halves are equal: every write is an original.
fn stamp_trailer_id(bytes: &[u8], fingerprint: &str) -> Result<Vec<u8>, StampwerkError> {
    let mut doc = lopdf::Document::load_mem(bytes)
        .map_err(|err| StampwerkError::PdfError(format!("re-reading serialised PDF: {err}")))?;
    let id = fingerprint.as_bytes()[..32].to_vec();
    doc.trailer.set(
        "ID",
        Object::Array(vec![
            Object::String(id.clone(), StringFormat::Hexadecimal),
            Object::String(id, StringFormat::Hexadecimal),
        ]),
    );
    let mut output = Vec::with_capacity(bytes.len());
    doc.save_to(&mut output)
        .map_err(|err| StampwerkError::PdfError(format!("writing PDF trailer: {err}")))?;
    Ok(output)
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// stampwerk-document: Document processing for the Stampwerk stamping engine.
//
// Provides upload rasterization (still images, PDF page inspection and
// rendering), stamp painting (outlines, straight and arc lettering, QR blits),
// and flattening of stamped pages into a single multi-page PDF.

pub mod compose;
pub mod integrity;
pub mod paint;
pub mod pdf;
pub mod raster;

// Re-export the primary structs so callers can use `stampwerk_document::PageRasterizer` etc.
pub use compose::{CompositeOutput, DocumentCompositor};
pub use paint::{StampFont, StampPainter};
pub use pdf::{PdfPageRenderer, PdfReader, PdfWriter};
pub use raster::PageRasterizer;

#[cfg(feature = "pdfium")]
pub use pdf::PdfiumRenderer;

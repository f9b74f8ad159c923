// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module: inspecting uploads, rendering their pages, and writing the
// flattened output document.

pub mod reader;
pub mod render;
pub mod writer;

#[cfg(feature = "pdfium")]
pub mod pdfium;

pub use reader::{PageBox, PdfReader};
pub use render::PdfPageRenderer;
pub use writer::PdfWriter;

#[cfg(feature = "pdfium")]
pub use pdfium::PdfiumRenderer;

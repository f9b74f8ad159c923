// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader: inspect uploaded PDF documents (page count, page boxes) using
// the `lopdf` crate.

use lopdf::{Dictionary, Document, Object, ObjectId};
use stampwerk_core::error::StampwerkError;
use tracing::{debug, instrument, warn};

/// US Letter in points, the fallback when a page tree carries no MediaBox.
const LETTER: PageBox = PageBox {
    width: 612.0,
    height: 792.0,
};

/// Guard against cyclic /Parent chains in malformed files.
const MAX_TREE_DEPTH: usize = 32;

/// Visible size of one PDF page in points, after applying /Rotate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub width: f32,
    pub height: f32,
}

/// Read-only view of an uploaded PDF.
pub struct PdfReader {
    document: Document,
}

impl PdfReader {
    /// Parse a PDF already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, StampwerkError> {
        let document = Document::load_mem(data).map_err(|err| {
            StampwerkError::PdfError(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");
        Ok(Self { document })
    }

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Page boxes in page order (1..N).
    pub fn page_boxes(&self) -> Result<Vec<PageBox>, StampwerkError> {
        // get_pages() is keyed by 1-based page number, so values are in order.
        self.document
            .get_pages()
            .into_iter()
            .map(|(number, page_id)| self.page_box(number, page_id))
            .collect()
    }

    // -- Helpers --------------------------------------------------------------

    fn page_box(&self, number: u32, page_id: ObjectId) -> Result<PageBox, StampwerkError> {
        let media_box = self
            .inherited(page_id, b"MediaBox")?
            .and_then(|obj| self.rect(obj));

        let mut page_box = match media_box {
            Some(page_box) => page_box,
            None => {
                warn!(page = number, "page has no usable MediaBox, assuming US Letter");
                LETTER
            }
        };

        let rotation = self
            .inherited(page_id, b"Rotate")?
            .and_then(number_value)
            .map(|degrees| (degrees as i64).rem_euclid(360))
            .unwrap_or(0);
        if rotation == 90 || rotation == 270 {
            std::mem::swap(&mut page_box.width, &mut page_box.height);
        }

        Ok(page_box)
    }

    /// Look `key` up on the page dictionary, walking /Parent links for
    /// inheritable attributes.
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Result<Option<&Object>, StampwerkError> {
        let mut node = self.dictionary(page_id)?;
        for _ in 0..MAX_TREE_DEPTH {
            if let Ok(value) = node.get(key) {
                return Ok(Some(self.resolve(value)));
            }
            match node.get(b"Parent") {
                Ok(Object::Reference(parent_id)) => node = self.dictionary(*parent_id)?,
                _ => return Ok(None),
            }
        }
        Ok(None)
    }

    fn dictionary(&self, id: ObjectId) -> Result<&Dictionary, StampwerkError> {
        match self.document.get_object(id) {
            Ok(Object::Dictionary(dict)) => Ok(dict),
            Ok(_) => Err(StampwerkError::PdfError(format!(
                "object {:?} is not a dictionary",
                id
            ))),
            Err(err) => Err(StampwerkError::PdfError(format!(
                "cannot read page object {:?}: {}",
                id, err
            ))),
        }
    }

    fn resolve<'a>(&'a self, object: &'a Object) -> &'a Object {
        match object {
            Object::Reference(id) => self.document.get_object(*id).unwrap_or(object),
            other => other,
        }
    }

    fn rect(&self, object: &Object) -> Option<PageBox> {
        let Object::Array(items) = object else {
            return None;
        };
        let coords: Vec<f32> = items
            .iter()
            .filter_map(|item| number_value(self.resolve(item)))
            .collect();
        let [llx, lly, urx, ury] = coords.as_slice() else {
            return None;
        };
        let width = (urx - llx).abs();
        let height = (ury - lly).abs();
        (width > 0.0 && height > 0.0).then_some(PageBox { width, height })
    }
}

fn number_value(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value as f32),
        _ => None,
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The open document: rasterized pages plus the stamps placed on them.

use stampwerk_core::Page;

use crate::registry::StampRegistry;

/// Pages are fixed at creation; only the stamps change during a session.
/// A new upload replaces the whole document.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pages: Vec<Page>,
    stamps: StampRegistry,
}

impl Document {
    pub fn new(pages: Vec<Page>) -> Self {
        Self {
            pages,
            stamps: StampRegistry::new(),
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn stamps(&self) -> &StampRegistry {
        &self.stamps
    }

    pub(crate) fn stamps_mut(&mut self) -> &mut StampRegistry {
        &mut self.stamps
    }
}

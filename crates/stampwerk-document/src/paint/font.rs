// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stamp lettering font.
//
// DejaVu Sans Bold ships inside the crate so lettering renders without any
// configuration. A configured font file replaces it.

use std::path::Path;

use ab_glyph::FontArc;
use stampwerk_core::error::StampwerkError;
use tracing::{debug, info, instrument};

static EMBEDDED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");

/// A parsed TrueType/OpenType font. Cloning shares the font data.
#[derive(Clone)]
pub struct StampFont {
    font: FontArc,
}

impl StampFont {
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn from_file(path: &Path) -> Result<Self, StampwerkError> {
        let data = std::fs::read(path).map_err(|err| {
            StampwerkError::Font(format!("failed to read {}: {}", path.display(), err))
        })?;
        let font = Self::from_bytes(data)?;
        info!("Stamp font loaded");
        Ok(font)
    }

    /// The font compiled into the crate.
    pub fn embedded() -> Result<Self, StampwerkError> {
        let font = FontArc::try_from_slice(EMBEDDED_FONT)
            .map_err(|err| StampwerkError::Font(format!("embedded font is invalid: {}", err)))?;
        Ok(Self { font })
    }

    /// `path` when given, otherwise the embedded font.
    pub fn resolve(path: Option<&Path>) -> Result<Self, StampwerkError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                debug!("Using embedded stamp font");
                Self::embedded()
            }
        }
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self, StampwerkError> {
        let font = FontArc::try_from_vec(data)
            .map_err(|err| StampwerkError::Font(format!("failed to parse font: {}", err)))?;
        Ok(Self { font })
    }

    pub fn font(&self) -> &FontArc {
        &self.font
    }
}

impl std::fmt::Debug for StampFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StampFont")
    }
}

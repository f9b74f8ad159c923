// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::coords::ZoomLimits;
use crate::error::{Result, StampwerkError};
use crate::geometry::StampMetrics;
use crate::types::PageSize;

/// Persistent engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fixed page box every uploaded page is rasterized into.
    pub page: PageSize,
    /// Zoom range offered by the viewport.
    pub zoom: ZoomLimits,
    /// Stamp dimensions and lettering sizes.
    pub stamp: StampMetrics,
    /// TrueType/OpenType font used for stamp lettering. Without one, stamps
    /// are drawn without text.
    pub font_path: Option<PathBuf>,
    /// Title written into the output PDF.
    pub output_title: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            page: PageSize::A4,
            zoom: ZoomLimits::default(),
            stamp: StampMetrics::default(),
            font_path: None,
            output_title: "Stamped document".into(),
        }
    }
}

impl EngineConfig {
    /// Read and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`load`](Self::load), but a missing or unusable file yields the
    /// defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring invalid config file");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.page.width == 0 || self.page.height == 0 {
            return Err(StampwerkError::Config(format!(
                "page size must be positive, got {}x{}",
                self.page.width, self.page.height
            )));
        }

        let zoom = &self.zoom;
        let finite = [zoom.min, zoom.max, zoom.step].iter().all(|v| v.is_finite());
        if !finite || zoom.min <= 0.0 || zoom.min > zoom.max || zoom.step <= 0.0 {
            return Err(StampwerkError::Config(format!(
                "zoom limits must satisfy 0 < min <= max and step > 0, got {zoom:?}"
            )));
        }

        let stamp = &self.stamp;
        if !(stamp.size > 0.0) || !(stamp.stroke_width > 0.0) {
            return Err(StampwerkError::Config(
                "stamp size and stroke width must be positive".into(),
            ));
        }
        if !(stamp.ring_gap >= 0.0) || stamp.ring_gap * 2.0 >= stamp.size {
            return Err(StampwerkError::Config(format!(
                "ring gap {} leaves no interior in a {} stamp",
                stamp.ring_gap, stamp.size
            )));
        }
        if !(stamp.text_padding >= 0.0) || stamp.text_padding >= stamp.size / 2.0 {
            return Err(StampwerkError::Config(format!(
                "text padding {} must lie inside the stamp radius",
                stamp.text_padding
            )));
        }
        if !(stamp.label_font_size > 0.0) || !(stamp.date_font_size > 0.0) {
            return Err(StampwerkError::Config("font sizes must be positive".into()));
        }
        if !(stamp.bottom_arc_span > 0.0 && stamp.bottom_arc_span <= std::f32::consts::PI) {
            return Err(StampwerkError::Config(format!(
                "bottom arc span {} must be in (0, π]",
                stamp.bottom_arc_span
            )));
        }
        Ok(())
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stampwerk: Core types, coordinate transforms, stamp geometry and error
// definitions shared across all crates.

pub mod config;
pub mod coords;
pub mod error;
pub mod geometry;
pub mod human_errors;
pub mod types;

pub use config::EngineConfig;
pub use coords::{CanonicalPoint, CoordinateSpace, ViewPoint, Zoom, ZoomLimits};
pub use error::{Result, StampwerkError};
pub use geometry::{ShapeGeometry, StampGeometry, StampMetrics};
pub use types::*;

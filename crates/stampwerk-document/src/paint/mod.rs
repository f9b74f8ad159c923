// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Paint module: rasterizing stamp geometry onto page bitmaps.

pub mod font;
pub mod painter;

pub use font::StampFont;
pub use painter::StampPainter;

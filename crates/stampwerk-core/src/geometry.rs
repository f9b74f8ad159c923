// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stamp geometry: outlines and text placement for every stamp shape.
//
// Everything here is pure arithmetic in stamp-local coordinates: (0, 0) is the
// stamp's top-left anchor and the stamp occupies an S x S box. Angles follow
// the raster convention (y grows downwards), so angle 3π/2 points straight up
// and increasing angles sweep clockwise on screen. No font or pixel work
// happens here; the painter consumes the resulting `StampGeometry`.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use serde::{Deserialize, Serialize};

use crate::types::{Stamp, StampShape};

/// Size constants shared by every stamp. The defaults are the values the
/// interactive preview uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StampMetrics {
    /// Side of the square stamp box, S.
    pub size: f32,
    /// Width of the ring between outer and inner outline.
    pub ring_gap: f32,
    /// Inset of the arc-text radius from the outer circle.
    pub text_padding: f32,
    pub stroke_width: f32,
    pub label_font_size: f32,
    pub date_font_size: f32,
    /// Angular span (radians) of the bottom label's sub-arc, centred on the
    /// lowest point of the circle.
    pub bottom_arc_span: f32,
}

impl Default for StampMetrics {
    fn default() -> Self {
        Self {
            size: 120.0,
            ring_gap: 15.0,
            text_padding: 7.5,
            stroke_width: 2.0,
            label_font_size: 13.0,
            date_font_size: 14.0,
            bottom_arc_span: 2.0 * PI / 3.0,
        }
    }
}

/// A point in stamp-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LocalPoint {
    pub x: f32,
    pub y: f32,
}

impl LocalPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn on_circle(center: LocalPoint, radius: f32, angle: f32) -> Self {
        Self {
            x: center.x + radius * angle.cos(),
            y: center.y + radius * angle.sin(),
        }
    }
}

/// A stroked outline.
#[derive(Debug, Clone, PartialEq)]
pub enum Outline {
    Circle { center: LocalPoint, radius: f32 },
    /// Closed polygon; the last vertex connects back to the first.
    Polygon(Vec<LocalPoint>),
}

impl Outline {
    /// Vertices of the outline as a closed polyline. Circles are sampled
    /// finely enough that adjacent vertices are at most ~2 units apart.
    pub fn vertices(&self) -> Vec<LocalPoint> {
        match self {
            Self::Polygon(points) => points.clone(),
            Self::Circle { center, radius } => {
                let segments = ((TAU * radius / 2.0).ceil() as usize).max(32);
                (0..segments)
                    .map(|i| {
                        LocalPoint::on_circle(*center, *radius, TAU * i as f32 / segments as f32)
                    })
                    .collect()
            }
        }
    }
}

/// Which stamp color a piece of text takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRole {
    Label,
    Date,
}

/// A straight, horizontally centred line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub center: LocalPoint,
    pub font_size: f32,
    pub role: TextRole,
}

/// One glyph of arc text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcGlyph {
    pub ch: char,
    /// Angle at which the glyph's cell begins along the reading direction.
    pub anchor_angle: f32,
    /// Angle through the middle of the glyph's cell; the glyph is drawn here.
    pub center_angle: f32,
    /// Position of the glyph centre on the text radius.
    pub position: LocalPoint,
    /// Clockwise rotation (radians) that makes the baseline tangent to the circle.
    pub rotation: f32,
    pub font_size: f32,
}

/// Reading direction of an arc label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcDirection {
    /// Increasing angles; glyph tops face outward (upper labels).
    Clockwise,
    /// Decreasing angles; glyph tops face the centre (lower labels).
    CounterClockwise,
}

/// A circular arc that text is laid along.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextArc {
    pub center: LocalPoint,
    pub radius: f32,
    pub start: f32,
    pub span: f32,
    pub direction: ArcDirection,
}

impl TextArc {
    pub fn midpoint(&self) -> f32 {
        self.start + self.span / 2.0
    }

    /// Split `text` into glyphs and give each an equal share of the arc.
    ///
    /// Glyph `i` is anchored at `start + i * step` (mirrored for
    /// counter-clockwise arcs) and drawn centred in its cell, so the first and
    /// last glyph sit equally far from the arc midpoint.
    pub fn layout(&self, text: &str, font_size: f32) -> Vec<ArcGlyph> {
        let glyphs: Vec<char> = text.chars().collect();
        if glyphs.is_empty() {
            return Vec::new();
        }
        let step = self.span / glyphs.len() as f32;
        let end = self.start + self.span;

        glyphs
            .into_iter()
            .enumerate()
            .map(|(i, ch)| {
                let offset = i as f32 * step;
                let (anchor_angle, center_angle, rotation) = match self.direction {
                    ArcDirection::Clockwise => {
                        let center = self.start + offset + step / 2.0;
                        (self.start + offset, center, center + FRAC_PI_2)
                    }
                    ArcDirection::CounterClockwise => {
                        let center = end - offset - step / 2.0;
                        (end - offset, center, center - FRAC_PI_2)
                    }
                };
                ArcGlyph {
                    ch,
                    anchor_angle,
                    center_angle,
                    position: LocalPoint::on_circle(self.center, self.radius, center_angle),
                    rotation,
                    font_size,
                }
            })
            .collect()
    }
}

/// Where a QR bitmap is blitted inside the stamp box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BitmapBox {
    pub origin: LocalPoint,
    pub size: f32,
}

/// Complete drawing instructions for one stamp.
#[derive(Debug, Clone, PartialEq)]
pub struct StampGeometry {
    pub size: f32,
    pub stroke_width: f32,
    pub outlines: Vec<Outline>,
    pub lines: Vec<TextLine>,
    pub arc_glyphs: Vec<ArcGlyph>,
    pub bitmap: Option<BitmapBox>,
}

/// Computes [`StampGeometry`] for stamps of every shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeGeometry {
    metrics: StampMetrics,
}

impl ShapeGeometry {
    pub fn new(metrics: StampMetrics) -> Self {
        Self { metrics }
    }

    pub fn metrics(&self) -> &StampMetrics {
        &self.metrics
    }

    /// Lay out `stamp`. The shape is dispatched here and nowhere else.
    pub fn layout(&self, stamp: &Stamp) -> StampGeometry {
        let m = &self.metrics;
        let mut geometry = StampGeometry {
            size: m.size,
            stroke_width: m.stroke_width,
            outlines: Vec::new(),
            lines: Vec::new(),
            arc_glyphs: Vec::new(),
            bitmap: None,
        };

        match &stamp.shape {
            StampShape::Qr(_) => {
                geometry.bitmap = Some(BitmapBox {
                    origin: LocalPoint::new(0.0, 0.0),
                    size: m.size,
                });
                return geometry;
            }
            StampShape::Circle => self.circle(stamp, &mut geometry),
            StampShape::Square => {
                geometry.outlines = vec![
                    square(0.0, m.size),
                    square(m.ring_gap, m.size - 2.0 * m.ring_gap),
                ];
                self.block_text(stamp, &mut geometry);
            }
            StampShape::Star => {
                let center = self.center();
                let outer = m.size / 2.0;
                let inset = (outer - m.ring_gap).max(0.0);
                geometry.outlines = vec![
                    Outline::Polygon(star_vertices(center, outer, outer / 2.0)),
                    Outline::Polygon(star_vertices(center, inset, inset / 2.0)),
                ];
                self.block_text(stamp, &mut geometry);
            }
        }

        if let Some(date) = stamp.date_label() {
            geometry.lines.push(TextLine {
                text: date,
                center: self.center(),
                font_size: m.date_font_size,
                role: TextRole::Date,
            });
        }
        geometry
    }

    /// Arc used by the upper label: the whole upper semicircle, π → 2π.
    pub fn top_arc(&self) -> TextArc {
        TextArc {
            center: self.center(),
            radius: self.text_radius(),
            start: PI,
            span: PI,
            direction: ArcDirection::Clockwise,
        }
    }

    /// Arc used by the lower label: a sub-arc of 0 → π centred on π/2.
    pub fn bottom_arc(&self) -> TextArc {
        let span = self.metrics.bottom_arc_span.clamp(f32::EPSILON, PI);
        TextArc {
            center: self.center(),
            radius: self.text_radius(),
            start: FRAC_PI_2 - span / 2.0,
            span,
            direction: ArcDirection::CounterClockwise,
        }
    }

    fn center(&self) -> LocalPoint {
        LocalPoint::new(self.metrics.size / 2.0, self.metrics.size / 2.0)
    }

    fn text_radius(&self) -> f32 {
        self.metrics.size / 2.0 - self.metrics.text_padding
    }

    fn circle(&self, stamp: &Stamp, geometry: &mut StampGeometry) {
        let m = &self.metrics;
        let outer = m.size / 2.0;
        geometry.outlines = vec![
            Outline::Circle {
                center: self.center(),
                radius: outer,
            },
            Outline::Circle {
                center: self.center(),
                radius: (outer - m.ring_gap).max(0.0),
            },
        ];
        geometry.arc_glyphs = self
            .top_arc()
            .layout(&stamp.top_text.to_uppercase(), m.label_font_size);
        geometry.arc_glyphs.extend(
            self.bottom_arc()
                .layout(&stamp.bottom_text.to_uppercase(), m.label_font_size),
        );
    }

    /// Straight labels just inside the ring, shared by Square and Star.
    fn block_text(&self, stamp: &Stamp, geometry: &mut StampGeometry) {
        let m = &self.metrics;
        let inset = m.ring_gap + m.label_font_size;
        let labels = [
            (&stamp.top_text, inset),
            (&stamp.bottom_text, m.size - inset),
        ];
        for (text, y) in labels {
            if text.trim().is_empty() {
                continue;
            }
            geometry.lines.push(TextLine {
                text: text.to_uppercase(),
                center: LocalPoint::new(m.size / 2.0, y),
                font_size: m.label_font_size,
                role: TextRole::Label,
            });
        }
    }
}

fn square(origin: f32, side: f32) -> Outline {
    let far = origin + side.max(0.0);
    Outline::Polygon(vec![
        LocalPoint::new(origin, origin),
        LocalPoint::new(far, origin),
        LocalPoint::new(far, far),
        LocalPoint::new(origin, far),
    ])
}

/// Five-point star: ten vertices alternating outer/inner radius, starting
/// straight up.
pub fn star_vertices(center: LocalPoint, outer: f32, inner: f32) -> Vec<LocalPoint> {
    const SPIKES: usize = 5;
    let step = PI / SPIKES as f32;
    (0..SPIKES * 2)
        .map(|i| {
            let radius = if i % 2 == 0 { outer } else { inner };
            LocalPoint::on_circle(center, radius, -FRAC_PI_2 + i as f32 * step)
        })
        .collect()
}

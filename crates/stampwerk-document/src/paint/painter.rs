// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stamp painter: draws `StampGeometry` onto a page bitmap using the `image`,
// `imageproc` and `ab_glyph` crates.
//
// The painter never decides what a stamp looks like; it only executes the
// drawing instructions `ShapeGeometry` produced, offset to the stamp's
// canonical position. Canonical units map 1:1 onto page bitmap pixels.

use ab_glyph::{Font, PxScale, point};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_polygon_mut, draw_text_mut, text_size};
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use imageproc::point::Point;
use stampwerk_core::geometry::{
    ArcGlyph, LocalPoint, Outline, ShapeGeometry, StampGeometry, StampMetrics, TextRole,
};
use stampwerk_core::{Stamp, StampShape};

use super::font::StampFont;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Rasterizes stamps. Without a font, outlines and QR bitmaps are still drawn
/// but lettering is skipped.
#[derive(Debug, Clone)]
pub struct StampPainter {
    geometry: ShapeGeometry,
    font: Option<StampFont>,
}

impl StampPainter {
    pub fn new(metrics: StampMetrics, font: Option<StampFont>) -> Self {
        Self {
            geometry: ShapeGeometry::new(metrics),
            font,
        }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Draw `stamp` onto `canvas` at its canonical position.
    pub fn paint(&self, canvas: &mut RgbaImage, stamp: &Stamp) {
        let layout = self.geometry.layout(stamp);
        let origin = (stamp.x, stamp.y);

        if let (StampShape::Qr(bitmap), Some(target)) = (&stamp.shape, layout.bitmap) {
            let side = target.size.round().max(1.0) as u32;
            let scaled = imageops::resize(bitmap.image(), side, side, FilterType::Nearest);
            imageops::overlay(
                canvas,
                &scaled,
                (origin.0 + target.origin.x).round() as i64,
                (origin.1 + target.origin.y).round() as i64,
            );
            return;
        }

        let shape_color = stamp.style.shape_color.rgba();
        for outline in &layout.outlines {
            stroke_closed(canvas, &outline_points(outline, origin), &layout, shape_color);
        }

        let Some(font) = &self.font else {
            return;
        };
        for line in &layout.lines {
            let color = match line.role {
                TextRole::Label => stamp.style.text_color.rgba(),
                TextRole::Date => stamp.style.date_color.rgba(),
            };
            let scale = PxScale::from(line.font_size);
            let (width, height) = text_size(scale, font.font(), &line.text);
            let x = (origin.0 + line.center.x).round() as i32 - width as i32 / 2;
            let y = (origin.1 + line.center.y).round() as i32 - height as i32 / 2;
            draw_text_mut(canvas, color, x, y, scale, font.font(), &line.text);
        }

        let text_color = stamp.style.text_color.rgba();
        for glyph in &layout.arc_glyphs {
            paint_arc_glyph(canvas, font, glyph, origin, text_color);
        }
    }
}

// -- Outlines -----------------------------------------------------------------

fn outline_points(outline: &Outline, origin: (f32, f32)) -> Vec<(f32, f32)> {
    outline
        .vertices()
        .into_iter()
        .map(|LocalPoint { x, y }| (origin.0 + x, origin.1 + y))
        .collect()
}

/// Stroke a closed polyline as quads along each edge with round joins.
fn stroke_closed(
    canvas: &mut RgbaImage,
    points: &[(f32, f32)],
    layout: &StampGeometry,
    color: Rgba<u8>,
) {
    let half = layout.stroke_width / 2.0;
    let join_radius = half.round().max(1.0) as i32;

    for (i, &a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        let length = (dx * dx + dy * dy).sqrt();
        if length > f32::EPSILON {
            let (nx, ny) = (-dy / length * half, dx / length * half);
            fill_polygon(
                canvas,
                &[
                    (a.0 + nx, a.1 + ny),
                    (b.0 + nx, b.1 + ny),
                    (b.0 - nx, b.1 - ny),
                    (a.0 - nx, a.1 - ny),
                ],
                color,
            );
        }
        draw_filled_circle_mut(
            canvas,
            (a.0.round() as i32, a.1.round() as i32),
            join_radius,
            color,
        );
    }
}

/// `draw_polygon_mut` rejects polygons whose first and last points coincide,
/// so rounding duplicates are removed first.
fn fill_polygon(canvas: &mut RgbaImage, points: &[(f32, f32)], color: Rgba<u8>) {
    let mut poly: Vec<Point<i32>> = Vec::with_capacity(points.len());
    for &(x, y) in points {
        let p = Point::new(x.round() as i32, y.round() as i32);
        if poly.last() != Some(&p) {
            poly.push(p);
        }
    }
    while poly.len() > 1 && poly.first() == poly.last() {
        poly.pop();
    }
    if poly.len() >= 3 {
        draw_polygon_mut(canvas, &poly, color);
    }
}

// -- Arc lettering ------------------------------------------------------------

/// Rasterize one glyph into a transparent tile, rotate it to the arc tangent
/// and blend it centred on the glyph position.
fn paint_arc_glyph(
    canvas: &mut RgbaImage,
    font: &StampFont,
    glyph: &ArcGlyph,
    origin: (f32, f32),
    color: Rgba<u8>,
) {
    if glyph.ch.is_whitespace() {
        return;
    }
    let font = font.font();
    let positioned = font
        .glyph_id(glyph.ch)
        .with_scale_and_position(PxScale::from(glyph.font_size), point(0.0, 0.0));
    let Some(outlined) = font.outline_glyph(positioned) else {
        return;
    };

    let bounds = outlined.px_bounds();
    let (ink_w, ink_h) = (bounds.width(), bounds.height());
    // Square tile large enough that rotation never clips the ink.
    let side = (ink_w.hypot(ink_h).ceil() as u32 + 2).max(2);
    let offset_x = ((side as f32 - ink_w) / 2.0).floor() as u32;
    let offset_y = ((side as f32 - ink_h) / 2.0).floor() as u32;

    let mut tile = RgbaImage::from_pixel(side, side, TRANSPARENT);
    let Rgba([r, g, b, _]) = color;
    outlined.draw(|x, y, coverage| {
        let (px, py) = (x + offset_x, y + offset_y);
        if px < side && py < side {
            let alpha = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
            tile.put_pixel(px, py, Rgba([r, g, b, alpha]));
        }
    });

    let rotated = rotate_about_center(&tile, glyph.rotation, Interpolation::Bilinear, TRANSPARENT);
    let half = side as f32 / 2.0;
    imageops::overlay(
        canvas,
        &rotated,
        (origin.0 + glyph.position.x - half).round() as i64,
        (origin.1 + glyph.position.y - half).round() as i64,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use stampwerk_core::{CanonicalPoint, QrBitmap, StampColor, StampStyle, StampTemplate};

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn blank() -> RgbaImage {
        RgbaImage::from_pixel(300, 300, WHITE)
    }

    fn placed(template: StampTemplate, x: f32, y: f32) -> Stamp {
        Stamp::from_template(template, 0, CanonicalPoint::new(x, y))
    }

    fn style(shape: [u8; 3]) -> StampStyle {
        StampStyle {
            shape_color: StampColor(shape),
            ..StampStyle::default()
        }
    }

    fn lettered() -> StampPainter {
        let font = StampFont::embedded().expect("embedded font");
        StampPainter::new(StampMetrics::default(), Some(font))
    }

    fn is_green(p: &Rgba<u8>) -> bool {
        p.0[1] > 100 && p.0[0] < 100 && p.0[2] < 100
    }

    fn is_red(p: &Rgba<u8>) -> bool {
        p.0[0] > 100 && p.0[1] < 100 && p.0[2] < 100
    }

    #[test]
    fn circle_outline_is_stroked_in_shape_color() {
        let painter = StampPainter::new(StampMetrics::default(), None);
        let mut canvas = blank();
        let stamp = placed(
            StampTemplate::new(StampShape::Circle, "").with_style(style([0, 0, 200])),
            100.0,
            100.0,
        );
        painter.paint(&mut canvas, &stamp);

        // Rightmost point of the outer ring (centre 160,160, radius 60).
        assert_eq!(canvas.get_pixel(220, 160), &Rgba([0, 0, 200, 255]));
        // Inner ring at radius 45.
        assert_eq!(canvas.get_pixel(205, 160), &Rgba([0, 0, 200, 255]));
        // Between the rings and at the centre nothing is drawn.
        assert_eq!(canvas.get_pixel(212, 160), &WHITE);
        assert_eq!(canvas.get_pixel(160, 160), &WHITE);
    }

    #[test]
    fn square_outline_covers_its_corners() {
        let painter = StampPainter::new(StampMetrics::default(), None);
        let mut canvas = blank();
        let stamp = placed(
            StampTemplate::new(StampShape::Square, "").with_style(style([200, 0, 0])),
            10.0,
            20.0,
        );
        painter.paint(&mut canvas, &stamp);
        assert_eq!(canvas.get_pixel(10, 20), &Rgba([200, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(130, 140), &Rgba([200, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(25, 80), &Rgba([200, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(70, 80), &WHITE);
    }

    #[test]
    fn qr_bitmap_is_blitted_into_the_stamp_box() {
        let painter = StampPainter::new(StampMetrics::default(), None);
        let mut canvas = blank();
        let mut qr = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        qr.put_pixel(1, 0, WHITE);
        let stamp = placed(StampTemplate::qr(QrBitmap::new(qr)), 50.0, 50.0);
        painter.paint(&mut canvas, &stamp);

        // Nearest-neighbour: each module becomes a crisp 60x60 block.
        assert_eq!(canvas.get_pixel(50, 50), &Rgba([0, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(169, 50), &WHITE);
        assert_eq!(canvas.get_pixel(169, 169), &Rgba([0, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(170, 170), &WHITE);
    }

    #[test]
    fn stamp_hanging_off_the_page_is_clipped() {
        let painter = StampPainter::new(StampMetrics::default(), None);
        let mut canvas = blank();
        let stamp = placed(StampTemplate::new(StampShape::Star, "x"), 250.0, -40.0);
        painter.paint(&mut canvas, &stamp);
        assert_eq!(canvas.dimensions(), (300, 300));
    }

    #[test]
    fn square_label_uses_text_color() {
        let painter = lettered();
        assert!(painter.has_font());

        let mut canvas = blank();
        let template = StampTemplate::new(StampShape::Square, "MMMM").with_style(StampStyle {
            shape_color: StampColor([0, 0, 255]),
            text_color: StampColor([0, 255, 0]),
            date_color: StampColor::BLACK,
        });
        painter.paint(&mut canvas, &placed(template, 0.0, 0.0));

        let greenish = canvas.pixels().filter(|p| is_green(p)).count();
        assert!(greenish > 0, "expected lettering pixels");
    }

    #[test]
    fn circle_letters_both_arcs_and_centres_the_date() {
        let painter = lettered();
        let mut canvas = blank();
        let template = StampTemplate::new(StampShape::Circle, "APPROVED")
            .with_bottom_text("FINANCE")
            .with_date(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap())
            .with_style(StampStyle {
                shape_color: StampColor([0, 0, 255]),
                text_color: StampColor([0, 200, 0]),
                date_color: StampColor([200, 0, 0]),
            });
        painter.paint(&mut canvas, &placed(template, 0.0, 0.0));

        // Stamp box is 120x120 at the origin, so the centre is (60, 60).
        let near_centre = |x: u32, y: u32, radius: f32| {
            let (dx, dy) = (x as f32 - 60.0, y as f32 - 60.0);
            dx.hypot(dy) < radius
        };
        let mut top = 0;
        let mut bottom = 0;
        let mut green_inside = 0;
        let mut red_inside = 0;
        for (x, y, pixel) in canvas.enumerate_pixels() {
            if is_green(pixel) {
                if y < 30 {
                    top += 1;
                }
                if y > 90 {
                    bottom += 1;
                }
                if near_centre(x, y, 40.0) {
                    green_inside += 1;
                }
            }
            if is_red(pixel) && near_centre(x, y, 30.0) {
                red_inside += 1;
            }
        }
        assert!(top > 0, "top arc should be lettered");
        assert!(bottom > 0, "bottom arc should be lettered");
        assert_eq!(green_inside, 0, "arc lettering stays on the text ring");
        assert!(red_inside > 0, "date should be drawn in the date color");
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types: stamps, their visual style, pages, and upload media types.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::coords::CanonicalPoint;
use crate::error::{Result, StampwerkError};

/// Unique identifier for a placed stamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StampId(pub Uuid);

impl StampId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StampId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StampId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// -- Colors ------------------------------------------------------------------

/// An opaque sRGB color, written as `#RRGGBB` at every boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StampColor(pub [u8; 3]);

impl StampColor {
    pub const BLACK: Self = Self([0, 0, 0]);

    pub fn rgba(self) -> image::Rgba<u8> {
        let [r, g, b] = self.0;
        image::Rgba([r, g, b, 255])
    }
}

impl FromStr for StampColor {
    type Err = StampwerkError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || StampwerkError::InvalidColor(s.to_owned());
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());

        match hex.len() {
            6 => Ok(Self([
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            ])),
            // Shorthand #RGB expands each nibble.
            3 => {
                let expand = |i: usize| channel(&hex[i..=i]).map(|v| v * 17);
                Ok(Self([expand(0)?, expand(1)?, expand(2)?]))
            }
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for StampColor {
    type Error = StampwerkError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<StampColor> for String {
    fn from(color: StampColor) -> Self {
        color.to_string()
    }
}

impl fmt::Display for StampColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02X}{g:02X}{b:02X}")
    }
}

/// The three caller-supplied colors of a stamp. Colors are never implied by
/// the shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StampStyle {
    pub shape_color: StampColor,
    pub text_color: StampColor,
    pub date_color: StampColor,
}

impl Default for StampStyle {
    fn default() -> Self {
        Self {
            shape_color: StampColor([0xFF, 0x57, 0x33]),
            text_color: StampColor::BLACK,
            date_color: StampColor::BLACK,
        }
    }
}

// -- Shapes ------------------------------------------------------------------

/// A ready-made QR bitmap supplied by an external collaborator.
///
/// Cloning shares the pixels, so registry snapshots stay cheap.
#[derive(Clone, PartialEq)]
pub struct QrBitmap(Arc<RgbaImage>);

impl QrBitmap {
    pub fn new(image: RgbaImage) -> Self {
        Self(Arc::new(image))
    }

    pub fn image(&self) -> &RgbaImage {
        &self.0
    }
}

impl fmt::Debug for QrBitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QrBitmap({}x{})", self.0.width(), self.0.height())
    }
}

/// The visual kind of a stamp.
#[derive(Debug, Clone, PartialEq)]
pub enum StampShape {
    Circle,
    Square,
    Star,
    /// Carries its bitmap; text fields and outline colors are ignored.
    Qr(QrBitmap),
}

impl StampShape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Circle => ShapeKind::Circle,
            Self::Square => ShapeKind::Square,
            Self::Star => ShapeKind::Star,
            Self::Qr(_) => ShapeKind::Qr,
        }
    }
}

/// Shape discriminant as it appears in persisted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Circle,
    Square,
    Star,
    #[serde(rename = "QR")]
    Qr,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Circle => "Circle",
            Self::Square => "Square",
            Self::Star => "Star",
            Self::Qr => "QR",
        };
        f.write_str(name)
    }
}

// -- Templates and stamps ----------------------------------------------------

/// Visual fields of a stamp that has been chosen but not yet placed.
#[derive(Debug, Clone, PartialEq)]
pub struct StampTemplate {
    pub shape: StampShape,
    pub style: StampStyle,
    pub top_text: String,
    pub bottom_text: String,
    pub date: Option<NaiveDate>,
}

/// Labels offered as ready-made stamps.
pub const PRESET_LABELS: [&str; 3] = ["CONFIDENTIAL", "TOP SECRET", "APPROVED"];

impl StampTemplate {
    pub fn new(shape: StampShape, top_text: impl Into<String>) -> Self {
        Self {
            shape,
            style: StampStyle::default(),
            top_text: top_text.into(),
            bottom_text: String::new(),
            date: None,
        }
    }

    /// A circle seal carrying one of [`PRESET_LABELS`].
    pub fn preset(label: &str, style: StampStyle) -> Option<Self> {
        PRESET_LABELS
            .iter()
            .find(|preset| preset.eq_ignore_ascii_case(label))
            .map(|preset| Self {
                style,
                ..Self::new(StampShape::Circle, *preset)
            })
    }

    /// A QR stamp wrapping an externally supplied bitmap.
    pub fn qr(bitmap: QrBitmap) -> Self {
        Self::new(StampShape::Qr(bitmap), String::new())
    }

    pub fn with_style(mut self, style: StampStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_bottom_text(mut self, text: impl Into<String>) -> Self {
        self.bottom_text = text.into();
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

/// A stamp placed on a page. Position is canonical (unzoomed, page-relative,
/// top-left anchor).
#[derive(Debug, Clone, PartialEq)]
pub struct Stamp {
    pub id: StampId,
    pub shape: StampShape,
    pub page_index: usize,
    pub x: f32,
    pub y: f32,
    pub style: StampStyle,
    pub top_text: String,
    pub bottom_text: String,
    pub date: Option<NaiveDate>,
}

impl Stamp {
    /// Commit a template at a canonical position with a freshly generated id.
    pub fn from_template(template: StampTemplate, page_index: usize, at: CanonicalPoint) -> Self {
        let StampTemplate {
            shape,
            style,
            top_text,
            bottom_text,
            date,
        } = template;
        Self {
            id: StampId::new(),
            shape,
            page_index,
            x: at.x,
            y: at.y,
            style,
            top_text,
            bottom_text,
            date,
        }
    }

    pub fn position(&self) -> CanonicalPoint {
        CanonicalPoint::new(self.x, self.y)
    }

    /// The date label as drawn on the stamp.
    pub fn date_label(&self) -> Option<String> {
        self.date.map(|d| d.format("%Y-%m-%d").to_string())
    }

    /// Persistence shape; the QR bitmap does not survive.
    pub fn to_record(&self) -> StampRecord {
        StampRecord {
            id: self.id,
            shape: self.shape.kind(),
            page_index: self.page_index,
            x: self.x,
            y: self.y,
            shape_color: self.style.shape_color,
            text_color: self.style.text_color,
            date_color: self.style.date_color,
            top_text: self.top_text.clone(),
            bottom_text: self.bottom_text.clone(),
            date: self.date,
        }
    }

    /// Rebuild a stamp from its record. QR records need their bitmap
    /// re-supplied by the caller.
    pub fn from_record(record: StampRecord, qr: Option<QrBitmap>) -> Result<Self> {
        let shape = match (record.shape, qr) {
            (ShapeKind::Circle, _) => StampShape::Circle,
            (ShapeKind::Square, _) => StampShape::Square,
            (ShapeKind::Star, _) => StampShape::Star,
            (ShapeKind::Qr, Some(bitmap)) => StampShape::Qr(bitmap),
            (ShapeKind::Qr, None) => {
                return Err(StampwerkError::ImageError(format!(
                    "QR stamp {} has no bitmap",
                    record.id
                )));
            }
        };
        Ok(Self {
            id: record.id,
            shape,
            page_index: record.page_index,
            x: record.x,
            y: record.y,
            style: StampStyle {
                shape_color: record.shape_color,
                text_color: record.text_color,
                date_color: record.date_color,
            },
            top_text: record.top_text,
            bottom_text: record.bottom_text,
            date: record.date,
        })
    }
}

/// Flat, serialisable stamp record exchanged with persistence collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StampRecord {
    pub id: StampId,
    pub shape: ShapeKind,
    pub page_index: usize,
    pub x: f32,
    pub y: f32,
    pub shape_color: StampColor,
    pub text_color: StampColor,
    pub date_color: StampColor,
    pub top_text: String,
    #[serde(default)]
    pub bottom_text: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

// -- Pages -------------------------------------------------------------------

/// Fixed page box in canonical units (one unit = one output pixel = one PDF point).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: u32,
    pub height: u32,
}

impl PageSize {
    /// A4 portrait at 72 units per inch.
    pub const A4: Self = Self {
        width: 595,
        height: 842,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

/// Where a page bitmap lands inside its page box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

/// One rasterized page. Immutable once created.
#[derive(Debug, Clone)]
pub struct Page {
    bitmap: Arc<RgbaImage>,
    size: PageSize,
}

impl Page {
    pub fn new(bitmap: RgbaImage, size: PageSize) -> Self {
        Self {
            bitmap: Arc::new(bitmap),
            size,
        }
    }

    pub fn bitmap(&self) -> &RgbaImage {
        &self.bitmap
    }

    pub fn size(&self) -> PageSize {
        self.size
    }

    /// Fit the bitmap into the page box, preserving aspect ratio, centred.
    pub fn placement(&self) -> Placement {
        let (w, h) = self.bitmap.dimensions();
        if w == 0 || h == 0 || self.size.width == 0 || self.size.height == 0 {
            return Placement {
                x: 0,
                y: 0,
                width: 0,
                height: 0,
            };
        }
        let scale = (self.size.width as f32 / w as f32).min(self.size.height as f32 / h as f32);
        let width = ((w as f32 * scale).round() as u32).max(1).min(self.size.width);
        let height = ((h as f32 * scale).round() as u32).max(1).min(self.size.height);
        Placement {
            x: i64::from((self.size.width - width) / 2),
            y: i64::from((self.size.height - height) / 2),
            width,
            height,
        }
    }
}

// -- Media types -------------------------------------------------------------

/// Upload media types the rasterizer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaType {
    /// Any single still image (`image/*`).
    Image,
    /// A paginated PDF document.
    Pdf,
}

impl MediaType {
    /// Classify a declared MIME type. Parameters (`; charset=…`) are ignored.
    pub fn from_mime(mime: &str) -> Result<Self> {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "application/pdf" | "application/x-pdf" => Ok(Self::Pdf),
            other if other.starts_with("image/") && other.len() > "image/".len() => {
                Ok(Self::Image)
            }
            _ => Err(StampwerkError::UnsupportedMediaType(mime.to_owned())),
        }
    }

    /// Infer the MIME type from a file extension.
    pub fn mime_from_extension(ext: &str) -> Option<&'static str> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some("application/pdf"),
            "jpg" | "jpeg" => Some("image/jpeg"),
            "png" => Some("image/png"),
            "gif" => Some("image/gif"),
            "bmp" => Some("image/bmp"),
            "tif" | "tiff" => Some("image/tiff"),
            "webp" => Some("image/webp"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_parses_long_and_short_hex() {
        assert_eq!("#FF5733".parse::<StampColor>().unwrap(), StampColor([255, 87, 51]));
        assert_eq!("#0a0".parse::<StampColor>().unwrap(), StampColor([0, 170, 0]));
        assert_eq!(StampColor([255, 87, 51]).to_string(), "#FF5733");
    }

    #[test]
    fn color_rejects_garbage() {
        for bad in ["FF5733", "#FF57", "#GGGGGG", "", "#ÿÿÿ"] {
            assert!(
                matches!(bad.parse::<StampColor>(), Err(StampwerkError::InvalidColor(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn record_drops_qr_bitmap() {
        let bitmap = QrBitmap::new(RgbaImage::new(4, 4));
        let stamp = Stamp::from_template(
            StampTemplate::qr(bitmap.clone()),
            1,
            CanonicalPoint::new(10.0, 20.0),
        );
        let record = stamp.to_record();
        assert_eq!(record.shape, ShapeKind::Qr);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["shape"], "QR");
        assert_eq!(json["pageIndex"], 1);

        assert!(Stamp::from_record(record.clone(), None).is_err());
        let rebuilt = Stamp::from_record(record, Some(bitmap)).unwrap();
        assert_eq!(rebuilt, stamp);
    }

    #[test]
    fn record_json_uses_hex_colors() {
        let template = StampTemplate::new(StampShape::Circle, "approved")
            .with_date(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        let stamp = Stamp::from_template(template, 0, CanonicalPoint::new(1.0, 2.0));
        let json = serde_json::to_string(&stamp.to_record()).unwrap();
        assert!(json.contains("\"shapeColor\":\"#FF5733\""));
        assert!(json.contains("\"date\":\"2026-03-01\""));

        let back: StampRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stamp.to_record());
        assert_eq!(stamp.date_label().as_deref(), Some("2026-03-01"));
    }

    #[test]
    fn preset_lookup_is_case_insensitive() {
        let template = StampTemplate::preset("approved", StampStyle::default()).unwrap();
        assert_eq!(template.top_text, "APPROVED");
        assert_eq!(template.shape, StampShape::Circle);
        assert!(StampTemplate::preset("void", StampStyle::default()).is_none());
    }

    #[test]
    fn media_type_classification() {
        assert_eq!(MediaType::from_mime("image/png").unwrap(), MediaType::Image);
        assert_eq!(MediaType::from_mime("Application/PDF").unwrap(), MediaType::Pdf);
        assert_eq!(
            MediaType::from_mime("image/jpeg; q=0.9").unwrap(),
            MediaType::Image
        );
        assert!(matches!(
            MediaType::from_mime("text/plain"),
            Err(StampwerkError::UnsupportedMediaType(_))
        ));
        assert!(MediaType::from_mime("image/").is_err());
        assert_eq!(MediaType::mime_from_extension("JPG"), Some("image/jpeg"));
        assert_eq!(MediaType::mime_from_extension("docx"), None);
    }

    #[test]
    fn small_bitmap_is_fitted_and_centred() {
        let page = Page::new(RgbaImage::new(100, 50), PageSize::new(200, 200));
        let placement = page.placement();
        assert_eq!((placement.width, placement.height), (200, 100));
        assert_eq!((placement.x, placement.y), (0, 50));
    }

    #[test]
    fn empty_page_box_places_nothing() {
        for size in [PageSize::new(0, 0), PageSize::new(0, 100), PageSize::new(100, 0)] {
            let page = Page::new(RgbaImage::new(10, 10), size);
            let placement = page.placement();
            assert_eq!((placement.width, placement.height), (0, 0));
        }
    }

    #[test]
    fn extreme_aspect_keeps_at_least_one_pixel() {
        let page = Page::new(RgbaImage::new(10_000, 1), PageSize::new(100, 100));
        let placement = page.placement();
        assert_eq!((placement.width, placement.height), (100, 1));
    }
}

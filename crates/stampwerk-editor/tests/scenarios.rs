// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end editing scenarios: upload, place, authorize, drag, delete, composite.

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use stampwerk_core::error::StampwerkError;
use stampwerk_core::{
    CanonicalPoint, EngineConfig, Page, PageSize, QrBitmap, ShapeKind, StampShape, StampTemplate,
    ViewPoint,
};
use stampwerk_document::{PageRasterizer, PdfPageRenderer, PdfWriter};
use stampwerk_editor::{
    Actor, ActorRole, AuthorizationOutcome, ClickOutcome, ControllerState, Document,
    EditorSession, QrProvider, RolePolicy,
};

const GREY: Rgba<u8> = Rgba([200, 200, 200, 255]);
const DEFAULT_SHAPE: Rgba<u8> = Rgba([255, 87, 51, 255]);

/// Paints every page a flat grey at the requested size.
struct FlatRenderer;

impl PdfPageRenderer for FlatRenderer {
    fn render_page(
        &self,
        _document: &[u8],
        _page_index: usize,
        width: u32,
        height: u32,
    ) -> Result<RgbaImage, StampwerkError> {
        Ok(RgbaImage::from_pixel(width, height, GREY))
    }
}

struct BlackQr;

impl QrProvider for BlackQr {
    fn qr_for(&self, _document_id: &str) -> Result<QrBitmap, StampwerkError> {
        Ok(QrBitmap::new(RgbaImage::from_pixel(21, 21, Rgba([0, 0, 0, 255]))))
    }
}

fn grey_pages(count: usize) -> Vec<Page> {
    (0..count)
        .map(|_| Page::new(RgbaImage::from_pixel(595, 842, GREY), PageSize::A4))
        .collect()
}

fn session(role: ActorRole, pages: usize) -> EditorSession {
    EditorSession::new(
        EngineConfig::default(),
        Document::new(grey_pages(pages)),
        Actor::new(role, false),
        Box::new(RolePolicy),
        None,
    )
}

fn two_page_pdf() -> Vec<u8> {
    let blank = RgbaImage::from_pixel(595, 842, Rgba([255, 255, 255, 255]));
    PdfWriter::new(PageSize::A4)
        .write_pages(&[blank.clone(), blank])
        .expect("write source pdf")
}

fn place(
    session: &mut EditorSession,
    template: StampTemplate,
    at: ViewPoint,
) -> stampwerk_core::StampId {
    session.choose(template).expect("choose");
    match session.click(Some(at)).expect("click") {
        ClickOutcome::Committed(id) => id,
        other => panic!("expected an immediate commit, got {other:?}"),
    }
}

#[tokio::test]
async fn upload_place_and_composite_two_pages() {
    let mut session = session(ActorRole::Company, 0);
    let rasterizer = PageRasterizer::new(PageSize::A4).with_renderer(FlatRenderer);
    session
        .upload(&rasterizer, &two_page_pdf(), "application/pdf")
        .await
        .expect("upload");
    assert_eq!(session.document().page_count(), 2);

    let id = place(
        &mut session,
        StampTemplate::new(StampShape::Circle, "APPROVED"),
        ViewPoint::new(100.0, 100.0),
    );
    let on_first: Vec<_> = session.document().stamps().list_for_page(0).collect();
    assert_eq!(on_first.len(), 1);
    assert_eq!(on_first[0].id, id);
    assert_eq!(on_first[0].position(), CanonicalPoint::new(100.0, 100.0));

    let output = session.composite().await.expect("composite");
    assert_eq!(output.pages.len(), 2);
    // Right edge of the ring: centre (160, 160), radius 60.
    assert_eq!(output.pages[0].get_pixel(220, 160), &DEFAULT_SHAPE);
    assert_eq!(output.pages[1].get_pixel(220, 160), &GREY);
    assert!(output.pdf.starts_with(b"%PDF"));
    assert_eq!(output.sha256.len(), 64);
}

#[test]
fn unverified_individual_waits_and_cancel_leaves_registry_alone() {
    let mut session = session(ActorRole::Individual, 1);
    session
        .choose(StampTemplate::new(StampShape::Square, "PAID"))
        .expect("choose");

    let outcome = session.click(Some(ViewPoint::new(40.0, 40.0))).expect("click");
    assert_eq!(outcome, ClickOutcome::AwaitingAuthorization);
    assert!(matches!(session.state(), ControllerState::AwaitingAuthorization(_)));
    assert!(session.document().stamps().is_empty());

    let err = session.resume(AuthorizationOutcome::Cancelled).unwrap_err();
    assert!(matches!(err, StampwerkError::AuthorizationCancelled));
    assert!(err.is_recoverable());
    assert_eq!(session.state(), &ControllerState::Idle);
    assert!(session.document().stamps().is_empty());
}

#[test]
fn granted_authorization_commits_where_the_user_clicked() {
    let mut session = session(ActorRole::Individual, 1);
    session
        .choose(StampTemplate::new(StampShape::Square, "PAID"))
        .expect("choose");
    session.click(Some(ViewPoint::new(40.0, 60.0))).expect("click");
    session.set_zoom(3.0);

    let id = session
        .resume(AuthorizationOutcome::Granted)
        .expect("resume")
        .expect("stamp committed");
    let stamp = session.document().stamps().get(id).expect("stamp exists");
    assert_eq!(stamp.position(), CanonicalPoint::new(40.0, 60.0));
    assert_eq!(session.state(), &ControllerState::Idle);
}

#[test]
fn drag_at_double_zoom_stores_canonical_position() {
    let mut session = session(ActorRole::Company, 2);
    let first = place(
        &mut session,
        StampTemplate::new(StampShape::Star, "OK"),
        ViewPoint::new(50.0, 50.0),
    );
    let second = place(
        &mut session,
        StampTemplate::new(StampShape::Star, "OK"),
        ViewPoint::new(50.0, 842.0 + 50.0),
    );

    session.set_zoom(2.0);
    session
        .drag_end(first, Some(ViewPoint::new(160.0, 160.0)))
        .expect("drag first");
    session
        .drag_end(second, Some(ViewPoint::new(160.0, 1684.0 + 160.0)))
        .expect("drag second");

    let stamps = session.document().stamps();
    assert_eq!(stamps.get(first).unwrap().position(), CanonicalPoint::new(80.0, 80.0));
    let moved = stamps.get(second).unwrap();
    assert_eq!(moved.page_index, 1);
    assert_eq!(moved.position(), CanonicalPoint::new(80.0, 80.0));
}

#[test]
fn drag_is_not_gated_by_authorization() {
    let mut session = session(ActorRole::Individual, 1);
    session
        .choose(StampTemplate::new(StampShape::Circle, "A"))
        .expect("choose");
    session.click(Some(ViewPoint::new(10.0, 10.0))).expect("click");
    let id = session
        .resume(AuthorizationOutcome::Granted)
        .expect("resume")
        .expect("committed");

    session
        .drag_end(id, Some(ViewPoint::new(300.0, 400.0)))
        .expect("drag");
    let stamp = session.document().stamps().get(id).unwrap();
    assert_eq!(stamp.position(), CanonicalPoint::new(300.0, 400.0));
}

#[test]
fn deleting_an_unknown_stamp_is_a_soft_failure() {
    let mut session = session(ActorRole::Company, 1);
    place(
        &mut session,
        StampTemplate::new(StampShape::Circle, "KEEP"),
        ViewPoint::new(10.0, 10.0),
    );

    let err = session.delete(stampwerk_core::StampId::new()).unwrap_err();
    assert!(matches!(err, StampwerkError::UnknownStampReference(_)));
    assert!(err.is_recoverable());
    assert_eq!(session.document().stamps().len(), 1);
}

#[test]
fn deleted_and_replaced_stamp_renders_on_top() {
    let mut session = session(ActorRole::Company, 1);
    let at = ViewPoint::new(10.0, 10.0);
    place(&mut session, StampTemplate::new(StampShape::Circle, "A"), at);
    let b = place(&mut session, StampTemplate::new(StampShape::Circle, "B"), at);
    place(&mut session, StampTemplate::new(StampShape::Circle, "C"), at);

    session.delete(b).expect("delete");
    place(&mut session, StampTemplate::new(StampShape::Circle, "B"), at);

    let order: Vec<&str> = session
        .document()
        .stamps()
        .list_all()
        .map(|stamp| stamp.top_text.as_str())
        .collect();
    assert_eq!(order, ["A", "C", "B"]);
}

#[tokio::test]
async fn compositing_twice_gives_identical_output() {
    let mut session = session(ActorRole::Company, 2);
    place(
        &mut session,
        StampTemplate::new(StampShape::Circle, "APPROVED").with_bottom_text("FINANCE"),
        ViewPoint::new(100.0, 100.0),
    );
    session.choose_qr(&BlackQr, "doc-42").expect("choose qr");
    session
        .click(Some(ViewPoint::new(300.0, 842.0 + 300.0)))
        .expect("place qr");

    let first = session.composite().await.expect("first composite");
    let second = session.composite().await.expect("second composite");
    assert_eq!(first.pages, second.pages);
    assert_eq!(first.pdf, second.pdf);
    assert_eq!(first.sha256, second.sha256);

    let qr = session.document().stamps().list_for_page(1).next().unwrap();
    assert_eq!(qr.shape.kind(), ShapeKind::Qr);
    assert_eq!(first.pages[1].get_pixel(360, 360), &Rgba([0, 0, 0, 255]));
}

#[tokio::test]
async fn failed_upload_keeps_the_open_document() {
    let mut session = session(ActorRole::Company, 2);
    place(
        &mut session,
        StampTemplate::new(StampShape::Circle, "KEEP"),
        ViewPoint::new(10.0, 10.0),
    );
    let rasterizer = PageRasterizer::new(PageSize::A4);

    let err = session
        .upload(&rasterizer, b"plain text", "text/plain")
        .await
        .unwrap_err();
    assert!(matches!(err, StampwerkError::UnsupportedMediaType(_)));

    let err = session
        .upload(&rasterizer, b"%PDF-1.7 truncated", "application/pdf")
        .await
        .unwrap_err();
    assert!(matches!(err, StampwerkError::RasterizationFailure { .. }));

    assert_eq!(session.document().page_count(), 2);
    assert_eq!(session.document().stamps().len(), 1);
}

#[tokio::test]
async fn new_upload_replaces_document_and_disarms() {
    let mut session = session(ActorRole::Company, 2);
    place(
        &mut session,
        StampTemplate::new(StampShape::Circle, "OLD"),
        ViewPoint::new(10.0, 10.0),
    );
    session
        .choose(StampTemplate::new(StampShape::Square, "ARMED"))
        .expect("choose");

    let mut png = Vec::new();
    RgbaImage::from_pixel(40, 30, GREY)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .expect("encode png");
    let rasterizer = PageRasterizer::new(PageSize::A4);
    session
        .upload(&rasterizer, &png, "image/png")
        .await
        .expect("upload");

    assert_eq!(session.document().page_count(), 1);
    assert!(session.document().stamps().is_empty());
    assert_eq!(session.state(), &ControllerState::Idle);
    assert_eq!(session.viewport().page_count(), 1);
}

#[test]
fn clicks_off_the_page_are_reported_and_can_be_retried() {
    let mut session = session(ActorRole::Company, 1);
    session
        .choose(StampTemplate::new(StampShape::Circle, "RETRY"))
        .expect("choose");

    let err = session.click(None).unwrap_err();
    assert!(matches!(err, StampwerkError::PointerResolutionFailure));
    let err = session.click(Some(ViewPoint::new(10.0, 900.0))).unwrap_err();
    assert!(matches!(err, StampwerkError::PointerResolutionFailure));

    let outcome = session.click(Some(ViewPoint::new(10.0, 10.0))).expect("retry");
    assert!(matches!(outcome, ClickOutcome::Committed(_)));
}

#[test]
fn preview_follows_the_zoom() {
    let mut session = session(ActorRole::Company, 1);
    session.zoom_in();
    session.zoom_out();
    session.set_zoom(2.0);
    let preview = session.preview(0).expect("preview");
    assert_eq!(preview.dimensions(), (1190, 1684));

    session.scroll_to(-10.0);
    assert_eq!(session.viewport().scroll_top(), 0.0);
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stamp plans: a JSON script of user actions replayed through an editor
// session, standing in for the pointer events a UI would deliver.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use stampwerk_core::error::StampwerkError;
use stampwerk_core::human_errors::humanize_error;
use stampwerk_core::{QrBitmap, ShapeKind, StampColor, StampShape, StampStyle, StampTemplate, ViewPoint};
use stampwerk_editor::{
    Actor, ActorRole, AuthorizationOutcome, ClickOutcome, EditorSession, QrProvider,
};
use tracing::{debug, info, warn};

/// A whole plan file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    #[serde(default = "default_actor")]
    pub actor: Actor,
    /// Identifier handed to the QR provider.
    #[serde(default = "default_document_id")]
    pub document_id: String,
    /// Image file used as the QR bitmap for `QR` placements.
    #[serde(default)]
    pub qr_image: Option<PathBuf>,
    /// Reply to deliver whenever a placement waits for verification.
    #[serde(default)]
    pub authorization: Authorization,
    pub placements: Vec<PlannedStamp>,
}

fn default_actor() -> Actor {
    Actor::new(ActorRole::Company, false)
}

fn default_document_id() -> String {
    "document".into()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Authorization {
    #[default]
    Granted,
    Cancelled,
    Denied,
}

impl From<Authorization> for AuthorizationOutcome {
    fn from(reply: Authorization) -> Self {
        match reply {
            Authorization::Granted => Self::Granted,
            Authorization::Cancelled => Self::Cancelled,
            Authorization::Denied => Self::Denied,
        }
    }
}

/// One stamp to choose and drop. `x`/`y` are view coordinates in the
/// stacked page column at the session's zoom, like a click would carry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedStamp {
    pub shape: ShapeKind,
    #[serde(default)]
    pub top_text: String,
    #[serde(default)]
    pub bottom_text: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub shape_color: Option<StampColor>,
    #[serde(default)]
    pub text_color: Option<StampColor>,
    #[serde(default)]
    pub date_color: Option<StampColor>,
    pub x: f32,
    pub y: f32,
}

impl PlannedStamp {
    /// Template for an outline shape. `QR` stamps are armed through a
    /// [`QrProvider`] instead.
    fn template(&self, shape: StampShape) -> StampTemplate {
        let defaults = StampStyle::default();
        let style = StampStyle {
            shape_color: self.shape_color.unwrap_or(defaults.shape_color),
            text_color: self.text_color.unwrap_or(defaults.text_color),
            date_color: self.date_color.unwrap_or(defaults.date_color),
        };
        let template = StampTemplate::new(shape, self.top_text.clone())
            .with_style(style)
            .with_bottom_text(self.bottom_text.clone());
        match self.date {
            Some(date) => template.with_date(date),
            None => template,
        }
    }
}

impl Plan {
    pub fn load(path: &Path) -> Result<Self, StampwerkError> {
        let data = std::fs::read_to_string(path)?;
        let plan: Self = serde_json::from_str(&data)?;
        debug!(path = %path.display(), placements = plan.placements.len(), "Plan loaded");
        Ok(plan)
    }
}

/// Serves one image file as the QR bitmap for every document.
pub struct ImageQrProvider {
    path: PathBuf,
}

impl ImageQrProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl QrProvider for ImageQrProvider {
    fn qr_for(&self, document_id: &str) -> Result<QrBitmap, StampwerkError> {
        let image = image::open(&self.path).map_err(|err| {
            StampwerkError::ImageError(format!(
                "failed to read QR image {}: {}",
                self.path.display(),
                err
            ))
        })?;
        debug!(document_id, path = %self.path.display(), "QR bitmap loaded");
        Ok(QrBitmap::new(image.to_rgba8()))
    }
}

/// How a replay went.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub placed: usize,
    pub skipped: usize,
}

/// Replay every placement through `session`. Soft failures skip that
/// placement with a warning; anything else aborts the replay.
pub fn replay(
    plan: &Plan,
    session: &mut EditorSession,
    qr: Option<&dyn QrProvider>,
) -> Result<ReplaySummary, StampwerkError> {
    let mut summary = ReplaySummary::default();
    for (index, planned) in plan.placements.iter().enumerate() {
        match place(plan, planned, session, qr) {
            Ok(true) => summary.placed += 1,
            Ok(false) => summary.skipped += 1,
            Err(err) if err.is_recoverable() => {
                session.cancel();
                let human = humanize_error(&err);
                warn!(placement = index + 1, error = %err, hint = %human.suggestion, "Placement skipped");
                summary.skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }
    info!(placed = summary.placed, skipped = summary.skipped, "Plan replayed");
    Ok(summary)
}

fn place(
    plan: &Plan,
    planned: &PlannedStamp,
    session: &mut EditorSession,
    qr: Option<&dyn QrProvider>,
) -> Result<bool, StampwerkError> {
    match planned.shape {
        ShapeKind::Qr => {
            let provider = qr.ok_or_else(|| {
                StampwerkError::Config("plan has a QR placement but no qrImage".into())
            })?;
            session.choose_qr(provider, &plan.document_id)?;
        }
        ShapeKind::Circle => session.choose(planned.template(StampShape::Circle))?,
        ShapeKind::Square => session.choose(planned.template(StampShape::Square))?,
        ShapeKind::Star => session.choose(planned.template(StampShape::Star))?,
    }

    match session.click(Some(ViewPoint::new(planned.x, planned.y)))? {
        ClickOutcome::Committed(_) => Ok(true),
        ClickOutcome::AwaitingAuthorization => {
            let committed = session.resume(plan.authorization.into())?;
            Ok(committed.is_some())
        }
        ClickOutcome::Ignored => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use stampwerk_core::{EngineConfig, Page, PageSize};
    use stampwerk_editor::{Document, RolePolicy};

    fn session(actor: Actor) -> EditorSession {
        let pages = (0..2)
            .map(|_| Page::new(RgbaImage::new(595, 842), PageSize::A4))
            .collect();
        EditorSession::new(
            EngineConfig::default(),
            Document::new(pages),
            actor,
            Box::new(RolePolicy),
            None,
        )
    }

    fn write_plan(dir: &Path, json: &str) -> PathBuf {
        let path = dir.join("plan.json");
        std::fs::write(&path, json).expect("write plan");
        path
    }

    #[test]
    fn plan_file_parses_with_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_plan(
            dir.path(),
            r##"{
                "placements": [
                    { "shape": "Circle", "topText": "APPROVED", "date": "2026-03-01",
                      "shapeColor": "#0000FF", "x": 100, "y": 100 },
                    { "shape": "QR", "x": 10, "y": 900 }
                ]
            }"##,
        );
        let plan = Plan::load(&path).expect("load");
        assert_eq!(plan.actor, Actor::new(ActorRole::Company, false));
        assert_eq!(plan.authorization, Authorization::Granted);
        assert_eq!(plan.placements.len(), 2);

        let template = plan.placements[0].template(StampShape::Circle);
        assert_eq!(template.style.shape_color, StampColor([0, 0, 255]));
        assert_eq!(template.style.text_color, StampColor::BLACK);
        assert_eq!(template.date, NaiveDate::from_ymd_opt(2026, 3, 1));
        assert_eq!(plan.placements[1].shape, ShapeKind::Qr);
    }

    #[test]
    fn bad_color_is_rejected_at_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_plan(
            dir.path(),
            r##"{ "placements": [ { "shape": "Star", "shapeColor": "red", "x": 1, "y": 1 } ] }"##,
        );
        assert!(matches!(
            Plan::load(&path),
            Err(StampwerkError::Serialization(_))
        ));
    }

    #[test]
    fn replay_places_and_skips_off_page_clicks() {
        let plan: Plan = serde_json::from_str(
            r#"{
                "placements": [
                    { "shape": "Square", "topText": "PAID", "x": 50, "y": 50 },
                    { "shape": "Star", "x": 50, "y": 5000 },
                    { "shape": "Circle", "x": 50, "y": 900 }
                ]
            }"#,
        )
        .expect("plan");
        let mut session = session(plan.actor);
        let summary = replay(&plan, &mut session, None).expect("replay");
        assert_eq!(summary, ReplaySummary { placed: 2, skipped: 1 });
        assert_eq!(session.document().stamps().list_for_page(1).count(), 1);
    }

    #[test]
    fn cancelled_verification_places_nothing() {
        let plan: Plan = serde_json::from_str(
            r#"{
                "actor": { "role": "INDIVIDUAL" },
                "authorization": "CANCELLED",
                "placements": [ { "shape": "Circle", "x": 50, "y": 50 } ]
            }"#,
        )
        .expect("plan");
        let mut session = session(plan.actor);
        let summary = replay(&plan, &mut session, None).expect("replay");
        assert_eq!(summary, ReplaySummary { placed: 0, skipped: 1 });
        assert!(session.document().stamps().is_empty());
    }

    #[test]
    fn qr_placement_uses_the_image_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let qr_path = dir.path().join("qr.png");
        RgbaImage::from_pixel(25, 25, Rgba([0, 0, 0, 255]))
            .save(&qr_path)
            .expect("save qr");

        let plan: Plan = serde_json::from_str(
            r#"{ "placements": [ { "shape": "QR", "x": 20, "y": 20 } ] }"#,
        )
        .expect("plan");
        let provider = ImageQrProvider::new(&qr_path);
        let mut session = session(plan.actor);
        replay(&plan, &mut session, Some(&provider as &dyn QrProvider)).expect("replay");

        let stamp = session.document().stamps().list_all().next().expect("stamp");
        assert_eq!(stamp.shape.kind(), ShapeKind::Qr);
    }

    #[test]
    fn qr_placement_without_image_aborts() {
        let plan: Plan = serde_json::from_str(
            r#"{ "placements": [ { "shape": "QR", "x": 20, "y": 20 } ] }"#,
        )
        .expect("plan");
        let mut session = session(plan.actor);
        assert!(matches!(
            replay(&plan, &mut session, None),
            Err(StampwerkError::Config(_))
        ));
    }

    #[test]
    fn missing_qr_image_is_an_image_error() {
        let provider = ImageQrProvider::new("/nonexistent/qr.png");
        assert!(matches!(
            provider.qr_for("doc"),
            Err(StampwerkError::ImageError(_))
        ));
    }
}

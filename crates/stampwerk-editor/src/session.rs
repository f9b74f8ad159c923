// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Editor session: one open document and the user actions performed on it.
//
// The session is the single owner of the registry. Every mutation goes through
// the interaction controller; compositing and previews read a snapshot.

use image::RgbaImage;
use stampwerk_core::error::StampwerkError;
use stampwerk_core::{EngineConfig, Stamp, StampId, StampTemplate, ViewPoint};
use stampwerk_document::{CompositeOutput, DocumentCompositor, PageRasterizer, StampFont};
use tracing::{info, instrument, warn};

use crate::collaborators::{Actor, PlacementPolicy, QrProvider};
use crate::controller::{AuthorizationOutcome, ClickOutcome, ControllerState, InteractionController};
use crate::document::Document;
use crate::viewport::Viewport;

/// One open document plus the viewport and placement controller acting on it.
pub struct EditorSession {
    config: EngineConfig,
    document: Document,
    viewport: Viewport,
    controller: InteractionController,
    actor: Actor,
    policy: Box<dyn PlacementPolicy>,
    compositor: DocumentCompositor,
}

impl EditorSession {
    /// `font` overrides the embedded lettering font.
    pub fn new(
        config: EngineConfig,
        document: Document,
        actor: Actor,
        policy: Box<dyn PlacementPolicy>,
        font: Option<StampFont>,
    ) -> Self {
        let viewport = Viewport::new(config.page, document.page_count(), config.zoom);
        let compositor = DocumentCompositor::new(&config, font);
        info!(pages = document.page_count(), role = ?actor.role, "Editor session opened");
        Self {
            config,
            document,
            viewport,
            controller: InteractionController::new(),
            actor,
            policy,
            compositor,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Where the placement flow currently stands.
    pub fn state(&self) -> &ControllerState {
        self.controller.state()
    }

    // -- Placement ----------------------------------------------------------

    /// Arm `template`; the next click on a page places it.
    pub fn choose(&mut self, template: StampTemplate) -> Result<(), StampwerkError> {
        self.controller.choose(template)
    }

    /// Arm a QR stamp whose bitmap comes from `provider`.
    pub fn choose_qr(
        &mut self,
        provider: &dyn QrProvider,
        document_id: &str,
    ) -> Result<(), StampwerkError> {
        let bitmap = provider.qr_for(document_id)?;
        self.controller.choose(StampTemplate::qr(bitmap))
    }

    pub fn cancel(&mut self) {
        self.controller.cancel();
    }

    /// A click in view space. `None` means the pointer could not be resolved.
    pub fn click(&mut self, point: Option<ViewPoint>) -> Result<ClickOutcome, StampwerkError> {
        self.controller.click(
            point,
            &self.viewport,
            &self.actor,
            self.policy.as_ref(),
            self.document.stamps_mut(),
        )
    }

    /// Finish a placement that was waiting for authorization.
    pub fn resume(&mut self, outcome: AuthorizationOutcome) -> Result<Option<StampId>, StampwerkError> {
        self.controller.resume(outcome, self.document.stamps_mut())
    }

    /// Move a placed stamp to where the drag was released.
    pub fn drag_end(&mut self, id: StampId, point: Option<ViewPoint>) -> Result<(), StampwerkError> {
        self.controller
            .drag_end(id, point, &self.viewport, self.document.stamps_mut())
    }

    pub fn delete(&mut self, id: StampId) -> Result<Stamp, StampwerkError> {
        self.controller.delete(id, self.document.stamps_mut())
    }

    // -- View ---------------------------------------------------------------

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    pub fn set_zoom(&mut self, factor: f32) {
        self.viewport.set_zoom(factor);
    }

    pub fn scroll_to(&mut self, top: f32) {
        self.viewport.scroll_to(top);
    }

    // -- Document lifecycle -------------------------------------------------

    /// Discard the current document and its stamps. Anything armed or
    /// awaiting authorization is dropped with it.
    pub fn replace_document(&mut self, document: Document) {
        self.controller.cancel();
        self.viewport.reset(document.page_count());
        info!(
            discarded_stamps = self.document.stamps().len(),
            pages = document.page_count(),
            "Document replaced"
        );
        self.document = document;
    }

    /// Rasterize an upload and make it the open document. On failure the
    /// current document stays open, untouched.
    #[instrument(skip(self, rasterizer, data), fields(bytes = data.len()))]
    pub async fn upload(
        &mut self,
        rasterizer: &PageRasterizer,
        data: &[u8],
        mime: &str,
    ) -> Result<(), StampwerkError> {
        if rasterizer.page_size() != self.config.page {
            warn!(
                rasterizer = ?rasterizer.page_size(),
                configured = ?self.config.page,
                "Rasterizer page size differs from the configured page box"
            );
        }
        let pages = rasterizer.rasterize(data, mime).await?;
        self.replace_document(Document::new(pages));
        Ok(())
    }

    // -- Output -------------------------------------------------------------

    /// Flatten the document with the stamps as they are right now.
    pub async fn composite(&self) -> Result<CompositeOutput, StampwerkError> {
        let snapshot = self.document.stamps().snapshot();
        self.compositor
            .composite(self.document.pages(), &snapshot)
            .await
    }

    /// Render one page as shown at the current zoom.
    pub fn preview(&self, page_index: usize) -> Result<RgbaImage, StampwerkError> {
        let snapshot = self.document.stamps().snapshot();
        self.compositor.render_preview(
            self.document.pages(),
            &snapshot,
            page_index,
            self.viewport.zoom(),
        )
    }
}

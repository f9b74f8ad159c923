// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Interaction controller: the placement state machine.
//
//   Idle --choose--> ArmedForPlacement --click--> (policy)
//     Allowed              -> commit, Idle
//     RequiresVerification -> AwaitingAuthorization --resume--> commit or discard, Idle
//     Denied               -> Idle
//
// Drag-end and delete act on existing stamps in any state and are never gated.

use stampwerk_core::error::StampwerkError;
use stampwerk_core::{CanonicalPoint, Stamp, StampId, StampTemplate, ViewPoint};
use tracing::{debug, info, instrument, warn};

use crate::collaborators::{Actor, PlacementDecision, PlacementPolicy};
use crate::registry::StampRegistry;
use crate::viewport::Viewport;

/// A click that is waiting on external verification. The canonical position
/// is fixed at click time, so zooming while waiting cannot move the stamp.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPlacement {
    pub template: StampTemplate,
    pub view: ViewPoint,
    pub page_index: usize,
    pub at: CanonicalPoint,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ControllerState {
    #[default]
    Idle,
    ArmedForPlacement(StampTemplate),
    AwaitingAuthorization(PendingPlacement),
}

/// What a click did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Nothing was armed; the click had no effect.
    Ignored,
    Committed(StampId),
    AwaitingAuthorization,
}

/// Resolution delivered by the verification collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationOutcome {
    Granted,
    Cancelled,
    Denied,
}

#[derive(Debug, Default)]
pub struct InteractionController {
    state: ControllerState,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Arm a stamp for placement. Re-choosing replaces the armed template.
    pub fn choose(&mut self, template: StampTemplate) -> Result<(), StampwerkError> {
        if matches!(self.state, ControllerState::AwaitingAuthorization(_)) {
            return Err(StampwerkError::PlacementPending);
        }
        debug!(shape = %template.shape.kind(), "Stamp armed");
        self.state = ControllerState::ArmedForPlacement(template);
        Ok(())
    }

    /// Drop whatever is armed or pending and return to `Idle`.
    pub fn cancel(&mut self) {
        match std::mem::take(&mut self.state) {
            ControllerState::Idle => {}
            ControllerState::ArmedForPlacement(_) => debug!("Armed stamp discarded"),
            ControllerState::AwaitingAuthorization(_) => info!("Pending placement discarded"),
        }
    }

    /// Handle a placement click. `None` means the pointer event carried no
    /// usable position.
    #[instrument(skip_all)]
    pub fn click(
        &mut self,
        point: Option<ViewPoint>,
        viewport: &Viewport,
        actor: &Actor,
        policy: &dyn PlacementPolicy,
        registry: &mut StampRegistry,
    ) -> Result<ClickOutcome, StampwerkError> {
        let template = match std::mem::take(&mut self.state) {
            ControllerState::ArmedForPlacement(template) => template,
            other => {
                self.state = other;
                return Ok(ClickOutcome::Ignored);
            }
        };

        let resolved = point.and_then(|view| viewport.resolve(view).map(|hit| (view, hit)));
        let Some((view, (page_index, at))) = resolved else {
            warn!(?point, "Click could not be resolved to a page");
            self.state = ControllerState::ArmedForPlacement(template);
            return Err(StampwerkError::PointerResolutionFailure);
        };

        match policy.decide(actor) {
            PlacementDecision::Allowed => {
                let id = commit(registry, template, page_index, at)?;
                Ok(ClickOutcome::Committed(id))
            }
            PlacementDecision::RequiresVerification => {
                info!(page = page_index, "Placement awaiting authorization");
                self.state = ControllerState::AwaitingAuthorization(PendingPlacement {
                    template,
                    view,
                    page_index,
                    at,
                });
                Ok(ClickOutcome::AwaitingAuthorization)
            }
            PlacementDecision::Denied => {
                warn!(role = ?actor.role, "Placement denied by policy");
                Err(StampwerkError::AuthorizationDenied)
            }
        }
    }

    /// Deliver the verification result. Outside `AwaitingAuthorization` this
    /// does nothing and returns `Ok(None)`.
    #[instrument(skip(self, registry))]
    pub fn resume(
        &mut self,
        outcome: AuthorizationOutcome,
        registry: &mut StampRegistry,
    ) -> Result<Option<StampId>, StampwerkError> {
        let pending = match std::mem::take(&mut self.state) {
            ControllerState::AwaitingAuthorization(pending) => pending,
            other => {
                debug!("No placement is waiting for authorization");
                self.state = other;
                return Ok(None);
            }
        };

        match outcome {
            AuthorizationOutcome::Granted => {
                commit(registry, pending.template, pending.page_index, pending.at).map(Some)
            }
            AuthorizationOutcome::Cancelled => Err(StampwerkError::AuthorizationCancelled),
            AuthorizationOutcome::Denied => Err(StampwerkError::AuthorizationDenied),
        }
    }

    /// Finish dragging an existing stamp to `point`, interpreted on the
    /// stamp's own page.
    pub fn drag_end(
        &self,
        id: StampId,
        point: Option<ViewPoint>,
        viewport: &Viewport,
        registry: &mut StampRegistry,
    ) -> Result<(), StampwerkError> {
        let page_index = registry
            .get(id)
            .ok_or(StampwerkError::UnknownStampReference(id))?
            .page_index;
        let view = point
            .filter(|view| view.x.is_finite() && view.y.is_finite())
            .ok_or(StampwerkError::PointerResolutionFailure)?;
        let at = viewport.space().to_canonical(page_index, view);
        registry.update_position(id, at)
    }

    pub fn delete(&self, id: StampId, registry: &mut StampRegistry) -> Result<Stamp, StampwerkError> {
        registry.remove(id)
    }
}

fn commit(
    registry: &mut StampRegistry,
    template: StampTemplate,
    page_index: usize,
    at: CanonicalPoint,
) -> Result<StampId, StampwerkError> {
    let id = registry.add(Stamp::from_template(template, page_index, at))?;
    info!(%id, page = page_index, x = at.x, y = at.y, "Stamp placed");
    Ok(id)
}

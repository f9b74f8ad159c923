// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// stampwerk-editor: Interactive editing layer for the Stampwerk stamping engine.
//
// Owns the open document's stamp registry, the zoom/scroll viewport, and the
// placement state machine that turns pointer events into registry edits.

pub mod collaborators;
pub mod controller;
pub mod document;
pub mod registry;
pub mod session;
pub mod viewport;

pub use collaborators::{Actor, ActorRole, PlacementDecision, PlacementPolicy, QrProvider, RolePolicy};
pub use controller::{
    AuthorizationOutcome, ClickOutcome, ControllerState, InteractionController, PendingPlacement,
};
pub use document::Document;
pub use registry::{RegistrySnapshot, StampRegistry};
pub use session::EditorSession;
pub use viewport::Viewport;

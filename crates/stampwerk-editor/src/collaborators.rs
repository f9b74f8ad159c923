// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capabilities supplied from outside the engine: the placement policy that
// decides whether an actor may stamp, and the source of QR bitmaps.

use serde::{Deserialize, Serialize};
use stampwerk_core::QrBitmap;
use stampwerk_core::error::StampwerkError;

/// Kind of account placing stamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorRole {
    Individual,
    Company,
}

/// The user on whose behalf pointer events arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub role: ActorRole,
    /// Whether the actor has already completed stamp verification.
    #[serde(default)]
    pub stamp_verified: bool,
}

impl Actor {
    pub fn new(role: ActorRole, stamp_verified: bool) -> Self {
        Self {
            role,
            stamp_verified,
        }
    }
}

/// Answer to "may this actor place a new stamp right now?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementDecision {
    Allowed,
    /// Placement waits until an external verification step resolves.
    RequiresVerification,
    Denied,
}

pub trait PlacementPolicy {
    fn decide(&self, actor: &Actor) -> PlacementDecision;
}

/// Individuals must verify before stamping; companies and verified
/// individuals place directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct RolePolicy;

impl PlacementPolicy for RolePolicy {
    fn decide(&self, actor: &Actor) -> PlacementDecision {
        match actor.role {
            ActorRole::Individual if !actor.stamp_verified => PlacementDecision::RequiresVerification,
            ActorRole::Individual | ActorRole::Company => PlacementDecision::Allowed,
        }
    }
}

/// Supplies the QR bitmap for a document. Generation happens elsewhere.
pub trait QrProvider {
    fn qr_for(&self, document_id: &str) -> Result<QrBitmap, StampwerkError>;
}

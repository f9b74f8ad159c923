// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stamp registry: the ordered set of stamps placed on one open document.
//
// Stamps live in an arena of slots in insertion order, which is also the
// rendering Z-order. Removal leaves a tombstone; the arena is compacted once
// tombstones outnumber live stamps. An id -> slot map gives O(1) lookup.

use std::collections::HashMap;
use std::ops::Deref;

use stampwerk_core::error::StampwerkError;
use stampwerk_core::{CanonicalPoint, Stamp, StampId, StampRecord};
use tracing::debug;

/// Tombstone count below which compaction is never worth it.
const COMPACT_THRESHOLD: usize = 16;

/// Ordered collection of placed stamps.
#[derive(Debug, Clone, Default)]
pub struct StampRegistry {
    slots: Vec<Option<Stamp>>,
    index: HashMap<StampId, usize>,
}

impl StampRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stamp on top of the Z-order.
    pub fn add(&mut self, stamp: Stamp) -> Result<StampId, StampwerkError> {
        let id = stamp.id;
        if self.index.contains_key(&id) {
            return Err(StampwerkError::DuplicateStamp(id));
        }
        self.index.insert(id, self.slots.len());
        self.slots.push(Some(stamp));
        debug!(%id, total = self.len(), "Stamp added");
        Ok(id)
    }

    /// Move a stamp to a new canonical position. Z-order is unchanged.
    pub fn update_position(&mut self, id: StampId, at: CanonicalPoint) -> Result<(), StampwerkError> {
        let stamp = self
            .index
            .get(&id)
            .and_then(|&slot| self.slots[slot].as_mut())
            .ok_or(StampwerkError::UnknownStampReference(id))?;
        stamp.x = at.x;
        stamp.y = at.y;
        debug!(%id, x = at.x, y = at.y, "Stamp moved");
        Ok(())
    }

    /// Remove a stamp, returning it.
    pub fn remove(&mut self, id: StampId) -> Result<Stamp, StampwerkError> {
        let slot = self
            .index
            .remove(&id)
            .ok_or(StampwerkError::UnknownStampReference(id))?;
        let stamp = self.slots[slot]
            .take()
            .ok_or(StampwerkError::UnknownStampReference(id))?;
        debug!(%id, total = self.len(), "Stamp removed");
        self.compact_if_sparse();
        Ok(stamp)
    }

    pub fn get(&self, id: StampId) -> Option<&Stamp> {
        self.index
            .get(&id)
            .and_then(|&slot| self.slots[slot].as_ref())
    }

    /// Every stamp, bottom to top.
    pub fn list_all(&self) -> impl Iterator<Item = &Stamp> {
        self.slots.iter().flatten()
    }

    /// Stamps on one page, bottom to top.
    pub fn list_for_page(&self, page_index: usize) -> impl Iterator<Item = &Stamp> {
        self.list_all()
            .filter(move |stamp| stamp.page_index == page_index)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Owned copy of the current stamps in Z-order. Later registry mutations
    /// do not affect it; QR bitmaps are shared, not copied.
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot(self.list_all().cloned().collect())
    }

    /// Persistence records in Z-order.
    pub fn records(&self) -> Vec<StampRecord> {
        self.list_all().map(Stamp::to_record).collect()
    }

    fn compact_if_sparse(&mut self) {
        let tombstones = self.slots.len() - self.index.len();
        if tombstones < COMPACT_THRESHOLD || tombstones <= self.index.len() {
            return;
        }
        self.slots.retain(Option::is_some);
        self.index = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(slot, stamp)| stamp.as_ref().map(|stamp| (stamp.id, slot)))
            .collect();
        debug!(tombstones, live = self.index.len(), "Registry compacted");
    }
}

/// Frozen view of a registry, handed to the compositor.
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot(Vec<Stamp>);

impl Deref for RegistrySnapshot {
    type Target = [Stamp];

    fn deref(&self) -> &[Stamp] {
        &self.0
    }
}

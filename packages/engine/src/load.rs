//! Ordering of asynchronous dataset loads.
//!
//! Every load is started with [`LoadSequencer::begin`], which hands out a
//! monotonically increasing generation. When the load finishes, its
//! ticket is checked with [`LoadSequencer::accept`]: the result is applied
//! only if no newer load has been applied already.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

/// The dataset a load replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LoadKind {
    /// Property rows.
    Properties,
    /// Area boundaries.
    Boundaries,
}

/// Proof that a load was started. Pass it back when the load completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadTicket {
    kind: LoadKind,
    generation: u64,
}

impl LoadTicket {
    /// Dataset this ticket belongs to.
    #[must_use]
    pub const fn kind(&self) -> LoadKind {
        self.kind
    }

    /// Position of this load in start order (first load is `1`).
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// Why a load result was not applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// A load started later has already been applied.
    #[error("Discarding stale {kind} load {generation}; load {applied} is already applied")]
    Stale {
        /// Dataset of the discarded load.
        kind: LoadKind,
        /// Generation of the discarded load.
        generation: u64,
        /// Generation currently applied.
        applied: u64,
    },

    /// The ticket was issued for the other dataset.
    #[error("{found} load ticket used to complete a {expected} load")]
    WrongKind {
        /// Dataset being completed.
        expected: LoadKind,
        /// Dataset the ticket was issued for.
        found: LoadKind,
    },
}

/// Issues and checks load tickets for one dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSequencer {
    kind: LoadKind,
    issued: u64,
    applied: u64,
}

impl LoadSequencer {
    /// Creates a sequencer with no loads issued.
    #[must_use]
    pub const fn new(kind: LoadKind) -> Self {
        Self {
            kind,
            issued: 0,
            applied: 0,
        }
    }

    /// Starts a new load.
    pub const fn begin(&mut self) -> LoadTicket {
        self.issued += 1;
        LoadTicket {
            kind: self.kind,
            generation: self.issued,
        }
    }

    /// Marks `ticket` as applied if nothing newer has been applied.
    ///
    /// # Errors
    ///
    /// * [`LoadError::WrongKind`] if the ticket belongs to another dataset
    /// * [`LoadError::Stale`] if a later load was already applied
    pub fn accept(&mut self, ticket: LoadTicket) -> Result<(), LoadError> {
        if ticket.kind != self.kind {
            return Err(LoadError::WrongKind {
                expected: self.kind,
                found: ticket.kind,
            });
        }

        if ticket.generation <= self.applied {
            return Err(LoadError::Stale {
                kind: self.kind,
                generation: ticket.generation,
                applied: self.applied,
            });
        }

        self.applied = ticket.generation;
        Ok(())
    }

    /// Generation of the most recently applied load (`0` before any).
    #[must_use]
    pub const fn applied(&self) -> u64 {
        self.applied
    }
}

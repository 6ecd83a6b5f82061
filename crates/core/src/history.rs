//! Append-only status histories.
//!
//! Every workflow entity carries a `StatusHistory`; the entity's current
//! status is always derived from the last entry, never stored separately,
//! so a status and its audit trail cannot fall out of sync.

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use feira_shared::types::AccountId;

/// Who caused a status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    /// A user account (seller, buyer, or reviewer).
    Account(AccountId),
    /// Machine-driven transition: webhook confirmation, auto-delivery, sweep.
    System,
}

impl Actor {
    /// Returns the account id when the actor is a user.
    #[must_use]
    pub const fn account_id(self) -> Option<AccountId> {
        match self {
            Self::Account(id) => Some(id),
            Self::System => None,
        }
    }

    /// Returns true for machine-driven transitions.
    #[must_use]
    pub const fn is_system(self) -> bool {
        matches!(self, Self::System)
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Account(id) => write!(f, "{id}"),
            Self::System => write!(f, "SYSTEM"),
        }
    }
}

/// A history entry that carries a status and a timestamp.
///
/// Implemented by the per-entity entry types so `StatusHistory` can derive
/// the current status regardless of what else an entry records.
pub trait StatusRecord {
    /// The status type this entry carries.
    type Status: Copy;

    /// The status recorded by this entry.
    fn status(&self) -> Self::Status;

    /// When this entry was recorded.
    fn recorded_at(&self) -> DateTime<Utc>;
}

/// The common history entry shape: when, what, who, and an optional note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry<S> {
    /// When the transition was recorded.
    pub at: DateTime<Utc>,
    /// The status after the transition.
    pub status: S,
    /// Who caused the transition.
    pub author: Actor,
    /// Optional note (e.g. a rejection message).
    pub message: Option<String>,
}

impl<S> StatusEntry<S> {
    /// Creates an entry recorded now.
    #[must_use]
    pub fn new(status: S, author: Actor) -> Self {
        Self {
            at: Utc::now(),
            status,
            author,
            message: None,
        }
    }

    /// Attaches a note to the entry.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<S: Copy> StatusRecord for StatusEntry<S> {
    type Status = S;

    fn status(&self) -> S {
        self.status
    }

    fn recorded_at(&self) -> DateTime<Utc> {
        self.at
    }
}

/// Append-only, structurally non-empty status history.
///
/// The first entry is the creation record; `with` appends and entries are
/// never removed or reordered. Serializes as a flat sequence of entries; an
/// empty sequence is rejected on deserialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusHistory<E> {
    first: E,
    rest: Vec<E>,
}

impl<E> StatusHistory<E> {
    /// Opens a history with its creation record.
    #[must_use]
    pub fn opened(first: E) -> Self {
        Self {
            first,
            rest: Vec::new(),
        }
    }

    /// Appends an entry, returning the extended history.
    #[must_use]
    pub fn with(mut self, entry: E) -> Self {
        self.rest.push(entry);
        self
    }

    /// The creation record.
    pub const fn first(&self) -> &E {
        &self.first
    }

    /// The most recent entry.
    pub fn last(&self) -> &E {
        self.rest.last().unwrap_or(&self.first)
    }

    /// Number of entries. Always at least 1.
    #[must_use]
    pub fn len(&self) -> usize {
        1 + self.rest.len()
    }

    /// Always false; a history cannot be empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Iterates entries oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &E> {
        std::iter::once(&self.first).chain(self.rest.iter())
    }
}

impl<E: StatusRecord> StatusHistory<E> {
    /// The derived current status: the status of the last entry.
    pub fn current(&self) -> E::Status {
        self.last().status()
    }

    /// When the entity was created (first entry).
    pub fn created_at(&self) -> DateTime<Utc> {
        self.first.recorded_at()
    }

    /// When the entity last changed (last entry).
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.last().recorded_at()
    }
}

impl<E: Serialize> Serialize for StatusHistory<E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de, E: Deserialize<'de>> Deserialize<'de> for StatusHistory<E> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut entries = Vec::<E>::deserialize(deserializer)?.into_iter();
        let first = entries
            .next()
            .ok_or_else(|| D::Error::custom("status history cannot be empty"))?;
        Ok(Self {
            first,
            rest: entries.collect(),
        })
    }
}

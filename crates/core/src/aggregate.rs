//! Aggregate root trait for state-stored domain models.

use chrono::{DateTime, Utc};

/// Aggregate root marker + minimal interface.
///
/// Aggregates own their child entities outright; stores persist and load the
/// aggregate as one unit.
pub trait AggregateRoot {
    /// Identifier type of the aggregate.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the aggregate identifier.
    fn id(&self) -> &Self::Id;

    /// When the aggregate was first persisted.
    fn created_at(&self) -> DateTime<Utc>;

    /// When the aggregate was last persisted.
    fn updated_at(&self) -> DateTime<Utc>;

    /// Whether the aggregate has never been persisted (no identifier yet).
    fn is_new(&self) -> bool;
}

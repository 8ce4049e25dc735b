//! Contract-violation errors.
//!
//! A `PreconditionError` means an operation was invoked while its required
//! state was false.  It is never retried: the offending call returns it and
//! the caller decides whether to abort the run.  Expected, recoverable
//! outcomes (no path found, a partially successful reservation) are *not*
//! errors and are modelled with `Option` / `bool` in the crates that produce
//! them.

use thiserror::Error;

use crate::{EntityId, SimTime};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PreconditionError {
    #[error("timed event due at {due} is earlier than the clock ({now})")]
    TimeTravel { due: SimTime, now: SimTime },

    #[error("run horizon {horizon} is before the clock ({now}) or not finite")]
    InvalidHorizon { horizon: SimTime, now: SimTime },

    #[error("agent `{agent}` cannot take a task while in state {state}")]
    AgentBusy { agent: String, state: &'static str },

    #[error("shelf `{shelf}` is carried or already part of a task")]
    ShelfUnavailable { shelf: String },

    #[error("attribute {owner}.{name} is {expected}-scoped")]
    WrongScope {
        owner:    &'static str,
        name:     &'static str,
        expected: &'static str,
    },

    #[error("cannot {op} attribute {owner}.{name}")]
    InvalidOperation {
        owner: &'static str,
        name:  &'static str,
        op:    &'static str,
    },

    #[error("{child} already has parent {parent}")]
    AlreadyParented { child: EntityId, parent: EntityId },

    #[error("{child} is not a child of {parent}")]
    NotAChild { parent: EntityId, child: EntityId },

    #[error("attaching {child} under {parent} would create a cycle")]
    WouldCycle { parent: EntityId, child: EntityId },

    #[error("{entity} is a {kind} node and its transform cannot be written")]
    FixedTransform { entity: EntityId, kind: &'static str },
}

/// Shorthand result type for contract-checked operations.
pub type PreconditionResult<T> = Result<T, PreconditionError>;

//! Error type shared by the engine, its strategies and cursors.

use thiserror::Error;

use crate::arena::NodeId;

/// Errors raised by the tree engine and its cursors.
///
/// Lookups that miss are not errors: they return `None`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// A cursor was advanced past the last element.
    #[error("no such element")]
    NoSuchElement,
    /// An operation was called in a state that does not allow it, e.g. removing
    /// through a cursor twice without advancing in between.
    #[error("illegal state: {0}")]
    IllegalState(&'static str),
    /// The tree was structurally modified behind a cursor's back.
    #[error("the tree was modified outside of this cursor")]
    ConcurrentModification,
    /// A balancing strategy was configured with parameters outside its valid range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// A structural or balance invariant does not hold at `node`.
    #[error("invariant violated at {node:?}: {reason}")]
    InvariantViolation {
        /// The node where the check failed.
        node: NodeId,
        /// What was wrong.
        reason: String,
    },
}

impl TreeError {
    pub(crate) fn violation(node: NodeId, reason: impl Into<String>) -> Self {
        TreeError::InvariantViolation {
            node,
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TreeError>;

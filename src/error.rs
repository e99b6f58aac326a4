//! Error types for SQL rendering and binding
//!
//! All errors here are unrecoverable for the current render/bind pass: the
//! caller gets a failed pass instead of partially rendered or silently wrong
//! SQL. Retries, if any, belong to whatever executes the statement.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A structural invariant of the statement tree is violated, e.g. a
    /// subquery that selects no columns. Detected before any SQL is emitted.
    #[error("malformed expression tree: {0}")]
    MalformedTree(String),

    /// An indentation lock opened during the render pass was never released.
    #[error("{held} indentation lock(s) still held after rendering")]
    UnbalancedIndentLock { held: usize },

    /// The subquery flag was left set when the traversal returned to the
    /// top level. Indicates a node that is not state-neutral.
    #[error("subquery flag still set after traversal completed")]
    UnbalancedSubqueryFlag,

    /// The render pass and the bind pass disagree on the number of bind
    /// variables in the tree.
    #[error("rendered {placeholders} placeholder(s) but bound {values} value(s)")]
    BindMismatch { placeholders: usize, values: usize },
}

use std::path::Path;

use thiserror::Error;

/// The closed set of user-visible failures.
///
/// Every executor and the parser return one of these variants; the driver is
/// the single place where they become printed output. Each renders as the
/// exact single-line diagnostic the REPL shows.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// Reference to an unbound or non-existent table.
    #[error("Error: no such table: {0}")]
    NoSuchTable(String),
    /// Column reference that no bound table can satisfy.
    #[error("Error: no such column: {0}")]
    NoSuchColumn(String),
    /// Unqualified column name present in more than one bound table.
    #[error("Error: ambiguous column name: {0}")]
    AmbiguousColumnName(String),
    /// Arity mismatch, missing key column or duplicate key on INSERT.
    #[error("Error: {0}")]
    Insert(String),
    /// Duplicate key introduced by an UPDATE.
    #[error("Error: {0}")]
    Update(String),
    /// Any grammar violation, including input matching no verb at all.
    #[error("Error: {0}: syntax error")]
    Syntax(String),
    /// A filesystem failure underneath the table store.
    #[error("Error: {0}")]
    Io(String),
}

impl QueryError {
    pub(crate) fn syntax(message: impl Into<String>) -> QueryError {
        QueryError::Syntax(message.into())
    }

    pub(crate) fn io(path: &Path, source: std::io::Error) -> QueryError {
        QueryError::Io(format!("{}: {source}", path.display()))
    }
}

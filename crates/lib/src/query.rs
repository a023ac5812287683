//! Typed queries, one per verb, plus the clause data they share.
//!
//! The parser populates these through their builder-style setters; `run`
//! then binds tables into a fresh [`Catalog`], resolves every name to a
//! [`Key`] and executes. Mutating verbs follow a read-all / compute /
//! write-all discipline: any failure before the final write leaves the
//! backing file byte-identical.

pub mod delete;
pub mod describe;
pub mod insert;
pub mod select;
pub mod update;

pub use delete::Delete;
pub use describe::Describe;
pub use insert::Insert;
pub use select::{Join, OrderTerm, Select, SelectTerm};
pub use update::Update;

use crate::catalog::{Catalog, Key};
use crate::config::Config;
use crate::errors::QueryError;
use crate::storage::Record;
use crate::value::{CmpOp, Value};

/// A fully parsed statement, ready to run once.
#[derive(Debug)]
pub enum Statement {
    Describe(Describe),
    Select(Select),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
}

impl Statement {
    /// Execute against the given database, returning the lines to print.
    /// Mutating verbs return no lines on success.
    pub fn run(&self, config: &Config) -> Result<Vec<String>, QueryError> {
        match self {
            Statement::Describe(describe) => describe.run(config),
            Statement::Select(select) => select.run(config),
            Statement::Insert(insert) => insert.run(config).map(|()| Vec::new()),
            Statement::Update(update) => update.run(config).map(|()| Vec::new()),
            Statement::Delete(delete) => delete.run(config).map(|()| Vec::new()),
        }
    }
}

/// A parsed WHERE clause: column reference, operator and literal right-hand
/// side (already unescaped).
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub op: CmpOp,
    pub value: String,
}

impl Condition {
    fn resolve(&self, catalog: &Catalog) -> Result<Predicate, QueryError> {
        Ok(Predicate {
            key: catalog.resolve(&self.column)?,
            op: self.op,
            rhs: Value::coerce(&self.value).into_owned(),
        })
    }
}

/// A resolved WHERE predicate. The right-hand side is coerced once at
/// resolution; each row's cell is coerced at evaluation.
#[derive(Debug)]
struct Predicate {
    key: Key,
    op: CmpOp,
    rhs: Value<'static>,
}

impl Predicate {
    fn matches(&self, row: &[&Record]) -> bool {
        let cell = &row[self.key.table][self.key.column];
        self.op.eval(&Value::coerce(cell), &self.rhs)
    }
}

/// Resolve an optional WHERE clause; absent means "every row matches".
fn resolve_condition(
    condition: Option<&Condition>,
    catalog: &Catalog,
) -> Result<Option<Predicate>, QueryError> {
    condition.map(|condition| condition.resolve(catalog)).transpose()
}

fn row_matches(predicate: Option<&Predicate>, row: &[&Record]) -> bool {
    predicate.is_none_or(|predicate| predicate.matches(row))
}

use ahash::{AHashMap, AHashSet};

use super::{Condition, resolve_condition, row_matches};
use crate::catalog::Catalog;
use crate::config::Config;
use crate::errors::QueryError;
use crate::storage::Table;

/// UPDATE ... SET, with an optional WHERE.
///
/// Records are read in full, assigned in place and written back in their
/// original order. A primary-key collision introduced by the update refuses
/// the whole statement; duplicates already present in the source file are
/// written back unchanged.
#[derive(Debug)]
pub struct Update {
    table: String,
    assignments: Vec<(String, String)>,
    condition: Option<Condition>,
}

impl Update {
    pub fn new(table: impl Into<String>) -> Update {
        Update {
            table: table.into(),
            assignments: Vec::new(),
            condition: None,
        }
    }

    /// Later assignments to the same column win, as in the source dialect.
    pub fn set(mut self, assignments: Vec<(String, String)>) -> Update {
        self.assignments = assignments;
        self
    }

    pub fn filter(mut self, condition: Condition) -> Update {
        self.condition = Some(condition);
        self
    }

    pub fn run(&self, config: &Config) -> Result<(), QueryError> {
        let mut catalog = Catalog::new();
        catalog.bind(Table::open(config, &self.table)?);
        let table = catalog.table(0);

        let mut assignments: AHashMap<usize, &str> = AHashMap::new();
        for (column, value) in &self.assignments {
            let position = table
                .column(column)
                .ok_or_else(|| QueryError::NoSuchColumn(column.clone()))?;
            assignments.insert(position, value);
        }
        let predicate = resolve_condition(self.condition.as_ref(), &catalog)?;

        let mut records = table.load(config)?;

        // Keys already duplicated on disk are exempt from the post-update
        // uniqueness scan: only collisions the update itself introduces are
        // refused.
        let preexisting = duplicate_keys(records.iter().map(|record| record[0].as_str()));

        for record in &mut records {
            if row_matches(predicate.as_ref(), &[&*record]) {
                for (&position, &value) in &assignments {
                    record[position] = value.to_owned();
                }
            }
        }

        let mut seen = AHashSet::new();
        for record in &records {
            let id = record[0].as_str();
            if !seen.insert(id) && !preexisting.contains(id) {
                return Err(QueryError::Update(format!(
                    "Attempting to store more than one record with id '{id}'; \
                     refusing to update"
                )));
            }
        }
        table.write(config, &records)
    }
}

fn duplicate_keys<'a>(keys: impl Iterator<Item = &'a str>) -> AHashSet<String> {
    let mut seen = AHashSet::new();
    let mut duplicates = AHashSet::new();
    for key in keys {
        if !seen.insert(key) {
            duplicates.insert(key.to_owned());
        }
    }
    duplicates
}

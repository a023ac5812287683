use super::{Condition, resolve_condition, row_matches};
use crate::catalog::Catalog;
use crate::config::Config;
use crate::errors::QueryError;
use crate::storage::Table;

/// DELETE FROM, with an optional WHERE. Without one, every record goes.
#[derive(Debug)]
pub struct Delete {
    table: String,
    condition: Option<Condition>,
}

impl Delete {
    pub fn new(table: impl Into<String>) -> Delete {
        Delete {
            table: table.into(),
            condition: None,
        }
    }

    pub fn filter(mut self, condition: Condition) -> Delete {
        self.condition = Some(condition);
        self
    }

    pub fn run(&self, config: &Config) -> Result<(), QueryError> {
        let mut catalog = Catalog::new();
        catalog.bind(Table::open(config, &self.table)?);
        let table = catalog.table(0);
        let predicate = resolve_condition(self.condition.as_ref(), &catalog)?;

        let mut records = table.load(config)?;
        records.retain(|record| !row_matches(predicate.as_ref(), &[record]));
        table.write(config, &records)
    }
}

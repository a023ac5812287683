use ahash::{AHashMap, AHashSet};

use crate::config::Config;
use crate::errors::QueryError;
use crate::storage::{Record, Table};

/// INSERT INTO, with an optional explicit column list.
///
/// Rows are validated against the target table, checked for primary-key
/// collisions (against the table and within the batch) and appended in one
/// write; a failing row aborts the whole statement before anything lands on
/// disk.
#[derive(Debug)]
pub struct Insert {
    table: String,
    columns: Option<Vec<String>>,
    rows: Vec<Vec<String>>,
}

impl Insert {
    pub fn new(table: impl Into<String>) -> Insert {
        Insert {
            table: table.into(),
            columns: None,
            rows: Vec::new(),
        }
    }

    pub fn columns(mut self, columns: Vec<String>) -> Insert {
        self.columns = Some(columns);
        self
    }

    pub fn values(mut self, rows: Vec<Vec<String>>) -> Insert {
        self.rows = rows;
        self
    }

    pub fn run(&self, config: &Config) -> Result<(), QueryError> {
        let table = Table::open(config, &self.table)?;
        let slots = self.value_slots(&table)?;

        if let Some(row) = self.rows.first()
            && row.len() != slots.len()
        {
            return Err(QueryError::Insert(format!(
                "table {} has {} columns but {} values were supplied",
                table.name(),
                slots.len(),
                row.len()
            )));
        }

        let mut seen: AHashSet<String> = table
            .load(config)?
            .into_iter()
            .map(|mut record| record.swap_remove(0))
            .collect();

        let key_slot = slots[&0];
        let mut batch: Vec<Record> = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let id = &row[key_slot];
            if !seen.insert(id.clone()) {
                return Err(QueryError::Insert(format!(
                    "attempting to store more than one record with id '{id}'; \
                     aborting the insert"
                )));
            }
            batch.push(
                (0..table.arity())
                    .map(|column| {
                        slots
                            .get(&column)
                            .map_or_else(String::new, |&slot| row[slot].clone())
                    })
                    .collect(),
            );
        }
        table.append(config, &batch)
    }

    /// Map each target column position to the index of its supplied value.
    /// Without an explicit column list the mapping is the identity over the
    /// whole table; with one, the primary-key column must be present.
    fn value_slots(&self, table: &Table) -> Result<AHashMap<usize, usize>, QueryError> {
        let Some(columns) = &self.columns else {
            return Ok((0..table.arity()).map(|column| (column, column)).collect());
        };
        let mut slots = AHashMap::new();
        for (slot, column) in columns.iter().enumerate() {
            let position = table
                .column(column)
                .ok_or_else(|| QueryError::NoSuchColumn(column.clone()))?;
            slots.insert(position, slot);
        }
        if !slots.contains_key(&0) {
            return Err(QueryError::Insert(
                "the value of the column at index 0 must be specified".into(),
            ));
        }
        Ok(slots)
    }
}

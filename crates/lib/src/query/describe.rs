use crate::config::Config;
use crate::errors::QueryError;
use crate::storage::Table;

/// DESCRIBE <table>: one line of space-separated, case-preserved headers.
#[derive(Debug)]
pub struct Describe {
    table: String,
}

impl Describe {
    pub fn new(table: impl Into<String>) -> Describe {
        Describe {
            table: table.into(),
        }
    }

    pub fn run(&self, config: &Config) -> Result<Vec<String>, QueryError> {
        let table = Table::open(config, &self.table)?;
        Ok(vec![table.headers().join(" ")])
    }
}

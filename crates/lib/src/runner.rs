use log::debug;

use crate::config::Config;
use crate::errors::QueryError;
use crate::parser;

/// Executes statements against one database directory.
///
/// One statement runs to completion before the next is read; each run
/// reopens the files it touches, so no table state is shared across
/// statements.
#[derive(Debug)]
pub struct Runner {
    config: Config,
}

impl Runner {
    pub fn new(config: Config) -> Runner {
        Runner { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parse and execute a single statement, returning the lines to print.
    pub fn run(&self, statement: &str) -> Result<Vec<String>, QueryError> {
        debug!("running statement: {statement}");
        parser::parse(statement)?.run(&self.config)
    }
}

use std::path::PathBuf;

use clap::Parser;
use csvql_lib::config::{DEFAULT_EXTENSION, DEFAULT_UNIT_SEPARATOR};

#[derive(Debug, Parser)]
#[command(name = "csvql")]
#[command(about = "An interactive SQL shell over character-separated table files", long_about = None, version = env!("CARGO_PKG_VERSION"))]
pub(crate) struct Cli {
    /// Path to the database directory.
    pub(crate) database: PathBuf,
    /// Table filename extension.
    #[arg(long, default_value = DEFAULT_EXTENSION)]
    pub(crate) extension: String,
    /// Separator between cells, used for headers and records alike.
    #[arg(long, default_value_t = DEFAULT_UNIT_SEPARATOR)]
    pub(crate) unit_separator: char,
}

use std::path::PathBuf;

pub const DEFAULT_EXTENSION: &str = ".csv";
pub const DEFAULT_UNIT_SEPARATOR: char = '\u{1f}';
pub const DEFAULT_RECORD_SEPARATOR: char = '\n';

/// Execution context for one database directory.
///
/// Constructed once at process start and passed by reference into every
/// query run; nothing in the engine reads process-wide state. The same
/// separators are used for reading and writing, headers and cells alike.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_root: PathBuf,
    pub extension: String,
    pub unit_separator: char,
    pub record_separator: char,
}

impl Config {
    pub fn new(database_root: impl Into<PathBuf>) -> Config {
        Config {
            database_root: database_root.into(),
            extension: DEFAULT_EXTENSION.into(),
            unit_separator: DEFAULT_UNIT_SEPARATOR,
            record_separator: DEFAULT_RECORD_SEPARATOR,
        }
    }

    /// The backing file for a table name: `<root>/<name><extension>`.
    pub fn table_path(&self, name: &str) -> PathBuf {
        self.database_root.join(format!("{name}{}", self.extension))
    }
}

use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use ahash::AHashMap;
use itertools::Itertools;
use log::debug;

use crate::config::Config;
use crate::errors::QueryError;

/// One record of a table: its cells in header order. The cell at index 0 is
/// the table's primary key.
pub type Record = Vec<String>;

/// A table bound to its backing file.
///
/// Headers are read when the table is opened; records are loaded from disk
/// each time an executor asks for them. Mutations rewrite or append to the
/// file as a whole, so a failure before the write leaves it untouched.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    path: PathBuf,
    headers: Vec<String>,
    header_index: AHashMap<String, usize>,
}

impl Table {
    /// Open `<root>/<name><extension>`, reading the header row.
    pub fn open(config: &Config, name: &str) -> Result<Table, QueryError> {
        let path = config.table_path(name);
        if !path.is_file() {
            return Err(QueryError::NoSuchTable(name.to_owned()));
        }
        let contents = read(&path)?;
        let header_line = contents
            .split(config.record_separator)
            .next()
            .unwrap_or_default();
        let headers: Vec<String> = header_line
            .split(config.unit_separator)
            .map(str::to_owned)
            .collect();
        let header_index = headers
            .iter()
            .enumerate()
            .map(|(position, header)| (header.to_lowercase(), position))
            .collect();
        Ok(Table {
            name: name.to_owned(),
            path,
            headers,
            header_index,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Case-preserved column names, in on-disk order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn arity(&self) -> usize {
        self.headers.len()
    }

    /// Case-insensitive position lookup for a column name.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header_index.get(&name.to_lowercase()).copied()
    }

    /// Read every record from disk. A trailing record separator at
    /// end-of-file is tolerated.
    pub fn load(&self, config: &Config) -> Result<Vec<Record>, QueryError> {
        let contents = read(&self.path)?;
        let records: Vec<Record> = contents
            .split(config.record_separator)
            .skip(1)
            .filter(|line| !line.is_empty())
            .map(|line| {
                line.split(config.unit_separator)
                    .map(str::to_owned)
                    .collect()
            })
            .collect();
        debug!("loaded {} records from {}", records.len(), self.path.display());
        Ok(records)
    }

    /// Replace the file with the header row plus the given records.
    pub fn write(&self, config: &Config, records: &[Record]) -> Result<(), QueryError> {
        let unit = config.unit_separator.to_string();
        let mut contents = self.headers.iter().join(&unit);
        contents.push(config.record_separator);
        contents.push_str(&serialize_records(config, records));
        fs::write(&self.path, contents).map_err(|source| QueryError::io(&self.path, source))?;
        debug!("wrote {} records to {}", records.len(), self.path.display());
        Ok(())
    }

    /// Append records without rewriting the existing ones.
    pub fn append(&self, config: &Config, records: &[Record]) -> Result<(), QueryError> {
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|source| QueryError::io(&self.path, source))?;
        file.write_all(serialize_records(config, records).as_bytes())
            .map_err(|source| QueryError::io(&self.path, source))?;
        debug!(
            "appended {} records to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Records joined by the configured separators, with a trailing record
/// separator whenever at least one record is present.
fn serialize_records(config: &Config, records: &[Record]) -> String {
    let unit = config.unit_separator.to_string();
    let mut serialized = records
        .iter()
        .map(|record| record.iter().join(&unit))
        .join(&config.record_separator.to_string());
    if !serialized.is_empty() {
        serialized.push(config.record_separator);
    }
    serialized
}

fn read(path: &Path) -> Result<String, QueryError> {
    fs::read_to_string(path).map_err(|source| QueryError::io(path, source))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn test_config() -> (tempfile::TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(dir.path());
        (dir, config)
    }

    fn seed(config: &Config, name: &str, contents: &str) {
        std::fs::write(config.table_path(name), contents).unwrap();
    }

    #[test]
    fn open_missing_table_fails() {
        let (_dir, config) = test_config();
        assert_eq!(
            Table::open(&config, "players").unwrap_err(),
            QueryError::NoSuchTable("players".into())
        );
    }

    #[test]
    fn open_reads_headers_and_indexes_them_case_insensitively() {
        let (_dir, config) = test_config();
        seed(&config, "players", "id\u{1f}nameFirst\u{1f}nameLast\n");
        let table = Table::open(&config, "players").unwrap();
        assert_eq!(table.headers(), ["id", "nameFirst", "nameLast"]);
        assert_eq!(table.column("NAMEFIRST"), Some(1));
        assert_eq!(table.column("nope"), None);
    }

    #[test]
    fn load_tolerates_trailing_record_separator() {
        let (_dir, config) = test_config();
        seed(&config, "t", "a\u{1f}b\n1\u{1f}2\n3\u{1f}4\n");
        let table = Table::open(&config, "t").unwrap();
        assert_eq!(table.load(&config).unwrap(), [["1", "2"], ["3", "4"]]);

        seed(&config, "u", "a\u{1f}b\n1\u{1f}2");
        let table = Table::open(&config, "u").unwrap();
        assert_eq!(table.load(&config).unwrap(), [["1", "2"]]);
    }

    #[test]
    fn empty_table_is_header_only() {
        let (_dir, config) = test_config();
        seed(&config, "t", "a\u{1f}b\n");
        let table = Table::open(&config, "t").unwrap();
        assert_eq!(table.load(&config).unwrap(), Vec::<Record>::new());
    }

    #[test]
    fn write_then_load_round_trips() {
        let (_dir, config) = test_config();
        seed(&config, "t", "a\u{1f}b\n");
        let table = Table::open(&config, "t").unwrap();
        let records = vec![
            vec!["1".to_owned(), "x".to_owned()],
            vec!["2".to_owned(), "".to_owned()],
        ];
        table.write(&config, &records).unwrap();
        assert_eq!(table.load(&config).unwrap(), records);
        // The file keeps a trailing record separator after the last row.
        let raw = std::fs::read_to_string(table.path()).unwrap();
        assert_eq!(raw, "a\u{1f}b\n1\u{1f}x\n2\u{1f}\n");
    }

    #[test]
    fn write_no_records_leaves_header_alone() {
        let (_dir, config) = test_config();
        seed(&config, "t", "a\u{1f}b\n1\u{1f}2\n");
        let table = Table::open(&config, "t").unwrap();
        table.write(&config, &[]).unwrap();
        assert_eq!(std::fs::read_to_string(table.path()).unwrap(), "a\u{1f}b\n");
    }

    #[test]
    fn append_extends_without_rewriting() {
        let (_dir, config) = test_config();
        seed(&config, "t", "a\u{1f}b\n1\u{1f}2\n");
        let table = Table::open(&config, "t").unwrap();
        table
            .append(&config, &[vec!["3".to_owned(), "4".to_owned()]])
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(table.path()).unwrap(),
            "a\u{1f}b\n1\u{1f}2\n3\u{1f}4\n"
        );
    }
}

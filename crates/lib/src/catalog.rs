use ahash::AHashMap;

use crate::errors::QueryError;
use crate::storage::Table;

/// Internal address of a column: (binding index, column index). The only
/// column reference executors ever see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key {
    pub table: usize,
    pub column: usize,
}

/// The tables bound by one query, in FROM-then-JOIN order.
///
/// At most two tables are ever bound. When the same name is bound twice the
/// second binding is registered under an internal suffixed key, so
/// user-level qualification keeps referring to the first binding while the
/// catalog still knows both exist.
#[derive(Debug, Default)]
pub struct Catalog {
    tables: Vec<Table>,
    by_name: AHashMap<String, usize>,
}

impl Catalog {
    pub fn new() -> Catalog {
        Catalog::default()
    }

    pub fn bind(&mut self, table: Table) {
        let index = self.tables.len();
        let mut name = table.name().to_lowercase();
        if self.by_name.contains_key(&name) {
            name = format!("{name}__{index}");
        }
        self.by_name.insert(name, index);
        self.tables.push(table);
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn table(&self, index: usize) -> &Table {
        &self.tables[index]
    }

    /// Resolve a user-written column reference.
    ///
    /// `a.c` resolves `c` within the binding named `a`; a bare `c` must match
    /// exactly one bound table's headers. All name matching is
    /// case-insensitive.
    pub fn resolve(&self, reference: &str) -> Result<Key, QueryError> {
        match reference.split_once('.') {
            Some((qualifier, column)) => self.resolve_qualified(reference, qualifier, column),
            None => self.resolve_bare(reference),
        }
    }

    fn resolve_qualified(
        &self,
        reference: &str,
        qualifier: &str,
        column: &str,
    ) -> Result<Key, QueryError> {
        let no_such_column = || QueryError::NoSuchColumn(reference.to_owned());
        let &table = self
            .by_name
            .get(&qualifier.to_lowercase())
            .ok_or_else(no_such_column)?;
        let column = self.tables[table].column(column).ok_or_else(no_such_column)?;
        Ok(Key { table, column })
    }

    fn resolve_bare(&self, reference: &str) -> Result<Key, QueryError> {
        let mut matches = self.tables.iter().enumerate().filter_map(|(table, bound)| {
            bound.column(reference).map(|column| Key { table, column })
        });
        match (matches.next(), matches.next()) {
            (Some(key), None) => Ok(key),
            (Some(_), Some(_)) => Err(QueryError::AmbiguousColumnName(reference.to_owned())),
            (None, _) => Err(QueryError::NoSuchColumn(reference.to_owned())),
        }
    }

    /// Expand `*` (qualifier `None`) or `a.*` into concrete keys, in binding
    /// order then header order.
    pub fn expand_star(&self, qualifier: Option<&str>) -> Result<Vec<Key>, QueryError> {
        let expand = |table: usize| {
            (0..self.tables[table].arity()).map(move |column| Key { table, column })
        };
        match qualifier {
            None => Ok((0..self.tables.len()).flat_map(expand).collect()),
            Some(name) => {
                let &table = self
                    .by_name
                    .get(&name.to_lowercase())
                    .ok_or_else(|| QueryError::NoSuchTable(name.to_owned()))?;
                Ok(expand(table).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::Config;

    fn catalog_with(tables: &[(&str, &str)]) -> (tempfile::TempDir, Catalog) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(dir.path());
        let mut catalog = Catalog::new();
        for (name, headers) in tables {
            let header_line = headers.replace(',', "\u{1f}");
            std::fs::write(config.table_path(name), format!("{header_line}\n")).unwrap();
            catalog.bind(Table::open(&config, name).unwrap());
        }
        (dir, catalog)
    }

    #[test]
    fn bare_names_resolve_case_insensitively() {
        let (_dir, catalog) = catalog_with(&[("players", "id,nameFirst,nameLast")]);
        assert_eq!(
            catalog.resolve("NAMELAST").unwrap(),
            Key { table: 0, column: 2 }
        );
        assert_eq!(
            catalog.resolve("namelast").unwrap(),
            catalog.resolve("nameLast").unwrap()
        );
    }

    #[test]
    fn qualified_names_resolve_within_their_table() {
        let (_dir, catalog) =
            catalog_with(&[("players", "id,name"), ("batting", "playerId,yearId,HR")]);
        assert_eq!(
            catalog.resolve("batting.yearId").unwrap(),
            Key { table: 1, column: 1 }
        );
        assert_eq!(
            catalog.resolve("players.yearId").unwrap_err(),
            QueryError::NoSuchColumn("players.yearId".into())
        );
        assert_eq!(
            catalog.resolve("bogus.id").unwrap_err(),
            QueryError::NoSuchColumn("bogus.id".into())
        );
    }

    #[test]
    fn shared_bare_names_are_ambiguous() {
        let (_dir, catalog) = catalog_with(&[("a", "id,x"), ("b", "id,y")]);
        assert_eq!(
            catalog.resolve("id").unwrap_err(),
            QueryError::AmbiguousColumnName("id".into())
        );
        assert_eq!(catalog.resolve("a.id").unwrap(), Key { table: 0, column: 0 });
        assert_eq!(catalog.resolve("b.id").unwrap(), Key { table: 1, column: 0 });
        assert_eq!(
            catalog.resolve("missing").unwrap_err(),
            QueryError::NoSuchColumn("missing".into())
        );
    }

    #[test]
    fn star_expansion_covers_bound_tables_in_order() {
        let (_dir, catalog) =
            catalog_with(&[("players", "id,name"), ("batting", "playerId,yearId,HR")]);
        let keys = catalog.expand_star(None).unwrap();
        assert_eq!(keys.len(), 5);
        assert_eq!(keys[0], Key { table: 0, column: 0 });
        assert_eq!(keys[4], Key { table: 1, column: 2 });

        let keys = catalog.expand_star(Some("batting")).unwrap();
        assert_eq!(keys.len(), 3);
        assert!(keys.iter().all(|key| key.table == 1));

        assert_eq!(
            catalog.expand_star(Some("nope")).unwrap_err(),
            QueryError::NoSuchTable("nope".into())
        );
    }

    #[test]
    fn second_binding_of_a_name_keeps_first_addressable() {
        let (dir, _) = catalog_with(&[]);
        let config = Config::new(dir.path());
        std::fs::write(config.table_path("t"), "id\u{1f}x\n").unwrap();
        let mut catalog = Catalog::new();
        catalog.bind(Table::open(&config, "t").unwrap());
        catalog.bind(Table::open(&config, "t").unwrap());
        // Qualification refers to the first binding; both stay bound.
        assert_eq!(catalog.resolve("t.x").unwrap(), Key { table: 0, column: 1 });
        assert_eq!(catalog.tables().len(), 2);
        assert_eq!(
            catalog.resolve("x").unwrap_err(),
            QueryError::AmbiguousColumnName("x".into())
        );
    }
}

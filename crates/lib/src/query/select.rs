use std::cmp::Ordering;

use ahash::AHashMap;
use itertools::Itertools;

use super::{Condition, resolve_condition, row_matches};
use crate::catalog::{Catalog, Key};
use crate::config::Config;
use crate::errors::QueryError;
use crate::storage::{Record, Table};
use crate::value::Value;

/// The display separator between cells of an output row, distinct from the
/// storage separator.
const DISPLAY_SEPARATOR: &str = "|";

/// One term of a projection list.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectTerm {
    Column(String),
    /// `*` (no qualifier) or `a.*`; expands in place at execution.
    Star(Option<String>),
}

/// One ORDER BY term; `ascending` defaults to true in the grammar.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderTerm {
    pub column: String,
    pub ascending: bool,
}

/// An optional second table binding, with an optional equality to join on.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub table: String,
    pub on: Option<(String, String)>,
}

/// SELECT: scan, join, filter, sort, limit, project.
#[derive(Debug)]
pub struct Select {
    from: String,
    join: Option<Join>,
    condition: Option<Condition>,
    columns: Vec<SelectTerm>,
    order_by: Vec<OrderTerm>,
    limit: Option<usize>,
}

impl Select {
    pub fn new(from: impl Into<String>) -> Select {
        Select {
            from: from.into(),
            join: None,
            condition: None,
            columns: Vec::new(),
            order_by: Vec::new(),
            limit: None,
        }
    }

    pub fn join(mut self, table: impl Into<String>, on: Option<(String, String)>) -> Select {
        self.join = Some(Join {
            table: table.into(),
            on,
        });
        self
    }

    pub fn filter(mut self, condition: Condition) -> Select {
        self.condition = Some(condition);
        self
    }

    /// An empty list projects every column of every bound table.
    pub fn columns(mut self, columns: Vec<SelectTerm>) -> Select {
        self.columns = columns;
        self
    }

    pub fn order_by(mut self, order_by: Vec<OrderTerm>) -> Select {
        self.order_by = order_by;
        self
    }

    /// A negative limit disables the cap.
    pub fn limit(mut self, limit: i64) -> Select {
        self.limit = usize::try_from(limit).ok();
        self
    }

    pub fn run(&self, config: &Config) -> Result<Vec<String>, QueryError> {
        let mut catalog = Catalog::new();
        catalog.bind(Table::open(config, &self.from)?);
        if let Some(join) = &self.join {
            catalog.bind(Table::open(config, &join.table)?);
        }

        // An ON pair within a single table becomes a scan filter on that
        // table; a pair across both tables drives the hash join.
        let mut scan_filters: [Option<(usize, usize)>; 2] = [None, None];
        let mut join_on = None;
        if let Some((left, right)) = self.join.as_ref().and_then(|join| join.on.as_ref()) {
            let (a, b) = (catalog.resolve(left)?, catalog.resolve(right)?);
            if a.table == b.table {
                scan_filters[a.table] = Some((a.column, b.column));
            } else {
                let (first, second) = if a.table == 0 { (a, b) } else { (b, a) };
                join_on = Some((first.column, second.column));
            }
        }

        let predicate = resolve_condition(self.condition.as_ref(), &catalog)?;
        let projection = self.resolve_projection(&catalog)?;
        let order_by: Vec<(Key, bool)> = self
            .order_by
            .iter()
            .map(|term| Ok((catalog.resolve(&term.column)?, term.ascending)))
            .collect::<Result<_, QueryError>>()?;

        let mut scans = Vec::with_capacity(catalog.tables().len());
        for (index, table) in catalog.tables().iter().enumerate() {
            let mut records = table.load(config)?;
            if let Some((a, b)) = scan_filters[index] {
                records.retain(|record| record[a] == record[b]);
            }
            scans.push(records);
        }

        let mut rows: Vec<Vec<&Record>> = match (&scans[..], join_on) {
            ([single], _) => single.iter().map(|record| vec![record]).collect(),
            ([left, right], Some((left_on, right_on))) => {
                hash_join(left, right, left_on, right_on)
            }
            ([left, right], None) => left
                .iter()
                .cartesian_product(right)
                .map(|(first, second)| vec![first, second])
                .collect(),
            _ => unreachable!("a query binds one or two tables"),
        };

        rows.retain(|row| row_matches(predicate.as_ref(), row));
        sort_rows(&mut rows, &order_by);
        if let Some(limit) = self.limit {
            rows.truncate(limit);
        }

        Ok(rows
            .iter()
            .map(|row| {
                projection
                    .iter()
                    .map(|key| row[key.table][key.column].as_str())
                    .join(DISPLAY_SEPARATOR)
            })
            .collect())
    }

    fn resolve_projection(&self, catalog: &Catalog) -> Result<Vec<Key>, QueryError> {
        if self.columns.is_empty() {
            return catalog.expand_star(None);
        }
        let mut keys = Vec::new();
        for term in &self.columns {
            match term {
                SelectTerm::Column(name) => keys.push(catalog.resolve(name)?),
                SelectTerm::Star(qualifier) => {
                    keys.extend(catalog.expand_star(qualifier.as_deref())?);
                }
            }
        }
        Ok(keys)
    }
}

/// Equi-join on raw cell text: partition the right side by its ON column,
/// then probe in left-scan order, so output order follows the left table.
fn hash_join<'a>(
    left: &'a [Record],
    right: &'a [Record],
    left_on: usize,
    right_on: usize,
) -> Vec<Vec<&'a Record>> {
    let mut partitions: AHashMap<&str, Vec<&Record>> = AHashMap::new();
    for record in right {
        partitions
            .entry(record[right_on].as_str())
            .or_default()
            .push(record);
    }
    let mut rows = Vec::new();
    for record in left {
        if let Some(group) = partitions.get(record[left_on].as_str()) {
            rows.extend(group.iter().map(|other| vec![record, *other]));
        }
    }
    rows
}

/// Stable sort, applied right-to-left so the leftmost term dominates. Rows
/// whose sort cell is empty go last regardless of direction.
fn sort_rows(rows: &mut [Vec<&Record>], order_by: &[(Key, bool)]) {
    for &(key, ascending) in order_by.iter().rev() {
        rows.sort_by(|a, b| {
            let left = a[key.table][key.column].as_str();
            let right = b[key.table][key.column].as_str();
            match (left.is_empty(), right.is_empty()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => {
                    let ordering = Value::coerce(left).total_cmp(&Value::coerce(right));
                    if ascending { ordering } else { ordering.reverse() }
                }
            }
        });
    }
}

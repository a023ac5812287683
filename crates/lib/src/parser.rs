//! Regex-driven statement recognition.
//!
//! Each verb owns one anchored pattern, tried in fixed order (DESCRIBE,
//! SELECT, UPDATE, DELETE, INSERT); the first full match wins and its
//! captured clauses go through per-clause sub-parsers that report precise
//! diagnostics. String literals are unescaped (`\"` to `"`) after
//! extraction, so WHERE and VALUES carry decoded text into execution.

use std::sync::OnceLock;

use fancy_regex::{Captures, Regex};

use crate::errors::QueryError;
use crate::query::{
    Condition, Delete, Describe, Insert, OrderTerm, Select, SelectTerm, Statement, Update,
};
use crate::value::CmpOp;

/// A double-quoted string literal with `\"` escapes, content captured.
const QUOTED: &str = r#""((?:\\"|[^"])*)""#;
/// The same shape with nothing captured, for composition.
const QUOTED_RAW: &str = r#""(?:\\"|[^"])*""#;

macro_rules! pattern {
    ($source:expr) => {{
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| Regex::new(&$source).expect("pattern must compile"))
    }};
}

/// Parse one statement into a typed query.
pub fn parse(input: &str) -> Result<Statement, QueryError> {
    let input = input.trim();
    if let Some(parts) = fullmatch(pattern!(r"\A(?i:DESCRIBE)\s+(?P<table>.+)\z"), input) {
        return describe(&parts).map(Statement::Describe);
    }
    if let Some(parts) = fullmatch(
        pattern!(
            r#"\A(?i:SELECT)\s+(?P<select>.+)\s+(?i:FROM)\s+(?P<from>.+?)(?:\s+(?i:JOIN)\s+(?P<join>.+?)(?:\s+(?i:ON)\s+(?P<on>.+?))?)?(?:\s+(?i:WHERE)\s+(?P<where>[\s\S]+?))?(?:\s+(?i:ORDER\s+BY)\s+(?P<order>.+?))?(?:\s+(?i:LIMIT)\s+(?P<limit>.+?))?\z"#
        ),
        input,
    ) {
        return select(&parts).map(Statement::Select);
    }
    if let Some(parts) = fullmatch(
        pattern!(
            r"\A(?i:UPDATE)\s+(?P<table>.+)\s+(?i:SET)\s+(?P<set>[\s\S]+?)(?:\s+(?i:WHERE)\s+(?P<where>[\s\S]+?))?\z"
        ),
        input,
    ) {
        return update(&parts).map(Statement::Update);
    }
    if let Some(parts) = fullmatch(
        pattern!(
            r"\A(?i:DELETE\s+FROM)\s+(?P<from>.+?)(?:\s+(?i:WHERE)\s+(?P<where>[\s\S]+?))?\z"
        ),
        input,
    ) {
        return delete(&parts).map(Statement::Delete);
    }
    if let Some(parts) = fullmatch(
        pattern!(
            r"\A(?i:INSERT\s+INTO)\s+(?P<into>.+?)(?:\s+\((?P<columns>.+)\))?\s+(?i:VALUES)\s+(?P<values>[\s\S]+)\z"
        ),
        input,
    ) {
        return insert(&parts).map(Statement::Insert);
    }
    Err(QueryError::syntax("input matches no known query"))
}

/// The patterns are all `\A..\z`-anchored, so a plain capture is a full
/// match. Backtracking overruns count as a non-match.
fn fullmatch<'t>(re: &Regex, text: &'t str) -> Option<Captures<'t>> {
    re.captures(text).ok().flatten()
}

fn describe(parts: &Captures<'_>) -> Result<Describe, QueryError> {
    let table = table_name(&parts["table"], "DESCRIBE expects exactly one table name")?;
    Ok(Describe::new(table))
}

fn select(parts: &Captures<'_>) -> Result<Select, QueryError> {
    let from = table_name(&parts["from"], "FROM clause expects exactly one table name")?;
    let mut select = Select::new(from);
    if let Some(join) = parts.name("join") {
        let table = table_name(join.as_str(), "JOIN clause expects exactly one table name")?;
        let on = parts.name("on").map(|on| on_keys(on.as_str())).transpose()?;
        select = select.join(table, on);
    }
    if let Some(clause) = parts.name("where") {
        select = select.filter(condition(clause.as_str())?);
    }
    select = select.columns(select_terms(&parts["select"]));
    if let Some(clause) = parts.name("order") {
        select = select.order_by(order_terms(clause.as_str())?);
    }
    if let Some(clause) = parts.name("limit") {
        select = select.limit(limit(clause.as_str())?);
    }
    Ok(select)
}

fn update(parts: &Captures<'_>) -> Result<Update, QueryError> {
    let table = table_name(&parts["table"], "UPDATE expects exactly one table name")?;
    let mut update = Update::new(table).set(set_clause(&parts["set"])?);
    if let Some(clause) = parts.name("where") {
        update = update.filter(condition(clause.as_str())?);
    }
    Ok(update)
}

fn delete(parts: &Captures<'_>) -> Result<Delete, QueryError> {
    let table = table_name(&parts["from"], "FROM clause expects exactly one table name")?;
    let mut delete = Delete::new(table);
    if let Some(clause) = parts.name("where") {
        delete = delete.filter(condition(clause.as_str())?);
    }
    Ok(delete)
}

fn insert(parts: &Captures<'_>) -> Result<Insert, QueryError> {
    let table = table_name(&parts["into"], "INSERT expects exactly one table name")?;
    let columns = parts.name("columns").map(|list| {
        list.as_str()
            .split(',')
            .map(str::trim)
            .filter(|column| !column.is_empty())
            .map(str::to_owned)
            .collect::<Vec<_>>()
    });
    let rows = values_clause(&parts["values"])?;
    if let Some(first) = rows.first()
        && rows.iter().any(|row| row.len() != first.len())
    {
        return Err(QueryError::Insert(
            "all VALUES must have the same number of terms".into(),
        ));
    }
    if let Some(columns) = &columns
        && let Some(row) = rows.iter().find(|row| row.len() != columns.len())
    {
        return Err(QueryError::Insert(format!(
            "{} values for {} columns",
            row.len(),
            columns.len()
        )));
    }
    let mut insert = Insert::new(table);
    if let Some(columns) = columns {
        insert = insert.columns(columns);
    }
    Ok(insert.values(rows))
}

fn table_name(raw: &str, message: &str) -> Result<String, QueryError> {
    if fullmatch(pattern!(r"\A\w+\z"), raw).is_some() {
        Ok(raw.to_owned())
    } else {
        Err(QueryError::syntax(message))
    }
}

fn condition(raw: &str) -> Result<Condition, QueryError> {
    let parts = fullmatch(
        pattern!(format!(r#"\A([\w.]+)\s*(<=|<|=|!=|>=|>)\s*{QUOTED}\s*\z"#)),
        raw,
    )
    .ok_or_else(|| {
        QueryError::syntax(
            "WHERE clause syntax expected to be <column> <operator> \"<value>\",\n       \
             where <operator> is one of <, <=, =, !=, >=, >",
        )
    })?;
    let op = CmpOp::from_symbol(&parts[2]).expect("operator alternation is exhaustive");
    Ok(Condition {
        column: parts[1].to_owned(),
        op,
        value: unescape(&parts[3]),
    })
}

fn on_keys(raw: &str) -> Result<(String, String), QueryError> {
    let parts = fullmatch(pattern!(r"\A([\w.]+)\s*=\s*([\w.]+)\s*\z"), raw).ok_or_else(|| {
        QueryError::syntax("ON clause syntax expected to be <column_1> = <column_2>")
    })?;
    Ok((parts[1].to_owned(), parts[2].to_owned()))
}

fn select_terms(raw: &str) -> Vec<SelectTerm> {
    raw.split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(|term| {
            if term == "*" {
                SelectTerm::Star(None)
            } else if let Some(qualifier) = term.strip_suffix(".*") {
                SelectTerm::Star(Some(qualifier.to_owned()))
            } else {
                SelectTerm::Column(term.to_owned())
            }
        })
        .collect()
}

fn order_terms(raw: &str) -> Result<Vec<OrderTerm>, QueryError> {
    raw.split(',')
        .map(str::trim)
        .map(|term| {
            let parts = fullmatch(pattern!(r"\A([\w.]+)(?:\s+((?i:ASC|DESC)))?\z"), term)
                .ok_or_else(|| QueryError::syntax("wrong syntax in ORDER BY clause"))?;
            let ascending = parts
                .get(2)
                .is_none_or(|direction| direction.as_str().eq_ignore_ascii_case("asc"));
            Ok(OrderTerm {
                column: parts[1].to_owned(),
                ascending,
            })
        })
        .collect()
}

fn limit(raw: &str) -> Result<i64, QueryError> {
    raw.trim()
        .parse()
        .map_err(|_| QueryError::syntax("LIMIT clause takes exactly one integer"))
}

fn set_clause(raw: &str) -> Result<Vec<(String, String)>, QueryError> {
    let pair = format!(r#"\s*(\w+)\s*=\s*{QUOTED}\s*"#);
    if fullmatch(pattern!(format!(r"\A{pair}(?:,{pair})*\z")), raw).is_none() {
        return Err(QueryError::syntax("wrong syntax in SET clause"));
    }
    let assignments = pattern!(format!(r#"\s*(\w+)\s*=\s*{QUOTED}\s*"#))
        .captures_iter(raw)
        .flatten()
        .map(|found| (found[1].to_owned(), unescape(&found[2])))
        .collect();
    Ok(assignments)
}

fn values_clause(raw: &str) -> Result<Vec<Vec<String>>, QueryError> {
    let row = format!(r#"\s*\(\s*{QUOTED_RAW}\s*(?:,\s*{QUOTED_RAW}\s*)*\)\s*"#);
    if fullmatch(pattern!(format!(r"\A{row}(?:,{row})*\z")), raw).is_none() {
        return Err(QueryError::syntax("wrong syntax in VALUES clause"));
    }
    let rows = pattern!(format!(
        r#"\(\s*{QUOTED_RAW}\s*(?:,\s*{QUOTED_RAW}\s*)*\)"#
    ))
    .find_iter(raw)
    .flatten()
    .map(|row| {
        pattern!(QUOTED)
            .captures_iter(row.as_str())
            .flatten()
            .map(|value| unescape(&value[1]))
            .collect()
    })
    .collect();
    Ok(rows)
}

fn unescape(raw: &str) -> String {
    raw.replace(r#"\""#, "\"")
}

//! Raw input handling: statement splitting and backslash-escape decoding.
//! Both leave `\"` encoded so string literals reach the statement grammar
//! intact.

/// Split joined input lines on `;` occurring outside double-quoted strings.
/// Empty fragments (leading, trailing or doubled terminators) are dropped.
pub(crate) fn statements(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut escaped = false;
    for ch in input.chars() {
        if ch == ';' && !in_string {
            parts.push(std::mem::take(&mut current));
            escaped = false;
            continue;
        }
        if ch == '"' && !escaped {
            in_string = !in_string;
        }
        escaped = ch == '\\' && !escaped;
        current.push(ch);
    }
    parts.push(current);
    parts
        .into_iter()
        .map(|part| part.trim().to_owned())
        .filter(|part| !part.is_empty())
        .collect()
}

/// Decode standard backslash escapes in a statement. Unknown escapes keep
/// their backslash, as does `\"`, which the parser handles itself.
pub(crate) fn decoded(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_semicolons_outside_strings() {
        assert_eq!(
            statements("SELECT a FROM t; DELETE FROM t"),
            ["SELECT a FROM t", "DELETE FROM t"]
        );
        assert_eq!(
            statements(r#"INSERT INTO t (id) VALUES ("a;b"); DESCRIBE t;"#),
            [r#"INSERT INTO t (id) VALUES ("a;b")"#, "DESCRIBE t"]
        );
    }

    #[test]
    fn escaped_quotes_do_not_close_strings() {
        assert_eq!(
            statements(r#"SELECT a FROM t WHERE a = "x\";y";"#),
            [r#"SELECT a FROM t WHERE a = "x\";y""#]
        );
    }

    #[test]
    fn empty_fragments_are_dropped() {
        assert_eq!(statements(";;  ;"), Vec::<String>::new());
        assert_eq!(statements("  DESCRIBE t  ;;"), ["DESCRIBE t"]);
    }

    #[test]
    fn decodes_common_escapes_but_keeps_quotes_encoded() {
        assert_eq!(decoded(r"a\tb\nc"), "a\tb\nc");
        assert_eq!(decoded(r#"say \"hi\""#), r#"say \"hi\""#);
        assert_eq!(decoded(r"back\\slash"), r"back\slash");
        assert_eq!(decoded(r"\q"), r"\q");
    }
}

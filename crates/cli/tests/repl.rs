use std::path::Path;

use assert_cmd::Command;

const UNIT: char = '\u{1f}';

fn seed(dir: &Path, name: &str, rows: &[&[&str]]) {
    let unit = UNIT.to_string();
    let contents: String = rows
        .iter()
        .map(|row| format!("{}\n", row.join(&unit)))
        .collect();
    std::fs::write(dir.join(format!("{name}.csv")), contents).unwrap();
}

fn database() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    seed(
        dir.path(),
        "players",
        &[
            &["id", "nameFirst", "nameLast", "birthCountry"],
            &["1", "Ty", "Cobb", "USA"],
            &["2", "Babe", "Ruth", "USA"],
            &["3", "Jackie", "Robinson", "USA"],
        ],
    );
    dir
}

fn csvql(dir: &Path) -> Command {
    let mut command = Command::cargo_bin("csvql").unwrap();
    command.arg(dir);
    command
}

#[test]
fn select_rows_print_pipe_separated() {
    let dir = database();
    csvql(dir.path())
        .write_stdin("SELECT nameLast, nameFirst FROM players LIMIT 2;\n")
        .assert()
        .success()
        .stdout("Cobb|Ty\nRuth|Babe\n");
}

#[test]
fn statements_may_share_a_line_and_span_lines() {
    let dir = database();
    csvql(dir.path())
        .write_stdin("SELECT id FROM players LIMIT 1; DESCRIBE players;\nSELECT nameLast\nFROM players\nWHERE id = \"3\";\n")
        .assert()
        .success()
        .stdout("1\nid nameFirst nameLast birthCountry\nRobinson\n");
}

#[test]
fn errors_print_and_the_session_continues() {
    let dir = database();
    csvql(dir.path())
        .write_stdin("SELECT id FROM nothing;\nSELECT id FROM players LIMIT 1;\n")
        .assert()
        .success()
        .stdout("Error: no such table: nothing\n1\n");
}

#[test]
fn syntax_errors_name_the_offending_clause() {
    let dir = database();
    csvql(dir.path())
        .write_stdin("SELECT id FROM players LIMIT ten;\nfrobnicate;\n")
        .assert()
        .success()
        .stdout(
            "Error: LIMIT clause takes exactly one integer: syntax error\n\
             Error: input matches no known query: syntax error\n",
        );
}

#[test]
fn mutations_persist_across_statements() {
    let dir = database();
    csvql(dir.path())
        .write_stdin(
            "DELETE FROM players WHERE id = \"2\";\nSELECT id FROM players;\n",
        )
        .assert()
        .success()
        .stdout("1\n3\n");
    // The rewrite is on disk, not just in-session.
    let contents = std::fs::read_to_string(dir.path().join("players.csv")).unwrap();
    assert!(!contents.contains("Ruth"));
}

#[test]
fn missing_database_argument_is_a_usage_error() {
    Command::cargo_bin("csvql").unwrap().assert().failure();
}

#[test]
fn eof_without_terminator_exits_cleanly() {
    let dir = database();
    csvql(dir.path())
        .write_stdin("SELECT id FROM players")
        .assert()
        .success()
        .stdout("");
}

#[test]
fn blank_lines_and_stray_semicolons_are_ignored() {
    let dir = database();
    csvql(dir.path())
        .write_stdin("\n;;\n\nSELECT id FROM players LIMIT 1;\n")
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn escapes_decode_on_the_way_in() {
    let dir = database();
    csvql(dir.path())
        .write_stdin(
            "INSERT INTO players (id, nameLast) VALUES (\"4\", \"O\\\"Neill\");\n\
             SELECT nameLast FROM players WHERE id = \"4\";\n",
        )
        .assert()
        .success()
        .stdout("O\"Neill\n");
}

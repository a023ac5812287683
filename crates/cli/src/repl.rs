use std::io::{self, BufRead, IsTerminal, Write};

use csvql_lib::Runner;

use crate::input;

const PROMPT: &str = "csvql> ";
const CONTINUATION: &str = "  ...> ";

/// Read statements until EOF, running each as soon as its terminating `;`
/// arrives. Per-statement errors are printed and the prompt returns; only
/// end-of-input ends the process.
pub(crate) fn run(runner: &Runner) -> i32 {
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut lines = stdin.lock().lines();

    loop {
        let mut buffer: Vec<String> = Vec::new();
        loop {
            prompt(interactive, if buffer.is_empty() { PROMPT } else { CONTINUATION });
            let Some(Ok(line)) = lines.next() else {
                return 0;
            };
            let line = line.trim().to_owned();
            // Blank lines and stray terminators do not start a statement.
            if buffer.is_empty() && line.chars().all(|ch| ch == ';') {
                continue;
            }
            let complete = line.ends_with(';');
            buffer.push(line);
            if complete {
                break;
            }
        }
        for statement in input::statements(&buffer.join(" ")) {
            match runner.run(&input::decoded(&statement)) {
                Ok(rows) => {
                    for row in rows {
                        println!("{row}");
                    }
                }
                Err(error) => println!("{error}"),
            }
        }
    }
}

fn prompt(interactive: bool, text: &str) {
    if interactive {
        print!("{text}");
        let _ = io::stdout().flush();
    }
}

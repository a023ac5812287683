use clap::Parser as _;
use csvql_lib::{Config, Runner};

mod commands;
mod input;
mod logger;
mod repl;

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let _ = logger::init();
    let cli = commands::Cli::parse();

    let mut config = Config::new(cli.database);
    config.extension = cli.extension;
    config.unit_separator = cli.unit_separator;

    repl::run(&Runner::new(config))
}

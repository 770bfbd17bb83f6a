use clap::Parser;
use fortuna::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}

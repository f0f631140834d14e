use clap::Parser;

use claude_switch::cli::{self, Cli};
use claude_switch::logging::init_tracing;

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match cli::run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            std::process::exit(cli::exit_code(&err));
        }
    }
}

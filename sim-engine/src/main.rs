// src/main.rs
// Demo binary: runs the bundled scenario for a configurable duration.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "Discrete-event market simulator demo")]
struct Cli {
    /// Virtual milliseconds to run the demo for.
    #[arg(long, default_value_t = 10_000)]
    until_ms: u64,
}

fn main() {
    let cli = Cli::parse();

    match sim_engine::scenarios::simple_demo::run(cli.until_ms) {
        Ok(summary) => {
            tracing::info!(?summary, "simulation finished");
        }
        Err(err) => {
            tracing::error!(%err, "simulation failed");
            std::process::exit(1);
        }
    }
}

use std::env;
use std::io;

use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let args: Vec<String> = env::args().collect();
    std::process::exit(co2_explorer::cli::run_with_args(&args));
}

use anyhow::Result;
use clap::Parser;
use coverage_explorer::app::{self, AppConfig, Args};

fn main() -> Result<()> {
    let args = Args::parse();
    app::init_tracing(args.verbose);
    let config = AppConfig::from(args);
    app::run(config)
}

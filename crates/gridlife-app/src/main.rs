use anyhow::Result;
use clap::Parser;
use gridlife_app::{Cli, run};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let report = run(&cli)?;
    info!(
        epochs = report.epochs,
        population = report.population,
        births = report.births,
        deaths = report.deaths,
        frames = report.frames.len(),
        "run finished"
    );
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

//! Command-line wiring for gridlife runs: configuration loading, the epoch loop,
//! log output and frame rendering.

use anyhow::{Context, Result, ensure};
use clap::Parser;
use gridlife_core::{SimulationConfig, WorldState};
use gridlife_render::{RenderOptions, render_png};
use gridlife_storage::{RunHeader, SharedEpochLog};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "gridlife",
    version,
    about = "Run a grid-based artificial-life simulation"
)]
pub struct Cli {
    /// JSON file with simulation settings; omitted fields keep their defaults.
    #[arg(long, env = "GRIDLIFE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Side length of the square world.
    #[arg(long)]
    pub size: Option<u32>,

    /// Number of founder agents.
    #[arg(long)]
    pub population: Option<usize>,

    /// Number of food cells seeded at start.
    #[arg(long)]
    pub food: Option<usize>,

    /// Number of epochs to run.
    #[arg(long)]
    pub epochs: Option<u64>,

    /// RNG seed for a reproducible run.
    #[arg(long, env = "GRIDLIFE_SEED")]
    pub seed: Option<u64>,

    /// Directory receiving the epoch log and rendered frames.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Skip writing the JSON epoch log.
    #[arg(long)]
    pub no_log: bool,

    /// Render a PNG frame every N epochs (epoch 0 included).
    #[arg(long)]
    pub render_every: Option<u64>,

    /// Pixels per grid cell in rendered frames.
    #[arg(long, default_value_t = 4)]
    pub cell_pixels: u32,
}

impl Cli {
    /// Loads the config file, if any, and applies command-line overrides.
    pub fn resolve_config(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                serde_json::from_str::<SimulationConfig>(&raw)
                    .with_context(|| format!("failed to parse config {}", path.display()))?
            }
            None => SimulationConfig::default(),
        };
        if let Some(size) = self.size {
            config.size = size;
        }
        if let Some(population) = self.population {
            config.population = population;
        }
        if let Some(food) = self.food {
            config.food_units = food;
        }
        if let Some(epochs) = self.epochs {
            config.epochs = epochs;
        }
        if self.seed.is_some() {
            config.rng_seed = self.seed;
        }
        config.validate().context("invalid simulation config")?;
        Ok(config)
    }

    fn render_options(&self) -> RenderOptions {
        RenderOptions {
            cell_pixels: self.cell_pixels,
            ..RenderOptions::default()
        }
    }
}

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub epochs: u64,
    pub population: usize,
    pub births: usize,
    pub deaths: usize,
    pub log_path: Option<PathBuf>,
    pub frames: Vec<PathBuf>,
}

/// Executes a full run as described by `cli`.
pub fn run(cli: &Cli) -> Result<RunReport> {
    let config = cli.resolve_config()?;
    if let Some(every) = cli.render_every {
        ensure!(every > 0, "--render-every must be positive");
    }
    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("failed to create {}", cli.out_dir.display()))?;

    let header = RunHeader::new(&config);
    let log = (!cli.no_log).then(|| SharedEpochLog::new(header.clone()));
    let epochs = config.epochs;

    let mut world = WorldState::new(config).context("failed to build world")?;
    if let Some(log) = &log {
        world.set_recorder(Box::new(log.clone()));
    }
    world.populate().context("failed to populate world")?;
    info!(
        size = world.config().size,
        agents = world.agent_count(),
        food = world.grid().food_count(),
        energy_bits = world.layout().energy_bits(),
        epochs,
        "world populated"
    );

    let mut frames = Vec::new();
    let options = cli.render_options();
    maybe_render(&world, cli, &options, &mut frames)?;

    let (mut births, mut deaths) = (0, 0);
    for _ in 0..epochs {
        let summary = world
            .step()
            .with_context(|| format!("epoch {} failed", world.epoch() + 1))?;
        births += summary.births;
        deaths += summary.deaths;
        info!(
            epoch = summary.epoch,
            population = summary.population,
            births = summary.births,
            deaths = summary.deaths,
            "epoch complete"
        );
        maybe_render(&world, cli, &options, &mut frames)?;
        if summary.population == 0 {
            warn!(epoch = summary.epoch, "population extinct");
        }
    }

    let log_path = match &log {
        Some(log) => {
            let path = cli.out_dir.join(header.file_name());
            log.write_json(&path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "epoch log written");
            Some(path)
        }
        None => None,
    };

    Ok(RunReport {
        epochs: world.epoch(),
        population: world.agent_count(),
        births,
        deaths,
        log_path,
        frames,
    })
}

fn maybe_render(
    world: &WorldState,
    cli: &Cli,
    options: &RenderOptions,
    frames: &mut Vec<PathBuf>,
) -> Result<()> {
    let Some(every) = cli.render_every else {
        return Ok(());
    };
    if world.epoch() % every != 0 {
        return Ok(());
    }
    let path = frame_path(&cli.out_dir, world.epoch());
    let png = render_png(world, options).context("failed to render frame")?;
    fs::write(&path, png).with_context(|| format!("failed to write {}", path.display()))?;
    debug!(path = %path.display(), "frame written");
    frames.push(path);
    Ok(())
}

fn frame_path(dir: &Path, epoch: u64) -> PathBuf {
    dir.join(format!("epoch_{epoch}.png"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_overrides_defaults() {
        let cli = Cli::parse_from([
            "gridlife",
            "--size",
            "30",
            "--population",
            "10",
            "--food",
            "5",
            "--seed",
            "9",
        ]);
        let config = cli.resolve_config().expect("config");
        assert_eq!(config.size, 30);
        assert_eq!(config.population, 10);
        assert_eq!(config.food_units, 5);
        assert_eq!(config.rng_seed, Some(9));
        assert_eq!(config.epochs, SimulationConfig::default().epochs);
    }

    #[test]
    fn invalid_overrides_are_reported() {
        let cli = Cli::parse_from(["gridlife", "--size", "3", "--population", "20"]);
        assert!(cli.resolve_config().is_err());
    }

    #[test]
    fn frames_are_named_by_epoch() {
        assert_eq!(
            frame_path(Path::new("out"), 12),
            Path::new("out").join("epoch_12.png")
        );
    }
}

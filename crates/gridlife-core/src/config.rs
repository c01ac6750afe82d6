use rand::{SeedableRng, rngs::SmallRng};
use serde::{Deserialize, Serialize};

use crate::error::SimulationError;
use crate::genome::{CrossoverPattern, Genome, GenomeLayout};

/// Static configuration for a gridlife run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Side length of the square grid, in cells.
    pub size: u32,
    /// Number of founder agents placed at populate time.
    pub population: usize,
    /// Number of food cells seeded at populate time.
    pub food_units: usize,
    /// Epochs executed by [`crate::WorldState::run`].
    pub epochs: u64,
    /// Optional RNG seed for reproducible worlds.
    pub rng_seed: Option<u64>,
    /// Width of the energy-seed gene field (4..=12 bits).
    pub energy_bits: u32,
    /// Mask used to recombine parent genomes.
    pub crossover: CrossoverPattern,
    /// Energy every agent starts with before the genome's energy seed is added.
    pub base_energy: u32,
    /// Energy granted per unit of decoded energy seed.
    pub energy_per_seed: u32,
    /// Energy charged for a move action.
    pub move_cost: u32,
    /// Energy charged to each parent when a mating is consummated.
    pub mate_cost: u32,
    /// Flat energy tax applied after every resolved action.
    pub base_tax: u32,
    /// Energy credited for eating.
    pub food_energy: u32,
    /// Only credit energy when the eaten cell actually held food.
    pub strict_feeding: bool,
    /// Shuffle sensor output before it reaches the decision policy.
    pub shuffle_sightings: bool,
    /// Maximum number of recent epoch summaries retained in-memory.
    pub history_capacity: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            size: 150,
            population: 200,
            food_units: 800,
            epochs: 200,
            rng_seed: None,
            energy_bits: 4,
            crossover: CrossoverPattern::Bit,
            base_energy: 8,
            energy_per_seed: 2,
            move_cost: 1,
            mate_cost: 2,
            base_tax: 1,
            food_energy: 2,
            strict_feeding: false,
            shuffle_sightings: true,
            history_capacity: 256,
        }
    }
}

impl SimulationConfig {
    /// Validates the configuration, returning the derived genome layout.
    pub fn validate(&self) -> Result<GenomeLayout, SimulationError> {
        if self.size == 0 {
            return Err(SimulationError::InvalidConfig("size must be non-zero"));
        }
        let cells = u64::from(self.size) * u64::from(self.size);
        let occupants = (self.population as u64).saturating_add(self.food_units as u64);
        if occupants > cells {
            return Err(SimulationError::InvalidConfig(
                "population plus food_units cannot exceed the number of cells",
            ));
        }
        if self.history_capacity == 0 {
            return Err(SimulationError::InvalidConfig(
                "history_capacity must be non-zero",
            ));
        }
        GenomeLayout::new(self.energy_bits)
    }

    /// Starting energy for an agent carrying `genome`.
    #[must_use]
    pub fn birth_energy(&self, layout: &GenomeLayout, genome: Genome) -> u32 {
        self.base_energy
            .saturating_add(layout.energy(genome).saturating_mul(self.energy_per_seed))
    }

    /// Returns the configured RNG seed, generating one from entropy if absent.
    pub(crate) fn seeded_rng(&self) -> SmallRng {
        match self.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        }
    }
}

//! World aggregate and the epoch driver.

use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::fmt;
use std::time::Instant;
use tracing::{debug, trace};

use crate::agent::{Agent, AgentId, AgentRecord, Position};
use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::genome::{Genome, GenomeLayout};
use crate::grid::{Cell, Grid};
use crate::policy::{self, Intent};
use crate::population::Population;
use crate::random::{RandomSource, RngSource};
use crate::sensor;

/// Per-epoch record of pending mate proposals, keyed by requester.
#[derive(Debug, Clone, Default)]
pub struct MatingRequests {
    pending: HashMap<AgentId, AgentId>,
}

impl MatingRequests {
    /// Records `requester -> mate`. Returns `true` when `mate` had already requested
    /// `requester` this epoch; that earlier entry is consumed.
    pub fn file(&mut self, requester: AgentId, mate: AgentId) -> bool {
        let mutual = self.pending.get(&mate) == Some(&requester);
        if mutual {
            self.pending.remove(&mate);
        }
        self.pending.insert(requester, mate);
        mutual
    }

    #[must_use]
    pub fn pending(&self, requester: AgentId) -> Option<AgentId> {
        self.pending.get(&requester).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

/// Full population and action log of one epoch, handed to recorders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EpochSnapshot {
    pub epoch: u64,
    /// Wall-clock duration of the epoch in milliseconds.
    #[serde(rename = "time")]
    pub elapsed_ms: u64,
    pub population: Vec<AgentRecord>,
    pub actions: BTreeMap<AgentId, Intent>,
}

/// Counters returned by [`WorldState::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochSummary {
    pub epoch: u64,
    pub births: usize,
    pub deaths: usize,
    pub population: usize,
}

/// Sink invoked once per epoch (and once for the founders at epoch 0).
pub trait EpochRecorder {
    fn on_epoch(&mut self, snapshot: &EpochSnapshot);
}

/// No-op recorder.
#[derive(Debug, Default)]
pub struct NullRecorder;

impl EpochRecorder for NullRecorder {
    fn on_epoch(&mut self, _snapshot: &EpochSnapshot) {}
}

/// Owns the grid, the population and every per-run resource.
pub struct WorldState {
    pub(crate) config: SimulationConfig,
    pub(crate) layout: GenomeLayout,
    pub(crate) grid: Grid,
    pub(crate) population: Population,
    pub(crate) requests: MatingRequests,
    pub(crate) rng: Box<dyn RandomSource>,
    epoch: u64,
    pub(crate) births: usize,
    recorder: Box<dyn EpochRecorder>,
    history: VecDeque<EpochSummary>,
}

impl fmt::Debug for WorldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorldState")
            .field("config", &self.config)
            .field("epoch", &self.epoch)
            .field("agent_count", &self.population.len())
            .field("pending_requests", &self.requests.len())
            .finish()
    }
}

impl WorldState {
    /// Instantiate an empty world using the supplied configuration.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        let rng: RngSource<SmallRng> = RngSource(config.seeded_rng());
        Self::with_parts(config, Box::new(rng), Box::new(NullRecorder))
    }

    /// Instantiate a world with an explicit random source and recorder.
    pub fn with_parts(
        config: SimulationConfig,
        rng: Box<dyn RandomSource>,
        recorder: Box<dyn EpochRecorder>,
    ) -> Result<Self, SimulationError> {
        let layout = config.validate()?;
        let history_capacity = config.history_capacity;
        Ok(Self {
            grid: Grid::new(config.size)?,
            layout,
            config,
            population: Population::new(),
            requests: MatingRequests::default(),
            rng,
            epoch: 0,
            births: 0,
            recorder,
            history: VecDeque::with_capacity(history_capacity),
        })
    }

    /// Replace the epoch recorder.
    pub fn set_recorder(&mut self, recorder: Box<dyn EpochRecorder>) {
        self.recorder = recorder;
    }

    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[must_use]
    pub const fn layout(&self) -> &GenomeLayout {
        &self.layout
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.population.get(id)
    }

    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.population.len()
    }

    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub fn requests(&self) -> &MatingRequests {
        &self.requests
    }

    pub fn history(&self) -> impl Iterator<Item = &EpochSummary> {
        self.history.iter()
    }

    /// Rejection-samples an empty cell; callers guarantee one exists.
    fn draw_free_position(&mut self) -> Result<Position, SimulationError> {
        let size = u64::from(self.config.size);
        loop {
            let pos = Position::new(
                self.rng.uniform(0, size) as u32,
                self.rng.uniform(0, size) as u32,
            );
            if self.grid.is_free(pos)? {
                return Ok(pos);
            }
        }
    }

    /// Places a founder with `genome` at `position`, returning its identity.
    pub fn spawn_founder(
        &mut self,
        genome: Genome,
        position: Position,
    ) -> Result<AgentId, SimulationError> {
        let id = self.population.fresh_id(self.rng.as_mut());
        let energy = self.config.birth_energy(&self.layout, genome);
        self.insert_agent(Agent::founder(id, genome, position, energy))
    }

    /// Places an already-built agent at its recorded position.
    pub fn insert_agent(&mut self, agent: Agent) -> Result<AgentId, SimulationError> {
        let id = agent.id();
        if self.population.contains(id) {
            return Err(SimulationError::Inconsistent(format!(
                "agent {id} is already alive"
            )));
        }
        self.place_agent(agent)
    }

    pub(crate) fn place_agent(&mut self, agent: Agent) -> Result<AgentId, SimulationError> {
        let id = agent.id();
        self.grid.place(agent.position(), Cell::Agent(id))?;
        self.population.push(agent);
        Ok(id)
    }

    /// Puts food into an empty cell.
    pub fn place_food(&mut self, position: Position) -> Result<(), SimulationError> {
        self.grid.place(position, Cell::Food)
    }

    /// Seeds founders and food at distinct random cells, then records epoch 0.
    ///
    /// Fails without touching the grid when it has fewer empty cells than the
    /// configured founders plus food, e.g. on a second call.
    pub fn populate(&mut self) -> Result<(), SimulationError> {
        let needed = (self.config.population as u64).saturating_add(self.config.food_units as u64);
        let free = self.grid.cells().iter().filter(|cell| cell.is_empty()).count() as u64;
        if needed > free {
            return Err(SimulationError::InsufficientSpace { needed, free });
        }
        for _ in 0..self.config.population {
            let genome = Genome::new(self.rng.uniform(0, u64::from(u32::MAX)) as u32);
            let position = self.draw_free_position()?;
            self.spawn_founder(genome, position)?;
        }
        for _ in 0..self.config.food_units {
            let position = self.draw_free_position()?;
            self.place_food(position)?;
        }
        debug!(
            agents = self.population.len(),
            food = self.config.food_units,
            size = self.config.size,
            "populated world"
        );
        let snapshot = self.snapshot(0, BTreeMap::new());
        self.recorder.on_epoch(&snapshot);
        Ok(())
    }

    /// Full state of the live population paired with the given action log.
    #[must_use]
    pub fn snapshot(&self, elapsed_ms: u64, actions: BTreeMap<AgentId, Intent>) -> EpochSnapshot {
        EpochSnapshot {
            epoch: self.epoch,
            elapsed_ms,
            population: self.population.iter().map(Agent::record).collect(),
            actions,
        }
    }

    /// Removes every agent whose energy is zero from the population and the grid.
    pub fn death_sweep(&mut self) -> Result<usize, SimulationError> {
        let dead = self.population.remove_depleted();
        for agent in &dead {
            self.grid.remove(agent.position())?;
            trace!(agent = %agent.id(), "agent died");
        }
        Ok(dead.len())
    }

    /// Senses, decides and resolves for one agent against the current grid.
    pub fn act(&mut self, id: AgentId) -> Result<Intent, SimulationError> {
        let agent = self.population.require(id)?;
        let own = agent.genome().color();
        let sightings = if self.config.shuffle_sightings {
            sensor::sense_shuffled(&self.grid, &self.population, agent, self.rng.as_mut())?
        } else {
            sensor::sense(&self.grid, &self.population, agent)?
        };
        let intent = policy::decide(own, &sightings, self.rng.as_mut());
        let resolution = self.resolve(id, intent)?;
        trace!(agent = %id, kind = %intent.kind(), ?resolution, "resolved action");
        Ok(intent)
    }

    /// Execute one epoch: clear requests, sweep the dead, act every survivor in order.
    pub fn step(&mut self) -> Result<EpochSummary, SimulationError> {
        let started = Instant::now();
        self.epoch += 1;
        self.births = 0;
        self.requests.clear();

        let deaths = self.death_sweep()?;

        // Offspring appended during the cycle wait for the next epoch.
        let acting: Vec<AgentId> = self.population.iter().map(Agent::id).collect();
        let mut actions = BTreeMap::new();
        for id in acting {
            let intent = self.act(id)?;
            actions.insert(id, intent);
        }
        debug_assert!(
            self.verify_consistency().is_ok(),
            "grid and population diverged after epoch {}",
            self.epoch
        );

        let summary = EpochSummary {
            epoch: self.epoch,
            births: self.births,
            deaths,
            population: self.population.len(),
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;
        let snapshot = self.snapshot(elapsed_ms, actions);
        self.recorder.on_epoch(&snapshot);

        if self.history.len() >= self.config.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(summary);
        debug!(
            epoch = summary.epoch,
            births = summary.births,
            deaths = summary.deaths,
            population = summary.population,
            "epoch complete"
        );
        Ok(summary)
    }

    /// Runs the configured number of epochs.
    pub fn run(&mut self) -> Result<Vec<EpochSummary>, SimulationError> {
        (0..self.config.epochs).map(|_| self.step()).collect()
    }

    /// Checks that agent-occupied cells are exactly the positions of live agents.
    pub fn verify_consistency(&self) -> Result<(), SimulationError> {
        let mut seen = HashSet::with_capacity(self.population.len());
        for (pos, id) in self.grid.agent_cells() {
            let agent = self.population.get(id).ok_or_else(|| {
                SimulationError::Inconsistent(format!("cell ({}, {}) holds dead agent {id}", pos.x, pos.y))
            })?;
            if agent.position() != pos {
                return Err(SimulationError::Inconsistent(format!(
                    "agent {id} recorded at ({}, {}) but stored at ({}, {})",
                    agent.position().x,
                    agent.position().y,
                    pos.x,
                    pos.y
                )));
            }
            if !seen.insert(id) {
                return Err(SimulationError::Inconsistent(format!(
                    "agent {id} occupies more than one cell"
                )));
            }
        }
        if seen.len() != self.population.len() {
            return Err(SimulationError::Inconsistent(format!(
                "{} live agents but {} agent cells",
                self.population.len(),
                seen.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_filer_consummates() {
        let mut requests = MatingRequests::default();
        let (a, b) = (AgentId(1), AgentId(2));
        assert!(!requests.file(a, b));
        assert!(requests.file(b, a));
        assert_eq!(requests.pending(a), None);
        assert_eq!(requests.pending(b), Some(a));
    }

    #[test]
    fn redirected_requests_do_not_match() {
        let mut requests = MatingRequests::default();
        let (a, b, c) = (AgentId(1), AgentId(2), AgentId(3));
        assert!(!requests.file(a, b));
        assert!(!requests.file(c, a));
        assert!(!requests.file(b, c));
        assert_eq!(requests.len(), 3);
        requests.clear();
        assert!(requests.is_empty());
    }

    #[test]
    fn populating_a_full_world_fails_instead_of_spinning() {
        let mut world = WorldState::new(SimulationConfig {
            size: 2,
            population: 2,
            food_units: 2,
            rng_seed: Some(4),
            ..SimulationConfig::default()
        })
        .expect("world");
        world.populate().expect("first populate");
        assert_eq!(
            world.populate(),
            Err(SimulationError::InsufficientSpace { needed: 4, free: 0 })
        );
        assert_eq!(world.agent_count(), 2);
        world.verify_consistency().expect("consistent");
    }

    #[test]
    fn populate_counts_cells_taken_by_manual_placement() {
        let mut world = WorldState::new(SimulationConfig {
            size: 3,
            population: 5,
            food_units: 3,
            rng_seed: Some(8),
            ..SimulationConfig::default()
        })
        .expect("world");
        world.place_food(Position::new(0, 0)).expect("food");
        world.place_food(Position::new(1, 1)).expect("food");
        assert_eq!(
            world.populate(),
            Err(SimulationError::InsufficientSpace { needed: 8, free: 7 })
        );
        assert!(world.population().is_empty());
    }

    #[test]
    fn step_clears_requests_and_counts_epochs() {
        let mut world = WorldState::new(SimulationConfig {
            size: 10,
            population: 8,
            food_units: 8,
            rng_seed: Some(3),
            ..SimulationConfig::default()
        })
        .expect("world");
        world.populate().expect("populate");
        world.requests.file(AgentId(1), AgentId(2));
        let summary = world.step().expect("step");
        assert_eq!(summary.epoch, 1);
        assert_eq!(world.epoch(), 1);
        assert_eq!(world.history().count(), 1);
        assert!(world.requests().pending(AgentId(1)).is_none());
    }
}

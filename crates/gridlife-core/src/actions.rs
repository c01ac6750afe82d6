//! Applies a decided [`Intent`] to the world.

use tracing::{debug, trace};

use crate::agent::{Agent, AgentId, Position};
use crate::error::SimulationError;
use crate::grid::Cell;
use crate::policy::Intent;
use crate::sensor::Direction;
use crate::world::WorldState;

/// Observable outcome of one resolved action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The agent now stands at `to`; equal to `from` when every cell ahead was taken.
    Moved { from: Position, to: Position },
    /// `consumed` is set when a food cell was cleared; `credited` when energy was granted.
    Ate { consumed: bool, credited: bool },
    /// Request filed; the partner has not asked back yet this epoch.
    Requested { mate: AgentId },
    /// Mutual request consummated. `offspring` is `None` when no free cell was found.
    Mated { offspring: Option<AgentId> },
}

impl WorldState {
    /// Applies `intent` for agent `id`, then charges the base tax.
    pub fn resolve(&mut self, id: AgentId, intent: Intent) -> Result<Resolution, SimulationError> {
        let resolution = match intent {
            Intent::Move { direction } => self.resolve_move(id, direction)?,
            Intent::Eat { direction } => self.resolve_eat(id, direction)?,
            Intent::Mate { mate_id } => self.resolve_mate(id, mate_id)?,
        };
        let tax = self.config.base_tax;
        if self.population.require_mut(id)?.charge(tax) {
            trace!(agent = %id, "energy depleted");
        }
        Ok(resolution)
    }

    fn resolve_move(
        &mut self,
        id: AgentId,
        direction: Direction,
    ) -> Result<Resolution, SimulationError> {
        let agent = self.population.require(id)?;
        let from = agent.position();
        let speed = agent.genome().speed();

        match self.grid.at(from)? {
            Cell::Agent(held) if held == id => {}
            other => {
                return Err(SimulationError::Inconsistent(format!(
                    "agent {id} expected at ({}, {}) but the cell holds {other:?}",
                    from.x, from.y
                )));
            }
        }
        self.grid.remove(from)?;

        let mut steps = speed.min(direction.room(from, self.grid.size()));
        let mut to = direction.step(from, steps);
        while !self.grid.is_free(to)? {
            if steps == 0 {
                return Err(SimulationError::OccupiedCell { x: to.x, y: to.y });
            }
            steps -= 1;
            to = direction.step(from, steps);
        }
        self.grid.place(to, Cell::Agent(id))?;

        let cost = self.config.move_cost;
        let agent = self.population.require_mut(id)?;
        agent.set_position(to);
        if agent.charge(cost) {
            trace!(agent = %id, "energy depleted while moving");
        }
        Ok(Resolution::Moved { from, to })
    }

    fn resolve_eat(
        &mut self,
        id: AgentId,
        direction: Direction,
    ) -> Result<Resolution, SimulationError> {
        let from = self.population.require(id)?.position();
        let (dx, dy) = direction.delta();
        let target = self
            .grid
            .position(i64::from(from.x) + dx, i64::from(from.y) + dy)?;

        let (consumed, credited) = match self.grid.at(target)? {
            Cell::Food => {
                self.grid.remove(target)?;
                (true, true)
            }
            Cell::Empty => (false, !self.config.strict_feeding),
            // Another agent stepped into the food's place; never clear an occupant.
            Cell::Agent(_) => (false, false),
        };
        if credited {
            let amount = self.config.food_energy;
            self.population.require_mut(id)?.credit(amount);
        }
        Ok(Resolution::Ate { consumed, credited })
    }

    fn resolve_mate(&mut self, id: AgentId, mate: AgentId) -> Result<Resolution, SimulationError> {
        if !self.requests.file(id, mate) {
            return Ok(Resolution::Requested { mate });
        }
        let offspring = self.mate(id, mate)?;
        Ok(Resolution::Mated { offspring })
    }

    /// Breeds `first` with `second`, charging both parents whether or not a child is placed.
    fn mate(&mut self, first: AgentId, second: AgentId) -> Result<Option<AgentId>, SimulationError> {
        let a = self.population.require(first)?.clone();
        let b = self.population.require(second)?.clone();

        let genome = a
            .genome()
            .crossover(b.genome(), self.config.crossover.mask());
        let custody = if self.rng.index(2) == 0 { &a } else { &b };

        let cost = self.config.mate_cost;
        for parent in [first, second] {
            if self.population.require_mut(parent)?.charge(cost) {
                trace!(agent = %parent, "energy depleted while mating");
            }
        }

        let placement = match self.offspring_cell(custody.position()) {
            Ok(cell) => cell,
            Err(SimulationError::NoFreePosition { x, y }) => {
                debug!(parents = %format_args!("{first}+{second}"), x, y, "offspring discarded");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        let id = self.population.fresh_id(self.rng.as_mut());
        let energy = self.config.birth_energy(&self.layout, genome);
        let mut child = Agent::offspring(id, genome, (&a, &b), energy);
        child.set_position(placement);
        self.place_agent(child)?;
        self.births += 1;
        debug!(
            offspring = %id,
            parents = %format_args!("{first}+{second}"),
            genome = %genome,
            "offspring placed"
        );
        Ok(Some(id))
    }

    fn offspring_cell(&mut self, around: Position) -> Result<Position, SimulationError> {
        let free = self.grid.free_neighbors(around)?;
        if free.is_empty() {
            return Err(SimulationError::NoFreePosition {
                x: around.x,
                y: around.y,
            });
        }
        Ok(free[self.rng.index(free.len())])
    }
}

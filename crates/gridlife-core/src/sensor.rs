//! Ray-cast vision along the four cardinal directions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::agent::{Agent, AgentObservation, Position};
use crate::error::SimulationError;
use crate::grid::{Cell, Grid};
use crate::population::Population;
use crate::random::{RandomSource, shuffle};

/// Logical movement/vision directions. `Up` decreases `y`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    #[must_use]
    pub const fn delta(self) -> (i64, i64) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Cells between `pos` and the grid edge in this direction.
    #[must_use]
    pub const fn room(self, pos: Position, size: u32) -> u32 {
        match self {
            Direction::Up => pos.y,
            Direction::Down => size - 1 - pos.y,
            Direction::Left => pos.x,
            Direction::Right => size - 1 - pos.x,
        }
    }

    /// Position `steps` cells away; callers keep `steps <= room`.
    #[must_use]
    pub const fn step(self, pos: Position, steps: u32) -> Position {
        match self {
            Direction::Up => Position::new(pos.x, pos.y - steps),
            Direction::Down => Position::new(pos.x, pos.y + steps),
            Direction::Left => Position::new(pos.x - steps, pos.y),
            Direction::Right => Position::new(pos.x + steps, pos.y),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            other => Err(SimulationError::UnknownDirection(other.to_string())),
        }
    }
}

/// What a ray stopped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seen {
    Agent(AgentObservation),
    Food,
}

/// First occupied cell along one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sighting {
    pub direction: Direction,
    /// Empty cells between the observer and the occupant; 0 when adjacent.
    pub distance: u32,
    pub seen: Seen,
}

/// Casts one ray per cardinal direction up to the agent's sight radius.
///
/// Pure read of `grid` and `population`. The order of the result carries no meaning;
/// see [`sense_shuffled`].
pub fn sense(
    grid: &Grid,
    population: &Population,
    agent: &Agent,
) -> Result<Vec<Sighting>, SimulationError> {
    let sight = agent.genome().sight();
    if sight < 1 {
        return Ok(Vec::new());
    }

    let origin = agent.position();
    let mut sightings = Vec::with_capacity(4);
    for direction in [
        Direction::Right,
        Direction::Left,
        Direction::Down,
        Direction::Up,
    ] {
        let reach = sight.min(direction.room(origin, grid.size()));
        for steps in 1..=reach {
            let seen = match grid.at(direction.step(origin, steps))? {
                Cell::Empty => continue,
                Cell::Food => Seen::Food,
                Cell::Agent(id) => Seen::Agent(population.require(id)?.observe()),
            };
            sightings.push(Sighting {
                direction,
                distance: steps - 1,
                seen,
            });
            break;
        }
    }
    Ok(sightings)
}

/// [`sense`] followed by a shuffle, so policy tie-breaks carry no directional bias.
pub fn sense_shuffled(
    grid: &Grid,
    population: &Population,
    agent: &Agent,
    rng: &mut dyn RandomSource,
) -> Result<Vec<Sighting>, SimulationError> {
    let mut sightings = sense(grid, population, agent)?;
    shuffle(rng, &mut sightings);
    Ok(sightings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentId;
    use crate::genome::Genome;

    fn setup(size: u32, agents: &[(u32, u32, u32, u32)]) -> (Grid, Population) {
        let mut grid = Grid::new(size).expect("grid");
        let mut population = Population::new();
        for &(id, x, y, genome) in agents {
            let pos = Position::new(x, y);
            grid.place(pos, Cell::Agent(AgentId(id))).expect("place");
            population.push(Agent::founder(AgentId(id), Genome::new(genome), pos, 5));
        }
        (grid, population)
    }

    #[test]
    fn adjacent_neighbor_is_seen_at_distance_zero() {
        let sight_five = 0x5 << 12;
        let (grid, population) = setup(10, &[(1, 0, 0, sight_five), (2, 1, 0, 0xABC)]);
        let observer = population.get(AgentId(1)).expect("agent");
        let sightings = sense(&grid, &population, observer).expect("sense");
        assert_eq!(
            sightings,
            vec![Sighting {
                direction: Direction::Right,
                distance: 0,
                seen: Seen::Agent(AgentObservation {
                    id: AgentId(2),
                    color: Genome::new(0xABC).color(),
                }),
            }]
        );
    }

    #[test]
    fn blind_agents_see_nothing() {
        let (grid, population) = setup(4, &[(1, 1, 1, 0), (2, 2, 1, 0)]);
        let observer = population.get(AgentId(1)).expect("agent");
        assert!(sense(&grid, &population, observer).expect("sense").is_empty());
    }

    #[test]
    fn rays_stop_at_first_occupant_and_respect_radius() {
        let sight_three = 0x3 << 12;
        let (mut grid, population) = setup(
            12,
            &[(1, 5, 5, sight_three), (2, 7, 5, 0), (3, 8, 5, 0), (4, 5, 9, 0)],
        );
        grid.place(Position::new(5, 3), Cell::Food).expect("food");
        grid.place(Position::new(1, 5), Cell::Food).expect("food");
        let observer = population.get(AgentId(1)).expect("agent");
        let sightings = sense(&grid, &population, observer).expect("sense");

        assert_eq!(sightings.len(), 2);
        let right = sightings
            .iter()
            .find(|s| s.direction == Direction::Right)
            .expect("right ray");
        assert_eq!(right.distance, 1);
        assert!(matches!(right.seen, Seen::Agent(obs) if obs.id == AgentId(2)));
        let up = sightings
            .iter()
            .find(|s| s.direction == Direction::Up)
            .expect("up ray");
        assert_eq!(up.distance, 1);
        assert_eq!(up.seen, Seen::Food);
    }

    #[test]
    fn rays_clip_at_grid_edge() {
        let sight_max = 0xF << 12;
        let (grid, population) = setup(3, &[(1, 0, 0, sight_max)]);
        let observer = population.get(AgentId(1)).expect("agent");
        assert!(sense(&grid, &population, observer).expect("sense").is_empty());
    }

    #[test]
    fn direction_parsing_rejects_unknown_tags() {
        assert_eq!("left".parse::<Direction>(), Ok(Direction::Left));
        assert_eq!(
            "north".parse::<Direction>(),
            Err(SimulationError::UnknownDirection("north".to_string()))
        );
    }
}

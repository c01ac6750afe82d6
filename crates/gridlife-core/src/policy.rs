//! Fixed heuristic mapping sightings to a single intended action.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::agent::AgentId;
use crate::error::SimulationError;
use crate::genome::Color;
use crate::random::RandomSource;
use crate::sensor::{Direction, Seen, Sighting};

/// One action per agent per epoch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Intent {
    Move { direction: Direction },
    Eat { direction: Direction },
    Mate { mate_id: AgentId },
}

impl Intent {
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Intent::Move { .. } => ActionKind::Move,
            Intent::Eat { .. } => ActionKind::Eat,
            Intent::Mate { .. } => ActionKind::Mate,
        }
    }
}

/// Tag of an [`Intent`] without its payload.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Move,
    Eat,
    Mate,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ActionKind::Move => "move",
            ActionKind::Eat => "eat",
            ActionKind::Mate => "mate",
        })
    }
}

impl FromStr for ActionKind {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "move" => Ok(ActionKind::Move),
            "eat" => Ok(ActionKind::Eat),
            "mate" => Ok(ActionKind::Mate),
            other => Err(SimulationError::UnknownAction(other.to_string())),
        }
    }
}

/// Goal favored when both a mate and food are in view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Mate,
    Eat,
}

impl Priority {
    pub fn draw(rng: &mut dyn RandomSource) -> Self {
        if rng.coin() { Priority::Eat } else { Priority::Mate }
    }
}

/// Chooses the sighting the agent will pursue under `priority`.
///
/// Agents compete on color closeness; food is first-come. A held candidate of the other
/// kind is only displaced when the priority favors the newcomer's kind.
#[must_use]
pub fn select_target(own: Color, sightings: &[Sighting], priority: Priority) -> Option<&Sighting> {
    let mut selected: Option<&Sighting> = None;
    let mut best = 0.0_f64;

    for sighting in sightings {
        match (sighting.seen, selected.map(|s| s.seen)) {
            (Seen::Agent(obs), held) => {
                let score = own.closeness(obs.color);
                let claim = match held {
                    None => true,
                    Some(Seen::Agent(_)) => score > best,
                    Some(Seen::Food) => priority == Priority::Mate,
                };
                if claim {
                    selected = Some(sighting);
                    best = score;
                }
            }
            (Seen::Food, None) => selected = Some(sighting),
            (Seen::Food, Some(Seen::Agent(_))) if priority == Priority::Eat => {
                selected = Some(sighting);
            }
            (Seen::Food, Some(_)) => {}
        }
    }

    selected
}

/// Decides the acting agent's intent from its own color and what it sees.
pub fn decide(own: Color, sightings: &[Sighting], rng: &mut dyn RandomSource) -> Intent {
    let priority = Priority::draw(rng);
    decide_with_priority(own, sightings, priority, rng)
}

/// [`decide`] with the priority draw already made.
pub fn decide_with_priority(
    own: Color,
    sightings: &[Sighting],
    priority: Priority,
    rng: &mut dyn RandomSource,
) -> Intent {
    let Some(target) = select_target(own, sightings, priority) else {
        let direction = Direction::ALL[rng.index(Direction::ALL.len())];
        return Intent::Move { direction };
    };

    match (target.distance, target.seen) {
        (0, Seen::Agent(obs)) => Intent::Mate { mate_id: obs.id },
        (0, Seen::Food) => Intent::Eat {
            direction: target.direction,
        },
        _ => Intent::Move {
            direction: target.direction,
        },
    }
}

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::genome::{Color, Genome};

/// Opaque agent identity, rendered as `0x` followed by eight upper-case hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub u32);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

/// Error returned when an identity string is not `0x`-prefixed hex.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed agent id: {0}")]
pub struct ParseAgentIdError(pub String);

impl FromStr for AgentId {
    type Err = ParseAgentIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| ParseAgentIdError(s.to_string()))?;
        u32::from_str_radix(digits, 16)
            .map(AgentId)
            .map_err(|_| ParseAgentIdError(s.to_string()))
    }
}

impl Serialize for AgentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AgentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Cell coordinate; `x` grows rightwards, `y` grows downwards.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

impl Position {
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// What other agents are allowed to learn about an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentObservation {
    pub id: AgentId,
    pub color: Color,
}

/// Live agent state owned by the world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    id: AgentId,
    position: Position,
    generation: u32,
    energy: u32,
    genome: Genome,
    parents: Option<[AgentId; 2]>,
}

impl Agent {
    /// First-generation agent with no lineage.
    #[must_use]
    pub fn founder(id: AgentId, genome: Genome, position: Position, energy: u32) -> Self {
        Self {
            id,
            position,
            generation: 1,
            energy,
            genome,
            parents: None,
        }
    }

    /// Offspring of two parents; its position is assigned when it is placed.
    #[must_use]
    pub fn offspring(id: AgentId, genome: Genome, parents: (&Agent, &Agent), energy: u32) -> Self {
        let (a, b) = parents;
        Self {
            id,
            position: a.position,
            generation: a.generation.max(b.generation) + 1,
            energy,
            genome,
            parents: Some([a.id, b.id]),
        }
    }

    #[must_use]
    pub const fn id(&self) -> AgentId {
        self.id
    }

    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    #[must_use]
    pub const fn energy(&self) -> u32 {
        self.energy
    }

    #[must_use]
    pub const fn genome(&self) -> Genome {
        self.genome
    }

    #[must_use]
    pub const fn parents(&self) -> Option<[AgentId; 2]> {
        self.parents
    }

    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.energy == 0
    }

    /// Deducts `cost`, saturating at zero. Returns `true` when the agent is now depleted.
    pub fn charge(&mut self, cost: u32) -> bool {
        self.energy = self.energy.saturating_sub(cost);
        self.energy == 0
    }

    pub fn credit(&mut self, amount: u32) {
        self.energy = self.energy.saturating_add(amount);
    }

    #[must_use]
    pub fn observe(&self) -> AgentObservation {
        AgentObservation {
            id: self.id,
            color: self.genome.color(),
        }
    }

    #[must_use]
    pub fn record(&self) -> AgentRecord {
        AgentRecord {
            id: self.id,
            x: self.position.x,
            y: self.position.y,
            generation: self.generation,
            energy: self.energy,
            dna: self.genome,
            parents: self.parents,
        }
    }
}

/// Serializable full snapshot of an agent, as written to epoch logs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentRecord {
    pub id: AgentId,
    pub x: u32,
    pub y: u32,
    #[serde(rename = "gen")]
    pub generation: u32,
    pub energy: u32,
    pub dna: Genome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parents: Option<[AgentId; 2]>,
}

use thiserror::Error;

use crate::agent::AgentId;

/// Errors raised by the simulation core.
///
/// Everything except [`SimulationError::NoFreePosition`] is fatal to the run:
/// the core is deterministic given its inputs, so retrying reproduces the failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SimulationError {
    /// Coordinate outside the `[0, size)` extent of the grid.
    #[error("coordinate ({x}, {y}) is outside a {size}x{size} grid")]
    OutOfBounds { x: i64, y: i64, size: u32 },
    /// Attempted placement onto a non-empty cell.
    #[error("cell ({x}, {y}) is already occupied")]
    OccupiedCell { x: u32, y: u32 },
    /// Action tag outside the closed action set.
    #[error("unknown action: {0}")]
    UnknownAction(String),
    /// Direction tag outside the four cardinal directions.
    #[error("unknown direction: {0}")]
    UnknownDirection(String),
    /// No empty cell in the 8-neighborhood of `(x, y)`.
    #[error("no free cell around ({x}, {y})")]
    NoFreePosition { x: u32, y: u32 },
    /// Fewer empty cells than occupants requested by `populate`.
    #[error("cannot seed {needed} occupants into {free} free cells")]
    InsufficientSpace { needed: u64, free: u64 },
    /// Identity that does not belong to a live agent.
    #[error("no live agent with id {0}")]
    UnknownAgent(AgentId),
    /// Grid and population disagree about occupancy.
    #[error("grid and population diverged: {0}")]
    Inconsistent(String),
    /// Indicates an invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

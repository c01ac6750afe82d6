//! Core types and the epoch driver for the gridlife simulation.
//!
//! A [`WorldState`] owns a square [`Grid`] and the live [`Population`]. Each call to
//! [`WorldState::step`] sweeps depleted agents, then lets every survivor sense, decide
//! and act against the grid as it is mutated by the agents before it.

mod actions;
mod agent;
mod config;
mod error;
mod genome;
mod grid;
mod policy;
mod population;
mod random;
mod sensor;
mod world;

pub use actions::Resolution;
pub use agent::{Agent, AgentId, AgentObservation, AgentRecord, ParseAgentIdError, Position};
pub use config::SimulationConfig;
pub use error::SimulationError;
pub use genome::{
    COLOR_MASK, Color, CrossoverPattern, Genome, GenomeLayout, INTERLEAVE_PATTERN, SIGHT_MASK,
    SPEED_MASK,
};
pub use grid::{Cell, Grid};
pub use policy::{ActionKind, Intent, Priority, decide, decide_with_priority, select_target};
pub use population::Population;
pub use random::{RandomSource, RngSource, shuffle};
pub use sensor::{Direction, Seen, Sighting, sense, sense_shuffled};
pub use world::{
    EpochRecorder, EpochSnapshot, EpochSummary, MatingRequests, NullRecorder, WorldState,
};

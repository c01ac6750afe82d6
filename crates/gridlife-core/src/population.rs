use std::collections::HashMap;

use crate::agent::{Agent, AgentId};
use crate::error::SimulationError;
use crate::random::RandomSource;

/// Ordered list of live agents with an identity index.
///
/// Order is insertion order and is significant: the epoch driver acts agents in it.
#[derive(Debug, Clone, Default)]
pub struct Population {
    agents: Vec<Agent>,
    index: HashMap<AgentId, usize>,
}

impl Population {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: AgentId) -> bool {
        self.index.contains_key(&id)
    }

    #[must_use]
    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.index.get(&id).map(|&idx| &self.agents[idx])
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.index.get(&id).map(|&idx| &mut self.agents[idx])
    }

    pub(crate) fn require(&self, id: AgentId) -> Result<&Agent, SimulationError> {
        self.get(id).ok_or(SimulationError::UnknownAgent(id))
    }

    pub(crate) fn require_mut(&mut self, id: AgentId) -> Result<&mut Agent, SimulationError> {
        self.get_mut(id).ok_or(SimulationError::UnknownAgent(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    pub(crate) fn push(&mut self, agent: Agent) {
        self.index.insert(agent.id(), self.agents.len());
        self.agents.push(agent);
    }

    /// Draws a 32-bit identity not held by any live agent.
    pub fn fresh_id(&self, rng: &mut dyn RandomSource) -> AgentId {
        loop {
            let id = AgentId(rng.uniform(0, u64::from(u32::MAX)) as u32);
            if !self.contains(id) {
                return id;
            }
        }
    }

    /// Removes every depleted agent, preserving the order of survivors.
    pub(crate) fn remove_depleted(&mut self) -> Vec<Agent> {
        let (dead, alive): (Vec<Agent>, Vec<Agent>) = std::mem::take(&mut self.agents)
            .into_iter()
            .partition(Agent::is_depleted);
        self.agents = alive;
        self.reindex();
        dead
    }

    fn reindex(&mut self) {
        self.index.clear();
        self.index.extend(
            self.agents
                .iter()
                .enumerate()
                .map(|(idx, agent)| (agent.id(), idx)),
        );
    }
}

//! Bounded square occupancy grid.

use serde::{Deserialize, Serialize};

use crate::agent::{AgentId, Position};
use crate::error::SimulationError;

/// Contents of a single grid cell.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Cell {
    #[default]
    Empty,
    Agent(AgentId),
    Food,
}

impl Cell {
    #[must_use]
    pub const fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }
}

/// Fixed-size `size x size` grid; the single source of truth for occupancy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    size: u32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Construct an empty grid.
    pub fn new(size: u32) -> Result<Self, SimulationError> {
        if size == 0 {
            return Err(SimulationError::InvalidConfig("grid size must be non-zero"));
        }
        Ok(Self {
            size,
            cells: vec![Cell::Empty; (size as usize) * (size as usize)],
        })
    }

    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Whether signed coordinates fall inside the grid.
    #[must_use]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        let size = i64::from(self.size);
        (0..size).contains(&x) && (0..size).contains(&y)
    }

    /// Bounds-checked conversion from signed coordinates.
    pub fn position(&self, x: i64, y: i64) -> Result<Position, SimulationError> {
        if self.contains(x, y) {
            Ok(Position::new(x as u32, y as u32))
        } else {
            Err(self.out_of_bounds(x, y))
        }
    }

    fn out_of_bounds(&self, x: i64, y: i64) -> SimulationError {
        SimulationError::OutOfBounds {
            x,
            y,
            size: self.size,
        }
    }

    fn offset(&self, pos: Position) -> Result<usize, SimulationError> {
        if pos.x < self.size && pos.y < self.size {
            Ok((pos.y as usize) * (self.size as usize) + (pos.x as usize))
        } else {
            Err(self.out_of_bounds(i64::from(pos.x), i64::from(pos.y)))
        }
    }

    pub fn at(&self, pos: Position) -> Result<Cell, SimulationError> {
        let idx = self.offset(pos)?;
        Ok(self.cells[idx])
    }

    pub fn is_free(&self, pos: Position) -> Result<bool, SimulationError> {
        Ok(self.at(pos)?.is_empty())
    }

    /// Stores `content` in an empty cell.
    pub fn place(&mut self, pos: Position, content: Cell) -> Result<(), SimulationError> {
        let idx = self.offset(pos)?;
        if !self.cells[idx].is_empty() {
            return Err(SimulationError::OccupiedCell { x: pos.x, y: pos.y });
        }
        self.cells[idx] = content;
        Ok(())
    }

    /// Clears a cell, returning what it held.
    pub fn remove(&mut self, pos: Position) -> Result<Cell, SimulationError> {
        let idx = self.offset(pos)?;
        Ok(std::mem::take(&mut self.cells[idx]))
    }

    /// Empty in-bounds cells of the 8-connected neighborhood of `pos`.
    pub fn free_neighbors(&self, pos: Position) -> Result<Vec<Position>, SimulationError> {
        self.offset(pos)?;
        let mut free = Vec::with_capacity(8);
        for dx in -1i64..=1 {
            for dy in -1i64..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let (x, y) = (i64::from(pos.x) + dx, i64::from(pos.y) + dy);
                if !self.contains(x, y) {
                    continue;
                }
                let neighbor = Position::new(x as u32, y as u32);
                if self.is_free(neighbor)? {
                    free.push(neighbor);
                }
            }
        }
        Ok(free)
    }

    /// Iterates `(position, agent)` for every agent-occupied cell.
    pub fn agent_cells(&self) -> impl Iterator<Item = (Position, AgentId)> + '_ {
        let size = self.size as usize;
        self.cells.iter().enumerate().filter_map(move |(idx, cell)| match cell {
            Cell::Agent(id) => Some((
                Position::new((idx % size) as u32, (idx / size) as u32),
                *id,
            )),
            _ => None,
        })
    }

    #[must_use]
    pub fn food_count(&self) -> usize {
        self.cells.iter().filter(|cell| **cell == Cell::Food).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_rejects_occupied_cells() {
        let mut grid = Grid::new(4).expect("grid");
        let pos = Position::new(1, 2);
        grid.place(pos, Cell::Food).expect("place food");
        assert_eq!(grid.at(pos), Ok(Cell::Food));
        assert_eq!(
            grid.place(pos, Cell::Agent(AgentId(1))),
            Err(SimulationError::OccupiedCell { x: 1, y: 2 })
        );
    }

    #[test]
    fn remove_is_unconditional() {
        let mut grid = Grid::new(3).expect("grid");
        let pos = Position::new(2, 2);
        assert_eq!(grid.remove(pos), Ok(Cell::Empty));
        grid.place(pos, Cell::Agent(AgentId(4))).expect("place");
        assert_eq!(grid.remove(pos), Ok(Cell::Agent(AgentId(4))));
        assert_eq!(grid.at(pos), Ok(Cell::Empty));
    }

    #[test]
    fn lookups_are_bounds_checked() {
        let grid = Grid::new(5).expect("grid");
        assert!(matches!(
            grid.at(Position::new(5, 0)),
            Err(SimulationError::OutOfBounds { x: 5, y: 0, size: 5 })
        ));
        assert!(grid.position(-1, 3).is_err());
        assert_eq!(grid.position(4, 4), Ok(Position::new(4, 4)));
        assert!(Grid::new(0).is_err());
    }

    #[test]
    fn free_neighbors_respects_edges_and_occupants() {
        let mut grid = Grid::new(3).expect("grid");
        let corner = Position::new(0, 0);
        assert_eq!(grid.free_neighbors(corner).expect("neighbors").len(), 3);
        grid.place(Position::new(1, 1), Cell::Food).expect("place");
        let free = grid.free_neighbors(corner).expect("neighbors");
        assert_eq!(free, vec![Position::new(0, 1), Position::new(1, 0)]);
        assert_eq!(
            grid.free_neighbors(Position::new(1, 1)).expect("neighbors").len(),
            8
        );
    }

    #[test]
    fn agent_cells_reports_coordinates() {
        let mut grid = Grid::new(4).expect("grid");
        grid.place(Position::new(3, 1), Cell::Agent(AgentId(7)))
            .expect("place");
        grid.place(Position::new(0, 2), Cell::Food).expect("place");
        let agents: Vec<_> = grid.agent_cells().collect();
        assert_eq!(agents, vec![(Position::new(3, 1), AgentId(7))]);
        assert_eq!(grid.food_count(), 1);
    }
}

use crate::infra::{EnvError, Position};

use super::entity::{AgentId, Cell};

/// Bounded 2D grid with two parallel occupancy stores: static cell content
/// (walls, goals, obstacles) and the agent currently standing on each cell.
/// The two are tracked independently so an agent can stand on a goal cell.
///
/// At most one agent maps to any cell. Callers moving an agent must clear
/// the old cell and set the new one through [`Grid::set_agent`]; on small
/// grids the old and new cells can coincide, so clear before set.
#[derive(Debug, Clone)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    cells: Vec<Option<Cell>>,
    agents: Vec<Option<AgentId>>,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        let len = (width * height) as usize;
        Self {
            width,
            height,
            cells: vec![None; len],
            agents: vec![None; len],
        }
    }

    pub fn in_bounds(&self, pos: &Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    /// Interior cells are everything except the wall perimeter.
    pub fn is_interior(&self, pos: &Position) -> bool {
        pos.x >= 1 && pos.x < self.width - 1 && pos.y >= 1 && pos.y < self.height - 1
    }

    pub fn interior_cell_count(&self) -> usize {
        ((self.width - 2) * (self.height - 2)) as usize
    }

    fn index(&self, pos: &Position) -> Result<usize, EnvError> {
        if !self.in_bounds(pos) {
            return Err(EnvError::Bounds(*pos));
        }
        Ok((pos.y * self.width + pos.x) as usize)
    }

    pub fn get(&self, pos: &Position) -> Result<Option<Cell>, EnvError> {
        Ok(self.cells[self.index(pos)?])
    }

    pub fn set(&mut self, pos: &Position, cell: Option<Cell>) -> Result<(), EnvError> {
        let idx = self.index(pos)?;
        self.cells[idx] = cell;
        Ok(())
    }

    pub fn get_agent(&self, pos: &Position) -> Result<Option<AgentId>, EnvError> {
        Ok(self.agents[self.index(pos)?])
    }

    pub fn set_agent(&mut self, pos: &Position, agent: Option<AgentId>) -> Result<(), EnvError> {
        let idx = self.index(pos)?;
        self.agents[idx] = agent;
        Ok(())
    }

    /// Stamps walls on every boundary cell.
    pub fn wall_rect(&mut self) {
        for x in 0..self.width {
            self.cells[x as usize] = Some(Cell::Wall);
            self.cells[((self.height - 1) * self.width + x) as usize] = Some(Cell::Wall);
        }
        for y in 0..self.height {
            self.cells[(y * self.width) as usize] = Some(Cell::Wall);
            self.cells[(y * self.width + self.width - 1) as usize] = Some(Cell::Wall);
        }
    }

    pub fn iter_agents(&self) -> impl Iterator<Item = (Position, AgentId)> + '_ {
        self.agents.iter().enumerate().filter_map(|(idx, agent)| {
            agent.map(|id| {
                (
                    Position::new(idx as i32 % self.width, idx as i32 / self.width),
                    id,
                )
            })
        })
    }
}

use crate::infra::{Color, Position};
use crate::state::{AgentId, Cell, Goal, Grid};

/// Everything a rendering collaborator needs to draw one frame. Pixel and
/// window mechanics stay on the collaborator's side of the seam.
#[derive(Debug, Clone)]
pub struct RenderFrame {
    pub width: i32,
    pub height: i32,
    /// Row-major static cell content with its current display color.
    pub cells: Vec<Option<(Cell, Color)>>,
    pub agents: Vec<(AgentId, Position)>,
    /// Row-major field-of-view mask, recomputed from the agents' current
    /// positions. This is the live mask, not the episode's cumulative
    /// coverage matrix.
    pub highlight: Vec<bool>,
}

impl RenderFrame {
    pub(crate) fn build(grid: &Grid, goals: &[Goal], max_edge_dist: f32) -> Self {
        let agents: Vec<(AgentId, Position)> =
            grid.iter_agents().map(|(pos, id)| (id, pos)).collect();
        let agent_positions: Vec<Position> = agents.iter().map(|(_, pos)| *pos).collect();

        let mut cells = Vec::with_capacity((grid.width * grid.height) as usize);
        for y in 0..grid.height {
            for x in 0..grid.width {
                let pos = Position::new(x, y);
                let cell = grid.get(&pos).unwrap_or(None).map(|cell| {
                    let color = match cell {
                        Cell::Wall => Color::Grey,
                        Cell::Obstacle => Color::Blue,
                        Cell::Goal(id) => {
                            goals.get(id).map(|g| g.color).unwrap_or(Color::Green)
                        }
                    };
                    (cell, color)
                });
                cells.push(cell);
            }
        }

        let highlight = highlight_mask(grid, &agent_positions, max_edge_dist);

        Self {
            width: grid.width,
            height: grid.height,
            cells,
            agents,
            highlight,
        }
    }

    pub fn cell(&self, pos: &Position) -> Option<(Cell, Color)> {
        if pos.x < 0 || pos.x >= self.width || pos.y < 0 || pos.y >= self.height {
            return None;
        }
        self.cells[(pos.y * self.width + pos.x) as usize]
    }

    pub fn is_highlighted(&self, pos: &Position) -> bool {
        if pos.x < 0 || pos.x >= self.width || pos.y < 0 || pos.y >= self.height {
            return false;
        }
        self.highlight[(pos.y * self.width + pos.x) as usize]
    }
}

/// Row-major mask of every cell within `max_edge_dist` of any agent.
pub(crate) fn highlight_mask(
    grid: &Grid,
    agent_positions: &[Position],
    max_edge_dist: f32,
) -> Vec<bool> {
    let mut mask = vec![false; (grid.width * grid.height) as usize];
    for y in 0..grid.height {
        for x in 0..grid.width {
            let cell = Position::new(x, y);
            if agent_positions
                .iter()
                .any(|agent| cell.euclidean(agent) <= max_edge_dist)
            {
                mask[(y * grid.width + x) as usize] = true;
            }
        }
    }
    mask
}

/// Per-tick hooks for a rendering collaborator. The environment owns at most
/// one renderer as an explicit resource, so independent environment
/// instances can run side by side.
pub trait Renderer {
    fn on_reset(&mut self, frame: &RenderFrame);
    fn on_step(&mut self, frame: &RenderFrame);
    /// Releases any display resources. Called at most once per renderer.
    fn close(&mut self) {}
}

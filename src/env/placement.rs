use rand::Rng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::infra::{EnvError, Position};
use crate::state::{Agent, Cell, Goal, Grid};

/// Rejection-sampling budget per interior cell before placement gives up.
/// Keeps the sampling loop from spinning forever when the requested entity
/// counts approach the interior capacity; exhaustion surfaces as
/// [`EnvError::Placement`].
const ATTEMPTS_PER_CELL: usize = 32;

/// Per-episode layout produced alongside grid mutations: the goal registry
/// and the obstacle positions.
pub(crate) struct Layout {
    pub goals: Vec<Goal>,
    pub obstacles: Vec<Position>,
}

/// Populates a freshly cleared grid: wall perimeter, agents by count, then
/// randomly scattered goals and obstacles.
pub(crate) fn generate(
    grid: &mut Grid,
    agents: &mut [Agent],
    num_goals: usize,
    num_obstacles: usize,
    rng: &mut StdRng,
) -> Result<Layout, EnvError> {
    grid.wall_rect();
    place_agents(grid, agents)?;

    let mut goals = Vec::with_capacity(num_goals);
    for id in 0..num_goals {
        let pos = sample_empty_interior(grid, rng)?;
        grid.set(&pos, Some(Cell::Goal(id)))?;
        goals.push(Goal::new(pos));
    }

    let mut obstacles = Vec::with_capacity(num_obstacles);
    for _ in 0..num_obstacles {
        let pos = sample_empty_interior(grid, rng)?;
        grid.set(&pos, Some(Cell::Obstacle))?;
        obstacles.push(pos);
    }

    debug!(
        agents = agents.len(),
        goals = goals.len(),
        obstacles = obstacles.len(),
        "Layout generated"
    );
    Ok(Layout { goals, obstacles })
}

/// Fixed agent layouts for small counts, an evenly spaced walk of the
/// interior perimeter ring for larger ones.
fn place_agents(grid: &mut Grid, agents: &mut [Agent]) -> Result<(), EnvError> {
    let (w, h) = (grid.width, grid.height);
    let positions: Vec<Position> = match agents.len() {
        0 => Vec::new(),
        // Bottom center.
        1 => vec![Position::new(w / 2, h - 2)],
        // Bottom corners.
        2 => vec![Position::new(1, h - 2), Position::new(w - 2, h - 2)],
        // Bottom corners plus top center.
        3 => vec![
            Position::new(1, h - 2),
            Position::new(w - 2, h - 2),
            Position::new(w / 2, 1),
        ],
        // All four corners.
        4 => vec![
            Position::new(1, 1),
            Position::new(w - 2, 1),
            Position::new(1, h - 2),
            Position::new(w - 2, h - 2),
        ],
        n => edge_positions(w, h, n),
    };

    for (agent, pos) in agents.iter_mut().zip(positions) {
        agent.spawn(pos);
        grid.set_agent(&pos, Some(agent.id))?;
    }
    Ok(())
}

/// Walks the interior perimeter ring clockwise from the top-left corner,
/// spacing agents by arc length (`total_edge_length / n`).
fn edge_positions(width: i32, height: i32, n: usize) -> Vec<Position> {
    let total_edge_length = 2 * (width - 2) + 2 * (height - 2);
    let spacing = total_edge_length as f64 / n as f64;

    let mut positions = Vec::with_capacity(n);
    let mut current = 0.0f64;
    for _ in 0..n {
        let edge_pos = current as i32;
        let pos = if edge_pos < width - 2 {
            // Top edge, left to right.
            Position::new(edge_pos + 1, 1)
        } else if edge_pos < width + height - 4 {
            // Right edge, top to bottom.
            Position::new(width - 2, edge_pos - width + 3)
        } else if edge_pos < 2 * width + height - 6 {
            // Bottom edge, right to left.
            Position::new(2 * width + height - 7 - edge_pos, height - 2)
        } else {
            // Left edge, bottom to top.
            Position::new(1, total_edge_length - edge_pos)
        };
        positions.push(pos);
        current += spacing;
    }
    positions
}

/// Samples uniform interior coordinates until one with no static content
/// comes up. Agent occupancy is deliberately not checked: a goal or
/// obstacle may appear under a spawned agent, and the move resolver copes
/// with that once the agent steps away.
fn sample_empty_interior(grid: &Grid, rng: &mut StdRng) -> Result<Position, EnvError> {
    let max_attempts = grid.interior_cell_count() * ATTEMPTS_PER_CELL;
    for _ in 0..max_attempts {
        let pos = Position::new(
            rng.random_range(1..grid.width - 1),
            rng.random_range(1..grid.height - 1),
        );
        if grid.get(&pos)?.is_none() {
            return Ok(pos);
        }
    }
    Err(EnvError::Placement {
        attempts: max_attempts,
    })
}

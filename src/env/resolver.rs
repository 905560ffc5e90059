use tracing::debug;

use crate::infra::{Action, EnvError, Position};
use crate::state::{Agent, Cell, Goal, Grid};

use super::config::EnvConfig;

/// Time-decayed reward shaping, applied uniformly to goal rewards and
/// penalties alike.
pub(crate) fn shaped(reward: f32, gamma: f32, step_count: u32) -> f32 {
    reward * gamma.powi(step_count as i32)
}

/// Resolves one agent's move intent against the current grid state and
/// returns the shaped reward. Agents are resolved one at a time in stable
/// index order, so a later agent sees every earlier agent's mutation within
/// the same tick; move conflicts therefore favor the lower-indexed agent.
///
/// Classification, in order of precedence:
/// - in-bounds, no content, no occupant: free move, reward 0
/// - occupied by another agent, wall, or out of bounds: invalid move, the
///   agent stays put and collects the invalid-move penalty
/// - overlappable content (goal or obstacle): the agent moves on and the
///   content decides the reward
pub(crate) fn resolve_move(
    grid: &mut Grid,
    goals: &mut [Goal],
    agent: &mut Agent,
    action: Action,
    config: &EnvConfig,
    step_count: u32,
    num_collected: &mut usize,
) -> Result<f32, EnvError> {
    let target = agent.pos.step(action);
    if !grid.in_bounds(&target) {
        return Ok(shaped(config.penalty_invalid_move, config.gamma, step_count));
    }

    let cell = grid.get(&target)?;
    let occupant = grid.get_agent(&target)?;

    match (cell, occupant) {
        (None, None) => {
            move_agent(grid, agent, target)?;
            Ok(0.0)
        }
        (Some(cell), None) if cell.can_overlap() => {
            resolve_overlap(grid, goals, agent, target, cell, config, step_count, num_collected)
        }
        _ => Ok(shaped(config.penalty_invalid_move, config.gamma, step_count)),
    }
}

/// The agent steps onto occupied content: a goal (fresh or collected) or an
/// obstacle. Anything else reaching this path means the grid and the entity
/// registry disagree.
fn resolve_overlap(
    grid: &mut Grid,
    goals: &mut [Goal],
    agent: &mut Agent,
    target: Position,
    cell: Cell,
    config: &EnvConfig,
    step_count: u32,
    num_collected: &mut usize,
) -> Result<f32, EnvError> {
    let reward = match cell {
        Cell::Goal(id) => {
            let goal = goals
                .get_mut(id)
                .ok_or_else(|| EnvError::Consistency(format!("goal {id} is not in the registry")))?;
            if !goal.collected {
                goal.collect();
                *num_collected += 1;
                debug!(agent = agent.id, x = target.x, y = target.y, "Goal collected");
                shaped(config.reward_goal, config.gamma, step_count)
            } else {
                shaped(config.penalty_goal, config.gamma, step_count)
            }
        }
        Cell::Obstacle => shaped(config.penalty_obstacle, config.gamma, step_count),
        Cell::Wall => {
            return Err(EnvError::Consistency(
                "wall cell reached overlap handling".to_string(),
            ));
        }
    };

    move_agent(grid, agent, target)?;
    Ok(reward)
}

/// Occupancy update for a successful move. Clear before set: on small grids
/// an out-of-order update could wipe the agent's fresh entry.
fn move_agent(grid: &mut Grid, agent: &mut Agent, target: Position) -> Result<(), EnvError> {
    grid.set_agent(&agent.pos, None)?;
    grid.set_agent(&target, Some(agent.id))?;
    agent.pos = target;
    Ok(())
}

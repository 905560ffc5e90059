use crate::state::{Agent, Goal, GoalId};

/// Number of nearest-goal slots in an observation.
pub const MAX_OBS_GOALS: usize = 3;

/// Fixed observation length: own (x, y) plus (x, y, collected) per goal slot.
pub const OBS_LEN: usize = 2 + MAX_OBS_GOALS * 3;

/// Builds one agent's partial observation: its own position followed by the
/// up-to-three nearest goals within `max_edge_dist` (Euclidean), sorted
/// ascending by distance and zero-padded to a fixed length.
///
/// Side effect: refreshes the agent's cached observation and in-view goal
/// list; the latter feeds only the rendering collaborator's highlighting.
pub(crate) fn build_observation(
    agent: &mut Agent,
    goals: &[Goal],
    max_edge_dist: f32,
) -> Vec<f32> {
    let mut obs = Vec::with_capacity(OBS_LEN);
    obs.push(agent.pos.x as f32);
    obs.push(agent.pos.y as f32);

    let mut in_range: Vec<(GoalId, f32)> = goals
        .iter()
        .enumerate()
        .filter_map(|(id, goal)| {
            let dist = agent.pos.euclidean(&goal.pos);
            (dist <= max_edge_dist).then_some((id, dist))
        })
        .collect();
    in_range.sort_by(|a, b| a.1.total_cmp(&b.1));
    in_range.truncate(MAX_OBS_GOALS);

    for &(id, _) in &in_range {
        let goal = &goals[id];
        obs.push(goal.pos.x as f32);
        obs.push(goal.pos.y as f32);
        obs.push(if goal.collected { 1.0 } else { 0.0 });
    }
    for _ in in_range.len()..MAX_OBS_GOALS {
        obs.extend([0.0, 0.0, 0.0]);
    }

    agent.goals_in_view = in_range.into_iter().map(|(id, _)| id).collect();
    agent.obs = obs.clone();
    obs
}

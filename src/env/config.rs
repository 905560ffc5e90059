/// Environment configuration. Every option recognized by the environment
/// lives here; the demo binary fills it from `MULTIGRID_*` environment
/// variables, a training harness constructs it directly.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// Grid side length (width == height), walls included.
    pub grid_size: i32,
    /// Declared observation vector length, for consumers sizing their input
    /// layers. Must match [`crate::env::OBS_LEN`].
    pub obs_size: usize,
    /// Number of goals placed per episode.
    pub num_goals: usize,
    /// Number of obstacles placed per episode.
    pub num_obstacles: usize,
    /// Side length of the square view window a rendering collaborator may
    /// crop around each agent.
    pub agent_view_size: i32,
    /// Maximum ticks per episode.
    pub episode_steps: u32,
    /// Visibility/coverage radius (Euclidean).
    pub max_edge_dist: f32,
    /// Reward time-decay factor; rewards are scaled by gamma^step_count.
    pub gamma: f32,
    /// Reward for collecting a fresh goal.
    pub reward_goal: f32,
    /// Penalty for stepping onto an already-collected goal.
    pub penalty_goal: f32,
    /// Penalty for stepping onto an obstacle.
    pub penalty_obstacle: f32,
    /// Penalty for an invalid move (wall, out of bounds, occupied cell).
    pub penalty_invalid_move: f32,
    /// RNG seed for goal/obstacle placement. None seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            grid_size: 10,
            obs_size: super::OBS_LEN,
            num_goals: 3,
            num_obstacles: 2,
            agent_view_size: 5,
            episode_steps: 100,
            max_edge_dist: 3.0,
            gamma: 0.99,
            reward_goal: 10.0,
            penalty_goal: -1.0,
            penalty_obstacle: -2.0,
            penalty_invalid_move: -5.0,
            seed: None,
        }
    }
}

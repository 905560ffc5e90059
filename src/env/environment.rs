use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::infra::{Action, EnvError, Position};
use crate::state::{Agent, Goal, Grid};

use super::config::EnvConfig;
use super::coverage::CoverageTracker;
use super::observation::build_observation;
use super::placement;
use super::render::{RenderFrame, Renderer, highlight_mask};
use super::resolver;

/// Fixed-length per-agent observation vector ([`super::OBS_LEN`] scalars).
pub type Observation = Vec<f32>;

/// Per-tick info. The goal fields are populated only on terminal ticks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepInfo {
    pub seen_percentage: f32,
    pub goals_collected: Option<usize>,
    pub goals_percentage: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct StepResult {
    pub observations: Vec<Observation>,
    pub rewards: Vec<f32>,
    /// Globally uniform: once any agent's done-condition fires, every entry
    /// is true.
    pub dones: Vec<bool>,
    pub info: StepInfo,
}

/// The episode controller. Owns the grid, the entity registries, the
/// coverage tracker and its own RNG, so many instances can run independently
/// in parallel training workers.
pub struct MultiGridEnv {
    pub config: EnvConfig,
    pub grid: Grid,
    /// Agents persist across resets: identity is retained, position and
    /// cached state are rewritten by each reset.
    pub agents: Vec<Agent>,
    /// Goal registry for the current episode; grid goal cells index into it.
    pub goals: Vec<Goal>,
    pub obstacles: Vec<Position>,
    coverage: CoverageTracker,
    rng: StdRng,
    step_count: u32,
    num_collected: usize,
    renderer: Option<Box<dyn Renderer>>,
}

impl MultiGridEnv {
    /// Builds an environment around an externally supplied agent collection.
    /// Agent ids are rewritten to match list order; observation, reward and
    /// done vectors all follow that order.
    pub fn new(config: EnvConfig, mut agents: Vec<Agent>) -> Self {
        for (id, agent) in agents.iter_mut().enumerate() {
            agent.id = id;
        }
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let grid = Grid::new(config.grid_size, config.grid_size);
        let coverage = CoverageTracker::new(config.grid_size, config.grid_size);

        Self {
            config,
            grid,
            agents,
            goals: Vec::new(),
            obstacles: Vec::new(),
            coverage,
            rng,
            step_count: 0,
            num_collected: 0,
            renderer: None,
        }
    }

    /// Attaches the rendering collaborator. The environment owns it until
    /// [`MultiGridEnv::close`].
    pub fn set_renderer(&mut self, renderer: Box<dyn Renderer>) {
        self.renderer = Some(renderer);
    }

    /// Starts a fresh episode: new grid, goals and obstacles; agents are
    /// re-placed in place. Returns one observation per agent.
    pub fn reset(&mut self, render: bool) -> Result<Vec<Observation>, EnvError> {
        self.step_count = 0;
        self.num_collected = 0;
        self.coverage.reset();

        self.grid = Grid::new(self.config.grid_size, self.config.grid_size);
        let layout = placement::generate(
            &mut self.grid,
            &mut self.agents,
            self.config.num_goals,
            self.config.num_obstacles,
            &mut self.rng,
        )?;
        self.goals = layout.goals;
        self.obstacles = layout.obstacles;

        let max_edge_dist = self.config.max_edge_dist;
        let observations: Vec<Observation> = self
            .agents
            .iter_mut()
            .map(|agent| build_observation(agent, &self.goals, max_edge_dist))
            .collect();

        if render {
            self.notify_renderer(true);
        }
        debug!(
            agents = self.agents.len(),
            goals = self.goals.len(),
            "Episode reset"
        );
        Ok(observations)
    }

    /// Advances the simulation one tick: resolves every agent's move in
    /// stable index order, updates coverage, and reports observations,
    /// rewards, done flags and info.
    pub fn step(&mut self, actions: &[Action], render: bool) -> Result<StepResult, EnvError> {
        if actions.len() != self.agents.len() {
            return Err(EnvError::Consistency(format!(
                "got {} actions for {} agents",
                actions.len(),
                self.agents.len()
            )));
        }

        self.step_count += 1;
        let mut rewards = Vec::with_capacity(actions.len());
        for (idx, action) in actions.iter().enumerate() {
            let reward = resolver::resolve_move(
                &mut self.grid,
                &mut self.goals,
                &mut self.agents[idx],
                *action,
                &self.config,
                self.step_count,
                &mut self.num_collected,
            )?;
            rewards.push(reward);
        }

        let agent_positions: Vec<Position> = self.agents.iter().map(|a| a.pos).collect();
        self.coverage
            .update(&agent_positions, self.config.max_edge_dist);

        // One agent hitting its done-condition ends the episode for all.
        let done = self.step_count >= self.config.episode_steps
            || self.num_collected >= self.config.num_goals;
        let dones = vec![done; self.agents.len()];

        let mut info = StepInfo {
            seen_percentage: self.coverage.seen_percentage(),
            ..StepInfo::default()
        };
        if done {
            info.goals_collected = Some(self.num_collected);
            info.goals_percentage = Some(if self.config.num_goals == 0 {
                100.0
            } else {
                self.num_collected as f32 / self.config.num_goals as f32 * 100.0
            });
            info!(
                steps = self.step_count,
                collected = self.num_collected,
                seen_percentage = info.seen_percentage,
                "Episode finished"
            );
        }

        let max_edge_dist = self.config.max_edge_dist;
        let observations: Vec<Observation> = self
            .agents
            .iter_mut()
            .map(|agent| build_observation(agent, &self.goals, max_edge_dist))
            .collect();

        if render {
            self.notify_renderer(false);
        }

        Ok(StepResult {
            observations,
            rewards,
            dones,
            info,
        })
    }

    /// Releases the rendering collaborator, if any. Idempotent.
    pub fn close(&mut self) {
        if let Some(mut renderer) = self.renderer.take() {
            renderer.close();
        }
    }

    /// Snapshot of the queryable grid state for rendering.
    pub fn render_frame(&self) -> RenderFrame {
        RenderFrame::build(&self.grid, &self.goals, self.config.max_edge_dist)
    }

    /// Live field-of-view mask over the full grid, derived from current
    /// agent positions.
    pub fn fov_mask(&self) -> Vec<bool> {
        let positions: Vec<Position> = self.agents.iter().map(|a| a.pos).collect();
        highlight_mask(&self.grid, &positions, self.config.max_edge_dist)
    }

    pub fn step_count(&self) -> u32 {
        self.step_count
    }

    pub fn num_collected(&self) -> usize {
        self.num_collected
    }

    pub fn seen_percentage(&self) -> f32 {
        self.coverage.seen_percentage()
    }

    fn notify_renderer(&mut self, is_reset: bool) {
        if self.renderer.is_none() {
            return;
        }
        let frame = RenderFrame::build(&self.grid, &self.goals, self.config.max_edge_dist);
        if let Some(renderer) = self.renderer.as_mut() {
            if is_reset {
                renderer.on_reset(&frame);
            } else {
                renderer.on_step(&frame);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Cell;

    fn test_config(grid_size: i32, num_goals: usize) -> EnvConfig {
        EnvConfig {
            grid_size,
            num_goals,
            num_obstacles: 0,
            episode_steps: 50,
            max_edge_dist: 10.0,
            gamma: 1.0,
            reward_goal: 10.0,
            seed: Some(42),
            ..EnvConfig::default()
        }
    }

    fn make_env(grid_size: i32, num_agents: usize, num_goals: usize) -> MultiGridEnv {
        let agents = (0..num_agents).map(Agent::new).collect();
        MultiGridEnv::new(test_config(grid_size, num_goals), agents)
    }

    /// Moves the episode's single goal to `pos` after reset.
    fn relocate_goal(env: &mut MultiGridEnv, pos: Position) {
        let old = env.goals[0].pos;
        env.grid.set(&old, None).unwrap();
        env.grid.set(&pos, Some(Cell::Goal(0))).unwrap();
        env.goals[0].pos = pos;
    }

    #[test]
    fn test_goal_collection_scenario() {
        // 4x4 interior, agent at bottom center (3, 4), goal two cells up.
        let mut env = make_env(6, 1, 1);
        let obs = env.reset(false).unwrap();
        assert_eq!(obs.len(), 1);
        assert_eq!(obs[0].len(), crate::env::OBS_LEN);
        assert_eq!(env.agents[0].pos, Position::new(3, 4));
        relocate_goal(&mut env, Position::new(3, 2));

        let result = env.step(&[Action::Up], false).unwrap();
        assert_eq!(result.rewards, vec![0.0]);
        assert_eq!(result.dones, vec![false]);
        assert!(result.info.goals_collected.is_none());

        let result = env.step(&[Action::Up], false).unwrap();
        assert_eq!(result.rewards, vec![10.0]);
        assert_eq!(result.dones, vec![true]);
        assert!(env.goals[0].collected);
        assert_eq!(result.info.goals_collected, Some(1));
        assert_eq!(result.info.goals_percentage, Some(100.0));
    }

    #[test]
    fn test_wall_bump_scenario() {
        let mut env = make_env(6, 1, 1);
        env.reset(false).unwrap();
        relocate_goal(&mut env, Position::new(1, 1));

        // Agent at (3, 4); down is the perimeter wall.
        let result = env.step(&[Action::Down], false).unwrap();
        assert_eq!(env.agents[0].pos, Position::new(3, 4));
        assert_eq!(result.rewards, vec![env.config.penalty_invalid_move]);
        assert_eq!(result.dones, vec![false]);
    }

    #[test]
    fn test_sequential_resolution_gives_first_mover_advantage() {
        let mut env = make_env(6, 2, 1);
        env.reset(false).unwrap();
        relocate_goal(&mut env, Position::new(1, 1));

        // Agents spawn at (1, 4) and (4, 4); move agent 1 next to agent 0's
        // target cell.
        env.grid.set_agent(&Position::new(4, 4), None).unwrap();
        env.grid.set_agent(&Position::new(3, 4), Some(1)).unwrap();
        env.agents[1].pos = Position::new(3, 4);

        // Agent 0 takes (2, 4) first; agent 1's move into it is invalid.
        let result = env.step(&[Action::Right, Action::Left], false).unwrap();
        assert_eq!(env.agents[0].pos, Position::new(2, 4));
        assert_eq!(env.agents[1].pos, Position::new(3, 4));
        assert_eq!(result.rewards[0], 0.0);
        assert_eq!(result.rewards[1], env.config.penalty_invalid_move);
    }

    #[test]
    fn test_single_agent_occupancy_invariant() {
        let mut env = make_env(8, 4, 2);
        env.reset(false).unwrap();

        let actions = [Action::Up, Action::Down, Action::Left, Action::Right];
        for tick in 0..10 {
            env.step(&actions, false).unwrap();
            let occupied: Vec<_> = env.grid.iter_agents().collect();
            assert_eq!(occupied.len(), 4, "tick {tick}");
            for (pos, id) in occupied {
                assert_eq!(env.agents[id].pos, pos, "tick {tick}");
            }
        }
    }

    #[test]
    fn test_step_cap_terminates_all_agents() {
        let mut env = make_env(8, 2, 1);
        env.config.episode_steps = 3;
        env.reset(false).unwrap();
        relocate_goal(&mut env, Position::new(6, 1));

        for _ in 0..2 {
            let result = env.step(&[Action::Up, Action::Up], false).unwrap();
            assert_eq!(result.dones, vec![false, false]);
        }
        let result = env.step(&[Action::Up, Action::Up], false).unwrap();
        assert_eq!(result.dones, vec![true, true]);
        assert!(result.info.goals_collected.is_some());
    }

    #[test]
    fn test_seen_percentage_is_monotonic() {
        let mut env = make_env(10, 1, 1);
        env.config.max_edge_dist = 2.0;
        env.reset(false).unwrap();
        relocate_goal(&mut env, Position::new(1, 1));

        let mut prev = 0.0;
        for action in [Action::Up, Action::Up, Action::Left, Action::Right, Action::Down] {
            let result = env.step(&[action], false).unwrap();
            assert!(result.info.seen_percentage >= prev);
            prev = result.info.seen_percentage;
        }
    }

    #[test]
    fn test_agents_persist_across_resets() {
        let mut env = make_env(6, 1, 1);
        env.reset(false).unwrap();
        relocate_goal(&mut env, Position::new(3, 3));
        env.step(&[Action::Up], false).unwrap();
        assert_eq!(env.num_collected(), 1);

        env.reset(false).unwrap();
        assert_eq!(env.num_collected(), 0);
        assert_eq!(env.step_count(), 0);
        assert_eq!(env.agents[0].id, 0);
        assert_eq!(env.agents[0].pos, Position::new(3, 4));
        assert!(!env.goals[0].collected);
    }

    #[test]
    fn test_action_count_mismatch_is_fatal() {
        let mut env = make_env(6, 2, 1);
        env.reset(false).unwrap();
        let result = env.step(&[Action::Up], false);
        assert!(matches!(result, Err(EnvError::Consistency(_))));
    }

    struct CountingRenderer {
        resets: std::rc::Rc<std::cell::Cell<usize>>,
        steps: std::rc::Rc<std::cell::Cell<usize>>,
        closes: std::rc::Rc<std::cell::Cell<usize>>,
    }

    impl Renderer for CountingRenderer {
        fn on_reset(&mut self, _frame: &RenderFrame) {
            self.resets.set(self.resets.get() + 1);
        }
        fn on_step(&mut self, frame: &RenderFrame) {
            assert_eq!(frame.agents.len(), 1);
            self.steps.set(self.steps.get() + 1);
        }
        fn close(&mut self) {
            self.closes.set(self.closes.get() + 1);
        }
    }

    #[test]
    fn test_renderer_lifecycle_and_idempotent_close() {
        let resets = std::rc::Rc::new(std::cell::Cell::new(0));
        let steps = std::rc::Rc::new(std::cell::Cell::new(0));
        let closes = std::rc::Rc::new(std::cell::Cell::new(0));

        let mut env = make_env(6, 1, 1);
        env.set_renderer(Box::new(CountingRenderer {
            resets: resets.clone(),
            steps: steps.clone(),
            closes: closes.clone(),
        }));

        env.reset(true).unwrap();
        env.step(&[Action::Up], true).unwrap();
        env.step(&[Action::Up], false).unwrap(); // render gated off
        assert_eq!(resets.get(), 1);
        assert_eq!(steps.get(), 1);

        env.close();
        env.close();
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_fov_mask_matches_live_positions() {
        let mut env = make_env(6, 1, 1);
        env.config.max_edge_dist = 1.0;
        env.reset(false).unwrap();

        let mask = env.fov_mask();
        let agent = env.agents[0].pos;
        let idx = |p: Position| (p.y * 6 + p.x) as usize;
        assert!(mask[idx(agent)]);
        assert!(mask[idx(Position::new(agent.x, agent.y - 1))]);
        assert!(!mask[idx(Position::new(1, 1))]);
    }
}

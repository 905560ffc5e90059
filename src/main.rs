use std::env;
use std::str::FromStr;

use dotenv::dotenv;
use rand::seq::IndexedRandom;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use multigrid::{Action, Agent, EnvConfig, MultiGridEnv};

fn get_env_var<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|val| val.parse::<T>().ok())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("multigrid=debug,info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn load_config() -> EnvConfig {
    let mut config = EnvConfig::default();
    if let Some(v) = get_env_var("MULTIGRID_GRID_SIZE") {
        config.grid_size = v;
    }
    if let Some(v) = get_env_var("MULTIGRID_NUM_GOALS") {
        config.num_goals = v;
    }
    if let Some(v) = get_env_var("MULTIGRID_NUM_OBSTACLES") {
        config.num_obstacles = v;
    }
    if let Some(v) = get_env_var("MULTIGRID_EPISODE_STEPS") {
        config.episode_steps = v;
    }
    if let Some(v) = get_env_var("MULTIGRID_MAX_EDGE_DIST") {
        config.max_edge_dist = v;
    }
    if let Some(v) = get_env_var("MULTIGRID_GAMMA") {
        config.gamma = v;
    }
    config.seed = get_env_var("MULTIGRID_SEED");
    config
}

/// Drives a few episodes with a uniformly random policy, logging per-episode
/// returns and coverage. Mostly useful as a smoke test of the environment.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_logging();

    let config = load_config();
    let num_agents: usize = get_env_var("MULTIGRID_NUM_AGENTS").unwrap_or(2);
    let episodes: usize = get_env_var("MULTIGRID_EPISODES").unwrap_or(5);

    tracing::info!(
        grid_size = config.grid_size,
        num_agents,
        goals = config.num_goals,
        obstacles = config.num_obstacles,
        "Starting random-policy rollout"
    );

    let agents: Vec<Agent> = (0..num_agents).map(Agent::new).collect();
    let mut env = MultiGridEnv::new(config, agents);
    let mut rng = rand::rng();

    for episode in 0..episodes {
        env.reset(false)?;
        let mut returns = vec![0.0f32; num_agents];

        loop {
            let actions: Vec<Action> = (0..num_agents)
                .map(|_| *Action::ALL.choose(&mut rng).expect("non-empty action set"))
                .collect();
            let result = env.step(&actions, false)?;
            for (ret, reward) in returns.iter_mut().zip(&result.rewards) {
                *ret += reward;
            }
            if result.dones.iter().any(|done| *done) {
                tracing::info!(
                    episode,
                    steps = env.step_count(),
                    goals_collected = ?result.info.goals_collected,
                    seen_percentage = result.info.seen_percentage,
                    ?returns,
                    "Episode complete"
                );
                break;
            }
        }
    }

    env.close();
    Ok(())
}

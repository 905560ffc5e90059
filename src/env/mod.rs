mod config;
mod coverage;
mod environment;
mod observation;
mod placement;
mod render;
mod resolver;

pub use config::EnvConfig;
pub use coverage::CoverageTracker;
pub use environment::{MultiGridEnv, Observation, StepInfo, StepResult};
pub use observation::{MAX_OBS_GOALS, OBS_LEN};
pub use render::{RenderFrame, Renderer};

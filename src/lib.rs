pub mod env;
pub mod infra;
pub mod state;

// Re-export commonly used types for convenience
pub use env::{EnvConfig, MultiGridEnv, Observation, StepInfo, StepResult};
pub use infra::{Action, Color, Direction, EnvError, Position};
pub use state::{Agent, Cell, Goal, Grid};

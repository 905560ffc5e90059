mod error;
mod types;

pub use error::EnvError;
pub use types::{Action, Color, Direction, Position};

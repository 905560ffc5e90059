use thiserror::Error;

use super::types::Position;

/// Fatal environment errors. None of these are retried internally: each one
/// means the caller's configuration or an upstream component broke an
/// invariant. Invalid *moves* (walking into a wall) are not errors; they are
/// a normal move-resolution outcome with a penalty reward.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnvError {
    #[error("position ({}, {}) is outside the grid", .0.x, .0.y)]
    Bounds(Position),

    #[error("no empty interior cell found after {attempts} placement attempts")]
    Placement { attempts: usize },

    #[error("environment state is inconsistent: {0}")]
    Consistency(String),
}

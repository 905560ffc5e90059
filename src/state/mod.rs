mod entity;
mod grid;

pub use entity::{Agent, AgentId, Cell, Goal, GoalId};
pub use grid::Grid;

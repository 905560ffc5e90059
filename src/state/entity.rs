use crate::infra::{Color, Direction, Position};

pub type AgentId = usize;
pub type GoalId = usize;

/// Static cell content. Goals carry an index into the environment's goal
/// registry so their mutable state (collected flag, color) lives in exactly
/// one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Wall,
    Obstacle,
    Goal(GoalId),
}

impl Cell {
    /// Whether an agent may move onto this cell. Overlapping is not free:
    /// the move resolver still charges a penalty for obstacles and collected
    /// goals. Walls block entirely.
    pub fn can_overlap(&self) -> bool {
        matches!(self, Cell::Goal(_) | Cell::Obstacle)
    }
}

#[derive(Debug, Clone)]
pub struct Goal {
    pub pos: Position,
    pub collected: bool,
    pub color: Color,
}

impl Goal {
    pub fn new(pos: Position) -> Self {
        Self {
            pos,
            collected: false,
            color: Color::Green,
        }
    }

    /// Marks the goal collected and recolors it. The move resolver only
    /// calls this for uncollected goals, so the flag flips exactly once.
    pub fn collect(&mut self) {
        self.collected = true;
        self.color = Color::Grey;
    }
}

/// An agent handle supplied by the external training runner. Identity is
/// retained across episode resets; position and cached observation state are
/// rewritten on every reset.
#[derive(Debug, Clone)]
pub struct Agent {
    pub id: AgentId,
    pub init_pos: Position,
    pub pos: Position,
    pub direction: Direction,
    pub color: Color,
    /// Last observation vector built for this agent.
    pub obs: Vec<f32>,
    /// Goals currently within this agent's field of view. Used only by the
    /// rendering collaborator for highlighting.
    pub goals_in_view: Vec<GoalId>,
}

impl Agent {
    pub fn new(id: AgentId) -> Self {
        Self {
            id,
            init_pos: Position::new(0, 0),
            pos: Position::new(0, 0),
            direction: Direction::default(),
            color: Color::Red,
            obs: Vec::new(),
            goals_in_view: Vec::new(),
        }
    }

    /// Places the agent at its episode starting cell, clearing per-episode
    /// caches.
    pub fn spawn(&mut self, pos: Position) {
        self.init_pos = pos;
        self.pos = pos;
        self.direction = Direction::default();
        self.obs.clear();
        self.goals_in_view.clear();
    }
}

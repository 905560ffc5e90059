#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Euclidean distance, used for field-of-view and coverage checks.
    pub fn euclidean(&self, other: &Position) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn step(&self, action: Action) -> Position {
        match action {
            Action::Up => Position::new(self.x, self.y - 1),
            Action::Down => Position::new(self.x, self.y + 1),
            Action::Left => Position::new(self.x - 1, self.y),
            Action::Right => Position::new(self.x + 1, self.y),
        }
    }

    pub fn neighbors(&self) -> [Position; 4] {
        [
            Position::new(self.x, self.y - 1), // North
            Position::new(self.x + 1, self.y), // East
            Position::new(self.x, self.y + 1), // South
            Position::new(self.x - 1, self.y), // West
        ]
    }
}

/// Cardinal move intents accepted by the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Up, Action::Down, Action::Left, Action::Right];

    pub fn from_index(index: usize) -> Option<Action> {
        Action::ALL.get(index).copied()
    }
}

/// Facing direction of an agent. Cosmetic for the rendering collaborator;
/// movement is driven by [`Action`] alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    East,
    South,
    West,
    #[default]
    North,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Green,
    Blue,
    Grey,
    Yellow,
}

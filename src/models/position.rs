use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Sub};

/// Represents a cell coordinate in the unbounded grid plane
#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct Position {
    pub row: i16,
    pub col: i16,
}

/// Represents the axis a word is written along
#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Horizontal,
    Vertical,
}

impl Position {
    pub const ORIGIN: Position = Position { row: 0, col: 0 };

    pub fn new(row: i16, col: i16) -> Self {
        Position { row, col }
    }

    /// The four cells sharing an edge with this one
    pub fn neighbors(self) -> [Position; 4] {
        [
            Position::new(self.row - 1, self.col),
            Position::new(self.row, self.col - 1),
            Position::new(self.row, self.col + 1),
            Position::new(self.row + 1, self.col),
        ]
    }
}

impl Direction {
    pub const BOTH: [Direction; 2] = [Direction::Horizontal, Direction::Vertical];

    pub fn delta(self) -> Position {
        match self {
            Direction::Horizontal => Position::new(0, 1),
            Direction::Vertical => Position::new(1, 0),
        }
    }

    pub fn perpendicular(self) -> Direction {
        match self {
            Direction::Horizontal => Direction::Vertical,
            Direction::Vertical => Direction::Horizontal,
        }
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Self) -> Self::Output {
        Position::new(self.row + rhs.row, self.col + rhs.col)
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Self) -> Self::Output {
        Position::new(self.row - rhs.row, self.col - rhs.col)
    }
}

impl AddAssign for Position {
    fn add_assign(&mut self, rhs: Self) {
        self.row += rhs.row;
        self.col += rhs.col;
    }
}

impl Mul<i16> for Position {
    type Output = Position;

    fn mul(self, rhs: i16) -> Self::Output {
        Position::new(self.row * rhs, self.col * rhs)
    }
}

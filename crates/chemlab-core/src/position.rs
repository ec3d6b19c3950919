//! Plain 2D coordinates, independent of any UI coordinate space.

use serde::{Deserialize, Serialize};

/// A point on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position.
    pub fn distance(&self, other: &Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Arithmetic mean of the given positions. `None` when empty.
    pub fn centroid<I>(positions: I) -> Option<Position>
    where
        I: IntoIterator<Item = Position>,
    {
        let mut sum_x = 0.0;
        let mut sum_y = 0.0;
        let mut count = 0usize;
        for p in positions {
            sum_x += p.x;
            sum_y += p.y;
            count += 1;
        }
        if count == 0 {
            return None;
        }
        let n = count as f64;
        Some(Position::new(sum_x / n, sum_y / n))
    }
}

/// Maximum distance at which two items are considered touching.
///
/// Always finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProximityThreshold(f64);

impl ProximityThreshold {
    /// Returns `None` for zero, negative, NaN or infinite distances.
    pub fn new(distance: f64) -> Option<Self> {
        (distance.is_finite() && distance > 0.0).then_some(Self(distance))
    }

    pub fn get(self) -> f64 {
        self.0
    }

    /// Whether two positions are within the threshold (inclusive).
    pub fn admits(self, a: &Position, b: &Position) -> bool {
        a.distance(b) <= self.0
    }
}

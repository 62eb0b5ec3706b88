//! Direction and axis types for boundary faces.

use serde::{Deserialize, Serialize};

/// The six face directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Down,
    Up,
    North,
    South,
    West,
    East,
}

impl Direction {
    /// All six directions in order.
    pub const ALL: [Direction; 6] = [
        Direction::Down,
        Direction::Up,
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// The direction along `axis`, towards positive coordinates if `positive`.
    pub fn from_axis(axis: Axis, positive: bool) -> Direction {
        match (axis, positive) {
            (Axis::X, true) => Direction::East,
            (Axis::X, false) => Direction::West,
            (Axis::Y, true) => Direction::Up,
            (Axis::Y, false) => Direction::Down,
            (Axis::Z, true) => Direction::South,
            (Axis::Z, false) => Direction::North,
        }
    }

    /// Get the offset for this direction.
    pub fn offset(&self) -> (i32, i32, i32) {
        match self {
            Direction::Down => (0, -1, 0),
            Direction::Up => (0, 1, 0),
            Direction::North => (0, 0, -1),
            Direction::South => (0, 0, 1),
            Direction::West => (-1, 0, 0),
            Direction::East => (1, 0, 0),
        }
    }

    /// Get the normal vector for this direction.
    pub fn normal(&self) -> [f32; 3] {
        let (x, y, z) = self.offset();
        [x as f32, y as f32, z as f32]
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Down => write!(f, "down"),
            Direction::Up => write!(f, "up"),
            Direction::North => write!(f, "north"),
            Direction::South => write!(f, "south"),
            Direction::West => write!(f, "west"),
            Direction::East => write!(f, "east"),
        }
    }
}

/// The three axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Axes in scan order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Offset to the positive neighbour along this axis.
    pub fn offset(&self) -> (i32, i32, i32) {
        match self {
            Axis::X => (1, 0, 0),
            Axis::Y => (0, 1, 0),
            Axis::Z => (0, 0, 1),
        }
    }

    /// Corners of the unit quad separating cell `(x, y, z)` from its positive
    /// neighbour, relative to the cell, in emission order.
    pub fn quad_corners(&self) -> [[i32; 3]; 4] {
        match self {
            Axis::X => [[1, 1, 0], [1, 1, 1], [1, 0, 0], [1, 0, 1]],
            Axis::Y => [[0, 1, 0], [1, 1, 0], [0, 1, 1], [1, 1, 1]],
            Axis::Z => [[0, 0, 1], [1, 0, 1], [0, 1, 1], [1, 1, 1]],
        }
    }

    /// Whether the quad uses forward winding when the lower cell (`cell_wins`)
    /// or the upper neighbour owns the face.
    ///
    /// The Y corners are laid out mirrored relative to X and Z, so Y flips the rule.
    /// Either way the resulting normal points away from the owning cell.
    pub fn winds_forward(&self, cell_wins: bool) -> bool {
        match self {
            Axis::Y => !cell_wins,
            Axis::X | Axis::Z => cell_wins,
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
            Axis::Z => write!(f, "z"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_axis_matches_offsets() {
        let mut seen = Vec::new();
        for axis in Axis::ALL {
            let (ax, ay, az) = axis.offset();
            for positive in [true, false] {
                let dir = Direction::from_axis(axis, positive);
                let sign = if positive { 1 } else { -1 };
                assert_eq!(dir.offset(), (ax * sign, ay * sign, az * sign), "{dir}");
                seen.push(dir);
            }
        }
        assert!(Direction::ALL.iter().all(|d| seen.contains(d)));
    }

    #[test]
    fn test_quad_corners_lie_on_positive_face() {
        for axis in Axis::ALL {
            let k = match axis {
                Axis::X => 0,
                Axis::Y => 1,
                Axis::Z => 2,
            };
            for corner in axis.quad_corners() {
                assert_eq!(corner[k], 1, "{axis} corner {corner:?}");
            }
        }
    }

    #[test]
    fn test_y_winding_is_mirrored() {
        assert!(Axis::X.winds_forward(true));
        assert!(Axis::Z.winds_forward(true));
        assert!(!Axis::Y.winds_forward(true));
        assert!(Axis::Y.winds_forward(false));
    }
}

//! Qubit identifiers and spacetime coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Flat identifier for a physical qubit in a generated program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl QubitId {
    /// Index of this qubit as a `usize`.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

/// A spacetime coordinate `(x, y, t)` attached to qubits and detectors.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coord {
    /// Column position.
    pub x: f64,
    /// Row position.
    pub y: f64,
    /// Round layer.
    pub t: f64,
}

impl Coord {
    /// Create a new coordinate.
    pub const fn new(x: f64, y: f64, t: f64) -> Self {
        Self { x, y, t }
    }

    /// Shift by one round layer, used to advance detector coordinates.
    pub const fn round_shift() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }

    /// The coordinate as a flat array.
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.t]
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.t)
    }
}

/// Absolute position of a measurement on the program's measurement tape.
///
/// References are absolute so fragments can be built independently and
/// still resolve correctly; relative `rec[-k]` offsets only exist in the
/// emitted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MeasurementRef(pub usize);

impl fmt::Display for MeasurementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qubit_display() {
        assert_eq!(format!("{}", QubitId(7)), "q7");
        assert_eq!(QubitId::from(3u32).index(), 3);
    }

    #[test]
    fn test_coord_display() {
        let c = Coord::new(0.5, -0.5, 0.0);
        assert_eq!(c.to_string(), "(0.5, -0.5, 0)");
        assert_eq!(Coord::round_shift().to_array(), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_qubit_ordering() {
        let mut ids = vec![QubitId(5), QubitId(1), QubitId(3)];
        ids.sort();
        assert_eq!(ids, vec![QubitId(1), QubitId(3), QubitId(5)]);
    }
}

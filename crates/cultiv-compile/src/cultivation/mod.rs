//! Distance-3 cultivation inside the large patch.
//!
//! The distance-3 code is built from a 3×3 main grid, a 2×2 auxiliary grid
//! and four boundary qubits. Where those live depends on the
//! [`Embedding`]:
//!
//! ```text
//! Spread (data grid, spacing 2)         Native (distance-3 sub-patch)
//!
//!  m0 .  m1 b0 m2                         m0   m1   m2      (data)
//!  b1 a0 .  a1 .                            a0   a1         (ancillas)
//!  m3 .  m4 .  m5                         m3   m4   m5
//!  .  a2 .  a3 b2                           a2   a3
//!  m6 b3 m7 .  m8                         m6   m7   m8
//! ```
//!
//! The spread embedding leaves room for the growth to distance 5; the
//! native one places the code on the large patch's own top-left
//! distance-3 sub-patch so it can be postselected as a rotated code.

mod growth;
mod prep;

use serde::{Deserialize, Serialize};

use cultiv_ir::QubitId;

use crate::error::{CompileError, CompileResult};
use crate::layout::{GridPos, PatchLayout};

pub use growth::{grow_d3_d5, large_patch_reset, unrotated_stab_meas};
pub use prep::{
    PrepStrategy, RotatedMeasOptions, hook_injection, optimized_unitary_prep, prepare,
    reduced_meas, rot_to_unrot, rotated_meas, unitary_encoding,
};

/// Where the distance-3 code is placed inside the large patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Embedding {
    /// Main and auxiliary qubits are data qubits two steps apart.
    #[default]
    Spread,
    /// Main qubits are the data of the distance-3 sub-patch, auxiliary and
    /// boundary qubits its ancillas.
    Native,
}

/// Diagonal neighbor of an auxiliary or boundary qubit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagonal {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Orthogonal neighbor on the data grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Above,
    Below,
    Left,
    Right,
}

impl Direction {
    fn offset(self) -> (i64, i64) {
        match self {
            Direction::Above => (0, -1),
            Direction::Below => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Qubits of the distance-3 code for one embedding.
#[derive(Debug, Clone)]
pub struct CultivationGrid<'a> {
    layout: &'a PatchLayout,
    embedding: Embedding,
    main: [QubitId; 9],
    aux: [QubitId; 4],
    boundary: [QubitId; 4],
}

impl<'a> CultivationGrid<'a> {
    /// Place the distance-3 code inside `layout`.
    ///
    /// The spread embedding spans a 5×5 data region and needs a patch of
    /// at least distance 5.
    pub fn new(layout: &'a PatchLayout, embedding: Embedding) -> CompileResult<Self> {
        let min = match embedding {
            Embedding::Spread => 5,
            Embedding::Native => 3,
        };
        let smallest = layout.dx().min(layout.dy());
        if smallest < min {
            return Err(CompileError::InvalidDistance {
                distance: smallest,
                reason: format!("the {embedding:?} embedding needs a patch of distance {min} or more"),
            });
        }

        let grid = |f: &dyn Fn(u32, u32) -> QubitId, n: u32| -> Vec<QubitId> {
            (0..n).flat_map(|r| (0..n).map(move |c| (r, c))).map(|(r, c)| f(r, c)).collect()
        };

        let (main, aux, boundary) = match embedding {
            Embedding::Spread => (
                grid(&|r, c| layout.data_id(GridPos::new(2 * c, 2 * r)), 3),
                grid(&|r, c| layout.data_id(GridPos::new(2 * c + 1, 2 * r + 1)), 2),
                [(3, 0), (0, 1), (4, 3), (1, 4)].map(|(x, y)| layout.data_id(GridPos::new(x, y))),
            ),
            Embedding::Native => (
                grid(&|r, c| layout.data_id(GridPos::new(c, r)), 3),
                grid(&|r, c| layout.ancilla_id(GridPos::new(1 + c, 1 + r)), 2),
                [(2, 0), (0, 1), (3, 2), (1, 3)]
                    .map(|(x, y)| layout.ancilla_id(GridPos::new(x, y))),
            ),
        };

        Ok(Self {
            layout,
            embedding,
            main: to_array(main)?,
            aux: to_array(aux)?,
            boundary,
        })
    }

    /// The embedding in use.
    pub fn embedding(&self) -> Embedding {
        self.embedding
    }

    /// The patch the grid lives in.
    pub fn layout(&self) -> &'a PatchLayout {
        self.layout
    }

    /// Main grid in row-major order.
    pub fn main(&self) -> &[QubitId; 9] {
        &self.main
    }

    /// Auxiliary grid in row-major order. Entries 0 and 3 measure X-type
    /// checks, 1 and 2 Z-type ones.
    pub fn aux(&self) -> &[QubitId; 4] {
        &self.aux
    }

    /// Boundary qubits: top, left, right and bottom weight-2 checks.
    pub fn boundary(&self) -> &[QubitId; 4] {
        &self.boundary
    }

    pub(crate) fn mains(&self, idx: &[usize]) -> Vec<QubitId> {
        idx.iter().map(|&i| self.main[i]).collect()
    }

    pub(crate) fn auxes(&self, idx: &[usize]) -> Vec<QubitId> {
        idx.iter().map(|&i| self.aux[i]).collect()
    }

    pub(crate) fn boundaries(&self, idx: &[usize]) -> Vec<QubitId> {
        idx.iter().map(|&i| self.boundary[i]).collect()
    }

    /// Diagonal neighbor of `qubit` on the main grid.
    ///
    /// With the spread embedding `qubit` is a data qubit; with the native
    /// embedding it must be an ancilla.
    pub fn diagonal(&self, qubit: QubitId, diagonal: Diagonal) -> CompileResult<QubitId> {
        match self.embedding {
            Embedding::Spread => {
                let (dx, dy) = match diagonal {
                    Diagonal::TopLeft => (-1, -1),
                    Diagonal::TopRight => (1, -1),
                    Diagonal::BottomLeft => (-1, 1),
                    Diagonal::BottomRight => (1, 1),
                };
                self.shifted(qubit, dx, dy)
            }
            Embedding::Native => {
                let p = self.layout.ancilla_pos(qubit)?;
                let (dx, dy) = match diagonal {
                    Diagonal::TopLeft => (-1, -1),
                    Diagonal::TopRight => (0, -1),
                    Diagonal::BottomLeft => (-1, 0),
                    Diagonal::BottomRight => (0, 0),
                };
                self.at(qubit, i64::from(p.x) + dx, i64::from(p.y) + dy)
            }
        }
    }

    /// Orthogonal neighbor of a data qubit.
    pub fn orthogonal(&self, qubit: QubitId, direction: Direction) -> CompileResult<QubitId> {
        let (dx, dy) = direction.offset();
        self.shifted(qubit, dx, dy)
    }

    fn shifted(&self, qubit: QubitId, dx: i64, dy: i64) -> CompileResult<QubitId> {
        let p = self.layout.data_pos(qubit)?;
        self.at(qubit, i64::from(p.x) + dx, i64::from(p.y) + dy)
    }

    fn at(&self, from: QubitId, x: i64, y: i64) -> CompileResult<QubitId> {
        match (u32::try_from(x), u32::try_from(y)) {
            (Ok(x), Ok(y)) => self.layout.data_at(x, y),
            _ => Err(CompileError::InvalidQubitRole {
                qubit: from,
                expected: "qubit with a neighbor inside the patch",
            }),
        }
    }
}

fn to_array<const N: usize>(qubits: Vec<QubitId>) -> CompileResult<[QubitId; N]> {
    let len = qubits.len();
    qubits.try_into().map_err(|_| {
        CompileError::UnsupportedConfiguration(format!("expected {N} grid qubits, got {len}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spread_positions() {
        let layout = PatchLayout::square(5).unwrap();
        let grid = CultivationGrid::new(&layout, Embedding::Spread).unwrap();
        assert_eq!(grid.main()[0], QubitId(0));
        assert_eq!(grid.main()[8], layout.data_id(GridPos::new(4, 4)));
        assert_eq!(grid.aux()[1], layout.data_id(GridPos::new(3, 1)));
        assert_eq!(grid.boundary()[0], QubitId(6));
        assert_eq!(grid.boundary()[1], QubitId(10));
        assert_eq!(grid.boundary()[2], QubitId(38));
        assert_eq!(grid.boundary()[3], QubitId(42));
    }

    #[test]
    fn test_native_positions() {
        let layout = PatchLayout::square(7).unwrap();
        let grid = CultivationGrid::new(&layout, Embedding::Native).unwrap();
        assert_eq!(grid.main()[4], layout.data_id(GridPos::new(1, 1)));
        assert_eq!(grid.aux()[0], layout.ancilla_id(GridPos::new(1, 1)));
        assert_eq!(grid.boundary()[0], QubitId(5));
        for &b in grid.boundary() {
            assert!(layout.is_valid_ancilla(b, Some(3)));
        }
        for &a in grid.aux() {
            assert!(layout.is_valid_ancilla(a, Some(3)));
        }
        // Auxiliary types follow the patch's own checkerboard.
        assert!(layout.is_x_type(grid.aux()[0]).unwrap());
        assert!(!layout.is_x_type(grid.aux()[1]).unwrap());
    }

    #[test]
    fn test_spread_requires_distance_five() {
        let layout = PatchLayout::square(3).unwrap();
        assert!(matches!(
            CultivationGrid::new(&layout, Embedding::Spread),
            Err(CompileError::InvalidDistance { .. })
        ));
        assert!(CultivationGrid::new(&layout, Embedding::Native).is_ok());
    }

    #[test]
    fn test_spread_neighbors() {
        let layout = PatchLayout::square(5).unwrap();
        let grid = CultivationGrid::new(&layout, Embedding::Spread).unwrap();
        let a0 = grid.aux()[0];
        assert_eq!(grid.diagonal(a0, Diagonal::TopLeft).unwrap(), grid.main()[0]);
        assert_eq!(grid.diagonal(a0, Diagonal::BottomRight).unwrap(), grid.main()[4]);
        let b0 = grid.boundary()[0];
        assert_eq!(
            grid.orthogonal(b0, Direction::Left).unwrap(),
            grid.main()[1]
        );
        assert!(grid.orthogonal(b0, Direction::Above).is_err());
    }

    #[test]
    fn test_native_neighbors() {
        let layout = PatchLayout::square(5).unwrap();
        let grid = CultivationGrid::new(&layout, Embedding::Native).unwrap();
        let a3 = grid.aux()[3];
        assert_eq!(grid.diagonal(a3, Diagonal::TopLeft).unwrap(), grid.main()[4]);
        assert_eq!(grid.diagonal(a3, Diagonal::TopRight).unwrap(), grid.main()[5]);
        assert_eq!(grid.diagonal(a3, Diagonal::BottomLeft).unwrap(), grid.main()[7]);
        assert_eq!(grid.diagonal(a3, Diagonal::BottomRight).unwrap(), grid.main()[8]);

        // A data qubit has no diagonal neighbor in the native embedding.
        assert!(matches!(
            grid.diagonal(grid.main()[4], Diagonal::TopLeft),
            Err(CompileError::InvalidQubitRole { .. })
        ));
    }
}

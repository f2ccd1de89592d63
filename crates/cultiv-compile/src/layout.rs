//! Rotated surface-code patch layout.
//!
//! A `dx`×`dy` patch places data qubits on an integer grid and ancillas on
//! the `(dx+1)`×`(dy+1)` grid of plaquette corners, offset by half a step.
//! Flat ids interleave the two grids: data `(x, y)` is `2(y·dx + x)`,
//! ancilla `(ax, ay)` is `2(ay·(dx+1) + ax) + 1`. Helper qubits follow after
//! the `2(dx+1)(dy+1)` ids reserved for the patch.
//!
//! All derived sets (valid ancillas split by type, the full-patch round
//! schedule) are computed once in [`PatchLayout::new`].

use rustc_hash::FxHashSet;
use serde::Serialize;

use cultiv_ir::{Circuit, Coord, QubitId};

use crate::error::{CompileError, CompileResult};
use crate::schedule::{GatePair, NUM_STEPS, ScheduleSlice, ScheduleStep};

/// Position on the data grid or the ancilla grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GridPos {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

impl GridPos {
    /// Create a grid position.
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Which Pauli type a stabilizer measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StabilizerType {
    /// X-type: the ancilla is rotated with Hadamards and controls the CNOTs.
    X,
    /// Z-type: the data qubits control the CNOTs.
    Z,
}

/// Typed role of a flat qubit id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QubitRole {
    /// Data qubit at a data-grid position.
    Data(GridPos),
    /// X-type ancilla at an ancilla-grid position.
    AncillaX(GridPos),
    /// Z-type ancilla at an ancilla-grid position.
    AncillaZ(GridPos),
    /// Qubit of the helper register (the flag follows the last helper).
    Helper(u32),
}

/// Qubit/coordinate model of one patch.
#[derive(Debug, Clone)]
pub struct PatchLayout {
    dx: u32,
    dy: u32,
    data: Vec<QubitId>,
    ancillas: Vec<QubitId>,
    x_ancillas: Vec<QubitId>,
    z_ancillas: Vec<QubitId>,
    all: Vec<QubitId>,
    schedule: ScheduleSlice,
}

impl PatchLayout {
    /// Build the layout of a `dx`×`dy` patch. Both sides must be odd and at
    /// least 3.
    pub fn new(dx: u32, dy: u32) -> CompileResult<Self> {
        for d in [dx, dy] {
            if d < 3 || d % 2 == 0 {
                return Err(CompileError::InvalidDistance {
                    distance: d,
                    reason: "patch sides must be odd and at least 3".into(),
                });
            }
        }

        let mut layout = Self {
            dx,
            dy,
            data: vec![],
            ancillas: vec![],
            x_ancillas: vec![],
            z_ancillas: vec![],
            all: vec![],
            schedule: ScheduleSlice::default(),
        };

        layout.data = (0..dy)
            .flat_map(|y| (0..dx).map(move |x| GridPos::new(x, y)))
            .map(|p| layout.data_id(p))
            .collect();

        for ay in 0..=dy {
            for ax in 0..=dx {
                let pos = GridPos::new(ax, ay);
                if !layout.is_valid_position(pos, None) {
                    continue;
                }
                let id = layout.ancilla_id(pos);
                layout.ancillas.push(id);
                match stabilizer_type(pos) {
                    StabilizerType::X => layout.x_ancillas.push(id),
                    StabilizerType::Z => layout.z_ancillas.push(id),
                }
            }
        }

        layout.all = layout
            .ancillas
            .iter()
            .chain(&layout.data)
            .copied()
            .collect();
        layout.schedule = layout.schedule_for(None);
        Ok(layout)
    }

    /// Build the layout of a square `d`×`d` patch.
    pub fn square(d: u32) -> CompileResult<Self> {
        Self::new(d, d)
    }

    // =========================================================================
    // Id arithmetic
    // =========================================================================

    /// Patch width.
    pub fn dx(&self) -> u32 {
        self.dx
    }

    /// Patch height.
    pub fn dy(&self) -> u32 {
        self.dy
    }

    /// Number of ids reserved for the patch; helper ids start here.
    pub fn patch_size(&self) -> u32 {
        2 * (self.dx + 1) * (self.dy + 1)
    }

    /// Id of the data qubit at `pos`.
    pub fn data_id(&self, pos: GridPos) -> QubitId {
        QubitId(2 * (pos.y * self.dx + pos.x))
    }

    /// Id of the data qubit at `(x, y)`, checked against the patch bounds.
    pub fn data_at(&self, x: u32, y: u32) -> CompileResult<QubitId> {
        if x >= self.dx || y >= self.dy {
            return Err(CompileError::UnsupportedConfiguration(format!(
                "data position ({x}, {y}) lies outside the {}x{} patch",
                self.dx, self.dy
            )));
        }
        Ok(self.data_id(GridPos::new(x, y)))
    }

    /// Id of the ancilla at `pos`.
    pub fn ancilla_id(&self, pos: GridPos) -> QubitId {
        QubitId(2 * (pos.y * (self.dx + 1) + pos.x) + 1)
    }

    /// Id of helper qubit `index`.
    pub fn helper_id(&self, index: u32) -> QubitId {
        QubitId(self.patch_size() + index)
    }

    /// Typed role of `qubit`.
    pub fn role(&self, qubit: QubitId) -> CompileResult<QubitRole> {
        let id = qubit.0;
        if id >= self.patch_size() {
            return Ok(QubitRole::Helper(id - self.patch_size()));
        }
        let half = id / 2;
        if id % 2 == 1 {
            let pos = GridPos::new(half % (self.dx + 1), half / (self.dx + 1));
            return Ok(match stabilizer_type(pos) {
                StabilizerType::X => QubitRole::AncillaX(pos),
                StabilizerType::Z => QubitRole::AncillaZ(pos),
            });
        }
        if half >= self.dx * self.dy {
            return Err(CompileError::InvalidQubitRole {
                qubit,
                expected: "patch qubit",
            });
        }
        Ok(QubitRole::Data(GridPos::new(half % self.dx, half / self.dx)))
    }

    /// Grid position of an ancilla id.
    pub fn ancilla_pos(&self, qubit: QubitId) -> CompileResult<GridPos> {
        match self.role(qubit)? {
            QubitRole::AncillaX(pos) | QubitRole::AncillaZ(pos) => Ok(pos),
            _ => Err(CompileError::InvalidQubitRole {
                qubit,
                expected: "ancilla",
            }),
        }
    }

    /// Grid position of a data id.
    pub fn data_pos(&self, qubit: QubitId) -> CompileResult<GridPos> {
        match self.role(qubit)? {
            QubitRole::Data(pos) => Ok(pos),
            _ => Err(CompileError::InvalidQubitRole {
                qubit,
                expected: "data qubit",
            }),
        }
    }

    // =========================================================================
    // Ancilla classification
    // =========================================================================

    /// Whether `qubit` is an ancilla of the patch, or of its top-left
    /// `restricted`×`restricted` sub-patch when given.
    ///
    /// Edge rules: the top row keeps even columns, the left column keeps odd
    /// rows, the bottom row keeps odd columns, the right column keeps even
    /// rows. Applying them with the restricted bounds yields the same
    /// ancilla set as a native patch of that distance.
    pub fn is_valid_ancilla(&self, qubit: QubitId, restricted: Option<u32>) -> bool {
        match self.ancilla_pos(qubit) {
            Ok(pos) => self.is_valid_position(pos, restricted),
            Err(_) => false,
        }
    }

    /// Position form of [`PatchLayout::is_valid_ancilla`].
    pub fn is_valid_position(&self, pos: GridPos, restricted: Option<u32>) -> bool {
        let (rx, ry) = restricted.map_or((self.dx, self.dy), |d| (d, d));
        let GridPos { x, y } = pos;
        if x > self.dx || y > self.dy {
            return false;
        }
        if y == 0 && x % 2 == 1 {
            return false;
        }
        if x == 0 && y % 2 == 0 {
            return false;
        }
        if y == ry && x % 2 == 0 {
            return false;
        }
        if x == rx && y % 2 == 1 {
            return false;
        }
        x <= rx && y <= ry
    }

    /// Whether an ancilla measures an X-type stabilizer.
    pub fn is_x_type(&self, ancilla: QubitId) -> CompileResult<bool> {
        let pos = self.ancilla_pos(ancilla)?;
        Ok(stabilizer_type(pos) == StabilizerType::X)
    }

    /// The ancilla north-west of a data qubit.
    pub fn neighbor_ancilla(&self, data: QubitId) -> CompileResult<QubitId> {
        let pos = self.data_pos(data)?;
        Ok(self.ancilla_id(pos))
    }

    /// Ancilla positions around a data qubit as `[nw, ne, sw, se]`.
    pub fn neighbor_positions(data: GridPos) -> [GridPos; 4] {
        let GridPos { x, y } = data;
        [
            GridPos::new(x, y),
            GridPos::new(x + 1, y),
            GridPos::new(x, y + 1),
            GridPos::new(x + 1, y + 1),
        ]
    }

    // =========================================================================
    // Schedules
    // =========================================================================

    /// The full-patch round schedule, computed at construction.
    pub fn schedule(&self) -> &ScheduleSlice {
        &self.schedule
    }

    /// Build the 4-step CNOT schedule of one round, optionally restricted to
    /// the top-left `d`×`d` sub-patch.
    pub fn build_round_schedule(&self, restricted: Option<u32>) -> CompileResult<ScheduleSlice> {
        match restricted {
            None => Ok(self.schedule.clone()),
            Some(d) => {
                self.check_restricted(d)?;
                Ok(self.schedule_for(Some(d)))
            }
        }
    }

    /// Every data qubit visits its four neighbours in one of two orders
    /// picked by checkerboard parity. Both orders put the south-west
    /// ancilla first and the north-east one last, and no ancilla sees two
    /// of its data qubits in the same step, so steps are conflict-free
    /// without any runtime check.
    fn schedule_for(&self, restricted: Option<u32>) -> ScheduleSlice {
        let mut pairs: [Vec<GatePair>; NUM_STEPS] = Default::default();

        for y in 0..self.dy {
            for x in 0..self.dx {
                let data = self.data_id(GridPos::new(x, y));
                let [nw, ne, sw, se] = Self::neighbor_positions(GridPos::new(x, y));
                let order = if (x + y) % 2 == 0 {
                    [sw, se, nw, ne]
                } else {
                    [sw, nw, se, ne]
                };

                for (step, anc) in order.into_iter().enumerate() {
                    if !self.is_valid_position(anc, None) {
                        continue;
                    }
                    if let Some(d) = restricted {
                        if x >= d || y >= d || !self.is_valid_position(anc, Some(d)) {
                            continue;
                        }
                    }
                    let a = self.ancilla_id(anc);
                    pairs[step].push(match stabilizer_type(anc) {
                        StabilizerType::X => GatePair::new(a, data),
                        StabilizerType::Z => GatePair::new(data, a),
                    });
                }
            }
        }

        ScheduleSlice::from_steps(pairs.map(|pairs| {
            let touched: FxHashSet<QubitId> =
                pairs.iter().flat_map(|p| [p.control, p.target]).collect();
            let idle = self
                .all
                .iter()
                .copied()
                .filter(|q| !touched.contains(q))
                .collect();
            ScheduleStep { pairs, idle }
        }))
    }

    /// Check that `d` names an odd sub-patch that fits in this patch.
    pub fn check_restricted(&self, d: u32) -> CompileResult<()> {
        if d < 3 || d % 2 == 0 || d > self.dx || d > self.dy {
            return Err(CompileError::InvalidRestrictedDistance {
                restricted: d,
                dx: self.dx,
                dy: self.dy,
            });
        }
        Ok(())
    }

    // =========================================================================
    // Qubit sets
    // =========================================================================

    /// Data qubits in id order.
    pub fn data_qubits(&self) -> &[QubitId] {
        &self.data
    }

    /// Valid ancillas in id order; this is also their measurement order.
    pub fn ancillas(&self) -> &[QubitId] {
        &self.ancillas
    }

    /// X-type ancillas in id order.
    pub fn x_ancillas(&self) -> &[QubitId] {
        &self.x_ancillas
    }

    /// Z-type ancillas in id order.
    pub fn z_ancillas(&self) -> &[QubitId] {
        &self.z_ancillas
    }

    /// Ancillas followed by data qubits.
    pub fn all_qubits(&self) -> &[QubitId] {
        &self.all
    }

    /// Valid ancillas of the top-left `d`×`d` sub-patch, in id order.
    pub fn ancillas_within(&self, d: u32) -> CompileResult<Vec<QubitId>> {
        self.check_restricted(d)?;
        Ok(self
            .ancillas
            .iter()
            .copied()
            .filter(|&a| self.is_valid_ancilla(a, Some(d)))
            .collect())
    }

    /// Data qubits to re-initialize when the sub-patch of distance `d` is
    /// merged into the full patch: every data qubit outside the sub-patch,
    /// and the subset below the sub-patch and under the diagonal that must
    /// additionally be rotated to |+⟩.
    pub fn large_patch_reset_sets(&self, d: u32) -> CompileResult<(Vec<QubitId>, Vec<QubitId>)> {
        self.check_restricted(d)?;
        let mut outside = vec![];
        let mut plus = vec![];
        for y in 0..self.dy {
            for x in 0..self.dx {
                if x < d && y < d {
                    continue;
                }
                let q = self.data_id(GridPos::new(x, y));
                outside.push(q);
                if y >= d && y > x {
                    plus.push(q);
                }
            }
        }
        Ok((outside, plus))
    }

    // =========================================================================
    // Coordinates
    // =========================================================================

    /// Coordinate of a qubit: data on the integer grid, ancillas offset by
    /// half a step, helpers on a row two below the patch.
    pub fn coordinate(&self, qubit: QubitId) -> CompileResult<Coord> {
        Ok(match self.role(qubit)? {
            QubitRole::Data(p) => Coord::new(f64::from(p.x), f64::from(p.y), 0.0),
            QubitRole::AncillaX(p) | QubitRole::AncillaZ(p) => {
                Coord::new(f64::from(p.x) - 0.5, f64::from(p.y) - 0.5, 0.0)
            }
            QubitRole::Helper(i) => Coord::new(f64::from(i), f64::from(self.dy + 2), 0.0),
        })
    }

    /// Append `QUBIT_COORDS` for every data qubit and valid ancilla.
    pub fn layout_coords(&self, circuit: &mut Circuit) -> CompileResult<()> {
        for &q in self.data.iter().chain(&self.ancillas) {
            circuit.qubit_coords(q, self.coordinate(q)?)?;
        }
        Ok(())
    }
}

/// X-type iff the ancilla's grid coordinates sum to an even number.
fn stabilizer_type(pos: GridPos) -> StabilizerType {
    if (pos.x + pos.y) % 2 == 0 {
        StabilizerType::X
    } else {
        StabilizerType::Z
    }
}

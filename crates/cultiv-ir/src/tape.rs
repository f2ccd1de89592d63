//! Measurement tape: the record of every measurement a program performs.
//!
//! The tape assigns each measurement an absolute position and keeps a
//! per-qubit history so detector construction can ask for "the latest
//! measurement of q" or "the one before it" instead of counting backwards.
//! Fragments built with [`MeasurementTape::continuing`] start where their
//! parent's tape ends; the parent only accepts them back in that order.

use rustc_hash::FxHashMap;

use crate::qubit::{MeasurementRef, QubitId};

/// Append-only record of measurements.
#[derive(Debug, Clone, Default)]
pub struct MeasurementTape {
    /// Position of the first measurement recorded by this tape's owner.
    origin: usize,
    /// Measured qubit at every absolute position.
    records: Vec<QubitId>,
    /// Positions of each qubit's measurements, oldest first.
    history: FxHashMap<QubitId, Vec<MeasurementRef>>,
}

impl MeasurementTape {
    /// Create an empty tape.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tape that continues where `parent` currently ends.
    ///
    /// The parent's history is visible, so lookbacks reach measurements
    /// made by earlier fragments.
    pub fn continuing(parent: &MeasurementTape) -> Self {
        Self {
            origin: parent.len(),
            records: parent.records.clone(),
            history: parent.history.clone(),
        }
    }

    /// Record a measurement of `qubit` and return its position.
    pub fn record(&mut self, qubit: QubitId) -> MeasurementRef {
        let reference = MeasurementRef(self.records.len());
        self.records.push(qubit);
        self.history.entry(qubit).or_default().push(reference);
        reference
    }

    /// Total number of measurements on the tape, including inherited ones.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if nothing has been measured.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Position at which this tape's own measurements begin.
    pub fn origin(&self) -> usize {
        self.origin
    }

    /// Measurements recorded since the origin.
    pub fn own_len(&self) -> usize {
        self.records.len() - self.origin
    }

    /// Whether `reference` points at a recorded measurement.
    pub fn contains(&self, reference: MeasurementRef) -> bool {
        reference.0 < self.records.len()
    }

    /// The qubit measured at `reference`.
    pub fn qubit_at(&self, reference: MeasurementRef) -> Option<QubitId> {
        self.records.get(reference.0).copied()
    }

    /// The most recent measurement of `qubit`.
    pub fn latest(&self, qubit: QubitId) -> Option<MeasurementRef> {
        self.lookback(qubit, 0)
    }

    /// The measurement of `qubit` made `back` measurements of that qubit
    /// before the latest one (`0` is the latest).
    pub fn lookback(&self, qubit: QubitId, back: usize) -> Option<MeasurementRef> {
        let history = self.history.get(&qubit)?;
        let idx = history.len().checked_sub(back + 1)?;
        history.get(idx).copied()
    }

    /// Number of times `qubit` has been measured.
    pub fn count(&self, qubit: QubitId) -> usize {
        self.history.get(&qubit).map_or(0, Vec::len)
    }

    /// Relative offset of `reference` as seen from the current end of the
    /// tape (`-1` is the latest measurement).
    pub fn relative(&self, reference: MeasurementRef) -> Option<i64> {
        if !self.contains(reference) {
            return None;
        }
        Some(reference.0 as i64 - self.records.len() as i64)
    }

    /// Absorb the measurements `other` made after `self`'s end.
    ///
    /// The caller checks that `other` continues this tape.
    pub(crate) fn extend_from(&mut self, other: &MeasurementTape) {
        for &qubit in &other.records[self.records.len()..] {
            self.record(qubit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_lookup() {
        let mut tape = MeasurementTape::new();
        let a = tape.record(QubitId(1));
        let b = tape.record(QubitId(3));
        let c = tape.record(QubitId(1));

        assert_eq!(tape.len(), 3);
        assert_eq!(tape.latest(QubitId(1)), Some(c));
        assert_eq!(tape.lookback(QubitId(1), 1), Some(a));
        assert_eq!(tape.lookback(QubitId(1), 2), None);
        assert_eq!(tape.latest(QubitId(3)), Some(b));
        assert_eq!(tape.latest(QubitId(5)), None);
        assert_eq!(tape.count(QubitId(1)), 2);
    }

    #[test]
    fn test_relative_offsets() {
        let mut tape = MeasurementTape::new();
        let a = tape.record(QubitId(0));
        tape.record(QubitId(2));
        assert_eq!(tape.relative(a), Some(-2));
        assert_eq!(tape.relative(MeasurementRef(2)), None);
    }

    #[test]
    fn test_continuing_sees_parent_history() {
        let mut parent = MeasurementTape::new();
        let first = parent.record(QubitId(7));

        let mut child = MeasurementTape::continuing(&parent);
        assert_eq!(child.origin(), 1);
        assert_eq!(child.own_len(), 0);
        let second = child.record(QubitId(7));

        assert_eq!(child.lookback(QubitId(7), 1), Some(first));
        assert_eq!(child.latest(QubitId(7)), Some(second));

        parent.extend_from(&child);
        assert_eq!(parent.len(), 2);
        assert_eq!(parent.latest(QubitId(7)), Some(second));
    }
}

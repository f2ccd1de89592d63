//! Property tests for the measurement tape and relative record offsets.

use cultiv_ir::{Circuit, QubitId, emit};
use proptest::prelude::*;

fn qubit_sequence() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(0u32..8, 1..40)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every reference resolves to the qubit that was measured there.
    #[test]
    fn tape_positions_match_measured_qubits(seq in qubit_sequence()) {
        let mut circuit = Circuit::new("prop");
        for &q in &seq {
            circuit.measure([QubitId(q)]).unwrap();
            let latest = circuit.tape().latest(QubitId(q)).unwrap();
            prop_assert_eq!(circuit.tape().qubit_at(latest), Some(QubitId(q)));
        }
        prop_assert_eq!(circuit.num_measurements(), seq.len());
    }

    /// Lookback walks a qubit's own history regardless of interleaving.
    #[test]
    fn lookback_counts_per_qubit(seq in qubit_sequence()) {
        let mut circuit = Circuit::new("prop");
        for &q in &seq {
            circuit.measure([QubitId(q)]).unwrap();
        }
        for q in 0u32..8 {
            let positions: Vec<usize> = seq
                .iter()
                .enumerate()
                .filter(|&(_, &m)| m == q)
                .map(|(i, _)| i)
                .collect();
            for (back, &pos) in positions.iter().rev().enumerate() {
                let r = circuit.tape().lookback(QubitId(q), back).unwrap();
                prop_assert_eq!(r.0, pos);
            }
            prop_assert!(circuit.tape().lookback(QubitId(q), positions.len()).is_none());
        }
    }

    /// A detector on the latest measurement always resolves to rec[-1],
    /// however the program was split into fragments.
    #[test]
    fn fragment_split_preserves_offsets(seq in qubit_sequence(), split in 0usize..40) {
        let split = split.min(seq.len());
        let mut program = Circuit::new("prop");
        for &q in &seq[..split] {
            program.measure([QubitId(q)]).unwrap();
        }
        let mut frag = Circuit::continuing("tail", &program);
        for &q in &seq[split..] {
            frag.measure([QubitId(q)]).unwrap();
        }
        let last = *seq.last().unwrap();
        let latest = frag.tape().latest(QubitId(last)).unwrap();
        frag.detector(vec![0.0, 0.0, 0.0], [latest]).unwrap();
        program.append(frag).unwrap();

        let text = emit(&program).unwrap();
        prop_assert!(text.trim_end().ends_with("rec[-1]"));
    }
}

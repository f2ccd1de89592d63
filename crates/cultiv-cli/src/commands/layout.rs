//! Layout command implementation.

use anyhow::Result;
use console::style;
use serde::Serialize;

use cultiv_compile::{GridPos, PatchLayout};

/// Qubit counts and schedule size of one patch.
#[derive(Debug, Serialize)]
pub struct LayoutSummary {
    pub distance: u32,
    pub data_qubits: usize,
    pub x_ancillas: usize,
    pub z_ancillas: usize,
    pub patch_size: u32,
    pub first_helper: u32,
    pub cnots_per_round: usize,
}

impl LayoutSummary {
    pub fn new(layout: &PatchLayout) -> Self {
        Self {
            distance: layout.dx(),
            data_qubits: layout.data_qubits().len(),
            x_ancillas: layout.x_ancillas().len(),
            z_ancillas: layout.z_ancillas().len(),
            patch_size: layout.patch_size(),
            first_helper: layout.helper_id(0).0,
            cnots_per_round: layout.schedule().num_pairs(),
        }
    }
}

/// Execute the layout command.
pub fn execute(distance: u32, json: bool) -> Result<()> {
    let layout = PatchLayout::square(distance)?;
    let summary = LayoutSummary::new(&layout);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "{} Distance-{} rotated patch",
        style("▸").cyan().bold(),
        style(distance).green()
    );
    println!();
    println!("  Data qubits:     {}", summary.data_qubits);
    println!("  X ancillas:      {}", summary.x_ancillas);
    println!("  Z ancillas:      {}", summary.z_ancillas);
    println!("  Reserved ids:    {}", summary.patch_size);
    println!("  First helper id: {}", summary.first_helper);
    println!("  CNOTs per round: {}", summary.cnots_per_round);
    println!();
    for line in render(&layout)? {
        println!("  {line}");
    }
    Ok(())
}

/// Draw ancilla rows and data rows interleaved; `·` marks an unused corner.
fn render(layout: &PatchLayout) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for y in 0..=layout.dy() {
        let mut row = String::new();
        for x in 0..=layout.dx() {
            let pos = GridPos::new(x, y);
            let mark = if !layout.is_valid_position(pos, None) {
                "·"
            } else if layout.is_x_type(layout.ancilla_id(pos))? {
                "X"
            } else {
                "Z"
            };
            row.push_str(mark);
            row.push_str("   ");
        }
        lines.push(row.trim_end().to_string());

        if y < layout.dy() {
            let data: Vec<&str> = (0..layout.dx()).map(|_| "o").collect();
            lines.push(format!("  {}", data.join("   ")));
        }
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let layout = PatchLayout::square(3).unwrap();
        let summary = LayoutSummary::new(&layout);
        assert_eq!(summary.data_qubits, 9);
        assert_eq!(summary.x_ancillas + summary.z_ancillas, 8);
        assert_eq!(summary.patch_size, 32);
        assert_eq!(summary.first_helper, 32);
    }

    #[test]
    fn test_render_shape() {
        let layout = PatchLayout::square(3).unwrap();
        let lines = render(&layout).unwrap();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[1], "  o   o   o");
        let marks: usize = lines
            .iter()
            .step_by(2)
            .map(|l| l.chars().filter(|c| *c == 'X' || *c == 'Z').count())
            .sum();
        assert_eq!(marks, 8);
    }
}

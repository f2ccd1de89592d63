//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - surface-code cultivation program generator",
        style("Cultiv").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  cultiv-ir       Program representation and text emitter");
    println!("  cultiv-compile  Protocol generator and lowering passes");
    println!("  cultiv-cli      Command-line interface");
    println!();
    println!("License:    {}", style("Apache-2.0").dim());
}

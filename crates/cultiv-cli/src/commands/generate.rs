//! Generate command implementation.

use anyhow::{Context, Result};
use console::style;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::debug;

use cultiv_compile::{Protocol, ProtocolConfig};
use cultiv_ir::{Circuit, emit};

/// Command-line values that replace fields of the loaded config.
#[derive(Debug, Default)]
pub struct Overrides {
    pub distance: Option<u32>,
    pub prep: Option<String>,
    pub embedding: Option<String>,
    pub helper_length: Option<u32>,
    pub rounds: Option<u32>,
    pub postselect: Option<String>,
    pub noise: Option<f64>,
    pub hardware: Option<String>,
    pub observable: Option<String>,
    pub cultivation_only: bool,
    pub no_gauge_fix: bool,
    pub verify: bool,
}

/// Execute the generate command.
pub fn execute(config_path: Option<&str>, overrides: &Overrides, output: Option<&str>) -> Result<()> {
    let mut config = match config_path {
        Some(path) => load_config(path)?,
        None => ProtocolConfig::default(),
    };
    apply_overrides(&mut config, overrides)?;
    debug!(?config, "Resolved protocol config");

    eprintln!(
        "{} Generating distance-{} program ({:?}, helper length {}, {:?} postselection)",
        style("→").cyan().bold(),
        style(config.distance).green(),
        config.prep,
        config.helper_length,
        config.postselect
    );

    let protocol = Protocol::new(config)?;
    let program = protocol.generate()?;

    eprintln!("{} Generation complete", style("✓").green().bold());
    eprintln!(
        "  Result: {} instructions, {} measurements, {} detectors",
        program.len(),
        program.num_measurements(),
        program.num_detectors()
    );

    match output {
        Some(path) => {
            save_program(&program, path)?;
            eprintln!("  Output: {}", style(path).green());
        }
        None => print!("{}", emit(&program)?),
    }
    Ok(())
}

/// Load a protocol config, picking the format by extension.
pub fn load_config(path: &str) -> Result<ProtocolConfig> {
    let path_obj = Path::new(path);

    if !path_obj.exists() {
        anyhow::bail!("File not found: {}", path);
    }

    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?;

    let ext = path_obj.extension().and_then(|e| e.to_str()).unwrap_or("");
    let config = match ext.to_lowercase().as_str() {
        "json" => serde_json::from_str(&source)
            .with_context(|| format!("Invalid JSON config: {path}"))?,
        "yaml" | "yml" => serde_yaml_ng::from_str(&source)
            .with_context(|| format!("Invalid YAML config: {path}"))?,
        other => anyhow::bail!("Unknown config format '{other}'. Available: json, yaml, yml"),
    };
    Ok(config)
}

/// Parse a flag value with the same names the config files use.
fn parse_choice<T: DeserializeOwned>(flag: &str, value: &str) -> Result<T> {
    serde_json::from_value(serde_json::Value::String(value.to_lowercase()))
        .with_context(|| format!("Invalid value '{value}' for --{flag}"))
}

fn apply_overrides(config: &mut ProtocolConfig, o: &Overrides) -> Result<()> {
    if let Some(d) = o.distance {
        config.distance = d;
    }
    if let Some(prep) = &o.prep {
        config.prep = parse_choice("prep", prep)?;
    }
    if let Some(embedding) = &o.embedding {
        config.embedding = parse_choice("embedding", embedding)?;
    }
    if let Some(len) = o.helper_length {
        config.helper_length = len;
    }
    if let Some(rounds) = o.rounds {
        config.latter_rounds = rounds;
    }
    if let Some(mode) = &o.postselect {
        config.postselect = parse_choice("postselect", mode)?;
    }
    if let Some(p) = o.noise {
        config.noise = p;
    }
    if let Some(hardware) = &o.hardware {
        config.hardware = parse_choice("hardware", hardware)?;
    }
    if let Some(observable) = &o.observable {
        config.observable = parse_choice("observable", observable)?;
    }
    config.cultivation_only |= o.cultivation_only;
    config.verify_moments |= o.verify;
    if o.no_gauge_fix {
        config.gauge_fix = false;
    }
    Ok(())
}

/// Save a program, as JSON for `.json` paths and as circuit text
/// otherwise.
fn save_program(program: &Circuit, path: &str) -> Result<()> {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("stim");

    let content = match ext.to_lowercase().as_str() {
        "json" => program.to_json()?,
        _ => emit(program)?,
    };

    fs::write(path, content).with_context(|| format!("Failed to write file: {path}"))?;
    Ok(())
}

use anyhow::{Context, Result};
use lcsave_core::{load_with, save};
use owo_colors::OwoColorize;
use std::path::Path;
use tracing::info;

use super::{load_options, resolve_profile};

/// Run the resave command
pub fn run(input: &Path, output: &Path, to: Option<&str>, ignore_checksum: bool) -> Result<()> {
    let options = load_options(None, ignore_checksum)?;
    let bytes = std::fs::read(input).with_context(|| format!("Reading {}", input.display()))?;
    let loaded = load_with(&bytes, &options)
        .with_context(|| format!("Loading {}", input.display()))?;

    let target = match to {
        Some(id) => resolve_profile(id)?,
        None => loaded.profile,
    };
    if target != loaded.profile {
        info!(from = loaded.profile.id, to = target.id, "Converting save");
    }

    let out = save(&loaded, &target).with_context(|| format!("Serializing for {}", target))?;
    std::fs::write(output, &out).with_context(|| format!("Writing {}", output.display()))?;

    println!(
        "{} {} -> {} ({}, {} bytes)",
        "Saved".green(),
        input.display(),
        output.display(),
        target,
        out.len()
    );
    if target == loaded.profile && out != bytes {
        println!(
            "{}",
            "Note: output differs from the input; the original was not written by this layout"
                .yellow()
        );
    }
    Ok(())
}

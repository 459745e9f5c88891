use anyhow::{Context, Result};
use lcsave_core::detect_format;
use owo_colors::OwoColorize;
use std::path::PathBuf;
use tracing::debug;

/// Run the detect command
///
/// Every file is reported; the command fails if any was not recognized.
pub fn run(files: &[PathBuf]) -> Result<()> {
    let mut failures = 0usize;
    for file in files {
        let bytes = std::fs::read(file).with_context(|| format!("Reading {}", file.display()))?;
        debug!(path = %file.display(), len = bytes.len(), "Detecting");
        match detect_format(&bytes) {
            Ok(profile) => println!(
                "{}: {} ({})",
                file.display(),
                profile.name.green(),
                profile.id
            ),
            Err(e) => {
                failures += 1;
                println!("{}: {}", file.display(), e.to_string().red());
            }
        }
    }
    if failures > 0 {
        anyhow::bail!("{} of {} files not recognized", failures, files.len());
    }
    Ok(())
}

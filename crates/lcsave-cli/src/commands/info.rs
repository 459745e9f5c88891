use anyhow::{Context, Result};
use lcsave_core::{SaveSummary, load_with};
use owo_colors::OwoColorize;
use std::path::Path;

use super::load_options;

/// Run the info command
pub fn run(file: &Path, profile: Option<&str>, json: bool, ignore_checksum: bool) -> Result<()> {
    let options = load_options(profile, ignore_checksum)?;
    let bytes = std::fs::read(file).with_context(|| format!("Reading {}", file.display()))?;
    let save = load_with(&bytes, &options)
        .with_context(|| format!("Loading {}", file.display()))?;
    let summary = save.summary();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &SaveSummary) {
    println!("{}", summary.profile_name.bold());
    if !summary.save_name.is_empty() {
        println!("  Name:           {}", summary.save_name);
    }
    if let Some(saved_at) = summary.saved_at {
        println!("  Saved:          {}", saved_at.format("%Y-%m-%d %H:%M:%S"));
    }
    println!(
        "  Level:          {}",
        summary.level.as_deref().unwrap_or("unknown")
    );
    println!("  Game time:      {}", summary.game_time);
    println!("  Money:          ${}", summary.money);
    println!(
        "  Packages:       {}/{}",
        summary.packages_collected, summary.total_packages
    );
    println!(
        "  Scripts:        {} running, {} globals",
        summary.running_scripts, summary.global_variables
    );
    println!(
        "  Garages:        {} in use, {} stored cars",
        summary.active_garages, summary.stored_cars
    );
    println!("  Car generators: {}", summary.car_generators);
    println!();
    println!("{}", "Sections".bold());
    for section in &summary.sections {
        let name = match section.tag {
            Some(tag) => format!("{} [{}]", section.section, tag),
            None => section.section.to_string(),
        };
        println!(
            "  {:>2}  {:<22} {:>7} bytes",
            section.block,
            name,
            section.bytes.cyan()
        );
    }
}

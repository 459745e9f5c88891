use anyhow::Result;
use lcsave_core::FormatProfile;
use owo_colors::OwoColorize;

/// Run the profiles command
pub fn run(json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&FormatProfile::ALL)?);
        return Ok(());
    }

    println!(
        "{:<12} {:<22} {:>7} {:>11} {:>9} {:>6} {:>8}",
        "ID".bold(),
        "Name".bold(),
        "Garages".bold(),
        "Stored cars".bold(),
        "Car gens".bold(),
        "Stack".bold(),
        "Buffer".bold()
    );
    for profile in FormatProfile::ALL {
        println!(
            "{:<12} {:<22} {:>7} {:>11} {:>9} {:>6} {:>8}",
            profile.id,
            profile.name,
            profile.max_garages,
            profile.max_stored_cars,
            profile.max_car_generators,
            profile.stack_depth,
            profile.working_buffer_capacity
        );
    }
    Ok(())
}

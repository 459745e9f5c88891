use chrono::NaiveDateTime;
use serde::Serialize;

use crate::block::{BlockLayout, Section};
use crate::save::file::SaveFile;

#[derive(Debug, Clone, Serialize)]
pub struct SectionSummary {
    pub section: Section,
    pub block: usize,
    pub tag: Option<&'static str>,
    /// Payload bytes, framing excluded
    pub bytes: usize,
}

/// Human-facing overview of a save
#[derive(Debug, Clone, Serialize)]
pub struct SaveSummary {
    pub profile: &'static str,
    pub profile_name: &'static str,
    pub save_name: String,
    pub saved_at: Option<NaiveDateTime>,
    pub level: Option<String>,
    pub game_time: String,
    pub money: i32,
    pub packages_collected: i32,
    pub total_packages: i32,
    pub running_scripts: usize,
    pub global_variables: usize,
    pub stored_cars: usize,
    pub active_garages: u32,
    pub car_generators: u32,
    pub sections: Vec<SectionSummary>,
}

impl SaveFile {
    pub fn summary(&self) -> SaveSummary {
        let profile = &self.profile;
        let sections = BlockLayout::for_profile(profile)
            .blocks()
            .flat_map(|(block, sections)| {
                sections.iter().map(move |&section| SectionSummary {
                    section,
                    block,
                    tag: section.tag(),
                    bytes: self.section_payload_len(section, profile),
                })
            })
            .collect();

        let vars = &self.simple_vars;
        SaveSummary {
            profile: profile.id,
            profile_name: profile.name,
            save_name: vars.save_name.clone(),
            saved_at: vars.save_time.to_naive(),
            level: vars.level().map(|level| level.to_string()),
            game_time: format!("{:02}:{:02}", vars.game_clock_hours, vars.game_clock_minutes),
            money: self.player_info.money,
            packages_collected: self.player_info.packages_collected,
            total_packages: self.player_info.total_packages,
            running_scripts: self
                .scripts
                .as_ref()
                .map_or(0, |scripts| scripts.running_scripts.len()),
            global_variables: self.scripts.as_ref().map_or(0, |scripts| scripts.num_globals()),
            stored_cars: self.garages.occupied_slots().count(),
            active_garages: self.garages.num_garages,
            car_generators: self.car_generators.num_generators,
            sections,
        }
    }
}

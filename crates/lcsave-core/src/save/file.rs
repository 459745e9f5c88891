use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::block::{Section, framed_len, read_block_at, write_block, write_record_block};
use crate::buffer::ByteBuffer;
use crate::error::{Error, Result};
use crate::format::FormatProfile;
use crate::record::{
    CarGeneratorData, GarageData, PedTypeData, PlayerInfo, RawSection, SaveRecord, ScriptData,
    SimpleVariables, from_bytes,
};

/// A whole save in memory.
///
/// Sections without a typed record are kept as [`RawSection`]s; they are
/// written back verbatim, so converting a save between profiles only
/// adapts the typed sections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveFile {
    /// Profile the save was loaded with; the default target for saving
    pub profile: FormatProfile,
    pub simple_vars: SimpleVariables,
    /// `None` when the script block is empty
    pub scripts: Option<ScriptData>,
    pub ped_pool: RawSection,
    pub garages: GarageData,
    pub vehicles: RawSection,
    pub objects: RawSection,
    pub paths: RawSection,
    pub cranes: RawSection,
    pub pickups: RawSection,
    pub phone_info: RawSection,
    pub restarts: RawSection,
    pub radar_blips: RawSection,
    pub zones: RawSection,
    pub gangs: RawSection,
    pub car_generators: CarGeneratorData,
    pub particles: RawSection,
    pub audio_objects: RawSection,
    pub player_info: PlayerInfo,
    pub stats: RawSection,
    pub streaming: RawSection,
    pub ped_types: PedTypeData,
}

impl SaveFile {
    /// Empty save with every fixed-capacity table sized for `profile`
    pub fn new(profile: FormatProfile) -> Self {
        Self {
            profile,
            simple_vars: SimpleVariables::default(),
            scripts: None,
            ped_pool: RawSection::default(),
            garages: GarageData::new(&profile),
            vehicles: RawSection::default(),
            objects: RawSection::default(),
            paths: RawSection::default(),
            cranes: RawSection::default(),
            pickups: RawSection::default(),
            phone_info: RawSection::default(),
            restarts: RawSection::default(),
            radar_blips: RawSection::default(),
            zones: RawSection::default(),
            gangs: RawSection::default(),
            car_generators: CarGeneratorData::new(&profile),
            particles: RawSection::default(),
            audio_objects: RawSection::default(),
            player_info: PlayerInfo::default(),
            stats: RawSection::default(),
            streaming: RawSection::default(),
            ped_types: PedTypeData::default(),
        }
    }

    /// Read and parse a save from disk, detecting its format
    pub fn load_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        let save = crate::save::load(&bytes)?;
        info!(path = %path.as_ref().display(), profile = save.profile.id, "Loaded save file");
        Ok(save)
    }

    /// Serialize with the save's own profile and write to disk
    pub fn save_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = crate::save::save(self, &self.profile)?;
        std::fs::write(path.as_ref(), bytes)?;
        info!(path = %path.as_ref().display(), profile = self.profile.id, "Wrote save file");
        Ok(())
    }

    /// The opaque section stored for `section`, if it has no typed record
    pub fn raw(&self, section: Section) -> Option<&RawSection> {
        Some(match section {
            Section::PedPool => &self.ped_pool,
            Section::Vehicles => &self.vehicles,
            Section::Objects => &self.objects,
            Section::Paths => &self.paths,
            Section::Cranes => &self.cranes,
            Section::Pickups => &self.pickups,
            Section::PhoneInfo => &self.phone_info,
            Section::Restarts => &self.restarts,
            Section::RadarBlips => &self.radar_blips,
            Section::Zones => &self.zones,
            Section::Gangs => &self.gangs,
            Section::Particles => &self.particles,
            Section::AudioObjects => &self.audio_objects,
            Section::Stats => &self.stats,
            Section::Streaming => &self.streaming,
            Section::SimpleVars
            | Section::Scripts
            | Section::Garages
            | Section::CarGenerators
            | Section::PlayerInfo
            | Section::PedTypes => return None,
        })
    }

    pub fn raw_mut(&mut self, section: Section) -> Option<&mut RawSection> {
        Some(match section {
            Section::PedPool => &mut self.ped_pool,
            Section::Vehicles => &mut self.vehicles,
            Section::Objects => &mut self.objects,
            Section::Paths => &mut self.paths,
            Section::Cranes => &mut self.cranes,
            Section::Pickups => &mut self.pickups,
            Section::PhoneInfo => &mut self.phone_info,
            Section::Restarts => &mut self.restarts,
            Section::RadarBlips => &mut self.radar_blips,
            Section::Zones => &mut self.zones,
            Section::Gangs => &mut self.gangs,
            Section::Particles => &mut self.particles,
            Section::AudioObjects => &mut self.audio_objects,
            Section::Stats => &mut self.stats,
            Section::Streaming => &mut self.streaming,
            Section::SimpleVars
            | Section::Scripts
            | Section::Garages
            | Section::CarGenerators
            | Section::PlayerInfo
            | Section::PedTypes => return None,
        })
    }

    /// Payload bytes of `section` under `profile`, framing excluded
    pub fn section_payload_len(&self, section: Section, profile: &FormatProfile) -> usize {
        match section {
            Section::SimpleVars => self.simple_vars.size(profile),
            Section::Scripts => self.scripts.as_ref().map_or(0, |s| s.size(profile)),
            Section::Garages => self.garages.size(profile),
            Section::CarGenerators => self.car_generators.size(profile),
            Section::PlayerInfo => self.player_info.size(profile),
            Section::PedTypes => self.ped_types.size(profile),
            _ => self.raw(section).map_or(0, RawSection::len),
        }
    }

    /// Bytes `section` occupies inside its outer block, framing included
    pub fn section_len(&self, section: Section, profile: &FormatProfile) -> usize {
        let payload = self.section_payload_len(section, profile);
        if section.is_framed() {
            framed_len(section.tag(), payload)
        } else {
            payload
        }
    }

    pub(crate) fn write_section(
        &self,
        section: Section,
        work: &mut ByteBuffer,
        profile: &FormatProfile,
    ) -> Result<()> {
        let tag = section.tag();
        match section {
            Section::SimpleVars => work.write_record(&self.simple_vars, profile)?,
            Section::Scripts => match &self.scripts {
                Some(scripts) => {
                    write_record_block(work, tag, scripts, profile)?;
                }
                None => {
                    write_block(work, tag, &[])?;
                }
            },
            Section::Garages => {
                write_record_block(work, tag, &self.garages, profile)?;
            }
            Section::CarGenerators => {
                write_record_block(work, tag, &self.car_generators, profile)?;
            }
            Section::PlayerInfo => {
                write_record_block(work, tag, &self.player_info, profile)?;
            }
            Section::PedTypes => {
                write_record_block(work, tag, &self.ped_types, profile)?;
            }
            _ => {
                if let Some(raw) = self.raw(section) {
                    write_record_block(work, tag, raw, profile)?;
                }
            }
        }
        Ok(())
    }

    pub(crate) fn read_section(
        &mut self,
        section: Section,
        work: &mut ByteBuffer,
        profile: &FormatProfile,
    ) -> Result<()> {
        if section == Section::SimpleVars {
            self.simple_vars = work.read_record(profile)?;
            return Ok(());
        }
        let (at, payload) = read_block_at(work, section.tag())?;
        // Rebase record errors from the payload onto `work`
        let parse = |e: Error| e.shifted(at);
        match section {
            Section::Scripts => {
                self.scripts = if payload.is_empty() {
                    None
                } else {
                    Some(from_bytes(&payload, profile).map_err(parse)?)
                };
            }
            Section::Garages => self.garages = from_bytes(&payload, profile).map_err(parse)?,
            Section::CarGenerators => {
                self.car_generators = from_bytes(&payload, profile).map_err(parse)?;
            }
            Section::PlayerInfo => {
                self.player_info = from_bytes(&payload, profile).map_err(parse)?;
            }
            Section::PedTypes => self.ped_types = from_bytes(&payload, profile).map_err(parse)?,
            _ => {
                if let Some(raw) = self.raw_mut(section) {
                    *raw = RawSection::new(payload);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockLayout;
    use strum::IntoEnumIterator;

    #[test]
    fn test_new_sizes_tables_for_profile() {
        let save = SaveFile::new(FormatProfile::PS2);
        assert_eq!(save.garages.garages.len(), 28);
        assert_eq!(save.car_generators.generators.len(), 128);
        assert!(save.scripts.is_none());
    }

    #[test]
    fn test_raw_accessors_cover_untyped_sections() {
        let mut save = SaveFile::new(FormatProfile::PC);
        let untyped: Vec<_> = Section::iter().filter(|s| save.raw(*s).is_some()).collect();
        assert_eq!(untyped.len(), 15);
        save.raw_mut(Section::Zones).unwrap().data = vec![1, 2, 3];
        assert_eq!(save.zones.data, vec![1, 2, 3]);
        assert!(save.raw(Section::Garages).is_none());
    }

    #[test]
    fn test_section_len_matches_written() {
        for profile in FormatProfile::ALL {
            let mut save = SaveFile::new(profile);
            save.scripts = Some(ScriptData::default());
            save.paths = RawSection::new(vec![5; 9]);
            let layout = BlockLayout::for_profile(&profile);
            for (_, sections) in layout.blocks() {
                for &section in sections {
                    let mut work = ByteBuffer::growable();
                    save.write_section(section, &mut work, &profile).unwrap();
                    assert_eq!(
                        work.len(),
                        save.section_len(section, &profile),
                        "{section} on {profile}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_section_read_back() {
        let profile = FormatProfile::ANDROID;
        let mut save = SaveFile::new(profile);
        save.player_info.money = 999;
        save.audio_objects = RawSection::new(vec![0xA5; 6]);

        let mut work = ByteBuffer::growable();
        for section in [Section::PlayerInfo, Section::AudioObjects, Section::Scripts] {
            save.write_section(section, &mut work, &profile).unwrap();
        }
        work.seek_to(0).unwrap();

        let mut back = SaveFile::new(profile);
        back.scripts = Some(ScriptData::default());
        for section in [Section::PlayerInfo, Section::AudioObjects, Section::Scripts] {
            back.read_section(section, &mut work, &profile).unwrap();
        }
        assert_eq!(back.player_info.money, 999);
        assert_eq!(back.audio_objects, save.audio_objects);
        assert!(back.scripts.is_none());
    }

    #[test]
    fn test_path_helpers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("GTA3sf2.b");
        let mut save = SaveFile::new(FormatProfile::IOS);
        save.player_info.money = 31337;
        save.save_path(&path).unwrap();
        assert_eq!(
            std::fs::metadata(&path).unwrap().len() as usize,
            FormatProfile::IOS.target_size
        );
        let loaded = SaveFile::load_path(&path).unwrap();
        assert_eq!(loaded.profile, FormatProfile::IOS);
        assert_eq!(loaded.player_info.money, 31337);
    }

    #[test]
    fn test_load_path_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SaveFile::load_path(dir.path().join("missing.b")).unwrap_err();
        assert!(err.is_not_found());
    }
}

//! Global "simple variables" at the head of outer block 0.
//!
//! Layout (every cell is little-endian unless noted):
//!
//! | field                          | bytes | present when                  |
//! |--------------------------------|-------|-------------------------------|
//! | save name (UTF-16, 24 chars)   | 48    | `SaveHeader`                  |
//! | save time (SYSTEMTIME)         | 16    | `SaveHeader`                  |
//! | size-of-game constant          | 4     | always (BE on `BigEndianSizeMagic`) |
//! | current level                  | 4     | always                        |
//! | camera position                | 12    | always                        |
//! | ms per game minute             | 4     | always                        |
//! | last clock tick                | 4     | always                        |
//! | clock hours, minutes (u8 + 3)  | 8     | always                        |
//! | pad mode (u16 + 2)             | 4     | `PadMode`                     |
//! | timer block                    | 32    | always                        |
//! | weather block                  | 16    | always                        |
//! | compile date                   | 24    | always                        |
//! | weather list index, zoom x2    | 12    | always                        |
//! | PS2 preferences                | 48-52 | `Ps2Preferences`              |
//! | Definitive extras              | 8     | `DefinitiveExtras`            |
//!
//! Totals: PC/Xbox 0xBC, Android/iOS 0xB8, Definitive 0xC4, PS2 0xB0,
//! PS2 Australia and Japan 0xAC.

use serde::{Deserialize, Serialize};
use strum::{Display, FromRepr, IntoStaticStr};
use tracing::debug;

use crate::buffer::{ByteBuffer, Date, FixedLayout, StringEncoding, SystemTime, Vector3};
use crate::error::{Error, Result};
use crate::format::{FormatProfile, LayoutFeature};
use crate::record::SaveRecord;

/// Characters in the wide-char save name
pub const SAVE_NAME_CHARS: usize = 24;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromRepr, IntoStaticStr, Display,
)]
#[repr(u32)]
pub enum Level {
    #[strum(serialize = "None")]
    None = 0,
    #[strum(serialize = "Industrial")]
    Industrial = 1,
    #[strum(serialize = "Commercial")]
    Commercial = 2,
    #[strum(serialize = "Suburban")]
    Suburban = 3,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromRepr, IntoStaticStr, Display,
)]
#[repr(i16)]
pub enum WeatherType {
    #[strum(serialize = "Sunny")]
    Sunny = 0,
    #[strum(serialize = "Cloudy")]
    Cloudy = 1,
    #[strum(serialize = "Rainy")]
    Rainy = 2,
    #[strum(serialize = "Foggy")]
    Foggy = 3,
}

/// Front-end settings that the PS2 builds keep inside the save
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ps2Preferences {
    pub music_volume: u32,
    pub sfx_volume: u32,
    pub controller_config: u8,
    pub use_vibration: bool,
    pub stereo_output: bool,
    pub radio_station: u8,
    pub brightness: u32,
    /// Absent on the Australian build
    pub show_blood: bool,
    pub show_subtitles: bool,
    /// Absent on the Japanese build
    pub language: u32,
    pub use_wide_screen: bool,
    pub show_trails: bool,
}

impl Ps2Preferences {
    pub fn size_of(profile: &FormatProfile) -> usize {
        let mut size = 11 * 4;
        if profile.has(LayoutFeature::BloodSetting) {
            size += 4;
        }
        if profile.has(LayoutFeature::LanguageSetting) {
            size += 4;
        }
        size
    }
}

impl SaveRecord for Ps2Preferences {
    const NAME: &'static str = "Ps2Preferences";

    fn read(buf: &mut ByteBuffer, profile: &FormatProfile) -> Result<Self> {
        let mut prefs = Self {
            music_volume: buf.read_u32()?,
            sfx_volume: buf.read_u32()?,
            controller_config: read_u8_word(buf)?,
            use_vibration: read_bool_word(buf)?,
            stereo_output: read_bool_word(buf)?,
            radio_station: read_u8_word(buf)?,
            brightness: buf.read_u32()?,
            ..Default::default()
        };
        if profile.has(LayoutFeature::BloodSetting) {
            prefs.show_blood = read_bool_word(buf)?;
        }
        prefs.show_subtitles = read_bool_word(buf)?;
        if profile.has(LayoutFeature::LanguageSetting) {
            prefs.language = buf.read_u32()?;
        }
        prefs.use_wide_screen = read_bool_word(buf)?;
        prefs.show_trails = read_bool_word(buf)?;
        // Legacy word from an older menu layout; the game never reads it
        buf.read_padding(4)?;
        Ok(prefs)
    }

    fn write(&self, buf: &mut ByteBuffer, profile: &FormatProfile) -> Result<()> {
        buf.write_u32(self.music_volume)?;
        buf.write_u32(self.sfx_volume)?;
        write_u8_word(buf, self.controller_config)?;
        write_bool_word(buf, self.use_vibration)?;
        write_bool_word(buf, self.stereo_output)?;
        write_u8_word(buf, self.radio_station)?;
        buf.write_u32(self.brightness)?;
        if profile.has(LayoutFeature::BloodSetting) {
            write_bool_word(buf, self.show_blood)?;
        }
        write_bool_word(buf, self.show_subtitles)?;
        if profile.has(LayoutFeature::LanguageSetting) {
            buf.write_u32(self.language)?;
        }
        write_bool_word(buf, self.use_wide_screen)?;
        write_bool_word(buf, self.show_trails)?;
        buf.write_padding(4)
    }

    fn size(&self, profile: &FormatProfile) -> usize {
        Self::size_of(profile)
    }
}

/// Display options only the remastered edition persists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefinitiveExtras {
    pub hud_style: u32,
    pub radar_style: u32,
}

impl DefinitiveExtras {
    pub const SIZE: usize = 8;
}

impl SaveRecord for DefinitiveExtras {
    const NAME: &'static str = "DefinitiveExtras";

    fn read(buf: &mut ByteBuffer, _: &FormatProfile) -> Result<Self> {
        Ok(Self {
            hud_style: buf.read_u32()?,
            radar_style: buf.read_u32()?,
        })
    }

    fn write(&self, buf: &mut ByteBuffer, _: &FormatProfile) -> Result<()> {
        buf.write_u32(self.hud_style)?;
        buf.write_u32(self.radar_style)
    }

    fn size(&self, _: &FormatProfile) -> usize {
        Self::SIZE
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleVariables {
    pub save_name: String,
    pub save_time: SystemTime,
    pub current_level: u32,
    pub camera_position: Vector3,
    pub millisecs_per_game_minute: u32,
    pub last_clock_tick: u32,
    pub game_clock_hours: u8,
    pub game_clock_minutes: u8,
    pub current_pad_mode: u16,
    pub time_in_milliseconds: u32,
    pub timer_time_scale: f32,
    pub timer_time_step: f32,
    pub timer_time_step_non_clipped: f32,
    pub frame_counter: u32,
    pub time_step: f32,
    pub frames_per_update: f32,
    pub time_scale: f32,
    pub old_weather_type: i16,
    pub new_weather_type: i16,
    pub forced_weather_type: i16,
    pub weather_interpolation: f32,
    pub compile_date_and_time: Date,
    pub weather_type_in_list: i32,
    pub camera_car_zoom_indicator: f32,
    pub camera_ped_zoom_indicator: f32,
    pub ps2_preferences: Ps2Preferences,
    pub definitive_extras: DefinitiveExtras,
}

impl Default for SimpleVariables {
    fn default() -> Self {
        Self {
            save_name: String::new(),
            save_time: SystemTime::default(),
            current_level: Level::Industrial as u32,
            camera_position: Vector3::default(),
            millisecs_per_game_minute: 1000,
            last_clock_tick: 0,
            game_clock_hours: 12,
            game_clock_minutes: 0,
            current_pad_mode: 0,
            time_in_milliseconds: 0,
            timer_time_scale: 1.0,
            timer_time_step: 1.0,
            timer_time_step_non_clipped: 1.0,
            frame_counter: 0,
            time_step: 1.0,
            frames_per_update: 1.0,
            time_scale: 1.0,
            old_weather_type: WeatherType::Sunny as i16,
            new_weather_type: WeatherType::Sunny as i16,
            forced_weather_type: -1,
            weather_interpolation: 0.0,
            compile_date_and_time: Date::default(),
            weather_type_in_list: 0,
            camera_car_zoom_indicator: 2.0,
            camera_ped_zoom_indicator: 2.0,
            ps2_preferences: Ps2Preferences::default(),
            definitive_extras: DefinitiveExtras::default(),
        }
    }
}

impl SimpleVariables {
    /// Byte offset of the size-of-game constant inside the record
    pub fn size_magic_offset(profile: &FormatProfile) -> usize {
        if profile.has(LayoutFeature::SaveHeader) {
            SAVE_NAME_CHARS * 2 + SystemTime::SIZE
        } else {
            0
        }
    }

    pub fn size_of(profile: &FormatProfile) -> usize {
        let mut size = Self::size_magic_offset(profile) + 120;
        if profile.has(LayoutFeature::PadMode) {
            size += 4;
        }
        if profile.has(LayoutFeature::Ps2Preferences) {
            size += Ps2Preferences::size_of(profile);
        }
        if profile.has(LayoutFeature::DefinitiveExtras) {
            size += DefinitiveExtras::SIZE;
        }
        size
    }

    pub fn level(&self) -> Option<Level> {
        Level::from_repr(self.current_level)
    }

    pub fn weather(&self) -> Option<WeatherType> {
        WeatherType::from_repr(self.new_weather_type)
    }
}

impl SaveRecord for SimpleVariables {
    const NAME: &'static str = "SimpleVariables";

    fn read(buf: &mut ByteBuffer, profile: &FormatProfile) -> Result<Self> {
        let mut vars = Self::default();
        if profile.has(LayoutFeature::SaveHeader) {
            vars.save_name = buf.read_fixed_string(SAVE_NAME_CHARS, StringEncoding::Utf16)?;
            vars.save_time = buf.read_struct()?;
        }

        let magic_offset = buf.position();
        let size_of_game = if profile.has(LayoutFeature::BigEndianSizeMagic) {
            buf.read_u32_be()?
        } else {
            buf.read_u32()?
        };
        if size_of_game as usize != profile.target_size {
            debug!(
                "size-of-game constant {:#x} at {:#x} does not match {}",
                size_of_game, magic_offset, profile
            );
            return Err(Error::FormatNotRecognized(format!(
                "size-of-game constant {:#x} is not valid for {}",
                size_of_game, profile
            )));
        }

        vars.current_level = buf.read_u32()?;
        vars.camera_position = buf.read_struct()?;
        vars.millisecs_per_game_minute = buf.read_u32()?;
        vars.last_clock_tick = buf.read_u32()?;
        vars.game_clock_hours = read_u8_word(buf)?;
        vars.game_clock_minutes = read_u8_word(buf)?;
        if profile.has(LayoutFeature::PadMode) {
            vars.current_pad_mode = buf.read_u16()?;
            buf.read_padding(2)?;
        }
        vars.time_in_milliseconds = buf.read_u32()?;
        vars.timer_time_scale = buf.read_f32()?;
        vars.timer_time_step = buf.read_f32()?;
        vars.timer_time_step_non_clipped = buf.read_f32()?;
        vars.frame_counter = buf.read_u32()?;
        vars.time_step = buf.read_f32()?;
        vars.frames_per_update = buf.read_f32()?;
        vars.time_scale = buf.read_f32()?;
        vars.old_weather_type = read_i16_word(buf)?;
        vars.new_weather_type = read_i16_word(buf)?;
        vars.forced_weather_type = read_i16_word(buf)?;
        vars.weather_interpolation = buf.read_f32()?;
        vars.compile_date_and_time = buf.read_struct()?;
        vars.weather_type_in_list = buf.read_i32()?;
        vars.camera_car_zoom_indicator = buf.read_f32()?;
        vars.camera_ped_zoom_indicator = buf.read_f32()?;
        if profile.has(LayoutFeature::Ps2Preferences) {
            vars.ps2_preferences = buf.read_record(profile)?;
        }
        if profile.has(LayoutFeature::DefinitiveExtras) {
            vars.definitive_extras = buf.read_record(profile)?;
        }
        Ok(vars)
    }

    fn write(&self, buf: &mut ByteBuffer, profile: &FormatProfile) -> Result<()> {
        if profile.has(LayoutFeature::SaveHeader) {
            buf.write_fixed_string(&self.save_name, SAVE_NAME_CHARS, StringEncoding::Utf16)?;
            buf.write_struct(&self.save_time)?;
        }

        let size_of_game = profile.target_size as u32;
        if profile.has(LayoutFeature::BigEndianSizeMagic) {
            buf.write_u32_be(size_of_game)?;
        } else {
            buf.write_u32(size_of_game)?;
        }

        buf.write_u32(self.current_level)?;
        buf.write_struct(&self.camera_position)?;
        buf.write_u32(self.millisecs_per_game_minute)?;
        buf.write_u32(self.last_clock_tick)?;
        write_u8_word(buf, self.game_clock_hours)?;
        write_u8_word(buf, self.game_clock_minutes)?;
        if profile.has(LayoutFeature::PadMode) {
            buf.write_u16(self.current_pad_mode)?;
            buf.write_padding(2)?;
        }
        buf.write_u32(self.time_in_milliseconds)?;
        buf.write_f32(self.timer_time_scale)?;
        buf.write_f32(self.timer_time_step)?;
        buf.write_f32(self.timer_time_step_non_clipped)?;
        buf.write_u32(self.frame_counter)?;
        buf.write_f32(self.time_step)?;
        buf.write_f32(self.frames_per_update)?;
        buf.write_f32(self.time_scale)?;
        write_i16_word(buf, self.old_weather_type)?;
        write_i16_word(buf, self.new_weather_type)?;
        write_i16_word(buf, self.forced_weather_type)?;
        buf.write_f32(self.weather_interpolation)?;
        buf.write_struct(&self.compile_date_and_time)?;
        buf.write_i32(self.weather_type_in_list)?;
        buf.write_f32(self.camera_car_zoom_indicator)?;
        buf.write_f32(self.camera_ped_zoom_indicator)?;
        if profile.has(LayoutFeature::Ps2Preferences) {
            buf.write_record(&self.ps2_preferences, profile)?;
        }
        if profile.has(LayoutFeature::DefinitiveExtras) {
            buf.write_record(&self.definitive_extras, profile)?;
        }
        Ok(())
    }

    fn size(&self, profile: &FormatProfile) -> usize {
        Self::size_of(profile)
    }
}

// Narrow values the game stores in a full aligned word

fn read_u8_word(buf: &mut ByteBuffer) -> Result<u8> {
    let value = buf.read_u8()?;
    buf.read_padding(3)?;
    Ok(value)
}

fn write_u8_word(buf: &mut ByteBuffer, value: u8) -> Result<()> {
    buf.write_u8(value)?;
    buf.write_padding(3)
}

fn read_bool_word(buf: &mut ByteBuffer) -> Result<bool> {
    let value = buf.read_bool8()?;
    buf.read_padding(3)?;
    Ok(value)
}

fn write_bool_word(buf: &mut ByteBuffer, value: bool) -> Result<()> {
    buf.write_bool8(value)?;
    buf.write_padding(3)
}

fn read_i16_word(buf: &mut ByteBuffer) -> Result<i16> {
    let value = buf.read_i16()?;
    buf.read_padding(2)?;
    Ok(value)
}

fn write_i16_word(buf: &mut ByteBuffer, value: i16) -> Result<()> {
    buf.write_i16(value)?;
    buf.write_padding(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::testing::assert_stable;
    use crate::record::{from_bytes, to_bytes};

    fn sample() -> SimpleVariables {
        SimpleVariables {
            save_name: "'LUIGI'S GIRLS'".to_string(),
            save_time: SystemTime {
                year: 2002,
                month: 5,
                day_of_week: 2,
                day: 21,
                hour: 20,
                minute: 15,
                second: 2,
                millisecond: 0,
            },
            current_level: Level::Commercial as u32,
            camera_position: Vector3::new(811.9, -939.9, 35.8),
            game_clock_hours: 23,
            game_clock_minutes: 59,
            current_pad_mode: 2,
            new_weather_type: WeatherType::Rainy as i16,
            ps2_preferences: Ps2Preferences {
                music_volume: 102,
                sfx_volume: 80,
                use_vibration: true,
                show_blood: true,
                language: 3,
                show_trails: true,
                ..Default::default()
            },
            definitive_extras: DefinitiveExtras {
                hud_style: 1,
                radar_style: 2,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_sizes_per_profile() {
        assert_eq!(SimpleVariables::size_of(&FormatProfile::PC), 0xBC);
        assert_eq!(SimpleVariables::size_of(&FormatProfile::XBOX), 0xBC);
        assert_eq!(SimpleVariables::size_of(&FormatProfile::ANDROID), 0xB8);
        assert_eq!(SimpleVariables::size_of(&FormatProfile::IOS), 0xB8);
        assert_eq!(SimpleVariables::size_of(&FormatProfile::DEFINITIVE), 0xC4);
        assert_eq!(SimpleVariables::size_of(&FormatProfile::PS2), 0xB0);
        assert_eq!(SimpleVariables::size_of(&FormatProfile::PS2_AU), 0xAC);
        assert_eq!(SimpleVariables::size_of(&FormatProfile::PS2_JP), 0xAC);
    }

    #[test]
    fn test_stable_on_every_profile() {
        for profile in FormatProfile::ALL {
            assert_stable(&sample(), &profile);
            assert_stable(&SimpleVariables::default(), &profile);
        }
    }

    #[test]
    fn test_size_magic_position_and_byte_order() {
        let pc = to_bytes(&sample(), &FormatProfile::PC).unwrap();
        assert_eq!(&pc[64..68], &0x31400u32.to_le_bytes());

        let ps2 = to_bytes(&sample(), &FormatProfile::PS2).unwrap();
        assert_eq!(&ps2[0..4], &0x31400u32.to_le_bytes());

        let jp = to_bytes(&sample(), &FormatProfile::PS2_JP).unwrap();
        assert_eq!(&jp[0..4], &0x31400u32.to_be_bytes());
    }

    #[test]
    fn test_wrong_profile_is_rejected() {
        let ps2 = to_bytes(&sample(), &FormatProfile::PS2).unwrap();
        let err = from_bytes::<SimpleVariables>(&ps2, &FormatProfile::PS2_JP).unwrap_err();
        assert!(err.is_unrecognized());
    }

    #[test]
    fn test_fields_dropped_by_region() {
        let bytes = to_bytes(&sample(), &FormatProfile::PS2_AU).unwrap();
        let back: SimpleVariables = from_bytes(&bytes, &FormatProfile::PS2_AU).unwrap();
        assert!(!back.ps2_preferences.show_blood);
        assert_eq!(back.ps2_preferences.language, 3);

        let bytes = to_bytes(&sample(), &FormatProfile::PS2_JP).unwrap();
        let back: SimpleVariables = from_bytes(&bytes, &FormatProfile::PS2_JP).unwrap();
        assert!(back.ps2_preferences.show_blood);
        assert_eq!(back.ps2_preferences.language, 0);
    }

    #[test]
    fn test_pc_keeps_header_but_not_ps2_preferences() {
        let bytes = to_bytes(&sample(), &FormatProfile::PC).unwrap();
        let back: SimpleVariables = from_bytes(&bytes, &FormatProfile::PC).unwrap();
        assert_eq!(back.save_name, "'LUIGI'S GIRLS'");
        assert_eq!(back.save_time.year, 2002);
        assert_eq!(back.current_pad_mode, 2);
        assert_eq!(back.ps2_preferences, Ps2Preferences::default());
        assert_eq!(back.level(), Some(Level::Commercial));
        assert_eq!(back.weather(), Some(WeatherType::Rainy));
    }

    #[test]
    fn test_mobile_drops_pad_mode() {
        let bytes = to_bytes(&sample(), &FormatProfile::ANDROID).unwrap();
        let back: SimpleVariables = from_bytes(&bytes, &FormatProfile::ANDROID).unwrap();
        assert_eq!(back.current_pad_mode, 0);
        assert_eq!(back.game_clock_minutes, 59);
    }
}

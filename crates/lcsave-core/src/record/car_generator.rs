//! Parked-car spawners (tag `CGN`).
//!
//! The payload carries two nested size prefixes of its own: one for the
//! 12-byte counter header and one for the generator array. Both are
//! validated on read because a wrong value means the profile disagrees with
//! the file about `max_car_generators`.

use serde::{Deserialize, Serialize};

use crate::buffer::{ByteBuffer, Vector3};
use crate::error::{Error, Result};
use crate::format::FormatProfile;
use crate::record::SaveRecord;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarGenerator {
    /// Negative values pick a random model from the zone's car group
    pub model_index: i32,
    pub position: Vector3,
    pub heading: f32,
    pub primary_color: i16,
    pub secondary_color: i16,
    pub force_spawn: bool,
    pub alarm_chance: u8,
    pub lock_chance: u8,
    pub min_delay: u16,
    pub max_delay: u16,
    pub timer: u32,
    pub vehicle_handle: i32,
    /// -1 means unlimited
    pub usage_count: i16,
    pub is_blocking: bool,
}

impl CarGenerator {
    pub const SIZE: usize = 0x2C;

    pub fn is_enabled(&self) -> bool {
        self.usage_count != 0
    }
}

impl SaveRecord for CarGenerator {
    const NAME: &'static str = "CarGenerator";

    fn read(buf: &mut ByteBuffer, _: &FormatProfile) -> Result<Self> {
        let mut generator = Self {
            model_index: buf.read_i32()?,
            position: buf.read_struct()?,
            heading: buf.read_f32()?,
            primary_color: buf.read_i16()?,
            secondary_color: buf.read_i16()?,
            force_spawn: buf.read_bool8()?,
            alarm_chance: buf.read_u8()?,
            lock_chance: buf.read_u8()?,
            ..Default::default()
        };
        buf.read_padding(1)?;
        generator.min_delay = buf.read_u16()?;
        generator.max_delay = buf.read_u16()?;
        generator.timer = buf.read_u32()?;
        generator.vehicle_handle = buf.read_i32()?;
        generator.usage_count = buf.read_i16()?;
        generator.is_blocking = buf.read_bool8()?;
        buf.read_padding(1)?;
        Ok(generator)
    }

    fn write(&self, buf: &mut ByteBuffer, _: &FormatProfile) -> Result<()> {
        buf.write_i32(self.model_index)?;
        buf.write_struct(&self.position)?;
        buf.write_f32(self.heading)?;
        buf.write_i16(self.primary_color)?;
        buf.write_i16(self.secondary_color)?;
        buf.write_bool8(self.force_spawn)?;
        buf.write_u8(self.alarm_chance)?;
        buf.write_u8(self.lock_chance)?;
        buf.write_padding(1)?;
        buf.write_u16(self.min_delay)?;
        buf.write_u16(self.max_delay)?;
        buf.write_u32(self.timer)?;
        buf.write_i32(self.vehicle_handle)?;
        buf.write_i16(self.usage_count)?;
        buf.write_bool8(self.is_blocking)?;
        buf.write_padding(1)
    }

    fn size(&self, _: &FormatProfile) -> usize {
        Self::SIZE
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarGeneratorData {
    pub num_generators: u32,
    pub num_active: u32,
    pub process_counter: u8,
    pub generate_even_if_player_close_counter: u8,
    pub generators: Vec<CarGenerator>,
}

impl CarGeneratorData {
    /// Counter header, excluding its own size prefix
    pub const HEADER_SIZE: u32 = 12;

    pub fn new(profile: &FormatProfile) -> Self {
        Self {
            generators: vec![CarGenerator::default(); profile.max_car_generators],
            ..Default::default()
        }
    }

    pub fn size_of(profile: &FormatProfile) -> usize {
        4 + Self::HEADER_SIZE as usize + 4 + profile.max_car_generators * CarGenerator::SIZE
    }

    fn array_size(profile: &FormatProfile) -> usize {
        profile.max_car_generators * CarGenerator::SIZE
    }
}

fn expect_prefix(declared: u32, expected: usize) -> Result<()> {
    if declared as usize != expected {
        return Err(Error::SizeInvariantViolation {
            record: CarGeneratorData::NAME,
            expected,
            actual: declared as usize,
        });
    }
    Ok(())
}

impl SaveRecord for CarGeneratorData {
    const NAME: &'static str = "CarGeneratorData";

    fn read(buf: &mut ByteBuffer, profile: &FormatProfile) -> Result<Self> {
        expect_prefix(buf.read_u32()?, Self::HEADER_SIZE as usize)?;
        let num_generators = buf.read_u32()?;
        let num_active = buf.read_u32()?;
        let process_counter = buf.read_u8()?;
        let generate_even_if_player_close_counter = buf.read_u8()?;
        buf.read_padding(2)?;
        expect_prefix(buf.read_u32()?, Self::array_size(profile))?;
        Ok(Self {
            num_generators,
            num_active,
            process_counter,
            generate_even_if_player_close_counter,
            generators: buf.read_records(profile.max_car_generators, profile)?,
        })
    }

    fn write(&self, buf: &mut ByteBuffer, profile: &FormatProfile) -> Result<()> {
        buf.write_u32(Self::HEADER_SIZE)?;
        buf.write_u32(self.num_generators)?;
        buf.write_u32(self.num_active)?;
        buf.write_u8(self.process_counter)?;
        buf.write_u8(self.generate_even_if_player_close_counter)?;
        buf.write_padding(2)?;
        buf.write_u32(Self::array_size(profile) as u32)?;
        buf.write_slots(&self.generators, profile.max_car_generators, profile)
    }

    fn size(&self, profile: &FormatProfile) -> usize {
        Self::size_of(profile)
    }
}

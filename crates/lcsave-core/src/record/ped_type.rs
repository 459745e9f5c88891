//! Ped-type relationship table (tag `PTP`).

use serde::{Deserialize, Serialize};

use crate::buffer::ByteBuffer;
use crate::error::Result;
use crate::format::FormatProfile;
use crate::record::SaveRecord;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PedType {
    pub flag: u32,
    pub unknown: [f32; 5],
    /// Bitmask over ped-type flags this type attacks
    pub threats: u32,
    /// Bitmask over ped-type flags this type steers clear of
    pub avoid: u32,
}

impl PedType {
    pub const SIZE: usize = 32;
}

impl SaveRecord for PedType {
    const NAME: &'static str = "PedType";

    fn read(buf: &mut ByteBuffer, _: &FormatProfile) -> Result<Self> {
        let flag = buf.read_u32()?;
        let mut unknown = [0f32; 5];
        for value in &mut unknown {
            *value = buf.read_f32()?;
        }
        Ok(Self {
            flag,
            unknown,
            threats: buf.read_u32()?,
            avoid: buf.read_u32()?,
        })
    }

    fn write(&self, buf: &mut ByteBuffer, _: &FormatProfile) -> Result<()> {
        buf.write_u32(self.flag)?;
        buf.write_array(&self.unknown)?;
        buf.write_u32(self.threats)?;
        buf.write_u32(self.avoid)
    }

    fn size(&self, _: &FormatProfile) -> usize {
        Self::SIZE
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PedTypeData {
    pub ped_types: Vec<PedType>,
}

impl PedTypeData {
    pub const COUNT: usize = 23;

    pub fn size_of() -> usize {
        Self::COUNT * PedType::SIZE
    }

    /// Ped types that treat any type carrying `flag` as a threat
    pub fn hostile_to(&self, flag: u32) -> impl Iterator<Item = usize> + '_ {
        self.ped_types
            .iter()
            .enumerate()
            .filter(move |(_, ty)| ty.threats & flag != 0)
            .map(|(index, _)| index)
    }
}

impl Default for PedTypeData {
    fn default() -> Self {
        // Each type's flag is its own bit
        let ped_types = (0..Self::COUNT)
            .map(|index| PedType {
                flag: 1 << index,
                ..Default::default()
            })
            .collect();
        Self { ped_types }
    }
}

impl SaveRecord for PedTypeData {
    const NAME: &'static str = "PedTypeData";

    fn read(buf: &mut ByteBuffer, profile: &FormatProfile) -> Result<Self> {
        Ok(Self {
            ped_types: buf.read_records(Self::COUNT, profile)?,
        })
    }

    fn write(&self, buf: &mut ByteBuffer, profile: &FormatProfile) -> Result<()> {
        buf.write_slots(&self.ped_types, Self::COUNT, profile)
    }

    fn size(&self, _: &FormatProfile) -> usize {
        Self::size_of()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::testing::assert_stable;

    #[test]
    fn test_default_table() {
        let data = PedTypeData::default();
        assert_eq!(data.ped_types.len(), 23);
        assert_eq!(data.ped_types[0].flag, 1);
        assert_eq!(data.ped_types[22].flag, 1 << 22);
    }

    #[test]
    fn test_stable_on_every_profile() {
        let mut data = PedTypeData::default();
        data.ped_types[7].threats = 0x0000_0003;
        data.ped_types[7].unknown = [1.0, 0.5, 0.25, 0.0, -1.0];
        for profile in FormatProfile::ALL {
            let bytes = assert_stable(&data, &profile);
            assert_eq!(bytes.len(), 23 * 32);
        }
    }

    #[test]
    fn test_hostile_to() {
        let mut data = PedTypeData::default();
        data.ped_types[4].threats = 1 << 2;
        data.ped_types[9].threats = (1 << 2) | 1;
        let hostile: Vec<_> = data.hostile_to(1 << 2).collect();
        assert_eq!(hostile, vec![4, 9]);
    }
}

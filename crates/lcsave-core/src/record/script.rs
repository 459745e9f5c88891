//! Script engine state (tag `SCR`).
//!
//! | part                                   | bytes                        |
//! |----------------------------------------|------------------------------|
//! | global space size                      | 4                            |
//! | global space                           | that many                    |
//! | fixed part size (always 0x3C8)         | 4                            |
//! | on-mission flag offset                 | 4                            |
//! | contacts                               | 16 x 8                       |
//! | collectives, next free collective      | 32 x 8 + 4                   |
//! | building swaps                         | 25 x 16                      |
//! | invisibility settings                  | 20 x 8                       |
//! | multi-script flag + pad                | 4                            |
//! | main / largest mission script size     | 8                            |
//! | mission script count + pad             | 4                            |
//! | running script count                   | 4                            |
//! | running scripts                        | count x (112 + 4 x stack)    |

use serde::{Deserialize, Serialize};

use crate::buffer::{ByteBuffer, FixedLayout, StringEncoding};
use crate::error::{Error, Result};
use crate::format::FormatProfile;
use crate::record::{SaveRecord, check_slots};

const NUM_CONTACTS: usize = 16;
const NUM_COLLECTIVES: usize = 32;
const NUM_BUILDING_SWAPS: usize = 25;
const NUM_INVISIBILITY_SETTINGS: usize = 20;
const NUM_LOCALS: usize = 16;
const NUM_TIMERS: usize = 2;
const SCRIPT_NAME_CHARS: usize = 8;

/// Size of everything between the global space and the running scripts
const FIXED_PART_SIZE: usize = 0x3C8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub on_mission_flag: u32,
    pub base_brief_id: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collective {
    pub index: i32,
    pub ped_index: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingSwap {
    pub object_type: u32,
    pub handle: i32,
    pub new_model: i32,
    pub old_model: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvisibleObject {
    pub object_type: u32,
    pub handle: i32,
}

macro_rules! pair_layout {
    ($ty:ty { $a:ident: $ra:ident/$wa:ident, $b:ident: $rb:ident/$wb:ident }) => {
        impl FixedLayout for $ty {
            const SIZE: usize = 8;

            fn read_from(buf: &mut ByteBuffer) -> Result<Self> {
                Ok(Self {
                    $a: buf.$ra()?,
                    $b: buf.$rb()?,
                })
            }

            fn write_to(&self, buf: &mut ByteBuffer) -> Result<()> {
                buf.$wa(self.$a)?;
                buf.$wb(self.$b)
            }
        }
    };
}

pair_layout!(ContactInfo { on_mission_flag: read_u32/write_u32, base_brief_id: read_u32/write_u32 });
pair_layout!(Collective { index: read_i32/write_i32, ped_index: read_i32/write_i32 });
pair_layout!(InvisibleObject { object_type: read_u32/write_u32, handle: read_i32/write_i32 });

impl FixedLayout for BuildingSwap {
    const SIZE: usize = 16;

    fn read_from(buf: &mut ByteBuffer) -> Result<Self> {
        Ok(Self {
            object_type: buf.read_u32()?,
            handle: buf.read_i32()?,
            new_model: buf.read_i32()?,
            old_model: buf.read_i32()?,
        })
    }

    fn write_to(&self, buf: &mut ByteBuffer) -> Result<()> {
        buf.write_u32(self.object_type)?;
        buf.write_i32(self.handle)?;
        buf.write_i32(self.new_model)?;
        buf.write_i32(self.old_model)
    }
}

/// Byte range of global variable `index`
fn global_range(index: usize) -> Option<std::ops::Range<usize>> {
    let start = index.checked_mul(4)?;
    Some(start..start.checked_add(4)?)
}

/// Write exactly `count` entries, defaults filling any shortfall
fn write_table<T: FixedLayout + Default + PartialEq>(
    buf: &mut ByteBuffer,
    record: &'static str,
    values: &[T],
    count: usize,
) -> Result<()> {
    check_slots(record, values, count)?;
    let empty = T::default();
    (0..count).try_for_each(|index| values.get(index).unwrap_or(&empty).write_to(buf))
}

/// One thread of the script virtual machine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningScript {
    pub next_pointer: u32,
    pub prev_pointer: u32,
    pub name: String,
    pub instruction_pointer: u32,
    /// Gosub return addresses; stored with `stack_depth` slots
    pub stack: Vec<u32>,
    pub stack_pointer: u16,
    pub locals: [i32; NUM_LOCALS],
    pub timers: [u32; NUM_TIMERS],
    pub is_active: bool,
    pub condition_result: bool,
    pub is_mission_script: bool,
    pub skip_wake_time: bool,
    pub wake_time: u32,
    pub and_or_state: u16,
    pub not_flag: bool,
    pub death_arrest_enabled: bool,
    pub death_arrest_executed: bool,
    pub mission_flag: bool,
}

impl RunningScript {
    pub fn size_of(profile: &FormatProfile) -> usize {
        112 + 4 * profile.stack_depth
    }

    pub fn new(name: &str, instruction_pointer: u32) -> Self {
        Self {
            name: name.to_string(),
            instruction_pointer,
            is_active: true,
            ..Default::default()
        }
    }
}

impl SaveRecord for RunningScript {
    const NAME: &'static str = "RunningScript";

    fn read(buf: &mut ByteBuffer, profile: &FormatProfile) -> Result<Self> {
        let mut script = Self {
            next_pointer: buf.read_u32()?,
            prev_pointer: buf.read_u32()?,
            name: buf.read_fixed_string(SCRIPT_NAME_CHARS, StringEncoding::Ascii)?,
            instruction_pointer: buf.read_u32()?,
            stack: buf.read_array(profile.stack_depth)?,
            stack_pointer: buf.read_u16()?,
            ..Default::default()
        };
        buf.read_padding(2)?;
        for local in &mut script.locals {
            *local = buf.read_i32()?;
        }
        for timer in &mut script.timers {
            *timer = buf.read_u32()?;
        }
        script.is_active = buf.read_bool8()?;
        script.condition_result = buf.read_bool8()?;
        script.is_mission_script = buf.read_bool8()?;
        script.skip_wake_time = buf.read_bool8()?;
        script.wake_time = buf.read_u32()?;
        script.and_or_state = buf.read_u16()?;
        script.not_flag = buf.read_bool8()?;
        script.death_arrest_enabled = buf.read_bool8()?;
        script.death_arrest_executed = buf.read_bool8()?;
        script.mission_flag = buf.read_bool8()?;
        buf.read_padding(2)?;
        Ok(script)
    }

    fn write(&self, buf: &mut ByteBuffer, profile: &FormatProfile) -> Result<()> {
        buf.write_u32(self.next_pointer)?;
        buf.write_u32(self.prev_pointer)?;
        buf.write_fixed_string(&self.name, SCRIPT_NAME_CHARS, StringEncoding::Ascii)?;
        buf.write_u32(self.instruction_pointer)?;
        write_table(buf, Self::NAME, &self.stack, profile.stack_depth)?;
        buf.write_u16(self.stack_pointer)?;
        buf.write_padding(2)?;
        buf.write_array(&self.locals)?;
        buf.write_array(&self.timers)?;
        buf.write_bool8(self.is_active)?;
        buf.write_bool8(self.condition_result)?;
        buf.write_bool8(self.is_mission_script)?;
        buf.write_bool8(self.skip_wake_time)?;
        buf.write_u32(self.wake_time)?;
        buf.write_u16(self.and_or_state)?;
        buf.write_bool8(self.not_flag)?;
        buf.write_bool8(self.death_arrest_enabled)?;
        buf.write_bool8(self.death_arrest_executed)?;
        buf.write_bool8(self.mission_flag)?;
        buf.write_padding(2)
    }

    fn size(&self, profile: &FormatProfile) -> usize {
        Self::size_of(profile)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptData {
    /// Raw global variable space, 4 bytes per variable
    pub global_space: Vec<u8>,
    pub on_mission_flag: u32,
    pub contacts: Vec<ContactInfo>,
    pub collectives: Vec<Collective>,
    pub next_free_collective: u32,
    pub building_swaps: Vec<BuildingSwap>,
    pub invisibility_settings: Vec<InvisibleObject>,
    pub using_multi_script_file: bool,
    pub main_script_size: u32,
    pub largest_mission_script_size: u32,
    pub num_mission_scripts: i16,
    pub running_scripts: Vec<RunningScript>,
}

impl Default for ScriptData {
    fn default() -> Self {
        Self {
            global_space: Vec::new(),
            on_mission_flag: 0,
            contacts: vec![ContactInfo::default(); NUM_CONTACTS],
            collectives: vec![Collective::default(); NUM_COLLECTIVES],
            next_free_collective: 0,
            building_swaps: vec![BuildingSwap::default(); NUM_BUILDING_SWAPS],
            invisibility_settings: vec![InvisibleObject::default(); NUM_INVISIBILITY_SETTINGS],
            using_multi_script_file: false,
            main_script_size: 0,
            largest_mission_script_size: 0,
            num_mission_scripts: 0,
            running_scripts: Vec::new(),
        }
    }
}

impl ScriptData {
    pub fn num_globals(&self) -> usize {
        self.global_space.len() / 4
    }

    pub fn global(&self, index: usize) -> Option<i32> {
        let bytes = self.global_space.get(global_range(index)?)?;
        bytes.try_into().ok().map(i32::from_le_bytes)
    }

    /// Set a global, growing the space when `index` is past its end.
    ///
    /// `None` when `index` cannot be addressed.
    pub fn set_global(&mut self, index: usize, value: i32) -> Option<()> {
        let range = global_range(index)?;
        if self.global_space.len() < range.end {
            self.global_space.resize(range.end, 0);
        }
        self.global_space[range].copy_from_slice(&value.to_le_bytes());
        Some(())
    }

    pub fn find_script(&self, name: &str) -> Option<&RunningScript> {
        self.running_scripts.iter().find(|script| script.name == name)
    }
}

impl SaveRecord for ScriptData {
    const NAME: &'static str = "ScriptData";

    fn read(buf: &mut ByteBuffer, profile: &FormatProfile) -> Result<Self> {
        let global_size = buf.read_u32()? as usize;
        let global_space = buf.read_bytes(global_size)?;
        let fixed_size = buf.read_u32()? as usize;
        if fixed_size != FIXED_PART_SIZE {
            return Err(Error::SizeInvariantViolation {
                record: Self::NAME,
                expected: FIXED_PART_SIZE,
                actual: fixed_size,
            });
        }
        let on_mission_flag = buf.read_u32()?;
        let contacts = buf.read_array(NUM_CONTACTS)?;
        let collectives = buf.read_array(NUM_COLLECTIVES)?;
        let next_free_collective = buf.read_u32()?;
        let building_swaps = buf.read_array(NUM_BUILDING_SWAPS)?;
        let invisibility_settings = buf.read_array(NUM_INVISIBILITY_SETTINGS)?;
        let using_multi_script_file = buf.read_bool8()?;
        buf.read_padding(3)?;
        let main_script_size = buf.read_u32()?;
        let largest_mission_script_size = buf.read_u32()?;
        let num_mission_scripts = buf.read_i16()?;
        buf.read_padding(2)?;
        let count = buf.read_u32()? as usize;
        Ok(Self {
            global_space,
            on_mission_flag,
            contacts,
            collectives,
            next_free_collective,
            building_swaps,
            invisibility_settings,
            using_multi_script_file,
            main_script_size,
            largest_mission_script_size,
            num_mission_scripts,
            running_scripts: buf.read_records(count, profile)?,
        })
    }

    fn write(&self, buf: &mut ByteBuffer, profile: &FormatProfile) -> Result<()> {
        buf.write_u32(self.global_space.len() as u32)?;
        buf.write_bytes(&self.global_space)?;
        buf.write_u32(FIXED_PART_SIZE as u32)?;
        buf.write_u32(self.on_mission_flag)?;
        write_table(buf, "ContactInfo", &self.contacts, NUM_CONTACTS)?;
        write_table(buf, "Collective", &self.collectives, NUM_COLLECTIVES)?;
        buf.write_u32(self.next_free_collective)?;
        write_table(buf, "BuildingSwap", &self.building_swaps, NUM_BUILDING_SWAPS)?;
        write_table(
            buf,
            "InvisibleObject",
            &self.invisibility_settings,
            NUM_INVISIBILITY_SETTINGS,
        )?;
        buf.write_bool8(self.using_multi_script_file)?;
        buf.write_padding(3)?;
        buf.write_u32(self.main_script_size)?;
        buf.write_u32(self.largest_mission_script_size)?;
        buf.write_i16(self.num_mission_scripts)?;
        buf.write_padding(2)?;
        buf.write_u32(self.running_scripts.len() as u32)?;
        self.running_scripts
            .iter()
            .try_for_each(|script| buf.write_record(script, profile))
    }

    fn size(&self, profile: &FormatProfile) -> usize {
        4 + self.global_space.len()
            + 4
            + FIXED_PART_SIZE
            + 4
            + self.running_scripts.len() * RunningScript::size_of(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::testing::assert_stable;
    use crate::record::{from_bytes, to_bytes};

    fn sample() -> ScriptData {
        let mut data = ScriptData::default();
        data.set_global(0, 1);
        data.set_global(9, -77);
        data.on_mission_flag = 0x2C;
        data.contacts[3] = ContactInfo {
            on_mission_flag: 0x1F0,
            base_brief_id: 12,
        };
        data.building_swaps[0] = BuildingSwap {
            object_type: 1,
            handle: 1842,
            new_model: 3001,
            old_model: 2990,
        };
        data.main_script_size = 0x21000;
        data.num_mission_scripts = 80;
        let mut main = RunningScript::new("main", 0x4A);
        main.stack = vec![0x100, 0x200];
        main.stack_pointer = 2;
        main.locals[15] = -3;
        main.timers = [1000, 2000];
        main.wake_time = 55;
        data.running_scripts.push(main);
        data.running_scripts.push(RunningScript::new("intro", 0x9000));
        data
    }

    #[test]
    fn test_fixed_part_size() {
        let bytes = to_bytes(&ScriptData::default(), &FormatProfile::PC).unwrap();
        assert_eq!(bytes.len(), 4 + 4 + FIXED_PART_SIZE + 4);
    }

    #[test]
    fn test_running_script_sizes() {
        assert_eq!(RunningScript::size_of(&FormatProfile::PC), 136);
        assert_eq!(RunningScript::size_of(&FormatProfile::PS2), 136);
        assert_eq!(RunningScript::size_of(&FormatProfile::ANDROID), 176);
    }

    #[test]
    fn test_stable_on_every_profile() {
        for profile in FormatProfile::ALL {
            assert_stable(&sample(), &profile);
        }
    }

    #[test]
    fn test_short_stack_is_padded() {
        let profile = FormatProfile::PC;
        let bytes = to_bytes(&sample(), &profile).unwrap();
        let back: ScriptData = from_bytes(&bytes, &profile).unwrap();
        let main = back.find_script("main").unwrap();
        assert_eq!(main.stack, vec![0x100, 0x200, 0, 0, 0, 0]);
        assert_eq!(main.instruction_pointer, 0x4A);
        assert!(main.is_active);
    }

    #[test]
    fn test_deep_stack_does_not_fit_shallow_profile() {
        let mut data = sample();
        data.running_scripts[0].stack = vec![1; 16];
        assert!(to_bytes(&data, &FormatProfile::ANDROID).is_ok());
        let err = to_bytes(&data, &FormatProfile::PC).unwrap_err();
        assert!(matches!(err, Error::TooManyEntries { capacity: 6, .. }));
    }

    #[test]
    fn test_globals() {
        let data = sample();
        assert_eq!(data.num_globals(), 10);
        assert_eq!(data.global(9), Some(-77));
        assert_eq!(data.global(5), Some(0));
        assert_eq!(data.global(10), None);
    }

    #[test]
    fn test_unaddressable_global() {
        let mut data = sample();
        assert_eq!(data.global(usize::MAX), None);
        assert_eq!(data.global(usize::MAX / 4), None);
        assert_eq!(data.set_global(usize::MAX, 1), None);
        assert_eq!(data.num_globals(), 10);
        assert_eq!(data.set_global(10, 5), Some(()));
        assert_eq!(data.global(10), Some(5));
    }

    #[test]
    fn test_full_stack_on_every_profile() {
        for profile in FormatProfile::ALL {
            let mut data = sample();
            let depth = profile.stack_depth;
            let script = &mut data.running_scripts[1];
            script.stack = (1..=depth as u32).map(|i| i * 0x10).collect();
            script.stack_pointer = depth as u16;
            script.mission_flag = true;

            let bytes = assert_stable(&data, &profile);
            let back: ScriptData = from_bytes(&bytes, &profile).unwrap();
            let intro = back.find_script("intro").unwrap();
            assert_eq!(intro.stack.len(), depth);
            assert_eq!(intro.stack[depth - 1], depth as u32 * 0x10, "{profile}");
        }
    }

    #[test]
    fn test_bad_fixed_part_size_is_rejected() {
        let mut bytes = to_bytes(&ScriptData::default(), &FormatProfile::PC).unwrap();
        bytes[4..8].copy_from_slice(&0x3C4u32.to_le_bytes());
        assert!(matches!(
            from_bytes::<ScriptData>(&bytes, &FormatProfile::PC),
            Err(Error::SizeInvariantViolation { .. })
        ));
    }
}

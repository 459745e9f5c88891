//! Player money, package progress and flags.
//!
//! | field                              | bytes | present when             |
//! |------------------------------------|-------|--------------------------|
//! | money                              | 4     | always                   |
//! | wasted/busted state + pad          | 4     | always                   |
//! | time of last state change          | 4     | always                   |
//! | displayed money                    | 4     | always                   |
//! | packages collected, total packages | 8 / 4 | 4 on `CompactPackageCounts` |
//! | four flags                         | 4     | always                   |
//! | engine pointer                     | 4     | `PointerFiller`          |
//! | skin name (ASCII)                  | 32    | always                   |

use serde::{Deserialize, Serialize};
use strum::{Display, FromRepr, IntoStaticStr};

use crate::buffer::{ByteBuffer, StringEncoding};
use crate::error::Result;
use crate::format::{FormatProfile, LayoutFeature};
use crate::record::{SaveRecord, narrow};

const SKIN_NAME_CHARS: usize = 32;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromRepr, IntoStaticStr, Display,
)]
#[repr(u8)]
pub enum WastedBustedState {
    Playing = 0,
    Wasted = 1,
    Busted = 2,
    FailedCriticalMission = 3,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub money: i32,
    pub wasted_busted_state: u8,
    pub time_last_state_change: u32,
    pub display_money: i32,
    pub packages_collected: i32,
    pub total_packages: i32,
    pub infinite_sprint: bool,
    pub fast_reload: bool,
    pub get_out_of_jail_free: bool,
    pub free_health_care: bool,
    /// Engine address with no meaning outside the running game
    pub pointer_filler: u32,
    pub skin_name: String,
}

impl PlayerInfo {
    pub fn size_of(profile: &FormatProfile) -> usize {
        let counters = if profile.has(LayoutFeature::CompactPackageCounts) {
            4
        } else {
            8
        };
        let filler = if profile.has(LayoutFeature::PointerFiller) {
            4
        } else {
            0
        };
        16 + counters + 4 + filler + SKIN_NAME_CHARS
    }

    pub fn state(&self) -> Option<WastedBustedState> {
        WastedBustedState::from_repr(self.wasted_busted_state)
    }
}

impl SaveRecord for PlayerInfo {
    const NAME: &'static str = "PlayerInfo";

    fn read(buf: &mut ByteBuffer, profile: &FormatProfile) -> Result<Self> {
        let money = buf.read_i32()?;
        let wasted_busted_state = buf.read_u8()?;
        buf.read_padding(3)?;
        let time_last_state_change = buf.read_u32()?;
        let display_money = buf.read_i32()?;
        let (packages_collected, total_packages) =
            if profile.has(LayoutFeature::CompactPackageCounts) {
                (i32::from(buf.read_i16()?), i32::from(buf.read_i16()?))
            } else {
                (buf.read_i32()?, buf.read_i32()?)
            };
        let infinite_sprint = buf.read_bool8()?;
        let fast_reload = buf.read_bool8()?;
        let get_out_of_jail_free = buf.read_bool8()?;
        let free_health_care = buf.read_bool8()?;
        let pointer_filler = if profile.has(LayoutFeature::PointerFiller) {
            buf.read_u32()?
        } else {
            0
        };
        Ok(Self {
            money,
            wasted_busted_state,
            time_last_state_change,
            display_money,
            packages_collected,
            total_packages,
            infinite_sprint,
            fast_reload,
            get_out_of_jail_free,
            free_health_care,
            pointer_filler,
            skin_name: buf.read_fixed_string(SKIN_NAME_CHARS, StringEncoding::Ascii)?,
        })
    }

    fn write(&self, buf: &mut ByteBuffer, profile: &FormatProfile) -> Result<()> {
        buf.write_i32(self.money)?;
        buf.write_u8(self.wasted_busted_state)?;
        buf.write_padding(3)?;
        buf.write_u32(self.time_last_state_change)?;
        buf.write_i32(self.display_money)?;
        if profile.has(LayoutFeature::CompactPackageCounts) {
            buf.write_i16(narrow(
                Self::NAME,
                "packages_collected",
                self.packages_collected,
            )?)?;
            buf.write_i16(narrow(Self::NAME, "total_packages", self.total_packages)?)?;
        } else {
            buf.write_i32(self.packages_collected)?;
            buf.write_i32(self.total_packages)?;
        }
        buf.write_bool8(self.infinite_sprint)?;
        buf.write_bool8(self.fast_reload)?;
        buf.write_bool8(self.get_out_of_jail_free)?;
        buf.write_bool8(self.free_health_care)?;
        if profile.has(LayoutFeature::PointerFiller) {
            buf.write_u32(self.pointer_filler)?;
        }
        buf.write_fixed_string(&self.skin_name, SKIN_NAME_CHARS, StringEncoding::Ascii)
    }

    fn size(&self, profile: &FormatProfile) -> usize {
        Self::size_of(profile)
    }
}

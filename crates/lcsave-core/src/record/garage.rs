//! Garage state: tutorial flags, collection counters, the safehouse
//! stored-car slots and the garage table.
//!
//! Both arrays are stored at their full physical capacity
//! (`max_stored_cars`, `max_garages`); empty slots are zeroed records.
//!
//! `Garage` layout:
//!
//! | field                                  | bytes | present when        |
//! |----------------------------------------|-------|---------------------|
//! | type, state, two flags                 | 4     | always              |
//! | three flags + pad                      | 4     | always              |
//! | min, max corners                       | 24    | always              |
//! | door open/closed offsets, door pos     | 12    | always              |
//! | target model index                     | 4 / 2 | 2 on `ShortModelIndex` |
//! | door handles                           | 8     | `PointerFiller`     |
//! | timer                                  | 4     | always              |

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, FromRepr, IntoStaticStr};

use crate::buffer::{ByteBuffer, FixedLayout, Vector3};
use crate::error::Result;
use crate::format::{FormatProfile, LayoutFeature};
use crate::record::{SaveRecord, narrow};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromRepr, IntoStaticStr, Display,
)]
#[repr(u8)]
pub enum GarageType {
    None = 0,
    Mission = 1,
    BombShop1 = 2,
    BombShop2 = 3,
    BombShop3 = 4,
    Respray = 5,
    CollectOrders = 6,
    CollectSpecificCars = 7,
    CollectCars1 = 8,
    CollectCars2 = 9,
    CollectCars3 = 10,
    ForCarToComeOutOf = 11,
    SixtySeconds = 12,
    Crusher = 13,
    MissionKeepCar = 14,
    ForScriptToOpen = 15,
    Hideout1 = 16,
    Hideout2 = 17,
    Hideout3 = 18,
    ForScriptToOpenAndClose = 19,
    KeepsOpeningForSpecificCar = 20,
    MissionKeepCarRemainClosed = 21,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromRepr, IntoStaticStr, Display,
)]
#[repr(u8)]
pub enum GarageState {
    Closed = 0,
    Opened = 1,
    Closing = 2,
    Opening = 3,
    OpenedWithCar = 4,
    ClosedAfterDropOff = 5,
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct StoredCarFlags: u32 {
        const BULLETPROOF    = 0x01;
        const FIREPROOF      = 0x02;
        const EXPLOSIONPROOF = 0x04;
        const COLLISIONPROOF = 0x08;
        const MELEEPROOF     = 0x10;
    }
}

/// A vehicle parked in a safehouse garage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredCar {
    /// 0 marks an empty slot
    pub model_index: i32,
    pub position: Vector3,
    pub angle: Vector3,
    pub flags: StoredCarFlags,
    pub primary_color: u8,
    pub secondary_color: u8,
    pub radio_station: u8,
    pub variation_a: u8,
    pub variation_b: u8,
    pub bomb_type: u8,
}

impl StoredCar {
    pub const SIZE: usize = 0x28;

    pub fn is_empty(&self) -> bool {
        self.model_index == 0
    }
}

impl SaveRecord for StoredCar {
    const NAME: &'static str = "StoredCar";

    fn read(buf: &mut ByteBuffer, _: &FormatProfile) -> Result<Self> {
        let car = Self {
            model_index: buf.read_i32()?,
            position: buf.read_struct()?,
            angle: buf.read_struct()?,
            // Unknown bits are kept so they survive a rewrite
            flags: StoredCarFlags::from_bits_retain(buf.read_u32()?),
            primary_color: buf.read_u8()?,
            secondary_color: buf.read_u8()?,
            radio_station: buf.read_u8()?,
            variation_a: buf.read_u8()?,
            variation_b: buf.read_u8()?,
            bomb_type: buf.read_u8()?,
        };
        buf.read_padding(2)?;
        Ok(car)
    }

    fn write(&self, buf: &mut ByteBuffer, _: &FormatProfile) -> Result<()> {
        buf.write_i32(self.model_index)?;
        buf.write_struct(&self.position)?;
        buf.write_struct(&self.angle)?;
        buf.write_u32(self.flags.bits())?;
        buf.write_u8(self.primary_color)?;
        buf.write_u8(self.secondary_color)?;
        buf.write_u8(self.radio_station)?;
        buf.write_u8(self.variation_a)?;
        buf.write_u8(self.variation_b)?;
        buf.write_u8(self.bomb_type)?;
        buf.write_padding(2)
    }

    fn size(&self, _: &FormatProfile) -> usize {
        Self::SIZE
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Garage {
    pub garage_type: u8,
    pub state: u8,
    pub closing_without_target_vehicle: bool,
    pub deactivated: bool,
    pub reset_door_position: bool,
    pub has_rotated_door: bool,
    pub camera_follows_player: bool,
    pub min: Vector3,
    pub max: Vector3,
    pub door_open_offset: f32,
    pub door_closed_offset: f32,
    pub door_position: f32,
    pub target_model_index: u32,
    pub door_handle_1: u32,
    pub door_handle_2: u32,
    pub timer: u32,
}

impl Garage {
    /// Bytes every platform stores, excluding the model index and handles
    pub const FIXED_PART: usize = 4 + 4 + 2 * Vector3::SIZE + 12 + 4;

    /// Width of the target model field
    pub fn model_index_width(profile: &FormatProfile) -> usize {
        if profile.has(LayoutFeature::ShortModelIndex) {
            2
        } else {
            4
        }
    }

    pub fn size_of(profile: &FormatProfile) -> usize {
        let mut size = Self::FIXED_PART + Self::model_index_width(profile);
        if profile.has(LayoutFeature::PointerFiller) {
            size += 8;
        }
        size
    }

    pub fn kind(&self) -> Option<GarageType> {
        GarageType::from_repr(self.garage_type)
    }

    pub fn door_state(&self) -> Option<GarageState> {
        GarageState::from_repr(self.state)
    }
}

impl SaveRecord for Garage {
    const NAME: &'static str = "Garage";

    fn read(buf: &mut ByteBuffer, profile: &FormatProfile) -> Result<Self> {
        let mut garage = Self {
            garage_type: buf.read_u8()?,
            state: buf.read_u8()?,
            closing_without_target_vehicle: buf.read_bool8()?,
            deactivated: buf.read_bool8()?,
            reset_door_position: buf.read_bool8()?,
            has_rotated_door: buf.read_bool8()?,
            camera_follows_player: buf.read_bool8()?,
            ..Default::default()
        };
        buf.read_padding(1)?;
        garage.min = buf.read_struct()?;
        garage.max = buf.read_struct()?;
        garage.door_open_offset = buf.read_f32()?;
        garage.door_closed_offset = buf.read_f32()?;
        garage.door_position = buf.read_f32()?;
        garage.target_model_index = if profile.has(LayoutFeature::ShortModelIndex) {
            u32::from(buf.read_u16()?)
        } else {
            buf.read_u32()?
        };
        if profile.has(LayoutFeature::PointerFiller) {
            garage.door_handle_1 = buf.read_u32()?;
            garage.door_handle_2 = buf.read_u32()?;
        }
        garage.timer = buf.read_u32()?;
        Ok(garage)
    }

    fn write(&self, buf: &mut ByteBuffer, profile: &FormatProfile) -> Result<()> {
        buf.write_u8(self.garage_type)?;
        buf.write_u8(self.state)?;
        buf.write_bool8(self.closing_without_target_vehicle)?;
        buf.write_bool8(self.deactivated)?;
        buf.write_bool8(self.reset_door_position)?;
        buf.write_bool8(self.has_rotated_door)?;
        buf.write_bool8(self.camera_follows_player)?;
        buf.write_padding(1)?;
        buf.write_struct(&self.min)?;
        buf.write_struct(&self.max)?;
        buf.write_f32(self.door_open_offset)?;
        buf.write_f32(self.door_closed_offset)?;
        buf.write_f32(self.door_position)?;
        if profile.has(LayoutFeature::ShortModelIndex) {
            buf.write_u16(narrow(
                Self::NAME,
                "target_model_index",
                self.target_model_index,
            )?)?;
        } else {
            buf.write_u32(self.target_model_index)?;
        }
        if profile.has(LayoutFeature::PointerFiller) {
            buf.write_u32(self.door_handle_1)?;
            buf.write_u32(self.door_handle_2)?;
        }
        buf.write_u32(self.timer)
    }

    fn size(&self, profile: &FormatProfile) -> usize {
        Self::size_of(profile)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GarageData {
    /// Garages in use; the table itself always spans `max_garages`
    pub num_garages: u32,
    pub bomb_tutorial_shown: bool,
    pub respray_tutorial_shown: bool,
    pub police_cars_collected: u32,
    pub bank_vans_collected: u32,
    pub cars_collected: u32,
    pub last_time_help_message: u32,
    pub car_types_collected: [u32; 4],
    pub stored_cars: Vec<StoredCar>,
    pub garages: Vec<Garage>,
}

impl GarageData {
    pub const HEADER_SIZE: usize = 4 + 4 + 16 + 16;

    /// Empty garage state with every physical slot allocated
    pub fn new(profile: &FormatProfile) -> Self {
        Self {
            stored_cars: vec![StoredCar::default(); profile.max_stored_cars],
            garages: vec![Garage::default(); profile.max_garages],
            ..Default::default()
        }
    }

    pub fn size_of(profile: &FormatProfile) -> usize {
        Self::HEADER_SIZE
            + profile.max_stored_cars * StoredCar::SIZE
            + profile.max_garages * Garage::size_of(profile)
    }

    /// Occupied stored-car slots with their slot index
    pub fn occupied_slots(&self) -> impl Iterator<Item = (usize, &StoredCar)> {
        self.stored_cars
            .iter()
            .enumerate()
            .filter(|(_, car)| !car.is_empty())
    }

    /// Put `car` in `slot`, growing the slot list if needed
    pub fn store_car(&mut self, slot: usize, car: StoredCar) {
        if self.stored_cars.len() <= slot {
            self.stored_cars.resize(slot + 1, StoredCar::default());
        }
        self.stored_cars[slot] = car;
    }
}

impl SaveRecord for GarageData {
    const NAME: &'static str = "GarageData";

    fn read(buf: &mut ByteBuffer, profile: &FormatProfile) -> Result<Self> {
        let num_garages = buf.read_u32()?;
        let bomb_tutorial_shown = buf.read_bool8()?;
        let respray_tutorial_shown = buf.read_bool8()?;
        buf.read_padding(2)?;
        let police_cars_collected = buf.read_u32()?;
        let bank_vans_collected = buf.read_u32()?;
        let cars_collected = buf.read_u32()?;
        let last_time_help_message = buf.read_u32()?;
        let mut car_types_collected = [0u32; 4];
        for slot in &mut car_types_collected {
            *slot = buf.read_u32()?;
        }
        Ok(Self {
            num_garages,
            bomb_tutorial_shown,
            respray_tutorial_shown,
            police_cars_collected,
            bank_vans_collected,
            cars_collected,
            last_time_help_message,
            car_types_collected,
            stored_cars: buf.read_records(profile.max_stored_cars, profile)?,
            garages: buf.read_records(profile.max_garages, profile)?,
        })
    }

    fn write(&self, buf: &mut ByteBuffer, profile: &FormatProfile) -> Result<()> {
        buf.write_u32(self.num_garages)?;
        buf.write_bool8(self.bomb_tutorial_shown)?;
        buf.write_bool8(self.respray_tutorial_shown)?;
        buf.write_padding(2)?;
        buf.write_u32(self.police_cars_collected)?;
        buf.write_u32(self.bank_vans_collected)?;
        buf.write_u32(self.cars_collected)?;
        buf.write_u32(self.last_time_help_message)?;
        buf.write_array(&self.car_types_collected)?;
        buf.write_slots(&self.stored_cars, profile.max_stored_cars, profile)?;
        buf.write_slots(&self.garages, profile.max_garages, profile)
    }

    fn size(&self, profile: &FormatProfile) -> usize {
        Self::size_of(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::record::testing::assert_stable;
    use crate::record::{from_bytes, to_bytes};

    fn banshee() -> StoredCar {
        StoredCar {
            model_index: 119,
            position: Vector3::new(-1.5, 2.25, 10.0),
            angle: Vector3::new(0.0, 1.0, 0.0),
            flags: StoredCarFlags::BULLETPROOF | StoredCarFlags::FIREPROOF,
            primary_color: 3,
            secondary_color: 7,
            radio_station: 2,
            ..Default::default()
        }
    }

    fn sample(profile: &FormatProfile) -> GarageData {
        let mut data = GarageData::new(profile);
        data.num_garages = 2;
        data.respray_tutorial_shown = true;
        data.car_types_collected = [0xFF, 0, 1, 0];
        data.store_car(3, banshee());
        data.garages[0] = Garage {
            garage_type: GarageType::Respray as u8,
            state: GarageState::Opened as u8,
            min: Vector3::new(1.0, 2.0, 3.0),
            max: Vector3::new(4.0, 5.0, 6.0),
            target_model_index: 90,
            door_handle_1: 0xDEAD,
            timer: 500,
            ..Default::default()
        };
        data
    }

    #[test]
    fn test_garage_sizes() {
        assert_eq!(Garage::size_of(&FormatProfile::PC), 60);
        assert_eq!(Garage::size_of(&FormatProfile::ANDROID), 60);
        assert_eq!(Garage::size_of(&FormatProfile::IOS), 58);
        assert_eq!(Garage::size_of(&FormatProfile::PS2), 52);
        assert_eq!(
            GarageData::size_of(&FormatProfile::PC),
            GarageData::HEADER_SIZE + 18 * 40 + 32 * 60
        );
    }

    #[test]
    fn test_stable_on_every_profile() {
        for profile in FormatProfile::ALL {
            let bytes = assert_stable(&sample(&profile), &profile);
            assert_eq!(bytes.len(), GarageData::size_of(&profile));
        }
    }

    #[test]
    fn test_stored_car_keeps_its_slot() {
        let profile = FormatProfile::PC;
        let bytes = to_bytes(&sample(&profile), &profile).unwrap();
        let back: GarageData = from_bytes(&bytes, &profile).unwrap();
        assert_eq!(back.stored_cars.len(), 18);
        let occupied: Vec<_> = back.occupied_slots().map(|(i, _)| i).collect();
        assert_eq!(occupied, vec![3]);
        assert_eq!(back.stored_cars[3], banshee());
    }

    #[test]
    fn test_short_array_is_padded_to_capacity() {
        let profile = FormatProfile::PS2;
        let data = GarageData {
            stored_cars: vec![banshee()],
            ..Default::default()
        };
        let bytes = to_bytes(&data, &profile).unwrap();
        assert_eq!(bytes.len(), GarageData::size_of(&profile));
        let back: GarageData = from_bytes(&bytes, &profile).unwrap();
        assert_eq!(back.garages.len(), profile.max_garages);
        assert_eq!(back.stored_cars[0], banshee());
    }

    #[test]
    fn test_overfull_array_is_rejected() {
        let mut data = GarageData::new(&FormatProfile::PC);
        data.garages[31].timer = 1;
        // PS2 only has 28 garage slots
        let err = to_bytes(&data, &FormatProfile::PS2).unwrap_err();
        assert!(matches!(err, Error::TooManyEntries { capacity: 28, .. }));
        assert!(to_bytes(&data, &FormatProfile::PC).is_ok());
    }

    #[test]
    fn test_unknown_flag_bits_survive() {
        let car = StoredCar {
            model_index: 90,
            flags: StoredCarFlags::from_bits_retain(0x8000_0001),
            ..Default::default()
        };
        let bytes = to_bytes(&car, &FormatProfile::PC).unwrap();
        let back: StoredCar = from_bytes(&bytes, &FormatProfile::PC).unwrap();
        assert_eq!(back.flags.bits(), 0x8000_0001);
        assert!(back.flags.contains(StoredCarFlags::BULLETPROOF));
    }

    #[test]
    fn test_ios_model_index_is_two_bytes() {
        let garage = Garage {
            target_model_index: 0x1234,
            ..Default::default()
        };
        let bytes = to_bytes(&garage, &FormatProfile::IOS).unwrap();
        let at = Garage::FIXED_PART - 4;
        assert_eq!(&bytes[at..at + 2], &[0x34, 0x12]);
        let back: Garage = from_bytes(&bytes, &FormatProfile::IOS).unwrap();
        assert_eq!(back.target_model_index, 0x1234);
    }

    #[test]
    fn test_wide_model_index_does_not_fit_ios() {
        let garage = Garage {
            target_model_index: 0x1_0005,
            ..Default::default()
        };
        assert!(to_bytes(&garage, &FormatProfile::ANDROID).is_ok());
        let err = to_bytes(&garage, &FormatProfile::IOS).unwrap_err();
        assert!(matches!(
            err,
            Error::ValueOutOfRange {
                record: "Garage",
                field: "target_model_index",
                value: 0x1_0005,
                width: 2,
            }
        ));
    }

    #[test]
    fn test_flag_byte_outside_zero_one_is_rejected() {
        let mut bytes = to_bytes(&Garage::default(), &FormatProfile::PC).unwrap();
        // deactivated
        bytes[3] = 2;
        let err = from_bytes::<Garage>(&bytes, &FormatProfile::PC).unwrap_err();
        assert!(matches!(err, Error::InvalidBoolean { offset: 3, value: 2 }));
    }

    #[test]
    fn test_every_slot_filled_on_every_profile() {
        for profile in FormatProfile::ALL {
            let mut data = GarageData::new(&profile);
            data.num_garages = profile.max_garages as u32;
            for (i, car) in data.stored_cars.iter_mut().enumerate() {
                *car = StoredCar {
                    model_index: 90 + i as i32,
                    primary_color: i as u8,
                    ..banshee()
                };
            }
            for (i, garage) in data.garages.iter_mut().enumerate() {
                *garage = Garage {
                    garage_type: (i % 22) as u8,
                    state: (i % 6) as u8,
                    deactivated: i % 2 == 1,
                    camera_follows_player: true,
                    min: Vector3::new(i as f32, 0.5, -1.0),
                    target_model_index: 0xFFFF - i as u32,
                    door_handle_2: 0x1000 + i as u32,
                    timer: i as u32 + 1,
                    ..Default::default()
                };
            }

            let bytes = assert_stable(&data, &profile);
            let back: GarageData = from_bytes(&bytes, &profile).unwrap();
            let last_car = profile.max_stored_cars - 1;
            let last_garage = profile.max_garages - 1;
            assert_eq!(back.stored_cars[last_car], data.stored_cars[last_car], "{profile}");
            assert_eq!(back.garages[last_garage].timer, last_garage as u32 + 1);
            assert_eq!(
                back.garages[last_garage].target_model_index,
                0xFFFF - last_garage as u32
            );
        }
    }
}

//! Self-describing game-state records.
//!
//! Every record implements [`SaveRecord`]: read, write and report its own
//! size under a [`FormatProfile`]. Composite records delegate to their
//! children in field order, and field order is part of the format.
//!
//! The size contract (`consumed == produced == size(profile)`) is checked
//! by [`ByteBuffer::read_record`] and [`ByteBuffer::write_record`] in every
//! build; a violation is reported as `SizeInvariantViolation` and means the
//! record or the profile is wrong, not the user's file.

mod car_generator;
mod garage;
mod ped_type;
mod player_info;
mod raw;
mod script;
mod simple_vars;

pub use car_generator::{CarGenerator, CarGeneratorData};
pub use garage::{Garage, GarageData, GarageState, GarageType, StoredCar, StoredCarFlags};
pub use ped_type::{PedType, PedTypeData};
pub use player_info::{PlayerInfo, WastedBustedState};
pub use raw::RawSection;
pub use script::{
    BuildingSwap, Collective, ContactInfo, InvisibleObject, RunningScript, ScriptData,
};
pub use simple_vars::{DefinitiveExtras, Level, Ps2Preferences, SimpleVariables, WeatherType};

use crate::buffer::ByteBuffer;
use crate::error::{Error, Result};
use crate::format::FormatProfile;

pub trait SaveRecord: Sized {
    /// Name used in diagnostics
    const NAME: &'static str;

    /// Consume exactly `size(profile)` bytes
    fn read(buf: &mut ByteBuffer, profile: &FormatProfile) -> Result<Self>;

    /// Emit exactly `size(profile)` bytes
    fn write(&self, buf: &mut ByteBuffer, profile: &FormatProfile) -> Result<()>;

    /// Serialized size, computed without I/O
    fn size(&self, profile: &FormatProfile) -> usize;
}

impl ByteBuffer {
    pub fn read_record<T: SaveRecord>(&mut self, profile: &FormatProfile) -> Result<T> {
        let start = self.position();
        let record = T::read(self, profile)?;
        check_size(T::NAME, record.size(profile), self.position() - start)?;
        Ok(record)
    }

    pub fn write_record<T: SaveRecord>(&mut self, record: &T, profile: &FormatProfile) -> Result<()> {
        let start = self.position();
        record.write(self, profile)?;
        check_size(T::NAME, record.size(profile), self.position() - start)
    }

    pub fn read_records<T: SaveRecord>(
        &mut self,
        count: usize,
        profile: &FormatProfile,
    ) -> Result<Vec<T>> {
        (0..count).map(|_| self.read_record(profile)).collect()
    }

    /// Write a fixed-capacity array: every physical slot is emitted, slots
    /// past the end of `records` as defaults.
    pub fn write_slots<T: SaveRecord + Default + PartialEq>(
        &mut self,
        records: &[T],
        capacity: usize,
        profile: &FormatProfile,
    ) -> Result<()> {
        check_slots(T::NAME, records, capacity)?;
        let empty = T::default();
        for index in 0..capacity {
            self.write_record(records.get(index).unwrap_or(&empty), profile)?;
        }
        Ok(())
    }
}

fn check_size(record: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::SizeInvariantViolation {
            record,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Entries beyond the capacity are only tolerated when they are empty.
pub(crate) fn check_slots<T: Default + PartialEq>(
    record: &'static str,
    values: &[T],
    capacity: usize,
) -> Result<()> {
    let empty = T::default();
    if let Some(extra) = values.get(capacity..)
        && extra.iter().any(|value| *value != empty)
    {
        return Err(Error::TooManyEntries {
            record,
            count: values.len(),
            capacity,
        });
    }
    Ok(())
}

/// Convert `value` to the narrower on-disk type `T`, failing instead of
/// truncating when it does not fit.
pub(crate) fn narrow<T, S>(record: &'static str, field: &'static str, value: S) -> Result<T>
where
    S: Copy + Into<i64>,
    T: TryFrom<S>,
{
    T::try_from(value).map_err(|_| Error::ValueOutOfRange {
        record,
        field,
        value: value.into(),
        width: std::mem::size_of::<T>(),
    })
}

/// Serialize one record into a fresh byte vector
pub fn to_bytes<T: SaveRecord>(record: &T, profile: &FormatProfile) -> Result<Vec<u8>> {
    let mut buf = ByteBuffer::growable();
    buf.write_record(record, profile)?;
    Ok(buf.into_inner())
}

/// Parse one record that must span `bytes` exactly
pub fn from_bytes<T: SaveRecord>(bytes: &[u8], profile: &FormatProfile) -> Result<T> {
    let mut buf = ByteBuffer::from_bytes(bytes);
    let record = buf.read_record::<T>(profile)?;
    check_size(T::NAME, bytes.len(), buf.position())?;
    Ok(record)
}


#[cfg(test)]
mod tests {
    use super::*;

    /// Deliberately reports a size it does not write
    #[derive(Debug, Default, PartialEq)]
    struct Liar;

    impl SaveRecord for Liar {
        const NAME: &'static str = "Liar";

        fn read(buf: &mut ByteBuffer, _: &FormatProfile) -> Result<Self> {
            buf.read_u16()?;
            Ok(Liar)
        }

        fn write(&self, buf: &mut ByteBuffer, _: &FormatProfile) -> Result<()> {
            buf.write_u16(0)
        }

        fn size(&self, _: &FormatProfile) -> usize {
            4
        }
    }

    #[test]
    fn test_write_size_violation_is_reported() {
        let err = to_bytes(&Liar, &FormatProfile::PC).unwrap_err();
        assert!(matches!(
            err,
            Error::SizeInvariantViolation {
                record: "Liar",
                expected: 4,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_read_size_violation_is_reported() {
        let err = from_bytes::<Liar>(&[0; 4], &FormatProfile::PC).unwrap_err();
        assert!(matches!(err, Error::SizeInvariantViolation { .. }));
    }

    #[test]
    fn test_from_bytes_rejects_trailing_bytes() {
        let raw = from_bytes::<RawSection>(&[1, 2, 3], &FormatProfile::PC).unwrap();
        assert_eq!(raw.data, vec![1, 2, 3]);

        let bytes = to_bytes(&StoredCar::default(), &FormatProfile::PC).unwrap();
        let mut padded = bytes.clone();
        padded.extend_from_slice(&[0; 4]);
        assert!(matches!(
            from_bytes::<StoredCar>(&padded, &FormatProfile::PC),
            Err(Error::SizeInvariantViolation { .. })
        ));
    }

    #[test]
    fn test_check_slots_allows_empty_overflow() {
        let values = vec![1u32, 0, 0];
        assert!(check_slots("u32", &values, 1).is_ok());
        let values = vec![1u32, 0, 5];
        assert!(matches!(
            check_slots("u32", &values, 2),
            Err(Error::TooManyEntries {
                count: 3,
                capacity: 2,
                ..
            })
        ));
    }
}

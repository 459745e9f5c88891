//! Small value structs with a layout that never depends on the platform.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::buffer::ByteBuffer;
use crate::error::Result;

/// A value with one fixed byte layout on every platform
pub trait FixedLayout: Sized {
    const SIZE: usize;

    fn read_from(buf: &mut ByteBuffer) -> Result<Self>;

    fn write_to(&self, buf: &mut ByteBuffer) -> Result<()>;
}

macro_rules! primitive_layout {
    ($($ty:ty => $read:ident, $write:ident;)*) => {
        $(
            impl FixedLayout for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                fn read_from(buf: &mut ByteBuffer) -> Result<Self> {
                    buf.$read()
                }

                fn write_to(&self, buf: &mut ByteBuffer) -> Result<()> {
                    buf.$write(*self)
                }
            }
        )*
    };
}

primitive_layout! {
    u8 => read_u8, write_u8;
    u16 => read_u16, write_u16;
    i16 => read_i16, write_i16;
    u32 => read_u32, write_u32;
    i32 => read_i32, write_i32;
    i64 => read_i64, write_i64;
    f32 => read_f32, write_f32;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl FixedLayout for Vector3 {
    const SIZE: usize = 12;

    fn read_from(buf: &mut ByteBuffer) -> Result<Self> {
        Ok(Self {
            x: buf.read_f32()?,
            y: buf.read_f32()?,
            z: buf.read_f32()?,
        })
    }

    fn write_to(&self, buf: &mut ByteBuffer) -> Result<()> {
        buf.write_f32(self.x)?;
        buf.write_f32(self.y)?;
        buf.write_f32(self.z)
    }
}

/// Win32-style SYSTEMTIME: eight u16 fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemTime {
    pub year: u16,
    pub month: u16,
    pub day_of_week: u16,
    pub day: u16,
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
    pub millisecond: u16,
}

impl SystemTime {
    /// `None` for zeroed or out-of-range stamps
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year.into(), self.month.into(), self.day.into())?
            .and_hms_milli_opt(
                self.hour.into(),
                self.minute.into(),
                self.second.into(),
                self.millisecond.into(),
            )
    }

    pub fn from_naive(value: NaiveDateTime) -> Self {
        Self {
            year: u16::try_from(value.year()).unwrap_or(0),
            month: value.month() as u16,
            day_of_week: value.weekday().num_days_from_sunday() as u16,
            day: value.day() as u16,
            hour: value.hour() as u16,
            minute: value.minute() as u16,
            second: value.second() as u16,
            millisecond: (value.nanosecond() / 1_000_000).min(999) as u16,
        }
    }
}

impl FixedLayout for SystemTime {
    const SIZE: usize = 16;

    fn read_from(buf: &mut ByteBuffer) -> Result<Self> {
        Ok(Self {
            year: buf.read_u16()?,
            month: buf.read_u16()?,
            day_of_week: buf.read_u16()?,
            day: buf.read_u16()?,
            hour: buf.read_u16()?,
            minute: buf.read_u16()?,
            second: buf.read_u16()?,
            millisecond: buf.read_u16()?,
        })
    }

    fn write_to(&self, buf: &mut ByteBuffer) -> Result<()> {
        for field in [
            self.year,
            self.month,
            self.day_of_week,
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.millisecond,
        ] {
            buf.write_u16(field)?;
        }
        Ok(())
    }
}

/// Build stamp embedded by the game: six i32 fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Date {
    pub second: i32,
    pub minute: i32,
    pub hour: i32,
    pub day: i32,
    pub month: i32,
    pub year: i32,
}

impl FixedLayout for Date {
    const SIZE: usize = 24;

    fn read_from(buf: &mut ByteBuffer) -> Result<Self> {
        Ok(Self {
            second: buf.read_i32()?,
            minute: buf.read_i32()?,
            hour: buf.read_i32()?,
            day: buf.read_i32()?,
            month: buf.read_i32()?,
            year: buf.read_i32()?,
        })
    }

    fn write_to(&self, buf: &mut ByteBuffer) -> Result<()> {
        for field in [
            self.second,
            self.minute,
            self.hour,
            self.day,
            self.month,
            self.year,
        ] {
            buf.write_i32(field)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_size<T: FixedLayout>(value: &T) {
        let mut buf = ByteBuffer::growable();
        value.write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), T::SIZE);
    }

    #[test]
    fn test_declared_sizes_match_written() {
        assert_size(&Vector3::new(1.0, 2.0, 3.0));
        assert_size(&SystemTime::default());
        assert_size(&Date::default());
        assert_size(&0u16);
    }

    #[test]
    fn test_system_time_to_naive() {
        let stamp = SystemTime {
            year: 2002,
            month: 5,
            day_of_week: 2,
            day: 21,
            hour: 13,
            minute: 45,
            second: 30,
            millisecond: 250,
        };
        let naive = stamp.to_naive().unwrap();
        assert_eq!(naive.to_string(), "2002-05-21 13:45:30.250");
        assert_eq!(SystemTime::from_naive(naive), stamp);
    }

    #[test]
    fn test_zeroed_system_time_is_none() {
        assert!(SystemTime::default().to_naive().is_none());
    }

    #[test]
    fn test_vector_layout_order() {
        let mut buf = ByteBuffer::growable();
        buf.write_struct(&Vector3::new(1.0, 0.0, 0.0)).unwrap();
        assert_eq!(&buf.as_slice()[..4], &1.0f32.to_le_bytes());
        buf.seek_to(0).unwrap();
        assert_eq!(buf.read_struct::<Vector3>().unwrap(), Vector3::new(1.0, 0.0, 0.0));
    }
}

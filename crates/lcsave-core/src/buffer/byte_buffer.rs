use crate::buffer::{FixedLayout, StringEncoding};
use crate::error::{Error, Result};

/// Byte region with a read/write cursor.
///
/// Invariant: `position <= len()`. Writes at the end extend the region (up to
/// `capacity` for fixed buffers); writes before the end overwrite in place,
/// which is how length fields are backpatched.
#[derive(Debug, Clone, Default)]
pub struct ByteBuffer {
    data: Vec<u8>,
    position: usize,
    capacity: Option<usize>,
}

impl ByteBuffer {
    /// Fixed-capacity buffer, used to stage one outer block
    pub fn fixed(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            position: 0,
            capacity: Some(capacity),
        }
    }

    /// Unbounded buffer, used for the whole file
    pub fn growable() -> Self {
        Self::default()
    }

    /// Wrap existing bytes for reading (the region may still be written to)
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            data: bytes.into(),
            position: 0,
            capacity: None,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Hard limit of a fixed buffer, `None` when growable
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn remaining_len(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    /// Logically truncate to zero, keeping the allocation
    pub fn reset(&mut self) {
        self.data.clear();
        self.position = 0;
    }

    pub fn mark(&self) -> usize {
        self.position
    }

    pub fn seek_to(&mut self, position: usize) -> Result<()> {
        if position > self.data.len() {
            return Err(Error::BufferUnderflow {
                offset: self.position,
                requested: position - self.position,
                available: self.remaining_len(),
            });
        }
        self.position = position;
        Ok(())
    }

    /// Advance without reading
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.take(count).map(|_| ())
    }

    /// Round the read position up to a multiple of `alignment`
    pub fn align(&mut self, alignment: usize) -> Result<()> {
        let padding = padding_for(self.position, alignment);
        self.skip(padding)
    }

    /// Round the write position up to a multiple of `alignment`, zero-filling
    pub fn write_align(&mut self, alignment: usize) -> Result<()> {
        let padding = padding_for(self.position, alignment);
        self.write_padding(padding)
    }

    /// Borrow the next `count` bytes and advance past them
    pub fn take(&mut self, count: usize) -> Result<&[u8]> {
        let available = self.remaining_len();
        if count > available {
            return Err(Error::BufferUnderflow {
                offset: self.position,
                requested: count,
                available,
            });
        }
        let start = self.position;
        self.position += count;
        Ok(&self.data[start..start + count])
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take_array::<1>()?[0])
    }

    /// A byte holding 0 or 1; any other value is `InvalidBoolean`
    pub fn read_bool8(&mut self) -> Result<bool> {
        let offset = self.position;
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            value => {
                self.position = offset;
                Err(Error::InvalidBoolean { offset, value })
            }
        }
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.take_array()?))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.take_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    pub fn read_u32_be(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.take_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.take_array()?))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.take_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.take_array()?))
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        Ok(self.take(count)?.to_vec())
    }

    /// Skip `count` bytes the game itself never reads back
    pub fn read_padding(&mut self, count: usize) -> Result<()> {
        self.skip(count)
    }

    /// Fixed-width string of `chars` characters (bytes = chars * char width)
    pub fn read_fixed_string(&mut self, chars: usize, encoding: StringEncoding) -> Result<String> {
        let raw = self.take(chars * encoding.char_width())?;
        Ok(encoding.decode(raw))
    }

    pub fn read_struct<T: FixedLayout>(&mut self) -> Result<T> {
        T::read_from(self)
    }

    pub fn read_array<T: FixedLayout>(&mut self, count: usize) -> Result<Vec<T>> {
        (0..count).map(|_| T::read_from(self)).collect()
    }

    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        let end = self.position + bytes.len();
        if let Some(capacity) = self.capacity
            && end > capacity
        {
            return Err(Error::BufferOverflow {
                offset: self.position,
                requested: bytes.len(),
                capacity,
            });
        }
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[self.position..end].copy_from_slice(bytes);
        self.position = end;
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.put(&[value])
    }

    pub fn write_bool8(&mut self, value: bool) -> Result<()> {
        self.write_u8(u8::from(value))
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.put(&value.to_le_bytes())
    }

    pub fn write_i16(&mut self, value: i16) -> Result<()> {
        self.put(&value.to_le_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.put(&value.to_le_bytes())
    }

    pub fn write_u32_be(&mut self, value: u32) -> Result<()> {
        self.put(&value.to_be_bytes())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.put(&value.to_le_bytes())
    }

    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        self.put(&value.to_le_bytes())
    }

    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.put(&value.to_le_bytes())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.put(bytes)
    }

    pub fn write_padding(&mut self, count: usize) -> Result<()> {
        const ZEROS: [u8; 64] = [0; 64];
        let mut left = count;
        while left > 0 {
            let chunk = left.min(ZEROS.len());
            self.put(&ZEROS[..chunk])?;
            left -= chunk;
        }
        Ok(())
    }

    /// NUL-padded fixed-width string; text that does not fit is an error
    pub fn write_fixed_string(
        &mut self,
        value: &str,
        chars: usize,
        encoding: StringEncoding,
    ) -> Result<()> {
        let encoded = encoding.encode(value, chars)?;
        self.put(&encoded)
    }

    pub fn write_struct<T: FixedLayout>(&mut self, value: &T) -> Result<()> {
        value.write_to(self)
    }

    pub fn write_array<T: FixedLayout>(&mut self, values: &[T]) -> Result<()> {
        values.iter().try_for_each(|v| v.write_to(self))
    }
}

fn padding_for(position: usize, alignment: usize) -> usize {
    if alignment <= 1 {
        return 0;
    }
    (alignment - position % alignment) % alignment
}

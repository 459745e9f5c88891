use serde::{Deserialize, Serialize};

use crate::buffer::ByteBuffer;
use crate::error::Result;
use crate::format::FormatProfile;
use crate::record::SaveRecord;

/// Opaque section kept byte-for-byte.
///
/// Reading consumes everything left in the buffer, so it must be handed a
/// buffer holding exactly one section payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSection {
    pub data: Vec<u8>,
}

impl RawSection {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl SaveRecord for RawSection {
    const NAME: &'static str = "RawSection";

    fn read(buf: &mut ByteBuffer, _: &FormatProfile) -> Result<Self> {
        let remaining = buf.remaining_len();
        Ok(Self {
            data: buf.read_bytes(remaining)?,
        })
    }

    fn write(&self, buf: &mut ByteBuffer, _: &FormatProfile) -> Result<()> {
        buf.write_bytes(&self.data)
    }

    fn size(&self, _: &FormatProfile) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::testing::assert_stable;

    #[test]
    fn test_empty_and_nonempty() {
        assert!(assert_stable(&RawSection::default(), &FormatProfile::PC).is_empty());
        let raw = RawSection::new(vec![0xAB; 13]);
        assert_eq!(assert_stable(&raw, &FormatProfile::PS2).len(), 13);
        assert_eq!(raw.len(), 13);
    }

    #[test]
    fn test_reads_to_end() {
        let mut buf = ByteBuffer::from_bytes(vec![9, 8, 7, 6]);
        buf.skip(1).unwrap();
        let raw: RawSection = buf.read_record(&FormatProfile::PC).unwrap();
        assert_eq!(raw.data, vec![8, 7, 6]);
        assert_eq!(buf.remaining_len(), 0);
    }
}

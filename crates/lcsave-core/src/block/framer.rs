//! Length-prefixed block framing.
//!
//! ```text
//! untagged: [len: u32][payload; len][pad to 4]
//! tagged:   [len + 8: u32][tag: 4 bytes][len: u32][payload; len][pad to 4]
//! ```
//!
//! Tags are ASCII, NUL-padded to four bytes (`"SCR"` is stored as
//! `SCR\0`). Alignment padding is zero-filled on write and skipped on read;
//! it is never counted in a length prefix.

use tracing::debug;

use crate::buffer::ByteBuffer;
use crate::error::{Error, Result};
use crate::format::FormatProfile;
use crate::record::{SaveRecord, from_bytes};

pub const TAG_LEN: usize = 4;
pub const BLOCK_ALIGNMENT: usize = 4;

/// Bytes of framing in front of a tagged payload
pub const TAGGED_OVERHEAD: usize = 4 + TAG_LEN + 4;
/// Bytes of framing in front of an untagged payload
pub const UNTAGGED_OVERHEAD: usize = 4;

fn encode_tag(tag: &str) -> Result<[u8; TAG_LEN]> {
    let bytes = tag.as_bytes();
    if bytes.len() > TAG_LEN || !tag.is_ascii() {
        return Err(Error::EncodingError(format!("invalid block tag {tag:?}")));
    }
    let mut out = [0u8; TAG_LEN];
    out[..bytes.len()].copy_from_slice(bytes);
    Ok(out)
}

fn display_tag(raw: &[u8]) -> String {
    let end = memchr::memchr(0, raw).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

/// Total bytes a block with `payload_len` bytes occupies, framing included
pub fn framed_len(tag: Option<&str>, payload_len: usize) -> usize {
    let overhead = if tag.is_some() {
        TAGGED_OVERHEAD
    } else {
        UNTAGGED_OVERHEAD
    };
    (overhead + payload_len).next_multiple_of(BLOCK_ALIGNMENT)
}

fn to_len(value: usize, offset: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::InvalidBlockLength {
        offset,
        declared: u32::MAX,
    })
}

/// Write one block; returns the bytes written including framing
pub fn write_block(buf: &mut ByteBuffer, tag: Option<&str>, payload: &[u8]) -> Result<usize> {
    let start = buf.position();
    let len = to_len(payload.len(), start)?;
    match tag {
        Some(tag) => {
            let raw = encode_tag(tag)?;
            buf.write_u32(len + 8)?;
            buf.write_bytes(&raw)?;
            buf.write_u32(len)?;
        }
        None => buf.write_u32(len)?,
    }
    buf.write_bytes(payload)?;
    buf.write_align(BLOCK_ALIGNMENT)?;
    Ok(buf.position() - start)
}

/// Read one block, verifying `tag` when given; returns the payload
pub fn read_block(buf: &mut ByteBuffer, tag: Option<&str>) -> Result<Vec<u8>> {
    read_block_at(buf, tag).map(|(_, payload)| payload)
}

/// Like [`read_block`], also returning the offset of the payload in `buf`
pub fn read_block_at(buf: &mut ByteBuffer, tag: Option<&str>) -> Result<(usize, Vec<u8>)> {
    let len = read_header(buf, tag)?;
    let start = buf.position();
    let payload = buf.read_bytes(len)?;
    buf.align(BLOCK_ALIGNMENT)?;
    Ok((start, payload))
}

/// Consume the framing of one block and return its payload length,
/// leaving the cursor on the first payload byte
fn read_header(buf: &mut ByteBuffer, tag: Option<&str>) -> Result<usize> {
    let offset = buf.position();
    let declared = buf.read_u32()?;
    let len = match tag {
        Some(expected) => {
            let raw = encode_tag(expected)?;
            let tag_offset = buf.position();
            let actual = buf.take(TAG_LEN)?;
            if actual != raw {
                return Err(Error::BlockTagMismatch {
                    expected: expected.to_string(),
                    actual: display_tag(actual),
                    offset: tag_offset,
                });
            }
            let inner = buf.read_u32()?;
            if declared.checked_sub(8) != Some(inner) {
                return Err(Error::InvalidBlockLength { offset, declared });
            }
            inner as usize
        }
        None => declared as usize,
    };
    if len > buf.remaining_len() {
        return Err(Error::InvalidBlockLength { offset, declared });
    }
    Ok(len)
}

/// Zero-filled untagged block with a `payload_len`-byte payload
pub fn write_padding_block(buf: &mut ByteBuffer, payload_len: usize) -> Result<usize> {
    let start = buf.position();
    buf.write_u32(to_len(payload_len, start)?)?;
    buf.write_padding(payload_len)?;
    buf.write_align(BLOCK_ALIGNMENT)?;
    Ok(buf.position() - start)
}

/// Placeholder framing written by [`begin_block`], patched by [`end_block`]
#[derive(Debug, Clone, Copy)]
pub struct BlockMark {
    start: usize,
    tagged: bool,
}

/// Write the framing for a block whose payload length is not known yet
pub fn begin_block(buf: &mut ByteBuffer, tag: Option<&str>) -> Result<BlockMark> {
    let start = buf.mark();
    buf.write_u32(0)?;
    if let Some(tag) = tag {
        buf.write_bytes(&encode_tag(tag)?)?;
        buf.write_u32(0)?;
    }
    Ok(BlockMark {
        start,
        tagged: tag.is_some(),
    })
}

/// Backpatch the length fields of a block opened by [`begin_block`] and
/// align; returns the bytes written including framing
pub fn end_block(buf: &mut ByteBuffer, mark: BlockMark) -> Result<usize> {
    let header = if mark.tagged {
        TAGGED_OVERHEAD
    } else {
        UNTAGGED_OVERHEAD
    };
    let end = buf.position();
    let len = to_len(end - mark.start - header, mark.start)?;
    buf.seek_to(mark.start)?;
    if mark.tagged {
        buf.write_u32(len + 8)?;
        buf.skip(TAG_LEN)?;
    }
    buf.write_u32(len)?;
    buf.seek_to(end)?;
    buf.write_align(BLOCK_ALIGNMENT)?;
    Ok(buf.position() - mark.start)
}

/// Serialize `record` as the payload of one block
pub fn write_record_block<T: SaveRecord>(
    buf: &mut ByteBuffer,
    tag: Option<&str>,
    record: &T,
    profile: &FormatProfile,
) -> Result<usize> {
    let mark = begin_block(buf, tag)?;
    buf.write_record(record, profile)?;
    end_block(buf, mark)
}

/// Parse a block whose payload must be exactly one `T`
pub fn read_record_block<T: SaveRecord>(
    buf: &mut ByteBuffer,
    tag: Option<&str>,
    profile: &FormatProfile,
) -> Result<T> {
    let payload = read_block(buf, tag)?;
    from_bytes(&payload, profile)
}

/// File-level framer: frames outer blocks and keeps the running checksum
/// over every byte it emits or consumes.
#[derive(Debug, Default)]
pub struct BlockFramer {
    checksum: u32,
    blocks: usize,
}

impl BlockFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrapping byte sum of everything framed so far
    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    /// Outer blocks framed so far, padding included
    pub fn blocks(&self) -> usize {
        self.blocks
    }

    fn accumulate(&mut self, bytes: &[u8]) {
        self.checksum = bytes
            .iter()
            .fold(self.checksum, |sum, &b| sum.wrapping_add(u32::from(b)));
    }

    fn track(&mut self, buf: &ByteBuffer, start: usize) {
        let end = buf.position();
        self.accumulate(&buf.as_slice()[start..end]);
        self.blocks += 1;
        debug!(
            block = self.blocks - 1,
            offset = start,
            len = end - start,
            "Framed outer block"
        );
    }

    pub fn write_block(
        &mut self,
        file: &mut ByteBuffer,
        tag: Option<&str>,
        payload: &[u8],
    ) -> Result<usize> {
        let start = file.position();
        let written = write_block(file, tag, payload)?;
        self.track(file, start);
        Ok(written)
    }

    pub fn write_padding_block(&mut self, file: &mut ByteBuffer, payload_len: usize) -> Result<usize> {
        let start = file.position();
        let written = write_padding_block(file, payload_len)?;
        self.track(file, start);
        Ok(written)
    }

    pub fn read_block(&mut self, file: &mut ByteBuffer, tag: Option<&str>) -> Result<Vec<u8>> {
        let start = file.position();
        let payload = read_block(file, tag)?;
        self.track(file, start);
        Ok(payload)
    }

    /// Read an untagged outer block straight into the working buffer and
    /// return the file offset its payload starts at.
    ///
    /// `block` is the outer block index used in the capacity error.
    pub fn read_block_into(
        &mut self,
        file: &mut ByteBuffer,
        work: &mut ByteBuffer,
        block: usize,
    ) -> Result<usize> {
        let start = file.position();
        let len = read_header(file, None)?;
        let payload_start = file.position();
        if let Some(capacity) = work.capacity()
            && len > capacity
        {
            return Err(Error::CapacityExceeded {
                block,
                size: len,
                capacity,
            });
        }
        work.reset();
        work.write_bytes(file.take(len)?)?;
        work.seek_to(0)?;
        file.align(BLOCK_ALIGNMENT)?;
        self.track(file, start);
        Ok(payload_start)
    }
}

/// Wrapping byte sum of `bytes`
pub fn checksum(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .fold(0u32, |sum, &b| sum.wrapping_add(u32::from(b)))
}

//! Load and save flows.
//!
//! ```text
//! load: detect -> outer blocks -> padding blocks -> checksum -> [signature]
//! save: outer blocks -> padding blocks -> checksum -> [signature]
//! ```
//!
//! Each outer block is staged in one fixed-capacity working buffer that is
//! reset, never reallocated, between blocks. Any error aborts the whole
//! operation.

use tracing::{debug, info, warn};

use crate::block::{BlockFramer, BlockLayout, UNTAGGED_OVERHEAD};
use crate::buffer::ByteBuffer;
use crate::error::{Error, Result};
use crate::format::{FormatProfile, detect_format};
use crate::save::file::SaveFile;
use crate::save::options::{LoadOptions, SaveOptions};
use crate::save::signature;

const CHECKSUM_LEN: usize = 4;

/// Detect the format of `bytes` and parse them
pub fn load(bytes: &[u8]) -> Result<SaveFile> {
    load_with(bytes, &LoadOptions::default())
}

pub fn load_with(bytes: &[u8], options: &LoadOptions) -> Result<SaveFile> {
    let profile = match options.profile {
        Some(profile) => profile,
        None => detect_format(bytes)?,
    };

    let expected = profile.target_size + profile.signature_len();
    if bytes.len() != expected {
        return Err(Error::SizeMismatch {
            expected,
            actual: bytes.len(),
        });
    }

    let content_end = profile.target_size - CHECKSUM_LEN;
    let mut file = ByteBuffer::from_bytes(&bytes[..content_end]);
    let mut work = ByteBuffer::fixed(profile.working_buffer_capacity);
    let mut framer = BlockFramer::new();
    let mut save = SaveFile::new(profile);

    for (index, sections) in BlockLayout::for_profile(&profile).blocks() {
        let base = framer.read_block_into(&mut file, &mut work, index)?;
        debug!(block = index, offset = base, len = work.len(), "Reading outer block");
        for &section in sections {
            save.read_section(section, &mut work, &profile)
                .map_err(|e| e.shifted(base))?;
        }
        if work.remaining_len() != 0 {
            return Err(Error::SizeInvariantViolation {
                record: "OuterBlock",
                expected: work.len(),
                actual: work.position(),
            });
        }
    }

    let mut padding = 0usize;
    while file.remaining_len() > 0 {
        framer.read_block(&mut file, None)?;
        padding += 1;
    }
    debug!(padding_blocks = padding, "Skipped padding");

    let stored = u32::from_le_bytes([
        bytes[content_end],
        bytes[content_end + 1],
        bytes[content_end + 2],
        bytes[content_end + 3],
    ]);
    let computed = framer.checksum();
    if stored != computed {
        if options.verify_checksum {
            return Err(Error::ChecksumMismatch { stored, computed });
        }
        warn!(stored, computed, "Checksum mismatch ignored");
    }

    if profile.signature_len() > 0 && options.verify_signature {
        let (signed, signature) = bytes.split_at(profile.target_size);
        if !signature::verify(&options.signature_key, signed, signature)? {
            warn!("Xbox signature does not match the signing key");
        }
    }

    info!(profile = profile.id, "Loaded save");
    Ok(save)
}

/// Serialize `save` in the layout of `profile`
pub fn save(save: &SaveFile, profile: &FormatProfile) -> Result<Vec<u8>> {
    save_with(save, profile, &SaveOptions::default())
}

pub fn save_with(save: &SaveFile, profile: &FormatProfile, options: &SaveOptions) -> Result<Vec<u8>> {
    let capacity = profile.working_buffer_capacity;
    let mut file = ByteBuffer::growable();
    let mut work = ByteBuffer::fixed(capacity);
    let mut framer = BlockFramer::new();

    for (index, sections) in BlockLayout::for_profile(profile).blocks() {
        let size: usize = sections
            .iter()
            .map(|&section| save.section_len(section, profile))
            .sum();
        if size > capacity {
            return Err(Error::CapacityExceeded {
                block: index,
                size,
                capacity,
            });
        }
        debug!(block = index, size, "Writing outer block");

        work.reset();
        for &section in sections {
            save.write_section(section, &mut work, profile)?;
        }
        framer.write_block(&mut file, None, work.as_slice())?;
    }

    let content_end = profile.target_size - CHECKSUM_LEN;
    if file.len() > content_end {
        return Err(Error::SizeMismatch {
            expected: profile.target_size,
            actual: file.len() + CHECKSUM_LEN,
        });
    }
    while file.len() < content_end {
        let remaining = content_end - file.len();
        let payload = remaining.saturating_sub(UNTAGGED_OVERHEAD).min(capacity);
        framer.write_padding_block(&mut file, payload)?;
    }
    if file.len() != content_end {
        return Err(Error::SizeMismatch {
            expected: profile.target_size,
            actual: file.len() + CHECKSUM_LEN,
        });
    }

    file.write_u32(framer.checksum())?;
    if profile.signature_len() > 0 {
        let signature = signature::sign(&options.signature_key, file.as_slice())?;
        file.write_bytes(&signature)?;
    }

    info!(
        profile = profile.id,
        blocks = framer.blocks(),
        "Serialized save"
    );
    Ok(file.into_inner())
}

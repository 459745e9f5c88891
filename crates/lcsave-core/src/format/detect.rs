//! Platform detection from raw file bytes.
//!
//! Decision tree:
//!
//! 1. The "size of game" constant sits right after the first outer block's
//!    length prefix on PS2 (little-endian, or big-endian on the Japanese
//!    build), and after the 64-byte save header everywhere else.
//! 2. The `SCR` tag that follows the simple variables pins down their size,
//!    which differs per platform.
//! 3. PC and Xbox share a layout and are told apart by the trailing
//!    signature. Android and iOS share one too; there the width of a garage
//!    record (derived from the garage block length) decides.

use tracing::debug;

use crate::block::TAG_LEN;
use crate::error::{Error, Result};
use crate::format::{FormatProfile, SIZE_OF_GAME_IN_BYTES};
use crate::record::{Garage, GarageData, SimpleVariables, StoredCar};

const SCRIPT_TAG: &[u8; TAG_LEN] = b"SCR\0";

/// Offset of the simple variables: just past the first outer length prefix
const SIMPLE_VARS_OFFSET: usize = 4;

fn u32_le_at(bytes: &[u8], offset: usize) -> Option<u32> {
    let raw = bytes.get(offset..offset + 4)?;
    raw.try_into().ok().map(u32::from_le_bytes)
}

fn u32_be_at(bytes: &[u8], offset: usize) -> Option<u32> {
    let raw = bytes.get(offset..offset + 4)?;
    raw.try_into().ok().map(u32::from_be_bytes)
}

/// Whether the script block tag follows simple variables laid out as `profile`
fn script_tag_follows(bytes: &[u8], profile: &FormatProfile) -> bool {
    let at = SIMPLE_VARS_OFFSET + SimpleVariables::size_of(profile) + 4;
    bytes.get(at..at + TAG_LEN) == Some(SCRIPT_TAG.as_slice())
}

fn has_size_magic(bytes: &[u8], profile: &FormatProfile) -> bool {
    let at = SIMPLE_VARS_OFFSET + SimpleVariables::size_magic_offset(profile);
    let magic = SIZE_OF_GAME_IN_BYTES as u32;
    if profile.is_japan() {
        u32_be_at(bytes, at) == Some(magic)
    } else {
        u32_le_at(bytes, at) == Some(magic)
    }
}

fn unrecognized(reason: impl Into<String>) -> Error {
    Error::FormatNotRecognized(reason.into())
}

/// Offset of the outer block following the one starting at `offset`
fn next_outer_block(bytes: &[u8], offset: usize) -> Option<usize> {
    let len = u32_le_at(bytes, offset)? as usize;
    let next = (offset + 4).checked_add(len)?.next_multiple_of(4);
    (next <= bytes.len()).then_some(next)
}

/// Width of one garage record in a mobile file.
///
/// Outer block 2 holds only the garage section; its inner block length
/// covers the header, the stored cars and `max_garages` garages.
fn mobile_garage_width(bytes: &[u8]) -> Option<usize> {
    let profile = FormatProfile::ANDROID;
    let block1 = next_outer_block(bytes, 0)?;
    let block2 = next_outer_block(bytes, block1)?;
    let garage_len = u32_le_at(bytes, block2 + 4)? as usize;
    let fixed = GarageData::HEADER_SIZE + profile.max_stored_cars * StoredCar::SIZE;
    let table = garage_len.checked_sub(fixed)?;
    (table % profile.max_garages == 0).then(|| table / profile.max_garages)
}

fn detect_mobile(bytes: &[u8]) -> Result<FormatProfile> {
    let width = mobile_garage_width(bytes)
        .ok_or_else(|| unrecognized("mobile garage block is malformed"))?;
    debug!(width, "Mobile garage record width");
    [FormatProfile::ANDROID, FormatProfile::IOS]
        .into_iter()
        .find(|profile| Garage::size_of(profile) == width)
        .ok_or_else(|| unrecognized(format!("unexpected mobile garage width {width}")))
}

fn check_length(bytes: &[u8], profile: FormatProfile) -> Result<FormatProfile> {
    let expected = profile.target_size + profile.signature_len();
    if bytes.len() != expected {
        return Err(unrecognized(format!(
            "{} layout but {} bytes (expected {})",
            profile,
            bytes.len(),
            expected
        )));
    }
    Ok(profile)
}

/// Identify the platform that produced `bytes`
pub fn detect_format(bytes: &[u8]) -> Result<FormatProfile> {
    let smallest = FormatProfile::ALL
        .iter()
        .map(|p| SIMPLE_VARS_OFFSET + SimpleVariables::size_of(p) + 4 + TAG_LEN)
        .min()
        .unwrap_or_default();
    if bytes.len() < smallest {
        return Err(unrecognized(format!("only {} bytes", bytes.len())));
    }

    let profile = if has_size_magic(bytes, &FormatProfile::PS2) {
        [FormatProfile::PS2, FormatProfile::PS2_AU]
            .into_iter()
            .find(|p| script_tag_follows(bytes, p))
            .ok_or_else(|| unrecognized("PS2 size constant without a script block"))?
    } else if has_size_magic(bytes, &FormatProfile::PS2_JP) {
        if !script_tag_follows(bytes, &FormatProfile::PS2_JP) {
            return Err(unrecognized("Japanese size constant without a script block"));
        }
        FormatProfile::PS2_JP
    } else if has_size_magic(bytes, &FormatProfile::PC) {
        if script_tag_follows(bytes, &FormatProfile::PC) {
            if bytes.len() == FormatProfile::XBOX.target_size + FormatProfile::XBOX.signature_len()
            {
                FormatProfile::XBOX
            } else {
                FormatProfile::PC
            }
        } else if script_tag_follows(bytes, &FormatProfile::DEFINITIVE) {
            FormatProfile::DEFINITIVE
        } else if script_tag_follows(bytes, &FormatProfile::ANDROID) {
            detect_mobile(bytes)?
        } else {
            return Err(unrecognized("size constant found but no script block"));
        }
    } else {
        return Err(unrecognized("no size constant at any known offset"));
    };

    let profile = check_length(bytes, profile)?;
    debug!(profile = profile.id, "Detected save format");
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Just enough of a file to satisfy the header checks
    fn header(profile: &FormatProfile) -> Vec<u8> {
        let mut bytes = vec![0u8; profile.target_size + profile.signature_len()];
        let magic_at = SIMPLE_VARS_OFFSET + SimpleVariables::size_magic_offset(profile);
        let magic = SIZE_OF_GAME_IN_BYTES as u32;
        let raw = if profile.is_japan() {
            magic.to_be_bytes()
        } else {
            magic.to_le_bytes()
        };
        bytes[magic_at..magic_at + 4].copy_from_slice(&raw);
        let tag_at = SIMPLE_VARS_OFFSET + SimpleVariables::size_of(profile) + 4;
        bytes[tag_at..tag_at + 4].copy_from_slice(SCRIPT_TAG);
        bytes
    }

    #[test]
    fn test_headers_of_unambiguous_profiles() {
        for profile in [
            FormatProfile::PC,
            FormatProfile::XBOX,
            FormatProfile::PS2,
            FormatProfile::PS2_AU,
            FormatProfile::PS2_JP,
            FormatProfile::DEFINITIVE,
        ] {
            assert_eq!(detect_format(&header(&profile)).unwrap(), profile);
        }
    }

    #[test]
    fn test_too_short() {
        assert!(detect_format(&[]).unwrap_err().is_unrecognized());
        assert!(detect_format(&[0; 64]).unwrap_err().is_unrecognized());
    }

    #[test]
    fn test_foreign_bytes() {
        let bytes: Vec<u8> = (0..SIZE_OF_GAME_IN_BYTES).map(|i| (i * 7) as u8).collect();
        assert!(detect_format(&bytes).unwrap_err().is_unrecognized());
    }

    #[test]
    fn test_truncated_file() {
        let mut bytes = header(&FormatProfile::PS2);
        bytes.truncate(0x1000);
        assert!(detect_format(&bytes).unwrap_err().is_unrecognized());
    }

    #[test]
    fn test_magic_without_script_tag() {
        let mut bytes = header(&FormatProfile::PC);
        let tag_at = SIMPLE_VARS_OFFSET + SimpleVariables::size_of(&FormatProfile::PC) + 4;
        bytes[tag_at] = b'X';
        assert!(detect_format(&bytes).unwrap_err().is_unrecognized());
    }

    #[test]
    fn test_mobile_width_needs_walkable_blocks() {
        // Mobile header with zeroed outer block lengths
        let bytes = header(&FormatProfile::ANDROID);
        assert!(detect_format(&bytes).unwrap_err().is_unrecognized());
    }
}

//! Hexdump command implementation.
//!
//! Displays raw save bytes in traditional hexdump format, either from the
//! start of the file or from inside one outer block's payload.
//!
//! # Output Format
//!
//! ```text
//! 00000004: 00 00 00 00 00 00 00 00  00 00 00 00 00 00 00 00  |................|
//! ```

use anyhow::{Context, Result, bail};
use lcsave_core::{ByteBuffer, block};
use std::path::Path;

use super::hex_utils::{format_hex_line, format_hex_offset};

/// Absolute file range of outer block `index`'s payload
fn outer_block_range(bytes: &[u8], index: usize) -> Result<(usize, usize)> {
    let mut buf = ByteBuffer::from_bytes(bytes);
    for _ in 0..index {
        block::read_block(&mut buf, None)
            .with_context(|| format!("Walking to outer block {}", index))?;
    }
    let start = buf.position() + block::UNTAGGED_OVERHEAD;
    let payload = block::read_block(&mut buf, None)
        .with_context(|| format!("Reading outer block {}", index))?;
    Ok((start, payload.len()))
}

/// Absolute `start..end` of the bytes to show, clamped to `limit`
fn dump_window(base: usize, limit: usize, offset: usize, size: usize) -> (usize, usize) {
    (base + offset, base + limit.min(offset.saturating_add(size)))
}

/// Run the hexdump command
pub fn run(file: &Path, offset: usize, size: usize, block: Option<usize>, ascii: bool) -> Result<()> {
    let bytes = std::fs::read(file).with_context(|| format!("Reading {}", file.display()))?;

    let (base, limit) = match block {
        Some(index) => outer_block_range(&bytes, index)?,
        None => (0, bytes.len()),
    };
    if offset >= limit {
        bail!(
            "Offset {} is past the end ({} bytes)",
            format_hex_offset(offset),
            limit
        );
    }
    let (start, end) = dump_window(base, limit, offset, size);

    match block {
        Some(index) => println!(
            "Outer block {} payload at {} ({} bytes), showing {}..{}:",
            index,
            format_hex_offset(base),
            limit,
            format_hex_offset(offset),
            format_hex_offset(end - base)
        ),
        None => println!(
            "Hexdump of {} at {} ({} bytes):",
            file.display(),
            format_hex_offset(start),
            end - start
        ),
    }
    println!();

    for (i, chunk) in bytes[start..end].chunks(16).enumerate() {
        println!("{}", format_hex_line(start + i * 16, chunk, ascii));
    }

    Ok(())
}

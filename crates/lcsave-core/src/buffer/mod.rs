//! Position-tracked byte cursor.
//!
//! [`ByteBuffer`] is the only way the rest of the crate touches raw bytes:
//!
//! - **Typed access**: little-endian integers and floats, fixed-width text,
//!   [`FixedLayout`] value structs and arrays of them
//! - **Navigation**: `skip`, `align`, `mark`/`seek_to` for backpatching
//! - **Bounds**: every access is checked; running off the end is a
//!   `BufferUnderflow` (read) or `BufferOverflow` (write), never a truncation
//!
//! Two flavours exist. A *fixed* buffer has a hard capacity and stages one
//! outer block at a time; a *growable* buffer holds a whole file.

mod byte_buffer;
mod layout;
mod text;

pub use byte_buffer::ByteBuffer;
pub use layout::{Date, FixedLayout, SystemTime, Vector3};
pub use text::StringEncoding;

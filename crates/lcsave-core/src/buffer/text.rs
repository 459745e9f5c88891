//! Fixed-width text fields.
//!
//! Single-byte text is Windows-1252; wide text is UTF-16LE. Both are stored
//! NUL-padded to the field width, with no terminator when the text fills the
//! field exactly.
//!
//! Text fields are not byte-exact across a rewrite. Decoding stops at the
//! first NUL, so any stale bytes the game left after it are written back as
//! zeros, and unpaired UTF-16 surrogates decode to U+FFFD. Records that need
//! such bytes verbatim should keep them as raw arrays instead.

use encoding_rs::{UTF_16LE, WINDOWS_1252};
use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

use crate::error::{Error, Result};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, IntoStaticStr,
)]
pub enum StringEncoding {
    #[strum(serialize = "ascii")]
    Ascii,
    #[strum(serialize = "utf-16")]
    Utf16,
}

impl StringEncoding {
    /// Bytes per stored character
    pub fn char_width(self) -> usize {
        match self {
            Self::Ascii => 1,
            Self::Utf16 => 2,
        }
    }

    pub(crate) fn decode(self, raw: &[u8]) -> String {
        match self {
            Self::Ascii => {
                let len = memchr::memchr(0, raw).unwrap_or(raw.len());
                let (decoded, _) = WINDOWS_1252.decode_without_bom_handling(&raw[..len]);
                decoded.into_owned()
            }
            Self::Utf16 => {
                let len = raw
                    .chunks_exact(2)
                    .position(|unit| unit == [0, 0])
                    .map_or(raw.len() - raw.len() % 2, |units| units * 2);
                let (decoded, _) = UTF_16LE.decode_without_bom_handling(&raw[..len]);
                decoded.into_owned()
            }
        }
    }

    /// Encode to exactly `chars * char_width()` bytes
    pub(crate) fn encode(self, value: &str, chars: usize) -> Result<Vec<u8>> {
        let mut out = match self {
            Self::Ascii => {
                let (encoded, _, had_errors) = WINDOWS_1252.encode(value);
                if had_errors {
                    return Err(Error::EncodingError(format!(
                        "{:?} is not representable in single-byte text",
                        value
                    )));
                }
                encoded.into_owned()
            }
            // encoding_rs only decodes UTF-16, so the std encoder is used here
            Self::Utf16 => value.encode_utf16().flat_map(u16::to_le_bytes).collect(),
        };

        let width = chars * self.char_width();
        if out.len() > width {
            return Err(Error::EncodingError(format!(
                "{:?} needs {} bytes but the field holds {}",
                value,
                out.len(),
                width
            )));
        }
        out.resize(width, 0);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_nul_padded() {
        let bytes = StringEncoding::Ascii.encode("PLAYER", 8).unwrap();
        assert_eq!(bytes, b"PLAYER\0\0");
        assert_eq!(StringEncoding::Ascii.decode(&bytes), "PLAYER");
    }

    #[test]
    fn test_ascii_full_width_has_no_terminator() {
        let bytes = StringEncoding::Ascii.encode("ABCD", 4).unwrap();
        assert_eq!(StringEncoding::Ascii.decode(&bytes), "ABCD");
    }

    #[test]
    fn test_utf16_roundtrip() {
        let bytes = StringEncoding::Utf16.encode("Liberty", 24).unwrap();
        assert_eq!(bytes.len(), 48);
        assert_eq!(&bytes[..4], &[b'L', 0, b'i', 0]);
        assert_eq!(StringEncoding::Utf16.decode(&bytes), "Liberty");
    }

    #[test]
    fn test_too_long_is_error() {
        assert!(StringEncoding::Ascii.encode("TOOLONG", 4).is_err());
        assert!(StringEncoding::Utf16.encode("ABC", 2).is_err());
    }

    #[test]
    fn test_empty_string() {
        let bytes = StringEncoding::Utf16.encode("", 3).unwrap();
        assert_eq!(bytes, vec![0; 6]);
        assert_eq!(StringEncoding::Utf16.decode(&bytes), "");
    }

    #[test]
    fn test_unmappable_ascii_is_error() {
        assert!(StringEncoding::Ascii.encode("日本", 8).is_err());
    }

    #[test]
    fn test_bytes_after_terminator_are_not_kept() {
        let stale = b"CAR\0OLD\0";
        let text = StringEncoding::Ascii.decode(stale);
        assert_eq!(text, "CAR");
        assert_eq!(StringEncoding::Ascii.encode(&text, 8).unwrap(), b"CAR\0\0\0\0\0");

        // Lone high surrogate
        let wide = [0x00, 0xD8, b'A', 0x00];
        assert_eq!(StringEncoding::Utf16.decode(&wide), "\u{FFFD}A");
    }
}

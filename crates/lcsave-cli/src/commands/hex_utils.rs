//! Hex offset parsing and formatting utilities.

use anyhow::Result;

/// Parse a hex offset string (with or without 0x prefix).
pub fn parse_hex_offset(s: &str) -> Result<usize> {
    let s = s.trim_start_matches("0x").trim_start_matches("0X");
    usize::from_str_radix(s, 16).map_err(|e| anyhow::anyhow!("Invalid hex offset: {}", e))
}

/// Format an offset as a hex string with 0x prefix.
pub fn format_hex_offset(offset: usize) -> String {
    format!("0x{:X}", offset)
}

/// Render one 16-byte hexdump line starting at `offset`
pub fn format_hex_line(offset: usize, chunk: &[u8], ascii: bool) -> String {
    let mut line = format!("{:08X}: ", offset);
    for j in 0..16 {
        if j == 8 {
            line.push(' ');
        }
        match chunk.get(j) {
            Some(byte) => line.push_str(&format!("{:02X} ", byte)),
            None => line.push_str("   "),
        }
    }
    if ascii {
        line.push_str(" |");
        for &byte in chunk {
            line.push(if (0x20..0x7F).contains(&byte) {
                byte as char
            } else {
                '.'
            });
        }
        line.push_str(&" ".repeat(16 - chunk.len()));
        line.push('|');
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_offset_with_prefix() {
        assert_eq!(parse_hex_offset("0x1000").unwrap(), 0x1000);
        assert_eq!(parse_hex_offset("0X1000").unwrap(), 0x1000);
    }

    #[test]
    fn test_parse_hex_offset_without_prefix() {
        assert_eq!(parse_hex_offset("31400").unwrap(), 0x31400);
        assert_eq!(parse_hex_offset("bc").unwrap(), 0xBC);
    }

    #[test]
    fn test_parse_hex_offset_invalid() {
        assert!(parse_hex_offset("GHIJK").is_err());
        assert!(parse_hex_offset("0xZZZ").is_err());
    }

    #[test]
    fn test_format_hex_offset() {
        assert_eq!(format_hex_offset(0xBC), "0xBC");
        assert_eq!(format_hex_offset(0), "0x0");
    }

    #[test]
    fn test_format_hex_line() {
        let line = format_hex_line(0x10, b"SCR\0", true);
        assert!(line.starts_with("00000010: 53 43 52 00 "));
        assert!(line.ends_with("|SCR.            |"));
        let bare = format_hex_line(0, &[0xFF; 16], false);
        assert_eq!(bare.matches("FF").count(), 16);
        assert!(!bare.contains('|'));
    }
}

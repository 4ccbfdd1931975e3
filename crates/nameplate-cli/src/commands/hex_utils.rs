//! Hex address parsing.

use anyhow::Result;

/// Parse a hex address string (with or without 0x prefix).
pub fn parse_hex_address(s: &str) -> Result<u64> {
    let s = s.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u64::from_str_radix(digits, 16).map_err(|e| anyhow::anyhow!("Invalid hex address {:?}: {}", s, e))
}

//! Decoding of a raw process environment block.

use encoding_rs::UTF_16LE;

/// Parsed environment of a remote process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentBlock {
    vars: Vec<(String, String)>,
}

impl EnvironmentBlock {
    /// Decode a UTF-16LE block of `KEY=VALUE\0` entries terminated by an
    /// empty entry.
    ///
    /// Entries starting with `=` (per-drive working directories) and entries
    /// without a separator are skipped.
    pub fn parse(raw: &[u8]) -> Self {
        let (decoded, _) = UTF_16LE.decode_without_bom_handling(raw);
        let mut vars = Vec::new();

        for entry in decoded.split('\0') {
            if entry.is_empty() {
                break;
            }
            if entry.starts_with('=') {
                continue;
            }
            if let Some((key, value)) = entry.split_once('=') {
                vars.push((key.to_string(), value.to_string()));
            }
        }

        Self { vars }
    }

    /// Case-insensitive lookup, as on Windows
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

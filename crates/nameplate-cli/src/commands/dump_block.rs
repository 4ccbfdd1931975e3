//! Hexdump of a lobby block.
//!
//! ```text
//! P1 @ 0x1D4C8A3F9A0  Rival
//!   +0x00: 00 00 00 00 01 00 10 01  52 69 76 61 6C 00 00 00  |........Rival...|
//! ```

use anyhow::Result;
use nameplate_core::memory::layout::record;
use nameplate_core::{ReadMemory, RecordBlock, read_block_names};
use owo_colors::OwoColorize;

use super::open_process;

pub fn run(process_name: &str, address: u64, pid: Option<u32>) -> Result<()> {
    let process = open_process(process_name, pid)?;
    let block = RecordBlock::new(address);
    let slots = read_block_names(&process, block);

    for slot in 0..record::COUNT {
        let record_address = block.record_address(slot);
        let name = match slots.slot(slot) {
            Some(name) => name.green().to_string(),
            None => "(empty)".dimmed().to_string(),
        };
        println!(
            "{} @ {:#x}  {}",
            format!("P{}", slot + 1).bold(),
            record_address,
            name
        );

        match process.read_bytes(record_address, record::STRIDE as usize) {
            Ok(bytes) => {
                for line in hexdump_lines(&bytes) {
                    println!("  {}", line);
                }
            }
            Err(e) => println!("  {}", e.red()),
        }
        println!();
    }

    Ok(())
}

/// Format bytes as 16-byte hexdump lines with an ASCII column
fn hexdump_lines(bytes: &[u8]) -> Vec<String> {
    bytes
        .chunks(16)
        .enumerate()
        .map(|(i, chunk)| {
            let mut line = format!("+{:#04x}: ", i * 16);
            for j in 0..16 {
                if j == 8 {
                    line.push(' ');
                }
                match chunk.get(j) {
                    Some(byte) => line.push_str(&format!("{:02X} ", byte)),
                    None => line.push_str("   "),
                }
            }

            line.push_str(" |");
            for byte in chunk {
                if (0x20..0x7F).contains(byte) {
                    line.push(*byte as char);
                } else {
                    line.push('.');
                }
            }
            line.push('|');
            line
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hexdump_line() {
        let mut bytes = vec![0u8, 0, 0, 0, 1, 0, 0x10, 1];
        bytes.extend_from_slice(b"Rival\0\0\0");

        let lines = hexdump_lines(&bytes);
        assert_eq!(
            lines,
            vec![
                "+0x00: 00 00 00 00 01 00 10 01  52 69 76 61 6C 00 00 00  |........Rival...|"
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_hexdump_partial_line_is_padded() {
        let lines = hexdump_lines(&[0x41; 20]);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("+0x10: 41 41 41 41 "));
        assert!(lines[1].ends_with("|AAAA|"));
        assert_eq!(lines[0].find('|'), lines[1].find('|'));
    }

    #[test]
    fn test_hexdump_full_record() {
        let lines = hexdump_lines(&[0u8; record::STRIDE as usize]);
        assert_eq!(lines.len(), 6);
        assert!(lines[5].starts_with("+0x50:"));
    }
}

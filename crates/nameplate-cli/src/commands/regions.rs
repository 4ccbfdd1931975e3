//! List the memory regions the scanner would search.

use anyhow::Result;
use nameplate_core::RegionWalker;
use nameplate_core::memory::layout::scan;
use owo_colors::OwoColorize;

use super::open_process;

pub fn run(process_name: &str, pid: Option<u32>) -> Result<()> {
    let process = open_process(process_name, pid)?;

    println!(
        "Eligible regions of {} (pid {}):",
        process.name, process.pid
    );
    println!();

    let mut count = 0usize;
    let mut total = 0u64;
    for region in RegionWalker::new(&process, scan::MAX_USER_ADDRESS).eligible() {
        let region = region?;
        println!(
            "{:#014x}-{:#014x} {:>10} KB  {} {}",
            region.base,
            region.end(),
            region.size / 1024,
            region.state,
            region.kind
        );
        count += 1;
        total += region.size;
    }

    println!();
    println!(
        "{} regions, {} total",
        count.bold(),
        format!("{:.1} MB", total as f64 / (1024.0 * 1024.0)).bold()
    );

    Ok(())
}

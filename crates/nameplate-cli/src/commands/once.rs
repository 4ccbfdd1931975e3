//! Single poll command.

use anyhow::{Result, bail};
use nameplate_core::stream::LobbySnapshot;
use nameplate_core::{PlayerNameScanner, ProcessFinder};

use crate::config::Config;

use super::print_players;

pub fn run(config: &Config, json: bool) -> Result<()> {
    let finder = ProcessFinder::new(&config.process_name);
    let scanner = PlayerNameScanner::with_config(config.scanner_config());

    let Some(players) = scanner.poll(&finder)? else {
        bail!("Player names not found");
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&LobbySnapshot::now(&players))?
        );
    } else {
        let address = scanner.cached_block_address();
        if address != 0 {
            println!("Block at {:#x}", address);
        }
        print_players(&players);
    }

    Ok(())
}

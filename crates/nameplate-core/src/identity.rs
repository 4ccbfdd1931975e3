//! Owner identity resolved from the game's environment.
//!
//! Steam launches the game with `STEAMID` (the 64-bit Steam id) and
//! `SteamUser` (the account display name) in its environment. The lobby
//! record of the local player is tagged with the 32-bit account id.

use tracing::info;

use crate::error::{Error, Result};
use crate::memory::ProcessEnvironment;

/// Offset between a 64-bit individual Steam id and its account id
pub const STEAM_ID64_BASE: u64 = 76_561_197_960_265_728;

/// Environment variable holding the 64-bit Steam id
pub const STEAM_ID_VAR: &str = "STEAMID";

/// Environment variable holding the Steam display name
pub const STEAM_USER_VAR: &str = "SteamUser";

/// The local player: account id and display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub owner_id: u32,
    pub display_name: String,
}

impl Identity {
    pub fn new(owner_id: u32, display_name: impl Into<String>) -> Self {
        Self {
            owner_id,
            display_name: display_name.into(),
        }
    }

    /// Resolve the identity from the target process environment
    pub fn resolve<P: ProcessEnvironment + ?Sized>(process: &P) -> Result<Self> {
        let steam_id = process
            .read_environment(STEAM_ID_VAR)?
            .ok_or_else(|| Error::IdentityUnresolved(format!("{} is not set", STEAM_ID_VAR)))?;
        let owner_id = account_id_from_steam_id64(&steam_id)?;

        let display_name = process
            .read_environment(STEAM_USER_VAR)?
            .filter(|name| !name.is_empty())
            .ok_or_else(|| Error::IdentityUnresolved(format!("{} is not set", STEAM_USER_VAR)))?;

        info!("SteamUser: {} | SteamID3: {}", display_name, owner_id);
        Ok(Self {
            owner_id,
            display_name,
        })
    }
}

/// Convert a decimal 64-bit Steam id into its 32-bit account id
pub fn account_id_from_steam_id64(value: &str) -> Result<u32> {
    let steam_id64: u64 = value.trim().parse().map_err(|e| {
        Error::IdentityUnresolved(format!("{} is not a number ({:?}): {}", STEAM_ID_VAR, value, e))
    })?;

    steam_id64
        .checked_sub(STEAM_ID64_BASE)
        .and_then(|id| u32::try_from(id).ok())
        .ok_or_else(|| {
            Error::IdentityUnresolved(format!(
                "{} {} is not an individual account id",
                STEAM_ID_VAR, steam_id64
            ))
        })
}

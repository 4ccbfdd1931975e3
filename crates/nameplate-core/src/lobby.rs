//! Change detection between consecutive polls.

use tracing::debug;

/// Outcome of feeding one poll result to the tracker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LobbyUpdate {
    /// The poll produced nothing; the previous lobby is kept
    Unavailable,
    /// Same names as last time
    Unchanged,
    /// Names differ from the previous poll
    Changed(Vec<String>),
}

/// Remembers the last lobby seen and reports changes
#[derive(Debug, Default)]
pub struct LobbyTracker {
    current: Vec<String>,
}

impl LobbyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &[String] {
        &self.current
    }

    pub fn update(&mut self, names: Option<Vec<String>>) -> LobbyUpdate {
        let Some(names) = names else {
            return LobbyUpdate::Unavailable;
        };

        if names == self.current {
            return LobbyUpdate::Unchanged;
        }

        debug!("Lobby changed: {:?} -> {:?}", self.current, names);
        self.current = names.clone();
        LobbyUpdate::Changed(names)
    }
}

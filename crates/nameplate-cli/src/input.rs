use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::debug;

use crate::shutdown::ShutdownSignal;

/// Watch the console for quit keys (Esc, q, Enter, Ctrl+C) and trigger
/// shutdown when one is pressed.
pub fn spawn_keyboard_monitor(shutdown: Arc<ShutdownSignal>) -> JoinHandle<()> {
    thread::spawn(move || {
        debug!("Keyboard monitor started");

        while !shutdown.is_shutdown() {
            if event::poll(Duration::from_millis(100)).unwrap_or(false)
                && let Ok(Event::Key(key_event)) = event::read()
                && should_shutdown(&key_event)
            {
                debug!("Shutdown key pressed: {:?}", key_event.code);
                shutdown.trigger();
                break;
            }
        }

        debug!("Keyboard monitor stopped");
    })
}

fn should_shutdown(event: &KeyEvent) -> bool {
    // Windows reports both press and release
    if event.kind == KeyEventKind::Release {
        return false;
    }

    match event.code {
        KeyCode::Esc | KeyCode::Enter => true,
        KeyCode::Char('q') | KeyCode::Char('Q') => true,
        KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => true,
        _ => false,
    }
}

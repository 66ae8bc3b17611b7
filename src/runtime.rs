use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::warn;

/// Unified event type consumed by the drill loop
#[derive(Clone, Debug)]
pub enum DrillEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// What the front end should do with a key press
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Type(char),
    ToggleStats,
    NewRun,
    Quit,
    Ignore,
}

impl From<KeyEvent> for Command {
    fn from(key: KeyEvent) -> Self {
        if key.kind == KeyEventKind::Release {
            return Command::Ignore;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Command::Quit,
            KeyCode::Esc => Command::Quit,
            KeyCode::Tab => Command::ToggleStats,
            KeyCode::Right => Command::NewRun,
            KeyCode::Char(c) => Command::Type(c),
            _ => Command::Ignore,
        }
    }
}

/// Source of terminal events
pub trait EventSource: Send + 'static {
    /// Wait up to `timeout` for the next event
    fn recv_timeout(&self, timeout: Duration) -> Result<DrillEvent, RecvTimeoutError>;
}

/// Production event source reading crossterm events on a background thread
pub struct CrosstermEventSource {
    rx: Receiver<DrillEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let evt = match event::read() {
                Ok(CtEvent::Key(key)) => DrillEvent::Key(key),
                Ok(CtEvent::Resize(_, _)) => DrillEvent::Resize,
                Ok(_) => continue,
                Err(e) => {
                    warn!(error = %e, "terminal event reader stopped");
                    break;
                }
            };
            if tx.send(evt).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<DrillEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Channel-fed event source for tests
pub struct ChannelEventSource {
    rx: Receiver<DrillEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<DrillEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<DrillEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Advances the front end one event at a time, yielding `Tick` when idle
pub struct Runner<E: EventSource> {
    event_source: E,
    tick_interval: Duration,
}

impl<E: EventSource> Runner<E> {
    pub fn new(event_source: E, tick_interval: Duration) -> Self {
        Self {
            event_source,
            tick_interval,
        }
    }

    pub fn step(&self) -> DrillEvent {
        match self.event_source.recv_timeout(self.tick_interval) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => DrillEvent::Tick,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn step_returns_tick_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(1));
        assert_matches!(runner.step(), DrillEvent::Tick);
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(DrillEvent::Key(key(KeyCode::Char('f'), KeyModifiers::NONE)))
            .unwrap();
        let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(10));
        assert_matches!(runner.step(), DrillEvent::Key(k) if k.code == KeyCode::Char('f'));
    }

    #[test]
    fn step_ticks_after_sender_drops() {
        let (tx, rx) = mpsc::channel::<DrillEvent>();
        drop(tx);
        let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(10));
        assert_matches!(runner.step(), DrillEvent::Tick);
    }

    #[test]
    fn keys_map_to_commands() {
        assert_eq!(
            Command::from(key(KeyCode::Char('j'), KeyModifiers::NONE)),
            Command::Type('j')
        );
        assert_eq!(
            Command::from(key(KeyCode::Char('J'), KeyModifiers::SHIFT)),
            Command::Type('J')
        );
        assert_eq!(
            Command::from(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Command::Quit
        );
        assert_eq!(Command::from(key(KeyCode::Esc, KeyModifiers::NONE)), Command::Quit);
        assert_eq!(
            Command::from(key(KeyCode::Tab, KeyModifiers::NONE)),
            Command::ToggleStats
        );
        assert_eq!(Command::from(key(KeyCode::Right, KeyModifiers::NONE)), Command::NewRun);
        assert_eq!(Command::from(key(KeyCode::Up, KeyModifiers::NONE)), Command::Ignore);
    }

    #[test]
    fn key_releases_are_ignored() {
        let release = KeyEvent::new_with_kind_and_state(
            KeyCode::Char('a'),
            KeyModifiers::NONE,
            KeyEventKind::Release,
            KeyEventState::NONE,
        );
        assert_eq!(Command::from(release), Command::Ignore);
    }
}

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};

use super::InputDriver;

/// Normalizes raw key events across platforms: Shift+Tab becomes BackTab,
/// release and repeat events are filtered, and Windows' duplicate Esc
/// press/release pairs collapse to a single press.
#[derive(Default)]
struct KeyNormalizer {
    esc_down: bool,
}

impl KeyNormalizer {
    fn normalize(&mut self, evt: Event) -> Option<Event> {
        let Event::Key(mut key) = evt else {
            return Some(evt);
        };
        if key.code == KeyCode::Tab && key.modifiers.contains(KeyModifiers::SHIFT) {
            key.code = KeyCode::BackTab;
            key.modifiers.remove(KeyModifiers::SHIFT);
        }
        if cfg!(windows) {
            match key.kind {
                KeyEventKind::Release => {
                    if key.code == KeyCode::Esc {
                        self.esc_down = false;
                    }
                    return None;
                }
                KeyEventKind::Repeat => return None,
                KeyEventKind::Press => {}
            }
            if key.code == KeyCode::Esc {
                if self.esc_down {
                    return None;
                }
                self.esc_down = true;
            } else {
                self.esc_down = false;
            }
        } else if key.kind == KeyEventKind::Release {
            return None;
        }
        Some(Event::Key(key))
    }
}

/// Crossterm-backed input driver with an internal queue so events read while
/// searching for a specific type are not lost.
pub struct ConsoleDriver {
    normalizer: KeyNormalizer,
    event_queue: VecDeque<Event>,
}

impl Default for ConsoleDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleDriver {
    pub fn new() -> Self {
        Self {
            normalizer: KeyNormalizer::default(),
            event_queue: VecDeque::new(),
        }
    }

    fn read_internal(&mut self) -> io::Result<Event> {
        loop {
            let evt = crossterm::event::read()?;
            if let Some(normalized) = self.normalizer.normalize(evt) {
                return Ok(normalized);
            }
        }
    }
}

impl InputDriver for ConsoleDriver {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        if !self.event_queue.is_empty() {
            return Ok(true);
        }
        crossterm::event::poll(timeout)
    }

    fn read(&mut self) -> io::Result<Event> {
        if let Some(evt) = self.event_queue.pop_front() {
            return Ok(evt);
        }
        self.read_internal()
    }

    fn set_mouse_capture(&mut self, enabled: bool) -> io::Result<()> {
        if enabled {
            crossterm::execute!(std::io::stdout(), crossterm::event::EnableMouseCapture)
        } else {
            crossterm::execute!(std::io::stdout(), crossterm::event::DisableMouseCapture)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyModifiers};

    #[test]
    fn shift_tab_normalizes_to_backtab() {
        let mut norm = KeyNormalizer::default();
        let mut key = KeyEvent::new(KeyCode::Tab, KeyModifiers::SHIFT);
        key.kind = KeyEventKind::Press;
        let out = norm.normalize(Event::Key(key)).expect("event expected");
        let Event::Key(key) = out else {
            panic!("expected key event");
        };
        assert_eq!(key.code, KeyCode::BackTab);
        assert!(!key.modifiers.contains(KeyModifiers::SHIFT));
    }

    #[test]
    fn key_release_is_filtered_on_unix() {
        let mut norm = KeyNormalizer::default();
        let mut key = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert!(norm.normalize(Event::Key(key)).is_none());
    }

    #[test]
    fn non_key_events_pass_through() {
        let mut norm = KeyNormalizer::default();
        assert!(norm.normalize(Event::Resize(10, 20)).is_some());
    }

    #[test]
    fn poll_and_read_drain_the_queue_first() {
        let mut d = ConsoleDriver::new();
        d.event_queue.push_back(Event::Key(KeyEvent::new(
            KeyCode::Char('z'),
            KeyModifiers::NONE,
        )));
        assert!(d.poll(Duration::from_millis(0)).unwrap());
        let Event::Key(key) = d.read().unwrap() else {
            panic!("expected key");
        };
        assert_eq!(key.code, KeyCode::Char('z'));
    }
}

//! Terminal key capture.
//!
//! Translates crossterm events into the client's normalized [`KeyEvent`]s.
//! Terminals that speak the kitty keyboard protocol report real key releases
//! and Shift as a key of its own. Legacy terminals only repeat presses while
//! a key is down, so for them a key counts as released once no repeat has
//! arrived within the release timeout, and Shift is read off the modifier
//! flags of each event.

use std::{
    collections::{HashMap, VecDeque},
    io,
    time::{Duration, Instant},
};

use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent as TermKeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, ModifierKeyCode, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{self, disable_raw_mode, enable_raw_mode},
};
use gcs_core::utils::controllers::{Key, KeyEvent, ShiftSide};

/// What the operator did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Key(KeyEvent),
    /// `Esc` or `Ctrl+C`.
    Quit,
}

/// Raw-mode keyboard; restores the terminal on drop.
pub struct Keyboard {
    enhanced: bool,
    release_timeout: Duration,
    /// Last press (or repeat) per held key, legacy terminals only.
    seen: HashMap<Key, Instant>,
    pending: VecDeque<Input>,
}

impl Keyboard {
    /// Switch the terminal to raw mode and request release reporting.
    pub fn open(release_timeout: Duration) -> io::Result<Self> {
        enable_raw_mode()?;
        let enhanced = match terminal::supports_keyboard_enhancement() {
            Ok(true) => execute!(
                io::stdout(),
                PushKeyboardEnhancementFlags(
                    KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                        | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                        | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
                )
            )
            .is_ok(),
            _ => false,
        };
        if enhanced {
            tracing::info!("terminal reports key releases");
        } else {
            tracing::warn!(
                timeout_ms = release_timeout.as_millis() as u64,
                "terminal cannot report key releases, inferring them from key repeat"
            );
        }

        Ok(Keyboard {
            enhanced,
            release_timeout,
            seen: HashMap::new(),
            pending: VecDeque::new(),
        })
    }

    /// Wait up to `timeout` for the next input.
    pub fn next(
        &mut self,
        timeout: Duration,
    ) -> io::Result<Option<Input>> {
        if let Some(input) = self.pending.pop_front() {
            return Ok(Some(input));
        }
        if let Some(key) = self.expired(Instant::now()) {
            return Ok(Some(Input::Key(KeyEvent::Release(key))));
        }

        let wait = self.next_expiry().map_or(timeout, |at| {
            timeout.min(at.saturating_duration_since(Instant::now()))
        });
        if event::poll(wait)? {
            if let Event::Key(ev) = event::read()? {
                self.translate(ev, Instant::now());
            }
        }
        Ok(self.pending.pop_front())
    }

    fn translate(
        &mut self,
        ev: TermKeyEvent,
        now: Instant,
    ) {
        let down = matches!(ev.kind, KeyEventKind::Press | KeyEventKind::Repeat);

        let quit = ev.code == KeyCode::Esc
            || (ev.code == KeyCode::Char('c') && ev.modifiers.contains(KeyModifiers::CONTROL));
        if quit {
            if down {
                self.pending.push_back(Input::Quit);
            }
            return;
        }

        if !self.enhanced {
            self.track_shift(ev.modifiers.contains(KeyModifiers::SHIFT), now);
        }

        let key = match ev.code {
            KeyCode::Char(c) => Key::from_char(c),
            KeyCode::Up => Some(Key::Up),
            KeyCode::Down => Some(Key::Down),
            KeyCode::Modifier(ModifierKeyCode::LeftShift) => Some(Key::Shift(ShiftSide::Left)),
            KeyCode::Modifier(ModifierKeyCode::RightShift) => Some(Key::Shift(ShiftSide::Right)),
            _ => None,
        };
        let Some(key) = key else {
            return;
        };

        if !self.enhanced && !matches!(key, Key::Up | Key::Down) {
            self.seen.insert(key, now);
        }
        let event = if down {
            KeyEvent::Press(key)
        } else {
            KeyEvent::Release(key)
        };
        self.pending.push_back(Input::Key(event));
    }

    /// Derive Shift transitions from the modifier flags of an event.
    fn track_shift(
        &mut self,
        shift: bool,
        now: Instant,
    ) {
        let key = Key::Shift(ShiftSide::Either);
        let held = self.seen.contains_key(&key);
        if shift {
            self.seen.insert(key, now);
            if !held {
                self.pending.push_back(Input::Key(KeyEvent::Press(key)));
            }
        } else if held {
            self.seen.remove(&key);
            self.pending.push_back(Input::Key(KeyEvent::Release(key)));
        }
    }

    /// Pop one key whose repeats have stopped.
    fn expired(
        &mut self,
        now: Instant,
    ) -> Option<Key> {
        let key = self
            .seen
            .iter()
            .find(|(_, last)| now.saturating_duration_since(**last) >= self.release_timeout)
            .map(|(key, _)| *key)?;
        self.seen.remove(&key);
        Some(key)
    }

    fn next_expiry(&self) -> Option<Instant> {
        self.seen
            .values()
            .min()
            .map(|last| *last + self.release_timeout)
    }
}

impl Drop for Keyboard {
    fn drop(&mut self) {
        if self.enhanced {
            let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
        }
        let _ = disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use gcs_core::utils::config::DEFAULT_RELEASE_TIMEOUT;

    use super::*;

    fn legacy() -> Keyboard {
        Keyboard {
            enhanced: false,
            release_timeout: DEFAULT_RELEASE_TIMEOUT,
            seen: HashMap::new(),
            pending: VecDeque::new(),
        }
    }

    fn drain(kb: &mut Keyboard) -> Vec<Input> {
        kb.pending.drain(..).collect()
    }

    #[test]
    fn uppercase_drive_key_implies_shift_on_legacy_terminals() {
        let mut kb = legacy();
        let now = Instant::now();
        kb.translate(TermKeyEvent::new(KeyCode::Char('W'), KeyModifiers::SHIFT), now);
        assert_eq!(
            drain(&mut kb),
            [
                Input::Key(KeyEvent::Press(Key::Shift(ShiftSide::Either))),
                Input::Key(KeyEvent::Press(Key::W)),
            ]
        );

        kb.translate(TermKeyEvent::new(KeyCode::Char('w'), KeyModifiers::NONE), now);
        assert_eq!(
            drain(&mut kb),
            [
                Input::Key(KeyEvent::Release(Key::Shift(ShiftSide::Either))),
                Input::Key(KeyEvent::Press(Key::W)),
            ]
        );
    }

    #[test]
    fn silent_keys_expire_into_releases() {
        let mut kb = legacy();
        let start = Instant::now();
        kb.translate(TermKeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE), start);
        kb.translate(TermKeyEvent::new(KeyCode::Up, KeyModifiers::NONE), start);
        drain(&mut kb);

        assert_eq!(kb.expired(start + Duration::from_millis(100)), None);
        assert_eq!(kb.expired(start + DEFAULT_RELEASE_TIMEOUT), Some(Key::A));
        assert_eq!(kb.expired(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn held_key_survives_the_initial_autorepeat_delay() {
        let mut kb = legacy();
        let start = Instant::now();
        kb.translate(TermKeyEvent::new(KeyCode::Char('w'), KeyModifiers::NONE), start);
        drain(&mut kb);

        // X11 sends the first repeat 660 ms after the press.
        let first_repeat = start + Duration::from_millis(660);
        assert_eq!(kb.expired(first_repeat), None);
        kb.translate(TermKeyEvent::new(KeyCode::Char('w'), KeyModifiers::NONE), first_repeat);
        assert_eq!(drain(&mut kb), [Input::Key(KeyEvent::Press(Key::W))]);
        assert_eq!(kb.expired(first_repeat + Duration::from_millis(40)), None);
    }

    #[test]
    fn escape_and_ctrl_c_quit() {
        let mut kb = legacy();
        let now = Instant::now();
        kb.translate(TermKeyEvent::new(KeyCode::Esc, KeyModifiers::NONE), now);
        kb.translate(TermKeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), now);
        assert_eq!(drain(&mut kb), [Input::Quit, Input::Quit]);
    }

    #[test]
    fn enhanced_terminals_pass_releases_through() {
        let mut kb = legacy();
        kb.enhanced = true;
        let now = Instant::now();
        kb.translate(
            TermKeyEvent::new_with_kind(
                KeyCode::Modifier(ModifierKeyCode::LeftShift),
                KeyModifiers::SHIFT,
                KeyEventKind::Release,
            ),
            now,
        );
        kb.translate(
            TermKeyEvent::new_with_kind(KeyCode::Char('x'), KeyModifiers::NONE, KeyEventKind::Press),
            now,
        );
        assert_eq!(
            drain(&mut kb),
            [Input::Key(KeyEvent::Release(Key::Shift(ShiftSide::Left)))]
        );
        assert!(kb.seen.is_empty());
        kb.enhanced = false;
    }
}

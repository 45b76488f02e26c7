//! Normalized key identifiers and the set of currently held keys.
//!
//! Key capture is not part of this crate. Whatever captures keys (a terminal,
//! a window, a script in tests) maps its events onto [`Key`] first; anything
//! that does not map is dropped before it reaches a tracker.

use hashbrown::HashSet;

/// Which physical Shift key an event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShiftSide {
    Left,
    Right,
    /// The source only knows that *a* Shift is down.
    Either,
}

/// The closed vocabulary of keys the client reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    Q,
    E,
    Up,
    Down,
    Shift(ShiftSide),
}

impl Key {
    /// Normalize a character key; case is ignored.
    pub fn from_char(c: char) -> Option<Key> {
        match c.to_ascii_lowercase() {
            'w' => Some(Key::W),
            'a' => Some(Key::A),
            's' => Some(Key::S),
            'd' => Some(Key::D),
            'q' => Some(Key::Q),
            'e' => Some(Key::E),
            _ => None,
        }
    }

    pub fn is_shift(&self) -> bool {
        matches!(self, Key::Shift(_))
    }
}

/// A key transition reported by the capture layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Press(Key),
    Release(Key),
}

/// Keys currently held down. Each key appears at most once.
#[derive(Debug, Clone, Default)]
pub struct KeySet {
    held: HashSet<Key>,
}

impl KeySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` held. Returns `false` if it already was.
    pub fn insert(
        &mut self,
        key: Key,
    ) -> bool {
        self.held.insert(key)
    }

    /// Mark `key` released. Returns `false` if it was not held.
    pub fn remove(
        &mut self,
        key: Key,
    ) -> bool {
        self.held.remove(&key)
    }

    pub fn contains(
        &self,
        key: Key,
    ) -> bool {
        self.held.contains(&key)
    }

    /// Whether any Shift key is held.
    pub fn any_shift(&self) -> bool {
        self.held.iter().any(Key::is_shift)
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uppercase_letters_normalize_to_the_same_key() {
        assert_eq!(Key::from_char('W'), Some(Key::W));
        assert_eq!(Key::from_char('w'), Some(Key::W));
        assert_eq!(Key::from_char('x'), None);
        assert_eq!(Key::from_char('1'), None);
    }

    #[test]
    fn membership_is_a_set() {
        let mut keys = KeySet::new();
        assert!(keys.insert(Key::A));
        assert!(!keys.insert(Key::A));
        assert_eq!(keys.len(), 1);
        assert!(keys.remove(Key::A));
        assert!(!keys.remove(Key::A));
        assert!(keys.is_empty());
    }

    #[test]
    fn shift_sides_are_tracked_separately() {
        let mut keys = KeySet::new();
        keys.insert(Key::Shift(ShiftSide::Left));
        keys.insert(Key::Shift(ShiftSide::Right));
        keys.remove(Key::Shift(ShiftSide::Left));
        assert!(keys.any_shift());
        keys.remove(Key::Shift(ShiftSide::Right));
        assert!(!keys.any_shift());
    }
}

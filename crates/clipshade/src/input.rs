//! Keyboard state for the control-panel keys and the camera orbit.

use std::collections::HashSet;

pub use winit::keyboard::KeyCode;

/// Keys held down right now, plus the keys that went down since the last
/// [`Keyboard::end_frame`].
#[derive(Debug, Default)]
pub struct Keyboard {
    held: HashSet<KeyCode>,
    tapped: HashSet<KeyCode>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn held(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    /// `true` on the first frame a key is down. OS key repeat does not tap
    /// again while the key stays held.
    pub fn tapped(&self, key: KeyCode) -> bool {
        self.tapped.contains(&key)
    }

    /// `-1`, `0` or `1` from a pair of opposing keys. Holding both cancels out.
    pub fn axis(&self, negative: KeyCode, positive: KeyCode) -> f32 {
        match (self.held(negative), self.held(positive)) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }

    pub(crate) fn press(&mut self, key: KeyCode) {
        if self.held.insert(key) {
            self.tapped.insert(key);
        }
    }

    pub(crate) fn release(&mut self, key: KeyCode) {
        self.held.remove(&key);
    }

    pub(crate) fn end_frame(&mut self) {
        self.tapped.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_repeat_taps_once() {
        let mut keys = Keyboard::new();
        keys.press(KeyCode::Digit1);
        assert!(keys.tapped(KeyCode::Digit1));
        keys.end_frame();
        keys.press(KeyCode::Digit1);
        assert!(keys.held(KeyCode::Digit1));
        assert!(!keys.tapped(KeyCode::Digit1));
    }

    #[test]
    fn tap_and_release_within_one_frame_still_counts() {
        let mut keys = Keyboard::new();
        keys.press(KeyCode::Digit3);
        keys.release(KeyCode::Digit3);
        assert!(keys.tapped(KeyCode::Digit3));
        assert!(!keys.held(KeyCode::Digit3));
        keys.end_frame();
        assert!(!keys.tapped(KeyCode::Digit3));
    }

    #[test]
    fn opposing_keys_cancel() {
        let mut keys = Keyboard::new();
        assert_eq!(keys.axis(KeyCode::ArrowDown, KeyCode::ArrowUp), 0.0);
        keys.press(KeyCode::ArrowUp);
        assert_eq!(keys.axis(KeyCode::ArrowDown, KeyCode::ArrowUp), 1.0);
        keys.press(KeyCode::ArrowDown);
        assert_eq!(keys.axis(KeyCode::ArrowDown, KeyCode::ArrowUp), 0.0);
        keys.release(KeyCode::ArrowUp);
        assert_eq!(keys.axis(KeyCode::ArrowDown, KeyCode::ArrowUp), -1.0);
    }
}

//! Keyboard and pointer state shared by every scene.
//!
//! Scenes mostly poll level-triggered state (`is_held`): movement and jump
//! read "is this key down right now" every tick. Edge-triggered queries
//! (`is_just_pressed`) exist for scene hotkeys and pointer clicks. They are
//! cleared by `end_frame()`, which the host calls after every executed fixed
//! step, so a press landing on a frame with zero steps waits for the next
//! step instead of being lost.

use std::collections::HashSet;

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Space,
    W,
    A,
    S,
    D,
    Tab,
    Escape,
    F3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseBtn {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,

    mouse_held: HashSet<MouseBtn>,
    mouse_just_pressed: HashSet<MouseBtn>,

    /// Cursor position in physical window pixels.
    pub mouse_position: (f64, f64),
    /// Cursor position projected into world space by the host camera.
    pub pointer_world: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if self.held.remove(&key) {
            self.just_released.insert(key);
        }
    }

    pub fn mouse_down(&mut self, btn: MouseBtn) {
        if self.mouse_held.insert(btn) {
            self.mouse_just_pressed.insert(btn);
        }
    }

    pub fn mouse_up(&mut self, btn: MouseBtn) {
        self.mouse_held.remove(&btn);
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// True when any of `keys` is down. Scenes bind one action to several
    /// keys (arrows and WASD).
    pub fn any_held(&self, keys: &[Key]) -> bool {
        keys.iter().any(|key| self.held.contains(key))
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn is_just_released(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    pub fn is_mouse_held(&self, btn: MouseBtn) -> bool {
        self.mouse_held.contains(&btn)
    }

    pub fn is_mouse_just_pressed(&self, btn: MouseBtn) -> bool {
        self.mouse_just_pressed.contains(&btn)
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
        self.mouse_just_pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_down_sets_held_and_just_pressed() {
        let mut input = InputState::new();
        input.key_down(Key::Space);
        assert!(input.is_held(Key::Space));
        assert!(input.is_just_pressed(Key::Space));
    }

    #[test]
    fn repeated_key_down_keeps_single_press() {
        let mut input = InputState::new();
        input.key_down(Key::Up);
        input.end_frame();
        // OS key repeat delivers another Pressed event while held.
        input.key_down(Key::Up);
        assert!(input.is_held(Key::Up));
        assert!(!input.is_just_pressed(Key::Up));
    }

    #[test]
    fn key_up_without_down_is_ignored() {
        let mut input = InputState::new();
        input.key_up(Key::A);
        assert!(!input.is_just_released(Key::A));
        assert!(!input.is_held(Key::A));
    }

    #[test]
    fn end_frame_clears_edges_but_keeps_held() {
        let mut input = InputState::new();
        input.key_down(Key::D);
        input.key_down(Key::W);
        input.key_up(Key::W);
        input.end_frame();
        assert!(!input.is_just_pressed(Key::D));
        assert!(!input.is_just_released(Key::W));
        assert!(input.is_held(Key::D));
        assert!(!input.is_held(Key::W));
    }

    #[test]
    fn any_held_matches_alternate_bindings() {
        let mut input = InputState::new();
        assert!(!input.any_held(&[Key::Left, Key::A]));
        input.key_down(Key::A);
        assert!(input.any_held(&[Key::Left, Key::A]));
        assert!(!input.any_held(&[Key::Right, Key::D]));
    }

    #[test]
    fn mouse_click_is_edge_triggered() {
        let mut input = InputState::new();
        input.mouse_down(MouseBtn::Left);
        assert!(input.is_mouse_just_pressed(MouseBtn::Left));
        assert!(input.is_mouse_held(MouseBtn::Left));
        input.end_frame();
        assert!(!input.is_mouse_just_pressed(MouseBtn::Left));
        input.mouse_up(MouseBtn::Left);
        assert!(!input.is_mouse_held(MouseBtn::Left));
    }
}

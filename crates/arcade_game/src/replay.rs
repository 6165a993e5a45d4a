use arcade_core::input::{InputState, Key, MouseBtn};
use glam::Vec2;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    #[serde(default = "default_dt")]
    pub fixed_dt: f32,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    #[serde(default)]
    pub move_x: f32,
    #[serde(default)]
    pub jump: bool,
    #[serde(default)]
    pub drop: bool,
    /// World position clicked on the first tick of this frame.
    #[serde(default)]
    pub click: Option<[f32; 2]>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplaySequence {
    /// One input snapshot per fixed step.
    pub fn expanded_inputs(&self) -> Vec<InputState> {
        let mut out = Vec::new();
        for frame in &self.frames {
            for tick in 0..frame.repeat.max(1) {
                let mut input = InputState::new();
                if frame.move_x < 0.0 {
                    input.key_down(Key::Left);
                } else if frame.move_x > 0.0 {
                    input.key_down(Key::Right);
                }
                if frame.jump {
                    input.key_down(Key::Space);
                }
                if frame.drop {
                    input.key_down(Key::S);
                }
                if let (Some([x, y]), 0) = (frame.click, tick) {
                    input.pointer_world = Vec2::new(x, y);
                    input.mouse_down(MouseBtn::Left);
                }
                out.push(input);
            }
        }
        out
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.fixed_dt <= 0.0 {
        return Err("Replay validation failed: fixed_dt must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

const fn default_dt() -> f32 {
    1.0 / 60.0
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlatformerConfig;
    use crate::platformer::PlatformerSession;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "arcade_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn run(replay: &ReplaySequence) -> PlatformerSession {
        let mut session = PlatformerSession::new(PlatformerConfig::default(), Vec2::splat(32.0));
        for input in replay.expanded_inputs() {
            session.advance(replay.fixed_dt, &input);
        }
        session
    }

    #[test]
    fn replay_file_parses_and_expands() {
        let path = temp_file_path("parse");
        fs::write(
            &path,
            r#"{
              "fixed_dt": 0.016666667,
              "frames": [
                { "move_x": 1.0, "repeat": 3 },
                { "jump": true, "click": [10.0, 20.0], "repeat": 2 }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let expanded = replay.expanded_inputs();
        assert_eq!(expanded.len(), 5);
        assert!(expanded[0].is_held(Key::Right));
        assert!(expanded[3].is_held(Key::Space));
        assert!(expanded[3].is_mouse_just_pressed(MouseBtn::Left));
        assert_eq!(expanded[3].pointer_world, Vec2::new(10.0, 20.0));
        assert!(!expanded[4].is_mouse_just_pressed(MouseBtn::Left));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn empty_replay_is_rejected() {
        let path = temp_file_path("empty");
        fs::write(&path, r#"{ "frames": [] }"#).expect("write replay file");
        let err = load_replay_from_path(&path).expect_err("empty replay must fail");
        assert!(err.contains("frames list is empty"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn platformer_replay_is_deterministic() {
        let path = temp_file_path("deterministic");
        fs::write(
            &path,
            r#"{
              "fixed_dt": 0.016666667,
              "frames": [
                { "repeat": 120 },
                { "move_x": 1.0, "repeat": 90 },
                { "move_x": 1.0, "jump": true, "repeat": 40 },
                { "move_x": -1.0, "repeat": 60 },
                { "click": [600.0, 300.0], "repeat": 70 },
                { "drop": true, "repeat": 30 }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let run_a = run(&replay);
        let run_b = run(&replay);

        let (a, b) = (run_a.player().aabb, run_b.player().aabb);
        assert!((a.center_x - b.center_x).abs() < 0.0001);
        assert!((a.center_y - b.center_y).abs() < 0.0001);
        assert_eq!(run_a.score(), run_b.score());
        assert_eq!(run_a.active_stars(), run_b.active_stars());
        assert_eq!(run_a.clock(), run_b.clock());
        assert_eq!(run_a.score() % 10, 0);

        let _ = fs::remove_file(path);
    }
}

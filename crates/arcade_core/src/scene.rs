//! The contract between a game scene and the host loop.
//!
//! Lifecycle, driven by the host:
//!
//!   1. `preload()` -- list the assets the scene needs
//!   2. `create(&catalog)` -- build session state from the loaded assets
//!   3. `tick(dt, &input)` -- once per fixed simulation step
//!   4. `render(&mut list)` -- once per presented frame, after the steps
//!   5. `teardown()` -- before the scene is dropped or replaced
//!
//! A scene only sees the host through these calls. All session state
//! (score, player, timers) is owned by the scene value and rebuilt by
//! `create`, so nothing leaks between runs.

use thiserror::Error;

use crate::assets::{AssetCatalog, AssetRequest};
use crate::input::{InputState, Key};
use crate::render::RenderList;
use crate::tilemap::MapError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneKey {
    Platformer,
    Dungeon,
}

impl SceneKey {
    pub const ALL: &'static [SceneKey] = &[SceneKey::Platformer, SceneKey::Dungeon];

    pub fn label(self) -> &'static str {
        match self {
            Self::Platformer => "platformer",
            Self::Dungeon => "dungeon",
        }
    }

    /// Cycles to the next scene (wraps around).
    pub fn next(self) -> Self {
        match self {
            Self::Platformer => Self::Dungeon,
            Self::Dungeon => Self::Platformer,
        }
    }
}

impl std::fmt::Display for SceneKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    SwitchTo(SceneKey),
    Quit,
}

/// Keys every scene shares: Tab cycles to the next scene, Escape quits.
pub fn shared_hotkeys(current: SceneKey, input: &InputState) -> SceneCommand {
    if input.is_just_pressed(Key::Escape) {
        SceneCommand::Quit
    } else if input.is_just_pressed(Key::Tab) {
        SceneCommand::SwitchTo(current.next())
    } else {
        SceneCommand::None
    }
}

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("asset '{0}' was not loaded")]
    MissingAsset(String),
    #[error("map asset '{key}' is invalid: {source}")]
    Map {
        key: String,
        #[source]
        source: MapError,
    },
}

pub trait Scene {
    fn key(&self) -> SceneKey;

    fn preload(&self) -> Vec<AssetRequest>;

    fn create(&mut self, assets: &AssetCatalog) -> Result<(), SceneError>;

    fn tick(&mut self, dt: f32, input: &InputState) -> SceneCommand;

    fn render(&self, out: &mut RenderList);

    /// Cancels pending timers. Default does nothing.
    fn teardown(&mut self) {}
}

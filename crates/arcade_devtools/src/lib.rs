pub mod overlay;

pub use overlay::{HudOverlay, HudText, OverlayActions, OverlayStats};

pub mod assets;
pub mod deferred;
pub mod input;
pub mod render;
pub mod scene;
pub mod tilemap;
pub mod time;
pub mod tween;

pub mod batch;
pub mod camera;
pub mod gpu_context;
pub mod sprite_pipeline;
pub mod texture;

pub use batch::{DrawCall, SpriteBatch};
pub use camera::{Camera2D, CameraUniform};
pub use gpu_context::GpuContext;
pub use sprite_pipeline::{SpritePipeline, SpriteVertex};
pub use texture::Texture;

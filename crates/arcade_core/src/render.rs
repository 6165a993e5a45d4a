//! Backend-neutral draw commands produced by scenes each frame.
//!
//! World space is y-down with the origin at the top-left of the play field,
//! matching the map grid (row 0 at the top).

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }
}

/// `0xRRGGBB` to RGBA floats with alpha 1.
pub fn tint_from_hex(hex: u32) -> [f32; 4] {
    let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
    [channel(16), channel(8), channel(0), 1.0]
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpriteCommand {
    pub texture: &'static str,
    pub center: Vec2,
    pub size: Vec2,
    pub tint: [f32; 4],
    pub flip_x: bool,
    /// Higher depth draws on top. Equal depths keep submission order.
    pub depth: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSpace {
    /// Pixels from the window's top-left corner.
    Screen,
    /// World coordinates, moved by the camera.
    World,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    TopLeft,
    Center,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextCommand {
    pub text: String,
    pub position: Vec2,
    pub space: TextSpace,
    pub anchor: TextAnchor,
    pub size_px: f32,
    pub fill: [u8; 4],
    pub stroke: Option<TextStroke>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStroke {
    pub color: [u8; 4],
    pub thickness: f32,
}

/// What the camera should look at. The host clamps the final view to
/// `bounds` using its viewport size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub target: Vec2,
    pub zoom: f32,
    pub bounds: Option<Rect>,
}

impl Default for CameraView {
    fn default() -> Self {
        Self {
            target: Vec2::ZERO,
            zoom: 1.0,
            bounds: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderList {
    pub clear_color: [f64; 4],
    pub camera: CameraView,
    pub sprites: Vec<SpriteCommand>,
    pub texts: Vec<TextCommand>,
}

impl RenderList {
    pub fn new() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            camera: CameraView::default(),
            sprites: Vec::new(),
            texts: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.sprites.clear();
        self.texts.clear();
    }

    pub fn push_sprite(&mut self, sprite: SpriteCommand) {
        self.sprites.push(sprite);
    }

    pub fn push_text(&mut self, text: TextCommand) {
        self.texts.push(text);
    }

    /// Sorts sprites back-to-front. Stable, so same-depth sprites keep the
    /// order the scene emitted them in.
    pub fn sort_by_depth(&mut self) {
        self.sprites.sort_by_key(|s| s.depth);
    }
}

impl Default for RenderList {
    fn default() -> Self {
        Self::new()
    }
}

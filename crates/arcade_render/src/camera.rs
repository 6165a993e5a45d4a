use arcade_core::render::{CameraView, Rect};
use glam::{Mat4, Vec2};

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

/// Orthographic camera over a y-down world. `position` is the world point
/// shown at the center of the viewport.
pub struct Camera2D {
    pub position: Vec2,
    pub zoom: f32,
    pub viewport: (u32, u32),
}

impl Camera2D {
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: 1.0,
            viewport: (viewport_width, viewport_height),
        }
    }

    fn half_extent(&self) -> Vec2 {
        Vec2::new(
            self.viewport.0 as f32 / (2.0 * self.zoom),
            self.viewport.1 as f32 / (2.0 * self.zoom),
        )
    }

    /// Follows the scene's camera target, keeping the view inside `bounds`.
    /// An axis where the bounds are smaller than the view is centered on them.
    pub fn apply_view(&mut self, view: &CameraView) {
        self.zoom = if view.zoom > 0.0 { view.zoom } else { 1.0 };
        self.position = match view.bounds {
            Some(bounds) => clamp_to_bounds(view.target, self.half_extent(), &bounds),
            None => view.target,
        };
    }

    pub fn screen_to_world(&self, screen: (f64, f64)) -> Vec2 {
        let half_viewport = Vec2::new(self.viewport.0 as f32, self.viewport.1 as f32) * 0.5;
        let offset = Vec2::new(screen.0 as f32, screen.1 as f32) - half_viewport;
        self.position + offset / self.zoom
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        let half_viewport = Vec2::new(self.viewport.0 as f32, self.viewport.1 as f32) * 0.5;
        (world - self.position) * self.zoom + half_viewport
    }

    pub fn build_uniform(&self) -> CameraUniform {
        let half = self.half_extent();

        // Bottom/top swapped relative to a y-up camera so +y points down the screen.
        let proj = Mat4::orthographic_rh(
            self.position.x - half.x,
            self.position.x + half.x,
            self.position.y + half.y,
            self.position.y - half.y,
            -1.0,
            1.0,
        );

        CameraUniform {
            view_proj: proj.to_cols_array_2d(),
        }
    }
}

fn clamp_to_bounds(target: Vec2, half: Vec2, bounds: &Rect) -> Vec2 {
    let axis = |value: f32, min: f32, size: f32, half: f32| {
        if size <= half * 2.0 {
            min + size * 0.5
        } else {
            value.clamp(min + half, min + size - half)
        }
    };
    Vec2::new(
        axis(target.x, bounds.x, bounds.width, half.x),
        axis(target.y, bounds.y, bounds.height, half.y),
    )
}

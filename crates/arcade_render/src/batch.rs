//! CPU-side sprite batching.
//!
//! Sprites are turned into one vertex/index mesh per frame. Consecutive
//! sprites that share a texture collapse into a single draw call, so a tile
//! map drawn layer by layer costs one bind per layer.

use std::sync::Arc;

use arcade_core::render::SpriteCommand;

use crate::sprite_pipeline::SpriteVertex;

#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub texture_key: Arc<str>,
    pub index_start: u32,
    pub index_count: u32,
}

#[derive(Debug, Default)]
pub struct SpriteBatch {
    pub vertices: Vec<SpriteVertex>,
    pub indices: Vec<u32>,
    pub draw_calls: Vec<DrawCall>,
}

impl SpriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.draw_calls.clear();
    }

    pub fn sprite_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Rebuilds the mesh from sprites already sorted back-to-front.
    pub fn rebuild(&mut self, sprites: &[SpriteCommand]) {
        self.clear();
        for sprite in sprites {
            self.push_sprite(sprite);
        }
    }

    pub fn push_sprite(&mut self, sprite: &SpriteCommand) {
        let half = sprite.size * 0.5;
        let (left, right) = (sprite.center.x - half.x, sprite.center.x + half.x);
        let (top, bottom) = (sprite.center.y - half.y, sprite.center.y + half.y);
        let (u0, u1) = if sprite.flip_x { (1.0, 0.0) } else { (0.0, 1.0) };
        let base_index = self.vertices.len() as u32;

        // y-down world: texture row 0 sits on the top edge.
        self.vertices.extend_from_slice(&[
            SpriteVertex {
                position: [left, top],
                tex_coords: [u0, 0.0],
                color: sprite.tint,
            },
            SpriteVertex {
                position: [right, top],
                tex_coords: [u1, 0.0],
                color: sprite.tint,
            },
            SpriteVertex {
                position: [right, bottom],
                tex_coords: [u1, 1.0],
                color: sprite.tint,
            },
            SpriteVertex {
                position: [left, bottom],
                tex_coords: [u0, 1.0],
                color: sprite.tint,
            },
        ]);

        let draw_start = self.indices.len() as u32;
        self.indices.extend_from_slice(&[
            base_index,
            base_index + 1,
            base_index + 2,
            base_index,
            base_index + 2,
            base_index + 3,
        ]);
        self.push_draw_call(sprite.texture, draw_start, 6);
    }

    fn push_draw_call(&mut self, texture_key: &str, index_start: u32, index_count: u32) {
        if let Some(last) = self.draw_calls.last_mut() {
            let contiguous = last.index_start + last.index_count == index_start;
            if &*last.texture_key == texture_key && contiguous {
                last.index_count += index_count;
                return;
            }
        }
        self.draw_calls.push(DrawCall {
            texture_key: Arc::from(texture_key),
            index_start,
            index_count,
        });
    }

    pub fn texture_binds(&self) -> usize {
        let mut binds = 0usize;
        let mut current: Option<&str> = None;
        for draw in &self.draw_calls {
            let key: &str = &draw.texture_key;
            if current != Some(key) {
                current = Some(key);
                binds += 1;
            }
        }
        binds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn sprite(texture: &'static str, x: f32) -> SpriteCommand {
        SpriteCommand {
            texture,
            center: Vec2::new(x, 10.0),
            size: Vec2::new(4.0, 2.0),
            tint: [1.0, 0.5, 0.5, 1.0],
            flip_x: false,
            depth: 0,
        }
    }

    #[test]
    fn same_texture_runs_merge_into_one_draw() {
        let mut batch = SpriteBatch::new();
        batch.rebuild(&[
            sprite("floor", 0.0),
            sprite("floor", 4.0),
            sprite("wall", 8.0),
            sprite("floor", 12.0),
        ]);
        assert_eq!(batch.sprite_count(), 4);
        assert_eq!(batch.indices.len(), 24);
        assert_eq!(batch.draw_calls.len(), 3);
        assert_eq!(batch.draw_calls[0].index_count, 12);
        assert_eq!(&*batch.draw_calls[1].texture_key, "wall");
        assert_eq!(batch.texture_binds(), 3);
    }

    #[test]
    fn quad_corners_follow_center_and_size() {
        let mut batch = SpriteBatch::new();
        batch.push_sprite(&sprite("star", 100.0));
        let positions: Vec<[f32; 2]> = batch.vertices.iter().map(|v| v.position).collect();
        assert_eq!(
            positions,
            vec![[98.0, 9.0], [102.0, 9.0], [102.0, 11.0], [98.0, 11.0]]
        );
        assert!(batch.vertices.iter().all(|v| v.color == [1.0, 0.5, 0.5, 1.0]));
    }

    #[test]
    fn flip_x_mirrors_u() {
        let mut batch = SpriteBatch::new();
        let mut flipped = sprite("player", 0.0);
        flipped.flip_x = true;
        batch.push_sprite(&flipped);
        assert_eq!(batch.vertices[0].tex_coords, [1.0, 0.0]);
        assert_eq!(batch.vertices[1].tex_coords, [0.0, 0.0]);
    }

    #[test]
    fn rebuild_discards_previous_frame() {
        let mut batch = SpriteBatch::new();
        batch.rebuild(&[sprite("a", 0.0), sprite("b", 1.0)]);
        batch.rebuild(&[sprite("a", 0.0)]);
        assert_eq!(batch.sprite_count(), 1);
        assert_eq!(batch.draw_calls.len(), 1);
    }
}

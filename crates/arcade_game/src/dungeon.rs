//! Top-down dungeon walk over a text tile map, with a following camera.

use arcade_core::assets::{AssetCatalog, AssetRequest, Placeholder};
use arcade_core::input::InputState;
use arcade_core::render::{tint_from_hex, CameraView, Rect, RenderList, SpriteCommand};
use arcade_core::scene::{shared_hotkeys, Scene, SceneCommand, SceneError, SceneKey};
use arcade_core::tilemap::{self, cell_center, ParsedMap};
use glam::Vec2;

use crate::body::Body;
use crate::collision::{Aabb, CollisionGrid};
use crate::config::DungeonConfig;
use crate::controller::top_down_velocity;

pub const MAP_KEY: &str = "dungeon_map";
pub const TILE_TEXTURE: &str = "dungeon_tile";
pub const PLAYER_TEXTURE: &str = "dungeon_player";

const WALL_TINT: u32 = 0x666666;
const FLOOR_TINT: u32 = 0x333333;

pub struct DungeonScene {
    config: DungeonConfig,
    session: Option<DungeonSession>,
}

impl DungeonScene {
    pub fn new(config: DungeonConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    pub fn session(&self) -> Option<&DungeonSession> {
        self.session.as_ref()
    }
}

impl Scene for DungeonScene {
    fn key(&self) -> SceneKey {
        SceneKey::Dungeon
    }

    fn preload(&self) -> Vec<AssetRequest> {
        vec![
            AssetRequest::text(MAP_KEY, self.config.map_path.clone()),
            AssetRequest::image(
                TILE_TEXTURE,
                self.config.tile_sprite.clone(),
                Placeholder::solid(32, 32, [255, 255, 255, 255]),
            ),
            AssetRequest::image(
                PLAYER_TEXTURE,
                self.config.player_sprite.clone(),
                Placeholder::solid(32, 32, [0, 255, 0, 255]),
            ),
        ]
    }

    fn create(&mut self, assets: &AssetCatalog) -> Result<(), SceneError> {
        let text = assets.text(MAP_KEY)?;
        let map = tilemap::parse(text, self.config.tile_size).map_err(|source| {
            SceneError::Map {
                key: MAP_KEY.to_string(),
                source,
            }
        })?;
        let player_image = assets.image(PLAYER_TEXTURE)?;
        let player_size = Vec2::new(player_image.width as f32, player_image.height as f32)
            * self.config.player_scale;

        log::info!(
            "Dungeon ready: {}x{} tiles, {} walls, spawn at {:?}",
            map.width,
            map.height,
            map.wall_cells.len(),
            map.spawn
        );
        self.session = Some(DungeonSession::new(self.config.clone(), map, player_size));
        Ok(())
    }

    fn tick(&mut self, dt: f32, input: &InputState) -> SceneCommand {
        if let Some(session) = self.session.as_mut() {
            session.advance(dt, input);
        }
        shared_hotkeys(self.key(), input)
    }

    fn render(&self, out: &mut RenderList) {
        if let Some(session) = &self.session {
            session.render(out);
        }
    }

    fn teardown(&mut self) {
        self.session = None;
    }
}

pub struct DungeonSession {
    config: DungeonConfig,
    map: ParsedMap,
    grid: CollisionGrid,
    bounds: Rect,
    player: Body,
    player_size: Vec2,
}

impl DungeonSession {
    pub fn new(config: DungeonConfig, map: ParsedMap, player_size: Vec2) -> Self {
        let grid = CollisionGrid::from_map(&map);
        log::debug!("Dungeon collision grid: {} solid cells", grid.solid_count());
        let (world_w, world_h) = map.world_size();
        let (spawn_x, spawn_y) = map.spawn_world();

        let mut player = Body::new(Aabb::from_center(
            spawn_x,
            spawn_y,
            player_size.x,
            player_size.y,
        ));
        player.gravity_scale = 0.0;
        player.collide_world_bounds = true;

        Self {
            config,
            map,
            grid,
            bounds: Rect::new(0.0, 0.0, world_w, world_h),
            player,
            player_size,
        }
    }

    pub fn map(&self) -> &ParsedMap {
        &self.map
    }

    pub fn player(&self) -> &Body {
        &self.player
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn advance(&mut self, dt: f32, input: &InputState) {
        let (vx, vy) = top_down_velocity(
            input,
            self.config.player_speed,
            self.config.diagonal_factor,
        );
        self.player.velocity_x = vx;
        self.player.velocity_y = vy;
        self.player.step(dt, 0.0, &self.grid, Some(self.bounds));
    }

    fn render(&self, out: &mut RenderList) {
        out.clear_color = [0.0, 0.0, 0.0, 1.0];
        out.camera = CameraView {
            target: Vec2::new(self.player.aabb.center_x, self.player.aabb.center_y),
            zoom: 1.0,
            bounds: Some(self.bounds),
        };

        let tile = self.map.tile_size;
        let layers = [
            (&self.map.floor_cells, FLOOR_TINT, 0),
            (&self.map.wall_cells, WALL_TINT, 1),
        ];
        for (cells, tint, depth) in layers {
            for &(col, row) in cells {
                let (x, y) = cell_center(col, row, tile);
                out.push_sprite(SpriteCommand {
                    texture: TILE_TEXTURE,
                    center: Vec2::new(x, y),
                    size: Vec2::splat(tile),
                    tint: tint_from_hex(tint),
                    flip_x: false,
                    depth,
                });
            }
        }

        out.push_sprite(SpriteCommand {
            texture: PLAYER_TEXTURE,
            center: Vec2::new(self.player.aabb.center_x, self.player.aabb.center_y),
            size: self.player_size,
            tint: [1.0; 4],
            flip_x: false,
            depth: 2,
        });
    }
}

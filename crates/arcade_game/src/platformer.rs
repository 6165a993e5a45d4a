//! Single-screen platformer: run, jump, collect every star, wait for the
//! respawn, repeat.

use arcade_core::assets::{AssetCatalog, AssetRequest, Placeholder};
use arcade_core::deferred::{Clock, DeferredQueue, OwnerId};
use arcade_core::input::{InputState, MouseBtn};
use arcade_core::render::{
    tint_from_hex, CameraView, Rect, RenderList, SpriteCommand, TextAnchor, TextCommand,
    TextSpace, TextStroke,
};
use arcade_core::scene::{shared_hotkeys, Scene, SceneCommand, SceneError, SceneKey};
use arcade_core::time::step_micros;
use arcade_core::tween::{Ease, Tween};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::body::Body;
use crate::collision::{Aabb, StaticBodies};
use crate::config::PlatformerConfig;
use crate::controller::{PlatformerController, PlatformerTuning};
use crate::stars::{CollectOutcome, Score, StarField, STAR_SIZE};

pub const PLAYER_TEXTURE: &str = "player";
pub const GROUND_TEXTURE: &str = "ground";
pub const STAR_TEXTURE: &str = "star";

pub const TITLE: &str = "Character Sprite Practice";
pub const COMPLETION_MESSAGE: &str = "All stars collected!";

const SKY: u32 = 0x87ceeb;
const PLATFORM_TINT: u32 = 0x8b4513;
const STAR_TINT: u32 = 0xffff00;
const PLATFORM_HEIGHT: f32 = 32.0;

/// (center x, center y, width)
const PLATFORMS: [(f32, f32, f32); 4] = [
    (400.0, 568.0, 800.0),
    (600.0, 400.0, 200.0),
    (50.0, 250.0, 200.0),
    (750.0, 220.0, 200.0),
];

const PLAYER_OWNER: OwnerId = OwnerId(1);
const STAR_OWNER: OwnerId = OwnerId(2);

const BLACK: [u8; 4] = [0, 0, 0, 255];
const WHITE: [u8; 4] = [255, 255, 255, 255];
const GOLD: [u8; 4] = [255, 215, 0, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimedAction {
    RestorePlayerScale,
    RespawnStars,
}

pub struct PlatformerScene {
    config: PlatformerConfig,
    session: Option<PlatformerSession>,
}

impl PlatformerScene {
    pub fn new(config: PlatformerConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    pub fn session(&self) -> Option<&PlatformerSession> {
        self.session.as_ref()
    }
}

impl Scene for PlatformerScene {
    fn key(&self) -> SceneKey {
        SceneKey::Platformer
    }

    fn preload(&self) -> Vec<AssetRequest> {
        vec![
            AssetRequest::image(
                PLAYER_TEXTURE,
                self.config.player_sprite.clone(),
                Placeholder::solid(32, 32, [0, 255, 0, 255]),
            ),
            AssetRequest::generated(GROUND_TEXTURE, Placeholder::solid(32, 32, WHITE)),
            AssetRequest::generated(STAR_TEXTURE, Placeholder::solid(32, 32, WHITE)),
        ]
    }

    fn create(&mut self, assets: &AssetCatalog) -> Result<(), SceneError> {
        let player_image = assets.image(PLAYER_TEXTURE)?;
        let player_size = Vec2::new(player_image.width as f32, player_image.height as f32);
        self.session = Some(PlatformerSession::new(self.config.clone(), player_size));
        log::info!(
            "Platformer ready: {} stars, player {}x{}",
            self.config.star_count,
            player_size.x,
            player_size.y
        );
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
        if let Some(session) = self.session.as_mut() {
            let dropped = session.pending_timers();
            session.timers.clear();
            log::debug!("Platformer teardown: dropped {dropped} pending timers");
        }
        self.session = None;
    }
}

/// Everything one play-through owns. Rebuilt by `create`.
pub struct PlatformerSession {
    config: PlatformerConfig,
    clock: Clock,
    world: Rect,
    platforms: StaticBodies,
    player: Body,
    player_size: Vec2,
    player_scale: f32,
    controller: PlatformerController,
    stars: StarField,
    score: Score,
    completion_visible: bool,
    timers: DeferredQueue<TimedAction>,
    pointer_tween: Option<Tween>,
}

impl PlatformerSession {
    pub fn new(config: PlatformerConfig, player_size: Vec2) -> Self {
        let world = Rect::new(0.0, 0.0, config.world_width, config.world_height);

        let mut platforms = StaticBodies::new();
        for (x, y, width) in PLATFORMS {
            platforms.push(Aabb::from_center(x, y, width, PLATFORM_HEIGHT));
        }

        let [start_x, start_y] = config.player_start;
        let mut player = Body::new(Aabb::from_center(
            start_x,
            start_y,
            player_size.x,
            player_size.y,
        ));
        player.set_bounce(config.grounded_bounce);
        player.collide_world_bounds = true;

        let mut rng = StdRng::seed_from_u64(config.star_seed);
        let stars = StarField::spawn(
            config.star_count,
            config.star_start_x,
            config.star_spacing,
            (config.star_bounce_min, config.star_bounce_max),
            &mut rng,
        );

        let controller = PlatformerController::new(PlatformerTuning {
            run_speed: config.run_speed,
            jump_speed: config.jump_speed,
            drop_speed: config.drop_speed,
            grounded_bounce: config.grounded_bounce,
        });

        Self {
            score: Score::new(config.score_per_star),
            config,
            clock: 0,
            world,
            platforms,
            player,
            player_size,
            player_scale: 1.0,
            controller,
            stars,
            completion_visible: false,
            timers: DeferredQueue::new(),
            pointer_tween: None,
        }
    }

    pub fn clock(&self) -> Clock {
        self.clock
    }

    pub fn score(&self) -> u32 {
        self.score.value
    }

    pub fn active_stars(&self) -> usize {
        self.stars.active_count()
    }

    pub fn completions(&self) -> u32 {
        self.stars.completions()
    }

    pub fn completion_visible(&self) -> bool {
        self.completion_visible
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    pub fn player(&self) -> &Body {
        &self.player
    }

    pub fn player_scale(&self) -> f32 {
        self.player_scale
    }

    pub fn is_tweening(&self) -> bool {
        self.pointer_tween.is_some()
    }

    pub fn advance(&mut self, dt: f32, input: &InputState) {
        self.clock += step_micros(dt);
        for action in self.timers.drain_due(self.clock) {
            self.run_timed(action);
        }

        if input.is_mouse_just_pressed(MouseBtn::Left) {
            log::debug!(
                "Pointer tween to ({:.0}, {:.0}){}",
                input.pointer_world.x,
                input.pointer_world.y,
                if self.is_tweening() { ", replacing active tween" } else { "" }
            );
            let from = Vec2::new(self.player.aabb.center_x, self.player.aabb.center_y);
            self.pointer_tween = Some(Tween::new(
                from,
                input.pointer_world,
                self.clock,
                self.config.pointer_tween_ms * 1000,
                Ease::Power2,
            ));
        }

        self.controller.update(&mut self.player, input);
        self.player
            .step(dt, self.config.gravity, &self.platforms, Some(self.world));
        self.stars.step(dt, self.config.gravity, &self.platforms);
        self.apply_pointer_tween();

        for index in self.stars.overlapping(&self.player.aabb) {
            self.collect_star(index);
        }
    }

    /// Collects one star: score, scale pulse, and on the last one the
    /// completion message plus a delayed respawn.
    pub fn collect_star(&mut self, index: usize) -> Option<CollectOutcome> {
        let outcome = self.stars.collect(index)?;
        let score = self.score.add_star();
        log::debug!(
            "Star {index} collected, score {score}, {} left",
            outcome.remaining
        );

        // A new pulse restarts the restore timer.
        self.timers.cancel_owned_by(PLAYER_OWNER);
        self.player_scale = self.config.pulse_scale;
        self.timers.schedule(
            self.clock + self.config.pulse_ms * 1000,
            Some(PLAYER_OWNER),
            TimedAction::RestorePlayerScale,
        );

        if outcome.field_cleared {
            self.completion_visible = true;
            self.timers.schedule(
                self.clock + self.config.respawn_delay_ms * 1000,
                Some(STAR_OWNER),
                TimedAction::RespawnStars,
            );
            log::info!(
                "All stars collected (score {score}), respawn in {} ms",
                self.config.respawn_delay_ms
            );
        }
        Some(outcome)
    }

    fn run_timed(&mut self, action: TimedAction) {
        match action {
            TimedAction::RestorePlayerScale => self.player_scale = 1.0,
            TimedAction::RespawnStars => {
                self.stars.respawn_all();
                self.completion_visible = false;
                log::info!("Stars respawned ({} active)", self.active_stars());
            }
        }
    }

    fn apply_pointer_tween(&mut self) {
        let Some(tween) = self.pointer_tween else {
            return;
        };
        let position = tween.sample(self.clock);
        self.player.aabb.center_x = position.x;
        self.player.aabb.center_y = position.y;
        self.player.stop();
        if tween.is_finished(self.clock) {
            self.pointer_tween = None;
        }
    }

    fn render(&self, out: &mut RenderList) {
        let [r, g, b, a] = tint_from_hex(SKY);
        out.clear_color = [r as f64, g as f64, b as f64, a as f64];
        out.camera = CameraView {
            target: self.world.center(),
            zoom: 1.0,
            bounds: Some(self.world),
        };

        for platform in self.platforms.iter() {
            out.push_sprite(SpriteCommand {
                texture: GROUND_TEXTURE,
                center: Vec2::new(platform.center_x, platform.center_y),
                size: Vec2::new(platform.half_w * 2.0, platform.half_h * 2.0),
                tint: tint_from_hex(PLATFORM_TINT),
                flip_x: false,
                depth: 0,
            });
        }

        for star in self.stars.stars().iter().filter(|star| star.is_active()) {
            out.push_sprite(SpriteCommand {
                texture: STAR_TEXTURE,
                center: Vec2::new(star.body.aabb.center_x, star.body.aabb.center_y),
                size: Vec2::splat(STAR_SIZE),
                tint: tint_from_hex(STAR_TINT),
                flip_x: false,
                depth: 1,
            });
        }

        out.push_sprite(SpriteCommand {
            texture: PLAYER_TEXTURE,
            center: Vec2::new(self.player.aabb.center_x, self.player.aabb.center_y),
            size: self.player_size * self.player_scale,
            tint: [1.0; 4],
            flip_x: self.controller.facing_left,
            depth: 2,
        });

        out.push_text(TextCommand {
            text: self.score.label(),
            position: Vec2::new(16.0, 16.0),
            space: TextSpace::Screen,
            anchor: TextAnchor::TopLeft,
            size_px: 32.0,
            fill: BLACK,
            stroke: Some(TextStroke {
                color: WHITE,
                thickness: 4.0,
            }),
        });
        out.push_text(TextCommand {
            text: TITLE.to_string(),
            position: Vec2::new(self.world.center().x, 50.0),
            space: TextSpace::World,
            anchor: TextAnchor::Center,
            size_px: 24.0,
            fill: BLACK,
            stroke: Some(TextStroke {
                color: WHITE,
                thickness: 2.0,
            }),
        });
        if self.completion_visible {
            out.push_text(TextCommand {
                text: COMPLETION_MESSAGE.to_string(),
                position: self.world.center(),
                space: TextSpace::World,
                anchor: TextAnchor::Center,
                size_px: 32.0,
                fill: GOLD,
                stroke: Some(TextStroke {
                    color: BLACK,
                    thickness: 4.0,
                }),
            });
        }
    }
}

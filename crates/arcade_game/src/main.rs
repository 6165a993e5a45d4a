//! Arcade Duo -- host loop and application entry point.
//!
//! Architecture: winit drives the event loop via `ApplicationHandler`. The active
//! scene is ticked inside `RedrawRequested` on a **fixed timestep** (see `TimeState`):
//!
//!   1. `begin_frame()` -- measure wall-clock delta, feed accumulator
//!   2. `while should_step()` -- one `Scene::tick` per fixed-dt slice
//!   3. `Scene::render` fills a `RenderList`, which is batched into one sprite mesh
//!   4. Upload camera uniform, issue draw calls, composite the egui HUD on top
//!
//! Scenes never touch the GPU. Switching scenes (Tab, or the debug panel's
//! restart button) builds the next scene completely before the current one is
//! torn down, so a failed switch leaves the running scene untouched.

mod assets;
mod body;
mod collision;
mod config;
mod controller;
mod dungeon;
mod platformer;
#[cfg(test)]
mod replay;
mod session;
mod stars;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use wgpu::util::DeviceExt;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use arcade_core::input::{InputState, Key, MouseBtn};
use arcade_core::render::{RenderList, TextSpace};
use arcade_core::scene::{SceneCommand, SceneKey};
use arcade_core::time::TimeState;
use arcade_devtools::{HudOverlay, HudText, OverlayStats};
use arcade_platform::window::PlatformConfig;
use arcade_render::{Camera2D, GpuContext, SpriteBatch, SpritePipeline, SpriteVertex, Texture};

use config::{load_config_from_path, GameConfig, SceneArg};
use session::{start_scene, ActiveScene};

#[derive(Debug, Parser)]
#[command(
    name = "arcade_game",
    about = "A star-collecting platformer and a top-down dungeon walk"
)]
struct Cli {
    /// Scene to start in. Overrides `start_scene` from the config file.
    #[arg(long, value_enum)]
    scene: Option<SceneArg>,

    /// JSON config file. Missing file means built-in defaults.
    #[arg(long, default_value = "assets/config/game.json")]
    config: PathBuf,
}

struct GpuSpriteTexture {
    texture: Texture,
    bind_group: wgpu::BindGroup,
}

/// All mutable engine state lives here. Constructed lazily in `ApplicationHandler::resumed`
/// once the window and GPU surface are available.
struct EngineState {
    window: Arc<Window>,
    gpu: GpuContext,
    time: TimeState,
    input: InputState,
    camera: Camera2D,
    sprite_pipeline: SpritePipeline,
    hud: HudOverlay,
    config: GameConfig,

    // --- Active scene -----------------------------------------------------------
    active: ActiveScene,
    render_list: RenderList,
    batch: SpriteBatch,
    textures: HashMap<Arc<str>, GpuSpriteTexture>,
    pause: PauseState,

    // --- Per-frame GPU mesh state -----------------------------------------------
    // Buffers grow (power-of-two) but never shrink.
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    mesh_vertex_capacity: usize,
    mesh_index_capacity: usize,
}

enum StepOutcome {
    Continue,
    Quit,
}

/// Debug-panel pause. Input edges that arrive while paused are dropped with
/// the skipped step instead of firing on the first step after resuming.
#[derive(Debug, Default)]
struct PauseState {
    paused: bool,
    single_step_requested: bool,
}

impl PauseState {
    fn toggle(&mut self) {
        self.paused = !self.paused;
        log::info!(
            "Simulation {}",
            if self.paused { "PAUSED" } else { "RESUMED" }
        );
    }

    fn request_step(&mut self) {
        self.single_step_requested = true;
    }

    /// Whether the next fixed step runs. A refused step still consumes edges.
    fn admit_step(&mut self, input: &mut InputState) -> bool {
        if self.paused && !self.single_step_requested {
            input.end_frame();
            return false;
        }
        self.single_step_requested = false;
        true
    }
}

impl EngineState {
    fn new(window: Arc<Window>, config: GameConfig, active: ActiveScene) -> Result<Self, String> {
        let gpu = GpuContext::new(window.clone())?;
        let time = TimeState::new(f64::from(config.fixed_dt));
        let input = InputState::new();
        let sprite_pipeline = SpritePipeline::new(&gpu.device, gpu.surface_format);
        let hud = HudOverlay::new(&gpu.device, gpu.surface_format, &window);
        let camera = Camera2D::new(gpu.size.0, gpu.size.1);

        let camera_uniform = camera.build_uniform();
        let camera_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Uniform Buffer"),
                contents: bytemuck::cast_slice(&[camera_uniform]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let camera_bind_group =
            sprite_pipeline.create_camera_bind_group(&gpu.device, &camera_buffer);
        let vertex_buffer = create_vertex_buffer(&gpu.device, 1);
        let index_buffer = create_index_buffer(&gpu.device, 1);

        let mut state = Self {
            window,
            gpu,
            time,
            input,
            camera,
            sprite_pipeline,
            hud,
            config,
            active,
            render_list: RenderList::new(),
            batch: SpriteBatch::new(),
            textures: HashMap::new(),
            pause: PauseState::default(),
            vertex_buffer,
            index_buffer,
            camera_buffer,
            camera_bind_group,
            mesh_vertex_capacity: 0,
            mesh_index_capacity: 0,
        };

        state.upload_scene_textures();
        state.ensure_mesh_capacity(4, 6);
        Ok(state)
    }

    /// Replaces every GPU texture with the active scene's images. Texture keys
    /// are only unique within one scene, so nothing is carried over.
    fn upload_scene_textures(&mut self) {
        self.textures.clear();
        for (key, image) in self.active.assets.images() {
            let texture = Texture::from_rgba8(
                &self.gpu.device,
                &self.gpu.queue,
                &image.pixels,
                image.width,
                image.height,
                key,
            );
            let bind_group = self
                .sprite_pipeline
                .create_texture_bind_group(&self.gpu.device, &texture);
            self.textures.insert(
                Arc::from(key),
                GpuSpriteTexture {
                    texture,
                    bind_group,
                },
            );
        }
        log::debug!(
            "Uploaded {} textures for '{}' ({:.1} KiB)",
            self.textures.len(),
            self.active.key(),
            self.texture_memory_kib()
        );
    }

    fn texture_memory_kib(&self) -> f32 {
        let bytes: u64 = self
            .textures
            .values()
            .map(|t| u64::from(t.texture.size.0) * u64::from(t.texture.size.1) * 4)
            .sum();
        bytes as f32 / 1024.0
    }

    fn switch_scene(&mut self, key: SceneKey) {
        match start_scene(key, &self.config) {
            Ok(next) => {
                self.active.scene.teardown();
                self.active = next;
                self.upload_scene_textures();
                log::info!("Switched to scene '{key}'");
            }
            Err(err) => {
                log::error!(
                    "Could not switch to scene '{key}', staying on '{}': {err:#}",
                    self.active.key()
                );
            }
        }
    }

    /// Runs every fixed step the accumulator allows. Edge-triggered input is
    /// cleared after each executed step, so a press is seen by exactly one tick.
    fn run_fixed_steps(&mut self) -> StepOutcome {
        while self.time.should_step() {
            if !self.pause.admit_step(&mut self.input) {
                continue;
            }

            let pointer = self.camera.screen_to_world(self.input.mouse_position);
            self.input.pointer_world = pointer;

            let dt = self.time.fixed_dt as f32;
            let command = self.active.scene.tick(dt, &self.input);
            self.input.end_frame();

            match command {
                SceneCommand::None => {}
                SceneCommand::SwitchTo(key) => {
                    self.switch_scene(key);
                    // Steps owed to the old scene are dropped.
                    while self.time.should_step() {}
                    break;
                }
                SceneCommand::Quit => return StepOutcome::Quit,
            }
        }
        StepOutcome::Continue
    }

    fn rebuild_scene_mesh(&mut self) {
        self.render_list.clear();
        self.active.scene.render(&mut self.render_list);
        self.render_list.sort_by_depth();
        self.camera.apply_view(&self.render_list.camera);

        self.batch.rebuild(&self.render_list.sprites);
        self.ensure_mesh_capacity(self.batch.vertices.len(), self.batch.indices.len());
        if !self.batch.vertices.is_empty() {
            self.gpu.queue.write_buffer(
                &self.vertex_buffer,
                0,
                bytemuck::cast_slice(&self.batch.vertices),
            );
            self.gpu.queue.write_buffer(
                &self.index_buffer,
                0,
                bytemuck::cast_slice(&self.batch.indices),
            );
        }

        let camera_uniform = self.camera.build_uniform();
        self.gpu.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[camera_uniform]),
        );
    }

    fn overlay_stats(&self) -> OverlayStats {
        OverlayStats {
            scene_label: self.active.key().label().to_string(),
            draw_calls: self.batch.draw_calls.len() as u32,
            texture_binds: self.batch.texture_binds() as u32,
            sprite_count: self.batch.sprite_count() as u32,
            placeholder_textures: self.active.assets.placeholder_count() as u32,
            paused: self.pause.paused,
        }
    }

    fn ensure_mesh_capacity(&mut self, vertex_count: usize, index_count: usize) {
        let needed_vertices = vertex_count.max(1);
        if needed_vertices > self.mesh_vertex_capacity {
            self.mesh_vertex_capacity = needed_vertices.next_power_of_two();
            self.vertex_buffer = create_vertex_buffer(&self.gpu.device, self.mesh_vertex_capacity);
        }

        let needed_indices = index_count.max(1);
        if needed_indices > self.mesh_index_capacity {
            self.mesh_index_capacity = needed_indices.next_power_of_two();
            self.index_buffer = create_index_buffer(&self.gpu.device, self.mesh_index_capacity);
        }
    }

    fn render_frame(&mut self) {
        self.rebuild_scene_mesh();

        let Some((output, view)) = self.gpu.begin_frame() else {
            return;
        };

        let hud_texts: Vec<HudText<'_>> = self
            .render_list
            .texts
            .iter()
            .map(|command| {
                let screen = match command.space {
                    TextSpace::Screen => command.position,
                    TextSpace::World => self.camera.world_to_screen(command.position),
                };
                HudText {
                    command,
                    screen_px: (screen.x, screen.y),
                }
            })
            .collect();
        let stats = self.overlay_stats();
        let (egui_primitives, egui_textures_delta, overlay_actions) =
            self.hud
                .prepare(&self.window, &self.time, &hud_texts, &stats);
        drop(hud_texts);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.size.0, self.gpu.size.1],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let [r, g, b, a] = self.render_list.clear_color;
            let mut last_bound_texture_key: Option<&Arc<str>> = None;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            render_pass.set_pipeline(&self.sprite_pipeline.render_pipeline);
            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

            for draw in &self.batch.draw_calls {
                let Some(texture) = self.textures.get(&draw.texture_key) else {
                    log::warn!("No texture uploaded for '{}'", draw.texture_key);
                    continue;
                };
                let need_rebind = match last_bound_texture_key {
                    Some(last) => **last != *draw.texture_key,
                    None => true,
                };
                if need_rebind {
                    render_pass.set_bind_group(1, &texture.bind_group, &[]);
                    last_bound_texture_key = Some(&draw.texture_key);
                }
                render_pass.draw_indexed(
                    draw.index_start..(draw.index_start + draw.index_count),
                    0,
                    0..1,
                );
            }
        }

        self.hud.upload(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &egui_primitives,
            &egui_textures_delta,
            &screen_descriptor,
        );

        {
            let mut egui_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();

            self.hud
                .paint(&mut egui_pass, &egui_primitives, &screen_descriptor);
        }

        self.hud.cleanup(&egui_textures_delta);

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        // Overlay buttons take effect from the next frame.
        if overlay_actions.toggle_pause {
            self.pause.toggle();
        }
        if overlay_actions.single_step {
            self.pause.request_step();
        }
        if overlay_actions.restart_scene {
            self.switch_scene(self.active.key());
        }
    }
}

struct App {
    config: GameConfig,
    pending: Option<ActiveScene>,
    state: Option<EngineState>,
    fatal: Option<anyhow::Error>,
}

impl App {
    fn new(config: GameConfig, first_scene: ActiveScene) -> Self {
        Self {
            config,
            pending: Some(first_scene),
            state: None,
            fatal: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.fatal = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let Some(first_scene) = self.pending.take() else {
            return;
        };

        let platform = PlatformConfig {
            title: self.config.window.title.clone(),
            width: self.config.window.width,
            height: self.config.window.height,
            resizable: true,
        };
        let window = match arcade_platform::window::create_window(event_loop, &platform) {
            Ok(window) => window,
            Err(err) => {
                self.fail(
                    event_loop,
                    anyhow::Error::new(err).context("failed to create window"),
                );
                return;
            }
        };

        match EngineState::new(window, self.config.clone(), first_scene) {
            Ok(state) => self.state = Some(state),
            Err(err) => self.fail(
                event_loop,
                anyhow::Error::msg(err).context("failed to initialise renderer"),
            ),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        let egui_consumed = state.hud.handle_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                state.active.scene.teardown();
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                let w = physical_size.width;
                let h = physical_size.height;
                if w > 0 && h > 0 {
                    state.gpu.resize(w, h);
                    state.camera.viewport = (w, h);
                    log::info!("Resized to {}x{}", w, h);
                }
            }

            WindowEvent::KeyboardInput { event, .. } if !egui_consumed => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    match (map_key(key_code), event.state) {
                        // Host hotkey: toggles even while the simulation is paused.
                        (Some(Key::F3), ElementState::Pressed) if !event.repeat => {
                            state.hud.toggle_debug();
                        }
                        (Some(key), ElementState::Pressed) => state.input.key_down(key),
                        (Some(key), ElementState::Released) => state.input.key_up(key),
                        (None, _) => {}
                    }
                }
            }

            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } if !egui_consumed => {
                if let Some(btn) = map_mouse_button(button) {
                    match button_state {
                        ElementState::Pressed => state.input.mouse_down(btn),
                        ElementState::Released => state.input.mouse_up(btn),
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                state.input.mouse_position = (position.x, position.y);
            }

            WindowEvent::RedrawRequested => {
                if state.gpu.size.0 == 0 || state.gpu.size.1 == 0 {
                    return;
                }

                state.time.begin_frame();
                if let StepOutcome::Quit = state.run_fixed_steps() {
                    log::info!("Scene '{}' requested quit, exiting.", state.active.key());
                    state.active.scene.teardown();
                    event_loop.exit();
                    return;
                }

                state.render_frame();
            }

            _ => {}
        }
    }
}

fn create_vertex_buffer(device: &wgpu::Device, vertex_capacity: usize) -> wgpu::Buffer {
    let byte_len = (vertex_capacity * std::mem::size_of::<SpriteVertex>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Scene Vertex Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_index_buffer(device: &wgpu::Device, index_capacity: usize) -> wgpu::Buffer {
    let byte_len = (index_capacity * std::mem::size_of::<u32>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Scene Index Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::ArrowRight => Some(Key::Right),
        KeyCode::ArrowUp => Some(Key::Up),
        KeyCode::ArrowDown => Some(Key::Down),
        KeyCode::Space => Some(Key::Space),
        KeyCode::KeyW => Some(Key::W),
        KeyCode::KeyA => Some(Key::A),
        KeyCode::KeyS => Some(Key::S),
        KeyCode::KeyD => Some(Key::D),
        KeyCode::Tab => Some(Key::Tab),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::F3 => Some(Key::F3),
        _ => None,
    }
}

fn map_mouse_button(button: MouseButton) -> Option<MouseBtn> {
    match button {
        MouseButton::Left => Some(MouseBtn::Left),
        MouseButton::Right => Some(MouseBtn::Right),
        MouseButton::Middle => Some(MouseBtn::Middle),
        _ => None,
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    log::info!("Arcade Duo starting...");

    let config = load_config_from_path(&cli.config).map_err(anyhow::Error::msg)?;
    let first_key = SceneKey::from(cli.scene.unwrap_or(config.start_scene));
    let first_scene = start_scene(first_key, &config)?;

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, first_scene);
    event_loop.run_app(&mut app).context("event loop error")?;

    match app.fatal.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn movement_and_scene_keys_are_mapped() {
        assert_eq!(map_key(KeyCode::ArrowLeft), Some(Key::Left));
        assert_eq!(map_key(KeyCode::KeyD), Some(Key::D));
        assert_eq!(map_key(KeyCode::Tab), Some(Key::Tab));
        assert_eq!(map_key(KeyCode::Escape), Some(Key::Escape));
        assert_eq!(map_key(KeyCode::KeyQ), None);
    }

    #[test]
    fn cli_scene_overrides_config() {
        let cli = Cli::parse_from(["arcade_game", "--scene", "dungeon"]);
        assert_eq!(cli.scene, Some(SceneArg::Dungeon));
        assert_eq!(cli.config, PathBuf::from("assets/config/game.json"));

        let cli = Cli::parse_from(["arcade_game", "--config", "other.json"]);
        assert_eq!(cli.scene, None);
        assert_eq!(cli.config, PathBuf::from("other.json"));
    }

    #[test]
    fn clicks_and_tab_during_pause_do_not_fire_after_resume() {
        let mut pause = PauseState::default();
        pause.toggle();
        let mut input = InputState::new();
        input.mouse_down(MouseBtn::Left);
        input.key_down(Key::Tab);

        assert!(!pause.admit_step(&mut input));
        assert!(!input.is_mouse_just_pressed(MouseBtn::Left));
        assert!(!input.is_just_pressed(Key::Tab));
        assert!(input.is_held(Key::Tab));

        pause.toggle();
        assert!(pause.admit_step(&mut input));
        assert!(!input.is_just_pressed(Key::Tab));
    }

    #[test]
    fn single_step_admits_exactly_one_step_while_paused() {
        let mut pause = PauseState::default();
        pause.toggle();
        pause.request_step();
        let mut input = InputState::new();
        input.key_down(Key::Space);

        assert!(pause.admit_step(&mut input));
        assert!(input.is_just_pressed(Key::Space));
        assert!(!pause.admit_step(&mut input));
    }

    #[test]
    fn pointer_maps_through_camera() {
        let mut camera = Camera2D::new(800, 600);
        camera.position = Vec2::new(400.0, 300.0);
        assert_eq!(camera.screen_to_world((0.0, 0.0)), Vec2::ZERO);
    }
}

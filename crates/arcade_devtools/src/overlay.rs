//! egui layer drawn on top of the sprite pass: scene HUD text (score, title,
//! completion message) and the F3 debug window.
//!
//! egui_wgpu needs a `RenderPass<'static>` while `begin_render_pass`
//! borrows the encoder, so rendering is split in phases:
//!
//!   1. `prepare()` -- run UI logic, tessellate
//!   2. `upload()`  -- update textures and buffers (borrows the encoder)
//!   3. `paint()`   -- draw into a pass created with `forget_lifetime()`
//!   4. `cleanup()` -- free textures egui dropped

use arcade_core::render::{TextAnchor, TextCommand};
use arcade_core::time::TimeState;
use winit::window::Window;

/// A scene text command already projected to physical window pixels.
pub struct HudText<'a> {
    pub command: &'a TextCommand,
    pub screen_px: (f32, f32),
}

#[derive(Debug, Clone, Default)]
pub struct OverlayStats {
    pub scene_label: String,
    pub draw_calls: u32,
    pub texture_binds: u32,
    pub sprite_count: u32,
    /// Textures that fell back to a generated placeholder
    pub placeholder_textures: u32,
    pub paused: bool,
}

#[derive(Debug, Clone, Default)]
pub struct OverlayActions {
    pub toggle_pause: bool,
    /// Advance one fixed step while paused
    pub single_step: bool,
    pub restart_scene: bool,
}

pub struct HudOverlay {
    pub egui_ctx: egui::Context,
    pub egui_winit_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,
    pub debug_visible: bool,
}

impl HudOverlay {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        window: &Window,
    ) -> Self {
        let egui_ctx = egui::Context::default();
        let egui_winit_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);

        Self {
            egui_ctx,
            egui_winit_state,
            egui_renderer,
            debug_visible: false,
        }
    }

    pub fn handle_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        self.egui_winit_state.on_window_event(window, event).consumed
    }

    pub fn toggle_debug(&mut self) {
        self.debug_visible = !self.debug_visible;
        log::info!(
            "Debug overlay: {}",
            if self.debug_visible { "ON" } else { "OFF" }
        );
    }

    pub fn prepare(
        &mut self,
        window: &Window,
        time: &TimeState,
        hud: &[HudText<'_>],
        stats: &OverlayStats,
    ) -> (
        Vec<egui::ClippedPrimitive>,
        egui::TexturesDelta,
        OverlayActions,
    ) {
        let mut actions = OverlayActions::default();
        let debug_visible = self.debug_visible;
        let raw_input = self.egui_winit_state.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            paint_hud(ctx, hud);

            if debug_visible {
                egui::Window::new("Debug")
                    .default_pos([10.0, 80.0])
                    .show(ctx, |ui| {
                        ui.label(format!("Scene: {}", stats.scene_label));
                        ui.label(format!("FPS: {:.1}", time.smoothed_fps));
                        ui.label(format!("Frame time: {:.2} ms", time.smoothed_frame_time_ms));
                        ui.label(format!("Steps this frame: {}", time.steps_this_frame));
                        ui.label(format!("Total steps: {}", time.fixed_step_count));
                        ui.separator();
                        ui.label(format!("Sprites: {}", stats.sprite_count));
                        ui.label(format!("Draw calls: {}", stats.draw_calls));
                        ui.label(format!("Texture binds: {}", stats.texture_binds));
                        ui.label(format!(
                            "Placeholder textures: {}",
                            stats.placeholder_textures
                        ));
                        ui.separator();
                        ui.horizontal(|ui| {
                            let pause_label = if stats.paused { "Resume" } else { "Pause" };
                            if ui.button(pause_label).clicked() {
                                actions.toggle_pause = true;
                            }
                            if stats.paused && ui.button("Step").clicked() {
                                actions.single_step = true;
                            }
                            if ui.button("Restart scene").clicked() {
                                actions.restart_scene = true;
                            }
                        });
                    });
            }
        });

        self.egui_winit_state
            .handle_platform_output(window, full_output.platform_output);

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        (primitives, full_output.textures_delta, actions)
    }

    /// Call before creating the egui render pass.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor);
    }

    pub fn paint(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    pub fn cleanup(&mut self, textures_delta: &egui::TexturesDelta) {
        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

const STROKE_DIRECTIONS: [(f32, f32); 8] = [
    (-1.0, -1.0),
    (0.0, -1.0),
    (1.0, -1.0),
    (-1.0, 0.0),
    (1.0, 0.0),
    (-1.0, 1.0),
    (0.0, 1.0),
    (1.0, 1.0),
];

fn color32(rgba: [u8; 4]) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(rgba[0], rgba[1], rgba[2], rgba[3])
}

fn paint_hud(ctx: &egui::Context, hud: &[HudText<'_>]) {
    if hud.is_empty() {
        return;
    }
    let pixels_per_point = ctx.pixels_per_point();
    let painter = ctx.layer_painter(egui::LayerId::background());

    for item in hud {
        let command = item.command;
        let pos = egui::pos2(
            item.screen_px.0 / pixels_per_point,
            item.screen_px.1 / pixels_per_point,
        );
        let anchor = match command.anchor {
            TextAnchor::TopLeft => egui::Align2::LEFT_TOP,
            TextAnchor::Center => egui::Align2::CENTER_CENTER,
        };
        let font = egui::FontId::proportional(command.size_px / pixels_per_point);

        // egui has no outlined text; fake it with offset copies underneath.
        if let Some(stroke) = command.stroke {
            let offset = stroke.thickness * 0.5 / pixels_per_point;
            for (dx, dy) in STROKE_DIRECTIONS {
                painter.text(
                    pos + egui::vec2(dx * offset, dy * offset),
                    anchor,
                    &command.text,
                    font.clone(),
                    color32(stroke.color),
                );
            }
        }
        painter.text(pos, anchor, &command.text, font, color32(command.fill));
    }
}

//! Drifting-rocks demo. Exercises every drawing path of `marduk-gfx`:
//! shapes, transforms, textures with flips and frames, a render-target
//! minimap, a custom additive shader and baked bitmap text.
//!
//! Esc quits.

use anyhow::{Context, Result};
use glam::{Mat4, Vec2, Vec3};
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{Key, NamedKey};

use marduk_gfx::coords::Rect;
use marduk_gfx::core::{App, AppControl, FrameCtx};
use marduk_gfx::device::WgpuBackend;
use marduk_gfx::logging::{LoggingConfig, init_logging};
use marduk_gfx::paint::{BlendMode, Color};
use marduk_gfx::render::{
    BitmapFont, Clear, Flip, Graphics, LineAlign, RenderTarget, SHAPE_WGSL, Shader, ShaderKind,
    Texture,
};
use marduk_gfx::text::{BakeOptions, bake_font};
use marduk_gfx::time::FixedStep;
use marduk_gfx::window::{Runtime, RuntimeConfig};

const ROCKS: usize = 24;
const MINIMAP: u32 = 192;
const SPRITE: u32 = 64;

const FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
];

struct Rock {
    pos: Vec2,
    vel: Vec2,
    angle: f32,
    spin: f32,
    radius: f32,
    /// Outline relative to the rock center.
    outline: Vec<Vec2>,
}

impl Rock {
    fn new(i: usize) -> Self {
        // Golden-angle scatter keeps the layout deterministic without an RNG.
        let t = i as f32 * 2.399_963;
        let radius = 14.0 + (i % 5) as f32 * 7.0;
        let outline = (0..9)
            .map(|k| {
                let a = k as f32 / 9.0 * std::f32::consts::TAU;
                let jag = 0.75 + 0.25 * ((k * 7 + i * 3) % 4) as f32 / 3.0;
                Vec2::from_angle(a) * radius * jag
            })
            .collect();

        Self {
            pos: Vec2::new(640.0, 360.0) + Vec2::from_angle(t) * (80.0 + i as f32 * 12.0),
            vel: Vec2::from_angle(t * 1.7) * (30.0 + (i % 7) as f32 * 10.0),
            angle: t,
            spin: if i % 2 == 0 { 0.6 } else { -0.9 },
            radius,
            outline,
        }
    }

    fn update(&mut self, dt: f32, bounds: Vec2) {
        self.pos += self.vel * dt;
        self.angle += self.spin * dt;
        self.pos = self.pos.rem_euclid(bounds);
    }

    fn model(&self) -> Mat4 {
        Mat4::from_translation(self.pos.extend(0.0)) * Mat4::from_rotation_z(self.angle)
    }
}

struct Assets {
    sprite: Texture,
    minimap: RenderTarget,
    glow: Shader,
    font: Option<BitmapFont>,
}

struct Arcade {
    rocks: Vec<Rock>,
    step: FixedStep,
    bounds: Vec2,
    assets: Option<Assets>,
}

impl Arcade {
    fn new() -> Self {
        Self {
            rocks: (0..ROCKS).map(Rock::new).collect(),
            step: FixedStep::from_hz(60.0),
            bounds: Vec2::new(1280.0, 720.0),
            assets: None,
        }
    }
}

/// Gradient with a bright marker in the top-left corner, so flips are visible.
fn sprite_pixels(size: u32) -> Vec<u8> {
    let mut rgba = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let marker = x < size / 4 && y < size / 4;
            let border = x == 0 || y == 0 || x == size - 1 || y == size - 1;
            let px = if marker || border {
                [255, 255, 255, 255]
            } else {
                [(x * 255 / size) as u8, (y * 255 / size) as u8, 160, 255]
            };
            rgba.extend_from_slice(&px);
        }
    }
    rgba
}

fn load_font(gfx: &mut Graphics<WgpuBackend<'_>>) -> Option<BitmapFont> {
    let Some(bytes) = FONT_PATHS.iter().find_map(|p| std::fs::read(p).ok()) else {
        log::warn!("no system font found; text is disabled");
        return None;
    };
    let options = BakeOptions {
        px: 18.0,
        ..BakeOptions::default()
    };
    match bake_font(gfx, &bytes, &options) {
        Ok(font) => Some(font),
        Err(e) => {
            log::warn!("font bake failed: {e}");
            None
        }
    }
}

impl App for Arcade {
    fn init(&mut self, gfx: &mut Graphics<WgpuBackend<'_>>) -> Result<()> {
        let sprite = gfx
            .create_texture(SPRITE, SPRITE, &sprite_pixels(SPRITE))
            .context("sprite upload failed")?;
        let minimap = gfx.create_render_target(MINIMAP, MINIMAP)?;
        let glow = gfx
            .create_shader(ShaderKind::Shape, "glow", SHAPE_WGSL)?
            .with_blend(BlendMode::Additive);
        let font = load_font(gfx);

        self.assets = Some(Assets {
            sprite,
            minimap,
            glow,
            font,
        });
        Ok(())
    }

    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => AppControl::Exit,
            _ => AppControl::Continue,
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<AppControl> {
        self.bounds = ctx.window.size().max(Vec2::ONE);
        let dt = self.step.step();
        for _ in 0..self.step.advance(ctx.time.dt) {
            for rock in &mut self.rocks {
                rock.update(dt, self.bounds);
            }
        }

        let Some(assets) = &self.assets else {
            return Ok(AppControl::Continue);
        };
        let gfx = &mut *ctx.gfx;
        let t = ctx.time.elapsed as f32;

        draw_minimap(gfx, assets, &self.rocks, self.bounds)?;
        draw_backdrop(gfx, assets, self.bounds, t);
        draw_rocks(gfx, assets, &self.rocks)?;
        draw_ship(gfx, self.bounds * 0.5, t)?;
        draw_hud(gfx, assets, self.bounds, ctx.time.dt);

        Ok(AppControl::Continue)
    }
}

fn draw_minimap(
    gfx: &mut Graphics<WgpuBackend<'_>>,
    assets: &Assets,
    rocks: &[Rock],
    bounds: Vec2,
) -> Result<()> {
    gfx.push_target(&assets.minimap)?;
    gfx.start(Clear::Color(Color::new(0.05, 0.08, 0.12, 0.85)));

    let scale = MINIMAP as f32 / bounds.max_element();
    gfx.with_transform(Mat4::from_scale(Vec3::new(scale, scale, 1.0)), |g| {
        g.set_color(Color::from_hex(0xffb347ff));
        for rock in rocks {
            g.fill_circle(rock.pos, rock.radius, 10);
        }
        g.set_color(Color::from_hex(0x7fdbffff));
        g.fill_circle(bounds * 0.5, 10.0, 3);
    })?;
    gfx.set_color(Color::WHITE);
    gfx.draw_rect(Rect::new(0.0, 0.0, MINIMAP as f32, MINIMAP as f32), 2.0);

    gfx.pop_target()?;
    Ok(())
}

fn draw_backdrop(gfx: &mut Graphics<WgpuBackend<'_>>, assets: &Assets, bounds: Vec2, t: f32) {
    gfx.set_color(Color::new(1.0, 1.0, 1.0, 0.35));
    let flips = [Flip::None, Flip::Horizontal, Flip::Vertical, Flip::Both];
    for (i, flip) in flips.into_iter().enumerate() {
        let x = 24.0 + i as f32 * (SPRITE as f32 + 16.0);
        gfx.draw_image(&assets.sprite, x, bounds.y - SPRITE as f32 - 24.0, flip);
    }

    // Top-left quarter of the sprite, stretched.
    let half = SPRITE as f32 * 0.5;
    gfx.draw_image_frame(
        &assets.sprite,
        Rect::new(0.0, 0.0, half, half),
        360.0,
        bounds.y - 120.0,
        96.0,
        96.0,
        Flip::None,
    );

    let wobble = (t * 1.3).sin() * 18.0;
    let base = Vec2::new(bounds.x - 200.0, bounds.y - 140.0);
    gfx.draw_image_points(
        &assets.sprite,
        [
            base + Vec2::new(wobble, 0.0),
            base + Vec2::new(150.0, 10.0),
            base + Vec2::new(140.0 - wobble, 110.0),
            base + Vec2::new(-10.0, 100.0),
        ],
        None,
        Flip::None,
    );
    gfx.draw_image_scaled(&assets.sprite, bounds.x - 56.0, 16.0, 40.0, 40.0, Flip::Both);
    gfx.set_color(Color::WHITE);
}

fn draw_rocks(gfx: &mut Graphics<WgpuBackend<'_>>, assets: &Assets, rocks: &[Rock]) -> Result<()> {
    gfx.set_shape_shader(Some(&assets.glow));
    gfx.set_color(Color::new(0.9, 0.45, 0.1, 0.25));
    for rock in rocks {
        gfx.fill_circle(rock.pos, rock.radius * 1.4, 24);
    }
    gfx.set_shape_shader(None);

    for rock in rocks {
        gfx.with_transform(rock.model(), |g| {
            g.set_color(Color::from_hex(0x3a2f2aff));
            g.fill_polygon(Vec2::ZERO, &rock.outline);
            g.set_color(Color::from_hex(0xd8c3a5ff));
            g.draw_polygon(Vec2::ZERO, &rock.outline, 2.0);
        })?;
    }
    Ok(())
}

fn draw_ship(gfx: &mut Graphics<WgpuBackend<'_>>, center: Vec2, t: f32) -> Result<()> {
    gfx.push_transform()?;
    gfx.translate(center.x, center.y);
    gfx.rotate(t * 0.5);

    gfx.set_color(Color::from_hex(0x7fdbffff));
    gfx.fill_triangle(Vec2::new(22.0, 0.0), Vec2::new(-14.0, 12.0), Vec2::new(-14.0, -12.0));

    let flame = 10.0 + (t * 20.0).sin().abs() * 8.0;
    gfx.set_color(Color::from_hex(0xff851bff));
    gfx.draw_line(Vec2::new(-16.0, 0.0), Vec2::new(-16.0 - flame, 0.0), 4.0, LineAlign::Center);

    gfx.set_color(Color::new(0.5, 0.85, 1.0, 0.6));
    gfx.draw_circle(Vec2::ZERO, 34.0, 32, 1.5);

    gfx.pop_transform()?;
    Ok(())
}

fn draw_hud(gfx: &mut Graphics<WgpuBackend<'_>>, assets: &Assets, bounds: Vec2, dt: f32) {
    let panel = Rect::new(16.0, 16.0, 260.0, 64.0);
    gfx.set_color(Color::new(0.0, 0.0, 0.0, 0.5));
    gfx.fill_rect(panel);
    gfx.set_color(Color::from_hex(0x7fdbffff));
    gfx.draw_rect(panel, 1.0);

    gfx.set_color(Color::WHITE);
    gfx.draw_render_target(&assets.minimap, bounds.x - MINIMAP as f32 - 16.0, 72.0);

    if let Some(font) = &assets.font {
        let stats = gfx.stats();
        let text = format!(
            "{:>5.1} fps  {} rocks\n{} draws  {} tris  {} quads",
            1.0 / dt.max(1e-4),
            ROCKS,
            stats.draw_calls,
            stats.triangles,
            stats.quads,
        );
        gfx.draw_text(font, &text, panel.x() + 10.0, panel.y() + 10.0);
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "marduk arcade".to_string(),
        ..RuntimeConfig::default()
    };
    Runtime::run(config, Arcade::new())
}

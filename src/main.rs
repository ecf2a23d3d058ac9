use std::time::Instant;

use bytemuck::{Pod, Zeroable};
use glow::HasContext;
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;

use orrery::abs::*;
use orrery::config::Config;
use orrery::{Result, Transform, Vector2, Vector3, Vector4, logging};

/// Interleaved quad vertex: position followed by texture coordinates.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct QuadVertex {
    position: Vector2,
    uv: Vector2,
}

impl Vertex for QuadVertex {
    fn layout() -> Result<VertexLayout> {
        let mut layout = VertexLayout::new();
        layout
            .add(2, ScalarType::Float, false, 0)?
            .add(2, ScalarType::Float, false, size_of::<Vector2>() as u32)?;
        Ok(layout)
    }
}

const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { position: Vector2::new(-0.5, -0.5), uv: Vector2::new(0.0, 0.0) },
    QuadVertex { position: Vector2::new(0.5, -0.5), uv: Vector2::new(1.0, 0.0) },
    QuadVertex { position: Vector2::new(0.5, 0.5), uv: Vector2::new(1.0, 1.0) },
    QuadVertex { position: Vector2::new(-0.5, 0.5), uv: Vector2::new(0.0, 1.0) },
];
const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

struct Body {
    orbit_radius: f32,
    /// Seconds per orbit.
    orbit_period: f32,
    /// Degrees per second.
    spin: f32,
    size: f32,
    color: Vector4,
}

impl Body {
    fn transform(&self, time: f32) -> Transform {
        let angle = if self.orbit_period > 0.0 {
            time / self.orbit_period * std::f32::consts::TAU
        } else {
            0.0
        };
        Transform::from_translation(Vector3::new(
            self.orbit_radius * angle.cos(),
            self.orbit_radius * angle.sin(),
            0.0,
        ))
        .with_rotation(time * self.spin, Vector3::Z)
        .with_scale(Vector3::new(self.size, self.size, 1.0))
    }
}

fn bodies() -> Vec<Body> {
    vec![
        Body { orbit_radius: 0.0, orbit_period: 0.0, spin: 10.0, size: 1.6, color: Vector4::new(1.0, 0.85, 0.3, 1.0) },
        Body { orbit_radius: 1.6, orbit_period: 4.0, spin: 40.0, size: 0.25, color: Vector4::new(0.7, 0.6, 0.5, 1.0) },
        Body { orbit_radius: 2.5, orbit_period: 7.0, spin: 30.0, size: 0.4, color: Vector4::new(0.9, 0.7, 0.4, 1.0) },
        Body { orbit_radius: 3.5, orbit_period: 11.0, spin: 60.0, size: 0.45, color: Vector4::new(0.3, 0.5, 1.0, 1.0) },
        Body { orbit_radius: 4.6, orbit_period: 18.0, spin: 55.0, size: 0.35, color: Vector4::new(0.9, 0.35, 0.2, 1.0) },
    ]
}

fn main() {
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(path),
        None => Config::load_or_default(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = logging::init(config.log_level(), config.log_file.as_deref()) {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    if let Err(e) = run(&config) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(config: &Config) -> Result<()> {
    let mut app = App::new(&config.window)?;
    let device = app.device.clone();

    let mut program = ShaderProgram::from_file(&device, &config.shader)?;
    let quad = Mesh::new(&device, &QUAD_VERTICES, &QUAD_INDICES, PrimitiveMode::Triangles)?;
    let texture = config.texture.as_ref().and_then(|path| {
        Texture::from_file(&device, path)
            .inspect_err(|e| log::warn!("Drawing untextured bodies: {e}"))
            .ok()
    });

    let mut camera = config.camera;
    let (width, height) = app.size();
    camera.set_viewport(width, height);

    let [r, g, b, a] = config.clear_color;
    unsafe {
        device.viewport(0, 0, width as i32, height as i32);
        device.clear_color(r, g, b, a);
        device.enable(glow::BLEND);
        device.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
    }

    let bodies = bodies();
    let start = Instant::now();

    'running: loop {
        for event in app.event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'running,
                Event::KeyDown {
                    keycode: Some(Keycode::R),
                    repeat: false,
                    ..
                } => match ShaderSource::from_file(&config.shader)
                    .and_then(|source| program.recompile(&source))
                {
                    Ok(()) => log::info!("Reloaded {}", config.shader.display()),
                    Err(e) => log::error!("Keeping previous shader: {e}"),
                },
                Event::Window {
                    win_event: WindowEvent::SizeChanged(w, h),
                    ..
                } => {
                    unsafe {
                        device.viewport(0, 0, w, h);
                    }
                    camera.set_viewport(w.max(0) as u32, h.max(0) as u32);
                }
                _ => {}
            }
        }

        let time = start.elapsed().as_secs_f32();

        unsafe {
            device.clear(glow::COLOR_BUFFER_BIT);
        }

        program.bind();
        program.set_mat4("u_view", &camera.view());
        program.set_mat4("u_projection", &camera.projection());
        program.set_bool("u_use_texture", texture.is_some());
        if let Some(texture) = &texture {
            texture.bind(0);
            program.set_int("u_texture", 0);
        }

        for body in &bodies {
            program.set_mat4("u_model", &body.transform(time).matrix());
            program.set_vec4("u_color", body.color);
            quad.draw()?;
        }

        app.window.gl_swap_window();
    }

    log::info!("Shutting down");
    Ok(())
}

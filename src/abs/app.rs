//! SDL2 and OpenGL application management.
//!
//! This module defines the [`App`] struct which encapsulates the SDL2
//! window and the OpenGL context, exposed as a [`GlDevice`].

use std::sync::Arc;

use super::GlDevice;
use crate::config::WindowConfig;
use crate::error::{Error, Result};

/// The [`App`] struct encapsulates the SDL2 and OpenGL context.
pub struct App {
    pub sdl: sdl2::Sdl,
    pub video_subsystem: sdl2::VideoSubsystem,
    pub window: sdl2::video::Window,
    pub gl_context: sdl2::video::GLContext,
    pub device: Arc<GlDevice>,
    pub event_pump: sdl2::EventPump,
}

impl App {
    /// Creates a window and an OpenGL 4.3 core context for it.
    /// The width and height options are ignored if `fullscreen` is set.
    pub fn new(config: &WindowConfig) -> Result<Self> {
        let sdl = sdl2::init().map_err(Error::Device)?;
        let video_subsystem = sdl.video().map_err(Error::Device)?;
        let gl_attr = video_subsystem.gl_attr();
        gl_attr.set_context_profile(sdl2::video::GLProfile::Core);
        gl_attr.set_context_version(4, 3);
        let (width, height) = if config.fullscreen {
            let display_mode = video_subsystem.current_display_mode(0).map_err(Error::Device)?;
            (display_mode.w as u32, display_mode.h as u32)
        } else {
            (config.width, config.height)
        };
        let mut window = video_subsystem
            .window(&config.title, width, height)
            .opengl()
            .resizable()
            .build()
            .map_err(|e| Error::Device(e.to_string()))?;
        if config.fullscreen {
            window
                .set_fullscreen(sdl2::video::FullscreenType::Desktop)
                .map_err(Error::Device)?;
        }
        let gl_context = window.gl_create_context().map_err(Error::Device)?;
        window.gl_make_current(&gl_context).map_err(Error::Device)?;
        let interval = if config.vsync {
            sdl2::video::SwapInterval::VSync
        } else {
            sdl2::video::SwapInterval::Immediate
        };
        if let Err(e) = video_subsystem.gl_set_swap_interval(interval) {
            log::warn!("Could not set swap interval: {e}");
        }
        let device = unsafe {
            GlDevice::from_loader_function(|s| video_subsystem.gl_get_proc_address(s) as *const _)
        };
        let event_pump = sdl.event_pump().map_err(Error::Device)?;
        log::info!("Created {width}x{height} window \"{}\"", config.title);

        Ok(Self {
            sdl,
            video_subsystem,
            window,
            gl_context,
            device: Arc::new(device),
            event_pump,
        })
    }

    /// Current drawable size in pixels.
    pub fn size(&self) -> (u32, u32) {
        self.window.drawable_size()
    }
}

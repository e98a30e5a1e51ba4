use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use glam::Vec2;
use wgpu::SurfaceError;
use winit::{
    dpi::LogicalSize,
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    window::{Window as HostWindow, WindowBuilder},
};

use super::core::EngineConfig;
use super::renderer::Renderer;
use super::resources::ResourceManager;

/// Host events the simulation cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyPressed(KeyCode),
    KeyReleased(KeyCode),
    Closed,
}

/// Something to draw, referring to assets by their resource key.
#[derive(Debug, Clone, PartialEq)]
pub enum Drawable<'a> {
    Sprite {
        texture: &'a str,
        position: Vec2,
    },
    Text {
        font: &'a str,
        content: &'a str,
        position: Vec2,
        size: u32,
    },
}

pub trait Canvas {
    fn clear(&mut self);
    fn draw(&mut self, drawable: &Drawable<'_>);
    fn display(&mut self);
}

pub trait Window: Canvas {
    fn is_open(&self) -> bool;
    /// Returns the next pending event without blocking.
    fn poll_event(&mut self) -> Option<InputEvent>;
    fn close(&mut self);
}

/// A winit window whose event queue is pumped on demand instead of owning the loop.
pub struct PlatformLayer {
    event_loop: EventLoop<()>,
    window: Arc<HostWindow>,
    renderer: Renderer,
    pending: VecDeque<InputEvent>,
    open: bool,
    boot_timestamp: Instant,
}

impl PlatformLayer {
    pub fn new(config: &EngineConfig, resources: ResourceManager) -> Result<Self> {
        let event_loop = EventLoop::new().context("failed to create event loop")?;
        let window = Arc::new(
            WindowBuilder::new()
                .with_title(config.app_name.clone())
                .with_resizable(config.resizable)
                .with_inner_size(LogicalSize::new(
                    config.window_width as f64,
                    config.window_height as f64,
                ))
                .build(&event_loop)
                .context("failed to create window")?,
        );

        let view_size = Vec2::new(config.window_width as f32, config.window_height as f32);
        let renderer = pollster::block_on(Renderer::new(window.clone(), view_size, resources))
            .context("failed to initialize renderer")?;
        tracing::info!(target: "engine", "renderer initialized");

        Ok(Self {
            event_loop,
            window,
            renderer,
            pending: VecDeque::new(),
            open: true,
            boot_timestamp: Instant::now(),
        })
    }

    pub fn uptime(&self) -> Duration {
        self.boot_timestamp.elapsed()
    }

    pub fn pump_events(&mut self) {
        let window_id = self.window.id();
        let window = &self.window;
        let renderer = &mut self.renderer;
        let pending = &mut self.pending;

        let status = self
            .event_loop
            .pump_events(Some(Duration::ZERO), |event, _target| {
                let Event::WindowEvent { window_id: id, event } = event else {
                    return;
                };
                if id != window_id {
                    return;
                }
                match event {
                    WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                        tracing::info!(target: "engine", "window close requested");
                        pending.push_back(InputEvent::Closed);
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        if let Some(input) = translate_key(&event) {
                            pending.push_back(input);
                        }
                    }
                    WindowEvent::Resized(size) => renderer.resize(size),
                    WindowEvent::ScaleFactorChanged {
                        mut inner_size_writer,
                        ..
                    } => {
                        let new_size = window.inner_size();
                        let _ = inner_size_writer.request_inner_size(new_size);
                        renderer.resize(new_size);
                    }
                    _ => {}
                }
            });

        if let PumpStatus::Exit(code) = status {
            tracing::info!(target: "engine", code, "event loop exited");
            self.pending.push_back(InputEvent::Closed);
        }
    }
}

fn translate_key(event: &KeyEvent) -> Option<InputEvent> {
    let PhysicalKey::Code(code) = event.physical_key else {
        return None;
    };
    Some(match event.state {
        ElementState::Pressed => InputEvent::KeyPressed(code),
        ElementState::Released => InputEvent::KeyReleased(code),
    })
}

impl Canvas for PlatformLayer {
    fn clear(&mut self) {
        self.renderer.begin_frame();
    }

    fn draw(&mut self, drawable: &Drawable<'_>) {
        self.renderer.queue_drawable(drawable);
    }

    fn display(&mut self) {
        if !self.open {
            return;
        }
        match self.renderer.end_frame() {
            Ok(()) => {}
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                self.renderer.resize(self.window.inner_size());
            }
            Err(SurfaceError::OutOfMemory) => {
                tracing::error!("GPU out of memory, closing window");
                self.close();
            }
            Err(SurfaceError::Timeout) => {
                tracing::warn!("surface timeout, retrying next frame");
            }
        }
    }
}

impl Window for PlatformLayer {
    fn is_open(&self) -> bool {
        self.open
    }

    fn poll_event(&mut self) -> Option<InputEvent> {
        if self.pending.is_empty() && self.open {
            self.pump_events();
        }
        self.pending.pop_front()
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            self.window.set_visible(false);
            tracing::info!(target: "engine", uptime_ms = self.uptime().as_millis() as u64, "window closed");
        }
    }
}

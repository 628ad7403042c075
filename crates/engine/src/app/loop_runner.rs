use std::sync::Arc;
use std::time::Instant;

use pixels::{Error as PixelsError, Pixels, SurfaceTexture};
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, MouseButton, Touch, TouchPhase, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowBuilder};

use super::virtual_stick::{PointerId, VirtualSticks};
use super::{
    CommandDispatcher, FrameLoop, FrameRequester, InputEvent, InputStateStore, LoopConfig,
    MetricsHandle, Simulation, Surface, SurfaceError, FRAME_HEIGHT, FRAME_WIDTH,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize pixel surface: {0}")]
    CreateSurface(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

impl FrameRequester for Window {
    fn request_next_frame(&self) {
        self.request_redraw();
    }
}

pub fn run_app(config: LoopConfig, simulation: Box<dyn Simulation>) -> Result<(), AppError> {
    run_app_with_metrics(config, simulation, MetricsHandle::default())
}

pub fn run_app_with_metrics(
    config: LoopConfig,
    mut simulation: Box<dyn Simulation>,
    metrics_handle: MetricsHandle,
) -> Result<(), AppError> {
    let config = config.normalized();
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                f64::from(FRAME_WIDTH * config.scale),
                f64::from(FRAME_HEIGHT * config.scale),
            ))
            .with_min_inner_size(LogicalSize::new(
                f64::from(FRAME_WIDTH),
                f64::from(FRAME_HEIGHT),
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut surface = PixelsSurface::new(Arc::clone(&window)).map_err(AppError::CreateSurface)?;

    let window_size = window.inner_size();
    let mut input_collector = InputCollector::new(
        VirtualSticks::new(
            config.bindings.stick_identifiers(),
            window_size.width,
            window_size.height,
            config.dead_zone,
        ),
    );
    let mut frame_loop = FrameLoop::new(
        CommandDispatcher::new(config.bindings.bindings()),
        metrics_handle,
        config.metrics_log_interval(),
    );
    frame_loop.set_overlay_enabled(config.overlay_enabled);

    info!(
        bindings = config.bindings.name(),
        sticks = ?config.bindings.stick_identifiers(),
        dead_zone = config.dead_zone,
        scale = config.scale,
        overlay = config.overlay_enabled,
        metrics_log_interval_ms = config.metrics_log_interval_ms,
        "loop_config"
    );

    // Nothing else requests redraws: the first one starts the loop and every
    // tick asks for its successor.
    event_loop.set_control_flow(ControlFlow::Wait);
    window.request_redraw();
    let clock_start = Instant::now();

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    input_collector.set_window_size(new_size);
                    surface.resize(new_size);
                }
                WindowEvent::Focused(false) => {
                    input_collector.release_all();
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    let is_pressed = event.state == ElementState::Pressed;
                    input_collector.handle_physical_key(event.physical_key, is_pressed);
                    if input_collector.quit_requested {
                        info!(reason = "escape_key", "shutdown_requested");
                        window_target.exit();
                    }
                }
                WindowEvent::CursorMoved { position, .. } => {
                    input_collector.handle_cursor_moved(position.x as f32, position.y as f32);
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    input_collector.handle_mouse_input(button, state);
                }
                WindowEvent::Touch(touch) => {
                    input_collector.handle_touch(touch);
                }
                WindowEvent::RedrawRequested => {
                    if input_collector.take_overlay_toggle_pressed() {
                        let overlay_visible = !frame_loop.overlay_enabled();
                        frame_loop.set_overlay_enabled(overlay_visible);
                        info!(overlay_visible, "overlay_toggled");
                    }

                    let now_ms = clock_start.elapsed().as_secs_f64() * 1000.0;
                    let report = frame_loop.tick(
                        now_ms,
                        &input_collector.store,
                        simulation.as_mut(),
                        surface.available(),
                        window.as_ref(),
                    );
                    if report.stats_logged {
                        window.set_title(&format!(
                            "{} | {}",
                            config.window_title,
                            report.summary.one_line()
                        ));
                    }
                }
                _ => {}
            },
            Event::LoopExiting => {
                info!(ticks = frame_loop.ticks(), "shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// `pixels` surface holding a `FRAME_WIDTH` x `FRAME_HEIGHT` texture scaled to
/// the window. Unavailable while the window has no area or after a failed
/// resize.
struct PixelsSurface {
    pixels: Pixels<'static>,
    is_available: bool,
}

impl PixelsSurface {
    fn new(window: Arc<Window>) -> Result<Self, PixelsError> {
        let size = window.inner_size();
        let surface_texture = SurfaceTexture::new(size.width.max(1), size.height.max(1), window);
        let pixels = Pixels::new(FRAME_WIDTH, FRAME_HEIGHT, surface_texture)?;
        Ok(Self {
            pixels,
            is_available: size.width > 0 && size.height > 0,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            self.is_available = false;
            return;
        }
        match self.pixels.resize_surface(size.width, size.height) {
            Ok(()) => self.is_available = true,
            Err(error) => {
                warn!(
                    error = %error,
                    width = size.width,
                    height = size.height,
                    "surface_resize_failed"
                );
                self.is_available = false;
            }
        }
    }

    fn available(&mut self) -> Option<&mut dyn Surface> {
        if self.is_available {
            Some(self)
        } else {
            None
        }
    }
}

impl Surface for PixelsSurface {
    fn clear(&mut self) -> Result<(), SurfaceError> {
        self.pixels.frame_mut().fill(0);
        Ok(())
    }

    fn put_pixels(&mut self, frame: &[u8]) -> Result<(), SurfaceError> {
        let target = self.pixels.frame_mut();
        if target.len() != frame.len() {
            return Err(SurfaceError::SizeMismatch {
                expected: target.len(),
                actual: frame.len(),
            });
        }
        target.copy_from_slice(frame);
        self.pixels
            .render()
            .map_err(|error| SurfaceError::Backend {
                message: error.to_string(),
            })
    }
}

/// Turns window events into input store writes.
#[derive(Debug)]
struct InputCollector {
    store: InputStateStore,
    sticks: VirtualSticks,
    cursor_position_px: Option<(f32, f32)>,
    quit_requested: bool,
    overlay_toggle_is_down: bool,
    overlay_toggle_pressed_edge: bool,
}

impl InputCollector {
    fn new(sticks: VirtualSticks) -> Self {
        Self {
            store: InputStateStore::new(),
            sticks,
            cursor_position_px: None,
            quit_requested: false,
            overlay_toggle_is_down: false,
            overlay_toggle_pressed_edge: false,
        }
    }

    fn set_window_size(&mut self, size: PhysicalSize<u32>) {
        self.sticks.set_window_size(size.width, size.height);
    }

    fn handle_physical_key(&mut self, key: PhysicalKey, is_pressed: bool) {
        let PhysicalKey::Code(code) = key else {
            return;
        };
        match code {
            KeyCode::Escape if is_pressed => self.quit_requested = true,
            KeyCode::F3 => self.handle_overlay_toggle_key_state(is_pressed),
            _ => {}
        }
        self.store.apply(InputEvent::key(key_identifier(code), is_pressed));
    }

    fn handle_overlay_toggle_key_state(&mut self, is_pressed: bool) {
        if is_pressed {
            if !self.overlay_toggle_is_down {
                self.overlay_toggle_pressed_edge = true;
            }
            self.overlay_toggle_is_down = true;
        } else {
            self.overlay_toggle_is_down = false;
        }
    }

    fn take_overlay_toggle_pressed(&mut self) -> bool {
        std::mem::take(&mut self.overlay_toggle_pressed_edge)
    }

    fn handle_cursor_moved(&mut self, x: f32, y: f32) {
        self.cursor_position_px = Some((x, y));
        if let Some(event) = self.sticks.drag(PointerId::Mouse, x, y) {
            self.store.apply(event);
        }
    }

    fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        if button != MouseButton::Left {
            return;
        }
        let event = match state {
            ElementState::Pressed => {
                let Some((x, y)) = self.cursor_position_px else {
                    return;
                };
                self.sticks.press(PointerId::Mouse, x, y)
            }
            ElementState::Released => self.sticks.release(PointerId::Mouse),
        };
        if let Some(event) = event {
            self.store.apply(event);
        }
    }

    fn handle_touch(&mut self, touch: Touch) {
        self.handle_touch_phase(
            touch.id,
            touch.phase,
            touch.location.x as f32,
            touch.location.y as f32,
        );
    }

    fn handle_touch_phase(&mut self, id: u64, phase: TouchPhase, x: f32, y: f32) {
        let pointer = PointerId::Touch(id);
        let event = match phase {
            TouchPhase::Started => self.sticks.press(pointer, x, y),
            TouchPhase::Moved => self.sticks.drag(pointer, x, y),
            TouchPhase::Ended | TouchPhase::Cancelled => self.sticks.release(pointer),
        };
        if let Some(event) = event {
            self.store.apply(event);
        }
    }

    /// Release events never arrive for keys held while focus is elsewhere.
    fn release_all(&mut self) {
        self.sticks.release_all();
        self.store.release_all();
        self.overlay_toggle_is_down = false;
    }
}

/// Browser-compatible physical key names ("KeyW", "ArrowLeft", "Space").
fn key_identifier(code: KeyCode) -> String {
    format!("{code:?}")
}

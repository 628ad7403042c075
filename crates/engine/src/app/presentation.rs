use thiserror::Error;

use super::simulation::{Simulation, SimulationError, FRAME_BYTES, FRAME_HEIGHT, FRAME_WIDTH};
use super::tools::draw_overlay;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("display surface is unavailable")]
    Unavailable,
    #[error("surface expects {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("surface backend failed: {message}")]
    Backend { message: String },
}

/// Destination of finished frames, fixed at `FRAME_WIDTH` x `FRAME_HEIGHT`.
pub trait Surface {
    fn clear(&mut self) -> Result<(), SurfaceError>;
    fn put_pixels(&mut self, frame: &[u8]) -> Result<(), SurfaceError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaintSkip {
    #[error("no display surface")]
    NoSurface,
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error("pixel fill failed: {0}")]
    Simulation(#[from] SimulationError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaintOutcome {
    Painted,
    Skipped(PaintSkip),
}

impl PaintOutcome {
    pub fn is_painted(&self) -> bool {
        matches!(self, PaintOutcome::Painted)
    }
}

/// Owns the frame's pixel buffer. The simulation only borrows it for the
/// duration of `fill_pixels`.
#[derive(Debug)]
pub struct PresentationSink {
    buffer: Vec<u8>,
}

impl Default for PresentationSink {
    fn default() -> Self {
        Self {
            buffer: vec![0; FRAME_BYTES],
        }
    }
}

impl PresentationSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paints one frame. Every failure skips the paint and is reported in the
    /// outcome; nothing here can stop the caller's loop.
    pub fn render_frame<S: AsRef<str>>(
        &mut self,
        simulation: &mut dyn Simulation,
        surface: Option<&mut dyn Surface>,
        overlay: &[S],
    ) -> PaintOutcome {
        match self.paint(simulation, surface, overlay) {
            Ok(()) => PaintOutcome::Painted,
            Err(skip) => PaintOutcome::Skipped(skip),
        }
    }

    fn paint<S: AsRef<str>>(
        &mut self,
        simulation: &mut dyn Simulation,
        surface: Option<&mut dyn Surface>,
        overlay: &[S],
    ) -> Result<(), PaintSkip> {
        let surface = surface.ok_or(PaintSkip::NoSurface)?;
        surface.clear()?;

        self.buffer.fill(0);
        simulation.fill_pixels(&mut self.buffer)?;
        draw_overlay(&mut self.buffer, FRAME_WIDTH, FRAME_HEIGHT, overlay);

        surface.put_pixels(&self.buffer)?;
        Ok(())
    }
}

use thiserror::Error;

use super::bindings::Command;

pub const FRAME_WIDTH: u32 = 320;
pub const FRAME_HEIGHT: u32 = 200;
pub const FRAME_BYTES: usize = (FRAME_WIDTH * FRAME_HEIGHT * 4) as usize;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    #[error("simulation is not ready")]
    NotReady,
    #[error("frame buffer holds {actual} bytes, expected {expected}")]
    FrameSize { expected: usize, actual: usize },
    #[error("simulation rejected the call: {reason}")]
    Rejected { reason: String },
}

/// The renderer driven by the frame loop.
///
/// `fill_pixels` receives the RGBA buffer of `FRAME_WIDTH` x `FRAME_HEIGHT`
/// for the duration of the call only. Movement commands take no arguments
/// and compose additively when several fire in one tick.
pub trait Simulation {
    fn fill_pixels(&mut self, frame: &mut [u8]) -> Result<(), SimulationError>;

    fn forward(&mut self) -> Result<(), SimulationError>;
    fn back(&mut self) -> Result<(), SimulationError>;
    fn strafe_left(&mut self) -> Result<(), SimulationError>;
    fn strafe_right(&mut self) -> Result<(), SimulationError>;
    fn turn_left(&mut self) -> Result<(), SimulationError>;
    fn turn_right(&mut self) -> Result<(), SimulationError>;

    fn execute(&mut self, command: Command) -> Result<(), SimulationError> {
        match command {
            Command::Forward => self.forward(),
            Command::Back => self.back(),
            Command::StrafeLeft => self.strafe_left(),
            Command::StrafeRight => self.strafe_right(),
            Command::TurnLeft => self.turn_left(),
            Command::TurnRight => self.turn_right(),
        }
    }
}

use std::cell::Cell;

use super::bindings::Command;
use super::presentation::{Surface, SurfaceError};
use super::scheduler::FrameRequester;
use super::simulation::{Simulation, SimulationError, FRAME_BYTES};

pub(crate) const FILL_BYTE: u8 = 0x5a;

/// Records every call it receives; can be told to fail.
#[derive(Debug, Default)]
pub(crate) struct RecordingSimulation {
    pub commands: Vec<Command>,
    pub fills: usize,
    pub fail_commands: bool,
    pub fail_fill: bool,
}

impl RecordingSimulation {
    pub(crate) fn failing_commands() -> Self {
        Self {
            fail_commands: true,
            ..Self::default()
        }
    }

    pub(crate) fn failing_fill() -> Self {
        Self {
            fail_fill: true,
            ..Self::default()
        }
    }

    pub(crate) fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    fn record(&mut self, command: Command) -> Result<(), SimulationError> {
        if self.fail_commands {
            return Err(SimulationError::NotReady);
        }
        self.commands.push(command);
        Ok(())
    }
}

impl Simulation for RecordingSimulation {
    fn fill_pixels(&mut self, frame: &mut [u8]) -> Result<(), SimulationError> {
        if self.fail_fill {
            return Err(SimulationError::Rejected {
                reason: "fill disabled".to_string(),
            });
        }
        if frame.len() != FRAME_BYTES {
            return Err(SimulationError::FrameSize {
                expected: FRAME_BYTES,
                actual: frame.len(),
            });
        }
        frame.fill(FILL_BYTE);
        self.fills += 1;
        Ok(())
    }

    fn forward(&mut self) -> Result<(), SimulationError> {
        self.record(Command::Forward)
    }

    fn back(&mut self) -> Result<(), SimulationError> {
        self.record(Command::Back)
    }

    fn strafe_left(&mut self) -> Result<(), SimulationError> {
        self.record(Command::StrafeLeft)
    }

    fn strafe_right(&mut self) -> Result<(), SimulationError> {
        self.record(Command::StrafeRight)
    }

    fn turn_left(&mut self) -> Result<(), SimulationError> {
        self.record(Command::TurnLeft)
    }

    fn turn_right(&mut self) -> Result<(), SimulationError> {
        self.record(Command::TurnRight)
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingSurface {
    pub clears: usize,
    pub last_frame: Option<Vec<u8>>,
    pub fail_clear: bool,
    pub fail_put: bool,
}

impl Surface for RecordingSurface {
    fn clear(&mut self) -> Result<(), SurfaceError> {
        if self.fail_clear {
            return Err(SurfaceError::Unavailable);
        }
        self.clears += 1;
        Ok(())
    }

    fn put_pixels(&mut self, frame: &[u8]) -> Result<(), SurfaceError> {
        if self.fail_put {
            return Err(SurfaceError::Backend {
                message: "lost device".to_string(),
            });
        }
        self.last_frame = Some(frame.to_vec());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub(crate) struct CountingRequester {
    pub requests: Cell<usize>,
}

impl FrameRequester for CountingRequester {
    fn request_next_frame(&self) {
        self.requests.set(self.requests.get() + 1);
    }
}

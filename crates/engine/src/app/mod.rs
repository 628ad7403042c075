mod bindings;
mod config;
mod direction;
mod input;
mod loop_runner;
mod metrics;
mod presentation;
mod scheduler;
mod simulation;
#[cfg(test)]
mod test_support;
mod tools;
mod virtual_stick;

pub use bindings::{
    BindingPreset, BindingSet, Command, CommandBinding, CommandDispatcher, DispatchError, Trigger,
    LEFT_STICK_ID, RIGHT_STICK_ID, SINGLE_STICK_ID,
};
pub use config::{ConfigError, LoopConfig, BINDINGS_ENV_VAR, OVERLAY_ENV_VAR};
pub use direction::{classify, classify_vector, Direction, JoystickReading, DEFAULT_DEAD_ZONE};
pub use input::{InputEvent, InputStateStore, InputValue};
pub use loop_runner::{run_app, run_app_with_metrics, AppError};
pub use metrics::MetricsHandle;
pub use presentation::{PaintOutcome, PaintSkip, PresentationSink, Surface, SurfaceError};
pub use scheduler::{FrameLoop, FrameRequester, TickReport};
pub use simulation::{Simulation, SimulationError, FRAME_BYTES, FRAME_HEIGHT, FRAME_WIDTH};
pub use tools::{FrameStats, FrameStatsSummary, FRAME_STATS_WINDOW_LEN};

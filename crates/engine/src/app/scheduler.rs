use std::time::Duration;

use tracing::{debug, info, warn};

use super::bindings::{Command, CommandDispatcher, DispatchError};
use super::input::InputStateStore;
use super::metrics::{LogThrottle, MetricsHandle};
use super::presentation::{PaintOutcome, PaintSkip, PresentationSink, Surface};
use super::simulation::Simulation;
use super::tools::{FrameStats, FrameStatsSummary};

/// Host primitive that schedules one more tick at the next display refresh.
pub trait FrameRequester {
    fn request_next_frame(&self);
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub sample_fps: Option<f64>,
    pub summary: FrameStatsSummary,
    pub commands: Vec<Command>,
    pub command_error: Option<DispatchError>,
    /// `None` when a failed command ended the tick before painting.
    pub paint: Option<PaintOutcome>,
    /// The periodic stats line was logged on this tick.
    pub stats_logged: bool,
}

#[derive(Debug, Default)]
struct FailureStreak {
    consecutive: u64,
}

impl FailureStreak {
    /// True when this failure starts a new streak.
    fn record_failure(&mut self) -> bool {
        self.consecutive += 1;
        self.consecutive == 1
    }

    /// Length of the streak that just ended, zero if there was none.
    fn record_success(&mut self) -> u64 {
        std::mem::take(&mut self.consecutive)
    }
}

/// Display-driven loop: one `tick` per presented frame, each tick running to
/// completion before the next one is requested.
///
/// The loop is running from construction until the host stops calling it.
#[derive(Debug)]
pub struct FrameLoop {
    dispatcher: CommandDispatcher,
    stats: FrameStats,
    sink: PresentationSink,
    metrics: MetricsHandle,
    log_throttle: LogThrottle,
    overlay_enabled: bool,
    ticks: u64,
    command_failures: FailureStreak,
    paint_failures: FailureStreak,
}

impl FrameLoop {
    pub fn new(dispatcher: CommandDispatcher, metrics: MetricsHandle, log_interval: Duration) -> Self {
        Self {
            dispatcher,
            stats: FrameStats::new(),
            sink: PresentationSink::new(),
            metrics,
            log_throttle: LogThrottle::new(log_interval),
            overlay_enabled: true,
            ticks: 0,
            command_failures: FailureStreak::default(),
            paint_failures: FailureStreak::default(),
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn overlay_enabled(&self) -> bool {
        self.overlay_enabled
    }

    pub fn set_overlay_enabled(&mut self, enabled: bool) {
        self.overlay_enabled = enabled;
    }

    /// Runs one tick: stats, command dispatch, paint, publication, then the
    /// request for the next frame. Failures are logged and reported, never
    /// propagated, so the request at the end is always made.
    pub fn tick(
        &mut self,
        now_ms: f64,
        input: &InputStateStore,
        simulation: &mut dyn Simulation,
        surface: Option<&mut dyn Surface>,
        requester: &dyn FrameRequester,
    ) -> TickReport {
        self.ticks += 1;
        let tick = self.ticks;

        let sample_fps = self.stats.record_tick(now_ms);
        let summary = self.stats.summary();

        let (commands, command_error, paint) =
            match self.dispatcher.evaluate_frame(input, simulation) {
                Ok(commands) => {
                    self.note_commands_ok(tick);
                    let paint = self.paint(tick, simulation, surface, &summary);
                    (commands, None, Some(paint))
                }
                Err(error) => {
                    self.note_command_failure(tick, &error);
                    (Vec::new(), Some(error), None)
                }
            };

        self.metrics.publish(summary);
        let stats_logged = self.log_throttle.is_due(now_ms);
        if stats_logged {
            info!(
                latest = summary.latest,
                mean = summary.mean,
                min = summary.min,
                max = summary.max,
                samples = summary.samples,
                tick,
                "frame_stats"
            );
        }

        requester.request_next_frame();

        TickReport {
            tick,
            sample_fps,
            summary,
            commands,
            command_error,
            paint,
            stats_logged,
        }
    }

    fn paint(
        &mut self,
        tick: u64,
        simulation: &mut dyn Simulation,
        surface: Option<&mut dyn Surface>,
        summary: &FrameStatsSummary,
    ) -> PaintOutcome {
        let lines = summary.overlay_lines();
        let overlay: &[String] = if self.overlay_enabled && summary.samples > 0 {
            &lines
        } else {
            &[]
        };
        let outcome = self.sink.render_frame(simulation, surface, overlay);

        match &outcome {
            PaintOutcome::Painted => {
                let failed_ticks = self.paint_failures.record_success();
                if failed_ticks > 0 {
                    info!(tick, failed_ticks, "paint_recovered");
                }
            }
            PaintOutcome::Skipped(PaintSkip::NoSurface) => {
                debug!(tick, "paint_skipped_no_surface");
            }
            PaintOutcome::Skipped(reason) => {
                if self.paint_failures.record_failure() {
                    warn!(tick, error = %reason, "paint_skipped");
                } else {
                    debug!(tick, error = %reason, "paint_skipped");
                }
            }
        }
        outcome
    }

    fn note_commands_ok(&mut self, tick: u64) {
        let failed_ticks = self.command_failures.record_success();
        if failed_ticks > 0 {
            info!(tick, failed_ticks, "commands_recovered");
        }
    }

    fn note_command_failure(&mut self, tick: u64, error: &DispatchError) {
        if self.command_failures.record_failure() {
            warn!(tick, command = %error.command, error = %error.source, "command_failed");
        } else {
            debug!(tick, command = %error.command, error = %error.source, "command_failed");
        }
    }
}

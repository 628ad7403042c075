use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tracing::warn;

use super::tools::FrameStatsSummary;

static METRICS_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_metrics_lock_poison_once(operation: &'static str) {
    if METRICS_LOCK_POISON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        warn!(operation, "metrics lock poisoned; recovered inner value");
    }
}

/// Latest frame statistics, readable from any thread.
#[derive(Clone, Debug)]
pub struct MetricsHandle {
    summary: Arc<RwLock<FrameStatsSummary>>,
}

impl Default for MetricsHandle {
    fn default() -> Self {
        Self {
            summary: Arc::new(RwLock::new(FrameStatsSummary::default())),
        }
    }
}

impl MetricsHandle {
    pub fn snapshot(&self) -> FrameStatsSummary {
        match self.summary.read() {
            Ok(guard) => *guard,
            Err(poisoned) => {
                warn_metrics_lock_poison_once("read");
                *poisoned.into_inner()
            }
        }
    }

    pub(crate) fn publish(&self, summary: FrameStatsSummary) {
        match self.summary.write() {
            Ok(mut guard) => *guard = summary,
            Err(poisoned) => {
                warn_metrics_lock_poison_once("write");
                let mut guard = poisoned.into_inner();
                *guard = summary;
            }
        }
    }
}

/// Says when the periodic stats log line is due, on the frame loop's clock.
#[derive(Debug)]
pub(crate) struct LogThrottle {
    interval_ms: f64,
    last_emit_ms: Option<f64>,
}

impl LogThrottle {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            interval_ms: interval.as_secs_f64() * 1000.0,
            last_emit_ms: None,
        }
    }

    /// The first call only starts the interval.
    pub(crate) fn is_due(&mut self, now_ms: f64) -> bool {
        let Some(last_emit_ms) = self.last_emit_ms else {
            self.last_emit_ms = Some(now_ms);
            return false;
        };
        if now_ms - last_emit_ms < self.interval_ms {
            return false;
        }
        self.last_emit_ms = Some(now_ms);
        true
    }
}

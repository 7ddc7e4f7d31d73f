//! Wall-clock instrumentation for runs.
//!
//! Off unless switched on with [`set_enabled`] or the `MS_TIMING` environment
//! variable. Measurements go to `tracing` at info level.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

static FORCED: AtomicBool = AtomicBool::new(false);

pub fn set_enabled(on: bool) {
    FORCED.store(on, Ordering::Relaxed);
}

pub fn enabled() -> bool {
    FORCED.load(Ordering::Relaxed) || std::env::var_os("MS_TIMING").is_some()
}

/// Measures one labelled span of work.
pub struct Timer {
    label: &'static str,
    since: Option<Instant>,
}

impl Timer {
    /// Begin measuring. The clock is only read when timing is enabled.
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            since: enabled().then(Instant::now),
        }
    }

    /// Seconds since `start`, or `None` when timing was off at start.
    pub fn stop(self) -> Option<f64> {
        self.since.map(|t0| t0.elapsed().as_secs_f64())
    }

    /// As [`Timer::stop`], also emitting an info event.
    pub fn stop_and_log(self) -> Option<f64> {
        let label = self.label;
        let elapsed = self.stop();
        if let Some(secs) = elapsed {
            tracing::info!(label, elapsed_s = secs, "timing");
        }
        elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enabled_timer_reports_elapsed() {
        set_enabled(true);
        let elapsed = Timer::start("unit").stop_and_log();
        assert!(elapsed.is_some_and(|s| s >= 0.0));
    }
}

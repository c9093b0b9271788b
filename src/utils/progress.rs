//! Progress reporting
//!
//! The scan reports the fraction of rows done; the terminal sink draws it
//! as an indicatif bar, the quiet sink drops it.

use indicatif::{ProgressBar, ProgressStyle};

/// Receiver of scan progress
pub trait ProgressSink {
    /// Records progress as a fraction in `[0, 1]`
    fn report(&mut self, fraction: f64);

    /// Called once when the scan ends
    fn finish(&mut self);
}

/// Number of ticks on the terminal bar
const TICKS: u64 = 100;

/// Terminal progress bar
pub struct ProgressTracker {
    bar: ProgressBar,
}

impl ProgressTracker {
    pub fn new(description: &str) -> Self {
        let bar = ProgressBar::new(TICKS);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% ({eta}) {msg}")
            .map(|style| style.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar.set_message(description.to_string());

        ProgressTracker { bar }
    }

    /// A tracker that draws nothing, for tests and redirected output
    pub fn hidden() -> Self {
        ProgressTracker { bar: ProgressBar::hidden() }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl ProgressSink for ProgressTracker {
    fn report(&mut self, fraction: f64) {
        let ticks = (fraction.clamp(0.0, 1.0) * TICKS as f64).round() as u64;
        self.bar.set_position(ticks);
    }

    fn finish(&mut self) {
        self.bar.finish_with_message("done");
    }
}

/// Discards progress, used with `-q`
#[derive(Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _fraction: f64) {}

    fn finish(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fractions_map_onto_ticks() {
        let mut tracker = ProgressTracker::hidden();
        tracker.report(0.5);
        assert_eq!(tracker.position(), 50);
        tracker.report(1.7);
        assert_eq!(tracker.position(), 100);
        tracker.finish();
    }
}

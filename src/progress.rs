//! Progress reporting for the checksum stage.
//!
//! The engine reports progress as a pair of counters through the
//! [`ProgressSink`] trait. [`Progress`] implements it with an indicatif bar
//! that shows elapsed time and an ETA rendered by [`format_time`].
//!
//! Any `Fn(usize, usize) + Send + Sync` closure is also a sink, which keeps
//! tests and embedders free of a terminal dependency.

use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Receiver of `(processed, total)` updates.
///
/// Called on the scan worker thread, so implementations must return quickly
/// (hand off to a UI thread rather than render synchronously).
pub trait ProgressSink: Send + Sync {
    /// Called after each file is checksummed, and once more with
    /// `(total, total)` when the checksum stage finishes.
    fn on_progress(&self, processed: usize, total: usize);
}

impl<F> ProgressSink for F
where
    F: Fn(usize, usize) + Send + Sync,
{
    fn on_progress(&self, processed: usize, total: usize) {
        self(processed, total);
    }
}

/// Render whole seconds from the largest applicable unit down to seconds.
///
/// # Examples
///
/// ```
/// use mirrormatch::progress::format_time;
///
/// assert_eq!(format_time(59), "59s");
/// assert_eq!(format_time(61), "1m 1s");
/// assert_eq!(format_time(3661), "1h 1m 1s");
/// assert_eq!(format_time(90000), "1d 1h 0m 0s");
/// ```
#[must_use]
pub fn format_time(seconds: u64) -> String {
    if seconds < 60 {
        return format!("{seconds}s");
    }
    let (minutes, seconds) = (seconds / 60, seconds % 60);
    if minutes < 60 {
        return format!("{minutes}m {seconds}s");
    }
    let (hours, minutes) = (minutes / 60, minutes % 60);
    if hours < 24 {
        return format!("{hours}h {minutes}m {seconds}s");
    }
    let (days, hours) = (hours / 24, hours % 24);
    format!("{days}d {hours}h {minutes}m {seconds}s")
}

/// Estimated time left, extrapolating the average time per file so far.
///
/// Zero until at least one file has been processed.
#[must_use]
pub fn estimate_remaining(elapsed: Duration, processed: usize, total: usize) -> Duration {
    if processed == 0 {
        return Duration::ZERO;
    }
    let per_file = elapsed.as_secs_f64() / processed as f64;
    Duration::from_secs_f64(per_file * total.saturating_sub(processed) as f64)
}

/// Status line shown under the progress bar.
#[must_use]
pub fn status_line(processed: usize, total: usize, elapsed: Duration) -> String {
    let remaining = estimate_remaining(elapsed, processed, total);
    format!(
        "{} / {} files processed | Elapsed: {} | ETA: {}",
        processed,
        total,
        format_time(elapsed.as_secs()),
        format_time(remaining.as_secs())
    )
}

/// Terminal progress bar for the checksum stage.
pub struct Progress {
    bar: ProgressBar,
    started: Instant,
}

impl Progress {
    /// Create a progress bar on stderr.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, nothing is drawn.
    ///
    /// # Examples
    ///
    /// ```
    /// use mirrormatch::progress::Progress;
    ///
    /// let progress = Progress::new(true);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        let bar = ProgressBar::new(0);
        if quiet {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        bar.set_style(
            ProgressStyle::with_template("[{bar:40.cyan/blue}] {pos}/{len} ({percent}%)\n{msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█>-"),
        );
        bar.set_message(status_line(0, 0, Duration::ZERO));
        Self {
            bar,
            started: Instant::now(),
        }
    }

    /// Stop drawing and leave the final state on screen.
    pub fn finish(&self) {
        self.bar.finish();
    }

    /// Clear the bar, e.g. after cancellation.
    pub fn clear(&self) {
        self.bar.finish_and_clear();
    }

    /// Mark the bar as paused, or restore the normal status line.
    pub fn set_paused(&self, paused: bool) {
        let processed = self.bar.position() as usize;
        let total = self.bar.length().unwrap_or(0) as usize;
        let line = status_line(processed, total, self.started.elapsed());
        if paused {
            self.bar
                .set_message(format!("Paused (press Enter to resume) | {line}"));
        } else {
            self.bar.set_message(line);
        }
    }

    /// The status line currently shown under the bar.
    #[must_use]
    pub fn message(&self) -> String {
        self.bar.message()
    }
}

impl ProgressSink for Progress {
    fn on_progress(&self, processed: usize, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(processed as u64);
        self.bar
            .set_message(status_line(processed, total, self.started.elapsed()));
    }
}

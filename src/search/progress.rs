use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

/// Receives batch progress notifications
pub trait ProgressReporter: Send + Sync {
    /// `processed` of `total` queries are done
    fn report(&self, processed: usize, total: usize);

    /// The batch is complete
    fn finish(&self, _processed: usize) {}
}

/// Discards notifications
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _processed: usize, _total: usize) {}
}

/// Emits one log line per notification
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn report(&self, processed: usize, total: usize) {
        info!("Processed {}/{} queries", processed, total);
    }

    fn finish(&self, processed: usize) {
        info!("Finished searching {} queries", processed);
    }
}

/// Terminal progress bar
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")
        {
            bar.set_style(style);
        }
        Self { bar }
    }

    /// A bar that tracks position without drawing
    pub fn hidden(total: usize) -> Self {
        let bar = ProgressBar::hidden();
        bar.set_length(total as u64);
        Self { bar }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl ProgressReporter for BarProgress {
    fn report(&self, processed: usize, _total: usize) {
        self.bar.set_position(processed as u64);
    }

    fn finish(&self, processed: usize) {
        self.bar.set_position(processed as u64);
        self.bar.finish();
    }
}

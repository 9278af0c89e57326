use std::time::Duration;

use bizfinder_core::Progress;
use indicatif::{ProgressBar, ProgressStyle};

/// Starts a spinner on stderr; it turns into a bar once a total is known.
pub(crate) fn start(prefix: &'static str) -> ProgressBar {
    let progress = ProgressBar::new_spinner();
    apply_spinner_style(&progress);
    progress.set_prefix(prefix);
    progress.enable_steady_tick(Duration::from_millis(120));
    progress
}

/// Reflects one progress event on the bar.
///
/// Status events (no total yet) only replace the message. Per-record events
/// set length and position and show the running kept count.
pub(crate) fn apply(progress: &ProgressBar, event: &Progress) {
    if event.total == 0 {
        progress.set_message(event.status.clone());
        return;
    }

    let total = event.total as u64;
    if progress.length() != Some(total) {
        apply_bar_style(progress);
        progress.set_length(total);
    }
    progress.set_position(event.processed as u64);
    progress.set_message(format!("{} ({} kept)", event.status, event.kept));
}

fn apply_spinner_style(progress: &ProgressBar) {
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {prefix:.bold} {msg}") {
        progress.set_style(style);
    }
}

fn apply_bar_style(progress: &ProgressBar) {
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} {prefix:.bold} [{elapsed_precise}] [{bar:32.cyan/blue}] \
{pos}/{len} ({percent}%) {msg}",
    ) {
        progress.set_style(style.progress_chars("=> "));
    }
}

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown on stderr while a split is running.
///
/// Hidden spinners draw nothing, which keeps `--json` output and
/// non-interactive runs clean.
pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    const TICK_RATE: Duration = Duration::from_millis(80);
    const TEMPLATE: &'static str = "{spinner:.green} {msg}";

    pub fn new(message: impl Into<String>) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template(Self::TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message.into());
        pb.enable_steady_tick(Self::TICK_RATE);
        Spinner { pb }
    }

    pub fn hidden() -> Self {
        Spinner {
            pb: ProgressBar::hidden(),
        }
    }

    /// A visible spinner unless `quiet`
    pub fn for_run(message: impl Into<String>, quiet: bool) -> Self {
        if quiet {
            Self::hidden()
        } else {
            Self::new(message)
        }
    }

    /// Stop the spinner and clear it from the terminal.
    pub fn stop(&self) {
        self.pb.finish_and_clear();
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if !self.pb.is_finished() {
            self.pb.finish_and_clear();
        }
    }
}

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::time::Duration;

/// Spinner shown while a request is outstanding.
///
/// Hidden when stderr is not a terminal, so piped output stays clean.
pub struct RequestSpinner {
    bar: ProgressBar,
}

impl RequestSpinner {
    /// Start spinning with `message` next to the spinner.
    pub fn start(message: &str) -> Self {
        let bar = if console::Term::stderr().is_term() {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        let spinner_style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .expect("progress bar template is a valid static string");
        bar.set_style(spinner_style);
        bar.set_message(format!("{}", style(message).dim()));
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// Stop and erase the spinner line.
    pub fn finish(self) {
        self.bar.finish_and_clear();
    }

    /// Run `fut` with a spinner, clearing it once the future settles.
    pub async fn around<F, T>(message: &str, fut: F) -> T
    where
        F: Future<Output = T>,
    {
        let spinner = Self::start(message);
        let out = fut.await;
        spinner.finish();
        out
    }
}

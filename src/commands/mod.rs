pub mod good_query;
pub mod nutrition_check;

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while a command waits on the network.
pub(crate) fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

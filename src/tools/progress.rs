use indicatif::{ProgressBar, ProgressStyle};
use std::borrow::Cow;

/// 建立統一樣式的進度條
pub fn create_progress_bar(len: u64, message: impl Into<Cow<'static, str>>) -> ProgressBar {
    let progress_bar = ProgressBar::new(len);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .expect("Invalid progress bar template")
            .progress_chars("#>-"),
    );
    progress_bar.set_message(message);
    progress_bar
}

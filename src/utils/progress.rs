//! 终端进度条

use indicatif::{ProgressBar, ProgressStyle};

/// 创建按样本计数的进度条，`position` 为断点续跑时已完成的数量
pub fn item_bar(total: u64, position: u64, message: &str) -> ProgressBar {
    let bar = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({elapsed_precise}, 剩余 {eta})")
    {
        bar.set_style(style.progress_chars("=>-"));
    }
    bar.set_message(message.to_string());
    bar.set_position(position);
    bar
}

//! 元件共用的互動輸入

use crate::tools::invalid_roots;
use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Input};
use rust_i18n::t;
use std::path::PathBuf;

/// 以逗號分隔的資料夾列表
#[must_use]
pub fn parse_roots(input: &str) -> Vec<PathBuf> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

#[must_use]
pub fn format_roots(roots: &[PathBuf]) -> String {
    roots
        .iter()
        .map(|root| root.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn prompt_roots(defaults: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let input: String = Input::new()
        .with_prompt(t!("common.prompt_roots"))
        .default(format_roots(defaults))
        .interact_text()?;

    let roots = parse_roots(&input);
    if roots.is_empty() {
        return Ok(defaults.to_vec());
    }
    Ok(roots)
}

pub fn confirm(prompt: &str) -> Result<bool> {
    let confirmed = Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?;
    Ok(confirmed)
}

/// 提示不存在的根目錄（走訪時會略過）
pub fn warn_invalid_roots(roots: &[PathBuf]) {
    for (root, reason) in invalid_roots(roots) {
        println!(
            "{}",
            style(t!("common.root_skipped", root = root.display(), reason = reason)).yellow()
        );
    }
}

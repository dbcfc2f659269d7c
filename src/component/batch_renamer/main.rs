//! 批次重新命名主模組
//!
//! 協調掃描、預覽、確認與重新命名的整體流程

use super::renamer::{BatchRenamer, RenameOutcome, apply_plan, destination_exists};
use crate::component::prompt::{confirm, format_roots, prompt_roots, warn_invalid_roots};
use crate::config::{Config, RenameSettings};
use crate::tools::write_report;
use anyhow::Result;
use console::style;
use log::info;
use rust_i18n::t;
use std::path::{Path, PathBuf};

/// 預覽時最多顯示的筆數
const PREVIEW_LIMIT: usize = 20;

/// 重新命名的對象
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameProfile {
    Images,
    Videos,
}

/// 批次重新命名元件
pub struct BatchRename {
    config: Config,
    profile: RenameProfile,
}

impl BatchRename {
    pub const fn new(config: Config, profile: RenameProfile) -> Self {
        Self { config, profile }
    }

    fn settings(&self) -> &RenameSettings {
        match self.profile {
            RenameProfile::Images => &self.config.settings.rename_images,
            RenameProfile::Videos => &self.config.settings.rename_videos,
        }
    }

    pub fn run(&self) -> Result<()> {
        let title = match self.profile {
            RenameProfile::Images => t!("rename.title_images"),
            RenameProfile::Videos => t!("rename.title_videos"),
        };
        println!("{}", style(title).cyan().bold());

        let roots = prompt_roots(&self.settings().roots)?;
        warn_invalid_roots(&roots);

        println!("{}", style(t!("common.scanning")).dim());
        let renamer = BatchRenamer::from_settings(self.settings());
        let plan = renamer.plan(&roots);

        if plan.is_empty() {
            println!("{}", style(t!("rename.nothing_to_do")).yellow());
            return Ok(());
        }

        self.display_preview(&plan);

        if !confirm(&t!("rename.confirm"))? {
            println!("{}", style(t!("common.cancelled")).yellow());
            return Ok(());
        }

        let outcome = apply_plan(plan);
        let report_path = self.settings().report_path.clone();
        self.finish(&outcome, &report_path)?;

        Ok(())
    }

    /// 非互動執行：掃描、重新命名、寫出報告並印出摘要
    pub fn execute(&self, roots: &[PathBuf], report_path: &Path) -> Result<RenameOutcome> {
        info!("開始批次重新命名: {}", format_roots(roots));

        let outcome = BatchRenamer::from_settings(self.settings()).execute(roots);
        self.finish(&outcome, report_path)?;

        Ok(outcome)
    }

    fn finish(&self, outcome: &RenameOutcome, report_path: &Path) -> Result<()> {
        write_report(
            report_path,
            &outcome.renamed,
            self.settings().report_format,
        )?;
        self.display_summary(outcome, report_path);
        Ok(())
    }

    fn display_preview(&self, plan: &[(PathBuf, PathBuf)]) {
        println!();
        println!(
            "{}",
            style(t!("rename.preview", count = plan.len())).cyan()
        );
        println!();

        for (original, new_path) in plan.iter().take(PREVIEW_LIMIT) {
            let old_name = original.file_name().unwrap_or_default().to_string_lossy();
            let new_name = new_path.file_name().unwrap_or_default().to_string_lossy();
            let exists = if destination_exists(new_path) {
                style(t!("rename.will_skip").to_string()).yellow().to_string()
            } else {
                String::new()
            };
            println!("  {} -> {} {}", old_name, style(new_name).green(), exists);
        }

        if plan.len() > PREVIEW_LIMIT {
            println!(
                "  {}",
                style(t!("rename.more", count = plan.len() - PREVIEW_LIMIT)).dim()
            );
        }
        println!();
    }

    fn display_summary(&self, outcome: &RenameOutcome, report_path: &Path) {
        println!(
            "{}",
            style(t!(
                "rename.summary",
                count = outcome.renamed.len(),
                report = report_path.display()
            ))
            .green()
        );
        if outcome.skipped_existing > 0 {
            println!(
                "  {}",
                style(t!("rename.skipped", count = outcome.skipped_existing)).yellow()
            );
        }
        if outcome.failed > 0 {
            println!(
                "  {}",
                style(t!("rename.failed", count = outcome.failed)).red()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config() -> Config {
        Config::from_settings(Default::default()).unwrap()
    }

    #[test]
    fn test_video_profile_only_touches_videos() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path();
        fs::write(base.join("show-s01e01.mkv"), "v").unwrap();
        fs::write(base.join("poster-large.jpg"), "i").unwrap();
        let report = base.join("renamed_videos.txt");

        let component = BatchRename::new(config(), RenameProfile::Videos);
        let outcome = component.execute(&[base.to_path_buf()], &report).unwrap();

        assert_eq!(outcome.renamed.len(), 1);
        assert!(base.join("show.mkv").exists());
        assert!(base.join("poster-large.jpg").exists());

        let content = fs::read_to_string(&report).unwrap();
        assert_eq!(
            content,
            format!(
                "{} -> {}\n",
                base.join("show-s01e01.mkv").display(),
                base.join("show.mkv").display()
            )
        );
    }

    #[test]
    fn test_image_profile_writes_empty_report() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path();
        fs::write(base.join("plain.jpg"), "i").unwrap();
        let report = base.join("renamed_images.txt");

        let component = BatchRename::new(config(), RenameProfile::Images);
        let outcome = component.execute(&[base.to_path_buf()], &report).unwrap();

        assert!(outcome.renamed.is_empty());
        assert_eq!(fs::read_to_string(&report).unwrap(), "");
    }
}

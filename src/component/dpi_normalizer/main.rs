//! DPI 正規化主模組

use super::normalizer::{DpiNormalizer, NormalizeResult};
use crate::component::prompt::{confirm, format_roots, prompt_roots, warn_invalid_roots};
use crate::config::Config;
use crate::tools::write_report;
use anyhow::Result;
use console::style;
use log::info;
use rust_i18n::t;
use std::path::{Path, PathBuf};

/// DPI 正規化元件
pub struct DpiNormalization {
    config: Config,
}

impl DpiNormalization {
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<()> {
        println!("{}", style(t!("dpi.title")).cyan().bold());
        println!(
            "{}",
            style(t!("dpi.target", dpi = self.config.settings.dpi.target_dpi)).dim()
        );

        let roots = prompt_roots(&self.config.settings.dpi.roots)?;
        warn_invalid_roots(&roots);

        if !confirm(&t!("dpi.confirm"))? {
            println!("{}", style(t!("common.cancelled")).yellow());
            return Ok(());
        }

        println!("{}", style(t!("common.scanning")).dim());
        let report_path = self.config.settings.dpi.report_path.clone();
        self.execute(&roots, &report_path)?;

        Ok(())
    }

    /// 正規化所有影像；有檔案被改寫時才寫出報告
    pub fn execute(&self, roots: &[PathBuf], report_path: &Path) -> Result<NormalizeResult> {
        info!("開始 DPI 正規化: {}", format_roots(roots));

        let settings = &self.config.settings.dpi;
        let normalizer =
            DpiNormalizer::from_settings(self.config.file_type_table.clone(), settings);
        let result = normalizer.normalize(roots);

        info!(
            "DPI 正規化完成: {} 個改寫, {} 個未變更, {} 個失敗",
            result.changed.len(),
            result.unchanged,
            result.failures.len()
        );

        if result.changed.is_empty() {
            println!(
                "{}",
                style(t!("dpi.nothing_changed", total = result.total())).green()
            );
        } else {
            write_report(report_path, &result.changed, settings.report_format)?;
            println!(
                "{}",
                style(t!(
                    "dpi.summary",
                    changed = result.changed.len(),
                    unchanged = result.unchanged,
                    report = report_path.display()
                ))
                .green()
            );
        }

        if !result.failures.is_empty() {
            println!(
                "  {}",
                style(t!("dpi.failed", count = result.failures.len())).red()
            );
        }

        Ok(result)
    }
}

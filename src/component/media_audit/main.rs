//! 媒體稽核主模組

use super::auditor::{AuditSummary, MediaAuditor};
use crate::component::prompt::{format_roots, prompt_roots, warn_invalid_roots};
use crate::config::{Config, ReportFormat};
use crate::tools::{ProbeOptions, write_report};
use anyhow::Result;
use console::style;
use log::info;
use rust_i18n::t;
use std::path::{Path, PathBuf};

/// 媒體稽核元件
pub struct MediaAudit {
    config: Config,
}

impl MediaAudit {
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<()> {
        println!("{}", style(t!("audit.title")).cyan().bold());

        let roots = prompt_roots(&self.config.settings.audit.roots)?;
        warn_invalid_roots(&roots);

        println!("{}", style(t!("common.scanning")).dim());
        let report_path = self.config.settings.audit.report_path.clone();
        self.execute(&roots, &report_path)?;

        Ok(())
    }

    /// 稽核指定根目錄、寫出報告並印出摘要
    pub fn execute(&self, roots: &[PathBuf], report_path: &Path) -> Result<AuditSummary> {
        info!("開始媒體稽核: {}", format_roots(roots));

        let summary = audit_to_report(
            &self.config,
            roots,
            report_path,
            self.config.settings.audit.report_format,
        )?;

        println!(
            "{}",
            style(t!(
                "audit.summary",
                images = summary.images,
                videos = summary.videos,
                errors = summary.errors,
                report = report_path.display()
            ))
            .green()
        );

        Ok(summary)
    }
}

/// 不含任何終端輸出的稽核流程
pub fn audit_to_report(
    config: &Config,
    roots: &[PathBuf],
    report_path: &Path,
    format: ReportFormat,
) -> Result<AuditSummary> {
    let auditor = MediaAuditor::new(
        config.file_type_table.clone(),
        ProbeOptions::from(&config.settings.probe),
    );

    let records = auditor.audit(roots);
    write_report(report_path, &records, format)?;

    let summary = AuditSummary::from_records(&records);
    info!(
        "稽核完成: {} 個影像, {} 個影片, {} 個錯誤",
        summary.images, summary.videos, summary.errors
    );
    Ok(summary)
}

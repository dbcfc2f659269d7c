use crate::config::ReportFormat;
use crate::tools::ensure_parent_directory;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// 可寫入報告的一筆紀錄
pub trait ReportLine: Serialize {
    /// 純文字格式的單行內容（不含換行）
    fn text_line(&self) -> String;
}

impl ReportLine for PathBuf {
    fn text_line(&self) -> String {
        self.display().to_string()
    }
}

/// 將紀錄依序寫入報告檔（覆寫既有檔案）
pub fn write_report<T: ReportLine>(path: &Path, records: &[T], format: ReportFormat) -> Result<()> {
    ensure_parent_directory(path)?;

    let file = File::create(path)
        .with_context(|| format!("無法建立報告檔: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    for record in records {
        match format {
            ReportFormat::Text => writeln!(writer, "{}", record.text_line())?,
            ReportFormat::JsonLines => {
                serde_json::to_writer(&mut writer, record)
                    .context("無法序列化報告紀錄")?;
                writeln!(writer)?;
            }
        }
    }

    writer
        .flush()
        .with_context(|| format!("無法寫入報告檔: {}", path.display()))?;
    Ok(())
}

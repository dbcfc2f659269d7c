//! 批次重新命名執行器

use super::filename_truncator::truncate_at_first_hyphen;
use crate::config::RenameSettings;
use crate::config::file_type::{extension_set, normalize_extension};
use crate::tools::{ReportLine, create_progress_bar, walk_files};
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// 實際執行過的重新命名
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameEntry {
    pub original_path: PathBuf,
    pub new_path: PathBuf,
}

impl ReportLine for RenameEntry {
    fn text_line(&self) -> String {
        format!(
            "{} -> {}",
            self.original_path.display(),
            self.new_path.display()
        )
    }
}

/// 重新命名結果
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RenameOutcome {
    pub renamed: Vec<RenameEntry>,
    /// 目標檔名已存在而保留原名
    pub skipped_existing: usize,
    pub failed: usize,
}

/// 依第一個連字號截斷檔名的批次重新命名器
pub struct BatchRenamer {
    /// 空集合代表不限副檔名
    extensions: HashSet<String>,
}

impl BatchRenamer {
    pub fn new(extensions: &[String]) -> Self {
        Self {
            extensions: extension_set(extensions),
        }
    }

    pub fn from_settings(settings: &RenameSettings) -> Self {
        Self::new(&settings.extensions)
    }

    fn is_candidate(&self, path: &Path) -> bool {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if !file_name.contains('-') {
            return false;
        }
        if self.extensions.is_empty() {
            return true;
        }

        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.contains(&normalize_extension(ext)))
    }

    /// 計算新路徑；檔名不需變更時回傳 `None`
    #[must_use]
    pub fn new_path_for(path: &Path) -> Option<PathBuf> {
        let file_name = path.file_name()?.to_str()?;
        let new_name = truncate_at_first_hyphen(file_name);
        (new_name != file_name).then(|| path.with_file_name(new_name))
    }

    /// 依走訪順序列出所有候選的 (原路徑, 新路徑)
    pub fn plan(&self, roots: &[PathBuf]) -> Vec<(PathBuf, PathBuf)> {
        walk_files(roots)
            .filter(|path| self.is_candidate(path))
            .filter_map(|path| {
                let path = std::path::absolute(&path).unwrap_or(path);
                Self::new_path_for(&path).map(|new_path| (path, new_path))
            })
            .collect()
    }

    /// 執行重新命名；目標已存在時保留兩個檔案不動
    pub fn execute(&self, roots: &[PathBuf]) -> RenameOutcome {
        let plan = self.plan(roots);
        info!("找到 {} 個待重新命名的檔案", plan.len());
        apply_plan(plan)
    }
}

/// 目標路徑是否已被佔用（懸空的符號連結也算）
pub fn destination_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

pub fn apply_plan(plan: Vec<(PathBuf, PathBuf)>) -> RenameOutcome {
    let mut outcome = RenameOutcome::default();
    let progress_bar = create_progress_bar(plan.len() as u64, "重新命名中...");

    for (original_path, new_path) in plan {
        progress_bar.inc(1);

        if destination_exists(&new_path) {
            debug!("跳過已存在的檔案: {}", new_path.display());
            outcome.skipped_existing += 1;
            continue;
        }

        match fs::rename(&original_path, &new_path) {
            Ok(()) => {
                debug!(
                    "重新命名: {} -> {}",
                    original_path.display(),
                    new_path.display()
                );
                outcome.renamed.push(RenameEntry {
                    original_path,
                    new_path,
                });
            }
            Err(e) => {
                warn!("重新命名失敗 {}: {e}", original_path.display());
                outcome.failed += 1;
            }
        }
    }

    progress_bar.finish_and_clear();
    outcome
}

//! 命令列介面
//!
//! 沒有子命令時進入互動式主選單；子命令可在腳本中直接執行單一工作

use crate::component::{BatchRename, DpiNormalization, MediaAudit, RenameProfile};
use crate::config::{Config, ReportFormat};
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// 整理媒體檔案：稽核、批次重新命名與 DPI 正規化
#[derive(Parser, Debug)]
#[command(name = "media_tidy")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// 顯示除錯日誌
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 稽核影像與影片的中繼資料並寫出報告
    Audit(TaskArgs),

    /// 將影像檔名截斷在第一個連字號之前
    RenameImages(TaskArgs),

    /// 將影片檔名截斷在第一個連字號之前
    RenameVideos(TaskArgs),

    /// 將影像的 DPI 標籤統一改為目標值
    SetDpi(DpiArgs),
}

/// 各工作共用的參數
#[derive(Args, Debug, Default)]
pub struct TaskArgs {
    /// 要走訪的資料夾（預設使用設定檔）
    pub roots: Vec<PathBuf>,

    /// 報告輸出路徑
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 以 JSON Lines 格式輸出報告
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Default)]
pub struct DpiArgs {
    #[command(flatten)]
    pub task: TaskArgs,

    /// 目標 DPI
    #[arg(long)]
    pub target: Option<u32>,

    /// 未宣告 DPI 的影像視為 72 DPI，不補寫標籤
    #[arg(long)]
    pub keep_missing: bool,
}

impl TaskArgs {
    fn roots_or(&self, defaults: &[PathBuf]) -> Vec<PathBuf> {
        if self.roots.is_empty() {
            defaults.to_vec()
        } else {
            self.roots.clone()
        }
    }

    fn output_or(&self, default: &Path) -> PathBuf {
        self.output.clone().unwrap_or_else(|| default.to_path_buf())
    }

    fn format_or(&self, default: ReportFormat) -> ReportFormat {
        if self.json {
            ReportFormat::JsonLines
        } else {
            default
        }
    }
}

/// 執行單一子命令
pub fn execute(command: Commands, mut config: Config) -> Result<()> {
    match command {
        Commands::Audit(args) => {
            let settings = &mut config.settings.audit;
            settings.report_format = args.format_or(settings.report_format);
            let roots = args.roots_or(&settings.roots);
            let report = args.output_or(&settings.report_path);
            MediaAudit::new(config).execute(&roots, &report)?;
        }
        Commands::RenameImages(args) => {
            let settings = &mut config.settings.rename_images;
            settings.report_format = args.format_or(settings.report_format);
            let roots = args.roots_or(&settings.roots);
            let report = args.output_or(&settings.report_path);
            BatchRename::new(config, RenameProfile::Images).execute(&roots, &report)?;
        }
        Commands::RenameVideos(args) => {
            let settings = &mut config.settings.rename_videos;
            settings.report_format = args.format_or(settings.report_format);
            let roots = args.roots_or(&settings.roots);
            let report = args.output_or(&settings.report_path);
            BatchRename::new(config, RenameProfile::Videos).execute(&roots, &report)?;
        }
        Commands::SetDpi(args) => {
            let settings = &mut config.settings.dpi;
            settings.report_format = args.task.format_or(settings.report_format);
            if let Some(target) = args.target {
                anyhow::ensure!(target > 0, "DPI 必須大於 0");
                settings.target_dpi = target;
            }
            if args.keep_missing {
                settings.normalize_missing = false;
            }
            let roots = args.task.roots_or(&settings.roots);
            let report = args.task.output_or(&settings.report_path);
            DpiNormalization::new(config).execute(&roots, &report)?;
        }
    }
    Ok(())
}

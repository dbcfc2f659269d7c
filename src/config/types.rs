use crate::config::file_type::{FileCategory, normalize_extension};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// 預設 DPI（檔案未宣告時的假設值，並非量測值）
pub const DEFAULT_DPI: u32 = 72;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTypeTable {
    #[serde(rename = "IMAGE_FILE")]
    pub image_file: Vec<String>,
    #[serde(rename = "VIDEO_FILE")]
    pub video_file: Vec<String>,
}

impl FileTypeTable {
    /// 依小寫副檔名（不含前導點）判斷類別
    #[must_use]
    pub fn categorize_extension(&self, extension: &str) -> FileCategory {
        let extension = normalize_extension(extension);
        if extension.is_empty() {
            return FileCategory::Other;
        }

        let matches = |list: &[String]| list.iter().any(|e| normalize_extension(e) == extension);

        if matches(&self.image_file) {
            FileCategory::Image
        } else if matches(&self.video_file) {
            FileCategory::Video
        } else {
            FileCategory::Other
        }
    }

    #[must_use]
    pub fn categorize_file(&self, path: &Path) -> FileCategory {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map_or(FileCategory::Other, |ext| self.categorize_extension(ext))
    }

    #[must_use]
    pub fn is_image_file(&self, path: &Path) -> bool {
        self.categorize_file(path) == FileCategory::Image
    }

    #[must_use]
    pub fn is_video_file(&self, path: &Path) -> bool {
        self.categorize_file(path) == FileCategory::Video
    }
}

/// 介面語言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "zh-TW")]
    ZhTw,
}

impl Language {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EnUs => "en-US",
            Self::ZhTw => "zh-TW",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnUs => write!(f, "English"),
            Self::ZhTw => write!(f, "繁體中文"),
        }
    }
}

/// 報告輸出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    /// 每行一筆 `key: value` 或 `old -> new`
    #[default]
    Text,
    /// 每行一筆 JSON 物件
    JsonLines,
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::JsonLines => write!(f, "json_lines"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditSettings {
    pub roots: Vec<PathBuf>,
    pub report_path: PathBuf,
    pub report_format: ReportFormat,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            roots: vec![PathBuf::from(".")],
            report_path: PathBuf::from("media_audit_report.txt"),
            report_format: ReportFormat::Text,
        }
    }
}

/// 批次重新命名設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenameSettings {
    pub roots: Vec<PathBuf>,
    /// 允許的副檔名；空列表代表不限制
    pub extensions: Vec<String>,
    pub report_path: PathBuf,
    pub report_format: ReportFormat,
}

impl RenameSettings {
    #[must_use]
    pub fn images() -> Self {
        Self {
            roots: vec![PathBuf::from("images"), PathBuf::from("thumbnails")],
            extensions: Vec::new(),
            report_path: PathBuf::from("renamed_images.txt"),
            report_format: ReportFormat::Text,
        }
    }

    #[must_use]
    pub fn videos() -> Self {
        Self {
            roots: vec![PathBuf::from("video"), PathBuf::from("3d")],
            extensions: [".mp4", ".mov", ".avi", ".webm", ".mkv"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            report_path: PathBuf::from("renamed_videos.txt"),
            report_format: ReportFormat::Text,
        }
    }
}

impl Default for RenameSettings {
    fn default() -> Self {
        Self::images()
    }
}

fn default_rename_videos() -> RenameSettings {
    RenameSettings::videos()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DpiSettings {
    pub roots: Vec<PathBuf>,
    pub report_path: PathBuf,
    pub report_format: ReportFormat,
    pub target_dpi: u32,
    /// 是否為未宣告 DPI 的檔案補寫標籤
    pub normalize_missing: bool,
}

impl Default for DpiSettings {
    fn default() -> Self {
        Self {
            roots: vec![PathBuf::from(".")],
            report_path: PathBuf::from("images_72dpi.txt"),
            report_format: ReportFormat::Text,
            target_dpi: DEFAULT_DPI,
            normalize_missing: true,
        }
    }
}

/// 外部影片探測程式設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeSettings {
    pub program: PathBuf,
    pub timeout_secs: u64,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ffprobe"),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub audit: AuditSettings,
    #[serde(default)]
    pub rename_images: RenameSettings,
    #[serde(default = "default_rename_videos")]
    pub rename_videos: RenameSettings,
    #[serde(default)]
    pub dpi: DpiSettings,
    #[serde(default)]
    pub probe: ProbeSettings,
    /// 覆寫內建的副檔名表
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_types: Option<FileTypeTable>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            language: Language::default(),
            audit: AuditSettings::default(),
            rename_images: RenameSettings::images(),
            rename_videos: RenameSettings::videos(),
            dpi: DpiSettings::default(),
            probe: ProbeSettings::default(),
            file_types: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub file_type_table: FileTypeTable,
    pub settings: UserSettings,
}

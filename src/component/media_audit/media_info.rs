//! 稽核紀錄
//!
//! 每個影像或影片檔案對應一筆成功或錯誤紀錄，兩者不會同時存在

use crate::config::FileCategory;
use crate::tools::{ImageInfo, MediaResult, ReportLine, VideoInfo};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MediaInfo {
    Image(ImageInfo),
    ImageError { path: PathBuf, error: String },
    Video(VideoInfo),
    VideoError { path: PathBuf, error: String },
}

impl MediaInfo {
    #[must_use]
    pub fn from_image_result(path: &Path, result: MediaResult<ImageInfo>) -> Self {
        match result {
            Ok(info) => Self::Image(info),
            Err(e) => Self::ImageError {
                path: path.to_path_buf(),
                error: e.to_string(),
            },
        }
    }

    #[must_use]
    pub fn from_video_result(path: &Path, result: MediaResult<VideoInfo>) -> Self {
        match result {
            Ok(info) => Self::Video(info),
            Err(e) => Self::VideoError {
                path: path.to_path_buf(),
                error: e.to_string(),
            },
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Image(info) => &info.path,
            Self::Video(info) => &info.path,
            Self::ImageError { path, .. } | Self::VideoError { path, .. } => path,
        }
    }

    #[must_use]
    pub const fn category(&self) -> FileCategory {
        match self {
            Self::Image(_) | Self::ImageError { .. } => FileCategory::Image,
            Self::Video(_) | Self::VideoError { .. } => FileCategory::Video,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::ImageError { error, .. } | Self::VideoError { error, .. } => Some(error),
            Self::Image(_) | Self::Video(_) => None,
        }
    }
}

/// 整數值不顯示小數，其餘保留兩位
fn format_number(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "unknown".to_string(), |v| v.to_string())
}

impl ReportLine for MediaInfo {
    fn text_line(&self) -> String {
        let mut line = format!("type: {} | path: {}", self.category(), self.path().display());

        match self {
            Self::Image(info) => {
                let assumed = if info.dpi_assumed { " (assumed)" } else { "" };
                let _ = write!(
                    line,
                    " | format: {} | width: {} | height: {} | dpi: {}x{}{} | mode: {} | size_kib: {}",
                    info.format,
                    info.width,
                    info.height,
                    format_number(info.dpi_x),
                    format_number(info.dpi_y),
                    assumed,
                    info.color_mode,
                    info.size_kib
                );
            }
            Self::Video(info) => {
                let _ = write!(
                    line,
                    " | width: {} | height: {} | duration: {} | size_mib: {}",
                    optional(info.width),
                    optional(info.height),
                    optional(info.duration_seconds.map(format_number)),
                    info.size_mib
                );
                for (key, value) in &info.extra {
                    let _ = write!(line, " | {key}: {value}");
                }
            }
            Self::ImageError { error, .. } | Self::VideoError { error, .. } => {
                let _ = write!(line, " | error: {error}");
            }
        }

        line
    }
}

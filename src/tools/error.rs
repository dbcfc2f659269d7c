//! 單一檔案處理錯誤
//!
//! 每個檔案的失敗都會被轉成報告中的錯誤紀錄，不會中斷整體掃描

use std::io;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("I/O 錯誤: {0}")]
    Io(#[from] io::Error),

    #[error("無法解析影像: {0}")]
    Decode(#[from] image::ImageError),

    #[error("不支援的格式: {0}")]
    UnsupportedFormat(String),

    #[error("檔案結構損毀: {0}")]
    Malformed(String),

    #[error("無法執行探測程式 {program}: {source}")]
    ProbeSpawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("探測程式執行失敗 ({status}): {stderr}")]
    ProbeFailed { status: String, stderr: String },

    #[error("探測程式逾時（超過 {} 秒）", .0.as_secs_f64())]
    ProbeTimeout(Duration),

    #[error("無法改寫 DPI: {0}")]
    DpiRewrite(String),
}

pub type MediaResult<T> = std::result::Result<T, MediaError>;

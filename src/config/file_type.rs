//! 副檔名分類
//!
//! 將小寫副檔名對應到 image / video / other 三種處理類別

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// 檔案處理類別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Image,
    Video,
    /// 不處理、不列入報告
    Other,
}

impl FileCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 將副檔名正規化為不含前導點的小寫字串
#[must_use]
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

/// 將副檔名列表轉為正規化集合
#[must_use]
pub fn extension_set(extensions: &[String]) -> HashSet<String> {
    extensions
        .iter()
        .map(|ext| normalize_extension(ext))
        .filter(|ext| !ext.is_empty())
        .collect()
}

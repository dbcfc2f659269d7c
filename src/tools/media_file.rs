use crate::config::{FileCategory, FileTypeTable};
use crate::config::file_type::normalize_extension;
use std::path::{Path, PathBuf};

/// 走訪到的檔案及其分類結果，建立後不再變動
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub absolute_path: PathBuf,
    pub category: FileCategory,
    /// 小寫、不含前導點；無副檔名時為空字串
    pub extension: String,
}

impl FileRecord {
    #[must_use]
    pub fn new(path: &Path, file_type_table: &FileTypeTable) -> Self {
        let absolute_path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(normalize_extension)
            .unwrap_or_default();
        let category = file_type_table.categorize_extension(&extension);

        Self {
            absolute_path,
            category,
            extension,
        }
    }

    #[must_use]
    pub fn is_media(&self) -> bool {
        self.category != FileCategory::Other
    }
}

use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 依序走訪多個根目錄下的所有檔案（惰性產生）
///
/// 每個目錄內依檔名排序，不跟隨符號連結。無法讀取的目錄或不存在的根目錄
/// 只記錄警告並略過，不會中斷走訪。
pub fn walk_files<P: AsRef<Path>>(roots: &[P]) -> impl Iterator<Item = PathBuf> + '_ {
    roots.iter().flat_map(|root| walk_root(root.as_ref()))
}

fn walk_root(root: &Path) -> impl Iterator<Item = PathBuf> + use<> {
    debug!("走訪目錄: {}", root.display());

    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                let location = e
                    .path()
                    .map_or_else(|| "?".to_string(), |p| p.display().to_string());
                warn!("略過無法讀取的路徑 {location}: {e}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
}

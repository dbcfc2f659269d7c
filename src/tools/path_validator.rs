use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};

pub fn validate_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("路徑不存在: {}", path.display());
    }
    if !path.is_dir() {
        bail!("路徑不是資料夾: {}", path.display());
    }
    Ok(())
}

/// 回傳無效的根目錄與原因（走訪時這些根目錄會被略過）
#[must_use]
pub fn invalid_roots(roots: &[PathBuf]) -> Vec<(PathBuf, String)> {
    roots
        .iter()
        .filter_map(|root| {
            validate_directory_exists(root)
                .err()
                .map(|e| (root.clone(), e.to_string()))
        })
        .collect()
}

/// 確保檔案的上層資料夾存在
pub fn ensure_parent_directory(path: &Path) -> Result<()> {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    if !parent.exists() {
        fs::create_dir_all(parent)
            .with_context(|| format!("無法建立資料夾: {}", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_directory() {
        let temp_dir = TempDir::new().unwrap();
        assert!(validate_directory_exists(temp_dir.path()).is_ok());
        assert!(validate_directory_exists(&temp_dir.path().join("missing")).is_err());

        let file = temp_dir.path().join("file.txt");
        fs::write(&file, "x").unwrap();
        assert!(validate_directory_exists(&file).is_err());
    }

    #[test]
    fn test_invalid_roots() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");
        let roots = vec![temp_dir.path().to_path_buf(), missing.clone()];

        let invalid = invalid_roots(&roots);
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].0, missing);
        assert!(!invalid[0].1.is_empty());
    }

    #[test]
    fn test_ensure_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a/b/report.txt");
        ensure_parent_directory(&file).unwrap();
        assert!(temp_dir.path().join("a/b").is_dir());

        ensure_parent_directory(Path::new("report.txt")).unwrap();
    }
}

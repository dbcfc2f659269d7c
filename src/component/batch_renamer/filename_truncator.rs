//! 檔名截斷
//!
//! 保留第一個連字號之前的主檔名與原副檔名；連字號之後的內容全部捨棄

/// 分離主檔名與副檔名（副檔名含前導點）
///
/// 以最後一個點切割，開頭的點屬於主檔名，例如 `.bashrc` 沒有副檔名。
#[must_use]
pub fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(dot) if file_name[..dot].chars().any(|c| c != '.') => {
            (&file_name[..dot], &file_name[dot..])
        }
        _ => (file_name, ""),
    }
}

/// 將主檔名截斷在第一個連字號之前（去除前後空白），副檔名不變
///
/// 主檔名沒有連字號，或截斷後會變成空字串時，回傳原檔名。
#[must_use]
pub fn truncate_at_first_hyphen(file_name: &str) -> String {
    let (base, extension) = split_extension(file_name);

    let Some((head, _)) = base.split_once('-') else {
        return file_name.to_string();
    };

    let head = head.trim();
    if head.is_empty() {
        return file_name.to_string();
    }

    format!("{head}{extension}")
}

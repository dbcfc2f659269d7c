//! 批次重新命名元件
//!
//! 將檔名截斷在第一個連字號之前；目標已存在時保留原檔名

mod filename_truncator;
mod main;
mod renamer;

pub use filename_truncator::{split_extension, truncate_at_first_hyphen};
pub use main::{BatchRename, RenameProfile};
pub use renamer::{BatchRenamer, RenameEntry, RenameOutcome, apply_plan, destination_exists};

//! 媒體檔案稽核元件
//!
//! 走訪資料夾，收集影像尺寸/DPI/格式與影片串流資訊，輸出成純文字報告

mod auditor;
mod main;
mod media_info;

pub use auditor::{AuditSummary, MediaAuditor};
pub use main::{MediaAudit, audit_to_report};
pub use media_info::MediaInfo;

//! 功能元件模組
//!
//! 每個子模組實現一個獨立的功能，包含主要邏輯和專用工具

pub mod batch_renamer;
pub mod dpi_normalizer;
pub mod media_audit;
pub mod prompt;

pub use batch_renamer::{BatchRename, RenameProfile};
pub use dpi_normalizer::DpiNormalization;
pub use media_audit::MediaAudit;

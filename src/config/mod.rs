pub mod file_type;
pub mod load;
pub mod save;
pub mod types;

pub use file_type::FileCategory;
pub use types::{
    AuditSettings, Config, DEFAULT_DPI, DpiSettings, FileTypeTable, Language, ProbeSettings,
    RenameSettings, ReportFormat, UserSettings,
};

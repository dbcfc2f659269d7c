pub mod dpi;
mod error;
mod ffprobe_info;
mod file_scanner;
mod image_info;
mod media_file;
mod path_validator;
mod progress;
mod report_writer;

pub use dpi::{Dpi, DpiTag, read_dpi, write_dpi};
pub use error::{MediaError, MediaResult};
pub use ffprobe_info::{ProbeOptions, VideoInfo, get_video_info, parse_key_values};
pub use file_scanner::walk_files;
pub use image_info::{ImageInfo, color_mode_name, format_name, get_image_info};
pub use media_file::FileRecord;
pub use path_validator::{ensure_parent_directory, invalid_roots, validate_directory_exists};
pub use progress::create_progress_bar;
pub use report_writer::{ReportLine, write_report};

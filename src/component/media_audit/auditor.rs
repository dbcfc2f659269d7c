use super::media_info::MediaInfo;
use crate::config::{FileCategory, FileTypeTable};
use crate::tools::{
    FileRecord, ProbeOptions, create_progress_bar, get_image_info, get_video_info, walk_files,
};
use log::{debug, info};
use std::path::PathBuf;

/// 稽核結果統計
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AuditSummary {
    pub images: usize,
    pub videos: usize,
    pub errors: usize,
}

impl AuditSummary {
    #[must_use]
    pub fn from_records(records: &[MediaInfo]) -> Self {
        records.iter().fold(Self::default(), |mut summary, record| {
            match record.category() {
                FileCategory::Image => summary.images += 1,
                FileCategory::Video => summary.videos += 1,
                FileCategory::Other => {}
            }
            if record.error().is_some() {
                summary.errors += 1;
            }
            summary
        })
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.images + self.videos
    }
}

/// 媒體稽核器：走訪 → 分類 → 取得中繼資料 → 收集
pub struct MediaAuditor {
    file_type_table: FileTypeTable,
    probe_options: ProbeOptions,
}

impl MediaAuditor {
    pub const fn new(file_type_table: FileTypeTable, probe_options: ProbeOptions) -> Self {
        Self {
            file_type_table,
            probe_options,
        }
    }

    /// 走訪並分類，只保留影像與影片
    pub fn collect_records(&self, roots: &[PathBuf]) -> Vec<FileRecord> {
        walk_files(roots)
            .map(|path| FileRecord::new(&path, &self.file_type_table))
            .filter(FileRecord::is_media)
            .collect()
    }

    /// 取得單一檔案的中繼資料；非媒體檔案回傳 `None`
    pub fn inspect(&self, record: &FileRecord) -> Option<MediaInfo> {
        let path = &record.absolute_path;
        debug!("檢查檔案: {}", path.display());

        match record.category {
            FileCategory::Image => Some(MediaInfo::from_image_result(path, get_image_info(path))),
            FileCategory::Video => Some(MediaInfo::from_video_result(
                path,
                get_video_info(path, &self.probe_options),
            )),
            FileCategory::Other => None,
        }
    }

    pub fn audit(&self, roots: &[PathBuf]) -> Vec<MediaInfo> {
        let records = self.collect_records(roots);
        info!("找到 {} 個媒體檔案", records.len());

        let progress_bar = create_progress_bar(records.len() as u64, "讀取中繼資料中...");
        let report: Vec<MediaInfo> = records
            .iter()
            .filter_map(|record| {
                let result = self.inspect(record);
                progress_bar.inc(1);
                result
            })
            .collect();
        progress_bar.finish_and_clear();

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use image::{Rgb, RgbImage};
    use std::fs;
    use tempfile::TempDir;

    fn auditor() -> MediaAuditor {
        let config = Config::from_settings(Default::default()).unwrap();
        let probe_options = ProbeOptions {
            program: PathBuf::from("/nonexistent/ffprobe"),
            timeout: None,
        };
        MediaAuditor::new(config.file_type_table, probe_options)
    }

    #[test]
    fn test_collect_records_ignores_other_files() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path();
        fs::write(base.join("a.jpg"), "x").unwrap();
        fs::write(base.join("b.MKV"), "x").unwrap();
        fs::write(base.join("c.txt"), "x").unwrap();
        fs::write(base.join("jpg"), "x").unwrap();

        let records = auditor().collect_records(&[base.to_path_buf()]);
        let names: Vec<String> = records
            .iter()
            .map(|r| r.absolute_path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.MKV"]);
    }

    #[test]
    fn test_audit_keeps_going_after_failures() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path();
        fs::write(base.join("1-broken.png"), "not a png").unwrap();
        RgbImage::from_pixel(3, 2, Rgb([1, 2, 3]))
            .save(base.join("2-good.png"))
            .unwrap();
        fs::write(base.join("3-clip.mp4"), "not a video").unwrap();

        let report = auditor().audit(&[base.to_path_buf()]);

        assert_eq!(report.len(), 3);
        assert!(matches!(report[0], MediaInfo::ImageError { .. }));
        assert!(matches!(&report[1], MediaInfo::Image(info) if info.width == 3 && info.height == 2));
        assert!(matches!(report[2], MediaInfo::VideoError { .. }));
        assert_eq!(report[0].path(), base.join("1-broken.png"));

        let summary = AuditSummary::from_records(&report);
        assert_eq!(
            summary,
            AuditSummary {
                images: 2,
                videos: 1,
                errors: 2
            }
        );
        assert_eq!(summary.total(), 3);
    }

    #[test]
    fn test_inspect_other_is_none() {
        let config = Config::from_settings(Default::default()).unwrap();
        let record = FileRecord::new(std::path::Path::new("/x/readme.md"), &config.file_type_table);
        assert!(auditor().inspect(&record).is_none());
    }
}

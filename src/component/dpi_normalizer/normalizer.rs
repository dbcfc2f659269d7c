//! DPI 正規化
//!
//! 只改寫解析度欄位並以暫存檔原子替換原檔，像素資料位元組保持不變

use crate::config::{DpiSettings, FileTypeTable};
use crate::tools::{
    DpiTag, MediaError, MediaResult, create_progress_bar, read_dpi, walk_files, write_dpi,
};
use console::style;
use image::{ImageFormat, ImageReader, guess_format};
use log::{debug, info, warn};
use rust_i18n::t;
use std::fs;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// 單一檔案的處理結果
#[derive(Debug, Clone, PartialEq)]
pub enum DpiOutcome {
    Changed { previous: DpiTag },
    Unchanged,
}

/// 批次正規化結果
#[derive(Debug, Default, Clone, PartialEq)]
pub struct NormalizeResult {
    pub changed: Vec<PathBuf>,
    /// 包含處理失敗的檔案
    pub unchanged: usize,
    pub failures: Vec<(PathBuf, String)>,
}

impl NormalizeResult {
    #[must_use]
    pub fn total(&self) -> usize {
        self.changed.len() + self.unchanged
    }
}

pub struct DpiNormalizer {
    file_type_table: FileTypeTable,
    target_dpi: u32,
    normalize_missing: bool,
}

impl DpiNormalizer {
    pub const fn new(file_type_table: FileTypeTable, target_dpi: u32, normalize_missing: bool) -> Self {
        Self {
            file_type_table,
            target_dpi,
            normalize_missing,
        }
    }

    pub fn from_settings(file_type_table: FileTypeTable, settings: &DpiSettings) -> Self {
        Self::new(file_type_table, settings.target_dpi, settings.normalize_missing)
    }

    fn needs_rewrite(&self, format: ImageFormat, tag: DpiTag) -> bool {
        // GIF 無法儲存 DPI
        if format == ImageFormat::Gif {
            return false;
        }
        match tag {
            DpiTag::Declared(dpi) => !dpi.matches(self.target_dpi),
            DpiTag::Missing => self.normalize_missing || !tag.effective().matches(self.target_dpi),
        }
    }

    /// 正規化單一影像檔
    pub fn normalize_file(&self, path: &Path) -> MediaResult<DpiOutcome> {
        let mut bytes = fs::read(path)?;
        let format = guess_format(&bytes)?;

        // 先確認標頭可被解析，再動檔案
        ImageReader::with_format(Cursor::new(bytes.as_slice()), format).into_decoder()?;

        let previous = read_dpi(&bytes, format)?;
        if !self.needs_rewrite(format, previous) {
            return Ok(DpiOutcome::Unchanged);
        }

        write_dpi(&mut bytes, format, self.target_dpi)?;
        replace_file_contents(path, &bytes)?;

        Ok(DpiOutcome::Changed { previous })
    }

    /// 走訪所有影像並正規化；失敗的檔案輸出到 stderr 並計為未變更
    pub fn normalize(&self, roots: &[PathBuf]) -> NormalizeResult {
        let images: Vec<PathBuf> = walk_files(roots)
            .filter(|path| self.file_type_table.is_image_file(path))
            .map(|path| std::path::absolute(&path).unwrap_or(path))
            .collect();
        info!("找到 {} 個影像檔案", images.len());

        let mut result = NormalizeResult::default();
        let progress_bar = create_progress_bar(images.len() as u64, "調整 DPI 中...");

        for path in images {
            match self.normalize_file(&path) {
                Ok(DpiOutcome::Changed { previous }) => {
                    debug!("已改寫 DPI {}: {previous:?}", path.display());
                    result.changed.push(path);
                }
                Ok(DpiOutcome::Unchanged) => {
                    result.unchanged += 1;
                }
                Err(e) => {
                    warn!("處理失敗 {}: {e}", path.display());
                    progress_bar.suspend(|| {
                        eprintln!(
                            "{} {}: {e}",
                            style(t!("dpi.error_prefix")).red().bold(),
                            path.display()
                        );
                    });
                    result.unchanged += 1;
                    result.failures.push((path, e.to_string()));
                }
            }
            progress_bar.inc(1);
        }

        progress_bar.finish_and_clear();
        result
    }
}

/// 寫入同資料夾的暫存檔後改名覆蓋原檔，保留原本的權限
fn replace_file_contents(path: &Path, bytes: &[u8]) -> MediaResult<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = parent.join(format!(".{file_name}.{}.tmp", Uuid::new_v4()));

    let permissions = fs::metadata(path)?.permissions();
    let result: io::Result<()> = (|| {
        fs::write(&temp_path, bytes)?;
        fs::set_permissions(&temp_path, permissions)?;
        fs::rename(&temp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result.map_err(MediaError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::tools::Dpi;
    use crate::tools::dpi::exif_app1_segment;
    use image::codecs::jpeg::{JpegEncoder, PixelDensity};
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    fn table() -> FileTypeTable {
        Config::from_settings(Default::default())
            .unwrap()
            .file_type_table
    }

    fn normalizer() -> DpiNormalizer {
        DpiNormalizer::new(table(), 72, true)
    }

    fn gradient() -> RgbImage {
        RgbImage::from_fn(16, 8, |x, y| Rgb([(x * 16) as u8, (y * 32) as u8, 128]))
    }

    fn png_with_dpi(path: &Path, dpi: Option<u32>) {
        gradient().save(path).unwrap();
        if let Some(dpi) = dpi {
            let mut bytes = fs::read(path).unwrap();
            write_dpi(&mut bytes, ImageFormat::Png, dpi).unwrap();
            fs::write(path, bytes).unwrap();
        }
    }

    fn jpeg_with_dpi(path: &Path, dpi: u16) {
        let mut bytes = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut bytes, 90);
        encoder.set_pixel_density(PixelDensity::dpi(dpi));
        encoder.encode_image(&gradient()).unwrap();
        fs::write(path, bytes).unwrap();
    }

    fn dpi_of(path: &Path) -> DpiTag {
        let bytes = fs::read(path).unwrap();
        read_dpi(&bytes, guess_format(&bytes).unwrap()).unwrap()
    }

    #[test]
    fn test_already_72_is_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("web.png");
        png_with_dpi(&path, Some(72));
        let before = fs::read(&path).unwrap();

        let outcome = normalizer().normalize_file(&path).unwrap();

        assert_eq!(outcome, DpiOutcome::Unchanged);
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_missing_dpi_kept_when_disabled() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("plain.png");
        png_with_dpi(&path, None);
        let before = fs::read(&path).unwrap();

        let outcome = DpiNormalizer::new(table(), 72, false)
            .normalize_file(&path)
            .unwrap();
        assert_eq!(outcome, DpiOutcome::Unchanged);
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_missing_dpi_is_written() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("plain.png");
        png_with_dpi(&path, None);

        let outcome = normalizer().normalize_file(&path).unwrap();

        assert_eq!(
            outcome,
            DpiOutcome::Changed {
                previous: DpiTag::Missing
            }
        );
        assert!(!dpi_of(&path).is_assumed());
        assert!(dpi_of(&path).effective().matches(72));
    }

    #[test]
    fn test_png_rewrite_preserves_pixels() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("print.png");
        png_with_dpi(&path, Some(300));
        let pixels_before = image::open(&path).unwrap().to_rgb8();

        let outcome = normalizer().normalize_file(&path).unwrap();

        assert!(matches!(outcome, DpiOutcome::Changed { .. }));
        assert!(dpi_of(&path).effective().matches(72));
        assert_eq!(image::open(&path).unwrap().to_rgb8(), pixels_before);
    }

    #[test]
    fn test_jpeg_rewrite_only_changes_density_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scan.jpg");
        jpeg_with_dpi(&path, 300);
        let before = fs::read(&path).unwrap();
        assert_eq!(dpi_of(&path), DpiTag::Declared(Dpi::uniform(300)));

        normalizer().normalize_file(&path).unwrap();

        let after = fs::read(&path).unwrap();
        assert_eq!(after.len(), before.len());
        let differing = before.iter().zip(&after).filter(|(a, b)| a != b).count();
        assert!(differing <= 5);
        assert_eq!(dpi_of(&path), DpiTag::Declared(Dpi::uniform(72)));
    }

    #[test]
    fn test_jpeg_exif_resolution_follows_jfif() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("camera.jpg");
        let mut encoded = Vec::new();
        JpegEncoder::new_with_quality(&mut encoded, 90)
            .encode_image(&gradient())
            .unwrap();
        let mut bytes = encoded[..2].to_vec();
        bytes.extend(exif_app1_segment(300, 2));
        bytes.extend_from_slice(&encoded[2..]);
        fs::write(&path, bytes).unwrap();
        let pixels_before = image::open(&path).unwrap().to_rgb8();
        assert_eq!(dpi_of(&path), DpiTag::Declared(Dpi::uniform(300)));

        let outcome = normalizer().normalize_file(&path).unwrap();

        assert!(matches!(outcome, DpiOutcome::Changed { .. }));
        let after = fs::read(&path).unwrap();
        let fields = exif::Reader::new()
            .read_from_container(&mut Cursor::new(&after))
            .unwrap();
        for tag in [exif::Tag::XResolution, exif::Tag::YResolution] {
            let field = fields.get_field(tag, exif::In::PRIMARY).unwrap();
            let exif::Value::Rational(values) = &field.value else {
                panic!("解析度應為 RATIONAL");
            };
            assert_eq!((values[0].num, values[0].denom), (72, 1));
        }
        assert_eq!(dpi_of(&path), DpiTag::Declared(Dpi::uniform(72)));
        assert_eq!(image::open(&path).unwrap().to_rgb8(), pixels_before);
    }

    #[test]
    fn test_corrupted_image_counts_as_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path();
        fs::write(base.join("broken.jpg"), "garbage").unwrap();
        png_with_dpi(&base.join("good.png"), Some(150));
        fs::write(base.join("notes.txt"), "ignored").unwrap();

        let result = normalizer().normalize(&[base.to_path_buf()]);

        assert_eq!(result.changed, vec![base.join("good.png")]);
        assert_eq!(result.unchanged, 1);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].0, base.join("broken.jpg"));
        assert_eq!(result.total(), 2);
        assert_eq!(fs::read_to_string(base.join("broken.jpg")).unwrap(), "garbage");
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("print.png");
        png_with_dpi(&path, Some(300));

        normalizer().normalize_file(&path).unwrap();

        let entries = fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_gif_is_never_rewritten() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("anim.gif");
        gradient().save(&path).unwrap();
        let before = fs::read(&path).unwrap();

        assert_eq!(normalizer().normalize_file(&path).unwrap(), DpiOutcome::Unchanged);
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[cfg(unix)]
    #[test]
    fn test_permissions_preserved() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("print.png");
        png_with_dpi(&path, Some(300));
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        normalizer().normalize_file(&path).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }
}

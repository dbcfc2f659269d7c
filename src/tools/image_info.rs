use crate::tools::dpi::{self, DpiTag};
use crate::tools::error::{MediaError, MediaResult};
use image::{ColorType, ImageDecoder, ImageFormat, ImageReader};
use log::debug;
use serde::Serialize;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// 影像中繼資料
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub format: String,
    pub width: u32,
    pub height: u32,
    pub dpi_x: f64,
    pub dpi_y: f64,
    /// 檔案未宣告 DPI，`dpi_x`/`dpi_y` 為 72 的假設值
    pub dpi_assumed: bool,
    pub color_mode: String,
    pub size_kib: u64,
}

/// 讀取影像標頭（不解碼像素）取得尺寸、格式、色彩模式與 DPI
pub fn get_image_info(path: &Path) -> MediaResult<ImageInfo> {
    let bytes = fs::read(path)?;
    let size_kib = bytes.len() as u64 / 1024;

    let reader = ImageReader::new(Cursor::new(bytes.as_slice())).with_guessed_format()?;
    let format = reader
        .format()
        .ok_or_else(|| MediaError::UnsupportedFormat("無法辨識影像格式".to_string()))?;

    let decoder = reader.into_decoder()?;
    let (width, height) = decoder.dimensions();
    let color_mode = color_mode_name(decoder.color_type());

    let tag = dpi::read_dpi(&bytes, format).unwrap_or_else(|e| {
        debug!("無法讀取 DPI 標籤 {}: {e}", path.display());
        DpiTag::Missing
    });
    let dpi = tag.effective();

    Ok(ImageInfo {
        path: path.to_path_buf(),
        format: format_name(format),
        width,
        height,
        dpi_x: dpi.x,
        dpi_y: dpi.y,
        dpi_assumed: tag.is_assumed(),
        color_mode,
        size_kib,
    })
}

#[must_use]
pub fn format_name(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "JPEG".to_string(),
        ImageFormat::Png => "PNG".to_string(),
        ImageFormat::Gif => "GIF".to_string(),
        ImageFormat::Bmp => "BMP".to_string(),
        ImageFormat::Tiff => "TIFF".to_string(),
        other => format!("{other:?}").to_uppercase(),
    }
}

#[must_use]
pub fn color_mode_name(color_type: ColorType) -> String {
    let name = match color_type {
        ColorType::L8 => "L",
        ColorType::La8 => "LA",
        ColorType::Rgb8 => "RGB",
        ColorType::Rgba8 => "RGBA",
        ColorType::L16 => "I;16",
        ColorType::La16 => "LA;16",
        ColorType::Rgb16 => "RGB;16",
        ColorType::Rgba16 => "RGBA;16",
        ColorType::Rgb32F => "RGB;F",
        ColorType::Rgba32F => "RGBA;F",
        other => return format!("{other:?}"),
    };
    name.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    #[test]
    fn test_png_info_with_assumed_dpi() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("photo.png");
        RgbImage::from_pixel(32, 16, Rgb([10, 20, 30]))
            .save(&path)
            .unwrap();

        let info = get_image_info(&path).unwrap();
        assert_eq!(info.path, path);
        assert_eq!(info.format, "PNG");
        assert_eq!((info.width, info.height), (32, 16));
        assert_eq!(info.color_mode, "RGB");
        assert_eq!((info.dpi_x, info.dpi_y), (72.0, 72.0));
        assert!(info.dpi_assumed);
        assert_eq!(info.size_kib, fs::metadata(&path).unwrap().len() / 1024);
    }

    #[test]
    fn test_declared_dpi_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scan.png");
        RgbImage::new(4, 4).save(&path).unwrap();

        let mut bytes = fs::read(&path).unwrap();
        dpi::write_dpi(&mut bytes, ImageFormat::Png, 300).unwrap();
        fs::write(&path, bytes).unwrap();

        let info = get_image_info(&path).unwrap();
        assert!(!info.dpi_assumed);
        assert_eq!(info.dpi_x.round(), 300.0);
        assert_eq!(info.dpi_y.round(), 300.0);
    }

    #[test]
    fn test_format_detected_from_content_not_extension() {
        let temp_dir = TempDir::new().unwrap();
        let png_path = temp_dir.path().join("real.png");
        RgbImage::new(2, 2).save(&png_path).unwrap();
        let misnamed = temp_dir.path().join("misnamed.jpg");
        fs::copy(&png_path, &misnamed).unwrap();

        let info = get_image_info(&misnamed).unwrap();
        assert_eq!(info.format, "PNG");
    }

    #[test]
    fn test_corrupted_image_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.jpg");
        fs::write(&path, "this is not an image").unwrap();

        let error = get_image_info(&path).unwrap_err();
        assert!(!error.to_string().is_empty());
    }

    #[test]
    fn test_truncated_png_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cut.png");
        RgbImage::new(8, 8).save(&path).unwrap();
        let bytes = fs::read(&path).unwrap();
        fs::write(&path, &bytes[..12]).unwrap();

        assert!(get_image_info(&path).is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let error = get_image_info(&temp_dir.path().join("gone.png")).unwrap_err();
        assert!(matches!(error, MediaError::Io(_)));
    }

    #[test]
    fn test_color_mode_names() {
        assert_eq!(color_mode_name(ColorType::L8), "L");
        assert_eq!(color_mode_name(ColorType::Rgba8), "RGBA");
        assert_eq!(color_mode_name(ColorType::L16), "I;16");
    }
}

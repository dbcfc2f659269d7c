//! DPI 標籤讀寫
//!
//! 直接在原始位元組上讀取或修補各格式的解析度欄位，只動到中繼資料，
//! 像素資料的位元組完全不變。

mod bmp;
mod jpeg;
mod png;
mod tiff;

use crate::config::DEFAULT_DPI;
use crate::tools::error::{MediaError, MediaResult};
use image::ImageFormat;
use serde::Serialize;

/// 每英吋點數（水平、垂直）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Dpi {
    pub x: f64,
    pub y: f64,
}

impl Dpi {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn uniform(value: u32) -> Self {
        Self::new(f64::from(value), f64::from(value))
    }

    /// 四捨五入到整數 DPI
    #[must_use]
    pub fn rounded(self) -> (u32, u32) {
        (round_dpi(self.x), round_dpi(self.y))
    }

    #[must_use]
    pub fn matches(self, target: u32) -> bool {
        self.rounded() == (target, target)
    }

    fn from_centimeters(x: f64, y: f64) -> Self {
        Self::new(x * 2.54, y * 2.54)
    }

    fn from_meters(x: f64, y: f64) -> Self {
        Self::new(x * 0.0254, y * 0.0254)
    }

    fn is_valid(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.x > 0.0 && self.y > 0.0
    }
}

fn round_dpi(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

/// 檔案中的 DPI 宣告
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DpiTag {
    Declared(Dpi),
    /// 未宣告；使用時以 72×72 假設
    Missing,
}

impl DpiTag {
    fn from_dpi(dpi: Dpi) -> Self {
        if dpi.is_valid() {
            Self::Declared(dpi)
        } else {
            Self::Missing
        }
    }

    /// 實際採用的 DPI，未宣告時回傳預設假設值
    #[must_use]
    pub fn effective(self) -> Dpi {
        match self {
            Self::Declared(dpi) => dpi,
            Self::Missing => Dpi::uniform(DEFAULT_DPI),
        }
    }

    #[must_use]
    pub const fn is_assumed(self) -> bool {
        matches!(self, Self::Missing)
    }
}

/// 讀取影像位元組中宣告的 DPI
pub fn read_dpi(bytes: &[u8], format: ImageFormat) -> MediaResult<DpiTag> {
    match format {
        ImageFormat::Jpeg => jpeg::read(bytes),
        ImageFormat::Png => png::read(bytes),
        ImageFormat::Bmp => bmp::read(bytes),
        ImageFormat::Tiff => tiff::read(bytes),
        _ => Ok(DpiTag::Missing),
    }
}

/// 將 DPI 寫入影像位元組（修補既有欄位，必要時插入新的標籤區段）
pub fn write_dpi(bytes: &mut Vec<u8>, format: ImageFormat, dpi: u32) -> MediaResult<()> {
    if dpi == 0 {
        return Err(MediaError::DpiRewrite("DPI 必須大於 0".to_string()));
    }

    match format {
        ImageFormat::Jpeg => jpeg::write(bytes, dpi),
        ImageFormat::Png => png::write(bytes, dpi),
        ImageFormat::Bmp => bmp::write(bytes, dpi),
        ImageFormat::Tiff => tiff::write(bytes, dpi),
        ImageFormat::Gif => Err(MediaError::DpiRewrite("GIF 沒有 DPI 欄位".to_string())),
        other => Err(MediaError::UnsupportedFormat(format!("{other:?}"))),
    }
}

fn read_u16_be(bytes: &[u8], at: usize) -> Option<u16> {
    Some(u16::from_be_bytes(bytes.get(at..at + 2)?.try_into().ok()?))
}

fn read_u32_be(bytes: &[u8], at: usize) -> Option<u32> {
    Some(u32::from_be_bytes(bytes.get(at..at + 4)?.try_into().ok()?))
}

fn write_slice(bytes: &mut [u8], at: usize, value: &[u8]) -> MediaResult<()> {
    let target = bytes
        .get_mut(at..at + value.len())
        .ok_or_else(|| MediaError::Malformed(format!("位移 {at} 超出檔案範圍")))?;
    target.copy_from_slice(value);
    Ok(())
}

/// 測試用：只含 IFD0 解析度欄位的 EXIF APP1 區段（小端序）
#[cfg(test)]
pub(crate) fn exif_app1_segment(resolution: u32, unit: u16) -> Vec<u8> {
    fn entry(tag: u16, kind: u16, value: [u8; 4]) -> Vec<u8> {
        let mut bytes = tag.to_le_bytes().to_vec();
        bytes.extend_from_slice(&kind.to_le_bytes());
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&value);
        bytes
    }

    // 表頭 8 + 個數 2 + 三筆欄位 36 + 下一個 IFD 4
    let rationals_at: u32 = 50;
    let mut tiff = b"II*\0".to_vec();
    tiff.extend_from_slice(&8u32.to_le_bytes());
    tiff.extend_from_slice(&3u16.to_le_bytes());
    tiff.extend(entry(282, 5, rationals_at.to_le_bytes()));
    tiff.extend(entry(283, 5, (rationals_at + 8).to_le_bytes()));
    let unit = unit.to_le_bytes();
    tiff.extend(entry(296, 3, [unit[0], unit[1], 0, 0]));
    tiff.extend_from_slice(&0u32.to_le_bytes());
    for _ in 0..2 {
        tiff.extend_from_slice(&resolution.to_le_bytes());
        tiff.extend_from_slice(&1u32.to_le_bytes());
    }

    let length = u16::try_from(2 + 6 + tiff.len()).unwrap();
    let mut segment = vec![0xFF, 0xE1];
    segment.extend_from_slice(&length.to_be_bytes());
    segment.extend_from_slice(b"Exif\0\0");
    segment.extend(tiff);
    segment
}

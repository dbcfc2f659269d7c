//! BMP：BITMAPINFOHEADER 的每公尺像素數

use super::{Dpi, DpiTag, write_slice};
use crate::tools::error::{MediaError, MediaResult};

const MAGIC: &[u8; 2] = b"BM";
const DIB_HEADER_OFFSET: usize = 14;
const X_PELS_OFFSET: usize = 38;
const Y_PELS_OFFSET: usize = 42;
/// BITMAPCOREHEADER（12 位元組）沒有解析度欄位
const MIN_INFO_HEADER: u32 = 40;

fn read_i32_le(bytes: &[u8], at: usize) -> Option<i32> {
    Some(i32::from_le_bytes(bytes.get(at..at + 4)?.try_into().ok()?))
}

fn has_resolution_fields(bytes: &[u8]) -> MediaResult<bool> {
    if !bytes.starts_with(MAGIC) {
        return Err(MediaError::Malformed("缺少 BMP 標頭".to_string()));
    }

    let header_size = bytes
        .get(DIB_HEADER_OFFSET..DIB_HEADER_OFFSET + 4)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or_else(|| MediaError::Malformed("BMP 標頭被截斷".to_string()))?;

    Ok(header_size >= MIN_INFO_HEADER && bytes.len() >= Y_PELS_OFFSET + 4)
}

pub(super) fn read(bytes: &[u8]) -> MediaResult<DpiTag> {
    if !has_resolution_fields(bytes)? {
        return Ok(DpiTag::Missing);
    }

    let x = read_i32_le(bytes, X_PELS_OFFSET).unwrap_or(0);
    let y = read_i32_le(bytes, Y_PELS_OFFSET).unwrap_or(0);
    Ok(DpiTag::from_dpi(Dpi::from_meters(
        f64::from(x),
        f64::from(y),
    )))
}

pub(super) fn write(bytes: &mut Vec<u8>, dpi: u32) -> MediaResult<()> {
    if !has_resolution_fields(bytes)? {
        return Err(MediaError::DpiRewrite(
            "BMP 標頭沒有解析度欄位".to_string(),
        ));
    }

    let per_meter = (f64::from(dpi) / 0.0254).round() as i32;
    write_slice(bytes, X_PELS_OFFSET, &per_meter.to_le_bytes())?;
    write_slice(bytes, Y_PELS_OFFSET, &per_meter.to_le_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bmp_header(header_size: u32, x: i32, y: i32) -> Vec<u8> {
        let mut bytes = vec![0u8; 54];
        bytes[..2].copy_from_slice(MAGIC);
        bytes[DIB_HEADER_OFFSET..DIB_HEADER_OFFSET + 4].copy_from_slice(&header_size.to_le_bytes());
        bytes[X_PELS_OFFSET..X_PELS_OFFSET + 4].copy_from_slice(&x.to_le_bytes());
        bytes[Y_PELS_OFFSET..Y_PELS_OFFSET + 4].copy_from_slice(&y.to_le_bytes());
        bytes
    }

    #[test]
    fn test_read_declared() {
        let DpiTag::Declared(dpi) = read(&bmp_header(40, 11811, 11811)).unwrap() else {
            panic!("應該有宣告 DPI");
        };
        assert_eq!(dpi.rounded(), (300, 300));
    }

    #[test]
    fn test_zero_resolution_is_missing() {
        assert_eq!(read(&bmp_header(40, 0, 0)).unwrap(), DpiTag::Missing);
    }

    #[test]
    fn test_core_header_has_no_resolution() {
        let bytes = bmp_header(12, 11811, 11811);
        assert_eq!(read(&bytes).unwrap(), DpiTag::Missing);
        let mut bytes = bytes;
        assert!(write(&mut bytes, 72).is_err());
    }

    #[test]
    fn test_write_only_touches_resolution() {
        let original = bmp_header(40, 0, 0);
        let mut bytes = original.clone();

        write(&mut bytes, 72).unwrap();

        assert!(read(&bytes).unwrap().effective().matches(72));
        let changed: Vec<usize> = (0..bytes.len())
            .filter(|&i| bytes[i] != original[i])
            .collect();
        assert!(
            changed
                .iter()
                .all(|&i| (X_PELS_OFFSET..Y_PELS_OFFSET + 4).contains(&i))
        );
    }
}

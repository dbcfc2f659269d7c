//! JPEG：JFIF APP0 密度欄位，沒有時改讀 EXIF 解析度
//!
//! 寫入時兩者都改，避免留下互相矛盾的宣告

use super::{Dpi, DpiTag, read_u16_be, tiff, write_slice};
use crate::tools::error::{MediaError, MediaResult};
use exif::{In, Rational, Reader, Tag, Value};
use log::debug;
use std::io::Cursor;
use std::ops::Range;

const SOI: [u8; 2] = [0xFF, 0xD8];
const APP0: u8 = 0xE0;
const APP1: u8 = 0xE1;
const SOS: u8 = 0xDA;
const EOI: u8 = 0xD9;
const JFIF_IDENTIFIER: &[u8] = b"JFIF\0";
const EXIF_IDENTIFIER: &[u8] = b"Exif\0\0";

const UNIT_INCH: u8 = 1;
const UNIT_CENTIMETER: u8 = 2;

/// SOS 之前的標記區段
#[derive(Debug, Clone, Copy)]
struct Segment {
    /// 0xFF 標記的位置
    offset: usize,
    marker: u8,
    length: usize,
}

impl Segment {
    const fn data_start(&self) -> usize {
        self.offset + 4
    }

    const fn end(&self) -> usize {
        self.offset + 2 + self.length
    }

    fn starts_with(&self, bytes: &[u8], identifier: &[u8]) -> bool {
        bytes.get(self.data_start()..self.data_start() + identifier.len()) == Some(identifier)
    }
}

fn segments(bytes: &[u8]) -> MediaResult<Vec<Segment>> {
    if !bytes.starts_with(&SOI) {
        return Err(MediaError::Malformed("缺少 JPEG SOI 標記".to_string()));
    }

    let mut result = Vec::new();
    let mut pos = SOI.len();
    while pos + 4 <= bytes.len() {
        if bytes[pos] != 0xFF {
            break;
        }

        let marker = bytes[pos + 1];
        match marker {
            // 填充位元組
            0xFF => {
                pos += 1;
                continue;
            }
            SOS | EOI => break,
            0x01 | 0xD0..=0xD7 => {
                pos += 2;
                continue;
            }
            _ => {}
        }

        let Some(length) = read_u16_be(bytes, pos + 2).map(usize::from) else {
            break;
        };
        if length < 2 {
            break;
        }

        let segment = Segment {
            offset: pos,
            marker,
            length,
        };
        if segment.end() > bytes.len() {
            break;
        }
        result.push(segment);
        pos = segment.end();
    }

    Ok(result)
}

/// 找到 JFIF 區段中密度單位欄位的位置
fn find_jfif_units(bytes: &[u8]) -> MediaResult<Option<usize>> {
    Ok(segments(bytes)?
        .into_iter()
        .find(|s| s.marker == APP0 && s.length >= 14 && s.starts_with(bytes, JFIF_IDENTIFIER))
        .map(|s| s.offset + 11))
}

/// EXIF 區段內 TIFF 結構的範圍
fn find_exif_tiff(bytes: &[u8]) -> MediaResult<Option<Range<usize>>> {
    Ok(segments(bytes)?
        .into_iter()
        .find(|s| s.marker == APP1 && s.starts_with(bytes, EXIF_IDENTIFIER))
        .map(|s| s.data_start() + EXIF_IDENTIFIER.len()..s.end()))
}

pub(super) fn read(bytes: &[u8]) -> MediaResult<DpiTag> {
    if let Some(units) = find_jfif_units(bytes)? {
        let x = read_u16_be(bytes, units + 1).map_or(0.0, f64::from);
        let y = read_u16_be(bytes, units + 3).map_or(0.0, f64::from);
        match bytes[units] {
            UNIT_INCH => return Ok(DpiTag::from_dpi(Dpi::new(x, y))),
            UNIT_CENTIMETER => return Ok(DpiTag::from_dpi(Dpi::from_centimeters(x, y))),
            _ => {}
        }
    }

    Ok(read_exif_resolution(bytes).map_or(DpiTag::Missing, DpiTag::from_dpi))
}

fn read_exif_resolution(bytes: &[u8]) -> Option<Dpi> {
    let fields = Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()?;

    let rational = |tag: Tag| match &fields.get_field(tag, In::PRIMARY)?.value {
        Value::Rational(values) => values.first().map(Rational::to_f64),
        _ => None,
    };

    let x = rational(Tag::XResolution)?;
    let y = rational(Tag::YResolution)?;
    let unit = fields
        .get_field(Tag::ResolutionUnit, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .unwrap_or(2);

    match unit {
        2 => Some(Dpi::new(x, y)),
        3 => Some(Dpi::from_centimeters(x, y)),
        _ => None,
    }
}

pub(super) fn write(bytes: &mut Vec<u8>, dpi: u32) -> MediaResult<()> {
    let density = u16::try_from(dpi)
        .map_err(|_| MediaError::DpiRewrite(format!("JPEG 密度超出範圍: {dpi}")))?
        .to_be_bytes();

    // EXIF 先改，插入 JFIF 會移動後面的位置
    if let Some(range) = find_exif_tiff(bytes)? {
        match tiff::patch_resolution(&mut bytes[range], dpi) {
            Ok(true) => {}
            Ok(false) => debug!("EXIF 沒有解析度欄位，只改寫 JFIF"),
            Err(e) => debug!("略過無法解析的 EXIF: {e}"),
        }
    }

    match find_jfif_units(bytes)? {
        Some(units) => {
            write_slice(bytes, units, &[UNIT_INCH])?;
            write_slice(bytes, units + 1, &density)?;
            write_slice(bytes, units + 3, &density)?;
        }
        None => {
            let segment = jfif_segment(density);
            bytes.splice(SOI.len()..SOI.len(), segment);
        }
    }

    Ok(())
}

/// 最小 JFIF 1.01 APP0 區段（無縮圖）
fn jfif_segment(density: [u8; 2]) -> [u8; 18] {
    [
        0xFF, APP0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01, 0x01, UNIT_INCH, density[0],
        density[1], density[0], density[1], 0x00, 0x00,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::dpi::exif_app1_segment;

    fn jpeg_with_jfif(units: u8, x: u16, y: u16) -> Vec<u8> {
        let mut bytes = SOI.to_vec();
        bytes.extend_from_slice(&[0xFF, APP0, 0x00, 0x10]);
        bytes.extend_from_slice(JFIF_IDENTIFIER);
        bytes.extend_from_slice(&[0x01, 0x02, units]);
        bytes.extend_from_slice(&x.to_be_bytes());
        bytes.extend_from_slice(&y.to_be_bytes());
        bytes.extend_from_slice(&[0x00, 0x00]);
        bytes.extend_from_slice(&[0xFF, EOI]);
        bytes
    }

    #[test]
    fn test_read_inch_density() {
        let bytes = jpeg_with_jfif(UNIT_INCH, 300, 200);
        assert_eq!(read(&bytes).unwrap(), DpiTag::Declared(Dpi::new(300.0, 200.0)));
    }

    #[test]
    fn test_read_centimeter_density() {
        let bytes = jpeg_with_jfif(UNIT_CENTIMETER, 100, 100);
        let DpiTag::Declared(dpi) = read(&bytes).unwrap() else {
            panic!("應該有宣告 DPI");
        };
        assert_eq!(dpi.rounded(), (254, 254));
    }

    #[test]
    fn test_aspect_ratio_only_is_missing() {
        let bytes = jpeg_with_jfif(0, 1, 1);
        assert_eq!(read(&bytes).unwrap(), DpiTag::Missing);
    }

    #[test]
    fn test_write_patches_existing_segment() {
        let mut bytes = jpeg_with_jfif(UNIT_CENTIMETER, 118, 118);
        let original_len = bytes.len();

        write(&mut bytes, 72).unwrap();

        assert_eq!(bytes.len(), original_len);
        assert_eq!(read(&bytes).unwrap(), DpiTag::Declared(Dpi::uniform(72)));
    }

    #[test]
    fn test_write_inserts_segment_when_absent() {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, EOI];
        assert_eq!(read(&bytes).unwrap(), DpiTag::Missing);

        write(&mut bytes, 72).unwrap();

        assert_eq!(bytes.len(), 4 + 18);
        assert_eq!(&bytes[..2], &SOI);
        assert_eq!(&bytes[bytes.len() - 2..], &[0xFF, EOI]);
        assert_eq!(read(&bytes).unwrap(), DpiTag::Declared(Dpi::uniform(72)));
    }

    fn exif_resolution(bytes: &[u8]) -> (Rational, Rational, u32) {
        let fields = Reader::new()
            .read_from_container(&mut Cursor::new(bytes))
            .unwrap();
        let rational = |tag| match &fields.get_field(tag, In::PRIMARY).unwrap().value {
            Value::Rational(values) => values[0],
            other => panic!("非預期的型別: {other:?}"),
        };
        let unit = fields
            .get_field(Tag::ResolutionUnit, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .unwrap();
        (rational(Tag::XResolution), rational(Tag::YResolution), unit)
    }

    #[test]
    fn test_write_updates_exif_resolution() {
        // EXIF 宣告 300 DPI，JFIF 只有長寬比
        let aspect_only = jpeg_with_jfif(0, 1, 1);
        let mut bytes = SOI.to_vec();
        bytes.extend(exif_app1_segment(300, 2));
        bytes.extend_from_slice(&aspect_only[SOI.len()..]);
        assert_eq!(read(&bytes).unwrap(), DpiTag::Declared(Dpi::uniform(300)));
        let original_len = bytes.len();

        write(&mut bytes, 72).unwrap();

        assert_eq!(bytes.len(), original_len);
        assert_eq!(read(&bytes).unwrap(), DpiTag::Declared(Dpi::uniform(72)));
        let (x, y, unit) = exif_resolution(&bytes);
        assert_eq!((x.num, x.denom), (72, 1));
        assert_eq!((y.num, y.denom), (72, 1));
        assert_eq!(unit, 2);
    }

    #[test]
    fn test_write_inserts_jfif_after_exif_patch() {
        // 沒有 JFIF，EXIF 以公分宣告
        let mut bytes = SOI.to_vec();
        bytes.extend(exif_app1_segment(118, 3));
        bytes.extend_from_slice(&[0xFF, EOI]);

        write(&mut bytes, 72).unwrap();

        assert!(find_jfif_units(&bytes).unwrap().is_some());
        let (x, _, unit) = exif_resolution(&bytes);
        assert_eq!((x.num, x.denom, unit), (72, 1, 2));
    }

    #[test]
    fn test_not_a_jpeg() {
        assert!(read(b"hello world").is_err());
        let mut bytes = b"hello world".to_vec();
        assert!(write(&mut bytes, 72).is_err());
    }

    #[test]
    fn test_density_out_of_range() {
        let mut bytes = jpeg_with_jfif(UNIT_INCH, 300, 300);
        assert!(write(&mut bytes, 70_000).is_err());
    }
}

//! TIFF：第一個 IFD 的 XResolution / YResolution / ResolutionUnit
//!
//! JPEG 的 EXIF 區塊也是 TIFF 結構，同樣透過這裡修補

use super::{Dpi, DpiTag, write_slice};
use crate::tools::error::{MediaError, MediaResult};

const TAG_X_RESOLUTION: u16 = 282;
const TAG_Y_RESOLUTION: u16 = 283;
const TAG_RESOLUTION_UNIT: u16 = 296;
const TYPE_SHORT: u16 = 3;
const TYPE_RATIONAL: u16 = 5;
const ENTRY_SIZE: usize = 12;

const UNIT_INCH: u16 = 2;
const UNIT_CENTIMETER: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    fn u16(self, bytes: &[u8], at: usize) -> Option<u16> {
        let raw: [u8; 2] = bytes.get(at..at + 2)?.try_into().ok()?;
        Some(match self {
            Self::Little => u16::from_le_bytes(raw),
            Self::Big => u16::from_be_bytes(raw),
        })
    }

    fn u32(self, bytes: &[u8], at: usize) -> Option<u32> {
        let raw: [u8; 4] = bytes.get(at..at + 4)?.try_into().ok()?;
        Some(match self {
            Self::Little => u32::from_le_bytes(raw),
            Self::Big => u32::from_be_bytes(raw),
        })
    }

    fn u16_bytes(self, value: u16) -> [u8; 2] {
        match self {
            Self::Little => value.to_le_bytes(),
            Self::Big => value.to_be_bytes(),
        }
    }

    fn u32_bytes(self, value: u32) -> [u8; 4] {
        match self {
            Self::Little => value.to_le_bytes(),
            Self::Big => value.to_be_bytes(),
        }
    }
}

/// 解析後的第一個 IFD
#[derive(Debug)]
struct Ifd {
    order: ByteOrder,
    offset: usize,
    count: usize,
    x_rational: Option<usize>,
    y_rational: Option<usize>,
    /// (欄位值位置, 目前單位)
    unit: Option<(usize, u16)>,
}

impl Ifd {
    fn entry(&self, index: usize) -> usize {
        self.offset + 2 + index * ENTRY_SIZE
    }

    fn next_pointer(&self) -> usize {
        self.entry(self.count)
    }
}

fn parse(bytes: &[u8]) -> MediaResult<Ifd> {
    let order = match bytes.get(..4) {
        Some([b'I', b'I', 42, 0]) => ByteOrder::Little,
        Some([b'M', b'M', 0, 42]) => ByteOrder::Big,
        _ => return Err(MediaError::Malformed("缺少 TIFF 標頭".to_string())),
    };

    let malformed = || MediaError::Malformed("TIFF IFD 超出檔案範圍".to_string());

    let offset = order
        .u32(bytes, 4)
        .and_then(|offset| usize::try_from(offset).ok())
        .ok_or_else(malformed)?;
    let count = usize::from(order.u16(bytes, offset).ok_or_else(malformed)?);

    let mut ifd = Ifd {
        order,
        offset,
        count,
        x_rational: None,
        y_rational: None,
        unit: None,
    };
    if ifd.next_pointer() + 4 > bytes.len() {
        return Err(malformed());
    }

    for index in 0..count {
        let entry = ifd.entry(index);
        let tag = order.u16(bytes, entry).ok_or_else(malformed)?;
        let kind = order.u16(bytes, entry + 2).ok_or_else(malformed)?;
        let value_at = entry + 8;

        match (tag, kind) {
            (TAG_X_RESOLUTION | TAG_Y_RESOLUTION, TYPE_RATIONAL) => {
                let offset = order
                    .u32(bytes, value_at)
                    .and_then(|offset| usize::try_from(offset).ok())
                    .filter(|offset| offset + 8 <= bytes.len())
                    .ok_or_else(malformed)?;
                if tag == TAG_X_RESOLUTION {
                    ifd.x_rational = Some(offset);
                } else {
                    ifd.y_rational = Some(offset);
                }
            }
            (TAG_RESOLUTION_UNIT, TYPE_SHORT) => {
                let unit = order.u16(bytes, value_at).ok_or_else(malformed)?;
                ifd.unit = Some((value_at, unit));
            }
            _ => {}
        }
    }

    Ok(ifd)
}

fn rational(order: ByteOrder, bytes: &[u8], at: usize) -> f64 {
    let numerator = order.u32(bytes, at).unwrap_or(0);
    let denominator = order.u32(bytes, at + 4).unwrap_or(0);
    if denominator == 0 {
        0.0
    } else {
        f64::from(numerator) / f64::from(denominator)
    }
}

pub(super) fn read(bytes: &[u8]) -> MediaResult<DpiTag> {
    let ifd = parse(bytes)?;
    let (Some(x_at), Some(y_at)) = (ifd.x_rational, ifd.y_rational) else {
        return Ok(DpiTag::Missing);
    };

    let x = rational(ifd.order, bytes, x_at);
    let y = rational(ifd.order, bytes, y_at);
    let unit = ifd.unit.map_or(UNIT_INCH, |(_, unit)| unit);

    Ok(match unit {
        UNIT_INCH => DpiTag::from_dpi(Dpi::new(x, y)),
        UNIT_CENTIMETER => DpiTag::from_dpi(Dpi::from_centimeters(x, y)),
        _ => DpiTag::Missing,
    })
}

/// 就地改寫既有的解析度欄位，不改變長度；沒有 XResolution/YResolution 時回傳 `false`
pub(super) fn patch_resolution(bytes: &mut [u8], dpi: u32) -> MediaResult<bool> {
    let ifd = parse(bytes)?;
    let (Some(x_at), Some(y_at)) = (ifd.x_rational, ifd.y_rational) else {
        return Ok(false);
    };

    let order = ifd.order;
    for at in [x_at, y_at] {
        write_slice(bytes, at, &order.u32_bytes(dpi))?;
        write_slice(bytes, at + 4, &order.u32_bytes(1))?;
    }

    if let Some((at, unit)) = ifd.unit {
        if unit != UNIT_INCH {
            write_slice(bytes, at, &order.u16_bytes(UNIT_INCH))?;
        }
    }

    Ok(true)
}

pub(super) fn write(bytes: &mut Vec<u8>, dpi: u32) -> MediaResult<()> {
    if patch_resolution(bytes, dpi)? {
        return Ok(());
    }
    append_resolution_ifd(bytes, dpi)
}

/// 在檔尾附加含解析度欄位的 IFD0 副本並改指標頭指向它；原本的條帶資料不動
fn append_resolution_ifd(bytes: &mut Vec<u8>, dpi: u32) -> MediaResult<()> {
    let ifd = parse(bytes)?;
    let order = ifd.order;

    let mut entries: Vec<(u16, [u8; ENTRY_SIZE])> = Vec::with_capacity(ifd.count + 3);
    for index in 0..ifd.count {
        let at = ifd.entry(index);
        let mut raw = [0u8; ENTRY_SIZE];
        raw.copy_from_slice(&bytes[at..at + ENTRY_SIZE]);
        let tag = order.u16(&raw, 0).unwrap_or_default();
        if !matches!(
            tag,
            TAG_X_RESOLUTION | TAG_Y_RESOLUTION | TAG_RESOLUTION_UNIT
        ) {
            entries.push((tag, raw));
        }
    }
    let next_ifd = order.u32(bytes, ifd.next_pointer()).unwrap_or(0);

    // IFD 必須從偶數位移開始
    if bytes.len() % 2 == 1 {
        bytes.push(0);
    }
    let new_offset = bytes.len();
    let entry_count = entries.len() + 3;
    let rationals_at = new_offset + 2 + entry_count * ENTRY_SIZE + 4;
    let offset_u32 = |value: usize| {
        u32::try_from(value)
            .map_err(|_| MediaError::DpiRewrite("TIFF 檔案超過 4 GiB".to_string()))
    };

    let entry = |tag: u16, kind: u16, value: [u8; 4]| {
        let mut raw = [0u8; ENTRY_SIZE];
        raw[..2].copy_from_slice(&order.u16_bytes(tag));
        raw[2..4].copy_from_slice(&order.u16_bytes(kind));
        raw[4..8].copy_from_slice(&order.u32_bytes(1));
        raw[8..].copy_from_slice(&value);
        (tag, raw)
    };
    let unit = order.u16_bytes(UNIT_INCH);
    entries.push(entry(
        TAG_X_RESOLUTION,
        TYPE_RATIONAL,
        order.u32_bytes(offset_u32(rationals_at)?),
    ));
    entries.push(entry(
        TAG_Y_RESOLUTION,
        TYPE_RATIONAL,
        order.u32_bytes(offset_u32(rationals_at + 8)?),
    ));
    entries.push(entry(
        TAG_RESOLUTION_UNIT,
        TYPE_SHORT,
        [unit[0], unit[1], 0, 0],
    ));
    entries.sort_by_key(|(tag, _)| *tag);

    let count = u16::try_from(entry_count)
        .map_err(|_| MediaError::DpiRewrite("TIFF IFD 欄位過多".to_string()))?;
    bytes.extend_from_slice(&order.u16_bytes(count));
    for (_, raw) in &entries {
        bytes.extend_from_slice(raw);
    }
    bytes.extend_from_slice(&order.u32_bytes(next_ifd));
    for _ in 0..2 {
        bytes.extend_from_slice(&order.u32_bytes(dpi));
        bytes.extend_from_slice(&order.u32_bytes(1));
    }

    write_slice(bytes, 4, &order.u32_bytes(offset_u32(new_offset)?))
}

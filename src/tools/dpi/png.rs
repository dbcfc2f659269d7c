//! PNG：pHYs 區塊（每公尺像素數）

use super::{Dpi, DpiTag, read_u32_be, write_slice};
use crate::tools::error::{MediaError, MediaResult};

const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const PHYS: &[u8; 4] = b"pHYs";
const IHDR: &[u8; 4] = b"IHDR";
const IEND: &[u8; 4] = b"IEND";
const PHYS_LENGTH: usize = 9;
const UNIT_METER: u8 = 1;

#[derive(Debug, Clone, Copy)]
struct Chunk {
    /// 長度欄位的位置
    offset: usize,
    length: usize,
    kind: [u8; 4],
}

impl Chunk {
    const fn data_start(&self) -> usize {
        self.offset + 8
    }

    const fn end(&self) -> usize {
        self.offset + 12 + self.length
    }
}

fn chunks(bytes: &[u8]) -> MediaResult<Vec<Chunk>> {
    if !bytes.starts_with(&SIGNATURE) {
        return Err(MediaError::Malformed("缺少 PNG 簽章".to_string()));
    }

    let mut result = Vec::new();
    let mut pos = SIGNATURE.len();
    while pos + 8 <= bytes.len() {
        let length = read_u32_be(bytes, pos)
            .and_then(|len| usize::try_from(len).ok())
            .ok_or_else(|| MediaError::Malformed("PNG 區塊長度無效".to_string()))?;
        let mut kind = [0u8; 4];
        kind.copy_from_slice(&bytes[pos + 4..pos + 8]);

        let chunk = Chunk {
            offset: pos,
            length,
            kind,
        };
        if chunk.end() > bytes.len() {
            return Err(MediaError::Malformed(format!(
                "PNG 區塊 {} 被截斷",
                String::from_utf8_lossy(&kind)
            )));
        }

        result.push(chunk);
        if &kind == IEND {
            break;
        }
        pos = chunk.end();
    }

    Ok(result)
}

pub(super) fn read(bytes: &[u8]) -> MediaResult<DpiTag> {
    let Some(phys) = chunks(bytes)?
        .into_iter()
        .find(|c| &c.kind == PHYS && c.length == PHYS_LENGTH)
    else {
        return Ok(DpiTag::Missing);
    };

    let data = phys.data_start();
    if bytes[data + 8] != UNIT_METER {
        return Ok(DpiTag::Missing);
    }

    let x = read_u32_be(bytes, data).map_or(0.0, f64::from);
    let y = read_u32_be(bytes, data + 4).map_or(0.0, f64::from);
    Ok(DpiTag::from_dpi(Dpi::from_meters(x, y)))
}

fn phys_data(dpi: u32) -> [u8; PHYS_LENGTH] {
    let per_meter = (f64::from(dpi) / 0.0254).round() as u32;
    let mut data = [0u8; PHYS_LENGTH];
    data[..4].copy_from_slice(&per_meter.to_be_bytes());
    data[4..8].copy_from_slice(&per_meter.to_be_bytes());
    data[8] = UNIT_METER;
    data
}

fn chunk_crc(kind: &[u8; 4], data: &[u8]) -> [u8; 4] {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(kind);
    hasher.update(data);
    hasher.finalize().to_be_bytes()
}

pub(super) fn write(bytes: &mut Vec<u8>, dpi: u32) -> MediaResult<()> {
    let data = phys_data(dpi);
    let crc = chunk_crc(PHYS, &data);
    let all = chunks(bytes)?;

    if let Some(phys) = all
        .iter()
        .find(|c| &c.kind == PHYS && c.length == PHYS_LENGTH)
    {
        write_slice(bytes, phys.data_start(), &data)?;
        write_slice(bytes, phys.data_start() + PHYS_LENGTH, &crc)?;
        return Ok(());
    }

    let ihdr = all
        .first()
        .filter(|c| &c.kind == IHDR)
        .ok_or_else(|| MediaError::Malformed("PNG 第一個區塊不是 IHDR".to_string()))?;

    let mut chunk = Vec::with_capacity(12 + PHYS_LENGTH);
    chunk.extend_from_slice(&(PHYS_LENGTH as u32).to_be_bytes());
    chunk.extend_from_slice(PHYS);
    chunk.extend_from_slice(&data);
    chunk.extend_from_slice(&crc);

    let at = ihdr.end();
    bytes.splice(at..at, chunk);
    Ok(())
}

//! Radiance HDR (RGBE) format support.
//!
//! Reads and writes RGBE with optional RLE scanlines. Pixels are RGB F32
//! in memory, top row first.

use crate::raw::RawImage2D;
use crate::{IoError, IoResult, Stage};
use std::io::{BufRead, Cursor, Read, Write};
use tex_core::{ElementLayout, Image, PixelDataType};
use tracing::{debug, warn};

const HDR_MAGIC: &str = "#?";
const DEFAULT_FORMAT: &str = "32-bit_rle_rgbe";

fn invalid(message: impl Into<String>) -> IoError {
    IoError::decode(format!("hdr: {}", message.into()))
}

/// Decodes an RGBE image into RGB F32 pixels.
pub fn decode(data: &[u8]) -> IoResult<RawImage2D> {
    let mut reader = Cursor::new(data);
    let (width, height) = read_header(&mut reader)?;
    let available = data.len().saturating_sub(reader.position() as usize);
    let rgbe = read_pixels(&mut reader, width as usize, height as usize, available)?;

    let pixels: Vec<u8> = rgbe
        .chunks_exact(4)
        .flat_map(|p| {
            let (r, g, b) = rgbe_to_f32(p[0], p[1], p[2], p[3]);
            [r, g, b]
        })
        .flat_map(f32::to_le_bytes)
        .collect();
    RawImage2D::new(width, height, ElementLayout::Rgb, PixelDataType::F32, pixels)
}

/// Encodes RGB F32 pixels as run-length encoded RGBE.
pub fn encode(raw: &RawImage2D) -> IoResult<Vec<u8>> {
    if raw.layout != ElementLayout::Rgb || raw.ty != PixelDataType::F32 {
        return Err(IoError::encode(format!(
            "HDR needs rgb f32, got {} {}",
            raw.layout, raw.ty
        )));
    }
    if raw.width == 0 || raw.height == 0 {
        return Err(IoError::encode("HDR needs a non-empty image"));
    }
    let mut out = Vec::new();
    writeln!(out, "{HDR_MAGIC}RADIANCE")?;
    writeln!(out, "FORMAT={DEFAULT_FORMAT}")?;
    writeln!(out)?;
    writeln!(out, "-Y {} +X {}", raw.height, raw.width)?;
    write_pixels(&mut out, raw)?;
    Ok(out)
}

/// Reads an HDR from memory as a single-level 2D image.
pub fn read_from_memory(data: &[u8]) -> IoResult<Image> {
    decode(data)?.into_image()
}

/// Writes layer 0 / mip 0 of an image as HDR.
pub fn write_to_memory(image: &Image) -> IoResult<Vec<u8>> {
    encode(&RawImage2D::from_image(image)?)
}

fn read_header<R: BufRead>(reader: &mut R) -> IoResult<(u32, u32)> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    if !trim_line(&line).starts_with(HDR_MAGIC) {
        return Err(invalid("magic not found"));
    }

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(invalid("missing resolution line"));
        }
        let line = trim_line(&line);
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('+') || line.starts_with('-') {
            return parse_resolution(line).ok_or_else(|| invalid("invalid resolution line"));
        }

        if let Some((key, value)) = line.split_once('=') {
            let value = value.trim();
            match key.trim().to_ascii_uppercase().as_str() {
                "FORMAT" if value.eq_ignore_ascii_case("32-bit_rle_xyze") => {
                    warn!("hdr file is XYZE, reading components as RGB");
                }
                "FORMAT" if !value.eq_ignore_ascii_case(DEFAULT_FORMAT) => {
                    return Err(IoError::UnsupportedFormat(format!("hdr: format {value}")));
                }
                key => debug!(key, value, "hdr header field"),
            }
        }
    }
}

/// Bytes the smallest valid encoding of the pixel data would take.
fn min_encoded_len(width: usize, height: usize, size: usize, use_rle: bool) -> usize {
    if use_rle {
        // Scanline header plus one two-byte run per 127 bytes of each channel.
        let per_row = 4 + 4 * 2 * width.div_ceil(127);
        height.saturating_mul(per_row)
    } else {
        size
    }
}

fn read_pixels<R: Read>(
    reader: &mut R,
    width: usize,
    height: usize,
    available: usize,
) -> IoResult<Vec<u8>> {
    let size = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(4))
        .ok_or(IoError::AllocationFailed {
            requested: usize::MAX,
        })?;
    if size == 0 {
        return Ok(Vec::new());
    }
    if available < 4 {
        return Err(IoError::truncated(Stage::Decode, 4, available));
    }

    let mut first = [0u8; 4];
    reader.read_exact(&mut first)?;

    let use_rle = (8..=0x7fff).contains(&width)
        && first[0] == 2
        && first[1] == 2
        && ((first[2] as usize) << 8 | first[3] as usize) == width;

    let needed = min_encoded_len(width, height, size, use_rle);
    if needed > available {
        return Err(IoError::truncated(Stage::Decode, needed, available));
    }
    let mut rgbe = Vec::new();
    rgbe.try_reserve_exact(size)
        .map_err(|_| IoError::AllocationFailed { requested: size })?;
    rgbe.resize(size, 0);

    if use_rle {
        for (row, scanline) in rgbe.chunks_exact_mut(width * 4).enumerate() {
            let mut header = first;
            if row > 0 {
                reader.read_exact(&mut header)?;
            }
            decode_rle_scanline(reader, width, scanline, header)?;
        }
    } else {
        rgbe[0..4].copy_from_slice(&first);
        reader.read_exact(&mut rgbe[4..])?;
    }
    Ok(rgbe)
}

fn decode_rle_scanline<R: Read>(
    reader: &mut R,
    width: usize,
    out: &mut [u8],
    header: [u8; 4],
) -> IoResult<()> {
    if header[0] != 2 || header[1] != 2 {
        return Err(invalid("RLE header invalid"));
    }
    let encoded_width = ((header[2] as usize) << 8) | (header[3] as usize);
    if encoded_width != width {
        return Err(invalid("RLE width mismatch"));
    }

    let mut channel = vec![0u8; width];
    for c in 0..4 {
        let mut idx = 0usize;
        while idx < width {
            let mut byte = [0u8; 1];
            reader.read_exact(&mut byte)?;
            let count = byte[0] as usize;
            let run = if count > 128 { count - 128 } else { count };
            if run == 0 || idx + run > width {
                return Err(invalid("RLE run overflows scanline"));
            }
            if count > 128 {
                reader.read_exact(&mut byte)?;
                channel[idx..idx + run].fill(byte[0]);
            } else {
                reader.read_exact(&mut channel[idx..idx + run])?;
            }
            idx += run;
        }

        for (x, &v) in channel.iter().enumerate() {
            out[x * 4 + c] = v;
        }
    }
    Ok(())
}

fn write_pixels<W: Write>(writer: &mut W, raw: &RawImage2D) -> IoResult<()> {
    let width = raw.width as usize;
    let use_rle = (8..=0x7fff).contains(&width);

    let floats: Vec<f32> = raw
        .data
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    let mut scanline = vec![0u8; width * 4];
    for row in floats.chunks_exact(width * 3) {
        for (x, px) in row.chunks_exact(3).enumerate() {
            scanline[x * 4..x * 4 + 4].copy_from_slice(&f32_to_rgbe(px[0], px[1], px[2]));
        }

        if use_rle {
            writer.write_all(&[2u8, 2u8, (width >> 8) as u8, (width & 0xFF) as u8])?;
            encode_rle_scanline(writer, width, &scanline)?;
        } else {
            writer.write_all(&scanline)?;
        }
    }
    Ok(())
}

fn encode_rle_scanline<W: Write>(writer: &mut W, width: usize, scanline: &[u8]) -> IoResult<()> {
    let mut channel = vec![0u8; width];
    for c in 0..4 {
        for (x, v) in channel.iter_mut().enumerate() {
            *v = scanline[x * 4 + c];
        }
        writer.write_all(&encode_rle_channel(&channel))?;
    }
    Ok(())
}

fn encode_rle_channel(data: &[u8]) -> Vec<u8> {
    let run_at = |i: usize| {
        let mut run = 1usize;
        while i + run < data.len() && run < 127 && data[i] == data[i + run] {
            run += 1;
        }
        run
    };

    let mut out = Vec::with_capacity(data.len() * 2);
    let mut i = 0usize;
    while i < data.len() {
        let run = run_at(i);
        if run >= 4 {
            out.push((128 + run) as u8);
            out.push(data[i]);
            i += run;
            continue;
        }

        let start = i;
        while i < data.len() && i - start < 128 && run_at(i) < 4 {
            i += 1;
        }
        out.push((i - start) as u8);
        out.extend_from_slice(&data[start..i]);
    }
    out
}

fn f32_to_rgbe(r: f32, g: f32, b: f32) -> [u8; 4] {
    let (r, g, b) = (r.max(0.0), g.max(0.0), b.max(0.0));
    let max = r.max(g).max(b);
    if max < 1.0e-32 {
        return [0, 0, 0, 0];
    }

    let (m, e) = frexp(max);
    let scale = m * 256.0 / max;
    [
        (r * scale).clamp(0.0, 255.0) as u8,
        (g * scale).clamp(0.0, 255.0) as u8,
        (b * scale).clamp(0.0, 255.0) as u8,
        (e + 128).clamp(0, 255) as u8,
    ]
}

fn rgbe_to_f32(r: u8, g: u8, b: u8, e: u8) -> (f32, f32, f32) {
    if e == 0 {
        return (0.0, 0.0, 0.0);
    }
    let f = 2.0_f32.powi(e as i32 - 136);
    (r as f32 * f, g as f32 * f, b as f32 * f)
}

fn frexp(x: f32) -> (f32, i32) {
    if x == 0.0 {
        return (0.0, 0);
    }
    let e = x.abs().log2().floor() as i32 + 1;
    (x / 2.0_f32.powi(e), e)
}

fn parse_resolution(line: &str) -> Option<(u32, u32)> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != 4 {
        return None;
    }

    let (mut width, mut height) = (0u32, 0u32);
    for pair in parts.chunks_exact(2) {
        let value: u32 = pair[1].parse().ok()?;
        if pair[0].ends_with('X') {
            width = value;
        } else if pair[0].ends_with('Y') {
            height = value;
        }
    }
    (width > 0 && height > 0).then_some((width, height))
}

fn trim_line(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rgb_f32(width: u32, height: u32, values: &[f32]) -> RawImage2D {
        let data = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        RawImage2D::new(width, height, ElementLayout::Rgb, PixelDataType::F32, data).unwrap()
    }

    fn floats(raw: &RawImage2D) -> Vec<f32> {
        raw.data
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect()
    }

    #[test]
    fn parse_resolution_line() {
        assert_eq!(parse_resolution("-Y 2 +X 3"), Some((3, 2)));
        assert_eq!(parse_resolution("+X 4 -Y 5"), Some((4, 5)));
        assert_eq!(parse_resolution("-Y 0 +X 5"), None);
    }

    #[test]
    fn hdr_roundtrip_flat() {
        let values: Vec<f32> = (0..4 * 2 * 3).map(|i| i as f32 / 10.0).collect();
        let raw = rgb_f32(4, 2, &values);
        let back = decode(&encode(&raw).unwrap()).unwrap();
        assert_eq!((back.width, back.height), (4, 2));
        for (a, b) in floats(&back).iter().zip(&values) {
            assert_relative_eq!(*a, *b, epsilon = 0.01 * b.max(0.1));
        }
    }

    #[test]
    fn hdr_roundtrip_rle() {
        // Wide enough for RLE, with runs and literals.
        let values: Vec<f32> = (0..32 * 3 * 3)
            .map(|i| if i % 24 < 12 { 1.0 } else { (i % 7) as f32 * 4.0 })
            .collect();
        let raw = rgb_f32(32, 3, &values);
        let bytes = encode(&raw).unwrap();
        let back = decode(&bytes).unwrap();
        for (a, b) in floats(&back).iter().zip(&values) {
            assert_relative_eq!(*a, *b, epsilon = 0.01 * b.max(0.1));
        }
    }

    #[test]
    fn rle_channel_encoding() {
        let data = [5u8, 5, 5, 5, 5, 1, 2, 3];
        assert_eq!(encode_rle_channel(&data), vec![133, 5, 3, 1, 2, 3]);
    }

    #[test]
    fn rejects_rgba() {
        let raw =
            RawImage2D::new(1, 1, ElementLayout::Rgba, PixelDataType::F32, vec![0; 16]).unwrap();
        assert!(encode(&raw).is_err());
    }

    #[test]
    fn oversized_header_is_truncated() {
        let data = b"#?RADIANCE\nFORMAT=32-bit_rle_rgbe\n\n-Y 2000000 +X 2000000\n\x02\x02";
        assert!(matches!(
            decode(data),
            Err(IoError::Truncated { stage: Stage::Decode, available: 2, .. })
        ));

        // A full RLE scanline header still cannot cover two million rows.
        let mut data = b"#?RADIANCE\n\n-Y 2000000 +X 2000\n".to_vec();
        data.extend_from_slice(&[2, 2, (2000 >> 8) as u8, (2000 & 0xff) as u8, 0, 0]);
        match decode(&data) {
            Err(IoError::Truncated { needed, available, .. }) => {
                assert_eq!(available, 6);
                assert!(needed > 2_000_000);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn flat_pixels_must_fit_input() {
        let mut data = b"#?RADIANCE\n\n-Y 4 +X 4\n".to_vec();
        data.extend_from_slice(&[1u8; 4 * 4 * 4 - 1]);
        assert!(matches!(
            decode(&data),
            Err(IoError::Truncated { needed: 64, available: 63, .. })
        ));
    }

    #[test]
    fn rejects_bad_magic() {
        assert!(decode(b"P6\n1 1\n255\n").is_err());
    }
}

//! Numeric conversion between pixel element types.
//!
//! The engine converts a single component value between any two
//! [`PixelDataType`] tags, and whole texel buffers between any two
//! (layout, type) pairs.
//!
//! # Rules
//!
//! | From | To | Rule |
//! |------|----|------|
//! | any | same type | identity |
//! | UNorm | float | `v / max_u(bits)` |
//! | SNorm | float | `v < 0 ? -(v / min_s) : v / max_s` |
//! | float | UNorm / SNorm | inverse of the above, rounded, clamped to range |
//! | UNorm | UNorm | rescale by ratio of maxima (exact when widening) |
//! | SNorm | SNorm | rescale positive by max ratio, negative by min ratio |
//! | UNorm | SNorm | rescale to destination width, then bias by `min_s` |
//! | SNorm | UNorm | rescale to destination width, then bias by `abs(min_s)` |
//! | integer | plain integer | plain cast (wrapping), no rescaling |
//! | plain integer | any integer | plain cast (wrapping), no rescaling |
//! | plain integer | float | plain numeric cast |
//! | float | plain integer | truncating cast, saturating at the range |
//! | float | float | precision cast |
//!
//! A [`Sample`] whose variant does not match the declared source type is a
//! programmer error and panics.
//!
//! # Example
//!
//! ```rust
//! use tex_core::convert::{convert_sample, Sample};
//! use tex_core::PixelDataType;
//!
//! let v = convert_sample(PixelDataType::UNorm8, PixelDataType::F32, Sample::Unsigned(255));
//! assert_eq!(v, Sample::Float(1.0));
//!
//! let s = convert_sample(PixelDataType::UNorm8, PixelDataType::SNorm8, Sample::Unsigned(0));
//! assert_eq!(s, Sample::Signed(-128));
//! ```

use crate::format::{Channel, ElementLayout, PixelDataType, TypeClass};
use half::f16;

/// One component value, widened to the largest type of its family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    /// Value of a plain or normalized signed integer.
    Signed(i64),
    /// Value of a plain or normalized unsigned integer.
    Unsigned(u64),
    /// Value of a float.
    Float(f64),
}

impl Sample {
    /// Zero of the given type.
    pub fn zero(ty: PixelDataType) -> Self {
        match ty.class() {
            TypeClass::Int | TypeClass::SNorm => Self::Signed(0),
            TypeClass::UInt | TypeClass::UNorm => Self::Unsigned(0),
            TypeClass::Float => Self::Float(0.0),
        }
    }

    /// "Fully opaque" value of the given type, used to fill missing alpha.
    ///
    /// Normalized types use their maximum, plain integers use 1.
    pub fn one(ty: PixelDataType) -> Self {
        match ty.class() {
            TypeClass::Int => Self::Signed(1),
            TypeClass::UInt => Self::Unsigned(1),
            TypeClass::SNorm => Self::Signed(PixelDataType::max_signed(ty.bits())),
            TypeClass::UNorm => Self::Unsigned(PixelDataType::max_unsigned(ty.bits())),
            TypeClass::Float => Self::Float(1.0),
        }
    }

    /// Whether this variant is the one `ty` produces.
    pub fn matches(&self, ty: PixelDataType) -> bool {
        matches!(
            (self, ty.class()),
            (Self::Signed(_), TypeClass::Int | TypeClass::SNorm)
                | (Self::Unsigned(_), TypeClass::UInt | TypeClass::UNorm)
                | (Self::Float(_), TypeClass::Float)
        )
    }

    fn int(self, ty: PixelDataType) -> i128 {
        match self {
            Self::Signed(v) => v as i128,
            Self::Unsigned(v) => v as i128,
            Self::Float(v) => panic!("float sample {v} passed as {ty}"),
        }
    }

    fn float(self, ty: PixelDataType) -> f64 {
        match self {
            Self::Float(v) => v,
            other => panic!("integer sample {other:?} passed as {ty}"),
        }
    }
}

/// Converts one component value from `src` to `dst`.
///
/// # Panics
///
/// Panics if `value` is not the [`Sample`] variant `src` produces.
pub fn convert_sample(src: PixelDataType, dst: PixelDataType, value: Sample) -> Sample {
    assert!(value.matches(src), "sample {value:?} does not match type {src}");
    if src == dst {
        return value;
    }

    let (sb, db) = (src.bits(), dst.bits());
    match (src.class(), dst.class()) {
        // Plain casts of the stored integer.
        (
            TypeClass::Int | TypeClass::UInt | TypeClass::SNorm | TypeClass::UNorm,
            TypeClass::Int | TypeClass::UInt,
        )
        | (TypeClass::Int | TypeClass::UInt, TypeClass::SNorm | TypeClass::UNorm) => {
            cast_int(value.int(src), dst)
        }
        (TypeClass::Int | TypeClass::UInt, TypeClass::Float) => {
            Sample::Float(quantize(dst, value.int(src) as f64))
        }
        (TypeClass::Float, TypeClass::Int | TypeClass::UInt) => float_to_int(value.float(src), dst),
        (TypeClass::Float, TypeClass::Float) => Sample::Float(quantize(dst, value.float(src))),

        // Normalized <-> float.
        (TypeClass::UNorm, TypeClass::Float) => {
            let v = value.int(src) as f64;
            Sample::Float(quantize(dst, v / PixelDataType::max_unsigned(sb) as f64))
        }
        (TypeClass::SNorm, TypeClass::Float) => {
            let v = value.int(src) as f64;
            let f = if v < 0.0 {
                -(v / PixelDataType::min_signed(sb) as f64)
            } else {
                v / PixelDataType::max_signed(sb) as f64
            };
            Sample::Float(quantize(dst, f))
        }
        (TypeClass::Float, TypeClass::UNorm) => {
            let f = value.float(src);
            let f = if f.is_nan() { 0.0 } else { f.clamp(0.0, 1.0) };
            let max = PixelDataType::max_unsigned(db);
            Sample::Unsigned(((f * max as f64).round() as u64).min(max))
        }
        (TypeClass::Float, TypeClass::SNorm) => {
            let f = value.float(src);
            let f = if f.is_nan() { 0.0 } else { f.clamp(-1.0, 1.0) };
            let (min, max) = (PixelDataType::min_signed(db), PixelDataType::max_signed(db));
            let v = if f < 0.0 {
                (f * -(min as f64)).round() as i64
            } else {
                (f * max as f64).round() as i64
            };
            Sample::Signed(v.clamp(min, max))
        }

        // Normalized <-> normalized.
        (TypeClass::UNorm, TypeClass::UNorm) => {
            Sample::Unsigned(rescale_unorm(value.int(src), sb, db))
        }
        (TypeClass::SNorm, TypeClass::SNorm) => {
            Sample::Signed(rescale_snorm(value.int(src), sb, db))
        }
        (TypeClass::UNorm, TypeClass::SNorm) => {
            let u = rescale_unorm(value.int(src), sb, db) as i128;
            Sample::Signed((u + PixelDataType::min_signed(db) as i128) as i64)
        }
        (TypeClass::SNorm, TypeClass::UNorm) => {
            let s = rescale_snorm(value.int(src), sb, db) as i128;
            Sample::Unsigned((s - PixelDataType::min_signed(db) as i128) as u64)
        }
    }
}

fn cast_int(v: i128, dst: PixelDataType) -> Sample {
    let bits = dst.bits();
    if dst.is_signed() {
        let shift = 64 - bits;
        Sample::Signed(((v as i64) << shift) >> shift)
    } else {
        Sample::Unsigned((v as u64) & PixelDataType::max_unsigned(bits))
    }
}

fn float_to_int(f: f64, dst: PixelDataType) -> Sample {
    let bits = dst.bits();
    if dst.is_signed() {
        let (min, max) = (PixelDataType::min_signed(bits), PixelDataType::max_signed(bits));
        Sample::Signed((f as i64).clamp(min, max))
    } else {
        Sample::Unsigned((f as u64).min(PixelDataType::max_unsigned(bits)))
    }
}

fn rescale_unorm(v: i128, src_bits: u32, dst_bits: u32) -> u64 {
    let (ms, md) = (
        PixelDataType::max_unsigned(src_bits) as u128,
        PixelDataType::max_unsigned(dst_bits) as u128,
    );
    (v as u128 * md / ms) as u64
}

fn rescale_snorm(v: i128, src_bits: u32, dst_bits: u32) -> i64 {
    let (num, den) = if v < 0 {
        (PixelDataType::min_signed(dst_bits), PixelDataType::min_signed(src_bits))
    } else {
        (PixelDataType::max_signed(dst_bits), PixelDataType::max_signed(src_bits))
    };
    let scaled = v * num as i128 / den as i128;
    scaled as i64
}

/// Rounds `v` to the precision of float type `ty`.
fn quantize(ty: PixelDataType, v: f64) -> f64 {
    match ty {
        PixelDataType::F16 => f16::from_f64(v).to_f64(),
        PixelDataType::F32 => v as f32 as f64,
        _ => v,
    }
}

/// Reads one little-endian component of type `ty` from the front of `bytes`.
///
/// # Panics
///
/// Panics if `bytes` is shorter than `ty.byte_width()`.
pub fn read_sample(ty: PixelDataType, bytes: &[u8]) -> Sample {
    let b = &bytes[..ty.byte_width()];
    match ty.storage_type() {
        PixelDataType::Int8 => Sample::Signed(b[0] as i8 as i64),
        PixelDataType::Int16 => Sample::Signed(i16::from_le_bytes([b[0], b[1]]) as i64),
        PixelDataType::Int32 => Sample::Signed(i32::from_le_bytes(array4(b)) as i64),
        PixelDataType::Int64 => Sample::Signed(i64::from_le_bytes(array8(b))),
        PixelDataType::UInt8 => Sample::Unsigned(b[0] as u64),
        PixelDataType::UInt16 => Sample::Unsigned(u16::from_le_bytes([b[0], b[1]]) as u64),
        PixelDataType::UInt32 => Sample::Unsigned(u32::from_le_bytes(array4(b)) as u64),
        PixelDataType::UInt64 => Sample::Unsigned(u64::from_le_bytes(array8(b))),
        PixelDataType::F16 => {
            Sample::Float(f16::from_bits(u16::from_le_bytes([b[0], b[1]])).to_f64())
        }
        PixelDataType::F32 => Sample::Float(f32::from_le_bytes(array4(b)) as f64),
        PixelDataType::F64 => Sample::Float(f64::from_le_bytes(array8(b))),
        normalized => unreachable!("{normalized} has no storage type"),
    }
}

/// Writes one component of type `ty` to the front of `out`, little-endian.
///
/// # Panics
///
/// Panics if `out` is too short or `value` does not match `ty`.
pub fn write_sample(ty: PixelDataType, value: Sample, out: &mut [u8]) {
    assert!(value.matches(ty), "sample {value:?} does not match type {ty}");
    let out = &mut out[..ty.byte_width()];
    match (ty.storage_type(), value) {
        (PixelDataType::Int8, Sample::Signed(v)) => out[0] = v as i8 as u8,
        (PixelDataType::Int16, Sample::Signed(v)) => out.copy_from_slice(&(v as i16).to_le_bytes()),
        (PixelDataType::Int32, Sample::Signed(v)) => out.copy_from_slice(&(v as i32).to_le_bytes()),
        (PixelDataType::Int64, Sample::Signed(v)) => out.copy_from_slice(&v.to_le_bytes()),
        (PixelDataType::UInt8, Sample::Unsigned(v)) => out[0] = v as u8,
        (PixelDataType::UInt16, Sample::Unsigned(v)) => {
            out.copy_from_slice(&(v as u16).to_le_bytes())
        }
        (PixelDataType::UInt32, Sample::Unsigned(v)) => {
            out.copy_from_slice(&(v as u32).to_le_bytes())
        }
        (PixelDataType::UInt64, Sample::Unsigned(v)) => out.copy_from_slice(&v.to_le_bytes()),
        (PixelDataType::F16, Sample::Float(v)) => {
            out.copy_from_slice(&f16::from_f64(v).to_bits().to_le_bytes())
        }
        (PixelDataType::F32, Sample::Float(v)) => out.copy_from_slice(&(v as f32).to_le_bytes()),
        (PixelDataType::F64, Sample::Float(v)) => out.copy_from_slice(&v.to_le_bytes()),
        (storage, value) => unreachable!("{value:?} cannot be stored as {storage}"),
    }
}

fn array4(b: &[u8]) -> [u8; 4] {
    [b[0], b[1], b[2], b[3]]
}

fn array8(b: &[u8]) -> [u8; 8] {
    [b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]
}

/// Converts a tightly packed texel buffer between layouts and types.
///
/// Components are matched by channel identity, so `Bgra -> Rgba` swizzles.
/// Colour channels missing from the source are filled with zero, a missing
/// alpha with [`Sample::one`]. Channels missing from the destination are
/// dropped.
///
/// # Panics
///
/// Panics if the two buffers do not hold the same number of texels.
pub fn convert_elements(
    src: &[u8],
    src_layout: ElementLayout,
    src_ty: PixelDataType,
    dst: &mut [u8],
    dst_layout: ElementLayout,
    dst_ty: PixelDataType,
) {
    let src_elem = src_layout.component_count() * src_ty.byte_width();
    let dst_elem = dst_layout.component_count() * dst_ty.byte_width();
    assert_eq!(src.len() % src_elem, 0, "source is not a whole number of texels");
    assert_eq!(
        src.len() / src_elem,
        dst.len() / dst_elem,
        "source and destination texel counts differ"
    );

    if src_layout == dst_layout && src_ty == dst_ty {
        dst.copy_from_slice(src);
        return;
    }

    let mapping: Vec<Option<usize>> = dst_layout
        .channels()
        .iter()
        .map(|&c| src_layout.position(c))
        .collect();
    let (sw, dw) = (src_ty.byte_width(), dst_ty.byte_width());

    for (s, d) in src.chunks_exact(src_elem).zip(dst.chunks_exact_mut(dst_elem)) {
        for (i, (slot, &channel)) in mapping.iter().zip(dst_layout.channels()).enumerate() {
            let value = match slot {
                Some(pos) => convert_sample(src_ty, dst_ty, read_sample(src_ty, &s[pos * sw..])),
                None if channel == Channel::A => Sample::one(dst_ty),
                None => Sample::zero(dst_ty),
            };
            write_sample(dst_ty, value, &mut d[i * dw..]);
        }
    }
}

/// Allocating form of [`convert_elements`].
pub fn convert_buffer(
    src: &[u8],
    src_layout: ElementLayout,
    src_ty: PixelDataType,
    dst_layout: ElementLayout,
    dst_ty: PixelDataType,
) -> Vec<u8> {
    let src_elem = src_layout.component_count() * src_ty.byte_width();
    let texels = src.len() / src_elem;
    let mut out = vec![0u8; texels * dst_layout.component_count() * dst_ty.byte_width()];
    convert_elements(src, src_layout, src_ty, &mut out, dst_layout, dst_ty);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use PixelDataType::*;

    const NORMALIZED: [PixelDataType; 8] =
        [SNorm8, SNorm16, SNorm32, SNorm64, UNorm8, UNorm16, UNorm32, UNorm64];

    fn boundaries(ty: PixelDataType) -> Vec<Sample> {
        let bits = ty.bits();
        if ty.is_signed() {
            vec![
                Sample::Signed(0),
                Sample::Signed(PixelDataType::max_signed(bits)),
                Sample::Signed(PixelDataType::min_signed(bits)),
                Sample::Signed(-1),
                Sample::Signed(1),
            ]
        } else {
            vec![
                Sample::Unsigned(0),
                Sample::Unsigned(PixelDataType::max_unsigned(bits)),
                Sample::Unsigned(1),
            ]
        }
    }

    fn sample_for(ty: PixelDataType) -> Sample {
        match ty.class() {
            TypeClass::Int | TypeClass::SNorm => Sample::Signed(-3),
            TypeClass::UInt | TypeClass::UNorm => Sample::Unsigned(7),
            TypeClass::Float => Sample::Float(0.5),
        }
    }

    #[test]
    fn every_pair_is_mapped() {
        for src in PixelDataType::ALL {
            for dst in PixelDataType::ALL {
                let out = convert_sample(src, dst, sample_for(src));
                assert!(out.matches(dst), "{src} -> {dst} produced {out:?}");
            }
        }
    }

    #[test]
    fn identity_for_same_type() {
        for ty in PixelDataType::ALL {
            let v = sample_for(ty);
            assert_eq!(convert_sample(ty, ty, v), v);
        }
    }

    #[test]
    fn unorm_to_float_range() {
        assert_eq!(convert_sample(UNorm8, F32, Sample::Unsigned(0)), Sample::Float(0.0));
        assert_eq!(convert_sample(UNorm8, F32, Sample::Unsigned(255)), Sample::Float(1.0));
        assert_eq!(convert_sample(UNorm16, F64, Sample::Unsigned(65535)), Sample::Float(1.0));
    }

    #[test]
    fn snorm_to_float_range() {
        assert_eq!(convert_sample(SNorm8, F32, Sample::Signed(-128)), Sample::Float(-1.0));
        assert_eq!(convert_sample(SNorm8, F32, Sample::Signed(127)), Sample::Float(1.0));
        let Sample::Float(f) = convert_sample(SNorm8, F64, Sample::Signed(-64)) else {
            panic!("expected float");
        };
        assert_relative_eq!(f, -0.5);
    }

    #[test]
    fn normalized_float_symmetry_8_and_16_bit() {
        for ty in [UNorm8, SNorm8, UNorm16, SNorm16] {
            let bits = ty.bits();
            let range: Box<dyn Iterator<Item = Sample>> = if ty.is_signed() {
                Box::new(
                    (PixelDataType::min_signed(bits)..=PixelDataType::max_signed(bits))
                        .map(Sample::Signed),
                )
            } else {
                Box::new((0..=PixelDataType::max_unsigned(bits)).map(Sample::Unsigned))
            };
            for v in range {
                for float in [F32, F64] {
                    let f = convert_sample(ty, float, v);
                    assert_eq!(convert_sample(float, ty, f), v, "{ty} via {float}");
                }
            }
        }
    }

    #[test]
    fn normalized_float_symmetry_boundaries() {
        for ty in NORMALIZED {
            for v in boundaries(ty) {
                let f = convert_sample(ty, F64, v);
                assert_eq!(convert_sample(F64, ty, f), v, "{ty} boundary {v:?}");
            }
        }
    }

    #[test]
    fn unorm32_symmetry_through_f64() {
        for v in (0..=u32::MAX as u64).step_by(65_521) {
            let f = convert_sample(UNorm32, F64, Sample::Unsigned(v));
            assert_eq!(convert_sample(F64, UNorm32, f), Sample::Unsigned(v));
        }
    }

    #[test]
    fn bias_roundtrip_all_u8() {
        for v in 0..=255u64 {
            let s = convert_sample(UNorm8, SNorm8, Sample::Unsigned(v));
            assert_eq!(s, Sample::Signed(v as i64 - 128));
            assert_eq!(convert_sample(SNorm8, UNorm8, s), Sample::Unsigned(v));
        }
    }

    #[test]
    fn bias_is_not_a_float_roundtrip() {
        assert_eq!(convert_sample(SNorm16, UNorm16, Sample::Signed(0)), Sample::Unsigned(32768));
        assert_eq!(convert_sample(SNorm16, UNorm16, Sample::Signed(-32768)), Sample::Unsigned(0));
        assert_eq!(
            convert_sample(UNorm16, SNorm16, Sample::Unsigned(65535)),
            Sample::Signed(32767)
        );
    }

    #[test]
    fn unorm_widening_is_exact() {
        for v in 0..=255u64 {
            let wide = convert_sample(UNorm8, UNorm16, Sample::Unsigned(v));
            assert_eq!(wide, Sample::Unsigned(v * 257));
            assert_eq!(convert_sample(UNorm16, UNorm8, wide), Sample::Unsigned(v));
            let f8 = convert_sample(UNorm8, F64, Sample::Unsigned(v));
            let f16 = convert_sample(UNorm16, F64, wide);
            assert_eq!(f8, f16);
        }
        assert_eq!(
            convert_sample(UNorm8, UNorm64, Sample::Unsigned(255)),
            Sample::Unsigned(u64::MAX)
        );
    }

    #[test]
    fn snorm_rescale_extremes() {
        assert_eq!(convert_sample(SNorm8, SNorm16, Sample::Signed(-128)), Sample::Signed(-32768));
        assert_eq!(convert_sample(SNorm8, SNorm16, Sample::Signed(127)), Sample::Signed(32767));
        assert_eq!(convert_sample(SNorm16, SNorm8, Sample::Signed(32767)), Sample::Signed(127));
        assert_eq!(convert_sample(SNorm64, SNorm8, Sample::Signed(i64::MIN)), Sample::Signed(-128));
    }

    #[test]
    fn mixed_width_bias() {
        assert_eq!(convert_sample(UNorm8, SNorm16, Sample::Unsigned(0)), Sample::Signed(-32768));
        assert_eq!(convert_sample(UNorm8, SNorm16, Sample::Unsigned(255)), Sample::Signed(32767));
        assert_eq!(convert_sample(SNorm16, UNorm8, Sample::Signed(-32768)), Sample::Unsigned(0));
    }

    #[test]
    fn plain_integer_cast_does_not_rescale() {
        assert_eq!(convert_sample(UInt8, UInt16, Sample::Unsigned(200)), Sample::Unsigned(200));
        assert_eq!(convert_sample(UInt16, UInt8, Sample::Unsigned(0x1234)), Sample::Unsigned(0x34));
        assert_eq!(convert_sample(Int16, UInt8, Sample::Signed(-1)), Sample::Unsigned(255));
        assert_eq!(convert_sample(UInt8, Int8, Sample::Unsigned(200)), Sample::Signed(-56));
        assert_eq!(convert_sample(Int32, F32, Sample::Signed(-7)), Sample::Float(-7.0));
        assert_eq!(convert_sample(F32, Int8, Sample::Float(300.7)), Sample::Signed(127));
        assert_eq!(convert_sample(F32, UInt16, Sample::Float(-2.0)), Sample::Unsigned(0));
    }

    #[test]
    fn float_to_normalized_clamps() {
        assert_eq!(convert_sample(F32, UNorm8, Sample::Float(2.0)), Sample::Unsigned(255));
        assert_eq!(convert_sample(F32, UNorm8, Sample::Float(-1.0)), Sample::Unsigned(0));
        assert_eq!(convert_sample(F32, SNorm8, Sample::Float(-4.0)), Sample::Signed(-128));
        assert_eq!(convert_sample(F64, UNorm64, Sample::Float(1.0)), Sample::Unsigned(u64::MAX));
        assert_eq!(convert_sample(F32, UNorm8, Sample::Float(f64::NAN)), Sample::Unsigned(0));
    }

    #[test]
    fn half_precision_quantizes() {
        let Sample::Float(v) = convert_sample(F64, F16, Sample::Float(0.1)) else {
            panic!("expected float");
        };
        assert_eq!(v, f16::from_f64(0.1).to_f64());
    }

    #[test]
    #[should_panic]
    fn mismatched_sample_panics() {
        convert_sample(UNorm8, F32, Sample::Float(0.5));
    }

    #[test]
    fn sample_bytes_roundtrip() {
        let mut buf = [0u8; 8];
        for ty in PixelDataType::ALL {
            let v = sample_for(ty);
            write_sample(ty, v, &mut buf);
            assert_eq!(read_sample(ty, &buf), v, "{ty}");
        }
    }

    #[test]
    fn swizzle_bgra_to_rgba() {
        let src = [1u8, 2, 3, 4, 10, 20, 30, 40];
        let out = convert_buffer(&src, ElementLayout::Bgra, UNorm8, ElementLayout::Rgba, UNorm8);
        assert_eq!(out, vec![3, 2, 1, 4, 30, 20, 10, 40]);
    }

    #[test]
    fn expand_rgb_fills_opaque_alpha() {
        let src = [255u8, 0, 128];
        let out = convert_buffer(&src, ElementLayout::Rgb, UNorm8, ElementLayout::Rgba, F32);
        let floats: Vec<f32> = out
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        assert_eq!(floats[0], 1.0);
        assert_eq!(floats[1], 0.0);
        assert_relative_eq!(floats[2], 128.0 / 255.0, epsilon = 1e-6);
        assert_eq!(floats[3], 1.0);
    }

    #[test]
    fn drop_channels_to_r() {
        let src = [9u8, 8, 7, 6];
        let out = convert_buffer(&src, ElementLayout::Rgba, UNorm8, ElementLayout::R, UNorm16);
        assert_eq!(out, (9u16 * 257).to_le_bytes().to_vec());
    }

    #[test]
    #[should_panic]
    fn mismatched_texel_count_panics() {
        let mut dst = [0u8; 4];
        let src = [0u8; 8];
        convert_elements(&src, ElementLayout::Rgba, UNorm8, &mut dst, ElementLayout::R, UNorm8);
    }
}

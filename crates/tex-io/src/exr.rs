//! OpenEXR format support.
//!
//! Reads the first valid layer at its largest resolution level and writes a
//! single unnamed layer, both through the `exr` crate.
//!
//! # Channels
//!
//! Channel order comes from the channel names, never from file order
//! (EXR stores channels sorted alphabetically):
//!
//! - `R`/`Y`, `G`, `B`, `A` are picked in that order, so `Y`+`A` reads as RG
//! - files with none of those names yield their first four channels
//! - samples always decode to F32, whatever the stored channel type
//!
//! # Example
//!
//! ```rust,ignore
//! use tex_io::exr;
//!
//! let image = exr::read_from_memory(&bytes)?;
//! let out = exr::write_to_memory(&image)?;
//! ```

use crate::raw::RawImage2D;
use crate::{IoError, IoResult};
use exr::prelude::*;
use half::f16;
use smallvec::SmallVec;
use std::io::Cursor;
use tex_core::{ElementLayout, Image, PixelDataType};
use tracing::debug;

/// Name slots in component order. `Y` fills the red slot.
const SLOTS: [&[&str]; 4] = [&["R", "Y"], &["G"], &["B"], &["A"]];

fn pick_channels(names: &[String]) -> Vec<usize> {
    let picked: Vec<usize> = SLOTS
        .iter()
        .filter_map(|slot| names.iter().position(|n| slot.contains(&n.as_str())))
        .collect();
    if picked.is_empty() {
        (0..names.len().min(4)).collect()
    } else {
        picked
    }
}

/// Decodes the first valid layer of an EXR.
pub fn decode(data: &[u8]) -> IoResult<RawImage2D> {
    let image = read()
        .no_deep_data()
        .largest_resolution_level()
        .all_channels()
        .first_valid_layer()
        .all_attributes()
        .from_buffered(Cursor::new(data))
        .map_err(IoError::decode)?;

    let layer = &image.layer_data;
    let (width, height) = (layer.size.width(), layer.size.height());
    let channels = &layer.channel_data.list;
    let names: Vec<String> = channels.iter().map(|c| c.name.to_string()).collect();
    let picked = pick_channels(&names);
    debug!(?names, picked = picked.len(), width, height, "exr channels");

    let layout = ElementLayout::from_component_count(picked.len())
        .ok_or_else(|| IoError::decode("EXR layer has no channels"))?;
    let pixel_count = width * height;
    let mut out = Vec::with_capacity(pixel_count * picked.len() * 4);
    for index in 0..pixel_count {
        for &c in &picked {
            let sample = channels[c].sample_data.value_by_flat_index(index);
            out.extend_from_slice(&sample.to_f32().to_le_bytes());
        }
    }

    RawImage2D::new(width as u32, height as u32, layout, PixelDataType::F32, out)
}

/// Encodes F16 or F32 pixels with 1 to 4 components.
pub fn encode(raw: &RawImage2D) -> IoResult<Vec<u8>> {
    let names: &[&str] = match raw.layout {
        ElementLayout::R => &["R"],
        ElementLayout::Rg => &["R", "G"],
        ElementLayout::Rgb => &["R", "G", "B"],
        ElementLayout::Rgba => &["R", "G", "B", "A"],
        other => return Err(IoError::encode(format!("EXR cannot store {other} layout"))),
    };
    let stride = names.len() * raw.ty.byte_width();

    let channels: SmallVec<[AnyChannel<FlatSamples>; 4]> = names
        .iter()
        .enumerate()
        .map(|(c, &name)| {
            let offset = c * raw.ty.byte_width();
            let texels = raw.data.chunks_exact(stride);
            let samples = match raw.ty {
                PixelDataType::F16 => FlatSamples::F16(
                    texels
                        .map(|t| f16::from_le_bytes([t[offset], t[offset + 1]]))
                        .collect(),
                ),
                PixelDataType::F32 => FlatSamples::F32(
                    texels
                        .map(|t| {
                            f32::from_le_bytes([
                                t[offset],
                                t[offset + 1],
                                t[offset + 2],
                                t[offset + 3],
                            ])
                        })
                        .collect(),
                ),
                other => {
                    return Err(IoError::encode(format!("EXR cannot store {other} samples")));
                }
            };
            Ok(AnyChannel::new(name, samples))
        })
        .collect::<IoResult<_>>()?;

    let layer = Layer::new(
        (raw.width as usize, raw.height as usize),
        LayerAttributes::default(),
        Encoding::SMALL_LOSSLESS,
        AnyChannels::sort(channels),
    );

    let mut out = Cursor::new(Vec::new());
    exr::prelude::Image::from_layer(layer)
        .write()
        .to_buffered(&mut out)
        .map_err(IoError::encode)?;
    Ok(out.into_inner())
}

/// Reads an EXR from memory as a single-level 2D image.
pub fn read_from_memory(data: &[u8]) -> IoResult<Image> {
    decode(data)?.into_image()
}

/// Writes layer 0 / mip 0 of an image as EXR.
pub fn write_to_memory(image: &Image) -> IoResult<Vec<u8>> {
    encode(&RawImage2D::from_image(image)?)
}

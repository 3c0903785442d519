//! Format detection utilities.
//!
//! Detects texture formats from file extensions and magic bytes. Both
//! lookups are fixed static tables.

use std::path::Path;

/// Supported texture formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// DirectDraw Surface container (full texture model).
    Dds,
    /// PNG format.
    Png,
    /// JPEG format.
    Jpeg,
    /// Windows bitmap.
    Bmp,
    /// Truevision TGA.
    Tga,
    /// GIF (first frame).
    Gif,
    /// Photoshop document (composite).
    Psd,
    /// Radiance HDR format.
    Hdr,
    /// OpenEXR format.
    Exr,
}

const EXTENSIONS: &[(&str, Format)] = &[
    ("dds", Format::Dds),
    ("png", Format::Png),
    ("jpg", Format::Jpeg),
    ("jpeg", Format::Jpeg),
    ("jpe", Format::Jpeg),
    ("bmp", Format::Bmp),
    ("dib", Format::Bmp),
    ("tga", Format::Tga),
    ("gif", Format::Gif),
    ("psd", Format::Psd),
    ("hdr", Format::Hdr),
    ("pic", Format::Hdr),
    ("rgbe", Format::Hdr),
    ("exr", Format::Exr),
];

impl Format {
    /// Every format, in declaration order.
    pub const ALL: [Format; 9] = [
        Format::Dds,
        Format::Png,
        Format::Jpeg,
        Format::Bmp,
        Format::Tga,
        Format::Gif,
        Format::Psd,
        Format::Hdr,
        Format::Exr,
    ];

    /// Detects format from the file extension (case-insensitive).
    pub fn from_extension<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())?
            .to_ascii_lowercase();
        EXTENSIONS
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|&(_, f)| f)
    }

    /// Detects format from raw bytes (magic number check).
    ///
    /// TGA has no magic and is never detected this way.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"DDS ") {
            return Some(Format::Dds);
        }
        // PNG: 0x89 P N G \r \n 0x1A \n
        if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Format::Png);
        }
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Format::Jpeg);
        }
        if bytes.starts_with(&[0x76, 0x2f, 0x31, 0x01]) {
            return Some(Format::Exr);
        }
        if bytes.starts_with(b"8BPS") {
            return Some(Format::Psd);
        }
        if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            return Some(Format::Gif);
        }
        if bytes.starts_with(b"#?") {
            return Some(Format::Hdr);
        }
        if bytes.len() >= 14 && bytes.starts_with(b"BM") {
            return Some(Format::Bmp);
        }
        None
    }

    /// Typical file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Dds => "dds",
            Format::Png => "png",
            Format::Jpeg => "jpg",
            Format::Bmp => "bmp",
            Format::Tga => "tga",
            Format::Gif => "gif",
            Format::Psd => "psd",
            Format::Hdr => "hdr",
            Format::Exr => "exr",
        }
    }

    /// Whether the codec for this format is compiled in.
    pub fn is_enabled(&self) -> bool {
        match self {
            Format::Dds => true,
            Format::Png => cfg!(feature = "png"),
            Format::Jpeg => cfg!(feature = "jpeg"),
            Format::Bmp | Format::Tga | Format::Gif => cfg!(feature = "bitmap"),
            Format::Psd => cfg!(feature = "psd"),
            Format::Hdr => cfg!(feature = "hdr"),
            Format::Exr => cfg!(feature = "exr"),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_detection() {
        assert_eq!(Format::from_extension("test.dds"), Some(Format::Dds));
        assert_eq!(Format::from_extension("test.DDS"), Some(Format::Dds));
        assert_eq!(Format::from_extension("test.png"), Some(Format::Png));
        assert_eq!(Format::from_extension("test.JPG"), Some(Format::Jpeg));
        assert_eq!(Format::from_extension("test.jpeg"), Some(Format::Jpeg));
        assert_eq!(Format::from_extension("dir/test.Tga"), Some(Format::Tga));
        assert_eq!(Format::from_extension("test.pic"), Some(Format::Hdr));
        assert_eq!(Format::from_extension("test.exr"), Some(Format::Exr));
        assert_eq!(Format::from_extension("test.unknown"), None);
        assert_eq!(Format::from_extension("noext"), None);
    }

    #[test]
    fn test_magic_bytes() {
        assert_eq!(Format::from_bytes(b"DDS \x7c\0\0\0"), Some(Format::Dds));

        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(Format::from_bytes(&png), Some(Format::Png));

        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];
        assert_eq!(Format::from_bytes(&jpeg), Some(Format::Jpeg));

        let exr = [0x76, 0x2f, 0x31, 0x01, 0x00, 0x00, 0x00, 0x00];
        assert_eq!(Format::from_bytes(&exr), Some(Format::Exr));

        assert_eq!(Format::from_bytes(b"8BPS\0\x01"), Some(Format::Psd));
        assert_eq!(Format::from_bytes(b"GIF89a.."), Some(Format::Gif));
        assert_eq!(Format::from_bytes(b"#?RADIANCE"), Some(Format::Hdr));
        assert_eq!(Format::from_bytes(&[0u8; 4]), None);
        assert_eq!(Format::from_bytes(&[]), None);
    }

    #[test]
    fn test_extension_round_trip() {
        for format in Format::ALL {
            let name = format!("file.{}", format.extension());
            assert_eq!(Format::from_extension(&name), Some(format));
        }
    }
}

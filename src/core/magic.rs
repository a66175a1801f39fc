/// Magic byte detection
///
/// Maps the leading bytes of a file to a known type tag. Detection works on an
/// uppercase hex rendering of the header so prefixes can be written the way
/// they appear in format documentation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of leading bytes sampled for type detection
pub const HEADER_LEN: usize = 20;

/// File type as identified from magic bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileTypeTag {
    #[serde(rename = "JPG")]
    Jpg,
    #[serde(rename = "PNG")]
    Png,
    #[serde(rename = "GIF")]
    Gif,
    #[serde(rename = "BMP")]
    Bmp,
    #[serde(rename = "PDF")]
    Pdf,
    #[serde(rename = "EXE")]
    Exe,
    #[serde(rename = "ZIP")]
    Zip,
    #[serde(rename = "RAR")]
    Rar,
    #[serde(rename = "7Z")]
    SevenZip,
    #[serde(rename = "TIF")]
    Tif,
    /// Legacy OLE compound document (Word, Excel, PowerPoint)
    #[serde(rename = "DOC/XLS/PPT")]
    OleCompound,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl FileTypeTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileTypeTag::Jpg => "JPG",
            FileTypeTag::Png => "PNG",
            FileTypeTag::Gif => "GIF",
            FileTypeTag::Bmp => "BMP",
            FileTypeTag::Pdf => "PDF",
            FileTypeTag::Exe => "EXE",
            FileTypeTag::Zip => "ZIP",
            FileTypeTag::Rar => "RAR",
            FileTypeTag::SevenZip => "7Z",
            FileTypeTag::Tif => "TIF",
            FileTypeTag::OleCompound => "DOC/XLS/PPT",
            FileTypeTag::Unknown => "UNKNOWN",
        }
    }

    pub fn is_known(&self) -> bool {
        *self != FileTypeTag::Unknown
    }
}

impl fmt::Display for FileTypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A hex prefix and the type it identifies
#[derive(Debug, Clone, Copy)]
pub struct MagicRule {
    pub prefix: &'static str,
    pub tag: FileTypeTag,
}

/// Signature table, tested top to bottom. Prefixes are disjoint, but any new
/// entry that overlaps an existing one must go below it.
pub static MAGIC_RULES: &[MagicRule] = &[
    MagicRule { prefix: "FFD8FF", tag: FileTypeTag::Jpg },
    MagicRule { prefix: "89504E47", tag: FileTypeTag::Png },
    MagicRule { prefix: "47494638", tag: FileTypeTag::Gif },
    MagicRule { prefix: "424D", tag: FileTypeTag::Bmp },
    MagicRule { prefix: "25504446", tag: FileTypeTag::Pdf },
    MagicRule { prefix: "4D5A", tag: FileTypeTag::Exe },
    MagicRule { prefix: "504B0304", tag: FileTypeTag::Zip },
    MagicRule { prefix: "504B0506", tag: FileTypeTag::Zip },
    MagicRule { prefix: "52617221", tag: FileTypeTag::Rar },
    MagicRule { prefix: "377ABCAF", tag: FileTypeTag::SevenZip },
    MagicRule { prefix: "49492A00", tag: FileTypeTag::Tif },
    MagicRule { prefix: "4D4D002A", tag: FileTypeTag::Tif },
    MagicRule { prefix: "D0CF11E0", tag: FileTypeTag::OleCompound },
];

/// Render header bytes as uppercase hex, two digits per byte
///
/// Only the first `HEADER_LEN` bytes are used.
pub fn header_hex(header: &[u8]) -> String {
    let len = header.len().min(HEADER_LEN);
    hex::encode_upper(&header[..len])
}

/// Detect a file type from a hex-encoded header
///
/// # Arguments
///
/// * `header_hex` - Hex digits of the leading bytes, any case
///
/// # Returns
///
/// The first matching tag, or `FileTypeTag::Unknown`
pub fn detect_type(header_hex: &str) -> FileTypeTag {
    let normalized = header_hex.to_ascii_uppercase();

    MAGIC_RULES
        .iter()
        .find(|rule| normalized.starts_with(rule.prefix))
        .map(|rule| rule.tag)
        .unwrap_or(FileTypeTag::Unknown)
}

/// Detect a file type straight from raw header bytes
pub fn detect_type_from_bytes(header: &[u8]) -> FileTypeTag {
    detect_type(&header_hex(header))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_common_signatures() {
        assert_eq!(detect_type_from_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]), FileTypeTag::Jpg);
        assert_eq!(
            detect_type_from_bytes(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
            FileTypeTag::Png
        );
        assert_eq!(detect_type_from_bytes(b"GIF89a"), FileTypeTag::Gif);
        assert_eq!(detect_type_from_bytes(b"BM\x36\x00"), FileTypeTag::Bmp);
        assert_eq!(detect_type_from_bytes(b"%PDF-1.7"), FileTypeTag::Pdf);
        assert_eq!(detect_type_from_bytes(b"MZ\x90\x00"), FileTypeTag::Exe);
        assert_eq!(detect_type_from_bytes(b"Rar!\x1A\x07"), FileTypeTag::Rar);
        assert_eq!(
            detect_type_from_bytes(&[0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C]),
            FileTypeTag::SevenZip
        );
        assert_eq!(
            detect_type_from_bytes(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1]),
            FileTypeTag::OleCompound
        );
    }

    #[test]
    fn test_alternate_prefixes() {
        assert_eq!(detect_type_from_bytes(b"PK\x03\x04"), FileTypeTag::Zip);
        assert_eq!(detect_type_from_bytes(b"PK\x05\x06"), FileTypeTag::Zip);
        assert_eq!(detect_type_from_bytes(b"II*\x00"), FileTypeTag::Tif);
        assert_eq!(detect_type_from_bytes(b"MM\x00*"), FileTypeTag::Tif);
    }

    #[test]
    fn test_unknown_and_short_headers() {
        assert_eq!(detect_type_from_bytes(b""), FileTypeTag::Unknown);
        assert_eq!(detect_type_from_bytes(b"hello world"), FileTypeTag::Unknown);
        // A truncated JPEG signature is not enough
        assert_eq!(detect_type_from_bytes(&[0xFF, 0xD8]), FileTypeTag::Unknown);
    }

    #[test]
    fn test_hex_is_case_insensitive() {
        assert_eq!(detect_type("89504e470d0a"), FileTypeTag::Png);
        assert_eq!(detect_type("ffd8ffe0"), FileTypeTag::Jpg);
    }

    #[test]
    fn test_header_hex_is_capped() {
        let bytes = [0xABu8; 64];
        let hex = header_hex(&bytes);
        assert_eq!(hex.len(), HEADER_LEN * 2);
        assert!(hex.chars().all(|c| c == 'A' || c == 'B'));
        assert_eq!(header_hex(&[0x0A, 0xFF]), "0AFF");
    }

    #[test]
    fn test_display_tags() {
        assert_eq!(FileTypeTag::SevenZip.to_string(), "7Z");
        assert_eq!(FileTypeTag::OleCompound.to_string(), "DOC/XLS/PPT");
        assert!(!FileTypeTag::Unknown.is_known());
    }
}

//! Base types for the on-disk structure of PSARC archives.

use binrw::{BinRead, BinResult};

/// Size of the fixed archive header, in bytes.
pub const HEADER_SIZE: u64 = 0x20;

/// The only TOC record stride this reader understands: 16-byte hash +
/// 4-byte block index + 5-byte length + 5-byte offset.
pub const TOC_ENTRY_SIZE: u32 = 30;

/// Uncompressed block size used by every known archive.
pub const DEFAULT_BLOCK_SIZE: u32 = 65536;

/// Recognized values of the header's compression tag.
///
/// *No Man's Sky* only ever ships `zlib`; `lzma` is legal in the header
/// but block decoding still relies on the deflate-signature sniff, which
/// is how the game's own archives behave.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PakCompression {
    Zlib,
    Lzma,
}

impl PakCompression {
    /// The 4-byte ASCII tag as stored in the header.
    pub const fn tag(self) -> [u8; 4] {
        match self {
            PakCompression::Zlib => *b"zlib",
            PakCompression::Lzma => *b"lzma",
        }
    }

    /// Parse a header tag, `None` for anything unrecognized.
    pub fn from_tag(tag: [u8; 4]) -> Option<PakCompression> {
        match &tag {
            b"zlib" => Some(PakCompression::Zlib),
            b"lzma" => Some(PakCompression::Lzma),
            _ => None,
        }
    }
}

/// PSARC file header
///
/// The first 32 bytes of every archive. All fields are big-endian and the
/// file always starts with the magic `"PSAR"`.
#[derive(BinRead, Debug, Copy, Clone, PartialEq, Eq)]
#[br(big, magic = b"PSAR")]
pub struct PakHeader {
    /// Format major version; only 1 is accepted
    pub version_major: u16,

    /// Format minor version; only 4 is accepted
    pub version_minor: u16,

    /// 4-byte ASCII compression tag, see [`PakCompression`]
    pub compression_tag: [u8; 4],

    /// Combined byte length of header, TOC, and block-size table
    pub toc_length: u32,

    /// Byte stride of one TOC record, must equal [`TOC_ENTRY_SIZE`]
    pub toc_entry_size: u32,

    /// Number of TOC records, the manifest included
    pub toc_entries: u32,

    /// Uncompressed block size, normally [`DEFAULT_BLOCK_SIZE`]
    pub block_size: u32,

    /// 0 = relative paths, 1 = ignore case, 2 = absolute; informational
    pub archive_flags: u32,
}

impl PakHeader {
    /// The recognized compression tag, `None` if the header carries
    /// something else.
    pub fn compression(&self) -> Option<PakCompression> {
        PakCompression::from_tag(self.compression_tag)
    }
}

/// One fixed-size table-of-contents record.
///
/// Records carry everything about an entry except its path; paths only
/// become known once the manifest is decoded.
#[derive(BinRead, Debug, Copy, Clone, PartialEq, Eq)]
#[br(big)]
pub struct PakRecord {
    /// MD5 of the entry path; ignored by this reader
    pub hash: [u8; 16],

    /// Index of the entry's first block in the shared block-size table
    pub block_index: u32,

    /// Uncompressed length of the entry, 40 bits
    #[br(parse_with = parse_u40)]
    pub length: u64,

    /// File offset where the entry's first block starts, 40 bits
    #[br(parse_with = parse_u40)]
    pub offset: u64,
}

/// Read a 5-byte (40-bit) big-endian unsigned integer.
#[binrw::parser(reader)]
fn parse_u40() -> BinResult<u64> {
    let mut raw = [0u8; 5];
    reader.read_exact(&mut raw)?;
    Ok(raw
        .iter()
        .fold(0u64, |accum, byte| (accum << 8) | u64::from(*byte)))
}

/// Width in bytes of one block-size-table value: the smallest of 2, 3,
/// or 4 bytes whose range covers `block_size`.
pub fn block_width(block_size: u32) -> usize {
    let mut width = 1usize;
    let mut covered = 256u64;
    loop {
        width += 1;
        covered *= 256;
        if covered >= u64::from(block_size) {
            return width;
        }
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use binrw::BinRead;
    use pretty_assertions::assert_eq;

    use super::{block_width, PakCompression, PakHeader, PakRecord};

    #[test]
    fn read_header() {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x50, 0x53, 0x41, 0x52,
            0x00, 0x01,
            0x00, 0x04,
            0x7A, 0x6C, 0x69, 0x62,
            0x00, 0x00, 0x01, 0x00,
            0x00, 0x00, 0x00, 0x1E,
            0x00, 0x00, 0x00, 0x07,
            0x00, 0x01, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x01,
        ]);

        let header = PakHeader::read(&mut input).unwrap();

        assert_eq!(
            header,
            PakHeader {
                version_major: 1,
                version_minor: 4,
                compression_tag: *b"zlib",
                toc_length: 256,
                toc_entry_size: 30,
                toc_entries: 7,
                block_size: 65536,
                archive_flags: 1,
            }
        );
        assert_eq!(header.compression(), Some(PakCompression::Zlib));
    }

    #[test]
    fn read_header_invalid_magic() {
        let mut input = Cursor::new([0u8; 0x20]);
        assert!(PakHeader::read(&mut input).is_err());
    }

    #[test]
    fn read_record_40_bit_fields() {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            // 16-byte hash, ignored
            0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA,
            0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA,
            // block index
            0x00, 0x00, 0x00, 0x07,
            // length: 0xFF_0000_0001
            0xFF, 0x00, 0x00, 0x00, 0x01,
            // offset: 0x01_0203_0405
            0x01, 0x02, 0x03, 0x04, 0x05,
        ]);

        let record = PakRecord::read(&mut input).unwrap();

        assert_eq!(record.block_index, 7);
        assert_eq!(record.length, 0xFF_0000_0001);
        assert_eq!(record.offset, 0x01_0203_0405);
    }

    #[test]
    fn read_record_short_input() {
        let mut input = Cursor::new([0u8; 20]);
        assert!(PakRecord::read(&mut input).is_err());
    }

    #[test]
    fn block_width_covers_block_size() {
        assert_eq!(block_width(256), 2);
        assert_eq!(block_width(65535), 2);
        assert_eq!(block_width(65536), 2);
        assert_eq!(block_width(65537), 3);
        assert_eq!(block_width(16_777_216), 3);
        assert_eq!(block_width(16_777_217), 4);
    }

    #[test]
    fn compression_tags_round_trip() {
        assert_eq!(
            PakCompression::from_tag(*b"zlib"),
            Some(PakCompression::Zlib)
        );
        assert_eq!(
            PakCompression::from_tag(*b"lzma"),
            Some(PakCompression::Lzma)
        );
        assert_eq!(PakCompression::from_tag(*b"gzip"), None);
        assert_eq!(PakCompression::Lzma.tag(), *b"lzma");
    }
}

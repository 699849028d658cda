//! This library handles reading the **PSARC** `.pak` archives used by *No Man's Sky*.
//!
//! # PSARC Archive Format Documentation
//!
//! This crate provides utilities to enumerate and extract the assets packed
//! into PlayStation ARchive (PSARC) containers as shipped by *No Man's Sky*.
//! Archives are typically identified with the `.pak` extension and live under
//! `GAMEDATA/PCBANKS/` inside the game installation.
//!
//! ## File Structure
//!
//! A `.pak` file consists of a header, a table of contents, a block-size
//! table, and the compressed data blocks. Entry 0 is always the *manifest*:
//! its decompressed payload is the `\n`-separated list of the other entries'
//! paths (the final path is unterminated).
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: 0x50534152 ("PSAR")                               |
//! | 0x0004         | Version major          | 2 bytes: Fixed value 1                                     |
//! | 0x0006         | Version minor          | 2 bytes: Fixed value 4                                     |
//! | 0x0008         | Compression tag        | 4 bytes: "zlib" or "lzma" in ASCII                         |
//! | 0x000C         | TOC length             | 4 bytes: Header + TOC + block-size table, in bytes         |
//! | 0x0010         | TOC entry stride       | 4 bytes: Must be 30                                        |
//! | 0x0014         | TOC entry count        | 4 bytes: Number of entries, manifest included              |
//! | 0x0018         | Block size             | 4 bytes: Uncompressed block size, normally 65536           |
//! | 0x001C         | Archive flags          | 4 bytes: 0 relative, 1 ignore-case, 2 absolute             |
//!
//! ### Table of Contents
//!
//! Immediately after the header come `entry count` fixed 30-byte records:
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Hash                   | 16 bytes: MD5 of the entry path, ignored by this reader |
//! | 0x0010         | Block index            | 4 bytes: Index of the entry's first compressed block    |
//! | 0x0014         | Length                 | 5 bytes (40 bits): Uncompressed entry length            |
//! | 0x0019         | Offset                 | 5 bytes (40 bits): File offset of the entry's first block |
//!
//! ### Block-Size Table
//!
//! Immediately after the TOC, one value per compressed block across the
//! whole archive. Each value is stored in the smallest of 2, 3, or 4 bytes
//! whose range covers the block size (2 bytes for the default 65536); the
//! table's entry count is whatever fits in the remainder of the declared
//! TOC length. A stored value of `0` means the block is a full,
//! uncompressed `block size` bytes — compression was skipped because it
//! did not help.
//!
//! ### Data Blocks
//!
//! An entry's data is the concatenation of its blocks, starting at the
//! entry's offset and block index and running forward until the entry's
//! uncompressed length has been produced. Blocks are deflate-compressed
//! *independently* of each other; a block whose first two bytes are not a
//! zlib stream header is stored as-is.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.pak`
//! - **Endianness**: Big-endian for all multi-byte integers
//! - **Reference**: <https://www.psdevwiki.com/ps3/PlayStation_archive_(PSARC)>
//!

pub mod collection;
pub mod compression;
pub mod data;
pub mod entry;
pub mod error;
pub mod read;
pub mod types;

pub use collection::{MergedTree, PakCollection};
pub use compression::ExtractStream;
pub use data::{EntryData, EntryKind};
pub use entry::EntryInfo;
pub use error::{Error, Result};
pub use read::PakArchive;
pub use types::{PakCompression, PakHeader};

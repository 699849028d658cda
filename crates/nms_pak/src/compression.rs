//! Block-table decompression for contained entries.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};

use flate2::read::ZlibDecoder;
use tracing::{instrument, trace};

use crate::error::{Error, Result};

/// Two-byte big-endian values a zlib stream can start with, one per
/// deflate compression level group.
const DEFLATE_SIGNATURES: [u16; 4] = [0x7801, 0x785E, 0x789C, 0x78DA];

/// Entries at least this large decode into an auto-deleting temp file
/// instead of memory.
const SPILL_THRESHOLD: u64 = i32::MAX as u64;

/// The decoded contents of one entry.
///
/// Entries below [`SPILL_THRESHOLD`] live in memory; larger ones are
/// backed by an unlinked temporary file that disappears when the stream
/// is dropped. Either way the stream is positioned at the start and
/// [`len`](ExtractStream::len) equals the entry's declared uncompressed
/// length.
#[derive(Debug)]
pub struct ExtractStream {
    length: u64,
    backing: Backing,
}

#[derive(Debug)]
enum Backing {
    Memory(io::Cursor<Vec<u8>>),
    Spill(File),
}

impl ExtractStream {
    fn memory(data: Vec<u8>) -> ExtractStream {
        ExtractStream {
            length: data.len() as u64,
            backing: Backing::Memory(io::Cursor::new(data)),
        }
    }

    fn spill(file: File, length: u64) -> ExtractStream {
        ExtractStream {
            length,
            backing: Backing::Spill(file),
        }
    }

    /// Decoded length in bytes.
    pub fn len(&self) -> u64 {
        self.length
    }

    /// Whether the entry decoded to zero bytes.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Drain the stream into a single buffer.
    pub fn into_vec(mut self) -> Result<Vec<u8>> {
        let mut data = Vec::with_capacity(self.length.min(SPILL_THRESHOLD) as usize);
        self.read_to_end(&mut data)?;
        Ok(data)
    }
}

impl Read for ExtractStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.backing {
            Backing::Memory(cursor) => cursor.read(buf),
            Backing::Spill(file) => file.read(buf),
        }
    }

    fn read_to_end(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
        match &mut self.backing {
            Backing::Memory(cursor) => cursor.read_to_end(buf),
            Backing::Spill(file) => file.read_to_end(buf),
        }
    }
}

impl Seek for ExtractStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match &mut self.backing {
            Backing::Memory(cursor) => cursor.seek(pos),
            Backing::Spill(file) => file.seek(pos),
        }
    }
}

/// Rebuild the uncompressed contents of one entry from its blocks.
///
/// Walks the shared block-size table starting at `first_block`, reading
/// block data from `offset` forward, until exactly `length` bytes have
/// been produced. A short read anywhere is fatal for the extraction.
#[instrument(skip(pak, blocks), err)]
pub(crate) fn decompress(
    pak: &mut (impl Read + Seek),
    blocks: &[u64],
    block_size: u32,
    first_block: u32,
    offset: u64,
    length: u64,
) -> Result<ExtractStream> {
    if length < SPILL_THRESHOLD {
        let mut out = Vec::with_capacity(length as usize);
        inflate_blocks(pak, blocks, block_size, first_block, offset, length, &mut out)?;
        Ok(ExtractStream::memory(out))
    } else {
        let mut file = tempfile::tempfile()?;
        inflate_blocks(pak, blocks, block_size, first_block, offset, length, &mut file)?;
        file.seek(SeekFrom::Start(0))?;
        Ok(ExtractStream::spill(file, length))
    }
}

fn inflate_blocks<W: Write>(
    pak: &mut (impl Read + Seek),
    blocks: &[u64],
    block_size: u32,
    first_block: u32,
    start: u64,
    length: u64,
    out: &mut W,
) -> Result<()> {
    let block_size = block_size as usize;
    let mut compressed = vec![0u8; block_size];
    let mut decoded = Vec::with_capacity(block_size);

    let mut index = first_block as usize;
    let mut offset = start;
    let mut produced: u64 = 0;

    while produced < length {
        let stored = *blocks.get(index).ok_or(Error::BlockTableExhausted)?;
        pak.seek(SeekFrom::Start(offset))?;

        if stored == 0 {
            // A zero table value is a full uncompressed block, not an
            // empty one.
            pak.read_exact(&mut compressed[..block_size])?;
            offset += block_size as u64;
            produced += copy_limited(out, &compressed[..block_size], length - produced)?;
        } else {
            let stored = stored as usize;
            pak.read_exact(&mut compressed[..stored])?;
            offset += stored as u64;

            if is_deflate_block(&compressed[..stored]) {
                // Blocks are compressed independently; every one gets a
                // fresh decoder rather than a continued stream.
                decoded.clear();
                ZlibDecoder::new(&compressed[..stored]).read_to_end(&mut decoded)?;
                produced += copy_limited(out, &decoded, length - produced)?;
            } else {
                // The format has no per-block compressed flag. Anything
                // without a zlib header is assumed to be a stored partial
                // block; real archives contain such blocks.
                trace!(index, stored, "block without deflate signature, copying verbatim");
                produced += copy_limited(out, &compressed[..stored], length - produced)?;
            }
        }

        index += 1;
    }

    Ok(())
}

/// Write `data` truncated to the entry's remaining length; the final
/// block of an entry is usually padded past it.
fn copy_limited(out: &mut impl Write, data: &[u8], remaining: u64) -> Result<u64> {
    let take = (data.len() as u64).min(remaining) as usize;
    out.write_all(&data[..take])?;
    Ok(take as u64)
}

fn is_deflate_block(data: &[u8]) -> bool {
    data.len() >= 2 && DEFLATE_SIGNATURES.contains(&u16::from_be_bytes([data[0], data[1]]))
}

#![allow(dead_code)]

//! Programmatic construction of valid archives for tests.
//!
//! Real archives are hundreds of megabytes, so tests assemble their own:
//! the builder lays out header, TOC, block-size table, and data blocks
//! exactly as the game's packer does, with a 65536-byte block size.

use std::io::Write;

use flate2::{write::ZlibEncoder, Compression};

pub const BLOCK_SIZE: usize = 0x10000;

const HEADER_SIZE: usize = 0x20;
const TOC_ENTRY_SIZE: usize = 30;

/// How an entry's blocks are stored in the fixture.
#[derive(Debug, Copy, Clone)]
pub enum Storage {
    /// Every block deflate-compressed.
    Deflate,
    /// Blocks stored verbatim: full blocks get a `0` table value, a
    /// final partial block stores its own size.
    Raw,
}

pub struct PakBuilder {
    version: (u16, u16),
    entries: Vec<(String, Vec<u8>, Storage)>,
}

impl PakBuilder {
    pub fn new() -> PakBuilder {
        PakBuilder {
            version: (1, 4),
            entries: Vec::new(),
        }
    }

    pub fn version(mut self, major: u16, minor: u16) -> PakBuilder {
        self.version = (major, minor);
        self
    }

    pub fn entry(mut self, path: &str, data: &[u8], storage: Storage) -> PakBuilder {
        self.entries.push((path.to_owned(), data.to_vec(), storage));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let manifest = self
            .entries
            .iter()
            .map(|(path, _, _)| path.as_str())
            .collect::<Vec<_>>()
            .join("\n")
            .into_bytes();

        // Pack the manifest first (it is entry 0), then every entry, each
        // claiming its run of blocks in the shared table.
        let mut block_values: Vec<u64> = Vec::new();
        let mut payloads: Vec<Vec<u8>> = Vec::new();
        let mut first_blocks: Vec<u32> = Vec::new();
        let mut lengths: Vec<u64> = Vec::new();

        let all = std::iter::once((manifest, Storage::Deflate)).chain(
            self.entries
                .into_iter()
                .map(|(_, data, storage)| (data, storage)),
        );
        for (data, storage) in all {
            first_blocks.push(block_values.len() as u32);
            lengths.push(data.len() as u64);

            let mut blob = Vec::new();
            for chunk in data.chunks(BLOCK_SIZE) {
                match storage {
                    Storage::Deflate => {
                        let packed = deflate(chunk);
                        assert!(packed.len() < BLOCK_SIZE, "fixture data must compress");
                        block_values.push(packed.len() as u64);
                        blob.extend(packed);
                    }
                    Storage::Raw if chunk.len() == BLOCK_SIZE => {
                        block_values.push(0);
                        blob.extend(chunk);
                    }
                    Storage::Raw => {
                        block_values.push(chunk.len() as u64);
                        blob.extend(chunk);
                    }
                }
            }
            payloads.push(blob);
        }

        let entry_count = payloads.len();
        let toc_length = HEADER_SIZE + entry_count * TOC_ENTRY_SIZE + block_values.len() * 2;

        let mut offsets = Vec::with_capacity(entry_count);
        let mut cursor = toc_length as u64;
        for blob in &payloads {
            offsets.push(cursor);
            cursor += blob.len() as u64;
        }

        let mut out = Vec::with_capacity(cursor as usize);
        out.extend(b"PSAR");
        out.extend(self.version.0.to_be_bytes());
        out.extend(self.version.1.to_be_bytes());
        out.extend(b"zlib");
        out.extend((toc_length as u32).to_be_bytes());
        out.extend((TOC_ENTRY_SIZE as u32).to_be_bytes());
        out.extend((entry_count as u32).to_be_bytes());
        out.extend((BLOCK_SIZE as u32).to_be_bytes());
        out.extend(1u32.to_be_bytes());

        for index in 0..entry_count {
            out.extend([0u8; 16]);
            out.extend(first_blocks[index].to_be_bytes());
            push_u40(&mut out, lengths[index]);
            push_u40(&mut out, offsets[index]);
        }

        for value in &block_values {
            out.extend((*value as u16).to_be_bytes());
        }

        for blob in payloads {
            out.extend(blob);
        }

        out
    }
}

fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn push_u40(out: &mut Vec<u8>, value: u64) {
    out.extend(&value.to_be_bytes()[3..]);
}

/// Write fixture bytes to a temp file and keep the guard alive.
pub fn write_pak(bytes: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file
}

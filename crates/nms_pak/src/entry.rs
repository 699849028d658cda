//! Metadata for the entries contained in an archive.

use std::sync::Weak;

use crate::compression::ExtractStream;
use crate::error::{Error, Result};
use crate::read::Shared;
use crate::types::PakRecord;

/// Meta-data for one compressed entry (file) in a `.pak` archive.
///
/// Carries everything needed to locate and decode the entry: the index of
/// its first block in the archive's shared block-size table, the file
/// offset where that block starts, and the uncompressed length. The
/// back-reference to the owning archive state is a [`Weak`] handle; the
/// archive owns its entries, never the other way around.
#[derive(Debug, Clone)]
pub struct EntryInfo {
    pub(crate) pak: Weak<Shared>,
    pub(crate) id: usize,
    pub(crate) block_index: u32,
    pub(crate) offset: u64,
    pub(crate) length: u64,
    pub(crate) path: String,
    pub(crate) name: String,
    pub(crate) extension: String,
}

impl EntryInfo {
    pub(crate) fn new(pak: Weak<Shared>, id: usize, record: &PakRecord) -> EntryInfo {
        EntryInfo {
            pak,
            id,
            block_index: record.block_index,
            offset: record.offset,
            length: record.length,
            path: String::new(),
            name: String::new(),
            extension: String::new(),
        }
    }

    /// Normalize and store the manifest-provided path, deriving name and
    /// extension.
    ///
    /// Paths are uppercased with `/` separators. Some files carry several
    /// dots, e.g. `GCDEBUGOPTIONS.GLOBAL.MBIN`; only the last one starts
    /// the extension, giving name `GCDEBUGOPTIONS.GLOBAL` and extension
    /// `.MBIN`.
    pub(crate) fn assign_path(&mut self, raw: &str) {
        self.path = normalize_path(raw);

        let file = self.path.rsplit('/').next().unwrap_or_default();
        match file.rfind('.') {
            Some(dot) => {
                self.name = file[..dot].to_owned();
                self.extension = file[dot..].to_owned();
            }
            None => {
                self.name = file.to_owned();
                self.extension = String::new();
            }
        }
    }

    /// Position of this entry in the archive's table of contents.
    ///
    /// Ordinal 0 is the manifest, which never appears in entry listings.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Index of the entry's first block in the shared block-size table.
    pub fn block_index(&self) -> u32 {
        self.block_index
    }

    /// File offset where the entry's first block starts.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Uncompressed length of the entry, in bytes.
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Normalized full path, empty for the manifest.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// File name without directory or extension.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Extension including the leading dot, empty when the name has none.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Decompress this entry through its owning archive.
    ///
    /// Opens an independent read handle on the archive file, so any
    /// number of extractions may run concurrently.
    pub fn extract(&self) -> Result<ExtractStream> {
        let shared = self.pak.upgrade().ok_or(Error::StaleEntry)?;
        shared.extract(self)
    }
}

/// Normalize a manifest or lookup path to the canonical archive form:
/// no leading separators, `/` delimited, uppercase, trimmed.
pub(crate) fn normalize_path(raw: &str) -> String {
    raw.trim_start_matches(['/', '\\'])
        .replace('\\', "/")
        .to_uppercase()
        .trim()
        .to_owned()
}

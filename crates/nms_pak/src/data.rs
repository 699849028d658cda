//! Format classification for extracted entries.
//!
//! Downstream viewers pick a decoder based on an entry's extension. The
//! set of formats is closed, so the dispatch is a plain tagged union with
//! an opaque fallback rather than anything dynamic; actually decoding
//! the formats (MBIN templates, DDS pixels, ...) is the consumer's job.

use std::fs::File;
use std::io::{self, Seek, SeekFrom};
use std::path::Path;

use crate::compression::ExtractStream;
use crate::entry::EntryInfo;
use crate::error::Result;

/// Known entry formats, keyed by extension.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Text,
    Csv,
    Json,
    Xml,
    Lua,
    /// Compiled game metadata, the bulk of every archive.
    Mbin,
    /// Shader bytecode.
    Spv,
    /// Texture data.
    Dds,
    /// Anything this reader has no name for.
    Opaque,
}

impl EntryKind {
    /// Classify an entry by its extension.
    pub fn classify(entry: &EntryInfo) -> EntryKind {
        match entry.extension() {
            ".TXT" => EntryKind::Text,
            ".CSV" => EntryKind::Csv,
            ".JSON" => EntryKind::Json,
            ".XML" => EntryKind::Xml,
            ".LUA" => EntryKind::Lua,
            ".MBIN" => EntryKind::Mbin,
            ".SPV" => EntryKind::Spv,
            ".DDS" => EntryKind::Dds,
            // Some baked variants ship as NAME.MBIN.PC.
            _ if entry.path().ends_with(".MBIN.PC") => EntryKind::Mbin,
            _ => EntryKind::Opaque,
        }
    }

    /// Whether the decoded bytes are meaningfully viewable as text.
    pub fn is_text(self) -> bool {
        matches!(
            self,
            EntryKind::Text | EntryKind::Csv | EntryKind::Json | EntryKind::Xml | EntryKind::Lua
        )
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            EntryKind::Text => "text",
            EntryKind::Csv => "csv",
            EntryKind::Json => "json",
            EntryKind::Xml => "xml",
            EntryKind::Lua => "lua",
            EntryKind::Mbin => "mbin",
            EntryKind::Spv => "spv",
            EntryKind::Dds => "dds",
            EntryKind::Opaque => "data",
        })
    }
}

/// One extracted entry, classified and ready for a consumer.
#[derive(Debug)]
pub struct EntryData {
    info: EntryInfo,
    kind: EntryKind,
    raw: ExtractStream,
}

impl EntryData {
    /// Extract `info` from its archive and classify it.
    pub fn new(info: &EntryInfo) -> Result<EntryData> {
        let raw = info.extract()?;
        Ok(EntryData {
            kind: EntryKind::classify(info),
            info: info.clone(),
            raw,
        })
    }

    /// The entry this data came from.
    pub fn info(&self) -> &EntryInfo {
        &self.info
    }

    /// The classified format.
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// The decoded bytes.
    pub fn raw(&mut self) -> &mut ExtractStream {
        &mut self.raw
    }

    /// Give up the wrapper and keep the decoded stream.
    pub fn into_raw(self) -> ExtractStream {
        self.raw
    }

    /// Write the decoded bytes out to `path`.
    pub fn save_to(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let mut out = File::create(path)?;
        self.raw.seek(SeekFrom::Start(0))?;
        io::copy(&mut self.raw, &mut out)?;
        Ok(())
    }
}

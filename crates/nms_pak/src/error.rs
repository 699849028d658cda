//! Error types that can be emitted from this library

use std::fmt;
use std::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;

/// The parse phase an archive failed in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    /// The fixed 32-byte header.
    Header,
    /// The table of contents records.
    Toc,
    /// The compressed-block-size table.
    BlockTable,
    /// Decoding and splitting of entry 0, the path manifest.
    Manifest,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Header => "header",
            Phase::Toc => "table of contents",
            Phase::BlockTable => "block size table",
            Phase::Manifest => "manifest",
        })
    }
}

/// Error type for library
///
/// Parse results are memoized per archive and re-reported on every
/// access, so the error is `Clone`; the non-clonable I/O and binrw
/// sources are shared behind an [`Arc`].
#[derive(Error, Diagnostic, Debug, Clone)]
pub enum Error {
    /// Wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(Arc<std::io::Error>),

    /// Wrapper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(Arc<binrw::Error>),

    /// A parse phase failed; the archive exposes no entries
    #[error("failed reading archive {phase}")]
    Parse {
        /// Which phase aborted the parse
        phase: Phase,
        #[source]
        source: Box<Error>,
    },

    /// Archive version other than 1.4
    #[error("archive version {major}.{minor} is not supported, expected 1.4")]
    UnsupportedVersion { major: u16, minor: u16 },

    /// Compression tag other than "zlib" or "lzma"
    #[error("archive compression tag {:?} is not supported", String::from_utf8_lossy(.tag))]
    UnsupportedCompression { tag: [u8; 4] },

    /// TOC entry stride other than the fixed 30-byte layout
    #[error("table of contents stride is {0} bytes, expected 30")]
    UnsupportedTocStride(u32),

    /// Declared TOC length too small to hold the header and records
    #[error("declared table of contents length is too small")]
    InvalidTocLength,

    /// Manifest did not split into one path per named entry
    #[error("manifest holds {found} paths for {expected} named entries")]
    MalformedManifest { expected: usize, found: usize },

    /// An entry's blocks run past the end of the block-size table
    #[error("entry data extends past the block size table")]
    BlockTableExhausted,

    /// unable to find requested entry
    #[error("unable to find requested entry")]
    EntryNotFound(#[from] EntryNotFoundError),

    /// Extraction was asked for an entry owned by a different archive
    #[error("entry does not belong to this archive")]
    ForeignEntry,

    /// Extraction was asked for an entry whose archive is gone
    #[error("entry outlives its archive")]
    StaleEntry,

    /// Extraction was asked on an archive with no backing file
    #[error("archive has no backing file path")]
    NoArchivePath,
}

impl Error {
    /// Wrap an error with the parse phase it occurred in.
    pub(crate) fn in_phase(phase: Phase) -> impl FnOnce(Error) -> Error {
        move |source| Error::Parse {
            phase,
            source: Box::new(source),
        }
    }

    /// The parse phase this error aborted, if it is a parse error.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Error::Parse { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::IOError(Arc::new(value))
    }
}

impl From<binrw::Error> for Error {
    fn from(value: binrw::Error) -> Self {
        Error::BinRWError(Arc::new(value))
    }
}

/// Error type to provide further information when an entry has not been found
#[derive(Error, Diagnostic, Debug, Clone)]
pub enum EntryNotFoundError {
    /// at index {0}
    #[error("at index {0}")]
    Index(usize),

    /// by path {0}
    #[error("by path {0}")]
    Path(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;

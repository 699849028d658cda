//! Types for reading `.pak` archives

use std::{
    fs::File,
    io::{Seek, SeekFrom},
    path::{Path, PathBuf},
    sync::{Arc, OnceLock},
};

use binrw::BinRead;
use byteorder::{BigEndian, ReadBytesExt};
use indexmap::IndexMap;
use nms_path::PathTree;
use tracing::{debug, instrument};

use crate::{
    compression::{self, ExtractStream},
    entry::{normalize_path, EntryInfo},
    error::{EntryNotFoundError, Error, Phase, Result},
    types::{block_width, PakHeader, PakRecord, HEADER_SIZE, TOC_ENTRY_SIZE},
};

/// The parsed, immutable state of one archive.
///
/// Entries hold a `Weak` back-reference to this struct, which is why it
/// lives behind an `Arc` built with [`Arc::new_cyclic`]. After a
/// successful parse nothing in here ever changes; extraction opens fresh
/// file handles instead of sharing one.
#[derive(Debug)]
pub(crate) struct Shared {
    path: PathBuf,
    header: PakHeader,
    /// Compressed size of every block across the whole archive; entries
    /// index into this table, `0` marks a full uncompressed block.
    blocks: Vec<u64>,
    /// Every entry keyed by normalized path, in sorted path order. The
    /// manifest sits first under its empty path and is never listed.
    entries: IndexMap<Box<str>, EntryInfo>,
    tree: PathTree<EntryInfo>,
}

impl Shared {
    pub(crate) fn extract(&self, entry: &EntryInfo) -> Result<ExtractStream> {
        let mut pak = File::open(&self.path)?;
        compression::decompress(
            &mut pak,
            &self.blocks,
            self.header.block_size,
            entry.block_index,
            entry.offset,
            entry.length,
        )
    }
}

/// PSARC archive reader
///
/// Opening an archive records nothing but its path; the binary content
/// is parsed once, on the first access to entries, tree, or header, and
/// the outcome — success or failure — is memoized. A failed parse keeps
/// reporting the same error and the archive behaves as empty.
///
/// ```no_run
/// fn list_pak_contents(path: &str) -> nms_pak::Result<()> {
///     let pak = nms_pak::PakArchive::open(path);
///
///     for entry in pak.entries()? {
///         println!("{:>12}  {}", entry.length(), entry.path());
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct PakArchive {
    path: PathBuf,
    state: OnceLock<Result<Arc<Shared>>>,
}

impl PakArchive {
    /// Wrap a `.pak` file without touching its contents.
    pub fn open(path: impl Into<PathBuf>) -> PakArchive {
        PakArchive {
            path: path.into(),
            state: OnceLock::new(),
        }
    }

    /// Path this archive was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse-on-demand access to the archive state.
    fn shared(&self) -> Result<&Arc<Shared>> {
        self.state
            .get_or_init(|| load(&self.path))
            .as_ref()
            .map_err(Error::clone)
    }

    /// Number of visible entries; the manifest is not counted and a
    /// failed parse counts as zero.
    pub fn len(&self) -> usize {
        self.shared()
            .map(|shared| shared.entries.len().saturating_sub(1))
            .unwrap_or(0)
    }

    /// Whether this archive exposes no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The visible entries in sorted path order.
    pub fn entries(&self) -> Result<impl Iterator<Item = &EntryInfo> + '_> {
        Ok(self
            .shared()?
            .entries
            .values()
            .filter(|entry| !entry.path().is_empty()))
    }

    /// Get a visible entry by its position in the sorted listing.
    pub fn by_index(&self, index: usize) -> Result<&EntryInfo> {
        let shared = self.shared()?;
        index
            .checked_add(1)
            .and_then(|at| shared.entries.get_index(at))
            .map(|(_, entry)| entry)
            .ok_or_else(|| EntryNotFoundError::Index(index).into())
    }

    /// Look an entry up by path; the query is normalized the same way
    /// manifest paths are, so `metadata\\foo.mbin` finds `METADATA/FOO.MBIN`.
    pub fn by_path(&self, path: &str) -> Result<&EntryInfo> {
        let normalized = normalize_path(path);
        if normalized.is_empty() {
            return Err(EntryNotFoundError::Path(path.to_owned()).into());
        }
        self.shared()?
            .entries
            .get(normalized.as_str())
            .ok_or_else(|| EntryNotFoundError::Path(path.to_owned()).into())
    }

    /// The archive's namespace as a tree, manifest excluded.
    pub fn tree(&self) -> Result<&PathTree<EntryInfo>> {
        Ok(&self.shared()?.tree)
    }

    /// The parsed archive header.
    pub fn header(&self) -> Result<&PakHeader> {
        Ok(&self.shared()?.header)
    }

    /// Number of compressed blocks across the whole archive.
    pub fn block_count(&self) -> Result<usize> {
        Ok(self.shared()?.blocks.len())
    }

    /// Total size of the visible entries once decompressed.
    pub fn decompressed_size(&self) -> Result<u128> {
        Ok(self
            .entries()?
            .map(|entry| u128::from(entry.length()))
            .sum())
    }

    /// Decompress one entry into an [`ExtractStream`].
    ///
    /// Fails with a lookup error when `entry` belongs to a different
    /// archive or this archive has no path. Each call opens its own read
    /// handle, so extractions may run concurrently — including of the
    /// same entry.
    pub fn extract(&self, entry: &EntryInfo) -> Result<ExtractStream> {
        if self.path.as_os_str().is_empty() {
            return Err(Error::NoArchivePath);
        }

        let shared = self.shared()?;
        let owner = entry.pak.upgrade().ok_or(Error::StaleEntry)?;
        if !Arc::ptr_eq(shared, &owner) {
            return Err(Error::ForeignEntry);
        }
        shared.extract(entry)
    }
}

/// Run the full parse: header, TOC, block table, manifest, tree.
///
/// Each phase reads sequentially from one handle and the first failure
/// aborts the whole load; no partial state survives.
#[instrument(err)]
fn load(path: &Path) -> Result<Arc<Shared>> {
    let mut pak = File::open(path)?;

    let header = read_header(&mut pak).map_err(Error::in_phase(Phase::Header))?;
    let records = read_toc(&mut pak, &header).map_err(Error::in_phase(Phase::Toc))?;
    let blocks = read_block_table(&mut pak, &header).map_err(Error::in_phase(Phase::BlockTable))?;
    let paths =
        read_manifest(&mut pak, &header, &records, &blocks).map_err(Error::in_phase(Phase::Manifest))?;

    debug!(
        entries = records.len(),
        blocks = blocks.len(),
        "parsed {}",
        path.display()
    );

    Ok(assemble(path.to_owned(), header, records, blocks, paths))
}

fn read_header(pak: &mut File) -> Result<PakHeader> {
    let header = PakHeader::read(pak)?;

    if header.version_major != 1 || header.version_minor != 4 {
        return Err(Error::UnsupportedVersion {
            major: header.version_major,
            minor: header.version_minor,
        });
    }
    if header.compression().is_none() {
        return Err(Error::UnsupportedCompression {
            tag: header.compression_tag,
        });
    }
    if header.toc_entry_size != TOC_ENTRY_SIZE {
        return Err(Error::UnsupportedTocStride(header.toc_entry_size));
    }

    Ok(header)
}

fn read_toc(pak: &mut File, header: &PakHeader) -> Result<Vec<PakRecord>> {
    pak.seek(SeekFrom::Start(HEADER_SIZE))?;

    (0..header.toc_entries)
        .map(|_| PakRecord::read(pak).map_err(Error::from))
        .collect()
}

fn read_block_table(pak: &mut File, header: &PakHeader) -> Result<Vec<u64>> {
    let consumed = HEADER_SIZE + u64::from(header.toc_entries) * u64::from(TOC_ENTRY_SIZE);
    let table = u64::from(header.toc_length)
        .checked_sub(consumed)
        .ok_or(Error::InvalidTocLength)?;

    pak.seek(SeekFrom::Start(consumed))?;

    let width = block_width(header.block_size);
    let count = table / width as u64;
    let mut blocks = Vec::with_capacity(count as usize);
    for _ in 0..count {
        blocks.push(pak.read_uint::<BigEndian>(width)?);
    }

    Ok(blocks)
}

/// Decode entry 0 and split it into one path per named entry.
///
/// The manifest is one blob of `\n`-separated paths in TOC order; the
/// final path has no terminator.
fn read_manifest(
    pak: &mut File,
    header: &PakHeader,
    records: &[PakRecord],
    blocks: &[u64],
) -> Result<Vec<String>> {
    let Some(manifest) = records.first() else {
        return Ok(Vec::new());
    };

    let blob = compression::decompress(
        pak,
        blocks,
        header.block_size,
        manifest.block_index,
        manifest.offset,
        manifest.length,
    )?
    .into_vec()?;

    if blob.is_empty() && records.len() == 1 {
        return Ok(Vec::new());
    }

    let paths: Vec<String> = blob
        .split(|byte| *byte == b'\n')
        .map(|part| String::from_utf8_lossy(part).into_owned())
        .collect();

    if paths.len() != records.len() - 1 {
        return Err(Error::MalformedManifest {
            expected: records.len() - 1,
            found: paths.len(),
        });
    }

    Ok(paths)
}

/// Attach paths, sort, and build the final shared state.
fn assemble(
    path: PathBuf,
    header: PakHeader,
    records: Vec<PakRecord>,
    blocks: Vec<u64>,
    paths: Vec<String>,
) -> Arc<Shared> {
    Arc::new_cyclic(|weak| {
        let mut entries: Vec<EntryInfo> = records
            .iter()
            .enumerate()
            .map(|(id, record)| EntryInfo::new(weak.clone(), id, record))
            .collect();

        // Entry 0 is the manifest and keeps its empty path, which also
        // keeps it first once sorted.
        for (entry, raw) in entries.iter_mut().skip(1).zip(&paths) {
            entry.assign_path(raw);
        }
        entries.sort_by(|lhs, rhs| lhs.path().cmp(rhs.path()));

        let mut tree = PathTree::new();
        for entry in entries.iter().filter(|entry| !entry.path().is_empty()) {
            tree.insert(entry.path(), entry.clone());
        }

        let entries: IndexMap<Box<str>, EntryInfo> = entries
            .into_iter()
            .map(|entry| (Box::from(entry.path()), entry))
            .collect();

        Shared {
            path,
            header,
            blocks,
            entries,
            tree,
        }
    })
}

#[cfg(test)]
mod test {
    use std::io::Write;
    use std::sync::Weak;

    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    use super::PakArchive;
    use crate::entry::EntryInfo;
    use crate::error::{Error, Phase};
    use crate::types::PakRecord;

    fn header_bytes(
        major: u16,
        minor: u16,
        tag: &[u8; 4],
        toc_length: u32,
        stride: u32,
        entries: u32,
    ) -> Vec<u8> {
        let mut raw = Vec::with_capacity(0x20);
        raw.extend(b"PSAR");
        raw.extend(major.to_be_bytes());
        raw.extend(minor.to_be_bytes());
        raw.extend(tag);
        raw.extend(toc_length.to_be_bytes());
        raw.extend(stride.to_be_bytes());
        raw.extend(entries.to_be_bytes());
        raw.extend(65536u32.to_be_bytes());
        raw.extend(1u32.to_be_bytes());
        raw
    }

    fn archive_from(bytes: &[u8]) -> (NamedTempFile, PakArchive) {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        let pak = PakArchive::open(file.path());
        (file, pak)
    }

    #[test]
    fn read_invalid_magic() {
        let (_guard, pak) = archive_from(&[0x54u8; 0x20]);

        assert!(pak.entries().is_err());
        assert_eq!(pak.len(), 0);
        assert!(pak.is_empty());
    }

    #[test]
    fn read_unsupported_version() {
        let (_guard, pak) = archive_from(&header_bytes(1, 5, b"zlib", 0x20, 30, 0));

        let error = pak.tree().unwrap_err();
        assert_eq!(error.phase(), Some(Phase::Header));
        assert!(matches!(
            error,
            Error::Parse { source, .. }
                if matches!(*source, Error::UnsupportedVersion { major: 1, minor: 5 })
        ));
        assert_eq!(pak.len(), 0);
    }

    #[test]
    fn read_unsupported_compression_tag() {
        let (_guard, pak) = archive_from(&header_bytes(1, 4, b"gzip", 0x20, 30, 0));

        let error = pak.entries().err().unwrap();
        assert!(matches!(
            error,
            Error::Parse { source, .. }
                if matches!(*source, Error::UnsupportedCompression { tag } if &tag == b"gzip")
        ));
    }

    #[test]
    fn read_unsupported_toc_stride() {
        let (_guard, pak) = archive_from(&header_bytes(1, 4, b"zlib", 0x20, 32, 0));

        let error = pak.entries().err().unwrap();
        assert!(matches!(
            error,
            Error::Parse { source, .. }
                if matches!(*source, Error::UnsupportedTocStride(32))
        ));
    }

    #[test]
    fn read_truncated_header() {
        let (_guard, pak) = archive_from(b"PSAR\x00\x01\x00\x04");

        let error = pak.entries().err().unwrap();
        assert_eq!(error.phase(), Some(Phase::Header));
    }

    #[test]
    fn read_truncated_toc() {
        // Header claims one entry, file ends right after the header.
        let (_guard, pak) = archive_from(&header_bytes(1, 4, b"zlib", 0x40, 30, 1));

        let error = pak.entries().err().unwrap();
        assert_eq!(error.phase(), Some(Phase::Toc));
        assert_eq!(pak.len(), 0);
    }

    #[test]
    fn read_empty_archive() {
        let (_guard, pak) = archive_from(&header_bytes(1, 4, b"zlib", 0x20, 30, 0));

        assert_eq!(pak.len(), 0);
        assert!(pak.tree().unwrap().is_empty());
        assert_eq!(pak.entries().unwrap().count(), 0);
    }

    #[test]
    fn extract_without_a_backing_path_yields_no_data() {
        let pak = PakArchive::open("");
        let record = PakRecord {
            hash: [0; 16],
            block_index: 0,
            length: 0,
            offset: 0,
        };
        let entry = EntryInfo::new(Weak::new(), 1, &record);

        assert!(matches!(pak.extract(&entry), Err(Error::NoArchivePath)));
    }

    #[test]
    fn failed_parse_is_memoized() {
        let (_guard, pak) = archive_from(&header_bytes(2, 0, b"zlib", 0x20, 30, 0));

        assert!(pak.entries().is_err());
        assert!(pak.tree().is_err());
        assert!(pak.header().is_err());
        assert_eq!(pak.len(), 0);
    }
}

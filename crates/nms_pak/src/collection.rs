//! Discovery and aggregation of a game installation's archives.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, OnceLock},
    thread::{self, JoinHandle},
};

use nms_path::PathTree;
use parking_lot::Mutex;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::{entry::EntryInfo, error::Result, read::PakArchive};

/// Directory of base-game archives below the game root.
pub const GAME_PAK_DIR: &str = "GAMEDATA/PCBANKS";

/// Directory of mod archives below the game root.
pub const MOD_PAK_DIR: &str = "GAMEDATA/PCBANKS/MODS";

/// Extensions skipped when building the merged tree: bulk binary
/// payloads (shader bytecode, audio banks) that nobody browses to and
/// that dominate the entry count.
const MERGED_TREE_EXCLUDED: [&str; 3] = [".BIN", ".SPV", ".WEM"];

type BuiltCallback = Box<dyn FnOnce(&PathTree<EntryInfo>) + Send>;

/// One-shot handle to the combined base-game tree.
///
/// The merge runs on a background thread; consumers either poll
/// [`get`](MergedTree::get) or register a callback with
/// [`on_built`](MergedTree::on_built) and render immediately with
/// whatever they have. Every callback fires exactly once.
#[derive(Default)]
pub struct MergedTree {
    tree: OnceLock<PathTree<EntryInfo>>,
    callbacks: Mutex<Vec<BuiltCallback>>,
}

impl MergedTree {
    /// The finished tree, `None` while the build is still running.
    pub fn get(&self) -> Option<&PathTree<EntryInfo>> {
        self.tree.get()
    }

    /// Run `callback` once the tree is built.
    ///
    /// Callbacks registered before completion run on the builder thread
    /// in registration order; afterwards they run immediately on the
    /// caller's thread.
    pub fn on_built(&self, callback: impl FnOnce(&PathTree<EntryInfo>) + Send + 'static) {
        if let Some(tree) = self.tree.get() {
            callback(tree);
            return;
        }

        let mut callbacks = self.callbacks.lock();
        // The builder may have finished between the check above and
        // taking the lock; it drains the list under the same lock, so
        // re-checking here closes the window.
        match self.tree.get() {
            Some(tree) => {
                drop(callbacks);
                callback(tree);
            }
            None => callbacks.push(Box::new(callback)),
        }
    }

    fn complete(&self, tree: PathTree<EntryInfo>) {
        if self.tree.set(tree).is_err() {
            warn!("merged tree built twice, keeping the first");
            return;
        }

        let drained = std::mem::take(&mut *self.callbacks.lock());
        if let Some(tree) = self.tree.get() {
            for callback in drained {
                callback(tree);
            }
        }
    }
}

/// Every archive of one game installation.
///
/// Base-game archives and mod archives are discovered up front but
/// parsed lazily; [`load_all`](PakCollection::load_all) fans the parses
/// out across the thread pool, which is safe because each archive only
/// ever touches its own file handle.
pub struct PakCollection {
    root: PathBuf,
    game: Vec<PakArchive>,
    mods: Vec<PakArchive>,
    merged: Arc<MergedTree>,
}

impl PakCollection {
    /// Discover the `.pak` files under `root` without parsing any of
    /// them. Missing directories yield empty sets.
    pub fn discover(root: impl Into<PathBuf>) -> Result<PakCollection> {
        let root = root.into();
        let game = scan_dir(&root.join(GAME_PAK_DIR))?;
        let mods = scan_dir(&root.join(MOD_PAK_DIR))?;

        info!(
            game = game.len(),
            mods = mods.len(),
            "discovered archives under {}",
            root.display()
        );

        Ok(PakCollection {
            root,
            game,
            mods,
            merged: Arc::new(MergedTree::default()),
        })
    }

    /// The game root this collection was discovered from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Base-game archives, sorted by file name.
    pub fn game_paks(&self) -> &[PakArchive] {
        &self.game
    }

    /// Mod archives, sorted by file name.
    pub fn mod_paks(&self) -> &[PakArchive] {
        &self.mods
    }

    /// Parse every discovered archive in parallel.
    ///
    /// An unreadable archive degrades to an empty one with a warning;
    /// it never aborts the rest of the batch.
    pub fn load_all(&self) {
        self.game
            .par_iter()
            .chain(self.mods.par_iter())
            .for_each(|pak| {
                if let Err(error) = pak.entries().map(|_| ()) {
                    warn!(%error, "skipping unreadable archive {}", pak.path().display());
                }
            });
    }

    /// Handle to the combined base-game tree.
    pub fn merged(&self) -> &Arc<MergedTree> {
        &self.merged
    }

    /// Build the merged tree on a background thread.
    ///
    /// Parses everything first (in parallel), then inserts every
    /// base-game entry into one tree on that single thread. The caller
    /// is not expected to join the handle; observe completion through
    /// [`MergedTree::on_built`].
    pub fn spawn_merged_build(self: Arc<Self>) -> JoinHandle<()> {
        thread::spawn(move || {
            self.load_all();
            let tree = self.build_merged_tree();
            self.merged.complete(tree);
        })
    }

    fn build_merged_tree(&self) -> PathTree<EntryInfo> {
        let mut tree = PathTree::new();

        for pak in &self.game {
            let entries = match pak.entries() {
                Ok(entries) => entries,
                // Already warned about during load_all; treat as empty.
                Err(_) => continue,
            };
            for entry in entries {
                if MERGED_TREE_EXCLUDED.contains(&entry.extension()) {
                    continue;
                }
                tree.insert(entry.path(), entry.clone());
            }
        }

        debug!(nodes = tree.len(), "merged tree built");
        tree
    }
}

/// Non-recursive scan of one directory for `.pak` files, sorted by name.
fn scan_dir(dir: &Path) -> Result<Vec<PakArchive>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file()
            && path
                .extension()
                .is_some_and(|extension| extension.eq_ignore_ascii_case("pak"))
        {
            found.push(path);
        }
    }
    found.sort();

    Ok(found.into_iter().map(PakArchive::open).collect())
}

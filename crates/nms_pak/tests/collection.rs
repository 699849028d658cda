mod common;

use std::fs;
use std::path::Path;
use std::sync::{mpsc, Arc};

use common::{PakBuilder, Storage};
use nms_pak::PakCollection;
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tracing_test::traced_test;

fn write_archive(dir: &Path, name: &str, paths: &[&str]) {
    let mut builder = PakBuilder::new();
    for path in paths {
        builder = builder.entry(path, b"fixture data", Storage::Deflate);
    }
    fs::write(dir.join(name), builder.build()).unwrap();
}

/// A game root with two base archives, one broken base archive, and one
/// mod archive.
fn game_root() -> TempDir {
    let root = TempDir::new().unwrap();
    let banks = root.path().join("GAMEDATA/PCBANKS");
    let mods = banks.join("MODS");
    fs::create_dir_all(&mods).unwrap();

    write_archive(
        &banks,
        "NMSARC.GLOBALS.pak",
        &[
            "METADATA/REALITY/DEFAULTREALITY.MBIN",
            "AUDIO/MUSIC.WEM",
            "SHADERS/CACHE.SPV",
            "PRELOAD/BUFFER.BIN",
        ],
    );
    write_archive(&banks, "NMSARC.TEXTURES.pak", &["TEXTURES/ATLAS.DDS"]);
    fs::write(banks.join("BROKEN.pak"), b"not an archive at all").unwrap();

    write_archive(&mods, "CUSTOM.pak", &["METADATA/REALITY/MODDED.MBIN"]);

    root
}

#[test]
fn discovery_finds_sorted_sets_without_parsing() {
    let root = game_root();
    let collection = PakCollection::discover(root.path()).unwrap();

    let game: Vec<String> = collection
        .game_paks()
        .iter()
        .map(|pak| pak.path().file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        game,
        vec!["BROKEN.pak", "NMSARC.GLOBALS.pak", "NMSARC.TEXTURES.pak"]
    );
    assert_eq!(collection.mod_paks().len(), 1);
}

#[test]
fn merged_tree_covers_base_set_minus_exclusions() {
    let root = game_root();
    let collection = Arc::new(PakCollection::discover(root.path()).unwrap());

    let (sender, receiver) = mpsc::channel();
    collection.merged().on_built(move |tree| {
        sender.send(tree.clone()).unwrap();
    });

    let builder = Arc::clone(&collection).spawn_merged_build();
    let tree = receiver.recv().unwrap();
    builder.join().unwrap();

    // Base entries from both archives are present.
    assert!(tree.search("METADATA/REALITY/DEFAULTREALITY.MBIN").is_some());
    assert!(tree.search("TEXTURES/ATLAS.DDS").is_some());

    // Excluded extensions and mod entries are not.
    assert!(tree.search("AUDIO/MUSIC.WEM").is_none());
    assert!(tree.search("SHADERS/CACHE.SPV").is_none());
    assert!(tree.search("PRELOAD/BUFFER.BIN").is_none());
    assert!(tree.search("METADATA/REALITY/MODDED.MBIN").is_none());

    // Mod archives keep their own tree.
    let modded = &collection.mod_paks()[0];
    assert!(modded
        .tree()
        .unwrap()
        .search("METADATA/REALITY/MODDED.MBIN")
        .is_some());
}

#[test]
fn callbacks_after_completion_fire_immediately() {
    let root = game_root();
    let collection = Arc::new(PakCollection::discover(root.path()).unwrap());

    Arc::clone(&collection).spawn_merged_build().join().unwrap();
    assert!(collection.merged().get().is_some());

    let (sender, receiver) = mpsc::channel();
    collection.merged().on_built(move |tree| {
        sender.send(tree.len()).unwrap();
    });
    let nodes = receiver.try_recv().unwrap();
    assert!(nodes > 1);
}

#[traced_test]
#[test]
fn unreadable_archives_degrade_to_empty() {
    let root = game_root();
    let collection = PakCollection::discover(root.path()).unwrap();
    collection.load_all();
    assert!(logs_contain("skipping unreadable archive"));

    let broken = &collection.game_paks()[0];
    assert!(broken.path().ends_with("BROKEN.pak"));
    assert_eq!(broken.len(), 0);
    assert!(broken.entries().is_err());

    // The rest of the batch parsed fine.
    assert_eq!(collection.game_paks()[1].len(), 4);
    assert_eq!(collection.game_paks()[2].len(), 1);
}

#[test]
fn missing_directories_yield_an_empty_collection() {
    let root = TempDir::new().unwrap();
    let collection = Arc::new(PakCollection::discover(root.path()).unwrap());

    assert!(collection.game_paks().is_empty());
    assert!(collection.mod_paks().is_empty());

    Arc::clone(&collection).spawn_merged_build().join().unwrap();
    assert!(collection.merged().get().unwrap().is_empty());
}

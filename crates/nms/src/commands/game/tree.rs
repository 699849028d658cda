use clap::Args;
use miette::{miette, Result};
use nms_pak::{EntryInfo, PakCollection};
use nms_path::{NodeId, PathTree};
use owo_colors::OwoColorize;
use std::{path::PathBuf, sync::Arc};
use tracing::info;

#[derive(Args)]
pub struct TreeArgs {
    /// The game installation directory
    #[arg(short, long, value_name = "DIR")]
    game: PathBuf,
}

impl TreeArgs {
    pub fn handle(&self) -> Result<()> {
        let collection = Arc::new(PakCollection::discover(&self.game)?);

        collection.merged().on_built(|tree| {
            info!(nodes = tree.len(), "merged tree ready");
        });

        let builder = Arc::clone(&collection).spawn_merged_build();
        builder
            .join()
            .map_err(|_| miette!("merged tree build panicked"))?;

        let tree = collection
            .merged()
            .get()
            .ok_or_else(|| miette!("merged tree was never built"))?;

        for child in tree.children(tree.root()) {
            let node = tree.node(*child);
            if node.is_dir() {
                println!("{:>8} files  {}", leaves_below(tree, *child), node.text().blue());
            } else {
                println!("{:>8} files  {}", 1, node.text());
            }
        }
        println!(
            "{} nodes merged from {} archives",
            tree.len(),
            collection.game_paks().len()
        );

        Ok(())
    }
}

fn leaves_below(tree: &PathTree<EntryInfo>, node: NodeId) -> usize {
    tree.children(node)
        .iter()
        .map(|child| {
            if tree.node(*child).is_dir() {
                leaves_below(tree, *child)
            } else {
                1
            }
        })
        .sum()
}

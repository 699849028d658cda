use clap::Args;
use miette::Result;
use nms_pak::{EntryInfo, PakArchive};
use nms_path::{NodeId, PathTree};
use owo_colors::OwoColorize;
use std::path::PathBuf;

#[derive(Args)]
pub struct TreeArgs {
    /// An input .pak file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,
}

impl TreeArgs {
    pub fn handle(&self) -> Result<()> {
        let pak = PakArchive::open(&self.file);
        let tree = pak.tree()?;

        println!("{}", self.file.display().bold());
        render(tree, tree.root(), 1);

        Ok(())
    }
}

fn render(tree: &PathTree<EntryInfo>, node: NodeId, depth: usize) {
    for child in tree.children(node) {
        let item = tree.node(*child);
        let indent = "  ".repeat(depth);
        if item.is_dir() {
            println!("{indent}{}", item.text().blue());
            render(tree, *child, depth + 1);
        } else {
            println!("{indent}{}", item.text());
        }
    }
}

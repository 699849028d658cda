pub mod list;
pub mod tree;

#[derive(clap::Subcommand)]
pub enum GameCommands {
    /// List every archive of an installation with its entry count
    List(list::ListArgs),
    /// Build and summarize the merged base-game tree
    Tree(tree::TreeArgs),
}

impl GameCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            GameCommands::List(list) => list.handle(),
            GameCommands::Tree(tree) => tree.handle(),
        }
    }
}

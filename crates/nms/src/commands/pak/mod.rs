pub mod cat;
pub mod extract;
pub mod find;
pub mod info;
pub mod list;
pub mod tree;

#[derive(clap::Subcommand)]
pub enum PakCommands {
    /// Stream one entry to stdout
    Cat(cat::CatArgs),
    /// Extract a .pak file into a directory
    Extract(extract::ExtractArgs),
    /// Recursively find .pak files below a directory
    Find(find::FindArgs),
    /// Show a .pak file's header fields
    Info(info::InfoArgs),
    /// List the entries of a .pak file
    List(list::ListArgs),
    /// Render a .pak file's namespace as a tree
    Tree(tree::TreeArgs),
}

impl PakCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            PakCommands::Cat(cat) => cat.handle(),
            PakCommands::Extract(extract) => extract.handle(),
            PakCommands::Find(find) => find.handle(),
            PakCommands::Info(info) => info.handle(),
            PakCommands::List(list) => list.handle(),
            PakCommands::Tree(tree) => tree.handle(),
        }
    }
}

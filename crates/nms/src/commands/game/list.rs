use clap::Args;
use miette::Result;
use nms_pak::{PakArchive, PakCollection};
use std::path::PathBuf;

#[derive(Args)]
pub struct ListArgs {
    /// The game installation directory
    #[arg(short, long, value_name = "DIR")]
    game: PathBuf,
}

impl ListArgs {
    pub fn handle(&self) -> Result<()> {
        let collection = PakCollection::discover(&self.game)?;
        collection.load_all();

        for pak in collection.game_paks() {
            print_line(pak);
        }
        if !collection.mod_paks().is_empty() {
            println!("mods:");
            for pak in collection.mod_paks() {
                print_line(pak);
            }
        }

        Ok(())
    }
}

fn print_line(pak: &PakArchive) {
    // Unreadable archives were already warned about; list them as empty.
    println!("{:>8} entries  {}", pak.len(), pak.path().display());
}

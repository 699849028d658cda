use clap::Args;
use miette::Result;
use nms_pak::{EntryKind, PakArchive};
use std::path::PathBuf;

#[derive(Args)]
pub struct ListArgs {
    /// An input .pak file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,
}

impl ListArgs {
    pub fn handle(&self) -> Result<()> {
        let pak = PakArchive::open(&self.file);

        for entry in pak.entries()? {
            println!(
                "{:>12}  {:<5} {}",
                entry.length(),
                EntryKind::classify(entry),
                entry.path()
            );
        }

        Ok(())
    }
}

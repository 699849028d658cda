use clap::Args;
use miette::Result;
use nms_pak::PakArchive;
use std::path::PathBuf;
use tracing::warn;
use walkdir::WalkDir;

#[derive(Args)]
pub struct FindArgs {
    /// A directory to search recursively
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,
}

impl FindArgs {
    pub fn handle(&self) -> Result<()> {
        let mut found: Vec<PathBuf> = WalkDir::new(&self.directory)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry
                    .path()
                    .extension()
                    .is_some_and(|extension| extension.eq_ignore_ascii_case("pak"))
            })
            .map(|entry| entry.into_path())
            .collect();
        found.sort();

        for path in found {
            let pak = PakArchive::open(&path);
            match pak.entries() {
                Ok(_) => println!("{:>8} entries  {}", pak.len(), path.display()),
                Err(error) => warn!(%error, "skipping {}", path.display()),
            };
        }

        Ok(())
    }
}

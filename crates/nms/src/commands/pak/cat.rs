use clap::Args;
use miette::{IntoDiagnostic, Result};
use nms_pak::PakArchive;
use std::path::PathBuf;

#[derive(Args)]
pub struct CatArgs {
    /// An input .pak file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Entry path inside the archive, case-insensitive
    #[arg(short, long, value_name = "PATH")]
    path: String,
}

impl CatArgs {
    pub fn handle(&self) -> Result<()> {
        let pak = PakArchive::open(&self.file);
        let entry = pak.by_path(&self.path)?;

        let mut stream = pak.extract(entry)?;
        let stdout = std::io::stdout();
        std::io::copy(&mut stream, &mut stdout.lock()).into_diagnostic()?;

        Ok(())
    }
}

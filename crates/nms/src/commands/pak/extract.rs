use clap::Args;
use miette::{Context, IntoDiagnostic, Result};
use nms_pak::PakArchive;
use std::{fs::File, path::PathBuf};
use tracing::info;

#[derive(Args)]
pub struct ExtractArgs {
    /// An input .pak file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        let pak = PakArchive::open(&self.file);

        for entry in pak.entries()? {
            let target = self.directory.join(entry.path());
            info!("writing {}", target.display());

            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)
                    .into_diagnostic()
                    .context(format!("creating {}", parent.display()))?;
            }
            let mut out = if !self.overwrite {
                File::create_new(&target)
                    .into_diagnostic()
                    .context(format!("creating {}", target.display()))?
            } else {
                File::create(&target)
                    .into_diagnostic()
                    .context(format!("creating {}", target.display()))?
            };

            let mut stream = pak.extract(entry)?;
            std::io::copy(&mut stream, &mut out).into_diagnostic()?;
        }

        Ok(())
    }
}

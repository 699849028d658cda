use clap::Args;
use miette::Result;
use nms_pak::PakArchive;
use std::path::PathBuf;

#[derive(Args)]
pub struct InfoArgs {
    /// An input .pak file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,
}

impl InfoArgs {
    pub fn handle(&self) -> Result<()> {
        let pak = PakArchive::open(&self.file);
        let header = pak.header()?;

        println!("version       {}.{}", header.version_major, header.version_minor);
        println!(
            "compression   {}",
            String::from_utf8_lossy(&header.compression_tag)
        );
        println!("block size    {}", header.block_size);
        println!("flags         {}", header.archive_flags);
        println!("entries       {}", pak.len());
        println!("blocks        {}", pak.block_count()?);
        println!("uncompressed  {} bytes", pak.decompressed_size()?);

        Ok(())
    }
}

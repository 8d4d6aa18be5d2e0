use ba2_archive::{Ba2Archive, Records};
use clap::Args;
use miette::Result;
use owo_colors::{OwoColorize, Stream};
use std::path::PathBuf;

#[derive(Args)]
pub struct ListArgs {
    /// An input BA2 file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Show sizes and texture details next to every name
    #[arg(short, long, default_value_t = false)]
    long: bool,
}

impl ListArgs {
    pub fn handle(&self) -> Result<()> {
        let ba2 = Ba2Archive::open(&self.file)?;

        if !self.long {
            for name in ba2.file_names() {
                println!("{name}");
            }
            return Ok(());
        }

        let header = ba2.header();
        println!(
            "{} v{}, {} entries",
            ba2.archive_type()
                .if_supports_color(Stream::Stdout, |t| t.bold()),
            header.version,
            header.file_count
        );

        match ba2.records() {
            Records::General(files) => {
                for (file, name) in files.iter().zip(ba2.file_names()) {
                    let storage = if file.is_compressed() { "zlib" } else { "raw" };
                    println!(
                        "{:>12} {:<4} {}",
                        file.size(),
                        storage.if_supports_color(Stream::Stdout, |s| s.dimmed()),
                        name
                    );
                }
            }
            Records::Dx10(textures) => {
                for (texture, name) in textures.iter().zip(ba2.file_names()) {
                    let details = format!(
                        "{}x{} mips:{} fmt:{}",
                        texture.width, texture.height, texture.num_mips, texture.format
                    );
                    println!(
                        "{:>12} {:<24} {}",
                        texture.data_size(),
                        details.if_supports_color(Stream::Stdout, |s| s.dimmed()),
                        name
                    );
                }
            }
        }

        if let Some(total) = ba2.decompressed_size() {
            println!("{:>12} total", total);
        }

        Ok(())
    }
}

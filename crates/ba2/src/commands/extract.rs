use ba2_archive::{compression::DEFAULT_SIZE_LIMIT, Ba2Archive, ExtractOptions};
use clap::Args;
use miette::{Context, Result};
use std::{ops::ControlFlow, path::PathBuf};
use tracing::{debug, info, warn};

#[derive(Args)]
pub struct ExtractArgs {
    /// An input BA2 file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// Allow overwriting files in the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,

    /// Tag BC5 textures as ATI2 instead of DXT5
    #[arg(long, default_value_t = false)]
    ati_fourcc: bool,

    /// Largest entry, in bytes, that will be extracted
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_SIZE_LIMIT)]
    size_limit: u64,

    /// Only extract the entries with these names
    #[arg(short, long, value_name = "NAME")]
    entry: Vec<String>,
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        let mut ba2 = Ba2Archive::open(&self.file)?;

        let options = ExtractOptions::builder()
            .overwrite(self.overwrite)
            .use_ati_fourcc(self.ati_fourcc)
            .size_limit(self.size_limit)
            .build();

        if !self.entry.is_empty() {
            for name in &self.entry {
                let path = ba2
                    .extract(name, &self.directory, &options)
                    .context(format!("extracting {name}"))?;
                debug!("extracted {}", path.display());
            }
            return Ok(());
        }

        let count = ba2.len();
        let summary = ba2
            .extract_all(&self.directory, &options, |index, name| {
                debug!("[{}/{}] {}", index + 1, count, name);
                ControlFlow::Continue(())
            })
            .context(format!("extracting {}", self.file.display()))?;

        info!(
            "extracted {} of {} entries into {}",
            summary.written,
            count,
            self.directory.display()
        );
        if summary.skipped_existing > 0 {
            warn!(
                "{} entries already existed, pass --overwrite to replace them",
                summary.skipped_existing
            );
        }
        if summary.skipped_unsupported > 0 {
            warn!(
                "{} textures were skipped because of their pixel format",
                summary.skipped_unsupported
            );
        }

        Ok(())
    }
}

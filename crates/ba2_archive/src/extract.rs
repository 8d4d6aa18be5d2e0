//! Extracting archive entries to the filesystem
//!

use bon::Builder;
use std::{
    fs::{self, File},
    io::{self, BufWriter, Read, Seek, Write},
    ops::ControlFlow,
    path::{Component, Path, PathBuf},
};
use tracing::{debug, info, instrument, warn};

use crate::{
    compression::DEFAULT_SIZE_LIMIT,
    dds::DxgiFormat,
    error::{EntryNotFoundError, Error, Result},
    read::{Ba2Archive, Records},
};

/// Options for how entries should be extracted
#[derive(Debug, Clone, Copy, Builder)]
pub struct ExtractOptions {
    /// Replace files that already exist in the destination
    #[builder(default = true)]
    pub overwrite: bool,

    /// Tag BC5 textures as `ATI2` instead of `DXT5`
    #[builder(default)]
    pub use_ati_fourcc: bool,

    /// Largest payload, in bytes, that will be allocated for a single entry
    #[builder(default = DEFAULT_SIZE_LIMIT)]
    pub size_limit: u64,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions::builder().build()
    }
}

/// What happened during [`Ba2Archive::extract_all`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractSummary {
    /// Files written to the destination
    pub written: usize,

    /// Entries skipped because the destination file already existed
    pub skipped_existing: usize,

    /// Textures skipped because their pixel format has no DDS mapping
    pub skipped_unsupported: usize,
}

enum Outcome {
    Written,
    Exists,
    Unsupported(u8),
}

/// Turn an entry name into a path relative to the destination.
///
/// Archives use `\` as separator, `/` is accepted too. Names that are absolute or that climb
/// out with `..` are rejected.
pub fn entry_path(name: &str) -> Result<PathBuf> {
    let mut path = PathBuf::new();
    for part in name.split(['\\', '/']) {
        match part {
            "" | "." => continue,
            ".." => return Err(Error::UnsafePath(name.to_owned())),
            part => {
                let mut components = Path::new(part).components();
                match (components.next(), components.next()) {
                    (Some(Component::Normal(c)), None) => path.push(c),
                    _ => return Err(Error::UnsafePath(name.to_owned())),
                }
            }
        }
    }

    if name.starts_with(['\\', '/']) || path.as_os_str().is_empty() {
        return Err(Error::UnsafePath(name.to_owned()));
    }

    Ok(path)
}

impl<R: Read + Seek> Ba2Archive<R> {
    /// Extract every entry below `destination`.
    ///
    /// `progress` is called with the index and name of each entry before it is written.
    /// Returning [`ControlFlow::Break`] stops the extraction with [`Error::Cancelled`].
    ///
    /// Extraction is not atomic: files written before a failure stay on disk. Textures in a
    /// pixel format without a DDS mapping are skipped and only show up in the summary.
    #[instrument(skip(self, destination, options, progress), fields(destination = %destination.as_ref().display()), err)]
    pub fn extract_all<F>(
        &mut self,
        destination: impl AsRef<Path>,
        options: &ExtractOptions,
        mut progress: F,
    ) -> Result<ExtractSummary>
    where
        F: FnMut(usize, &str) -> ControlFlow<()>,
    {
        let destination = destination.as_ref();
        let mut summary = ExtractSummary::default();

        for index in 0..self.len() {
            let name = self
                .name_for_index(index)
                .ok_or(EntryNotFoundError::Index(index))?
                .to_owned();

            if progress(index, &name).is_break() {
                info!(index, "extraction cancelled");
                return Err(Error::Cancelled);
            }

            match self.extract_index(index, &name, destination, options)? {
                Outcome::Written => summary.written += 1,
                Outcome::Exists => summary.skipped_existing += 1,
                Outcome::Unsupported(_) => summary.skipped_unsupported += 1,
            }
        }

        debug!(?summary, "extraction finished");
        Ok(summary)
    }

    /// Extract the entry called `name` below `destination`, returning the written path.
    ///
    /// Unlike [`Ba2Archive::extract_all`] an unsupported texture format is an error here.
    /// With `overwrite` disabled an existing file is left alone and its path returned.
    #[instrument(skip(self, destination, options), err)]
    pub fn extract(
        &mut self,
        name: &str,
        destination: impl AsRef<Path>,
        options: &ExtractOptions,
    ) -> Result<PathBuf> {
        let index = self
            .index_for_name(name)
            .ok_or_else(|| EntryNotFoundError::Name(name.to_owned()))?;

        let target = destination.as_ref().join(entry_path(name)?);
        match self.extract_index(index, name, destination.as_ref(), options)? {
            Outcome::Unsupported(format) => Err(Error::UnsupportedPixelFormat(format)),
            Outcome::Written | Outcome::Exists => Ok(target),
        }
    }

    fn extract_index(
        &mut self,
        index: usize,
        name: &str,
        destination: &Path,
        options: &ExtractOptions,
    ) -> Result<Outcome> {
        let target = destination.join(entry_path(name)?);

        if let Some(format) = self.unsupported_format(index) {
            warn!(name, format, "skipping texture with unsupported pixel format");
            return Ok(Outcome::Unsupported(format));
        }

        if !options.overwrite && target.exists() {
            debug!(path = %target.display(), "keeping existing file");
            return Ok(Outcome::Exists);
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = if options.overwrite {
            File::create(&target)?
        } else {
            match File::create_new(&target) {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(Outcome::Exists),
                Err(e) => return Err(e.into()),
            }
        };

        info!("writing {}", target.display());
        let mut out = BufWriter::new(file);
        self.write_entry(index, &mut out, options)?;
        out.flush()?;

        Ok(Outcome::Written)
    }

    fn unsupported_format(&self, index: usize) -> Option<u8> {
        match self.records() {
            Records::Dx10(textures) => textures
                .get(index)
                .filter(|t| DxgiFormat::try_from(t.format).is_err())
                .map(|t| t.format),
            Records::General(_) => None,
        }
    }
}

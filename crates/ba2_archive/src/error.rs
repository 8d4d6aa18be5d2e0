//! Error types that can be emitted from this library

use std::{io, path::PathBuf};

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(io::Error),

    /// Transparent warpper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(binrw::Error),

    /// the archive at {path} could not be opened
    #[error("unable to open archive {}", .path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// file does not start with the BTDX signature
    #[error("not a ba2 archive, found magic {0:02X?}")]
    #[diagnostic(help("ba2 archives start with the bytes \"BTDX\""))]
    BadMagic([u8; 4]),

    /// archive type tag is neither GNRL nor DX10
    #[error("unknown archive type {}", String::from_utf8_lossy(.0))]
    UnknownType([u8; 4]),

    /// the stream ended before a declared structure was complete
    #[error("archive is truncated")]
    Truncated,

    /// the name table does not hold one name per record
    #[error("name table holds {found} names but the archive declares {expected} files")]
    NameCountMismatch { expected: u32, found: usize },

    /// zlib reported an error for a stored payload
    #[error("unable to decompress payload")]
    DecompressFailed(#[source] flate2::DecompressError),

    /// a payload inflated to a different size than recorded
    #[error("payload inflated to {actual} bytes, expected {expected}")]
    SizeMismatch { expected: u64, actual: u64 },

    /// a size field exceeds the configured allocation limit
    #[error("payload of {size} bytes exceeds the limit of {limit} bytes")]
    SizeLimitExceeded { size: u64, limit: u64 },

    /// texture uses a DXGI format that has no classic DDS mapping
    #[error("unsupported pixel format {0}")]
    UnsupportedPixelFormat(u8),

    /// unable to find requested entry
    #[error("unable to find requested entry")]
    EntryNotFound(#[from] EntryNotFoundError),

    /// entry name would resolve outside of the destination directory
    #[error("refusing to extract {0}")]
    #[diagnostic(help("entry names must be relative and must not contain \"..\""))]
    UnsafePath(String),

    /// the progress callback requested cancellation
    #[error("extraction cancelled")]
    Cancelled,

    /// {0}
    #[error("{0}")]
    CustomError(String),
}

/// Error type to provide further information when an entry has not been found
#[derive(Error, Diagnostic, Debug)]
#[error("unable to find requested entry")]
pub enum EntryNotFoundError {
    /// at index {0}
    #[error("at index {0}")]
    Index(usize),

    /// by name {0}
    #[error("by name {0}")]
    Name(String),
}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        match value.kind() {
            io::ErrorKind::UnexpectedEof => Error::Truncated,
            _ => Error::IOError(value),
        }
    }
}

impl From<binrw::Error> for Error {
    fn from(value: binrw::Error) -> Self {
        if value.is_eof() {
            return Error::Truncated;
        }

        match value {
            binrw::Error::Io(e) => Error::from(e),
            other => Error::BinRWError(other),
        }
    }
}

/// Flat error codes for callers that cannot depend on [`Error`] itself, such as host
/// language bindings.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    AccessFailed,
    FileNotFound,
    InvalidData,
    Truncated,
    DecompressFailed,
    UnsupportedFormat,
    EntryNotFound,
    Cancelled,
}

impl ErrorCode {
    /// Stable message for the code
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::AccessFailed => "access failed",
            ErrorCode::FileNotFound => "file not found",
            ErrorCode::InvalidData => "invalid data",
            ErrorCode::Truncated => "truncated",
            ErrorCode::DecompressFailed => "decompression failed",
            ErrorCode::UnsupportedFormat => "unsupported format",
            ErrorCode::EntryNotFound => "entry not found",
            ErrorCode::Cancelled => "canceled",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Collapse this error into its [`ErrorCode`]
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::IOError(_) => ErrorCode::AccessFailed,
            Error::NotFound { .. } => ErrorCode::FileNotFound,
            Error::BinRWError(_)
            | Error::BadMagic(_)
            | Error::UnknownType(_)
            | Error::NameCountMismatch { .. }
            | Error::SizeLimitExceeded { .. }
            | Error::UnsafePath(_)
            | Error::CustomError(_) => ErrorCode::InvalidData,
            Error::Truncated => ErrorCode::Truncated,
            Error::DecompressFailed(_) | Error::SizeMismatch { .. } => {
                ErrorCode::DecompressFailed
            }
            Error::UnsupportedPixelFormat(_) => ErrorCode::UnsupportedFormat,
            Error::EntryNotFound(_) => ErrorCode::EntryNotFound,
            Error::Cancelled => ErrorCode::Cancelled,
        }
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;

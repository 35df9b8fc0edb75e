//! Error types for presentation package handling.

use thiserror::Error;

/// Result type alias using the package [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while reading, editing or writing a presentation package.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open, read or write a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP container error.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Malformed XML in a package part, or a failure writing XML.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A part referenced by the package is not present in the archive.
    #[error("missing package part: {0}")]
    MissingPart(String),

    /// The archive is not a usable presentation package.
    #[error("invalid package: {0}")]
    InvalidPackage(String),

    /// A slide layout was requested by an index the master does not have.
    #[error("slide layout index {index} out of range ({available} layouts available)")]
    LayoutOutOfRange { index: usize, available: usize },
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(err.into())
    }
}

//! Unified error type for the pixelforge service.
//!
//! All modules funnel their failures into [`Error`], which carries enough
//! context for HTTP handlers to derive a status code via
//! [`Error::http_status`].

use std::fmt;

/// Unified error type covering all failure modes in pixelforge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested entity could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "image").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// Request data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Submitted or stored bytes could not be decoded as an image.
    #[error("Decode error [{name}]: {message}")]
    Decode {
        /// Filename of the offending input.
        name: String,
        /// Human-readable decoder diagnostic.
        message: String,
    },

    /// An image transform could not be applied.
    #[error("Transform error [{name}]: {message}")]
    Transform {
        /// Filename of the offending input.
        name: String,
        /// Human-readable description of the failure.
        message: String,
    },

    /// Assembling a zip archive failed.
    #[error("Archive error: {0}")]
    Archive(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::NotFound { .. } => 404,
            Error::Validation(_) => 400,
            Error::Decode { .. } => 422,
            Error::Transform { .. } => 422,
            Error::Archive(_) => 500,
            Error::Io { .. } => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Decode`].
    pub fn decode(name: impl Into<String>, message: impl fmt::Display) -> Self {
        Error::Decode {
            name: name.into(),
            message: message.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Transform`].
    pub fn transform(name: impl Into<String>, message: impl fmt::Display) -> Self {
        Error::Transform {
            name: name.into(),
            message: message.to_string(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

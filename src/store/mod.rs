//! Flat-directory image store.
//!
//! Uploaded images live as plain files in a single directory, keyed by
//! filename. The directory listing is authoritative; there is no index and
//! no locking, so concurrent writers to the same name race with
//! last-writer-wins semantics.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Directory-backed key/value store for uploaded images.
///
/// The filename is the only key. Writes overwrite silently; this is the
/// store's documented collision policy, not an accident.
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    /// Open a store rooted at `root`, creating the directory if absent.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The directory backing this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` under `name`, overwriting any existing file.
    pub fn put(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let path = self.entry_path(name)?;
        std::fs::write(&path, bytes)?;
        Ok(())
    }

    /// Read the stored bytes for `name`.
    ///
    /// Returns [`Error::NotFound`] when no file of that name exists.
    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.entry_path(name)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::not_found("image", name))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// List the filenames currently present, in directory enumeration order.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(names)
    }

    /// Resolve `name` to a path inside the store root.
    ///
    /// Names that are empty, contain path separators, or are dot components
    /// are rejected so a request can never address files outside the root.
    fn entry_path(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(Error::Validation(format!("Illegal filename: {name:?}")));
        }
        Ok(self.root.join(name))
    }
}

/// Guess the MIME type for a stored file from its extension.
pub fn content_type_for(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("tif") | Some("tiff") => "image/tiff",
        _ => "application/octet-stream",
    }
}

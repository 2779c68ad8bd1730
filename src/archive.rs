//! In-memory zip packaging for batch transform responses.
//!
//! The whole archive is buffered before the response is sent; memory use
//! scales with the sum of encoded entry sizes.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Error, Result};

/// Builder for an in-memory zip archive of named byte buffers.
pub struct ZipBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    /// Append one deflate-compressed entry.
    pub fn add(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.writer
            .start_file(name, options)
            .map_err(|e| Error::Archive(format!("Failed to start entry {name:?}: {e}")))?;
        self.writer
            .write_all(bytes)
            .map_err(|e| Error::Archive(format!("Failed to write entry {name:?}: {e}")))?;
        Ok(())
    }

    /// Finalize the archive and return its bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        let cursor = self
            .writer
            .finish()
            .map_err(|e| Error::Archive(format!("Failed to finalize archive: {e}")))?;
        Ok(cursor.into_inner())
    }
}

impl Default for ZipBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Disambiguate an entry name against those already used in the archive.
///
/// The zip writer rejects duplicate entry names, but clients may legally
/// submit several files with the same filename. Repeats get a numeric
/// suffix before the extension: `same.png`, `same_1.png`, `same_2.png`.
pub fn unique_entry_name(name: String, used: &mut HashSet<String>) -> String {
    if used.insert(name.clone()) {
        return name;
    }

    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) => (stem.to_string(), format!(".{ext}")),
        None => (name.clone(), String::new()),
    };

    let mut n = 1u32;
    loop {
        let candidate = format!("{stem}_{n}{ext}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

//! Writer for merged list files.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::dedup::MergedList;
use crate::{Error, Result};

/// Writes a merged list as sorted text, one entry per line.
///
/// The destination is replaced atomically: content is written to a
/// temporary file in the same directory, then renamed over the target.
pub struct ListWriter {
    path: PathBuf,
}

impl ListWriter {
    /// Create a writer for the given destination path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Write the list, overwriting any existing file.
    ///
    /// Returns the number of lines written.
    pub fn write(&self, list: &MergedList) -> Result<usize> {
        let entries = list.entries();
        let content = render_entries(entries.iter());
        self.write_content(content.as_bytes())?;

        log::info!("Wrote {} entries to {:?}", entries.len(), self.path);
        Ok(entries.len())
    }

    fn write_content(&self, content: &[u8]) -> Result<()> {
        let wrap = |source: std::io::Error| Error::WriteFile {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = NamedTempFile::new_in(dir).map_err(wrap)?;
        temp.write_all(content).map_err(wrap)?;
        if let Some(permissions) = self.target_permissions() {
            temp.as_file().set_permissions(permissions).map_err(wrap)?;
        }
        temp.as_file().sync_all().map_err(wrap)?;
        temp.persist(&self.path).map_err(|e| wrap(e.error))?;

        Ok(())
    }

    /// Permissions for the replacement file: those of the existing output,
    /// or 0644 for a new one (temp files are created 0600).
    fn target_permissions(&self) -> Option<fs::Permissions> {
        if let Ok(meta) = fs::metadata(&self.path) {
            return Some(meta.permissions());
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            Some(fs::Permissions::from_mode(0o644))
        }
        #[cfg(not(unix))]
        {
            None
        }
    }
}

/// Render a merged list exactly as it is written to disk.
pub fn render(list: &MergedList) -> String {
    render_entries(list.entries().iter())
}

fn render_entries<'a>(entries: impl Iterator<Item = &'a String>) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(entry);
        out.push('\n');
    }
    out
}

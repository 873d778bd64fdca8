//! Replace-on-write for store files.
//!
//! Content is written to a temp file in the target's directory, synced,
//! then renamed over the target. A crash mid-write leaves either the old
//! file or the new one, never a truncated mix.

use std::io::Write;
use std::path::Path;

use super::StoreError;

/// Atomically replace `path` with the bytes produced by `write`.
pub fn replace_with<F>(path: &Path, write: F) -> Result<(), StoreError>
where
    F: FnOnce(&mut std::fs::File) -> Result<(), StoreError>,
{
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    write(tmp.as_file_mut())?;
    tmp.as_file_mut().flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}

/// Atomically replace `path` with `bytes`.
pub fn replace_bytes(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    replace_with(path, |file| {
        file.write_all(bytes)?;
        Ok(())
    })
}

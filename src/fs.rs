use crate::exceptions::ParleyError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Atomically write pretty-printed JSON using a temp file + rename strategy.
pub fn atomic_write_json<T: Serialize>(path: &Path, data: &T) -> Result<(), ParleyError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;

    // Create the temp file in the destination directory so the rename stays
    // on one filesystem.
    let mut temp_file = NamedTempFile::new_in(dir)?;

    {
        let mut writer = std::io::BufWriter::new(&mut temp_file);
        serde_json::to_writer_pretty(&mut writer, data)?;
        writer.flush()?;
    }

    temp_file.persist(path).map_err(|e| ParleyError::Io(e.error))?;
    Ok(())
}

/// A parse failure here is fatal to the caller; the store has no recovery
/// heuristics for corrupt records.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ParleyError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

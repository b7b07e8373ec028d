use std::fs;
use std::path::Path;

use odbx_model::ResultArchive;

use crate::error::Result;

pub fn load_archive(path: impl AsRef<Path>) -> Result<ResultArchive> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub fn save_archive(path: impl AsRef<Path>, archive: &ResultArchive) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_vec_pretty(archive)?)?;
    Ok(())
}

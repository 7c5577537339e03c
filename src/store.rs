//! Flat-file persistence: the listing URL file and the JSON result store.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::error::{Result, ScoutError};
use crate::models::PostRecord;

/// Read one relative post path per line, line endings stripped.
pub async fn read_post_urls(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| ScoutError::io(path, e))?;

    Ok(content
        .lines()
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect())
}

/// Write post paths newline-separated, replacing the file.
pub async fn write_post_urls(path: &Path, urls: &[String]) -> Result<()> {
    write_atomically(path, urls.join("\n").as_bytes()).await
}

/// Load the whole result store, or an empty one if the file does not exist yet.
pub async fn load_results(path: &Path) -> Result<Vec<PostRecord>> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No result store at {}, starting empty", path.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(ScoutError::io(path, e)),
    };

    serde_json::from_str(&content).map_err(|source| ScoutError::StoreFormat {
        path: path.to_path_buf(),
        source,
    })
}

/// Rewrite the whole result store.
pub async fn save_results(path: &Path, records: &[PostRecord]) -> Result<()> {
    let json = serde_json::to_string(records).map_err(|source| ScoutError::StoreFormat {
        path: path.to_path_buf(),
        source,
    })?;
    write_atomically(path, json.as_bytes()).await
}

/// Write to a sibling temp file, then rename over the target so readers
/// never see a half-written file.
async fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| ScoutError::io(parent, e))?;
    }

    let tmp = temp_path(path);
    fs::write(&tmp, bytes)
        .await
        .map_err(|e| ScoutError::io(&tmp, e))?;
    fs::rename(&tmp, path)
        .await
        .map_err(|e| ScoutError::io(path, e))?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

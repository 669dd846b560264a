pub mod result_store;
pub mod test_store;
pub mod user_store;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::fs;

use crate::error::Result;

/// Serialize `value` next to `path` and rename it into place, so a crash
/// mid-write never leaves a truncated store file behind.
pub(crate) async fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, &bytes).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

//! Atomic tile storage.

use std::io;
use std::path::Path;

use super::request::temp_path_for;

/// Writes `data` to `destination` so that the destination either does not
/// exist or holds the complete body.
///
/// The bytes go to a `.part` sibling first and are renamed into place.
pub async fn write_atomic(destination: &Path, data: &[u8]) -> io::Result<()> {
    let temp = temp_path_for(destination);
    let written = tokio::fs::write(&temp, data).await;
    discard_on_error(&temp, written).await?;
    let renamed = tokio::fs::rename(&temp, destination).await;
    discard_on_error(&temp, renamed).await
}

/// Removes a partial `.part` file when the step that produced `result` failed.
async fn discard_on_error(temp: &Path, result: io::Result<()>) -> io::Result<()> {
    if result.is_err() {
        let _ = tokio::fs::remove_file(temp).await;
    }
    result
}

use crate::error::{AppError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};

/// Moves `source` into `destination_dir` under `file_name`, creating the
/// directory first. Tries an atomic rename and falls back to copy + delete
/// when the rename is refused (for example across filesystems).
///
/// On a failed copy the half-written destination is removed. If the copy
/// lands but the source cannot be deleted, `AppError::PartialMove` is
/// returned: the file then exists in both places.
pub async fn move_file(source: &Path, destination_dir: &Path, file_name: &str) -> Result<PathBuf> {
    fs::create_dir_all(destination_dir).await?;
    let destination = destination_dir.join(file_name);

    match fs::rename(source, &destination).await {
        Ok(()) => return Ok(destination),
        Err(e) => {
            tracing::debug!(
                "Rename {} -> {} failed ({}), falling back to copy",
                source.display(),
                destination.display(),
                e
            );
        }
    }

    copy_then_remove(source, &destination).await?;
    Ok(destination)
}

async fn copy_then_remove(source: &Path, destination: &Path) -> Result<()> {
    // Opening the source first keeps a missing file from creating an empty destination
    let mut reader = fs::File::open(source).await?;
    copy_to_new_file(&mut reader, destination).await?;

    fs::remove_file(source)
        .await
        .map_err(|e| AppError::PartialMove {
            path: destination.display().to_string(),
            message: e.to_string(),
        })
}

/// Streams `reader` into a freshly created `destination`. A copy that fails
/// part way removes the half-written file before returning the error.
async fn copy_to_new_file<R>(reader: &mut R, destination: &Path) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut writer = fs::File::create(destination).await?;

    let copied = async {
        tokio::io::copy(&mut *reader, &mut writer).await?;
        writer.flush().await?;
        writer.sync_all().await
    }
    .await;

    if let Err(e) = copied {
        drop(writer);
        if let Err(cleanup) = fs::remove_file(destination).await {
            tracing::warn!(
                "Failed to remove partial copy {}: {}",
                destination.display(),
                cleanup
            );
        }
        return Err(AppError::Io(e));
    }

    Ok(())
}

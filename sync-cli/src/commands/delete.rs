//! Delete a tracked file's record.

use anyhow::{bail, Context, Result};
use std::path::Path;

use super::Session;

/// Delete the record behind `path` and stop tracking the file.
///
/// Once the delete is accepted the file is forgotten whatever the remote
/// outcome; a failed delete is still reported. The local file is left alone.
pub async fn run(session: &mut Session, path: &Path) -> Result<()> {
    let item = session.item(path, false).await?;

    let Some(deletion) = session.tracker.delete(&item.id()).await? else {
        bail!("delete refused: {} is {}", path.display(), item.status());
    };
    let outcome = deletion.await;

    session.manifest.remove(path);
    session.save_manifest().await?;

    outcome.with_context(|| format!("Failed to delete record {}", item.id()))?;
    println!("delete: {} untracked (record {} removed)", path.display(), item.id());
    Ok(())
}

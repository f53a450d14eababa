//! Show sync status of a file.

use anyhow::Result;
use itemsync_content::{FsStore, LocalStore};
use itemsync_types::Digest;
use std::fmt::Write as _;
use std::path::Path;

use super::Session;

fn digest_or_dash(digest: Option<Digest>) -> String {
    digest.map(|d| d.short()).unwrap_or_else(|| "-".into())
}

/// Run the status command.
pub async fn run(session: &mut Session, path: &Path) -> Result<()> {
    print!("{}", report(session, path).await?);
    Ok(())
}

/// Build the status report for `path`.
pub async fn report(session: &mut Session, path: &Path) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "File:    {}", path.display())?;

    let Some(entry) = session.manifest.get(path).cloned() else {
        writeln!(out, "Status:  untracked")?;
        return Ok(out);
    };

    let item = session.item(path, false).await?;
    let record = item.snapshot().await?;
    let hasher = session.config.hash.hasher();
    let local = match FsStore::new().read(path).await {
        Ok(bytes) => Some(hasher.digest(&bytes)),
        Err(e) if e.is_not_found() => None,
        Err(e) => return Err(e.into()),
    };

    writeln!(out, "Record:  {}", entry.record_id)?;
    writeln!(out, "Status:  {}", item.status())?;
    writeln!(
        out,
        "Tag:     {}",
        record
            .change_tag
            .map(|t| t.to_string())
            .unwrap_or_else(|| "unsaved".into())
    )?;
    writeln!(out, "Local:   {}", digest_or_dash(local))?;
    writeln!(out, "Remote:  {}", digest_or_dash(record.checksum))?;
    writeln!(out, "Base:    {}", digest_or_dash(entry.base))?;
    writeln!(out, "Hash:    {}", hasher.algorithm())?;

    Ok(out)
}

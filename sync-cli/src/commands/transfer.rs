//! Upload, download and replace.

use anyhow::{bail, Context, Result};
use itemsync_client::Reflected;
use std::fmt;
use std::path::Path;

use super::Session;

/// Which way the bytes go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    /// Local bytes to the record, if the record is unchanged.
    Upload,
    /// Record bytes over the local file.
    Download,
    /// Local bytes over the record, whatever it holds.
    Replace,
}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Transfer::Upload => "upload",
            Transfer::Download => "download",
            Transfer::Replace => "replace",
        })
    }
}

/// Run a transfer for `path` and wait for it to settle.
pub async fn run(session: &mut Session, path: &Path, transfer: Transfer) -> Result<()> {
    let item = session.item(path, transfer == Transfer::Upload).await?;

    let issued = match transfer {
        Transfer::Upload => item.upload().await?,
        Transfer::Download => item.download().await?,
        Transfer::Replace => item.replace().await?,
    };
    let Some(reflection) = issued else {
        bail!(
            "{} refused: {} is {}",
            transfer,
            path.display(),
            item.status()
        );
    };

    match reflection
        .await
        .with_context(|| format!("{} of {} failed", transfer, path.display()))?
    {
        Reflected::Completed => {
            let snapshot = item.snapshot().await?;
            session.manifest.set_base(path, snapshot.checksum);
            session.save_manifest().await?;

            println!(
                "{}: {} synced (record {}, tag {}, checksum {})",
                transfer,
                path.display(),
                snapshot.id,
                snapshot
                    .change_tag
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "-".into()),
                snapshot
                    .checksum
                    .map(|c| c.short())
                    .unwrap_or_else(|| "-".into()),
            );
        }
        Reflected::Superseded => {
            println!("{}: {} superseded by a newer request", transfer, path.display());
        }
    }

    Ok(())
}

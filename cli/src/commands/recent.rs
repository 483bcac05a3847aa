//! Recently opened file commands

use anyhow::Result;
use fpick_core::recency::RecordOutcome;
use fpick_core::FilePicker;
use std::path::PathBuf;
use tracing::debug;

/// Record a file as opened and persist the recency list immediately.
pub async fn opened_command(picker: &FilePicker, path: PathBuf) -> Result<()> {
    let path = crate::absolutize(&path)?;
    let outcome = picker.record_opened(&path.to_string_lossy()).await?;
    match outcome {
        RecordOutcome::Recorded => {
            picker.flush().await?;
            println!("recorded {}", path.display());
        }
        RecordOutcome::Unchanged => {
            debug!("recency list unchanged for {}", path.display());
            println!("unchanged");
        }
    }
    Ok(())
}

/// Print the merged recency list, most recent first.
pub async fn recent_command(picker: &FilePicker) -> Result<()> {
    let recent = picker.recent_list().await?;
    if recent.is_empty() {
        println!("no recently opened files");
        return Ok(());
    }
    for path in &recent {
        println!("{}", path);
    }
    Ok(())
}

//! Exclusion management commands

use anyhow::{bail, Result};
use fpick_core::FilePicker;
use std::path::PathBuf;

/// Exclude directories from indexing and splice them out of any
/// existing database.
pub async fn exclude_command(picker: &FilePicker, dirs: Vec<PathBuf>) -> Result<()> {
    let dirs = dirs
        .iter()
        .map(|dir| crate::absolutize(dir))
        .collect::<Result<Vec<_>>>()?;

    let report = picker.add_exclude_dirs(&dirs).await?;
    for dir in &report.excluded {
        println!("excluded {}", dir.display());
    }
    for dir in &report.skipped {
        println!("already excluded: {}", dir.display());
    }
    if report.removed_files > 0 {
        println!("removed {} indexed files", report.removed_files);
    }
    for root in &report.roots_without_database {
        println!(
            "no database for {} yet; run build-index to pick the exclusion up",
            root.display()
        );
    }
    if let Some(dir) = report.rejected.first() {
        bail!("not inside any workspace root: {}", dir.display());
    }
    Ok(())
}

/// Re-include previously excluded directories and re-index their files.
pub async fn unexclude_command(picker: &FilePicker, dirs: Vec<PathBuf>) -> Result<()> {
    let dirs = dirs
        .iter()
        .map(|dir| crate::absolutize(dir))
        .collect::<Result<Vec<_>>>()?;

    let report = picker.cancel_exclude_dirs(&dirs).await?;
    for dir in &report.restored {
        println!("re-included {}", dir.display());
    }
    for dir in &report.skipped {
        println!("not excluded: {}", dir.display());
    }
    if report.restored_files > 0 {
        println!("restored {} indexed files", report.restored_files);
    }
    for (dir, ancestor) in &report.blocked {
        println!(
            "cannot re-include {}: ancestor {} is still excluded",
            dir.display(),
            ancestor.display()
        );
    }
    if let Some(dir) = report.rejected.first() {
        bail!("not inside any workspace root: {}", dir.display());
    }
    Ok(())
}

//! Database build command

use anyhow::Result;
use fpick_core::FilePicker;
use std::path::{Path, PathBuf};
use tracing::info;

/// Build the search database for one root, or for all of them.
pub async fn build_command(picker: &FilePicker, root: Option<PathBuf>) -> Result<()> {
    let targets: Vec<PathBuf> = match root {
        Some(root) => vec![crate::absolutize(&root)?],
        None => picker.roots().to_vec(),
    };

    for root in &targets {
        info!("building search database for {}", root.display());
        let mut count = 0usize;
        let database_file = picker
            .build_index(root, &mut |_path: &Path| count += 1)
            .await?;
        println!("indexed {} files under {}", count, root.display());
        println!("database: {}", database_file.display());
    }
    Ok(())
}

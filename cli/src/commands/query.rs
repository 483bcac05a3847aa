//! Query command

use anyhow::Result;
use fpick_core::FilePicker;

/// Search the databases and print one result per line.
///
/// File results print as absolute paths; sentinel rows (no database
/// built yet, nothing matched) print their message text.
pub async fn query_command(picker: &FilePicker, pattern: &str) -> Result<()> {
    let results = picker.query(pattern).await?;
    for item in &results {
        match &item.path {
            Some(path) => println!("{}", path),
            None => println!("{}", item.label),
        }
    }
    Ok(())
}

use std::path::{Path, PathBuf};

use chrono::Local;
use tokio::{fs::File, io::AsyncWriteExt};

use crate::clean::CleanTable;
use crate::{info_time, Error, Result};

/// Column headers of the exported table, in order.
pub const COLUMNS: [&str; 7] = [
    "Title",
    "Brand",
    "Rating",
    "Reviews",
    "Price",
    "Image URL",
    "Product URL",
];

/// `amazon_{keyword}_cleaned.csv`, with spaces in the keyword replaced by underscores.
pub fn output_file_name(keyword: &str) -> String {
    format!("amazon_{}_cleaned.csv", keyword.replace(' ', "_"))
}

/// Where the table for `keyword` ends up inside `dir`.
pub fn output_path(dir: &Path, keyword: &str) -> PathBuf {
    dir.join(output_file_name(keyword))
}

/// Serializes the table as CSV: a header row followed by the rows in table order.
/// The header is written even for an empty table.
pub fn to_csv(table: &CleanTable) -> Result<Vec<u8>> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    wtr.write_record(COLUMNS)?;
    for row in table {
        wtr.serialize(row)?;
    }
    wtr.into_inner().map_err(|e| Error::Io(e.into_error()))
}

/// Writes the table to `path` as CSV.
pub async fn write_csv(path: &Path, table: &CleanTable) -> Result<()> {
    let local_now = Local::now();
    let bytes = to_csv(table)?;
    let mut file = File::create(path).await?;
    file.write_all(&bytes).await?;
    file.flush().await?;
    info_time!(
        local_now,
        "Wrote {} rows to file: {}",
        table.len(),
        path.display()
    );
    Ok(())
}

// src/pipeline/export.rs

//! Export of collected records.
//!
//! Both formats are pure transforms of the record slice; the order of the
//! slice (newest to oldest) is kept as-is.

use std::path::Path;

use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::Record;

/// Field delimiter of the delimited-text export.
pub const DELIMITER: &str = ",";

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    /// Render `records` in this format.
    pub fn render(self, records: &[Record]) -> Result<Vec<u8>> {
        match self {
            ExportFormat::Json => to_json(records),
            ExportFormat::Csv => Ok(to_delimited(records)),
        }
    }

    /// Suggested download name.
    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Json => "telegram_messages.json",
            ExportFormat::Csv => "telegram_messages.csv",
        }
    }
}

/// Indented JSON array of records.
pub fn to_json(records: &[Record]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(records)?)
}

/// Delimited text: a header row of field names, then one fully quoted row
/// per record. No records means no bytes at all.
pub fn to_delimited(records: &[Record]) -> Vec<u8> {
    if records.is_empty() {
        return Vec::new();
    }

    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(Record::FIELDS.join(DELIMITER));
    for record in records {
        let row = record
            .columns()
            .iter()
            .map(|field| quote(field))
            .collect::<Vec<_>>()
            .join(DELIMITER);
        lines.push(row);
    }

    lines.join("\n").into_bytes()
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Write export bytes to `path` atomically (write to temp, then rename).
pub async fn write_export(path: impl AsRef<Path>, bytes: &[u8]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp = path.with_extension("tmp");
    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    drop(file);

    tokio::fs::rename(&tmp, path).await?;
    log::info!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

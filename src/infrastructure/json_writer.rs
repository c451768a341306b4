use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::info;

use crate::domain::dataset::Row;
use crate::domain::error::{AppError, Result};

const INDENT: &[u8] = b"    ";

/// Writes row sets as pretty-printed UTF-8 JSON. Non-ASCII text is kept literal.
pub struct JsonWriter;

impl JsonWriter {
    /// Render rows as a JSON array of string arrays
    pub fn to_json_string(rows: &[Row]) -> Result<String> {
        let mut buffer = Vec::new();
        Self::serialize_into(rows, &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| AppError::ParseError(format!("Serialized JSON is not UTF-8: {}", e)))
    }

    /// Write rows to `path`, replacing any existing file
    pub fn write(rows: &[Row], path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::IoError(format!("Failed to create dir {}: {}", parent.display(), e))
            })?;
        }

        let file = fs::File::create(path).map_err(|e| {
            AppError::IoError(format!("Failed to create {}: {}", path.display(), e))
        })?;
        let mut writer = BufWriter::new(file);
        Self::serialize_into(rows, &mut writer)?;
        writer.flush().map_err(|e| {
            AppError::IoError(format!("Failed to write {}: {}", path.display(), e))
        })?;

        info!(path = %path.display(), rows = rows.len(), "Wrote combined JSON");
        Ok(())
    }

    fn serialize_into<W: Write>(rows: &[Row], writer: W) -> Result<()> {
        let mut serializer =
            serde_json::Serializer::with_formatter(writer, PrettyFormatter::with_indent(INDENT));
        rows.serialize(&mut serializer).map_err(|e| {
            if e.is_io() {
                AppError::IoError(format!("Failed to write JSON: {}", e))
            } else {
                AppError::ParseError(format!("Failed to serialize JSON: {}", e))
            }
        })
    }
}

// ============================================================
// DELIMITED READER
// ============================================================
// Decode a text file, normalize its delimiter and split it into rows

use std::path::Path;

use encoding_rs::Encoding;
use tracing::{debug, info};

use super::encoding_detector::EncodingDetector;
use crate::domain::dataset::{Dataset, Row};
use crate::domain::error::{AppError, Result};

/// Options controlling delimiter normalization and line handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Character rewritten to `target_delimiter` before splitting
    pub source_delimiter: char,

    /// Character fields are split on
    pub target_delimiter: char,

    /// Drop lines that are empty after trimming
    pub skip_blank_lines: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            source_delimiter: ',',
            target_delimiter: ';',
            skip_blank_lines: false,
        }
    }
}

/// Reader for delimited text files of unknown encoding
#[derive(Default)]
pub struct DelimitedReader {
    options: ReaderOptions,
    detector: EncodingDetector,
}

impl DelimitedReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: ReaderOptions) -> Self {
        self.options = options;
        self
    }

    /// Set whether blank lines produce rows
    pub fn with_skip_blank_lines(mut self, skip: bool) -> Self {
        self.options.skip_blank_lines = skip;
        self
    }

    /// Read a file, detecting its encoding from the leading bytes first
    pub fn read_file(&self, path: &Path) -> Result<Dataset> {
        let detected = self.detector.detect_file(path)?;

        let bytes = std::fs::read(path).map_err(|e| {
            AppError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let text = decode(&bytes, detected.encoding).map_err(|e| match e {
            AppError::EncodingError(msg) => {
                AppError::EncodingError(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;

        let rows = self.parse_text(&text);
        info!(
            path = %path.display(),
            encoding = detected.name(),
            rows = rows.len(),
            "Read delimited file"
        );
        Ok(rows)
    }

    /// Split already-decoded text into rows. `\r\n` and a lone `\r` both end a line.
    pub fn parse_text(&self, text: &str) -> Dataset {
        let normalized = self.normalize(text);
        debug!(text = %normalized, "Normalized file contents");

        normalized
            .split('\n')
            .map(str::trim)
            .filter(|line| !(self.options.skip_blank_lines && line.is_empty()))
            .map(|line| self.parse_line(line))
            .collect()
    }

    fn normalize(&self, text: &str) -> String {
        let ReaderOptions {
            source_delimiter,
            target_delimiter,
            ..
        } = self.options;

        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        if source_delimiter == target_delimiter {
            text
        } else {
            text.replace(source_delimiter, target_delimiter.encode_utf8(&mut [0; 4]))
        }
    }

    fn parse_line(&self, line: &str) -> Row {
        line.split(self.options.target_delimiter)
            .map(clean_field)
            .collect()
    }
}

/// Decode bytes with the given encoding, failing on malformed sequences.
/// A byte-order mark matching the encoding is dropped.
pub fn decode(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let body = match Encoding::for_bom(bytes) {
        Some((bom_encoding, bom_len)) if bom_encoding == encoding => &bytes[bom_len..],
        _ => bytes,
    };

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .map(|text| text.into_owned())
        .ok_or_else(|| {
            AppError::EncodingError(format!("input is not valid {}", encoding.name()))
        })
}

/// Trim whitespace, then one layer of surrounding double quotes
fn clean_field(raw: &str) -> String {
    let field = raw.trim();
    let field = field.strip_prefix('"').unwrap_or(field);
    let field = field.strip_suffix('"').unwrap_or(field);
    field.to_string()
}

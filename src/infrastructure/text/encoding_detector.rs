// ============================================================
// ENCODING DETECTOR
// ============================================================
// Guess the character encoding of a text file from its first bytes

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chardetng::EncodingDetector as StatisticalDetector;
use encoding_rs::{Encoding, UTF_8};
use tracing::debug;

use crate::domain::error::{AppError, Result};

/// Number of leading bytes inspected when guessing an encoding
pub const SAMPLE_SIZE: usize = 10_000;

/// Outcome of encoding detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectedEncoding {
    pub encoding: &'static Encoding,

    /// Whether the detector considers the guess reliable
    pub confident: bool,

    /// Whether the guess came from a byte-order mark
    pub bom: bool,
}

impl DetectedEncoding {
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }
}

/// Statistical encoding detector over a byte prefix
pub struct EncodingDetector {
    sample_size: usize,
}

impl Default for EncodingDetector {
    fn default() -> Self {
        Self {
            sample_size: SAMPLE_SIZE,
        }
    }
}

impl EncodingDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the first bytes of a file and guess its encoding
    pub fn detect_file(&self, path: &Path) -> Result<DetectedEncoding> {
        let file = File::open(path).map_err(|e| {
            AppError::IoError(format!("Failed to open {}: {}", path.display(), e))
        })?;

        let mut sample = Vec::with_capacity(self.sample_size);
        file.take(self.sample_size as u64 + 1)
            .read_to_end(&mut sample)
            .map_err(|e| {
                AppError::IoError(format!("Failed to read {}: {}", path.display(), e))
            })?;

        // One extra byte tells us whether the sample is the whole file
        let complete = sample.len() <= self.sample_size;
        sample.truncate(self.sample_size);

        let detected = self.detect_sample(&sample, complete);
        debug!(
            path = %path.display(),
            encoding = detected.name(),
            confident = detected.confident,
            "Detected file encoding"
        );
        Ok(detected)
    }

    fn detect_sample(&self, sample: &[u8], complete: bool) -> DetectedEncoding {
        if let Some((encoding, _)) = Encoding::for_bom(sample) {
            return DetectedEncoding {
                encoding,
                confident: true,
                bom: true,
            };
        }

        if sample.is_empty() {
            return DetectedEncoding {
                encoding: UTF_8,
                confident: false,
                bom: false,
            };
        }

        let mut detector = StatisticalDetector::new();
        detector.feed(sample, complete);
        let (encoding, confident) = detector.guess_assess(None, true);

        DetectedEncoding {
            encoding,
            confident,
            bom: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{UTF_16LE, WINDOWS_1251};
    use std::io::Write;

    const RUSSIAN: &str = "Иванов;Москва\nПетров;Санкт-Петербург\nСидоров;Новосибирск\n\
Кузнецова;Екатеринбург\nСмирнова;Казань\nВасильев;Нижний Новгород\n\
Фёдорова;Ростов-на-Дону\nМорозов;Владивосток\nНикитина;Калининград\n";

    #[test]
    fn test_detect_plain_utf8() {
        let detected = EncodingDetector::new().detect_sample(RUSSIAN.as_bytes(), true);
        assert_eq!(detected.encoding, UTF_8);
        assert!(!detected.bom);
    }

    #[test]
    fn test_detect_windows_1251() {
        let (bytes, _, had_errors) = WINDOWS_1251.encode(RUSSIAN);
        assert!(!had_errors);

        let detected = EncodingDetector::new().detect_sample(&bytes, true);
        assert_eq!(detected.encoding, WINDOWS_1251);
    }

    #[test]
    fn test_bom_takes_precedence() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "a;b".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }

        let detected = EncodingDetector::new().detect_sample(&bytes, true);
        assert_eq!(detected.encoding, UTF_16LE);
        assert!(detected.bom);
        assert!(detected.confident);
    }

    #[test]
    fn test_empty_input_defaults_to_utf8() {
        let detected = EncodingDetector::new().detect_sample(&[], true);
        assert_eq!(detected.encoding, UTF_8);
        assert!(!detected.confident);
    }

    #[test]
    fn test_detect_file_reads_prefix_only() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"\xEF\xBB\xBFname;city\n").unwrap();
        file.write_all(&vec![b'x'; 20_000]).unwrap();

        let detected = EncodingDetector { sample_size: 64 }
            .detect_file(file.path())
            .unwrap();
        assert_eq!(detected.encoding, UTF_8);
        assert!(detected.bom);
    }

    #[test]
    fn test_detect_missing_file() {
        let result = EncodingDetector::new().detect_file(Path::new("does/not/exist.txt"));
        assert!(matches!(result, Err(AppError::IoError(_))));
    }
}

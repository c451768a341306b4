// ============================================================
// TEXT INFRASTRUCTURE LAYER
// ============================================================
// Encoding detection and delimited text parsing

mod delimited_reader;
mod encoding_detector;

pub use delimited_reader::{decode, DelimitedReader, ReaderOptions};
pub use encoding_detector::{DetectedEncoding, EncodingDetector, SAMPLE_SIZE};

pub mod use_cases;

pub use use_cases::combiner::Combiner;
pub use use_cases::merge_pipeline::{MergePipeline, PipelineReport};

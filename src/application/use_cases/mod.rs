pub mod combiner;
pub mod merge_pipeline;

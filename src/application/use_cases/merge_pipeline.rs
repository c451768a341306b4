// ============================================================
// MERGE PIPELINE USE CASE
// ============================================================
// Read both inputs, merge them, write JSON, then load PostgreSQL

use std::path::Path;
use std::time::Instant;

use tracing::info;

use super::combiner::Combiner;
use crate::domain::dataset::{Dataset, PivotGroup, Row};
use crate::domain::error::Result;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::db::RelationalStore;
use crate::infrastructure::json_writer::JsonWriter;
use crate::infrastructure::text::DelimitedReader;

/// Summary of one pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub first_rows: usize,
    pub second_rows: usize,
    pub combined_rows: usize,
    /// `None` when the database stage was skipped
    pub inserted_rows: Option<u64>,
    pub groups: Vec<PivotGroup>,
    pub combined: Dataset,
}

pub struct MergePipeline {
    config: AppConfig,
    reader: DelimitedReader,
}

impl MergePipeline {
    pub fn new(config: AppConfig) -> Self {
        let reader = DelimitedReader::new().with_skip_blank_lines(config.input.skip_blank_lines);
        Self { config, reader }
    }

    pub async fn run(&self) -> Result<PipelineReport> {
        let start = Instant::now();

        let first = self.read(&self.config.input.first)?;
        let second = self.read(&self.config.input.second)?;
        let (first_rows, second_rows) = (first.len(), second.len());

        let combined = Combiner::combine(first, second)?;
        JsonWriter::write(&combined, &self.config.output.json_path)?;

        let mut report = PipelineReport {
            first_rows,
            second_rows,
            combined_rows: combined.len(),
            ..PipelineReport::default()
        };

        if self.config.pipeline.skip_database {
            info!("Database stage skipped by configuration");
        } else {
            let mut store = RelationalStore::connect(&self.config.database).await?;
            let outcome = load_and_pivot(&mut store, &combined).await;
            let (inserted, groups) = store.release(outcome).await?;

            print_pivot(&groups);
            report.inserted_rows = Some(inserted);
            report.groups = groups;
        }

        info!(
            rows = report.combined_rows,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Pipeline finished"
        );
        report.combined = combined;
        Ok(report)
    }

    fn read(&self, path: &Path) -> Result<Dataset> {
        self.reader.read_file(path)
    }
}

async fn load_and_pivot(
    store: &mut RelationalStore,
    rows: &[Row],
) -> Result<(u64, Vec<PivotGroup>)> {
    let inserted = store.insert_data(rows).await?;
    let groups = store.pivot_table_query().await?;
    Ok((inserted, groups))
}

fn print_pivot(groups: &[PivotGroup]) {
    println!("Pivot table ({} groups):", groups.len());
    for group in groups {
        println!("  {}", group);
    }
}

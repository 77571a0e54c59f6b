//! Pipeline orchestration: load, aggregate, score, segment, emit

use crate::data::{ColumnSpec, RecordSource, TableSink};
use crate::score::{aggregate, attach_scores, RfmRow};

/// Runtime configuration, passed in explicitly at construction time. The
/// pipeline keeps no process-wide state.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub columns: ColumnSpec,
}

/// Batch RFM scoring pipeline over a record source and table sink.
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run one full batch: fetch raw rows, aggregate per entity, attach
    /// quintile scores, classify segments and emit the finished table.
    ///
    /// Nothing is written unless every stage succeeds. Re-running on
    /// identical input produces an identical table.
    pub fn run(
        &self,
        source: &dyn RecordSource,
        sink: &mut dyn TableSink,
    ) -> crate::Result<Vec<RfmRow>> {
        let records = source.fetch()?;
        log::info!("loaded {} raw records", records.len());

        let metrics = aggregate(&records)?;
        log::info!("aggregated {} entities", metrics.len());

        let scored = attach_scores(metrics)?;
        let rows: Vec<RfmRow> = scored.into_iter().map(RfmRow::from_scored).collect();

        sink.write(&self.config.columns.entity_id, &rows)?;
        Ok(rows)
    }
}

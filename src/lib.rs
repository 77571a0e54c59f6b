//! RfmForge: campaign segmentation through quintile-based RFM scoring
//!
//! This library computes Recency, Frequency and Monetary metrics from raw
//! performance records, ranks each metric into 1-5 quintile scores and maps
//! every score triple to a categorical segment label.

pub mod cli;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod score;
pub mod segment;
pub mod viz;

// Re-export public items for easier access
pub use cli::Args;
pub use data::{ColumnSpec, CsvRecordSource, CsvTableSink, RawRecord, RecordSource, TableSink};
pub use error::RfmError;
pub use pipeline::{Pipeline, PipelineConfig};
pub use score::{
    aggregate, attach_scores, quintile_scores, EntityMetrics, RfmRow, ScoreTriple, ScoredEntity,
};
pub use segment::{classify, Segment};

/// Common result type used throughout the application
pub type Result<T> = std::result::Result<T, RfmError>;

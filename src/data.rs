//! Record source and table sink boundaries, backed by Polars CSV

use std::fs::File;
use std::path::PathBuf;

use polars::prelude::*;

use crate::error::RfmError;
use crate::score::RfmRow;

/// Column names expected in the input table.
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    /// Entity grouping key, e.g. a campaign identifier
    pub entity_id: String,
    /// Unique per-row record identifier
    pub record_id: String,
    /// Event date
    pub date: String,
    /// Revenue amount
    pub revenue: String,
}

impl Default for ColumnSpec {
    fn default() -> Self {
        Self {
            entity_id: "campaign_id".to_string(),
            record_id: "performance_id".to_string(),
            date: "date".to_string(),
            revenue: "revenue_generated".to_string(),
        }
    }
}

/// One raw performance event. The date stays textual here; the aggregator
/// owns parsing and validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub entity_id: String,
    pub record_id: String,
    pub date: String,
    pub revenue: f64,
}

/// Supplies the raw rows the pipeline scores.
pub trait RecordSource {
    fn fetch(&self) -> crate::Result<Vec<RawRecord>>;
}

/// Accepts the finished, fully-scored table.
pub trait TableSink {
    fn write(&mut self, id_column: &str, rows: &[RfmRow]) -> crate::Result<()>;
}

/// Record source reading a CSV file through Polars.
pub struct CsvRecordSource {
    path: PathBuf,
    columns: ColumnSpec,
}

impl CsvRecordSource {
    pub fn new(path: impl Into<PathBuf>, columns: ColumnSpec) -> Self {
        Self {
            path: path.into(),
            columns,
        }
    }
}

impl RecordSource for CsvRecordSource {
    fn fetch(&self) -> crate::Result<Vec<RawRecord>> {
        let df = CsvReader::from_path(&self.path)?.has_header(true).finish()?;
        log::info!("read {} rows from {}", df.height(), self.path.display());
        dataframe_to_records(&df, &self.columns)
    }
}

/// Table sink writing a headered UTF-8 CSV file, no index column.
pub struct CsvTableSink {
    path: PathBuf,
}

impl CsvTableSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TableSink for CsvTableSink {
    fn write(&mut self, id_column: &str, rows: &[RfmRow]) -> crate::Result<()> {
        let mut df = rows_to_dataframe(id_column, rows)?;
        let mut file = File::create(&self.path)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df)?;
        log::info!("wrote {} scored rows to {}", rows.len(), self.path.display());
        Ok(())
    }
}

fn require_column<'a>(df: &'a DataFrame, name: &str) -> crate::Result<&'a Series> {
    df.column(name).map_err(|_| RfmError::MissingColumn {
        column: name.to_string(),
    })
}

/// Pull a column as text. Integer-typed id columns are accepted and cast.
fn text_column(df: &DataFrame, name: &str) -> crate::Result<Series> {
    Ok(require_column(df, name)?.cast(&DataType::Utf8)?)
}

fn text_cell<'a>(series: &'a Series, column: &str, row: usize) -> crate::Result<&'a str> {
    series.utf8()?.get(row).ok_or_else(|| RfmError::MissingValue {
        column: column.to_string(),
        row,
    })
}

fn dataframe_to_records(df: &DataFrame, columns: &ColumnSpec) -> crate::Result<Vec<RawRecord>> {
    let ids = text_column(df, &columns.entity_id)?;
    let record_ids = text_column(df, &columns.record_id)?;
    let dates = text_column(df, &columns.date)?;
    let revenue = require_column(df, &columns.revenue)?.cast(&DataType::Float64)?;
    let revenue = revenue.f64()?;

    let mut records = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        records.push(RawRecord {
            entity_id: text_cell(&ids, &columns.entity_id, row)?.to_string(),
            record_id: text_cell(&record_ids, &columns.record_id, row)?.to_string(),
            date: text_cell(&dates, &columns.date, row)?.to_string(),
            revenue: revenue.get(row).ok_or_else(|| RfmError::MissingValue {
                column: columns.revenue.clone(),
                row,
            })?,
        });
    }
    Ok(records)
}

fn rows_to_dataframe(id_column: &str, rows: &[RfmRow]) -> crate::Result<DataFrame> {
    let ids: Vec<&str> = rows.iter().map(|r| r.entity_id.as_str()).collect();
    let recency: Vec<i64> = rows.iter().map(|r| r.recency).collect();
    let frequency: Vec<i64> = rows.iter().map(|r| r.frequency as i64).collect();
    let monetary: Vec<f64> = rows.iter().map(|r| r.monetary).collect();
    let r_scores: Vec<i64> = rows.iter().map(|r| i64::from(r.scores.recency)).collect();
    let f_scores: Vec<i64> = rows.iter().map(|r| i64::from(r.scores.frequency)).collect();
    let m_scores: Vec<i64> = rows.iter().map(|r| i64::from(r.scores.monetary)).collect();
    let composite: Vec<String> = rows.iter().map(|r| r.scores.composite()).collect();
    let segments: Vec<&str> = rows.iter().map(|r| r.segment.label()).collect();

    Ok(DataFrame::new(vec![
        Series::new(id_column, ids),
        Series::new("Recency", recency),
        Series::new("Frequency", frequency),
        Series::new("Monetary", monetary),
        Series::new("R_Score", r_scores),
        Series::new("F_Score", f_scores),
        Series::new("M_Score", m_scores),
        Series::new("RFM_Score", composite),
        Series::new("Segment", segments),
    ])?)
}

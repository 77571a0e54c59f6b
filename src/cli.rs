//! Command-line interface definitions and argument parsing

use clap::Parser;

use crate::data::ColumnSpec;

/// Campaign segmentation CLI using quintile-based RFM scoring
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input CSV file
    #[arg(short, long, default_value = "performance.csv")]
    pub input: String,

    /// Output path for the scored CSV table
    #[arg(short, long, default_value = "rfm_campaigns.csv")]
    pub output: String,

    /// Column holding the entity grouping key
    #[arg(long, default_value = "campaign_id")]
    pub id_column: String,

    /// Column holding the unique per-row record identifier
    #[arg(long, default_value = "performance_id")]
    pub record_column: String,

    /// Column holding the event date
    #[arg(long, default_value = "date")]
    pub date_column: String,

    /// Column holding the revenue amount
    #[arg(long, default_value = "revenue_generated")]
    pub revenue_column: String,

    /// Optional output path for a segment distribution chart (SVG)
    #[arg(short, long)]
    pub plot: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Column layout for the record source, taken from the CLI flags.
    pub fn column_spec(&self) -> ColumnSpec {
        ColumnSpec {
            entity_id: self.id_column.clone(),
            record_id: self.record_column.clone(),
            date: self.date_column.clone(),
            revenue: self.revenue_column.clone(),
        }
    }
}

//! RfmForge: campaign segmentation CLI using quintile-based RFM scoring
//!
//! This is the main entrypoint that wires the CSV record source and table
//! sink into the scoring pipeline and reports the resulting segments.

use anyhow::Result;
use clap::Parser;
use rfmforge::{viz, Args, CsvRecordSource, CsvTableSink, Pipeline, PipelineConfig};
use std::time::Instant;

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.verbose {
        println!("RfmForge - Campaign Segmentation via RFM Scoring");
        println!("================================================\n");
    }

    run_pipeline(&args)
}

fn run_pipeline(args: &Args) -> Result<()> {
    println!("=== RFM Scoring Pipeline ===\n");

    let start_time = Instant::now();
    let columns = args.column_spec();

    if args.verbose {
        println!("Step 1: Loading performance records");
        println!("  Input file: {}", args.input);
        println!("  Grouping by: {}", columns.entity_id);
    }

    let source = CsvRecordSource::new(&args.input, columns.clone());
    let mut sink = CsvTableSink::new(&args.output);
    let pipeline = Pipeline::new(PipelineConfig { columns });

    let rows = pipeline.run(&source, &mut sink)?;

    println!("✓ Scored {} entities", rows.len());

    if args.verbose {
        println!("\nSample of the scored table:");
        for row in rows.iter().take(5) {
            println!(
                "  {} R={} F={} M={:.2} -> {} ({})",
                row.entity_id,
                row.recency,
                row.frequency,
                row.monetary,
                row.scores.composite(),
                row.segment
            );
        }
    }

    viz::print_segment_summary(&rows);

    if let Some(plot_path) = &args.plot {
        viz::create_segment_chart(&rows, plot_path)?;
    }

    let total_time = start_time.elapsed();
    println!("\n=== Pipeline Complete ===");
    println!("Total processing time: {:.2}s", total_time.as_secs_f64());
    println!("RFM table saved to: {}", args.output);

    Ok(())
}

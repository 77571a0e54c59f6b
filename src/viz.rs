//! Segment distribution reporting: console summary and SVG chart

use plotters::prelude::*;

use crate::error::RfmError;
use crate::score::RfmRow;
use crate::segment::Segment;

/// Color palette for the segments, in `Segment::ALL` order
const SEGMENT_COLORS: [RGBColor; 5] = [RED, BLUE, GREEN, YELLOW, MAGENTA];

/// Count rows per segment, in `Segment::ALL` order.
pub fn segment_counts(rows: &[RfmRow]) -> Vec<(Segment, usize)> {
    Segment::ALL
        .iter()
        .map(|&segment| {
            let count = rows.iter().filter(|r| r.segment == segment).count();
            (segment, count)
        })
        .collect()
}

/// Render a bar chart of entities per segment to an SVG file.
pub fn create_segment_chart(rows: &[RfmRow], output_path: &str) -> crate::Result<()> {
    let counts = segment_counts(rows);
    let max_count = counts.iter().map(|(_, n)| *n).max().unwrap_or(1).max(1) as f64;

    let root = SVGBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Entities per Segment", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..(Segment::ALL.len() as f64), 0f64..(max_count * 1.1))
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .x_desc("Segment")
        .y_desc("Number of Entities")
        .x_labels(Segment::ALL.len())
        .x_label_formatter(&|x| {
            let index = *x as usize;
            Segment::ALL
                .get(index)
                .map(|s| s.label().to_string())
                .unwrap_or_default()
        })
        .axis_desc_style(("sans-serif", 15))
        .draw()
        .map_err(plot_error)?;

    for (index, (_, count)) in counts.iter().enumerate() {
        let color = &SEGMENT_COLORS[index % SEGMENT_COLORS.len()];
        chart
            .draw_series(std::iter::once(Rectangle::new(
                [
                    (index as f64 + 0.1, 0.0),
                    (index as f64 + 0.9, *count as f64),
                ],
                color.filled(),
            )))
            .map_err(plot_error)?;
    }

    root.present().map_err(plot_error)?;
    println!("Segment chart saved to: {}", output_path);

    Ok(())
}

/// Print segment statistics to console.
pub fn print_segment_summary(rows: &[RfmRow]) {
    println!("\n=== Segment Distribution ===");
    println!("Total entities: {}", rows.len());

    for (segment, count) in segment_counts(rows) {
        let percentage = if rows.is_empty() {
            0.0
        } else {
            (count as f64 / rows.len() as f64) * 100.0
        };
        println!("  {:<16} {:>5} ({:.1}%)", segment.label(), count, percentage);
    }
}

fn plot_error(err: impl std::fmt::Display) -> RfmError {
    RfmError::Plot(err.to_string())
}

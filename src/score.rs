//! RFM metric aggregation and quintile rank scoring

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

use crate::data::RawRecord;
use crate::error::RfmError;
use crate::segment::{classify, Segment};

/// Number of rank buckets a metric is scored into.
const QUINTILES: usize = 5;

/// Raw per-entity metrics, one row per unique entity id.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityMetrics {
    pub entity_id: String,
    /// Whole days between the snapshot date and the entity's latest record
    pub recency: i64,
    /// Record count for the entity
    pub frequency: u64,
    /// Summed revenue across the entity's records
    pub monetary: f64,
}

/// Quintile scores for one entity, each in 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreTriple {
    pub recency: u8,
    pub frequency: u8,
    pub monetary: u8,
}

impl ScoreTriple {
    /// Three-digit composite in R,F,M order, e.g. scores 5,3,2 -> "532".
    pub fn composite(&self) -> String {
        format!("{}{}{}", self.recency, self.frequency, self.monetary)
    }
}

/// Entity metrics with their attached score triple.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredEntity {
    pub metrics: EntityMetrics,
    pub scores: ScoreTriple,
}

/// One row of the finished output table.
#[derive(Debug, Clone, PartialEq)]
pub struct RfmRow {
    pub entity_id: String,
    pub recency: i64,
    pub frequency: u64,
    pub monetary: f64,
    pub scores: ScoreTriple,
    pub segment: Segment,
}

impl RfmRow {
    pub fn from_scored(entity: ScoredEntity) -> Self {
        let segment = classify(entity.scores);
        Self {
            entity_id: entity.metrics.entity_id,
            recency: entity.metrics.recency,
            frequency: entity.metrics.frequency,
            monetary: entity.metrics.monetary,
            scores: entity.scores,
            segment,
        }
    }
}

/// Rank-based scoring from 1 to 5.
///
/// # Arguments
/// * `values` - The metric series to score
/// * `invert` - When true, lower values earn higher scores (Recency)
///
/// # Returns
/// * One score per input value, same order as the input
///
/// Every element gets a distinct rank 1..N: ties keep their input order, so
/// the first-seen of two equal values takes the lower rank. Ranks are then
/// cut into 5 contiguous buckets. Bucket boundaries are the linearly
/// interpolated quantiles of the rank range, kept in integer arithmetic so
/// boundary ranks never wobble; when N is not a multiple of 5 the surplus
/// lands in the outermost buckets.
pub fn quintile_scores(values: &[f64], invert: bool) -> crate::Result<Vec<u8>> {
    let n = values.len();
    if n < QUINTILES {
        return Err(RfmError::InsufficientData {
            needed: QUINTILES,
            got: n,
        });
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        if invert {
            values[b].total_cmp(&values[a])
        } else {
            values[a].total_cmp(&values[b])
        }
    });

    let mut scores = vec![0u8; n];
    for (position, &index) in order.iter().enumerate() {
        // ceil(5 * position / (n - 1)), clamped so rank 1 stays in bucket 1
        let bucket = (QUINTILES * position + n - 2) / (n - 1);
        scores[index] = bucket.max(1) as u8;
    }
    Ok(scores)
}

/// Group raw records by entity id and compute Recency, Frequency and
/// Monetary per entity.
///
/// The snapshot date is one day past the most recent record in the whole
/// input, so every Recency is at least 1. Grouping runs through a sorted
/// map: output order is ascending entity id, which also fixes the rank
/// tie-break order downstream.
pub fn aggregate(records: &[RawRecord]) -> crate::Result<Vec<EntityMetrics>> {
    if records.is_empty() {
        return Err(RfmError::EmptyInput);
    }

    let mut seen = HashSet::with_capacity(records.len());
    let duplicates = records
        .iter()
        .filter(|r| !seen.insert(r.record_id.as_str()))
        .count();
    if duplicates > 0 {
        log::warn!("{duplicates} duplicate record ids in input; rows kept as-is");
    }

    let mut groups: BTreeMap<&str, Vec<(NaiveDateTime, f64)>> = BTreeMap::new();
    let mut latest: Option<NaiveDateTime> = None;
    for record in records {
        let timestamp = parse_timestamp(&record.date)?;
        latest = Some(latest.map_or(timestamp, |current| current.max(timestamp)));
        groups
            .entry(record.entity_id.as_str())
            .or_default()
            .push((timestamp, record.revenue));
    }

    let snapshot = latest.ok_or(RfmError::EmptyInput)? + Duration::days(1);
    log::debug!("snapshot date {snapshot}");

    Ok(groups
        .into_iter()
        .map(|(entity_id, events)| {
            let newest = events.iter().map(|(ts, _)| *ts).max().unwrap_or(snapshot);
            EntityMetrics {
                entity_id: entity_id.to_string(),
                recency: (snapshot - newest).num_days(),
                frequency: events.len() as u64,
                monetary: events.iter().map(|(_, revenue)| *revenue).sum(),
            }
        })
        .collect())
}

/// Score Recency (inverted), Frequency and Monetary across all entities.
pub fn attach_scores(metrics: Vec<EntityMetrics>) -> crate::Result<Vec<ScoredEntity>> {
    let recency: Vec<f64> = metrics.iter().map(|m| m.recency as f64).collect();
    let frequency: Vec<f64> = metrics.iter().map(|m| m.frequency as f64).collect();
    let monetary: Vec<f64> = metrics.iter().map(|m| m.monetary).collect();

    let r_scores = quintile_scores(&recency, true)?;
    let f_scores = quintile_scores(&frequency, false)?;
    let m_scores = quintile_scores(&monetary, false)?;

    Ok(metrics
        .into_iter()
        .enumerate()
        .map(|(i, metrics)| ScoredEntity {
            scores: ScoreTriple {
                recency: r_scores[i],
                frequency: f_scores[i],
                monetary: m_scores[i],
            },
            metrics,
        })
        .collect())
}

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

fn parse_timestamp(value: &str) -> crate::Result<NaiveDateTime> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.naive_utc());
    }
    for format in DATETIME_FORMATS {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(timestamp);
        }
    }
    if let Ok(day) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(timestamp) = day.and_hms_opt(0, 0, 0) {
            return Ok(timestamp);
        }
    }
    Err(RfmError::MalformedDate {
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(entity_id: &str, record_id: &str, date: &str, revenue: f64) -> RawRecord {
        RawRecord {
            entity_id: entity_id.to_string(),
            record_id: record_id.to_string(),
            date: date.to_string(),
            revenue,
        }
    }

    #[test]
    fn test_quintile_scores_even_split() {
        let values: Vec<f64> = (1..=10).map(|v| v as f64).collect();
        let scores = quintile_scores(&values, false).unwrap();
        assert_eq!(scores, vec![1, 1, 2, 2, 3, 3, 4, 4, 5, 5]);
    }

    #[test]
    fn test_quintile_scores_inverted_reverses_order() {
        let values: Vec<f64> = (1..=10).map(|v| v as f64).collect();
        let straight = quintile_scores(&values, false).unwrap();
        let inverted = quintile_scores(&values, true).unwrap();

        // max value: top bucket straight, bottom bucket inverted
        assert_eq!(straight[9], 5);
        assert_eq!(inverted[9], 1);
        assert_eq!(straight[0], 1);
        assert_eq!(inverted[0], 5);
    }

    #[test]
    fn test_quintile_scores_ties_keep_input_order() {
        let values = vec![5.0, 5.0, 1.0, 2.0, 3.0];
        let scores = quintile_scores(&values, false).unwrap();
        // first-seen 5.0 takes the lower rank
        assert_eq!(scores, vec![4, 5, 1, 2, 3]);
    }

    #[test]
    fn test_quintile_scores_uneven_split_pins_convention() {
        let values: Vec<f64> = (1..=7).map(|v| v as f64).collect();
        let scores = quintile_scores(&values, false).unwrap();
        // surplus lands in the outermost buckets
        assert_eq!(scores, vec![1, 1, 2, 3, 4, 5, 5]);

        let values: Vec<f64> = (1..=6).map(|v| v as f64).collect();
        let scores = quintile_scores(&values, false).unwrap();
        assert_eq!(scores, vec![1, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_quintile_scores_all_in_range() {
        let values: Vec<f64> = (0..23).map(|v| (v * 7 % 23) as f64).collect();
        for invert in [false, true] {
            let scores = quintile_scores(&values, invert).unwrap();
            assert!(scores.iter().all(|&s| (1..=5).contains(&s)));
        }
    }

    #[test]
    fn test_quintile_scores_insufficient_data() {
        let err = quintile_scores(&[42.0], false).unwrap_err();
        assert!(matches!(
            err,
            RfmError::InsufficientData { needed: 5, got: 1 }
        ));

        let err = quintile_scores(&[1.0, 2.0, 3.0, 4.0], false).unwrap_err();
        assert!(matches!(
            err,
            RfmError::InsufficientData { needed: 5, got: 4 }
        ));
    }

    #[test]
    fn test_aggregate_metrics() {
        let records = vec![
            record("CMP_B", "P1", "2024-03-01 10:00:00", 100.0),
            record("CMP_A", "P2", "2024-03-05 08:00:00", 40.0),
            record("CMP_A", "P3", "2024-03-10 12:30:00", 60.0),
            record("CMP_A", "P4", "2024-02-28", 25.5),
        ];

        let metrics = aggregate(&records).unwrap();
        assert_eq!(metrics.len(), 2);

        // output sorted by entity id
        assert_eq!(metrics[0].entity_id, "CMP_A");
        assert_eq!(metrics[1].entity_id, "CMP_B");

        // snapshot is 2024-03-11 12:30:00
        assert_eq!(metrics[0].recency, 1);
        assert_eq!(metrics[0].frequency, 3);
        assert_eq!(metrics[0].monetary, 125.5);

        // 2024-03-01 10:00 -> snapshot is 10d 2h 30m away, truncated to 10
        assert_eq!(metrics[1].recency, 10);
        assert_eq!(metrics[1].frequency, 1);
        assert_eq!(metrics[1].monetary, 100.0);
    }

    #[test]
    fn test_aggregate_invariants() {
        let records: Vec<RawRecord> = (0..20)
            .map(|i| {
                record(
                    &format!("CMP{:02}", i % 7),
                    &format!("P{i}"),
                    &format!("2024-01-{:02}", (i % 28) + 1),
                    (i as f64) * 3.5,
                )
            })
            .collect();

        for metrics in aggregate(&records).unwrap() {
            assert!(metrics.recency >= 0);
            assert!(metrics.frequency >= 1);
            assert!(metrics.monetary >= 0.0);
        }
    }

    #[test]
    fn test_aggregate_empty_input() {
        let err = aggregate(&[]).unwrap_err();
        assert!(matches!(err, RfmError::EmptyInput));
    }

    #[test]
    fn test_aggregate_malformed_date() {
        let records = vec![
            record("CMP_A", "P1", "2024-03-01", 10.0),
            record("CMP_A", "P2", "yesterday", 20.0),
        ];
        let err = aggregate(&records).unwrap_err();
        assert!(matches!(err, RfmError::MalformedDate { ref value } if value == "yesterday"));
    }

    #[test]
    fn test_attach_scores() {
        // recency decreasing, frequency and monetary increasing with i
        let metrics: Vec<EntityMetrics> = (1..=10)
            .map(|i| EntityMetrics {
                entity_id: format!("CMP{i:02}"),
                recency: 11 - i,
                frequency: i as u64,
                monetary: (50 * i * i) as f64,
            })
            .collect();

        let scored = attach_scores(metrics).unwrap();
        assert_eq!(scored.len(), 10);

        let expected = [1, 1, 2, 2, 3, 3, 4, 4, 5, 5];
        for (i, entity) in scored.iter().enumerate() {
            // lowest recency ranks highest, so all three digits line up here
            assert_eq!(entity.scores.recency, expected[i]);
            assert_eq!(entity.scores.frequency, expected[i]);
            assert_eq!(entity.scores.monetary, expected[i]);
        }
        assert_eq!(scored[9].scores.composite(), "555");
        assert_eq!(scored[4].scores.composite(), "333");
    }

    #[test]
    fn test_attach_scores_single_entity_fails() {
        let metrics = vec![EntityMetrics {
            entity_id: "CMP01".to_string(),
            recency: 0,
            frequency: 100,
            monetary: 5000.0,
        }];
        let err = attach_scores(metrics).unwrap_err();
        assert!(matches!(err, RfmError::InsufficientData { got: 1, .. }));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-03-01 10:30:00").is_ok());
        assert!(parse_timestamp("2024-03-01T10:30:00").is_ok());
        assert!(parse_timestamp("2024-03-01T10:30:00Z").is_ok());
        assert!(parse_timestamp("2024-03-01 10:30").is_ok());
        assert!(parse_timestamp("2024-03-01").is_ok());

        let err = parse_timestamp("03/01/2024").unwrap_err();
        assert!(matches!(err, RfmError::MalformedDate { ref value } if value == "03/01/2024"));
    }

    #[test]
    fn test_rfm_row_from_scored() {
        let entity = ScoredEntity {
            metrics: EntityMetrics {
                entity_id: "CMP01".to_string(),
                recency: 2,
                frequency: 9,
                monetary: 1200.0,
            },
            scores: ScoreTriple {
                recency: 5,
                frequency: 5,
                monetary: 5,
            },
        };

        let row = RfmRow::from_scored(entity);
        assert_eq!(row.entity_id, "CMP01");
        assert_eq!(row.segment, Segment::Champions);
        assert_eq!(row.scores.composite(), "555");
    }
}

//! Rule-based mapping from score triples to segment labels

use std::fmt;

use crate::score::ScoreTriple;

/// Closed set of segment labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    Champions,
    LoyalCustomers,
    RecentCustomers,
    AtRisk,
    Others,
}

impl Segment {
    /// All segments in display order.
    pub const ALL: [Segment; 5] = [
        Segment::Champions,
        Segment::LoyalCustomers,
        Segment::RecentCustomers,
        Segment::AtRisk,
        Segment::Others,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Segment::Champions => "Champions",
            Segment::LoyalCustomers => "Loyal Customers",
            Segment::RecentCustomers => "Recent Customers",
            Segment::AtRisk => "At Risk",
            Segment::Others => "Others",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Map a score triple to its segment.
///
/// Rules are checked top to bottom and the first match wins; a triple can
/// satisfy several conditions, so the order is load-bearing.
pub fn classify(scores: ScoreTriple) -> Segment {
    let ScoreTriple {
        recency,
        frequency,
        monetary,
    } = scores;

    if recency >= 4 && frequency >= 4 && monetary >= 4 {
        Segment::Champions
    } else if frequency >= 4 && monetary >= 4 {
        Segment::LoyalCustomers
    } else if recency >= 4 {
        Segment::RecentCustomers
    } else if recency <= 2 && frequency >= 3 {
        Segment::AtRisk
    } else {
        Segment::Others
    }
}

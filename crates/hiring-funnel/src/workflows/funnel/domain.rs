use serde::Serialize;
use std::collections::BTreeMap;

/// One tracked application after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationRecord {
    /// Zero-based index of the data row this record came from.
    pub source_row: usize,
    pub outcome: String,
    pub applied_by: Option<String>,
    /// Raw marker cell per ladder rung; `None` when the stage was never reached.
    pub stage_markers: Vec<Option<String>>,
    /// Title-cased `* Exit` values found in the input, keyed by column name.
    /// Classification always replaces these.
    pub recorded_exits: BTreeMap<String, String>,
}

impl ApplicationRecord {
    pub fn reached(&self, rung_index: usize) -> bool {
        matches!(self.stage_markers.get(rung_index), Some(Some(_)))
    }
}

/// A weighted transition between two funnel nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunnelEdge {
    pub source: String,
    pub target: String,
    pub weight: usize,
}

impl FunnelEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, weight: usize) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight,
        }
    }
}

/// Exit counts for the records eligible at one boundary, ordered by label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundaryTally {
    pub source: String,
    /// Stage a record continues to from this boundary; `None` at the last one.
    pub next_stage: Option<String>,
    pub exits: BTreeMap<String, usize>,
}

impl BoundaryTally {
    pub fn total(&self) -> usize {
        self.exits.values().sum()
    }

    /// Exits that ended the application here rather than moving it on.
    pub fn terminal_exits(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.exits
            .iter()
            .filter(|(label, _)| self.next_stage.as_deref() != Some(label.as_str()))
            .map(|(label, count)| (label.as_str(), *count))
    }

    fn edges(&self) -> impl Iterator<Item = FunnelEdge> + '_ {
        self.exits
            .iter()
            .map(|(target, weight)| FunnelEdge::new(self.source.as_str(), target.as_str(), *weight))
    }
}

/// Aggregated funnel: who-applied origin edges plus one tally per boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunnelGraph {
    origin: Vec<FunnelEdge>,
    boundaries: Vec<BoundaryTally>,
}

impl FunnelGraph {
    pub(crate) fn new(origin: Vec<FunnelEdge>, boundaries: Vec<BoundaryTally>) -> Self {
        Self { origin, boundaries }
    }

    pub fn origin_edges(&self) -> &[FunnelEdge] {
        &self.origin
    }

    pub fn boundaries(&self) -> &[BoundaryTally] {
        &self.boundaries
    }

    /// Stage transitions only, boundary by boundary.
    pub fn boundary_edges(&self) -> Vec<FunnelEdge> {
        self.boundaries.iter().flat_map(BoundaryTally::edges).collect()
    }

    /// Origin edges followed by every boundary edge.
    pub fn edges(&self) -> Vec<FunnelEdge> {
        self.origin
            .iter()
            .cloned()
            .chain(self.boundaries.iter().flat_map(BoundaryTally::edges))
            .collect()
    }

    pub fn total_applications(&self) -> usize {
        self.boundaries.first().map(BoundaryTally::total).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.origin.is_empty() && self.boundaries.iter().all(|tally| tally.exits.is_empty())
    }
}

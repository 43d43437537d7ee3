use super::classifier::TransitionClassifier;
use super::domain::{ApplicationRecord, BoundaryTally, FunnelEdge, FunnelGraph};
use super::stage::{StageLadder, ROOT_STAGE};
use std::collections::BTreeMap;

/// `Who Applied?` value meaning the candidate reached out first.
pub const SELF_APPLIED: &str = "Me";
pub const SELF_APPLIED_LABEL: &str = "I applied to them";
pub const INBOUND_LABEL: &str = "They applied to me";

/// Split of applications by who initiated contact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppliedByTally {
    pub self_applied: usize,
    pub inbound: usize,
}

impl AppliedByTally {
    pub fn from_records(records: &[ApplicationRecord]) -> Self {
        records
            .iter()
            .filter_map(|record| record.applied_by.as_deref())
            .fold(Self::default(), |mut tally, applied_by| {
                if applied_by == SELF_APPLIED {
                    tally.self_applied += 1;
                } else {
                    tally.inbound += 1;
                }
                tally
            })
    }

    /// Non-empty buckets as edges into the funnel root.
    pub fn edges(&self) -> Vec<FunnelEdge> {
        [
            (SELF_APPLIED_LABEL, self.self_applied),
            (INBOUND_LABEL, self.inbound),
        ]
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(label, count)| FunnelEdge::new(label, ROOT_STAGE, count))
        .collect()
    }
}

/// Counts classified exits into per-boundary frequency tables.
#[derive(Debug, Clone, Copy)]
pub struct FunnelAggregator<'a> {
    classifier: TransitionClassifier<'a>,
}

impl<'a> FunnelAggregator<'a> {
    pub fn new(ladder: &'a StageLadder) -> Self {
        Self {
            classifier: TransitionClassifier::new(ladder),
        }
    }

    pub fn tally_boundary(&self, records: &[ApplicationRecord], boundary: usize) -> BoundaryTally {
        let ladder = self.classifier.ladder();
        let mut exits = BTreeMap::new();

        for record in records
            .iter()
            .filter(|record| self.classifier.is_eligible(record, boundary))
        {
            *exits
                .entry(self.classifier.exit_label(record, boundary).to_string())
                .or_insert(0) += 1;
        }

        BoundaryTally {
            source: ladder.source_for(boundary).to_string(),
            next_stage: ladder.rungs().get(boundary).map(|rung| rung.name.clone()),
            exits,
        }
    }

    pub fn aggregate(&self, records: &[ApplicationRecord]) -> FunnelGraph {
        let origin = AppliedByTally::from_records(records).edges();
        let boundaries = (0..self.classifier.ladder().boundary_count())
            .map(|boundary| self.tally_boundary(records, boundary))
            .collect();

        FunnelGraph::new(origin, boundaries)
    }
}

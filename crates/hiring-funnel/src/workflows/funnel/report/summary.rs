use super::super::aggregator::{INBOUND_LABEL, SELF_APPLIED_LABEL};
use super::super::domain::FunnelGraph;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageReachEntry {
    pub stage: String,
    pub reached: usize,
    pub share_pct: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeEntry {
    pub outcome: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedByEntry {
    pub label: String,
    pub count: usize,
}

/// Plain-language digest of a funnel graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunnelSummary {
    pub total_applications: usize,
    pub applied_by: Vec<AppliedByEntry>,
    pub stage_reach: Vec<StageReachEntry>,
    pub outcomes: Vec<OutcomeEntry>,
}

impl FunnelSummary {
    pub fn from_graph(graph: &FunnelGraph) -> Self {
        let total_applications = graph.total_applications();

        let applied_by = graph
            .origin_edges()
            .iter()
            .map(|edge| AppliedByEntry {
                label: edge.source.clone(),
                count: edge.weight,
            })
            .collect();

        // Every record eligible at the boundary leaving a stage reached that stage.
        let stage_reach = graph
            .boundaries()
            .iter()
            .skip(1)
            .map(|tally| {
                let reached = tally.total();
                StageReachEntry {
                    stage: tally.source.clone(),
                    reached,
                    share_pct: share(reached, total_applications),
                }
            })
            .collect();

        let mut outcomes = BTreeMap::<&str, usize>::new();
        for tally in graph.boundaries() {
            for (label, count) in tally.terminal_exits() {
                *outcomes.entry(label).or_insert(0) += count;
            }
        }
        let outcomes = outcomes
            .into_iter()
            .map(|(outcome, count)| OutcomeEntry {
                outcome: outcome.to_string(),
                count,
            })
            .collect();

        Self {
            total_applications,
            applied_by,
            stage_reach,
            outcomes,
        }
    }
}

fn share(part: usize, whole: usize) -> f32 {
    if whole == 0 {
        0.0
    } else {
        part as f32 * 100.0 / whole as f32
    }
}

impl fmt::Display for FunnelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Hiring funnel summary")?;
        writeln!(f, "Applications: {}", self.total_applications)?;

        let count_for = |label: &str| {
            self.applied_by
                .iter()
                .find(|entry| entry.label == label)
                .map(|entry| entry.count)
                .unwrap_or(0)
        };
        writeln!(
            f,
            "Who applied: {} {}, {} {}",
            SELF_APPLIED_LABEL,
            count_for(SELF_APPLIED_LABEL),
            INBOUND_LABEL,
            count_for(INBOUND_LABEL)
        )?;

        writeln!(f, "\nStage reach")?;
        for entry in &self.stage_reach {
            writeln!(
                f,
                "- {}: {} ({:.1}% of applications)",
                entry.stage, entry.reached, entry.share_pct
            )?;
        }

        if self.outcomes.is_empty() {
            writeln!(f, "\nOutcomes: none")?;
        } else {
            writeln!(f, "\nOutcomes")?;
            for entry in &self.outcomes {
                writeln!(f, "- {}: {}", entry.outcome, entry.count)?;
            }
        }

        Ok(())
    }
}

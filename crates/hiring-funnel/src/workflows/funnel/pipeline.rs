use super::aggregator::FunnelAggregator;
use super::classifier::TransitionClassifier;
use super::domain::{ApplicationRecord, FunnelGraph};
use super::normalizer::normalize_table;
use super::parser::InputTable;
use super::stage::StageLadder;
use super::FunnelError;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Loads a tracker export and aggregates it into a funnel graph.
#[derive(Debug, Clone)]
pub struct FunnelPipeline {
    ladder: StageLadder,
}

/// Everything one run produced. The graph is the lasting result; the table,
/// records and resolved ladder are kept for annotated exports.
#[derive(Debug, Clone)]
pub struct FunnelRun {
    pub table: InputTable,
    pub ladder: StageLadder,
    pub records: Vec<ApplicationRecord>,
    pub graph: FunnelGraph,
}

impl FunnelRun {
    pub fn classifier(&self) -> TransitionClassifier<'_> {
        TransitionClassifier::new(&self.ladder)
    }
}

impl FunnelPipeline {
    pub fn new(ladder: StageLadder) -> Self {
        Self { ladder }
    }

    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<FunnelRun, FunnelError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading application tracker");
        self.run(InputTable::from_path(path)?)
    }

    pub fn from_reader<R: Read>(&self, reader: R) -> Result<FunnelRun, FunnelError> {
        self.run(InputTable::from_reader(reader)?)
    }

    pub fn run(&self, table: InputTable) -> Result<FunnelRun, FunnelError> {
        let ladder = self.ladder.resolve(table.headers())?;
        let records = normalize_table(&table, &ladder)?;

        let overridden = count_overridden_exits(&records, &ladder);
        if overridden > 0 {
            debug!(overridden, "replacing exit columns supplied by the input");
        }

        let graph = FunnelAggregator::new(&ladder).aggregate(&records);
        info!(
            rows = table.row_count(),
            applications = records.len(),
            boundaries = ladder.boundary_count(),
            "funnel aggregated"
        );

        Ok(FunnelRun {
            table,
            ladder,
            records,
            graph,
        })
    }
}

fn count_overridden_exits(records: &[ApplicationRecord], ladder: &StageLadder) -> usize {
    let classifier = TransitionClassifier::new(ladder);
    records
        .iter()
        .map(|record| {
            (0..ladder.boundary_count())
                .filter(|&boundary| {
                    record
                        .recorded_exits
                        .get(&ladder.exit_column(boundary))
                        .is_some_and(|recorded| recorded != classifier.exit_label(record, boundary))
                })
                .count()
        })
        .sum()
}

use super::domain::ApplicationRecord;
use super::stage::StageLadder;

/// Decides where each record went after every boundary of a ladder.
#[derive(Debug, Clone, Copy)]
pub struct TransitionClassifier<'a> {
    ladder: &'a StageLadder,
}

impl<'a> TransitionClassifier<'a> {
    pub fn new(ladder: &'a StageLadder) -> Self {
        Self { ladder }
    }

    pub fn ladder(&self) -> &'a StageLadder {
        self.ladder
    }

    /// Next stage's name when its marker is present, otherwise the outcome.
    /// The last boundary always resolves to the outcome.
    pub fn exit_label<'r>(&self, record: &'r ApplicationRecord, boundary: usize) -> &'r str
    where
        'a: 'r,
    {
        match self.ladder.rungs().get(boundary) {
            Some(next) if record.reached(boundary) => next.name.as_str(),
            _ => record.outcome.as_str(),
        }
    }

    /// Boundary 0 counts every record; later boundaries only count records
    /// that reached the stage the boundary leaves.
    pub fn is_eligible(&self, record: &ApplicationRecord, boundary: usize) -> bool {
        boundary == 0 || record.reached(boundary - 1)
    }

    /// Exit labels for every boundary, eligible or not.
    pub fn classify<'r>(&self, record: &'r ApplicationRecord) -> Vec<&'r str>
    where
        'a: 'r,
    {
        (0..self.ladder.boundary_count())
            .map(|boundary| self.exit_label(record, boundary))
            .collect()
    }
}

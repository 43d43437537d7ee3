//! Stage-transition inference for job-application trackers.
//!
//! A tracker row is normalized into an [`ApplicationRecord`], classified at
//! every boundary of a [`StageLadder`], and the exits are tallied into a
//! [`FunnelGraph`] that the report and export modules render.

mod aggregator;
mod classifier;
mod domain;
pub mod export;
mod normalizer;
mod parser;
mod pipeline;
pub mod report;
mod stage;

pub use aggregator::{
    AppliedByTally, FunnelAggregator, INBOUND_LABEL, SELF_APPLIED, SELF_APPLIED_LABEL,
};
pub use classifier::TransitionClassifier;
pub use domain::{ApplicationRecord, BoundaryTally, FunnelEdge, FunnelGraph};
pub use export::{
    write_annotated_csv, DiagramExporter, DiagramFormat, ExportError, SankeyData, SankeyLink,
};
pub use normalizer::{
    normalize_application, normalize_table, title_case, RawApplication, DIARY_UPDATE_OUTCOME,
    PENDING_OUTCOME,
};
pub use parser::{InputTable, APPLIED_BY_COLUMN, OUTCOME_COLUMN};
pub use pipeline::{FunnelPipeline, FunnelRun};
pub use report::{FunnelSummary, SankeyMarkup};
pub use stage::{StageLadder, StageLadderError, StageRung, ROOT_STAGE};

/// Fixed file name for markup written to disk.
pub const MARKUP_FILE_NAME: &str = "sankeymatic_markup.txt";

#[derive(Debug, thiserror::Error)]
pub enum FunnelError {
    #[error("failed to read application tracker: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid tracker CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("required column '{column}' is missing from the tracker")]
    MissingColumn { column: String },
}

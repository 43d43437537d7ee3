mod markup;
mod summary;

pub use markup::{SankeyMarkup, SANKEYMATIC_URL};
pub use summary::{AppliedByEntry, FunnelSummary, OutcomeEntry, StageReachEntry};

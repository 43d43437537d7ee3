use super::domain::ApplicationRecord;
use super::parser::{InputTable, APPLIED_BY_COLUMN, OUTCOME_COLUMN};
use super::stage::StageLadder;
use super::FunnelError;
use std::collections::BTreeMap;
use tracing::debug;

/// Outcome assigned to applications that have not concluded.
pub const PENDING_OUTCOME: &str = "Pending";
/// Bookkeeping rows mixed into trackers that are not applications.
pub const DIARY_UPDATE_OUTCOME: &str = "Diary Update";

/// Borrowed view of one application before canonicalization.
#[derive(Debug, Clone, Default)]
pub struct RawApplication<'a> {
    pub source_row: usize,
    pub outcome: Option<&'a str>,
    pub applied_by: Option<&'a str>,
    pub stage_markers: Vec<Option<&'a str>>,
    pub recorded_exits: Vec<(&'a str, &'a str)>,
}

impl ApplicationRecord {
    pub fn as_raw(&self) -> RawApplication<'_> {
        RawApplication {
            source_row: self.source_row,
            outcome: Some(self.outcome.as_str()),
            applied_by: self.applied_by.as_deref(),
            stage_markers: self.stage_markers.iter().map(Option::as_deref).collect(),
            recorded_exits: self
                .recorded_exits
                .iter()
                .map(|(column, value)| (column.as_str(), value.as_str()))
                .collect(),
        }
    }
}

/// Word-wise capitalisation: a letter following another letter is lowered,
/// every other letter is raised.
pub fn title_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut previous_is_letter = false;

    for ch in value.chars() {
        if ch.is_alphabetic() {
            if previous_is_letter {
                result.extend(ch.to_lowercase());
            } else {
                result.extend(ch.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            result.push(ch);
            previous_is_letter = false;
        }
    }

    result
}

/// Canonicalizes one application. Returns `None` for diary entries.
pub fn normalize_application(raw: RawApplication<'_>) -> Option<ApplicationRecord> {
    let outcome = raw
        .outcome
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(title_case)
        .unwrap_or_else(|| PENDING_OUTCOME.to_string());

    if outcome == DIARY_UPDATE_OUTCOME {
        return None;
    }

    let applied_by = raw
        .applied_by
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(title_case);

    let stage_markers = raw
        .stage_markers
        .into_iter()
        .map(|marker| {
            marker
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        })
        .collect();

    let recorded_exits = raw
        .recorded_exits
        .into_iter()
        .map(|(column, value)| (column.to_string(), title_case(value)))
        .collect::<BTreeMap<_, _>>();

    Some(ApplicationRecord {
        source_row: raw.source_row,
        outcome,
        applied_by,
        stage_markers,
        recorded_exits,
    })
}

/// Builds normalized records from the table for an already resolved ladder.
pub fn normalize_table(
    table: &InputTable,
    ladder: &StageLadder,
) -> Result<Vec<ApplicationRecord>, FunnelError> {
    let outcome_column = table.require_column(OUTCOME_COLUMN)?;
    let applied_by_column = table.require_column(APPLIED_BY_COLUMN)?;
    let marker_columns = ladder
        .rungs()
        .iter()
        .map(|rung| table.require_column(&rung.marker_column))
        .collect::<Result<Vec<_>, _>>()?;
    let exit_columns = ladder
        .exit_columns()
        .into_iter()
        .filter_map(|name| table.column_index(&name))
        .collect::<Vec<_>>();

    let mut records = Vec::with_capacity(table.row_count());
    let mut diary_rows = 0usize;

    for row in 0..table.row_count() {
        let raw = RawApplication {
            source_row: row,
            outcome: table.cell(row, outcome_column),
            applied_by: table.cell(row, applied_by_column),
            stage_markers: marker_columns
                .iter()
                .map(|&column| table.cell(row, column))
                .collect(),
            recorded_exits: exit_columns
                .iter()
                .filter_map(|&column| {
                    table
                        .cell(row, column)
                        .map(|value| (table.headers()[column].as_str(), value))
                })
                .collect(),
        };

        match normalize_application(raw) {
            Some(record) => records.push(record),
            None => diary_rows += 1,
        }
    }

    debug!(
        records = records.len(),
        diary_rows, "normalized application rows"
    );
    Ok(records)
}

use super::super::parser::{APPLIED_BY_COLUMN, OUTCOME_COLUMN};
use super::super::pipeline::FunnelRun;
use super::ExportError;
use std::io::Write;

/// Writes the normalized tracker back out with every `<Stage> Exit` column
/// derived from classification. Existing exit columns keep their position;
/// missing ones are appended in boundary order.
pub fn write_annotated_csv<W: Write>(run: &FunnelRun, writer: W) -> Result<(), ExportError> {
    let table = &run.table;
    let ladder = &run.ladder;
    let classifier = run.classifier();

    let mut headers = table.headers().to_vec();
    let mut exit_positions = Vec::with_capacity(ladder.boundary_count());
    for column in ladder.exit_columns() {
        match table.column_index(&column) {
            Some(position) => exit_positions.push(position),
            None => {
                headers.push(column);
                exit_positions.push(headers.len() - 1);
            }
        }
    }

    let outcome_position = table.column_index(OUTCOME_COLUMN);
    let applied_by_position = table.column_index(APPLIED_BY_COLUMN);

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(&headers)?;

    for record in &run.records {
        let mut cells = table.row(record.source_row).to_vec();
        cells.resize(headers.len(), String::new());

        if let Some(position) = outcome_position {
            cells[position] = record.outcome.clone();
        }
        if let Some(position) = applied_by_position {
            cells[position] = record.applied_by.clone().unwrap_or_default();
        }
        for (boundary, label) in classifier.classify(record).into_iter().enumerate() {
            cells[exit_positions[boundary]] = label.to_string();
        }

        csv_writer.write_record(&cells)?;
    }

    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::funnel::{FunnelPipeline, StageLadder};
    use std::io::Cursor;

    #[test]
    fn overwrites_existing_exit_columns_and_appends_missing_ones() {
        let csv = "Company,Outcome,Who Applied?,Screening Date,First Interview,Second Interview,Screening Exit\n\
Acme,hired,me,2024-01-02,2024-01-05,,bogus\n\
Diary,diary update,,,,,\n\
Globex,,them,,,,\n";
        let run = FunnelPipeline::new(StageLadder::standard())
            .from_reader(Cursor::new(csv))
            .expect("pipeline runs");

        let mut output = Vec::new();
        write_annotated_csv(&run, &mut output).expect("writes csv");
        let text = String::from_utf8(output).expect("utf8");

        assert_eq!(
            text,
            "Company,Outcome,Who Applied?,Screening Date,First Interview,Second Interview,Screening Exit,Application Exit,First Interview Exit,Second Interview Exit\n\
Acme,Hired,Me,2024-01-02,2024-01-05,,First Interview,Screening,Hired,Hired\n\
Globex,Pending,Them,,,,Pending,Pending,Pending,Pending\n"
        );
    }
}

use super::FunnelError;
use std::io::Read;
use std::path::Path;

pub const OUTCOME_COLUMN: &str = "Outcome";
pub const APPLIED_BY_COLUMN: &str = "Who Applied?";

/// Placeholder values spreadsheet exports use for a blank cell. Matched
/// case-sensitively, so `Na` or `none` still count as text.
const MISSING_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Raw tracker export: trimmed header names and trimmed cells, row by row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl InputTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, FunnelError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, FunnelError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader
            .headers()?
            .iter()
            .map(|header| header.trim_start_matches('\u{feff}').to_string())
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == column)
    }

    pub fn require_column(&self, column: &str) -> Result<usize, FunnelError> {
        self.column_index(column)
            .ok_or_else(|| FunnelError::MissingColumn {
                column: column.to_string(),
            })
    }

    /// Cell text, or `None` when the cell is empty, holds a missing-value
    /// placeholder such as `N/A`, or the row is short.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map(String::as_str)
            .filter(|value| !value.is_empty() && !MISSING_MARKERS.contains(value))
    }

    pub(crate) fn row(&self, row: usize) -> &[String] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_trimmed_headers_and_cells() {
        let table = InputTable::from_reader(Cursor::new(
            "\u{feff}Outcome , Who Applied?\n  hired , me \n,them\n",
        ))
        .expect("csv parses");

        assert_eq!(table.headers(), &["Outcome", "Who Applied?"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, 0), Some("hired"));
        assert_eq!(table.cell(0, 1), Some("me"));
        assert_eq!(table.cell(1, 0), None);
        assert_eq!(table.cell(1, 1), Some("them"));
    }

    #[test]
    fn short_rows_read_as_empty_cells() {
        let table = InputTable::from_reader(Cursor::new(
            "Outcome,Who Applied?,Screening Date\nrejected\n",
        ))
        .expect("flexible rows parse");

        assert_eq!(table.cell(0, 0), Some("rejected"));
        assert_eq!(table.cell(0, 2), None);
        assert_eq!(table.cell(5, 0), None);
    }

    #[test]
    fn missing_value_placeholders_read_as_empty() {
        let table = InputTable::from_reader(Cursor::new(
            "Outcome,Screening Date,First Interview,Notes\nNA,N/A,NaN,null\nNa,none,#N/A,n/a\n",
        ))
        .expect("csv parses");

        assert_eq!(table.cell(0, 0), None);
        assert_eq!(table.cell(0, 1), None);
        assert_eq!(table.cell(0, 2), None);
        assert_eq!(table.cell(0, 3), None);
        assert_eq!(table.cell(1, 0), Some("Na"));
        assert_eq!(table.cell(1, 1), Some("none"));
        assert_eq!(table.cell(1, 2), None);
        assert_eq!(table.cell(1, 3), None);
        assert_eq!(table.row(0)[1], "N/A");
    }

    #[test]
    fn require_column_names_the_missing_column() {
        let table = InputTable::from_reader(Cursor::new("Who Applied?\nme\n")).expect("parse");
        match table.require_column(OUTCOME_COLUMN) {
            Err(FunnelError::MissingColumn { column }) => assert_eq!(column, "Outcome"),
            other => panic!("expected missing column, got {other:?}"),
        }
    }

    #[test]
    fn from_path_propagates_io_errors() {
        let error = InputTable::from_path("./does-not-exist.csv").expect_err("expected io error");
        assert!(matches!(error, FunnelError::Io(_)));
    }
}

use super::FunnelError;
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// Virtual root every record starts from.
pub const ROOT_STAGE: &str = "Application";

/// One step of the funnel and the column whose presence proves a record reached it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRung {
    pub name: String,
    pub marker_column: String,
    pub required: bool,
}

impl StageRung {
    pub fn required(name: &str, marker_column: &str) -> Self {
        Self {
            name: name.to_string(),
            marker_column: marker_column.to_string(),
            required: true,
        }
    }

    pub fn optional(name: &str, marker_column: &str) -> Self {
        Self {
            required: false,
            ..Self::required(name, marker_column)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StageLadderError {
    #[error("stage ladder must contain at least one stage")]
    Empty,
    #[error("stage entry {position} is blank")]
    BlankEntry { position: usize },
    #[error("stage '{0}' appears more than once")]
    DuplicateStage(String),
    #[error("'Application' is the implicit first stage and cannot be configured")]
    ReservedName,
}

/// Ordered stages after the implicit `Application` root. A ladder of `n`
/// rungs produces `n + 1` boundaries; boundary `k` leaves `source_for(k)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageLadder {
    rungs: Vec<StageRung>,
}

impl StageLadder {
    pub fn new(rungs: Vec<StageRung>) -> Result<Self, StageLadderError> {
        if rungs.is_empty() {
            return Err(StageLadderError::Empty);
        }

        let mut seen = HashSet::new();
        for rung in &rungs {
            if rung.name.eq_ignore_ascii_case(ROOT_STAGE) {
                return Err(StageLadderError::ReservedName);
            }
            if !seen.insert(rung.name.as_str()) {
                return Err(StageLadderError::DuplicateStage(rung.name.clone()));
            }
        }

        Ok(Self { rungs })
    }

    /// Screening, two interview rounds, and an optional third round.
    pub fn standard() -> Self {
        Self {
            rungs: vec![
                StageRung::required("Screening", "Screening Date"),
                StageRung::required("First Interview", "First Interview"),
                StageRung::required("Second Interview", "Second Interview"),
                StageRung::optional("Third Interview", "Third Interview"),
            ],
        }
    }

    /// Parses `Name=Column` entries separated by commas. A bare `Name` uses the
    /// name as its column; a trailing `?` marks the stage optional.
    pub fn parse(raw: &str) -> Result<Self, StageLadderError> {
        let mut rungs = Vec::new();

        for (position, entry) in raw.split(',').enumerate() {
            let entry = entry.trim();
            let (entry, required) = match entry.strip_suffix('?') {
                Some(rest) => (rest.trim_end(), false),
                None => (entry, true),
            };

            let (name, column) = match entry.split_once('=') {
                Some((name, column)) => (name.trim(), column.trim()),
                None => (entry, entry),
            };

            if name.is_empty() || column.is_empty() {
                return Err(StageLadderError::BlankEntry {
                    position: position + 1,
                });
            }

            rungs.push(StageRung {
                name: name.to_string(),
                marker_column: column.to_string(),
                required,
            });
        }

        Self::new(rungs)
    }

    pub fn rungs(&self) -> &[StageRung] {
        &self.rungs
    }

    pub fn boundary_count(&self) -> usize {
        self.rungs.len() + 1
    }

    pub fn source_for(&self, boundary: usize) -> &str {
        match boundary {
            0 => ROOT_STAGE,
            k => &self.rungs[k - 1].name,
        }
    }

    /// Column name the derived exit for `boundary` is stored under.
    pub fn exit_column(&self, boundary: usize) -> String {
        format!("{} Exit", self.source_for(boundary))
    }

    pub fn exit_columns(&self) -> Vec<String> {
        (0..self.boundary_count())
            .map(|boundary| self.exit_column(boundary))
            .collect()
    }

    /// Matches the ladder against an input header row. Missing required
    /// columns are fatal, including those past an absent optional rung; the
    /// first missing optional column cuts the ladder short at that rung.
    pub fn resolve<S: AsRef<str>>(&self, headers: &[S]) -> Result<Self, FunnelError> {
        let has_column = |column: &str| headers.iter().any(|header| header.as_ref() == column);
        let mut rungs = Vec::with_capacity(self.rungs.len());

        for rung in &self.rungs {
            if has_column(&rung.marker_column) {
                rungs.push(rung.clone());
                continue;
            }

            if rung.required {
                return Err(FunnelError::MissingColumn {
                    column: rung.marker_column.clone(),
                });
            }

            let remaining = self.rungs.iter().skip(rungs.len() + 1);
            if let Some(missing) = remaining
                .filter(|later| later.required)
                .find(|later| !has_column(&later.marker_column))
            {
                return Err(FunnelError::MissingColumn {
                    column: missing.marker_column.clone(),
                });
            }

            debug!(
                stage = %rung.name,
                column = %rung.marker_column,
                "optional stage column absent, truncating funnel"
            );
            break;
        }

        Ok(Self { rungs })
    }
}

impl fmt::Display for StageLadder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, rung) in self.rungs.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            if rung.name == rung.marker_column {
                f.write_str(&rung.name)?;
            } else {
                write!(f, "{}={}", rung.name, rung.marker_column)?;
            }
            if !rung.required {
                f.write_str("?")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_supports_bare_names_columns_and_optional_markers() {
        let ladder =
            StageLadder::parse("Screening=Screening Date, First Interview ,Final Round=Final?")
                .expect("ladder parses");

        assert_eq!(
            ladder.rungs(),
            &[
                StageRung::required("Screening", "Screening Date"),
                StageRung::required("First Interview", "First Interview"),
                StageRung::optional("Final Round", "Final"),
            ]
        );
        assert_eq!(
            ladder.to_string(),
            "Screening=Screening Date,First Interview,Final Round=Final?"
        );
    }

    #[test]
    fn standard_ladder_round_trips_through_display() {
        let standard = StageLadder::standard();
        let reparsed = StageLadder::parse(&standard.to_string()).expect("display parses");
        assert_eq!(reparsed, standard);
    }

    #[test]
    fn parse_rejects_blank_duplicate_and_reserved_entries() {
        assert_eq!(
            StageLadder::parse("Screening,,First Interview"),
            Err(StageLadderError::BlankEntry { position: 2 })
        );
        assert_eq!(
            StageLadder::parse("Screening,Screening=Other"),
            Err(StageLadderError::DuplicateStage("Screening".to_string()))
        );
        assert_eq!(
            StageLadder::parse("application=Applied On"),
            Err(StageLadderError::ReservedName)
        );
        assert_eq!(StageLadder::new(Vec::new()), Err(StageLadderError::Empty));
    }

    #[test]
    fn boundaries_name_root_then_each_rung() {
        let ladder = StageLadder::standard();
        assert_eq!(ladder.boundary_count(), 5);
        assert_eq!(ladder.source_for(0), "Application");
        assert_eq!(ladder.source_for(1), "Screening");
        assert_eq!(ladder.source_for(4), "Third Interview");
        assert_eq!(
            ladder.exit_columns(),
            vec![
                "Application Exit",
                "Screening Exit",
                "First Interview Exit",
                "Second Interview Exit",
                "Third Interview Exit",
            ]
        );
    }

    #[test]
    fn resolve_truncates_at_missing_optional_column() {
        let headers = [
            "Outcome",
            "Who Applied?",
            "Screening Date",
            "First Interview",
            "Second Interview",
        ];
        let resolved = StageLadder::standard()
            .resolve(&headers)
            .expect("optional stage may be absent");
        assert_eq!(resolved.rungs().len(), 3);
        assert_eq!(resolved.boundary_count(), 4);
    }

    #[test]
    fn resolve_reports_missing_required_column() {
        let headers = ["Outcome", "Who Applied?", "Screening Date"];
        let error = StageLadder::standard()
            .resolve(&headers)
            .expect_err("first interview column is required");
        match error {
            FunnelError::MissingColumn { column } => assert_eq!(column, "First Interview"),
            other => panic!("expected missing column, got {other:?}"),
        }
    }

    #[test]
    fn resolve_checks_required_columns_past_a_missing_optional_one() {
        let ladder = StageLadder::parse("Screening=Screening Date?,First Interview")
            .expect("ladder parses");

        let error = ladder
            .resolve(&["Outcome", "Who Applied?"])
            .expect_err("first interview column is required");
        match error {
            FunnelError::MissingColumn { column } => assert_eq!(column, "First Interview"),
            other => panic!("expected missing column, got {other:?}"),
        }

        let resolved = ladder
            .resolve(&["Outcome", "Who Applied?", "First Interview"])
            .expect("required column present");
        assert!(resolved.rungs().is_empty());
        assert_eq!(resolved.boundary_count(), 1);
    }
}

use super::super::domain::{FunnelEdge, FunnelGraph};
use chrono::NaiveDateTime;
use std::fmt;

pub const SANKEYMATIC_URL: &str = "https://sankeymatic.com/";

/// SankeyMatic flow description: comment header, then `Source [Weight] Target` lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SankeyMarkup {
    header: Vec<String>,
    flows: Vec<String>,
}

impl SankeyMarkup {
    pub fn render(graph: &FunnelGraph, generated_at: NaiveDateTime) -> Self {
        let header = vec![
            format!("// Generated {}", generated_at.format("%d %B %H:%M")),
            format!("// Go to {SANKEYMATIC_URL} to use this to generate your Sankey diagram"),
        ];
        let flows = graph.edges().iter().map(flow_line).collect();

        Self { header, flows }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn flows(&self) -> &[String] {
        &self.flows
    }

    /// Header, a blank separator, then flows.
    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.header
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(""))
            .chain(self.flows.iter().map(String::as_str))
    }
}

impl fmt::Display for SankeyMarkup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

fn flow_line(edge: &FunnelEdge) -> String {
    format!("{} [{}] {}", edge.source, edge.weight, edge.target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::funnel::{FunnelAggregator, StageLadder};
    use chrono::NaiveDate;

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 7)
            .expect("valid date")
            .and_hms_opt(9, 5, 0)
            .expect("valid time")
    }

    #[test]
    fn empty_graph_renders_header_only() {
        let ladder = StageLadder::standard();
        let graph = FunnelAggregator::new(&ladder).aggregate(&[]);
        let markup = SankeyMarkup::render(&graph, generated_at());

        assert!(markup.flows().is_empty());
        assert_eq!(
            markup.to_string(),
            "// Generated 07 March 09:05\n\
// Go to https://sankeymatic.com/ to use this to generate your Sankey diagram\n\
\n"
        );
    }
}

use super::super::domain::FunnelGraph;
use super::ExportError;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SankeyLink {
    pub source: usize,
    pub target: usize,
    pub value: usize,
}

/// Renderer-neutral diagram input: deduplicated labels and index-based links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SankeyData {
    pub labels: Vec<String>,
    pub links: Vec<SankeyLink>,
}

impl SankeyData {
    /// Uses the stage transitions only; labels are indexed in order of first
    /// appearance, source before target.
    pub fn from_graph(graph: &FunnelGraph) -> Self {
        let mut labels = Vec::new();
        let mut index = HashMap::new();
        let mut intern = |label: &str| -> usize {
            if let Some(&existing) = index.get(label) {
                return existing;
            }
            labels.push(label.to_string());
            index.insert(label.to_string(), labels.len() - 1);
            labels.len() - 1
        };

        let links = graph
            .boundary_edges()
            .iter()
            .map(|edge| {
                let source = intern(&edge.source);
                let target = intern(&edge.target);
                SankeyLink {
                    source,
                    target,
                    value: edge.weight,
                }
            })
            .collect();

        Self { labels, links }
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn to_json_pretty(&self) -> Result<String, ExportError> {
        serde_json::to_string_pretty(self).map_err(ExportError::Json)
    }
}

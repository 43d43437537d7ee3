use super::sankey::SankeyData;

const MARGIN: f64 = 20.0;
pub(crate) const NODE_WIDTH: f64 = 20.0;
const NODE_PADDING: f64 = 15.0;
const MIN_NODE_HEIGHT: f64 = 1.0;
const LABEL_GAP: f64 = 6.0;

/// Which side of a node its caption hangs from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LabelAnchor {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NodeBox {
    pub(crate) label: String,
    pub(crate) value: usize,
    pub(crate) column: usize,
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) height: f64,
}

impl NodeBox {
    pub(crate) fn caption(&self) -> String {
        format!("{} ({})", self.label, self.value)
    }

    /// Caption point: vertically centred, right of the node except in the
    /// last column, where it sits to the left and ends at the returned x.
    pub(crate) fn label_position(&self, columns: usize) -> (f64, f64, LabelAnchor) {
        let y = self.y + self.height / 2.0;
        if columns > 1 && self.column + 1 == columns {
            (self.x - LABEL_GAP, y, LabelAnchor::End)
        } else {
            (self.x + NODE_WIDTH + LABEL_GAP, y, LabelAnchor::Start)
        }
    }
}

/// A link drawn as a band from the right edge of its source node to the left
/// edge of its target node.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LinkBand {
    pub(crate) source: usize,
    pub(crate) x0: f64,
    pub(crate) y0: f64,
    pub(crate) x1: f64,
    pub(crate) y1: f64,
    pub(crate) thickness: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SankeyLayout {
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) columns: usize,
    pub(crate) nodes: Vec<NodeBox>,
    pub(crate) links: Vec<LinkBand>,
}

impl SankeyLayout {
    pub(crate) fn compute(data: &SankeyData, width: u32, height: u32) -> Self {
        let width = f64::from(width);
        let height = f64::from(height);
        let node_count = data.labels.len();

        let mut inflow = vec![0usize; node_count];
        let mut outflow = vec![0usize; node_count];
        for link in &data.links {
            outflow[link.source] += link.value;
            inflow[link.target] += link.value;
        }

        let columns = assign_columns(data, &outflow);
        let column_count = columns.iter().max().map(|max| max + 1).unwrap_or(0);
        let values = (0..node_count)
            .map(|node| inflow[node].max(outflow[node]))
            .collect::<Vec<_>>();

        let mut column_totals = vec![0usize; column_count];
        let mut column_sizes = vec![0usize; column_count];
        for node in 0..node_count {
            column_totals[columns[node]] += values[node];
            column_sizes[columns[node]] += 1;
        }

        let usable_height = height - 2.0 * MARGIN;
        let scale = (0..column_count)
            .filter(|&column| column_totals[column] > 0)
            .map(|column| {
                let padding = NODE_PADDING * column_sizes[column].saturating_sub(1) as f64;
                (usable_height - padding).max(0.0) / column_totals[column] as f64
            })
            .fold(f64::INFINITY, f64::min);
        let scale = if scale.is_finite() { scale } else { 0.0 };

        let column_step = if column_count > 1 {
            (width - 2.0 * MARGIN - NODE_WIDTH) / (column_count - 1) as f64
        } else {
            0.0
        };

        let mut next_y = vec![MARGIN; column_count];
        let nodes = (0..node_count)
            .map(|node| {
                let column = columns[node];
                let node_height = (values[node] as f64 * scale).max(MIN_NODE_HEIGHT);
                let y = next_y[column];
                next_y[column] += node_height + NODE_PADDING;
                NodeBox {
                    label: data.labels[node].clone(),
                    value: values[node],
                    column,
                    x: MARGIN + column as f64 * column_step,
                    y,
                    height: node_height,
                }
            })
            .collect::<Vec<_>>();

        let mut out_offset = vec![0.0f64; node_count];
        let mut in_offset = vec![0.0f64; node_count];
        let links = data
            .links
            .iter()
            .map(|link| {
                let thickness = link.value as f64 * scale;
                let source = &nodes[link.source];
                let target = &nodes[link.target];
                let band = LinkBand {
                    source: link.source,
                    x0: source.x + NODE_WIDTH,
                    y0: source.y + out_offset[link.source],
                    x1: target.x,
                    y1: target.y + in_offset[link.target],
                    thickness,
                };
                out_offset[link.source] += thickness;
                in_offset[link.target] += thickness;
                band
            })
            .collect();

        Self {
            width,
            height,
            columns: column_count,
            nodes,
            links,
        }
    }
}

/// Longest distance from a root, with sinks pushed to the last column.
/// Relaxation stops after one pass per node so a malformed cycle cannot spin.
fn assign_columns(data: &SankeyData, outflow: &[usize]) -> Vec<usize> {
    let node_count = data.labels.len();
    let mut columns = vec![0usize; node_count];

    for _ in 0..node_count {
        let mut changed = false;
        for link in &data.links {
            let candidate = columns[link.source] + 1;
            if candidate > columns[link.target] && candidate < node_count {
                columns[link.target] = candidate;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let last = columns.iter().copied().max().unwrap_or(0);
    for node in 0..node_count {
        if outflow[node] == 0 {
            columns[node] = last;
        }
    }

    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::funnel::export::sankey::SankeyLink;

    fn data() -> SankeyData {
        SankeyData {
            labels: vec![
                "Application".to_string(),
                "Rejected".to_string(),
                "Screening".to_string(),
                "Hired".to_string(),
            ],
            links: vec![
                SankeyLink {
                    source: 0,
                    target: 1,
                    value: 3,
                },
                SankeyLink {
                    source: 0,
                    target: 2,
                    value: 1,
                },
                SankeyLink {
                    source: 2,
                    target: 3,
                    value: 1,
                },
            ],
        }
    }

    #[test]
    fn outcomes_are_justified_to_the_last_column() {
        let layout = SankeyLayout::compute(&data(), 1000, 600);
        let columns = layout
            .nodes
            .iter()
            .map(|node| (node.label.as_str(), node.column))
            .collect::<Vec<_>>();
        assert_eq!(
            columns,
            vec![
                ("Application", 0),
                ("Rejected", 2),
                ("Screening", 1),
                ("Hired", 2)
            ]
        );
        assert_eq!(layout.columns, 3);
    }

    #[test]
    fn nodes_fit_inside_the_canvas() {
        let layout = SankeyLayout::compute(&data(), 400, 300);
        for node in &layout.nodes {
            assert!(node.x >= 0.0 && node.x + NODE_WIDTH <= layout.width);
            assert!(node.y >= 0.0 && node.y + node.height <= layout.height + 1e-6);
        }
        let application = &layout.nodes[0];
        let total_band: f64 = layout
            .links
            .iter()
            .filter(|link| link.source == 0)
            .map(|link| link.thickness)
            .sum();
        assert!((total_band - application.height).abs() < 1e-6);
    }

    #[test]
    fn empty_data_has_no_columns() {
        let layout = SankeyLayout::compute(
            &SankeyData {
                labels: Vec::new(),
                links: Vec::new(),
            },
            100,
            100,
        );
        assert_eq!(layout.columns, 0);
        assert!(layout.nodes.is_empty());
    }
}

use chrono::NaiveDateTime;
use clap::ValueEnum;
use hiring_funnel::config::OutputConfig;
use hiring_funnel::error::AppError;
use hiring_funnel::workflows::funnel::{
    DiagramExporter, DiagramFormat, FunnelRun, FunnelSummary, SankeyData, SankeyMarkup,
    MARKUP_FILE_NAME,
};
use std::io::Write;
use tracing::info;

/// Where a run's result goes, before an image format is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputChannel {
    /// Print SankeyMatic markup to stdout
    Console,
    /// Write SankeyMatic markup to sankeymatic_markup.txt
    Text,
    /// Render a Sankey diagram image
    Image,
    /// Print the diagram's label/link data as JSON
    Json,
    /// Print a plain-language funnel summary
    Summary,
}

impl OutputChannel {
    pub(crate) const fn ordered() -> [Self; 5] {
        [
            Self::Console,
            Self::Text,
            Self::Image,
            Self::Json,
            Self::Summary,
        ]
    }

    pub(crate) fn menu_label(self) -> String {
        match self {
            Self::Console => "Console".to_string(),
            Self::Text => format!("Output file ({MARKUP_FILE_NAME})"),
            Self::Image => "Sankey diagram (Image)".to_string(),
            Self::Json => "Diagram data (JSON)".to_string(),
            Self::Summary => "Funnel summary".to_string(),
        }
    }
}

/// Fully resolved destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputTarget {
    Console,
    TextFile,
    Image(DiagramFormat),
    Json,
    Summary,
}

impl OutputTarget {
    pub(crate) fn new(channel: OutputChannel, format: DiagramFormat) -> Self {
        match channel {
            OutputChannel::Console => Self::Console,
            OutputChannel::Text => Self::TextFile,
            OutputChannel::Image => Self::Image(format),
            OutputChannel::Json => Self::Json,
            OutputChannel::Summary => Self::Summary,
        }
    }
}

/// Sends the run to `target`; `stdout` receives console output and status lines.
pub(crate) fn emit<W: Write>(
    target: OutputTarget,
    run: &FunnelRun,
    config: &OutputConfig,
    generated_at: NaiveDateTime,
    stdout: &mut W,
) -> Result<(), AppError> {
    match target {
        OutputTarget::Console => {
            write!(stdout, "{}", SankeyMarkup::render(&run.graph, generated_at))?;
        }
        OutputTarget::TextFile => {
            let markup = SankeyMarkup::render(&run.graph, generated_at);
            let path = config.markup_path();
            std::fs::write(&path, markup.to_string())?;
            info!(path = %path.display(), "markup written");
            writeln!(stdout, "Output written to {}.", path.display())?;
        }
        OutputTarget::Image(format) => {
            let exporter = DiagramExporter::new(config.diagram_width, config.diagram_height);
            let path = exporter.write_to_dir(&run.graph, format, &config.directory)?;
            writeln!(stdout, "Sankey diagram saved as {}", path.display())?;
        }
        OutputTarget::Json => {
            let json = SankeyData::from_graph(&run.graph).to_json_pretty()?;
            writeln!(stdout, "{json}")?;
        }
        OutputTarget::Summary => {
            write!(stdout, "{}", FunnelSummary::from_graph(&run.graph))?;
        }
    }

    Ok(())
}

mod annotated;
mod layout;
mod palette;
mod raster;
mod sankey;
mod svg;

use super::domain::FunnelGraph;
use layout::SankeyLayout;
use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::info;

pub use annotated::write_annotated_csv;
pub use sankey::{SankeyData, SankeyLink};

pub const DIAGRAM_FILE_STEM: &str = "sankey_diagram";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode diagram image: {0}")]
    Image(#[from] image::ImageError),
    #[error("failed to write annotated csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to serialize diagram data: {0}")]
    Json(serde_json::Error),
}

/// Image encodings the diagram exporter can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiagramFormat {
    #[default]
    Svg,
    Png,
    Jpg,
}

impl DiagramFormat {
    pub const fn ordered() -> [Self; 3] {
        [Self::Svg, Self::Png, Self::Jpg]
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Jpg => "jpg",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Svg => "SVG",
            Self::Png => "PNG",
            Self::Jpg => "JPG",
        }
    }

    pub fn from_extension(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "svg" => Some(Self::Svg),
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpg),
            _ => None,
        }
    }

    pub fn file_name(self) -> String {
        format!("{DIAGRAM_FILE_STEM}.{}", self.extension())
    }
}

impl fmt::Display for DiagramFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Renders the stage transitions of a funnel graph as a Sankey diagram.
#[derive(Debug, Clone, Copy)]
pub struct DiagramExporter {
    width: u32,
    height: u32,
}

impl DiagramExporter {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn render(&self, graph: &FunnelGraph, format: DiagramFormat) -> Result<Vec<u8>, ExportError> {
        let data = SankeyData::from_graph(graph);
        let layout = SankeyLayout::compute(&data, self.width, self.height);

        let image_format = match format {
            DiagramFormat::Svg => return Ok(svg::render(&layout).into_bytes()),
            DiagramFormat::Png => image::ImageFormat::Png,
            DiagramFormat::Jpg => image::ImageFormat::Jpeg,
        };

        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(raster::rasterize(&layout))
            .write_to(&mut Cursor::new(&mut bytes), image_format)?;
        Ok(bytes)
    }

    /// Writes `sankey_diagram.<ext>` into `directory` and returns its path.
    pub fn write_to_dir(
        &self,
        graph: &FunnelGraph,
        format: DiagramFormat,
        directory: &Path,
    ) -> Result<PathBuf, ExportError> {
        let bytes = self.render(graph, format)?;
        let path = directory.join(format.file_name());
        std::fs::write(&path, bytes)?;
        info!(path = %path.display(), %format, "sankey diagram written");
        Ok(path)
    }
}

use crate::workflows::funnel::{StageLadder, StageLadderError};
use std::env;
use std::fmt;
use std::path::PathBuf;

const DEFAULT_DIAGRAM_WIDTH: u32 = 1000;
const DEFAULT_DIAGRAM_HEIGHT: u32 = 600;

/// Top-level configuration for a funnel run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub funnel: FunnelConfig,
    pub output: OutputConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let ladder = match env::var("FUNNEL_STAGES") {
            Ok(raw) if !raw.trim().is_empty() => {
                StageLadder::parse(&raw).map_err(|source| ConfigError::InvalidStages {
                    value: raw.clone(),
                    source,
                })?
            }
            _ => StageLadder::standard(),
        };

        let directory = env::var("FUNNEL_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));
        let diagram_width = read_dimension("FUNNEL_DIAGRAM_WIDTH", DEFAULT_DIAGRAM_WIDTH)?;
        let diagram_height = read_dimension("FUNNEL_DIAGRAM_HEIGHT", DEFAULT_DIAGRAM_HEIGHT)?;

        let log_level = env::var("FUNNEL_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string());

        Ok(Self {
            funnel: FunnelConfig { ladder },
            output: OutputConfig {
                directory,
                diagram_width,
                diagram_height,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn read_dimension(key: &'static str, default: u32) -> Result<u32, ConfigError> {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<u32>() {
            Ok(value) if value > 0 => Ok(value),
            _ => Err(ConfigError::InvalidDimension { key, value: raw }),
        },
        Err(_) => Ok(default),
    }
}

/// Stage ladder the classifier walks for every record.
#[derive(Debug, Clone)]
pub struct FunnelConfig {
    pub ladder: StageLadder,
}

/// Where artifacts land and how large rendered diagrams are.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub diagram_width: u32,
    pub diagram_height: u32,
}

impl OutputConfig {
    pub fn markup_path(&self) -> PathBuf {
        self.directory.join(crate::workflows::funnel::MARKUP_FILE_NAME)
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidStages {
        value: String,
        source: StageLadderError,
    },
    InvalidDimension {
        key: &'static str,
        value: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidStages { value, source } => {
                write!(f, "FUNNEL_STAGES '{}' is not a valid stage ladder: {}", value, source)
            }
            ConfigError::InvalidDimension { key, value } => {
                write!(f, "{} must be a positive integer, got '{}'", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidStages { source, .. } => Some(source),
            ConfigError::InvalidDimension { .. } => None,
        }
    }
}

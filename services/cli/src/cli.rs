use crate::output::{emit, OutputChannel, OutputTarget};
use crate::prompt::{
    choose_channel, choose_csv, choose_format, discover_csv_files, Prompt, Terminal,
};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use hiring_funnel::config::AppConfig;
use hiring_funnel::error::AppError;
use hiring_funnel::telemetry;
use hiring_funnel::workflows::funnel::{
    write_annotated_csv, DiagramFormat, FunnelPipeline, StageLadder,
};
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "hiring-funnel",
    about = "Turn a job-application tracker into a hiring funnel Sankey diagram",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Aggregate a tracker and emit markup, a diagram, or a summary (default command)
    Render(RenderArgs),
    /// Write the tracker back out with derived stage exit columns
    Annotate(AnnotateArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct RenderArgs {
    /// Tracker CSV to read; prompts with the CSV files in the current directory when omitted
    #[arg(long)]
    pub(crate) input: Option<PathBuf>,
    /// Output channel; prompts when omitted
    #[arg(long, value_enum)]
    pub(crate) output: Option<OutputChannel>,
    /// Image format for the image channel (svg, png, jpg)
    #[arg(long, value_parser = parse_format)]
    pub(crate) format: Option<DiagramFormat>,
    /// Stage ladder override, e.g. "Screening=Screening Date,First Interview,Final?"
    #[arg(long, value_parser = parse_stages)]
    pub(crate) stages: Option<StageLadder>,
    /// Directory for written artifacts
    #[arg(long)]
    pub(crate) output_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct AnnotateArgs {
    /// Tracker CSV to read; prompts with the CSV files in the current directory when omitted
    #[arg(long)]
    pub(crate) input: Option<PathBuf>,
    /// Destination CSV; stdout when omitted
    #[arg(long)]
    pub(crate) out: Option<PathBuf>,
    /// Stage ladder override
    #[arg(long, value_parser = parse_stages)]
    pub(crate) stages: Option<StageLadder>,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let command = cli
        .command
        .unwrap_or_else(|| Command::Render(RenderArgs::default()));

    match command {
        Command::Render(args) => run_render(args, config, &mut Terminal),
        Command::Annotate(args) => run_annotate(args, config, &mut Terminal),
    }
}

fn parse_format(raw: &str) -> Result<DiagramFormat, String> {
    DiagramFormat::from_extension(raw)
        .ok_or_else(|| format!("unsupported image format '{raw}' (expected svg, png, or jpg)"))
}

fn parse_stages(raw: &str) -> Result<StageLadder, String> {
    StageLadder::parse(raw).map_err(|err| format!("invalid stage ladder '{raw}': {err}"))
}

fn resolve_input<P: Prompt>(input: Option<PathBuf>, prompt: &mut P) -> Result<PathBuf, AppError> {
    match input {
        Some(path) => Ok(path),
        None => Ok(choose_csv(prompt, &discover_csv_files(Path::new(".")))?),
    }
}

pub(crate) fn run_render<P: Prompt>(
    args: RenderArgs,
    mut config: AppConfig,
    prompt: &mut P,
) -> Result<(), AppError> {
    let RenderArgs {
        input,
        output,
        format,
        stages,
        output_dir,
    } = args;

    if let Some(directory) = output_dir {
        config.output.directory = directory;
    }
    let ladder = stages.unwrap_or(config.funnel.ladder);

    let input = resolve_input(input, prompt)?;
    let run = FunnelPipeline::new(ladder).from_path(&input)?;

    let channel = output.unwrap_or_else(|| choose_channel(prompt));
    let format = match (channel, format) {
        (_, Some(format)) => format,
        (OutputChannel::Image, None) if output.is_none() => choose_format(prompt),
        _ => DiagramFormat::default(),
    };
    let target = OutputTarget::new(channel, format);
    info!(?target, input = %input.display(), "emitting funnel");

    let generated_at = Local::now().naive_local();
    emit(
        target,
        &run,
        &config.output,
        generated_at,
        &mut io::stdout().lock(),
    )
}

pub(crate) fn run_annotate<P: Prompt>(
    args: AnnotateArgs,
    config: AppConfig,
    prompt: &mut P,
) -> Result<(), AppError> {
    let AnnotateArgs { input, out, stages } = args;
    let ladder = stages.unwrap_or(config.funnel.ladder);

    let input = resolve_input(input, prompt)?;
    let run = FunnelPipeline::new(ladder).from_path(&input)?;

    match out {
        Some(path) => {
            let file = std::fs::File::create(&path)?;
            write_annotated_csv(&run, file)?;
            info!(path = %path.display(), records = run.records.len(), "annotated tracker written");
        }
        None => write_annotated_csv(&run, io::stdout().lock())?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::scripted::ScriptedPrompt;
    use hiring_funnel::config::{FunnelConfig, OutputConfig, TelemetryConfig};

    const TRACKER: &str = "Outcome,Who Applied?,Screening Date,First Interview,Second Interview\n\
rejected,me,,,\n\
hired,them,2024-05-01,2024-05-03,\n";

    fn config(directory: &Path) -> AppConfig {
        AppConfig {
            funnel: FunnelConfig {
                ladder: StageLadder::standard(),
            },
            output: OutputConfig {
                directory: directory.to_path_buf(),
                diagram_width: 400,
                diagram_height: 240,
            },
            telemetry: TelemetryConfig {
                log_level: "warn".to_string(),
            },
        }
    }

    #[test]
    fn parses_format_and_stage_flags() {
        assert_eq!(parse_format("PNG"), Ok(DiagramFormat::Png));
        assert!(parse_format("bmp").is_err());
        assert!(parse_stages("Screening,Screening").is_err());
        assert_eq!(
            parse_stages("Screening=Screening Date")
                .expect("ladder")
                .boundary_count(),
            2
        );
    }

    #[test]
    fn cli_accepts_render_flags() {
        let cli = Cli::try_parse_from([
            "hiring-funnel",
            "render",
            "--input",
            "tracker.csv",
            "--output",
            "image",
            "--format",
            "jpg",
        ])
        .expect("flags parse");

        match cli.command {
            Some(Command::Render(args)) => {
                assert_eq!(args.input, Some(PathBuf::from("tracker.csv")));
                assert_eq!(args.output, Some(OutputChannel::Image));
                assert_eq!(args.format, Some(DiagramFormat::Jpg));
            }
            other => panic!("expected render command, got {other:?}"),
        }
    }

    #[test]
    fn interactive_image_choice_prompts_for_format() {
        let dir = tempfile::tempdir().expect("tempdir");
        let tracker = dir.path().join("tracker.csv");
        std::fs::write(&tracker, TRACKER).expect("write tracker");

        let mut prompt = ScriptedPrompt::selecting(&[2, 2]);
        run_render(
            RenderArgs {
                input: Some(tracker),
                ..RenderArgs::default()
            },
            config(dir.path()),
            &mut prompt,
        )
        .expect("render succeeds");

        assert!(dir.path().join("sankey_diagram.jpg").exists());
    }

    #[test]
    fn text_channel_flag_skips_prompts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let tracker = dir.path().join("tracker.csv");
        std::fs::write(&tracker, TRACKER).expect("write tracker");

        let mut prompt = ScriptedPrompt::default();
        run_render(
            RenderArgs {
                input: Some(tracker),
                output: Some(OutputChannel::Text),
                ..RenderArgs::default()
            },
            config(dir.path()),
            &mut prompt,
        )
        .expect("render succeeds");

        let markup = std::fs::read_to_string(dir.path().join("sankeymatic_markup.txt"))
            .expect("markup written");
        assert!(markup.contains("Application [1] Screening"));
        assert_eq!(prompt.asked, 0);
    }

    #[test]
    fn annotate_writes_derived_exit_columns() {
        let dir = tempfile::tempdir().expect("tempdir");
        let tracker = dir.path().join("tracker.csv");
        let annotated = dir.path().join("annotated.csv");
        std::fs::write(&tracker, TRACKER).expect("write tracker");

        run_annotate(
            AnnotateArgs {
                input: Some(tracker),
                out: Some(annotated.clone()),
                stages: None,
            },
            config(dir.path()),
            &mut ScriptedPrompt::default(),
        )
        .expect("annotate succeeds");

        let written = std::fs::read_to_string(annotated).expect("read annotated");
        let mut lines = written.lines();
        assert_eq!(
            lines.next(),
            Some("Outcome,Who Applied?,Screening Date,First Interview,Second Interview,Application Exit,Screening Exit,First Interview Exit,Second Interview Exit")
        );
        assert_eq!(lines.next(), Some("Rejected,Me,,,,Rejected,Rejected,Rejected,Rejected"));
        assert_eq!(
            lines.next(),
            Some("Hired,Them,2024-05-01,2024-05-03,,Screening,First Interview,Hired,Hired")
        );
    }
}

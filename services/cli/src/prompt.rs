use crate::output::OutputChannel;
use hiring_funnel::workflows::funnel::DiagramFormat;
use inquire::{InquireError, Select, Text};
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

const OTHER_PATH_OPTION: &str = "Another file (enter a path)";

/// Source of interactive answers. The terminal implementation drives
/// `inquire`; tests script replies.
pub(crate) trait Prompt {
    /// Index of the chosen option.
    fn select(&mut self, message: &str, options: Vec<String>) -> Result<usize, InquireError>;

    fn text(&mut self, message: &str) -> Result<String, InquireError>;
}

/// Interactive prompts on the controlling terminal.
#[derive(Debug, Default)]
pub(crate) struct Terminal;

impl Prompt for Terminal {
    fn select(&mut self, message: &str, options: Vec<String>) -> Result<usize, InquireError> {
        Select::new(message, options)
            .with_starting_cursor(0)
            .raw_prompt()
            .map(|choice| choice.index)
    }

    fn text(&mut self, message: &str) -> Result<String, InquireError> {
        Text::new(message)
            .prompt()
            .map(|reply| reply.trim().to_string())
    }
}

/// Lets the user pick a discovered CSV or type a path. A failed or empty
/// answer falls back to the first file; with nothing discovered a path is
/// required.
pub(crate) fn choose_csv<P: Prompt>(prompt: &mut P, candidates: &[PathBuf]) -> io::Result<PathBuf> {
    let Some(first) = candidates.first() else {
        return match prompt.text("No CSV files found in the current directory. CSV file path:") {
            Ok(path) if !path.is_empty() => Ok(PathBuf::from(path)),
            Ok(_) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "no CSV file path provided",
            )),
            Err(err) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("no CSV file path provided: {err}"),
            )),
        };
    };

    let mut options = candidates
        .iter()
        .map(|candidate| candidate.display().to_string())
        .collect::<Vec<_>>();
    options.push(OTHER_PATH_OPTION.to_string());

    let choice = match prompt.select("Select the CSV file to use", options) {
        Ok(index) if index == candidates.len() => prompt.text("CSV file path:").map(Some),
        Ok(index) => Ok(candidates.get(index).map(|path| path.display().to_string())),
        Err(err) => Err(err),
    };

    match choice {
        Ok(Some(path)) if !path.is_empty() => Ok(PathBuf::from(path)),
        Ok(_) => Ok(first.clone()),
        Err(err) => {
            warn!(%err, fallback = %first.display(), "csv selection unavailable, using first file");
            Ok(first.clone())
        }
    }
}

/// Failed prompts fall back to the console.
pub(crate) fn choose_channel<P: Prompt>(prompt: &mut P) -> OutputChannel {
    let channels = OutputChannel::ordered();
    let labels = channels.iter().map(|channel| channel.menu_label()).collect();
    pick(
        prompt.select("Select output format", labels),
        &channels,
        OutputChannel::Console,
    )
}

/// Failed prompts fall back to SVG.
pub(crate) fn choose_format<P: Prompt>(prompt: &mut P) -> DiagramFormat {
    let formats = DiagramFormat::ordered();
    let labels = formats.iter().map(|format| format.label().to_string()).collect();
    pick(
        prompt.select("Choose the image format", labels),
        &formats,
        DiagramFormat::default(),
    )
}

fn pick<T: Copy + std::fmt::Debug>(
    choice: Result<usize, InquireError>,
    options: &[T],
    fallback: T,
) -> T {
    match choice {
        Ok(index) => options.get(index).copied().unwrap_or(fallback),
        Err(err) => {
            warn!(%err, ?fallback, "selection unavailable, using default");
            fallback
        }
    }
}

/// `*.csv` files directly inside `directory`, sorted by path.
pub(crate) fn discover_csv_files(directory: &Path) -> Vec<PathBuf> {
    let pattern = match directory.to_str() {
        Some(dir) => format!("{}/*.csv", glob::Pattern::escape(dir)),
        None => directory.join("*.csv").to_string_lossy().into_owned(),
    };

    let mut files = match glob::glob(&pattern) {
        Ok(paths) => paths.filter_map(Result::ok).collect::<Vec<_>>(),
        Err(err) => {
            warn!(%err, "invalid csv discovery pattern");
            Vec::new()
        }
    };
    files.sort();
    files
}


#[cfg(test)]
mod tests {
    use super::scripted::ScriptedPrompt;
    use super::*;

    fn candidates() -> Vec<PathBuf> {
        vec![PathBuf::from("2023.csv"), PathBuf::from("2024.csv")]
    }

    #[test]
    fn choose_csv_accepts_listed_files_and_typed_paths() {
        assert_eq!(
            choose_csv(&mut ScriptedPrompt::selecting(&[1]), &candidates()).expect("choice"),
            PathBuf::from("2024.csv")
        );
        assert_eq!(
            choose_csv(
                &mut ScriptedPrompt::selecting(&[2]).typing("data/other.csv"),
                &candidates()
            )
            .expect("choice"),
            PathBuf::from("data/other.csv")
        );
    }

    #[test]
    fn choose_csv_falls_back_to_first_file() {
        assert_eq!(
            choose_csv(&mut ScriptedPrompt::default(), &candidates()).expect("choice"),
            PathBuf::from("2023.csv")
        );
        assert_eq!(
            choose_csv(&mut ScriptedPrompt::selecting(&[2]).typing(""), &candidates())
                .expect("choice"),
            PathBuf::from("2023.csv")
        );
    }

    #[test]
    fn choose_csv_without_candidates_requires_a_path() {
        assert_eq!(
            choose_csv(&mut ScriptedPrompt::default().typing("tracker.csv"), &[]).expect("path"),
            PathBuf::from("tracker.csv")
        );
        let error = choose_csv(&mut ScriptedPrompt::default().typing(""), &[])
            .expect_err("empty path");
        assert_eq!(error.kind(), io::ErrorKind::InvalidInput);
        let error = choose_csv(&mut ScriptedPrompt::default(), &[]).expect_err("no tty");
        assert_eq!(error.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn pick_uses_the_chosen_option_or_the_fallback() {
        let formats = DiagramFormat::ordered();
        assert_eq!(pick(Ok(1), &formats, DiagramFormat::Svg), DiagramFormat::Png);
        assert_eq!(pick(Ok(9), &formats, DiagramFormat::Svg), DiagramFormat::Svg);
        assert_eq!(
            pick(Err(InquireError::OperationCanceled), &formats, DiagramFormat::Svg),
            DiagramFormat::Svg
        );
    }

    #[test]
    fn failed_channel_and_format_prompts_fall_back_to_defaults() {
        assert_eq!(
            choose_channel(&mut ScriptedPrompt::selecting(&[2])),
            OutputChannel::Image
        );
        assert_eq!(
            choose_channel(&mut ScriptedPrompt::default()),
            OutputChannel::Console
        );
        assert_eq!(
            choose_format(&mut ScriptedPrompt::selecting(&[1])),
            DiagramFormat::Png
        );
        assert_eq!(
            choose_format(&mut ScriptedPrompt::default()),
            DiagramFormat::Svg
        );
    }

    #[test]
    fn discovers_csv_files_sorted() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in ["b.csv", "a.csv", "notes.txt"] {
            std::fs::write(dir.path().join(name), "Outcome\n").expect("write fixture");
        }

        let names = discover_csv_files(dir.path())
            .into_iter()
            .filter_map(|path| path.file_name().map(|name| name.to_string_lossy().into_owned()))
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["a.csv", "b.csv"]);
    }
}

//! `fnf-sm`, converts a FNF chart into a StepMania simfile or back.
//!
//! ```text
//! fnf-sm song.json               # writes <song>.sm, with song-easy.json and song-hard.json
//! fnf-sm song.sm Hard --solo     # writes <title>.json from the Hard block
//! ```

mod files;

use std::{ffi::OsStr, io, path::PathBuf};

use clap::Parser;
use fnf_sm_rs::{prelude::*, sm::parse::SmParseErrorWithRange};

fn main() {
    let result = main_result();
    std::process::exit(match result {
        Ok(()) => 0,
        Err(err) => {
            log::error!("{err}");
            1
        }
    });
}

fn main_result() -> Result<(), AppError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("fnf_sm=info"))
        .init();

    let args = CliArgs::parse();
    let extension = args
        .input
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some(files::FNF_EXT) => forward(&args),
        Some(files::SM_EXT) => reverse(&args),
        Some(files::SSC_EXT) => Err(AppError::UnsupportedChartVariant(args.input)),
        _ => Err(AppError::Usage(format!(
            "{:?} is neither a .json chart nor a .sm simfile",
            args.input
        ))),
    }
}

/// Converts FNF charts (`.json`) into StepMania simfiles (`.sm`) and back.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct CliArgs {
    /// A FNF `.json` chart or a StepMania `.sm` simfile.
    input: PathBuf,
    /// Difficulty of the simfile block to convert into a FNF chart.
    #[arg(default_value_t = Difficulty::Challenge)]
    difficulty: Difficulty,
    /// Keep a dance-single block on one side instead of copying it to both.
    #[arg(long, default_value_t = false)]
    solo: bool,
    /// Write dance-double blocks instead of dance-single ones.
    #[arg(long, default_value_t = false)]
    double: bool,
    /// Where to write the result, by default the song name in the working directory.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn forward(args: &CliArgs) -> Result<(), AppError> {
    let charts = files::load_fnf_charts(&args.input)?;
    let mode = if args.double {
        ChartMode::Double
    } else {
        ChartMode::Single
    };
    let ForwardOutput { simfile, warnings } =
        fnf_to_sm(&charts, &ForwardConfig::default().mode(mode))?;
    let rendered = simfile.to_string();

    let title = simfile.header.title.as_deref().unwrap_or_default();
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| files::output_path(title, files::SM_EXT));
    log::info!(
        "converting {:?} to {output:?}, {} blocks, {} warnings",
        args.input,
        simfile.blocks.len(),
        warnings.len()
    );
    files::write(&output, &rendered)
}

fn reverse(args: &CliArgs) -> Result<(), AppError> {
    let source = files::read(&args.input)?;
    let name = args.input.display().to_string();
    let parsed = match parse_sm(&source) {
        Ok(parsed) => parsed,
        Err(err) => {
            #[cfg(feature = "diagnostics")]
            fnf_sm_rs::diagnostics::emit_sm_error(&name, &source, &err);
            return Err(AppError::Simfile {
                path: args.input.clone(),
                source: err,
            });
        }
    };
    #[cfg(feature = "diagnostics")]
    fnf_sm_rs::diagnostics::emit_sm_warnings(&name, &source, &parsed);

    let config = ReverseConfig::default()
        .difficulty(args.difficulty)
        .duet(!args.solo);
    let ReverseOutput { chart, warnings } = sm_to_fnf(&parsed.simfile, &config)?;
    let json = chart.to_json()?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| files::output_path(&chart.song_name, files::FNF_EXT));
    log::info!(
        "converting {name} to {output:?}, {} sections, {} warnings",
        chart.sections.len(),
        warnings.len()
    );
    files::write(&output, &json)
}

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("usage error: {0}")]
    Usage(String),
    #[error("{0:?} is an SSC simfile, which is not supported")]
    UnsupportedChartVariant(PathBuf),
    #[error("I/O error on {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("chart error in {path:?}: {source}")]
    Chart { path: PathBuf, source: FnfParseError },
    #[error("simfile error in {path:?}: {source}")]
    Simfile {
        path: PathBuf,
        source: SmParseErrorWithRange,
    },
    #[error(transparent)]
    Convert(#[from] ConvertError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

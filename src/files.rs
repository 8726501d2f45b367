//! Loading and writing chart files.

use std::{
    fs,
    path::{Path, PathBuf},
};

use fnf_sm_rs::prelude::*;

use crate::AppError;

/// Extension of FNF charts.
pub const FNF_EXT: &str = "json";
/// Extension of StepMania simfiles.
pub const SM_EXT: &str = "sm";
/// Extension of the SSC variant of simfiles.
pub const SSC_EXT: &str = "ssc";

/// File name suffixes of the other difficulties of a FNF chart. The chart itself is Medium.
const SIBLINGS: [(&str, Difficulty); 2] = [("-easy", Difficulty::Easy), ("-hard", Difficulty::Hard)];

pub fn read(path: &Path) -> Result<String, AppError> {
    fs::read_to_string(path).map_err(|source| AppError::Io {
        path: path.to_owned(),
        source,
    })
}

pub fn write(path: &Path, contents: &str) -> Result<(), AppError> {
    fs::write(path, contents).map_err(|source| AppError::Io {
        path: path.to_owned(),
        source,
    })
}

fn load_fnf(path: &Path) -> Result<FnfChart, AppError> {
    let source = read(path)?;
    parse_fnf(&source).map_err(|source| AppError::Chart {
        path: path.to_owned(),
        source,
    })
}

/// Loads the chart at `path` as Medium, and `<name>-easy.json` and `<name>-hard.json` next to
/// it when they exist.
pub fn load_fnf_charts(path: &Path) -> Result<Vec<(Difficulty, FnfChart)>, AppError> {
    let mut charts = vec![(Difficulty::Medium, load_fnf(path)?)];
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    for (suffix, difficulty) in SIBLINGS {
        let sibling = path.with_file_name(format!("{stem}{suffix}.{FNF_EXT}"));
        if sibling.is_file() {
            log::info!("found {difficulty} chart {sibling:?}");
            charts.push((difficulty, load_fnf(&sibling)?));
        }
    }
    Ok(charts)
}

/// Output path in the working directory named after a song.
pub fn output_path(song: &str, extension: &str) -> PathBuf {
    let name: String = song
        .chars()
        .map(|c| if std::path::is_separator(c) { '_' } else { c })
        .collect();
    PathBuf::from(format!("{name}.{extension}"))
}

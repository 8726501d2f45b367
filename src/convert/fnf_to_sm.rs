//! Forward conversion, FNF charts into a simfile.

use super::{
    ChartFault, ConvertError, ConvertWarning, ForwardConfig, GridBuilder, GridOutput,
    MeasureCompressor, record,
};
use crate::{
    fnf::FnfChart,
    sm::{Difficulty, NotesBlock, Simfile, SmHeader},
    tempo::TempoMap,
};

/// Forward conversion results, includes the simfile and warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardOutput {
    /// The simfile.
    pub simfile: Simfile,
    /// Warnings.
    pub warnings: Vec<ConvertWarning>,
}

/// Converts FNF charts, one per difficulty, into a simfile with a notes block for each.
///
/// The header is made from the first chart: its song name as `#TITLE`, the song name with
/// [`ForwardConfig::music_extension`] as `#MUSIC`, and its tempo map as `#BPMS`. Every chart
/// is placed on rows with that tempo map, so its notes keep their times under `#BPMS`. A chart
/// with nothing to write gets no block.
///
/// # Errors
///
/// - [`ConvertError::NoCharts`] when `charts` is empty.
/// - [`ConvertError::Forward`] when a chart has an invalid tempo, or runs past the last
///   measure.
pub fn fnf_to_sm(
    charts: &[(Difficulty, FnfChart)],
    config: &ForwardConfig,
) -> Result<ForwardOutput, ConvertError> {
    let Some((header_difficulty, header_chart)) = charts.first() else {
        return Err(ConvertError::NoCharts);
    };
    let header_tempo = build_tempo(*header_difficulty, header_chart)?;
    let song = &header_chart.song_name;
    let mut simfile = Simfile {
        header: SmHeader {
            title: Some(song.clone()),
            music: Some(format!("{song}{}", config.music_extension)),
            offset: None,
            bpms: Some(header_tempo.tempo_changes()),
        },
        blocks: Vec::with_capacity(charts.len()),
    };

    let mut warnings = vec![];
    for (difficulty, chart) in charts {
        if build_tempo(*difficulty, chart)? != header_tempo {
            record(
                &mut warnings,
                ConvertWarning::TempoMismatch {
                    difficulty: *difficulty,
                },
            );
        }

        let GridOutput {
            grid,
            warnings: grid_warnings,
        } = GridBuilder::new(&header_tempo, config.mode)
            .build(chart)
            .map_err(|source| ConvertError::Forward {
                song: chart.song_name.clone(),
                difficulty: *difficulty,
                source,
            })?;
        warnings.extend(grid_warnings);
        if grid.is_empty() {
            record(
                &mut warnings,
                ConvertWarning::EmptyChart {
                    difficulty: *difficulty,
                },
            );
            continue;
        }

        let measures = MeasureCompressor::new(&grid).compress();
        log::info!(
            "converted {difficulty} chart of `{}` into {} measures",
            chart.song_name,
            measures.len()
        );
        simfile.blocks.push(NotesBlock {
            mode: config.mode,
            description: String::new(),
            difficulty: *difficulty,
            meter: config.meter,
            measures,
        });
    }

    Ok(ForwardOutput { simfile, warnings })
}

fn build_tempo(difficulty: Difficulty, chart: &FnfChart) -> Result<TempoMap, ConvertError> {
    TempoMap::build_forward(chart.base_bpm, &chart.sections).map_err(|err| {
        ConvertError::Forward {
            song: chart.song_name.clone(),
            difficulty,
            source: ChartFault::from(err),
        }
    })
}

//! Reverse conversion, a notes block of a simfile into a FNF chart.

use std::{borrow::Cow, collections::HashMap};

use super::{ChartFault, ConvertError, ConvertWarning, ReverseConfig, record};
use crate::{
    fnf::{FnfChart, NoteEvent, Section, note::MINE_LANE_OFFSET},
    sm::{CellKind, ChartMode, Measure, NotesBlock, Row, Simfile},
    tempo::{Bpm, MEASURE_TICKS, TempoMap},
};

/// Song name used when the simfile has no `#TITLE`.
pub const DEFAULT_TITLE: &str = "Simfile";

/// Steps of every section made from a measure.
const SECTION_STEPS: u64 = 16;

/// Reverse conversion results, includes the chart and warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct ReverseOutput {
    /// The chart.
    pub chart: FnfChart,
    /// Warnings.
    pub warnings: Vec<ConvertWarning>,
}

/// Sections read from a notes block, with warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBlock {
    /// One section per measure.
    pub sections: Vec<Section>,
    /// Warnings.
    pub warnings: Vec<ConvertWarning>,
}

/// Reads the rows of a notes block back into timed notes.
///
/// Every measure becomes a 16-step section. A row at index `i` of a measure with `n` rows is
/// at tick `measure_start + i * 192 / n`, which need not be an integer. Taps and hold heads
/// become notes at the time of their tick minus the offset, and a hold tail sets the duration
/// of the open hold on its lane. Mines become notes on their lane plus 8.
///
/// In double mode, when the right half of a measure has more than half as many active cells
/// as the left half, or the left half has none, the halves are swapped and the section is
/// marked must-hit. This undoes the mirroring of the forward conversion.
#[derive(Debug, Clone, Copy)]
pub struct ReverseGridParser<'a> {
    tempo: &'a TempoMap,
    offset_ms: f64,
    duet: bool,
}

impl<'a> ReverseGridParser<'a> {
    /// Creates a parser. With `duet`, the 4 lanes of a single block are copied to both sides.
    #[must_use]
    pub const fn new(tempo: &'a TempoMap, offset_ms: f64, duet: bool) -> Self {
        Self {
            tempo,
            offset_ms,
            duet,
        }
    }

    /// Reads `block` into sections.
    ///
    /// # Errors
    ///
    /// [`ChartFault::StructuralMismatch`] when a measure has no rows or a row does not have
    /// the width of the block's mode.
    pub fn parse(&self, block: &NotesBlock) -> Result<ParsedBlock, ChartFault> {
        let mut sections: Vec<Section> = Vec::with_capacity(block.measures.len());
        let mut warnings = vec![];
        let mut open_holds = HashMap::new();
        let mut previous_bpm: Option<Bpm> = None;

        for (index, measure) in block.measures.iter().enumerate() {
            check_shape(block.mode, index, measure)?;
            let start = index as u64 * MEASURE_TICKS;
            let bpm = self.tempo.bpm_at_tick(start);
            let (rows, must_hit) = self.arrange(block.mode, &measure.rows);
            let mut section = Section {
                length_in_steps: SECTION_STEPS,
                bpm: Some(bpm.as_f64()),
                changes_bpm: previous_bpm.is_some_and(|previous| previous != bpm),
                must_hit,
                type_of_section: 0,
                notes: vec![],
            };
            previous_bpm = Some(bpm);

            let ticks_per_row = measure.ticks_per_row();
            for (row_index, row) in rows.iter().enumerate() {
                let tick = start as f64 + row_index as f64 * ticks_per_row;
                let time = self.tempo.tick_to_time(tick) - self.offset_ms;
                for (lane, &cell) in row.cells().iter().enumerate() {
                    match cell {
                        CellKind::Empty => {}
                        CellKind::Tap => section.notes.push(NoteEvent::new(time, lane as i64, 0.0)),
                        CellKind::Mine => section.notes.push(NoteEvent::new(
                            time,
                            lane as i64 + MINE_LANE_OFFSET,
                            0.0,
                        )),
                        CellKind::HoldHead | CellKind::RollHead => {
                            section.notes.push(NoteEvent::new(time, lane as i64, 0.0));
                            open_holds.insert(lane, (sections.len(), section.notes.len() - 1));
                        }
                        CellKind::HoldTail => {
                            let Some((section_index, note_index)) = open_holds.remove(&lane) else {
                                record(
                                    &mut warnings,
                                    ConvertWarning::UnmatchedHoldTail {
                                        measure: index,
                                        row: row_index,
                                        lane,
                                    },
                                );
                                continue;
                            };
                            let notes = match sections.get_mut(section_index) {
                                Some(head_section) => &mut head_section.notes,
                                None => &mut section.notes,
                            };
                            if let Some(head) = notes.get_mut(note_index) {
                                head.hold_duration_ms = time - head.time_ms;
                            }
                        }
                    }
                }
            }
            sections.push(section);
        }

        let mut unclosed: Vec<_> = open_holds.into_keys().collect();
        unclosed.sort_unstable();
        for lane in unclosed {
            record(&mut warnings, ConvertWarning::UnclosedHold { lane });
        }
        Ok(ParsedBlock { sections, warnings })
    }

    /// Lays the rows of a measure out on FNF lanes, and tells whether the section is must-hit.
    fn arrange<'r>(&self, mode: ChartMode, rows: &'r [Row]) -> (Cow<'r, [Row]>, bool) {
        match mode {
            ChartMode::Double if right_side_leads(rows) => {
                let swapped = rows
                    .iter()
                    .map(|row| {
                        let mut row = row.clone();
                        row.swap_halves();
                        row
                    })
                    .collect();
                (Cow::Owned(swapped), true)
            }
            ChartMode::Double => (Cow::Borrowed(rows), false),
            ChartMode::Single if self.duet => {
                (Cow::Owned(rows.iter().map(Row::doubled).collect()), true)
            }
            ChartMode::Single => (Cow::Borrowed(rows), true),
        }
    }
}

/// Whether the right half of 8-lane rows holds the controlled player. Unknown cell characters
/// were read as empty, so they do not count.
fn right_side_leads(rows: &[Row]) -> bool {
    let left: usize = rows.iter().map(|row| row.active_in(0..4)).sum();
    let right: usize = rows.iter().map(|row| row.active_in(4..8)).sum();
    left == 0 || right as f64 / left as f64 > 0.5
}

fn check_shape(mode: ChartMode, index: usize, measure: &Measure) -> Result<(), ChartFault> {
    if measure.rows.is_empty() {
        return Err(ChartFault::StructuralMismatch {
            reason: format!("measure {} has no rows", index + 1),
        });
    }
    if let Some(row) = measure.rows.iter().find(|row| row.width() != mode.lanes()) {
        return Err(ChartFault::StructuralMismatch {
            reason: format!(
                "a row of measure {} has {} lanes but {mode} has {}",
                index + 1,
                row.width(),
                mode.lanes()
            ),
        });
    }
    Ok(())
}

/// Converts the block of the requested difficulty into a FNF chart.
///
/// The tempo map is rebuilt from `#BPMS`, and `#OFFSET` seconds are subtracted from every
/// note time. The first block of the difficulty is used, whatever its mode.
///
/// # Errors
///
/// - [`ConvertError::DifficultyNotFound`] when no block has the difficulty.
/// - [`ConvertError::Reverse`] when the tempo is missing or invalid, or the block is malformed.
pub fn sm_to_fnf(simfile: &Simfile, config: &ReverseConfig) -> Result<ReverseOutput, ConvertError> {
    let block = simfile
        .block(config.difficulty)
        .ok_or_else(|| ConvertError::DifficultyNotFound {
            difficulty: config.difficulty,
            available: simfile.difficulties(),
        })?;
    let title = simfile
        .header
        .title
        .clone()
        .unwrap_or_else(|| DEFAULT_TITLE.into());
    let fault = |source: ChartFault| ConvertError::Reverse {
        title: title.clone(),
        difficulty: config.difficulty,
        source,
    };

    let changes = simfile.header.bpms.as_deref().unwrap_or_default();
    let tempo = TempoMap::build_reverse(changes).map_err(|err| fault(err.into()))?;
    let offset_ms = simfile.header.offset.unwrap_or(0.0) * 1000.0;
    let ParsedBlock { sections, warnings } = ReverseGridParser::new(&tempo, offset_ms, config.duet)
        .parse(block)
        .map_err(fault)?;

    log::info!(
        "converted {} block of `{title}` into {} sections",
        config.difficulty,
        sections.len()
    );
    let mut chart = FnfChart::new(title, tempo.initial_bpm().as_f64());
    chart.sections = sections;
    Ok(ReverseOutput { chart, warnings })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        sm::{Difficulty, SmHeader, parse::parse_sm},
        tempo::{TempoChange, TempoError},
    };

    fn row(s: &str) -> Row {
        s.chars().filter_map(CellKind::from_char).collect()
    }

    fn measure(rows: &[&str]) -> Measure {
        Measure {
            rows: rows.iter().map(|s| row(s)).collect(),
        }
    }

    fn block(mode: ChartMode, measures: Vec<Measure>) -> NotesBlock {
        NotesBlock {
            mode,
            description: String::new(),
            difficulty: Difficulty::Challenge,
            meter: 1,
            measures,
        }
    }

    fn tempo_120() -> TempoMap {
        TempoMap::build_reverse(&[TempoChange {
            beat: 0.0,
            bpm: 120.0,
        }])
        .unwrap()
    }

    #[test]
    fn right_heavy_double_measure_is_swapped() {
        let tempo = tempo_120();
        let parser = ReverseGridParser::new(&tempo, 0.0, false);
        let ParsedBlock { sections, warnings } = parser
            .parse(&block(
                ChartMode::Double,
                vec![measure(&["10001000", "00000100", "00000010", "00000001"])],
            ))
            .unwrap();
        assert!(warnings.is_empty());
        assert!(sections[0].must_hit);
        let lanes: Vec<_> = sections[0].notes.iter().map(|note| note.lane).collect();
        assert_eq!(lanes, vec![0, 4, 1, 2, 3]);
        let times: Vec<_> = sections[0].notes.iter().map(|note| note.time_ms).collect();
        assert_eq!(times, vec![0.0, 0.0, 500.0, 1000.0, 1500.0]);
    }

    #[test]
    fn left_heavy_double_measure_is_kept() {
        let tempo = tempo_120();
        let parser = ReverseGridParser::new(&tempo, 0.0, false);
        let ParsedBlock { sections, .. } = parser
            .parse(&block(
                ChartMode::Double,
                vec![measure(&["11000000", "00110000", "00001000", "00000000"])],
            ))
            .unwrap();
        // right / left = 1 / 4
        assert!(!sections[0].must_hit);
        assert_eq!(sections[0].notes[4].lane, 4);
    }

    #[test]
    fn unknown_cells_do_not_count_for_a_side() {
        let source = "\
#BPMS:0.000=120;
#NOTES:dance-double::Challenge:1::
10000000
00001000
50000000
;
";
        let output = parse_sm(source).unwrap();
        assert_eq!(output.parse_warnings.len(), 1);
        let ReverseOutput { chart, .. } =
            sm_to_fnf(&output.simfile, &ReverseConfig::default()).unwrap();
        // one note on each side, so the halves are swapped
        assert!(chart.sections[0].must_hit);
        let lanes: Vec<_> = chart.sections[0].notes.iter().map(|note| note.lane).collect();
        assert_eq!(lanes, vec![4, 0]);
    }

    #[test]
    fn empty_left_half_counts_as_right_leading() {
        assert!(right_side_leads(&[Row::empty(8)]));
        assert!(!right_side_leads(&[row("11000001")]));
        assert!(!right_side_leads(&[row("11100001")]));
        assert!(right_side_leads(&[row("11000111")]));
    }

    #[test]
    fn holds_span_measures() {
        let tempo = tempo_120();
        let parser = ReverseGridParser::new(&tempo, 0.0, false);
        let ParsedBlock { sections, warnings } = parser
            .parse(&block(
                ChartMode::Single,
                vec![
                    measure(&["2000", "0000", "0003", "4000"]),
                    measure(&["3000", "0000"]),
                ],
            ))
            .unwrap();
        assert_eq!(
            warnings,
            vec![ConvertWarning::UnmatchedHoldTail {
                measure: 0,
                row: 2,
                lane: 3
            }]
        );
        assert_eq!(
            sections[0].notes,
            vec![NoteEvent::new(0.0, 0, 0.0), NoteEvent::new(1500.0, 0, 500.0)]
        );
        assert!(sections[1].notes.is_empty());
    }

    #[test]
    fn hold_closed_in_a_later_measure() {
        let tempo = tempo_120();
        let parser = ReverseGridParser::new(&tempo, 0.0, false);
        let ParsedBlock { sections, warnings } = parser
            .parse(&block(
                ChartMode::Single,
                vec![measure(&["0020", "0000"]), measure(&["0000", "0030"])],
            ))
            .unwrap();
        assert!(warnings.is_empty());
        assert_eq!(sections[0].notes, vec![NoteEvent::new(0.0, 2, 3000.0)]);
    }

    #[test]
    fn unclosed_hold_is_reported() {
        let tempo = tempo_120();
        let parser = ReverseGridParser::new(&tempo, 0.0, false);
        let ParsedBlock { warnings, .. } = parser
            .parse(&block(ChartMode::Single, vec![measure(&["0200"])]))
            .unwrap();
        assert_eq!(warnings, vec![ConvertWarning::UnclosedHold { lane: 1 }]);
    }

    #[test]
    fn duet_copies_lanes_to_both_sides() {
        let tempo = tempo_120();
        let parser = ReverseGridParser::new(&tempo, 0.0, true);
        let ParsedBlock { sections, .. } = parser
            .parse(&block(ChartMode::Single, vec![measure(&["1M00"])]))
            .unwrap();
        let lanes: Vec<_> = sections[0].notes.iter().map(|note| note.lane).collect();
        assert_eq!(lanes, vec![0, 9, 4, 13]);
        assert!(sections[0].must_hit);
    }

    #[test]
    fn fractional_rows_and_offset() {
        let tempo = tempo_120();
        let parser = ReverseGridParser::new(&tempo, 250.0, false);
        let ParsedBlock { sections, .. } = parser
            .parse(&block(
                ChartMode::Single,
                vec![measure(&["0000", "1000", "0000", "0000", "0000"])],
            ))
            .unwrap();
        // 38.4 ticks at 120 BPM is 400 ms
        assert!((sections[0].notes[0].time_ms - 150.0).abs() < 1e-9);
    }

    #[test]
    fn malformed_measures_are_rejected() {
        let tempo = tempo_120();
        let parser = ReverseGridParser::new(&tempo, 0.0, false);
        assert!(matches!(
            parser.parse(&block(ChartMode::Single, vec![Measure::default()])),
            Err(ChartFault::StructuralMismatch { .. })
        ));
        assert!(matches!(
            parser.parse(&block(ChartMode::Double, vec![measure(&["1000"])])),
            Err(ChartFault::StructuralMismatch { .. })
        ));
    }

    fn simfile(bpms: Option<Vec<TempoChange>>) -> Simfile {
        Simfile {
            header: SmHeader {
                title: None,
                music: None,
                offset: None,
                bpms,
            },
            blocks: vec![block(
                ChartMode::Single,
                vec![measure(&["1000"]), measure(&["0100"]), measure(&["0010"])],
            )],
        }
    }

    #[test]
    fn song_fields_and_section_tempos() {
        let source = simfile(Some(vec![
            TempoChange {
                beat: 0.0,
                bpm: 120.0,
            },
            TempoChange {
                beat: 4.0,
                bpm: 150.0,
            },
        ]));
        let ReverseOutput { chart, warnings } =
            sm_to_fnf(&source, &ReverseConfig::default()).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(chart.song_name, DEFAULT_TITLE);
        assert_eq!(chart.base_bpm, 120.0);
        assert_eq!(chart.player1, "bf");
        assert_eq!(chart.player2, "pico");
        let tempos: Vec<_> = chart
            .sections
            .iter()
            .map(|section| (section.bpm, section.changes_bpm))
            .collect();
        assert_eq!(
            tempos,
            vec![
                (Some(120.0), false),
                (Some(150.0), true),
                (Some(150.0), false)
            ]
        );
        assert_eq!(chart.sections[2].notes[0].time_ms, 2000.0 + 1600.0);
    }

    #[test]
    fn missing_difficulty_or_tempo() {
        let source = simfile(None);
        assert_eq!(
            sm_to_fnf(&source, &ReverseConfig::default().difficulty(Difficulty::Hard)),
            Err(ConvertError::DifficultyNotFound {
                difficulty: Difficulty::Hard,
                available: vec![Difficulty::Challenge],
            })
        );
        assert_eq!(
            sm_to_fnf(&source, &ReverseConfig::default()),
            Err(ConvertError::Reverse {
                title: DEFAULT_TITLE.into(),
                difficulty: Difficulty::Challenge,
                source: ChartFault::Tempo(TempoError::EmptyTempoMap),
            })
        );
    }
}

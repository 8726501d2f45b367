//! Placement of FNF notes on a tick grid.

use std::collections::BTreeMap;

use super::{ChartFault, ConvertWarning, record};
use crate::{
    fnf::{FnfChart, NoteEvent, Section},
    sm::{CellKind, ChartMode, Row},
    tempo::{MAX_TICK, TempoError, TempoMap},
};

/// Swaps the sides of a two-player lane, `0..=3` with `4..=7`. Applying it twice is identity.
#[must_use]
pub const fn mirror_lane(lane: u8) -> u8 {
    (lane + 4) % 8
}

/// Percentage of the notes of `section` whose raw lane, modulo 8, is 4 or more. A section with
/// no notes scores 100.
///
/// Only sections scoring exactly 0 are kept in single mode.
#[must_use]
pub fn upper_half_percentage(section: &Section) -> f64 {
    if section.notes.is_empty() {
        return 100.0;
    }
    let upper = section
        .notes
        .iter()
        .filter(|note| note.base_lane() >= 4)
        .count();
    upper as f64 / section.notes.len() as f64 * 100.0
}

/// Rows keyed by tick. A row is created on the first write to its tick, and later writes
/// to the same tick merge into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickGrid {
    width: usize,
    rows: BTreeMap<u64, Row>,
}

impl TickGrid {
    /// Creates an empty grid whose rows have `width` lanes.
    #[must_use]
    pub const fn new(width: usize) -> Self {
        Self {
            width,
            rows: BTreeMap::new(),
        }
    }

    /// Number of lanes of each row.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Writes `cell` at `tick` and `lane`. An earlier cell on the same lane is overwritten.
    pub fn write(&mut self, tick: u64, lane: usize, cell: CellKind) {
        self.rows
            .entry(tick)
            .or_insert_with(|| Row::empty(self.width))
            .set(lane, cell);
    }

    /// The row at `tick`, if anything was written there.
    #[must_use]
    pub fn row(&self, tick: u64) -> Option<&Row> {
        self.rows.get(&tick)
    }

    /// Written ticks in `ticks`, in order.
    pub fn ticks_in(&self, ticks: std::ops::Range<u64>) -> impl Iterator<Item = u64> + '_ {
        self.rows.range(ticks).map(|(&tick, _)| tick)
    }

    /// The greatest written tick.
    #[must_use]
    pub fn last_tick(&self) -> Option<u64> {
        self.rows.keys().next_back().copied()
    }

    /// Whether nothing was written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Grid building results, includes the grid and warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct GridOutput {
    /// The grid.
    pub grid: TickGrid,
    /// Warnings.
    pub warnings: Vec<ConvertWarning>,
}

/// Places the notes of a FNF chart on a [`TickGrid`].
///
/// Each note is placed at `tempo.time_to_tick(time_ms)`:
///
/// - A raw lane of 8 or more is a mine on lane `raw % 8`.
/// - In a must-hit section the lane is mirrored with [`mirror_lane`].
/// - In single mode, sections with any note on a raw lane of 4 to 7 are dropped, and kept
///   lanes are folded into `0..=3`.
/// - A note with a duration writes a hold head, and a hold tail at the tick of its end. A hold
///   too short to span a tick is written as a tap.
/// - Nothing may be written at [`MAX_TICK`] or later.
#[derive(Debug, Clone, Copy)]
pub struct GridBuilder<'a> {
    tempo: &'a TempoMap,
    mode: ChartMode,
}

impl<'a> GridBuilder<'a> {
    /// Creates a builder placing notes with `tempo` on rows of `mode`.
    #[must_use]
    pub const fn new(tempo: &'a TempoMap, mode: ChartMode) -> Self {
        Self { tempo, mode }
    }

    /// Builds the grid of `chart`.
    ///
    /// # Errors
    ///
    /// [`TempoError::TooLong`] when a note or a hold tail falls at [`MAX_TICK`] or later.
    pub fn build(&self, chart: &FnfChart) -> Result<GridOutput, ChartFault> {
        let mut grid = TickGrid::new(self.mode.lanes());
        let mut warnings = vec![];
        for (index, section) in chart.sections.iter().enumerate() {
            if self.mode == ChartMode::Single {
                let score = upper_half_percentage(section);
                if score > 0.0 {
                    log::debug!("section {index} dropped, {score:.1}% of its notes on lanes 4 to 7");
                    continue;
                }
            }
            for note in &section.notes {
                self.place(&mut grid, &mut warnings, index, section.must_hit, note)?;
            }
        }
        Ok(GridOutput { grid, warnings })
    }

    fn place(
        &self,
        grid: &mut TickGrid,
        warnings: &mut Vec<ConvertWarning>,
        section: usize,
        must_hit: bool,
        note: &NoteEvent,
    ) -> Result<(), ChartFault> {
        let too_long = || ChartFault::from(TempoError::TooLong { section });
        let Ok(tick) = u64::try_from(self.tempo.time_to_tick(note.time_ms)) else {
            record(
                warnings,
                ConvertWarning::NegativeTick {
                    section,
                    time_ms: note.time_ms,
                },
            );
            return Ok(());
        };
        if tick >= MAX_TICK {
            return Err(too_long());
        }

        let mut lane = note.base_lane();
        if must_hit {
            lane = mirror_lane(lane);
        }
        if self.mode == ChartMode::Single {
            lane %= 4;
        }
        let lane = usize::from(lane);

        if note.is_mine() {
            grid.write(tick, lane, CellKind::Mine);
            return Ok(());
        }
        if !note.is_hold() {
            grid.write(tick, lane, CellKind::Tap);
            return Ok(());
        }
        let end = self
            .tempo
            .time_to_tick(note.time_ms + note.hold_duration_ms);
        match u64::try_from(end) {
            Ok(end) if end >= MAX_TICK => return Err(too_long()),
            Ok(end) if end > tick => {
                grid.write(tick, lane, CellKind::HoldHead);
                grid.write(end, lane, CellKind::HoldTail);
            }
            _ => {
                log::debug!("hold at {} ms is shorter than a tick", note.time_ms);
                grid.write(tick, lane, CellKind::Tap);
            }
        }
        Ok(())
    }
}

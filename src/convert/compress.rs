//! Cutting a tick grid into measures of the fewest rows.

use num::Integer;

use super::grid::TickGrid;
use crate::{
    sm::{Measure, Row},
    tempo::MEASURE_TICKS,
};

/// The greatest distance between rows which still puts every offset on a row.
///
/// This is the GCD of [`MEASURE_TICKS`] and all `offsets`, so an empty measure gets one row.
#[must_use]
pub fn row_step(offsets: impl IntoIterator<Item = u64>) -> u64 {
    let mut step = MEASURE_TICKS;
    for offset in offsets {
        step = step.gcd(&offset);
        if step == 1 {
            break;
        }
    }
    step
}

/// Renders a [`TickGrid`] as measures.
///
/// Measures run from tick 0 to the measure holding the last written tick. Each measure has
/// `192 / step` rows, with `step` from [`row_step`] over the written offsets in it. Ticks with
/// nothing written render as empty rows.
#[derive(Debug, Clone, Copy)]
pub struct MeasureCompressor<'a> {
    grid: &'a TickGrid,
}

impl<'a> MeasureCompressor<'a> {
    /// Creates a compressor over `grid`.
    #[must_use]
    pub const fn new(grid: &'a TickGrid) -> Self {
        Self { grid }
    }

    /// Number of measures needed to hold every written tick.
    #[must_use]
    pub fn measure_count(&self) -> u64 {
        self.grid
            .last_tick()
            .map_or(0, |last| last / MEASURE_TICKS + 1)
    }

    /// Renders the measure at `index`.
    #[must_use]
    pub fn measure(&self, index: u64) -> Measure {
        let start = index * MEASURE_TICKS;
        let end = start + MEASURE_TICKS;
        let step = row_step(self.grid.ticks_in(start..end).map(|tick| tick - start));
        log::debug!("measure {index}: {} rows", MEASURE_TICKS / step);
        let rows = (start..end)
            .step_by(step as usize)
            .map(|tick| {
                self.grid
                    .row(tick)
                    .cloned()
                    .unwrap_or_else(|| Row::empty(self.grid.width()))
            })
            .collect();
        Measure { rows }
    }

    /// Renders all measures.
    #[must_use]
    pub fn compress(&self) -> Vec<Measure> {
        (0..self.measure_count())
            .map(|index| self.measure(index))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::sm::CellKind;

    fn grid_with(ticks: &[u64]) -> TickGrid {
        let mut grid = TickGrid::new(4);
        for &tick in ticks {
            grid.write(tick, 0, CellKind::Tap);
        }
        grid
    }

    #[test]
    fn half_measure_offsets_give_two_rows() {
        assert_eq!(row_step([0, 96]), 96);
        let grid = grid_with(&[0, 96]);
        let measures = MeasureCompressor::new(&grid).compress();
        assert_eq!(measures.len(), 1);
        assert_eq!(measures[0].rows.len(), 2);
    }

    #[test]
    fn quarter_notes_give_four_rows() {
        assert_eq!(row_step([0, 48, 96, 144]), 48);
        let grid = grid_with(&[0, 48, 96, 144]);
        let measures = MeasureCompressor::new(&grid).compress();
        assert_eq!(measures[0].rows.len(), 4);
        assert!(measures[0].rows.iter().all(|row| row.to_string() == "1000"));
    }

    #[test]
    fn adjacent_ticks_need_every_row() {
        assert_eq!(row_step([0, 1]), 1);
        let grid = grid_with(&[0, 1]);
        let measures = MeasureCompressor::new(&grid).compress();
        assert_eq!(measures[0].rows.len(), 192);
        assert_eq!(measures[0].rows[1].to_string(), "1000");
        assert!(measures[0].rows[2].is_empty());
    }

    #[test]
    fn empty_measures_get_one_row() {
        assert_eq!(row_step(std::iter::empty()), 192);
        let grid = grid_with(&[400]);
        let measures = MeasureCompressor::new(&grid).compress();
        assert_eq!(measures.len(), 3);
        assert_eq!(measures[0].rows, vec![Row::empty(4)]);
        assert_eq!(measures[1].rows, vec![Row::empty(4)]);
        // 400 - 384 = 16, gcd(192, 16) = 16
        assert_eq!(measures[2].rows.len(), 12);
        assert_eq!(measures[2].rows[1].to_string(), "1000");
    }

    #[test]
    fn tick_on_barline_opens_a_measure() {
        let grid = grid_with(&[0, 192]);
        let compressor = MeasureCompressor::new(&grid);
        assert_eq!(compressor.measure_count(), 2);
        assert_eq!(compressor.measure(1).rows.len(), 1);
        assert_eq!(MeasureCompressor::new(&TickGrid::new(4)).measure_count(), 0);
    }
}

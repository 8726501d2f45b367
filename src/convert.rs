//! Conversions between FNF charts and simfiles.
//!
//! - Forward, [`fnf_to_sm`]: each chart gets its own [`TempoMap`](crate::tempo::TempoMap), its
//!   notes are placed on a [`TickGrid`] by [`GridBuilder`], and the grid is cut into measures by
//!   [`MeasureCompressor`]. Every chart becomes one notes block of a single simfile.
//! - Reverse, [`sm_to_fnf`]: the tempo map is rebuilt from `#BPMS`, and one notes block is read
//!   back into sections by [`ReverseGridParser`].
//!
//! Conversions are all or nothing. Problems which leave the output usable are collected as
//! [`ConvertWarning`]s next to it.

pub mod compress;
pub mod fnf_to_sm;
pub mod grid;
pub mod sm_to_fnf;

use itertools::Itertools;
use thiserror::Error;

use crate::{
    sm::{ChartMode, Difficulty},
    tempo::TempoError,
};

pub use self::{
    compress::{MeasureCompressor, row_step},
    fnf_to_sm::{ForwardOutput, fnf_to_sm},
    grid::{GridBuilder, GridOutput, TickGrid, mirror_lane, upper_half_percentage},
    sm_to_fnf::{ParsedBlock, ReverseGridParser, ReverseOutput, sm_to_fnf},
};

/// What went wrong inside one chart.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartFault {
    /// The tempo map could not be built.
    #[error(transparent)]
    Tempo(#[from] TempoError),
    /// The notes do not fit the shape their block declares.
    #[error("structural mismatch: {reason}")]
    StructuralMismatch {
        /// Which expectation was violated.
        reason: String,
    },
}

/// Errors on converting, naming the chart which failed.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    /// A FNF chart could not be converted into a notes block.
    #[error("failed to convert {difficulty} chart of `{song}`: {source}")]
    Forward {
        /// Song name of the chart.
        song: String,
        /// Difficulty the chart was given.
        difficulty: Difficulty,
        /// What went wrong.
        source: ChartFault,
    },
    /// A notes block could not be converted into a FNF chart.
    #[error("failed to convert {difficulty} block of `{title}`: {source}")]
    Reverse {
        /// Title of the simfile.
        title: String,
        /// Difficulty of the block.
        difficulty: Difficulty,
        /// What went wrong.
        source: ChartFault,
    },
    /// The simfile has no block of the requested difficulty.
    #[error("no {difficulty} block found, the simfile has [{}]", .available.iter().join(", "))]
    DifficultyNotFound {
        /// The requested difficulty.
        difficulty: Difficulty,
        /// Difficulties of the blocks in the simfile.
        available: Vec<Difficulty>,
    },
    /// The forward conversion was given no chart.
    #[error("no chart to convert")]
    NoCharts,
}

/// A problem which does not stop a conversion.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertWarning {
    /// A note is placed before the start of the song, where no row exists. It was skipped.
    #[error("note at {time_ms} ms in section {section} is before the start, skipped")]
    NegativeTick {
        /// Index of the section holding the note.
        section: usize,
        /// Time of the note.
        time_ms: f64,
    },
    /// A chart had no note left to write. No block was made for it.
    #[error("{difficulty} chart has no note to write, block skipped")]
    EmptyChart {
        /// Difficulty of the chart.
        difficulty: Difficulty,
    },
    /// A chart declares other tempos than the chart the simfile header was made from. Its notes
    /// were placed with the header tempo, keeping their times.
    #[error("{difficulty} chart has a different tempo from the header chart")]
    TempoMismatch {
        /// Difficulty of the chart.
        difficulty: Difficulty,
    },
    /// A hold tail was found on a lane with no open hold. It was ignored.
    #[error("hold tail at measure {measure}, row {row}, lane {lane} has no head, ignored")]
    UnmatchedHoldTail {
        /// Index of the measure.
        measure: usize,
        /// Index of the row in the measure.
        row: usize,
        /// Lane of the cell.
        lane: usize,
    },
    /// A hold was still open at the end of the block. It was kept as a tap.
    #[error("hold at lane {lane} is never closed, kept as a tap")]
    UnclosedHold {
        /// Lane of the hold.
        lane: usize,
    },
}

fn record(warnings: &mut Vec<ConvertWarning>, warning: ConvertWarning) {
    log::warn!("{warning}");
    warnings.push(warning);
}

/// Options of the forward conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardConfig {
    /// Mode of the notes blocks to make.
    pub mode: ChartMode,
    /// Numeric level written on every block.
    pub meter: u32,
    /// Extension appended to the song name to make `#MUSIC`, dot included.
    pub music_extension: String,
}

impl Default for ForwardConfig {
    fn default() -> Self {
        Self {
            mode: ChartMode::Single,
            meter: 1,
            music_extension: ".ogg".into(),
        }
    }
}

impl ForwardConfig {
    /// Sets the mode.
    #[must_use]
    pub const fn mode(mut self, mode: ChartMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the meter.
    #[must_use]
    pub const fn meter(mut self, meter: u32) -> Self {
        self.meter = meter;
        self
    }

    /// Sets the music extension.
    #[must_use]
    pub fn music_extension(mut self, extension: impl Into<String>) -> Self {
        self.music_extension = extension.into();
        self
    }
}

/// Options of the reverse conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReverseConfig {
    /// Difficulty of the block to convert.
    pub difficulty: Difficulty,
    /// Whether to copy the lanes of a single block to both sides, making a two-player chart.
    pub duet: bool,
}

impl Default for ReverseConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Challenge,
            duet: false,
        }
    }
}

impl ReverseConfig {
    /// Sets the difficulty.
    #[must_use]
    pub const fn difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Sets the duet flag.
    #[must_use]
    pub const fn duet(mut self, duet: bool) -> Self {
        self.duet = duet;
        self
    }
}

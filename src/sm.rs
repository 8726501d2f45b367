//! The StepMania simfile format.
//!
//! Raw [String] == [lex::lex] ==> tags (in [lex::SmLexOutput]) == [parse::parse_sm] ==> [Simfile]
//! (in [parse::SmParseOutput]). A [Simfile] renders back to text through its `Display` impl.
//!
//! Only the parts needed for conversion are modeled: the `TITLE`, `MUSIC`, `OFFSET` and `BPMS`
//! header tags and the `NOTES` blocks of `dance-single` and `dance-double` charts.

pub mod cell;
pub mod lex;
pub mod parse;
mod unparse;

use std::str::FromStr;

use thiserror::Error;

use crate::tempo::{MEASURE_TICKS, TempoChange};

pub use self::cell::{CellKind, Row};

/// Play style of a notes block, which fixes the number of lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChartMode {
    /// `dance-single`, 4 lanes.
    #[default]
    Single,
    /// `dance-double`, 8 lanes.
    Double,
}

impl ChartMode {
    /// Number of lanes of each row.
    #[must_use]
    pub const fn lanes(self) -> usize {
        match self {
            Self::Single => 4,
            Self::Double => 8,
        }
    }

    /// Name of this mode in the simfile.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Single => "dance-single",
            Self::Double => "dance-double",
        }
    }

    /// Looks up a mode by its simfile name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        [Self::Single, Self::Double]
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for ChartMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Difficulty slot of a notes block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Difficulty {
    /// `Beginner`.
    Beginner,
    /// `Easy`.
    Easy,
    /// `Medium`.
    Medium,
    /// `Hard`.
    Hard,
    /// `Insane`.
    Insane,
    /// `Challenge`.
    Challenge,
    /// `Edit`.
    Edit,
}

impl Difficulty {
    /// All difficulties from the easiest.
    pub const ALL: [Self; 7] = [
        Self::Beginner,
        Self::Easy,
        Self::Medium,
        Self::Hard,
        Self::Insane,
        Self::Challenge,
        Self::Edit,
    ];

    /// Name of this difficulty in the simfile.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
            Self::Insane => "Insane",
            Self::Challenge => "Challenge",
            Self::Edit => "Edit",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The name is not one of [`Difficulty::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown difficulty `{0}`, expected one of Beginner, Easy, Medium, Hard, Insane, Challenge or Edit")]
pub struct UnknownDifficultyError(pub String);

impl FromStr for Difficulty {
    type Err = UnknownDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|difficulty| difficulty.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownDifficultyError(s.to_owned()))
    }
}

/// Rows spanning one measure of [`MEASURE_TICKS`] ticks, equally spaced.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Measure {
    /// Rows from the top of the measure.
    pub rows: Vec<Row>,
}

impl Measure {
    /// Ticks between two adjacent rows. This need not be an integer for hand-written files.
    #[must_use]
    pub fn ticks_per_row(&self) -> f64 {
        MEASURE_TICKS as f64 / self.rows.len() as f64
    }
}

/// A chart for one mode and difficulty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesBlock {
    /// Play style, which fixes the row width.
    pub mode: ChartMode,
    /// Free-form description, usually the chart author.
    pub description: String,
    /// Difficulty slot.
    pub difficulty: Difficulty,
    /// Numeric level.
    pub meter: u32,
    /// Measures from the start of the song.
    pub measures: Vec<Measure>,
}

/// Header tags of a simfile. Every field is optional in the source text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SmHeader {
    /// `#TITLE`.
    pub title: Option<String>,
    /// `#MUSIC`, the audio file name.
    pub music: Option<String>,
    /// `#OFFSET` in seconds.
    pub offset: Option<f64>,
    /// `#BPMS`, tempo changes by beat.
    pub bpms: Option<Vec<TempoChange>>,
}

/// A whole simfile.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Simfile {
    /// Header tags.
    pub header: SmHeader,
    /// Notes blocks in file order.
    pub blocks: Vec<NotesBlock>,
}

impl Simfile {
    /// The first block whose difficulty is `difficulty`, regardless of the mode.
    #[must_use]
    pub fn block(&self, difficulty: Difficulty) -> Option<&NotesBlock> {
        self.blocks
            .iter()
            .find(|block| block.difficulty == difficulty)
    }

    /// Difficulties of all blocks in file order.
    #[must_use]
    pub fn difficulties(&self) -> Vec<Difficulty> {
        self.blocks.iter().map(|block| block.difficulty).collect()
    }
}

//! Cells and rows of the simfile note grid.

/// Kind of one cell in a row. The single-character form is only used when reading and
/// writing simfile text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellKind {
    /// `0`, nothing.
    #[default]
    Empty,
    /// `1`, a tap note.
    Tap,
    /// `2`, the head of a hold note.
    HoldHead,
    /// `3`, the tail of a hold or roll note.
    HoldTail,
    /// `4`, the head of a roll note. It is read as a hold head.
    RollHead,
    /// `M`, a mine which must not be hit.
    Mine,
}

impl CellKind {
    /// Decodes a cell from its character, or `None` if the character is unknown.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        Some(match c {
            '0' => Self::Empty,
            '1' => Self::Tap,
            '2' => Self::HoldHead,
            '3' => Self::HoldTail,
            '4' => Self::RollHead,
            'M' => Self::Mine,
            _ => return None,
        })
    }

    /// Encodes a cell into its character.
    #[must_use]
    pub const fn to_char(self) -> char {
        match self {
            Self::Empty => '0',
            Self::Tap => '1',
            Self::HoldHead => '2',
            Self::HoldTail => '3',
            Self::RollHead => '4',
            Self::Mine => 'M',
        }
    }

    /// Whether this cell holds nothing.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// A row of cells, one per lane.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Row {
    cells: Vec<CellKind>,
}

impl Row {
    /// Creates a row of `width` empty cells.
    #[must_use]
    pub fn empty(width: usize) -> Self {
        Self {
            cells: vec![CellKind::Empty; width],
        }
    }

    /// Number of lanes of this row.
    #[must_use]
    pub fn width(&self) -> usize {
        self.cells.len()
    }

    /// Cells of this row, left to right.
    #[must_use]
    pub fn cells(&self) -> &[CellKind] {
        &self.cells
    }

    /// Overwrites the cell at `lane`. Out of range lanes are ignored.
    pub fn set(&mut self, lane: usize, cell: CellKind) {
        if let Some(slot) = self.cells.get_mut(lane) {
            *slot = cell;
        }
    }

    /// Whether every cell is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_empty())
    }

    /// Number of non-empty cells in `lanes`.
    #[must_use]
    pub fn active_in(&self, lanes: std::ops::Range<usize>) -> usize {
        self.cells
            .get(lanes)
            .map_or(0, |cells| cells.iter().filter(|cell| !cell.is_empty()).count())
    }

    /// Exchanges the left and right halves of this row.
    pub fn swap_halves(&mut self) {
        let half = self.cells.len() / 2;
        self.cells.rotate_left(half);
    }

    /// Returns this row followed by a copy of itself, doubling the width.
    #[must_use]
    pub fn doubled(&self) -> Self {
        let mut cells = self.cells.clone();
        cells.extend_from_slice(&self.cells);
        Self { cells }
    }
}

impl FromIterator<CellKind> for Row {
    fn from_iter<I: IntoIterator<Item = CellKind>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

impl std::fmt::Display for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use std::fmt::Write;
        self.cells
            .iter()
            .try_for_each(|cell| f.write_char(cell.to_char()))
    }
}

//! Prelude module for this crate.
//!
//! Re-exports the types and functions needed for converting in both directions.

pub use crate::{
    convert::{
        ChartFault, ConvertError, ConvertWarning, ForwardConfig, ForwardOutput, ReverseConfig,
        ReverseOutput, fnf_to_sm, sm_to_fnf,
    },
    fnf::{FnfChart, FnfParseError, NoteEvent, Section, parse_fnf},
    sm::{
        CellKind, ChartMode, Difficulty, Measure, NotesBlock, Row, Simfile, SmHeader,
        parse::{SmParseError, SmParseOutput, parse_sm},
    },
    tempo::{Bpm, TempoChange, TempoError, TempoMap},
};

//! The Friday Night Funkin' chart format.
//!
//! A chart is a JSON document of the form `{"song": {...}}`. Its notes are grouped into
//! sections, and each note is an array `[time_ms, lane, hold_duration_ms]`:
//!
//! - Lanes `0..=3` belong to the side named by the section's `mustHitSection`, lanes `4..=7`
//!   to the other side.
//! - Lanes `8` and above mark mines, the lane being taken modulo 8.
//! - A positive duration makes the note a hold.
//!
//! Only the fields needed for conversion are typed. Unknown fields are ignored on decoding.

pub mod note;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use self::note::NoteEvent;

/// Errors on decoding a FNF chart.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FnfParseError {
    /// The JSON was invalid or did not match the chart structure. It carries the path of the
    /// offending value, such as `song.notes[3].sectionNotes[0]`.
    #[error("invalid chart json: {0}")]
    Json(#[from] serde_path_to_error::Error<serde_json::Error>),
    /// Something was found after the JSON document.
    #[error("trailing data after chart json: {0}")]
    TrailingData(#[source] serde_json::Error),
    /// A section could not be placed on the timeline.
    #[error("section {index} is invalid: {reason}")]
    InvalidSection {
        /// Index of the section in `song.notes`.
        index: usize,
        /// What was wrong with it.
        reason: &'static str,
    },
}

/// A whole FNF chart for one difficulty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FnfChart {
    /// Name of the song.
    #[serde(rename = "song")]
    pub song_name: String,
    /// Tempo at the start of the song.
    #[serde(rename = "bpm")]
    pub base_bpm: f64,
    /// Sections in order of time.
    #[serde(rename = "notes")]
    pub sections: Vec<Section>,
    /// Whether the song has a separate vocal track.
    #[serde(default)]
    pub needs_voices: bool,
    /// Character of the controlled player.
    #[serde(default = "default_player1")]
    pub player1: String,
    /// Character of the opponent.
    #[serde(default = "default_player2")]
    pub player2: String,
    /// Scroll speed.
    #[serde(default = "default_speed")]
    pub speed: f64,
    /// Legacy section counter, always written as 0.
    #[serde(rename = "sections", default)]
    pub section_count: u32,
    /// Legacy section lengths, always written empty.
    #[serde(default)]
    pub section_lengths: Vec<u32>,
}

/// Default controlled character, boyfriend.
#[must_use]
pub fn default_player1() -> String {
    "bf".into()
}

/// Default opponent character.
#[must_use]
pub fn default_player2() -> String {
    "pico".into()
}

/// Default scroll speed.
#[must_use]
pub const fn default_speed() -> f64 {
    2.0
}

impl FnfChart {
    /// Creates an empty chart with the default song-level fields.
    #[must_use]
    pub fn new(song_name: impl Into<String>, base_bpm: f64) -> Self {
        Self {
            song_name: song_name.into(),
            base_bpm,
            sections: Vec::new(),
            needs_voices: false,
            player1: default_player1(),
            player2: default_player2(),
            speed: default_speed(),
            section_count: 0,
            section_lengths: Vec::new(),
        }
    }

    /// Encodes this chart as the JSON document `{"song": {...}}`.
    ///
    /// # Errors
    ///
    /// When a float in the chart is not finite.
    pub fn to_json(&self) -> serde_json::Result<String> {
        #[derive(Serialize)]
        struct Document<'a> {
            song: &'a FnfChart,
        }
        serde_json::to_string(&Document { song: self })
    }
}

/// A run of notes sharing a tempo and a controlled side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Length of this section in steps (sixteenth notes).
    pub length_in_steps: u64,
    /// Tempo of this section, which is applied only when `changes_bpm` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpm: Option<f64>,
    /// Whether this section changes the tempo to `bpm`.
    #[serde(rename = "changeBPM", default, deserialize_with = "note::bool_or_number")]
    pub changes_bpm: bool,
    /// Whether lanes `0..=3` of this section belong to the controlled player.
    #[serde(rename = "mustHitSection", default)]
    pub must_hit: bool,
    /// Legacy section type, always written as 0.
    #[serde(default)]
    pub type_of_section: i64,
    /// Notes of this section.
    #[serde(rename = "sectionNotes", default)]
    pub notes: Vec<NoteEvent>,
}

impl Default for Section {
    fn default() -> Self {
        Self {
            length_in_steps: 16,
            bpm: None,
            changes_bpm: false,
            must_hit: false,
            type_of_section: 0,
            notes: Vec::new(),
        }
    }
}

impl Section {
    /// The tempo this section switches to, if any.
    #[must_use]
    pub fn declared_bpm(&self) -> Option<f64> {
        self.bpm.filter(|_| self.changes_bpm)
    }
}

/// Decodes a FNF chart from JSON text.
///
/// NUL padding around the document, which some chart editors leave behind, is ignored.
///
/// # Errors
///
/// - [`FnfParseError::Json`] when the text is not a chart.
/// - [`FnfParseError::InvalidSection`] when a section has no length.
///
/// # Example
///
/// ```
/// use fnf_sm_rs::fnf::parse_fnf;
///
/// let chart = parse_fnf(r#"{"song": {"song": "Test", "bpm": 100, "notes": []}}"#).unwrap();
/// assert_eq!(chart.song_name, "Test");
/// assert_eq!(chart.player1, "bf");
/// ```
pub fn parse_fnf(source: &str) -> Result<FnfChart, FnfParseError> {
    #[derive(Deserialize)]
    struct Document {
        song: FnfChart,
    }

    let mut deserializer = serde_json::Deserializer::from_str(source.trim_matches('\0'));
    let Document { song } = serde_path_to_error::deserialize(&mut deserializer)?;
    deserializer.end().map_err(FnfParseError::TrailingData)?;

    if let Some(index) = song
        .sections
        .iter()
        .position(|section| section.length_in_steps == 0)
    {
        return Err(FnfParseError::InvalidSection {
            index,
            reason: "lengthInSteps must be positive",
        });
    }
    Ok(song)
}

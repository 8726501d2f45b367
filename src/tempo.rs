//! Tempo map shared by both conversion directions.
//!
//! Positions on a simfile are counted in ticks: [`MEASURE_TICKS`] per 4/4 measure and
//! [`BEAT_TICKS`] per quarter note. A [`TempoMap`] is an ordered list of [`TempoMarker`]s.
//! Each marker anchors a linear relation between milliseconds and ticks, which holds until
//! the next marker. Queries select the *active* marker, the last one whose anchor does not
//! exceed the query, and extrapolate from it.
//!
//! # Rounding
//!
//! [`TempoMap::time_to_tick`] rounds to the nearest tick with ties away from zero
//! ([`f64::round`]). Measure compression works on exact integer offsets, so every
//! conversion must agree on this rule.
//!
//! # Lifetime
//!
//! A map is built once per conversion, from [`TempoMap::build_forward`] or
//! [`TempoMap::build_reverse`], and is read-only afterwards. Independent conversions build
//! independent maps.

pub mod bpm;

use thiserror::Error;

use crate::fnf::Section;

pub use self::bpm::{Bpm, InvalidBpmError};

/// Ticks in one 4/4 measure. This is the finest note precision of the StepMania editor, 1/192.
pub const MEASURE_TICKS: u64 = 192;
/// Ticks in one quarter note.
pub const BEAT_TICKS: u64 = 48;
/// Ticks in one FNF step, a sixteenth note.
pub const STEP_TICKS: u64 = 12;
/// Measures a chart may span.
pub const MAX_MEASURES: u64 = 65_536;
/// First tick after the last measure a chart may span.
pub const MAX_TICK: u64 = MAX_MEASURES * MEASURE_TICKS;

/// Milliseconds of one measure at 1 BPM.
pub const MEASURE_MS_AT_ONE_BPM: f64 = 240_000.0;
/// Milliseconds of one step at 1 BPM.
const STEP_MS_AT_ONE_BPM: f64 = 15_000.0;

/// Errors on building a [`TempoMap`].
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum TempoError {
    /// A tempo was zero, negative or not finite.
    #[error("invalid tempo: {0}")]
    InvalidTempo(#[from] InvalidBpmError),
    /// No tempo was declared, so no marker could be made.
    #[error("tempo map has no marker")]
    EmptyTempoMap,
    /// A section ends, or a note is placed, past [`MAX_MEASURES`] measures.
    #[error("section {section} reaches past measure {MAX_MEASURES}")]
    TooLong {
        /// Index of the section.
        section: usize,
    },
    /// A declared tempo change could not be ordered unambiguously.
    #[error("malformed tempo declaration `{entry}`: {reason}")]
    MalformedTempoHeader {
        /// The offending declaration, formatted as `beat=bpm`.
        entry: String,
        /// What was wrong with it.
        reason: &'static str,
    },
}

/// A tempo change declared in a simfile header as `beat=bpm`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoChange {
    /// Position of the change in quarter notes from the start.
    pub beat: f64,
    /// Tempo from this position.
    pub bpm: f64,
}

/// An anchor of the linear time/tick relation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoMarker {
    /// Tempo in force from this marker.
    pub bpm: Bpm,
    /// Position of this marker in ticks.
    pub tick: u64,
    /// Position of this marker in milliseconds.
    pub time: f64,
}

impl TempoMarker {
    fn ticks_per_ms(self) -> f64 {
        MEASURE_TICKS as f64 * self.bpm.as_f64() / MEASURE_MS_AT_ONE_BPM
    }

    /// Converts milliseconds into the nearest tick, extrapolating from this marker.
    #[must_use]
    pub fn time_to_tick(self, time_ms: f64) -> i64 {
        (self.tick as f64 + (time_ms - self.time) * self.ticks_per_ms()).round() as i64
    }

    /// Converts a (possibly fractional) tick into milliseconds, extrapolating from this marker.
    #[must_use]
    pub fn tick_to_time(self, tick: f64) -> f64 {
        self.time
            + (tick - self.tick as f64) * MEASURE_MS_AT_ONE_BPM
                / (MEASURE_TICKS as f64 * self.bpm.as_f64())
    }
}

/// Ordered collection of [`TempoMarker`]s. It always holds at least one marker, at tick 0.
#[derive(Debug, Clone, PartialEq)]
pub struct TempoMap {
    markers: Vec<TempoMarker>,
}

impl TempoMap {
    /// Creates a map from markers, checking that the first is at tick 0 and that ticks and
    /// times are strictly increasing.
    ///
    /// # Errors
    ///
    /// - [`TempoError::EmptyTempoMap`] when `markers` is empty.
    /// - [`TempoError::MalformedTempoHeader`] when the ordering is violated.
    pub fn from_markers(markers: Vec<TempoMarker>) -> Result<Self, TempoError> {
        let first = markers.first().ok_or(TempoError::EmptyTempoMap)?;
        if first.tick != 0 {
            return Err(malformed(first.tick, first.bpm.as_f64(), "first tempo must be at beat 0"));
        }
        if let Some(pair) = markers
            .windows(2)
            .find(|pair| pair[1].tick <= pair[0].tick || pair[1].time <= pair[0].time)
        {
            return Err(malformed(
                pair[1].tick,
                pair[1].bpm.as_f64(),
                "tempo markers must be strictly increasing",
            ));
        }
        Ok(Self { markers })
    }

    /// Builds the map of a FNF chart by walking its sections in order.
    ///
    /// The first marker carries `base_bpm`, or the first section's own tempo if it declares
    /// one. A new marker is appended at the start of every later section whose tempo differs
    /// from the current one. Each section lasts `15000 * length_in_steps / bpm` milliseconds.
    ///
    /// # Errors
    ///
    /// - [`TempoError::InvalidTempo`] when `base_bpm` or a section tempo is not positive.
    /// - [`TempoError::TooLong`] when the sections end past [`MAX_TICK`].
    pub fn build_forward(base_bpm: f64, sections: &[Section]) -> Result<Self, TempoError> {
        let mut current = Bpm::try_from(base_bpm)?;
        let mut markers = vec![TempoMarker {
            bpm: current,
            tick: 0,
            time: 0.0,
        }];
        let mut tick = 0;
        let mut time = 0.0;
        for (index, section) in sections.iter().enumerate() {
            let section_bpm = match section.declared_bpm() {
                Some(bpm) => Bpm::try_from(bpm)?,
                None => current,
            };
            if section_bpm != current {
                match markers.last_mut() {
                    Some(last) if last.tick == tick => last.bpm = section_bpm,
                    _ => markers.push(TempoMarker {
                        bpm: section_bpm,
                        tick,
                        time,
                    }),
                }
                current = section_bpm;
            }
            tick = STEP_TICKS
                .checked_mul(section.length_in_steps)
                .and_then(|length| tick.checked_add(length))
                .filter(|&end| end <= MAX_TICK)
                .ok_or(TempoError::TooLong { section: index })?;
            time += STEP_MS_AT_ONE_BPM * section.length_in_steps as f64 / current.as_f64();
        }
        for marker in &markers {
            log::debug!(
                "tempo marker {} BPM at tick {} ({:.3} ms)",
                marker.bpm,
                marker.tick,
                marker.time
            );
        }
        Self::from_markers(markers)
    }

    /// Builds the map of a simfile from its declared tempo changes.
    ///
    /// Beats are converted to ticks by `round(beat * 48)`. Changes are sorted by tick, then
    /// each marker's time is resolved through the markers already added. A change repeated
    /// at the same tick with the same tempo is dropped.
    ///
    /// # Errors
    ///
    /// - [`TempoError::EmptyTempoMap`] when `changes` is empty.
    /// - [`TempoError::InvalidTempo`] when a tempo is not positive.
    /// - [`TempoError::MalformedTempoHeader`] when a beat is negative or not finite, the first
    ///   change is not at beat 0, or two changes at the same tick disagree.
    pub fn build_reverse(changes: &[TempoChange]) -> Result<Self, TempoError> {
        let mut entries = changes
            .iter()
            .map(|change| {
                let bpm = Bpm::try_from(change.bpm)?;
                if !change.beat.is_finite() || change.beat < 0.0 {
                    return Err(TempoError::MalformedTempoHeader {
                        entry: format!("{}={}", change.beat, change.bpm),
                        reason: "beat must be a non-negative number",
                    });
                }
                Ok(((change.beat * BEAT_TICKS as f64).round() as u64, bpm))
            })
            .collect::<Result<Vec<_>, TempoError>>()?;
        entries.sort_by_key(|&(tick, _)| tick);

        let mut markers: Vec<TempoMarker> = Vec::with_capacity(entries.len());
        for (tick, bpm) in entries {
            match markers.last() {
                Some(last) if last.tick == tick && last.bpm == bpm => continue,
                Some(last) if last.tick == tick => {
                    return Err(malformed(
                        tick,
                        bpm.as_f64(),
                        "another tempo is declared at the same beat",
                    ));
                }
                _ => {}
            }
            let time = if markers.is_empty() {
                0.0
            } else {
                active_by_tick(&markers, tick as f64).tick_to_time(tick as f64)
            };
            log::debug!("tempo marker {bpm} BPM at tick {tick} ({time:.3} ms)");
            markers.push(TempoMarker { bpm, tick, time });
        }
        Self::from_markers(markers)
    }

    /// Markers of this map, ordered by tick.
    #[must_use]
    pub fn markers(&self) -> &[TempoMarker] {
        &self.markers
    }

    /// Tempo at tick 0.
    #[must_use]
    pub fn initial_bpm(&self) -> Bpm {
        self.markers[0].bpm
    }

    /// Converts milliseconds into the nearest tick. Times before 0 give negative ticks.
    #[must_use]
    pub fn time_to_tick(&self, time_ms: f64) -> i64 {
        let index = self
            .markers
            .partition_point(|marker| marker.time <= time_ms)
            .saturating_sub(1);
        self.markers[index].time_to_tick(time_ms)
    }

    /// Converts a (possibly fractional) tick into milliseconds.
    #[must_use]
    pub fn tick_to_time(&self, tick: f64) -> f64 {
        active_by_tick(&self.markers, tick).tick_to_time(tick)
    }

    /// Tempo in force at `tick`.
    #[must_use]
    pub fn bpm_at_tick(&self, tick: u64) -> Bpm {
        active_by_tick(&self.markers, tick as f64).bpm
    }

    /// The markers as simfile tempo changes, beats counted from the start.
    #[must_use]
    pub fn tempo_changes(&self) -> Vec<TempoChange> {
        self.markers
            .iter()
            .map(|marker| TempoChange {
                beat: marker.tick as f64 / BEAT_TICKS as f64,
                bpm: marker.bpm.as_f64(),
            })
            .collect()
    }
}

/// `markers` must not be empty.
fn active_by_tick(markers: &[TempoMarker], tick: f64) -> TempoMarker {
    let index = markers
        .partition_point(|marker| marker.tick as f64 <= tick)
        .saturating_sub(1);
    markers[index]
}

fn malformed(tick: u64, bpm: f64, reason: &'static str) -> TempoError {
    TempoError::MalformedTempoHeader {
        entry: format!("{}={bpm}", tick as f64 / BEAT_TICKS as f64),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(length_in_steps: u64, bpm: Option<f64>) -> Section {
        Section {
            length_in_steps,
            bpm,
            changes_bpm: bpm.is_some(),
            ..Section::default()
        }
    }

    fn change(beat: f64, bpm: f64) -> TempoChange {
        TempoChange { beat, bpm }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn hold_end_at_120_bpm() {
        let map = TempoMap::build_forward(120.0, &[section(16, None)]).unwrap();
        assert_eq!(map.time_to_tick(0.0), 0);
        assert_eq!(map.time_to_tick(500.0), 48);
        assert_eq!(map.time_to_tick(2000.0), 192);
    }

    #[test]
    fn forward_markers_follow_section_changes() {
        let sections = [
            section(16, None),
            section(16, Some(240.0)),
            section(16, Some(240.0)),
            section(8, Some(60.0)),
        ];
        let map = TempoMap::build_forward(120.0, &sections).unwrap();
        let markers = map.markers();
        assert_eq!(markers.len(), 3);
        assert_eq!((markers[0].tick, markers[0].time), (0, 0.0));
        assert_eq!((markers[1].tick, markers[1].time), (192, 2000.0));
        assert_eq!((markers[2].tick, markers[2].time), (576, 4000.0));
        assert_eq!(map.bpm_at_tick(575).as_f64(), 240.0);
        assert_eq!(map.bpm_at_tick(576).as_f64(), 60.0);
    }

    #[test]
    fn oversized_sections_are_rejected() {
        let sections = [section(16, None), section(2_000_000_000_000_000_000, None)];
        assert_eq!(
            TempoMap::build_forward(120.0, &sections),
            Err(TempoError::TooLong { section: 1 })
        );
        let sections = [section(u64::MAX, None)];
        assert_eq!(
            TempoMap::build_forward(120.0, &sections),
            Err(TempoError::TooLong { section: 0 })
        );
        let longest = [section(MAX_TICK / STEP_TICKS, None)];
        assert!(TempoMap::build_forward(120.0, &longest).is_ok());
    }

    #[test]
    fn first_section_tempo_replaces_base() {
        let map = TempoMap::build_forward(100.0, &[section(16, Some(150.0))]).unwrap();
        assert_eq!(map.markers().len(), 1);
        assert_eq!(map.initial_bpm().as_f64(), 150.0);
    }

    #[test]
    fn markers_strictly_increase() {
        let sections = [
            section(16, Some(90.0)),
            section(4, Some(180.0)),
            section(12, Some(95.5)),
            section(16, None),
            section(16, Some(200.0)),
        ];
        let map = TempoMap::build_forward(90.0, &sections).unwrap();
        for pair in map.markers().windows(2) {
            assert!(pair[1].tick > pair[0].tick);
            assert!(pair[1].time > pair[0].time);
        }
    }

    #[test]
    fn rejects_non_positive_tempo() {
        assert!(matches!(
            TempoMap::build_forward(0.0, &[]),
            Err(TempoError::InvalidTempo(_))
        ));
        assert!(matches!(
            TempoMap::build_forward(120.0, &[section(16, Some(-1.0))]),
            Err(TempoError::InvalidTempo(_))
        ));
        assert!(matches!(
            TempoMap::build_reverse(&[change(0.0, 0.0)]),
            Err(TempoError::InvalidTempo(_))
        ));
    }

    #[test]
    fn reverse_resolves_times_through_earlier_markers() {
        let map =
            TempoMap::build_reverse(&[change(8.0, 60.0), change(0.0, 120.0), change(4.0, 240.0)])
                .unwrap();
        let markers = map.markers();
        assert_eq!(markers.len(), 3);
        assert_eq!(markers[1].tick, 192);
        assert_close(markers[1].time, 2000.0);
        assert_eq!(markers[2].tick, 384);
        assert_close(markers[2].time, 3000.0);
        assert_close(map.tick_to_time(432.0), 4000.0);
        assert_eq!(map.time_to_tick(4000.0), 432);
    }

    #[test]
    fn reverse_fractional_ticks() {
        let map = TempoMap::build_reverse(&[change(0.0, 120.0)]).unwrap();
        assert_close(map.tick_to_time(64.0), 2000.0 / 3.0);
    }

    #[test]
    fn reverse_rejects_ambiguous_or_empty_header() {
        assert_eq!(TempoMap::build_reverse(&[]), Err(TempoError::EmptyTempoMap));
        assert!(matches!(
            TempoMap::build_reverse(&[change(0.0, 120.0), change(0.0, 140.0)]),
            Err(TempoError::MalformedTempoHeader { .. })
        ));
        assert!(matches!(
            TempoMap::build_reverse(&[change(1.0, 120.0)]),
            Err(TempoError::MalformedTempoHeader { .. })
        ));
        assert!(matches!(
            TempoMap::build_reverse(&[change(-1.0, 120.0)]),
            Err(TempoError::MalformedTempoHeader { .. })
        ));
    }

    #[test]
    fn reverse_drops_repeated_declaration() {
        let map = TempoMap::build_reverse(&[change(0.0, 120.0), change(0.0, 120.0)]).unwrap();
        assert_eq!(map.markers().len(), 1);
    }

    #[test]
    fn ties_round_away_from_zero() {
        // 10 ms per tick at 125 BPM
        let map = TempoMap::build_reverse(&[change(0.0, 125.0)]).unwrap();
        assert_eq!(map.time_to_tick(5.0), 1);
        assert_eq!(map.time_to_tick(15.0), 2);
        assert_eq!(map.time_to_tick(-5.0), -1);
    }

    #[test]
    fn tempo_changes_in_beats() {
        let map =
            TempoMap::build_reverse(&[change(0.0, 120.0), change(6.5, 180.0)]).unwrap();
        assert_eq!(
            map.tempo_changes(),
            vec![change(0.0, 120.0), change(6.5, 180.0)]
        );
    }
}

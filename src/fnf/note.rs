//! Note definition for FNF charts.

use std::fmt;

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, IgnoredAny, SeqAccess, Visitor},
    ser::SerializeTuple,
};

/// Raw lanes at or above this value are mines.
pub const MINE_LANE_OFFSET: i64 = 8;

/// A note placed at an absolute time. It is encoded as `[time_ms, lane, hold_duration_ms]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    /// Time of the note in milliseconds from the start of the song.
    pub time_ms: f64,
    /// Raw lane number, including the mine offset.
    pub lane: i64,
    /// Length of the hold in milliseconds, or 0 for a tap.
    pub hold_duration_ms: f64,
}

impl NoteEvent {
    /// Creates a new note.
    #[must_use]
    pub const fn new(time_ms: f64, lane: i64, hold_duration_ms: f64) -> Self {
        Self {
            time_ms,
            lane,
            hold_duration_ms,
        }
    }

    /// Whether this note is a mine, having a raw lane of 8 or more.
    #[must_use]
    pub const fn is_mine(&self) -> bool {
        self.lane >= MINE_LANE_OFFSET
    }

    /// The lane with the mine offset removed, in `0..8`.
    #[must_use]
    pub const fn base_lane(&self) -> u8 {
        self.lane.rem_euclid(MINE_LANE_OFFSET) as u8
    }

    /// Whether this note is a hold, having a positive duration.
    #[must_use]
    pub fn is_hold(&self) -> bool {
        self.hold_duration_ms > 0.0
    }
}

impl Serialize for NoteEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(3)?;
        tuple.serialize_element(&self.time_ms)?;
        tuple.serialize_element(&self.lane)?;
        tuple.serialize_element(&self.hold_duration_ms)?;
        tuple.end()
    }
}

impl<'de> Deserialize<'de> for NoteEvent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NoteVisitor;

        impl<'de> Visitor<'de> for NoteVisitor {
            type Value = NoteEvent;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a note array `[time, lane, length]`")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<NoteEvent, A::Error> {
                let time_ms: f64 = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                // some editors write lanes as floats
                let lane: f64 = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(1, &self))?;
                let hold_duration_ms: f64 = seq.next_element()?.unwrap_or(0.0);
                // newer engines append note types and such
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                Ok(NoteEvent::new(time_ms, lane as i64, hold_duration_ms))
            }
        }

        deserializer.deserialize_seq(NoteVisitor)
    }
}

/// Deserializes a flag written either as a boolean or as a number, 0 being `false`.
pub(crate) fn bool_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    struct FlagVisitor;

    impl Visitor<'_> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a boolean or a number")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
            Ok(v != 0)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
            Ok(v != 0)
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<bool, E> {
            Ok(v != 0.0)
        }

        fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
            Ok(false)
        }
    }

    deserializer.deserialize_any(FlagVisitor)
}

//! Parser of simfiles from lexed tags.
//!
//! The header tags are read into a typed [`SmHeader`](super::SmHeader) record. Tags which do not
//! matter for conversion are skipped. Tags which only exist in the SSC format make the whole file
//! unsupported, since its notes would be split over tags this parser does not read.

use thiserror::Error;

use super::{
    CellKind, ChartMode, Difficulty, Measure, NotesBlock, Row, Simfile,
    lex::{LexWarningWithRange, SmLexOutput, Tag, lex},
};
use crate::{
    mixin::{SourceRangeMixin, SourceRangeMixinExt},
    tempo::{TempoChange, TempoError},
};

/// Tags which mark a simfile as the SSC format.
const SSC_TAGS: [&str; 2] = ["NOTEDATA", "VERSION"];

/// Errors on parsing a simfile.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SmParseError {
    /// The file uses the SSC variant of the format.
    #[error("tag `#{tag}` belongs to the SSC format, which is not supported")]
    UnsupportedChartVariant {
        /// The SSC-only tag found.
        tag: String,
    },
    /// The notes do not fit the shape their block declares.
    #[error("structural mismatch: {reason}")]
    StructuralMismatch {
        /// Which expectation was violated.
        reason: String,
    },
    /// The `#BPMS` tag could not be read.
    #[error(transparent)]
    Tempo(#[from] TempoError),
}

/// [`SmParseError`] with its position in the source.
pub type SmParseErrorWithRange = SourceRangeMixin<SmParseError>;

/// A problem found on parsing, which does not stop it.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum SmParseWarning {
    /// A row contained a character which is not a known cell. It was read as empty.
    #[error("unknown cell `{0}`, read as empty")]
    UnknownCell(char),
    /// A line in a notes block was neither a row nor a measure separator.
    #[error("line `{0}` is not a row, ignored")]
    IgnoredLine(String),
    /// A numeric field could not be read.
    #[error("invalid {field} `{value}`, ignored")]
    InvalidNumber {
        /// Which field.
        field: &'static str,
        /// The text found.
        value: String,
    },
    /// A notes block is for a game mode other than dance single or double. It was skipped.
    #[error("unsupported mode `{0}`, block skipped")]
    UnsupportedMode(String),
    /// A notes block has a difficulty name which is not known. It was read as `Edit`.
    #[error("unknown difficulty `{0}`, read as Edit")]
    UnknownDifficulty(String),
}

/// [`SmParseWarning`] with its position in the source.
pub type SmParseWarningWithRange = SourceRangeMixin<SmParseWarning>;

/// Parsing results, includes the simfile and warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct SmParseOutput {
    /// The parsed simfile.
    pub simfile: Simfile,
    /// Warnings from the lexer.
    pub lex_warnings: Vec<LexWarningWithRange>,
    /// Warnings from the parser.
    pub parse_warnings: Vec<SmParseWarningWithRange>,
}

impl SmParseOutput {
    /// Whether there is no warning at all.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.lex_warnings.is_empty() && self.parse_warnings.is_empty()
    }
}

/// Parses simfile text.
///
/// # Errors
///
/// - [`SmParseError::UnsupportedChartVariant`] on a `#NOTEDATA` or `#VERSION` tag.
/// - [`SmParseError::StructuralMismatch`] when a row does not match the width of its mode, a
///   measure has no rows, or a `#NOTES` tag is not closed or has less than six fields.
/// - [`SmParseError::Tempo`] when a `#BPMS` entry is not `beat=bpm`.
pub fn parse_sm(source: &str) -> Result<SmParseOutput, SmParseErrorWithRange> {
    let SmLexOutput { tags, lex_warnings } = lex(source);
    let mut simfile = Simfile::default();
    let mut parse_warnings = vec![];

    for tag in &tags {
        let name = tag.name.content().to_ascii_uppercase();
        match name.as_str() {
            "TITLE" => simfile.header.title = Some(tag.flat_text()),
            "MUSIC" => simfile.header.music = Some(tag.flat_text()),
            "OFFSET" => {
                let text = tag.flat_text();
                match text.parse::<f64>() {
                    Ok(offset) if offset.is_finite() => simfile.header.offset = Some(offset),
                    _ => warn(
                        &mut parse_warnings,
                        SmParseWarning::InvalidNumber {
                            field: "offset",
                            value: text,
                        }
                        .into_wrapper_range(tag.value.range()),
                    ),
                }
            }
            "BPMS" => simfile.header.bpms = Some(parse_bpms(tag)?),
            "NOTES" => {
                if let Some(block) = BlockReader::read(tag, &mut parse_warnings)? {
                    simfile.blocks.push(block);
                }
            }
            _ if SSC_TAGS.contains(&name.as_str()) => {
                return Err(SmParseError::UnsupportedChartVariant { tag: name }
                    .into_wrapper_range(tag.name.range()));
            }
            _ => log::debug!("skipping tag #{name}"),
        }
    }

    Ok(SmParseOutput {
        simfile,
        lex_warnings,
        parse_warnings,
    })
}

fn warn(warnings: &mut Vec<SmParseWarningWithRange>, warning: SmParseWarningWithRange) {
    log::warn!("{warning}");
    warnings.push(warning);
}

/// Reads comma separated `beat=bpm` pairs. Empty entries are skipped.
fn parse_bpms(tag: &Tag<'_>) -> Result<Vec<TempoChange>, SmParseErrorWithRange> {
    tag.flat_text()
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let malformed = |reason| {
                SmParseError::from(TempoError::MalformedTempoHeader {
                    entry: entry.to_owned(),
                    reason,
                })
                .into_wrapper_range(tag.value.range())
            };
            let (beat, bpm) = entry
                .split_once('=')
                .ok_or_else(|| malformed("expected `beat=bpm`"))?;
            let beat = beat
                .trim()
                .parse()
                .map_err(|_| malformed("beat is not a number"))?;
            let bpm = bpm
                .trim()
                .parse()
                .map_err(|_| malformed("bpm is not a number"))?;
            Ok(TempoChange { beat, bpm })
        })
        .collect()
}

/// Reads a `#NOTES` tag: five header fields separated by `:`, then the measures.
struct BlockReader<'w> {
    mode: ChartMode,
    measures: Vec<Measure>,
    rows: Vec<Row>,
    warnings: &'w mut Vec<SmParseWarningWithRange>,
}

impl<'w> BlockReader<'w> {
    fn read(
        tag: &Tag<'_>,
        warnings: &'w mut Vec<SmParseWarningWithRange>,
    ) -> Result<Option<NotesBlock>, SmParseErrorWithRange> {
        let whole = tag.name.range().start..tag.value.range().end;
        if !tag.terminated {
            return Err(SmParseError::StructuralMismatch {
                reason: "notes block is not closed by `;`".into(),
            }
            .into_wrapper_range(whole));
        }

        let mut fields: Vec<String> = Vec::with_capacity(5);
        let mut field = String::new();
        let mut data = vec![];
        for line in tag.lines() {
            if fields.len() == 5 {
                data.push(line);
                continue;
            }
            let mut rest = *line.content();
            let mut offset = line.range().start;
            while fields.len() < 5 {
                let Some(colon) = rest.find(':') else {
                    field.push_str(rest.trim());
                    rest = "";
                    break;
                };
                field.push_str(rest[..colon].trim());
                fields.push(std::mem::take(&mut field));
                offset += colon + 1;
                rest = &rest[colon + 1..];
            }
            if fields.len() == 5 {
                data.push(rest.into_wrapper_range(offset..offset + rest.len()));
            }
        }
        let [mode, description, difficulty, meter, _radar]: [String; 5] =
            fields.try_into().map_err(|_| {
                SmParseError::StructuralMismatch {
                    reason: "notes block has less than six fields".into(),
                }
                .into_wrapper_range(whole.clone())
            })?;

        let Some(mode) = ChartMode::from_name(&mode) else {
            warn(
                warnings,
                SmParseWarning::UnsupportedMode(mode).into_wrapper_range(whole),
            );
            return Ok(None);
        };
        let difficulty = difficulty.parse().unwrap_or_else(|_| {
            warn(
                warnings,
                SmParseWarning::UnknownDifficulty(difficulty).into_wrapper_range(whole.clone()),
            );
            Difficulty::Edit
        });
        let meter = meter.parse().unwrap_or_else(|_| {
            warn(
                warnings,
                SmParseWarning::InvalidNumber {
                    field: "meter",
                    value: meter,
                }
                .into_wrapper_range(whole.clone()),
            );
            1
        });

        let mut reader = BlockReader {
            mode,
            measures: vec![],
            rows: vec![],
            warnings,
        };
        let mut separated = false;
        for line in data {
            let mut offset = line.range().start;
            for (i, part) in line.content().split(',').enumerate() {
                if i > 0 {
                    reader.close_measure(offset - 1..offset)?;
                    separated = true;
                }
                reader.read_row(part, offset)?;
                offset += part.len() + 1;
            }
        }
        if separated || !reader.rows.is_empty() {
            let end = tag.value.range().end;
            reader.close_measure(end..end + 1)?;
        }

        Ok(Some(NotesBlock {
            mode,
            description,
            difficulty,
            meter,
            measures: reader.measures,
        }))
    }

    fn close_measure(&mut self, at: std::ops::Range<usize>) -> Result<(), SmParseErrorWithRange> {
        if self.rows.is_empty() {
            return Err(SmParseError::StructuralMismatch {
                reason: format!("measure {} has no rows", self.measures.len() + 1),
            }
            .into_wrapper_range(at));
        }
        self.measures.push(Measure {
            rows: std::mem::take(&mut self.rows),
        });
        Ok(())
    }

    fn read_row(&mut self, text: &str, offset: usize) -> Result<(), SmParseErrorWithRange> {
        let row = text.trim();
        if row.is_empty() {
            return Ok(());
        }
        let start = offset + (text.len() - text.trim_start().len());
        let range = start..start + row.len();
        if !row.chars().all(|c| c.is_ascii_alphanumeric()) {
            warn(
                self.warnings,
                SmParseWarning::IgnoredLine(row.to_owned()).into_wrapper_range(range),
            );
            return Ok(());
        }
        if row.len() != self.mode.lanes() {
            return Err(SmParseError::StructuralMismatch {
                reason: format!(
                    "row `{row}` has {} lanes but {} has {}",
                    row.len(),
                    self.mode,
                    self.mode.lanes()
                ),
            }
            .into_wrapper_range(range));
        }
        let row = row
            .char_indices()
            .map(|(i, c)| {
                CellKind::from_char(c).unwrap_or_else(|| {
                    warn(
                        self.warnings,
                        SmParseWarning::UnknownCell(c).into_wrapper_range(start + i..start + i + 1),
                    );
                    CellKind::Empty
                })
            })
            .collect();
        self.rows.push(row);
        Ok(())
    }
}

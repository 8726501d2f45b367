//! Rendering of simfiles into text.

use std::fmt::{self, Display, Formatter};

use itertools::Itertools;

use super::{NotesBlock, Simfile, SmHeader};

/// Indent of the header fields of a notes block, as the StepMania editor writes it.
const FIELD_INDENT: &str = "     ";

impl Display for SmHeader {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(title) = &self.title {
            writeln!(f, "#TITLE:{title};")?;
        }
        if let Some(music) = &self.music {
            writeln!(f, "#MUSIC:{music};")?;
        }
        if let Some(offset) = self.offset {
            writeln!(f, "#OFFSET:{offset};")?;
        }
        if let Some(bpms) = &self.bpms {
            writeln!(
                f,
                "#BPMS:{};",
                bpms.iter()
                    .format_with(",", |change, f| f(&format_args!(
                        "{:.3}={}",
                        change.beat, change.bpm
                    )))
            )?;
        }
        Ok(())
    }
}

impl Display for NotesBlock {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "#NOTES:")?;
        writeln!(f, "{FIELD_INDENT}{}:", self.mode)?;
        writeln!(f, "{FIELD_INDENT}{}:", self.description)?;
        writeln!(f, "{FIELD_INDENT}{}:", self.difficulty)?;
        writeln!(f, "{FIELD_INDENT}{}:", self.meter)?;
        // groove radar, left for the editor to compute
        writeln!(f, "{FIELD_INDENT}:")?;
        for (i, measure) in self.measures.iter().enumerate() {
            if i > 0 {
                writeln!(f, ",")?;
            }
            for row in &measure.rows {
                writeln!(f, "{row}")?;
            }
        }
        writeln!(f, ";")
    }
}

impl Display for Simfile {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.header)?;
        for block in &self.blocks {
            writeln!(f)?;
            write!(f, "{block}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{
        sm::{CellKind, ChartMode, Difficulty, Measure, Row, parse::parse_sm},
        tempo::TempoChange,
    };

    use super::*;

    fn sample() -> Simfile {
        let row = |s: &str| -> Row { s.chars().filter_map(CellKind::from_char).collect() };
        Simfile {
            header: SmHeader {
                title: Some("Fresh".into()),
                music: Some("Fresh.ogg".into()),
                offset: None,
                bpms: Some(vec![
                    TempoChange {
                        beat: 0.0,
                        bpm: 120.0,
                    },
                    TempoChange {
                        beat: 5.25,
                        bpm: 187.5,
                    },
                ]),
            },
            blocks: vec![NotesBlock {
                mode: ChartMode::Single,
                description: String::new(),
                difficulty: Difficulty::Hard,
                meter: 1,
                measures: vec![
                    Measure {
                        rows: vec![row("1000"), row("0002")],
                    },
                    Measure {
                        rows: vec![row("0003")],
                    },
                ],
            }],
        }
    }

    #[test]
    fn renders_header_and_blocks() {
        assert_eq!(
            sample().to_string(),
            "\
#TITLE:Fresh;
#MUSIC:Fresh.ogg;
#BPMS:0.000=120,5.250=187.5;

#NOTES:
     dance-single:
     :
     Hard:
     1:
     :
1000
0002
,
0003
;
"
        );
    }

    #[test]
    fn rendered_text_parses_back() {
        let simfile = sample();
        let output = parse_sm(&simfile.to_string()).unwrap();
        assert!(output.is_clean());
        assert_eq!(output.simfile, simfile);
    }
}

//! Converter between Friday Night Funkin' charts and StepMania simfiles.
//!
//! FNF charts (`.json`) place notes at wall-clock milliseconds and group them into sections
//! with their own tempo. StepMania simfiles (`.sm`) place notes on a quantized grid of rows
//! organized into measures. Converting between them needs a piecewise tempo map and a
//! measure-quantization step, which is what this crate provides.
//!
//! - [`tempo`] provides [`tempo::TempoMap`], the time/tick conversion shared by both directions.
//! - [`fnf`] provides the JSON chart model and its decoder.
//! - [`sm`] provides the simfile model, its lexer, parser and renderer.
//! - [`convert`] provides the conversions themselves: [`convert::fnf_to_sm`] and [`convert::sm_to_fnf`].
//! - [`diagnostics`] renders simfile problems with `ariadne` (feature `diagnostics`).
//!
//! # Example
//!
//! ```
//! use fnf_sm_rs::prelude::*;
//!
//! let source = r#"{"song": {"song": "Tutorial", "bpm": 120, "notes": [
//!     {"lengthInSteps": 16, "mustHitSection": false, "sectionNotes": [[0, 0, 0], [500, 1, 0]]}
//! ]}}"#;
//! let chart = parse_fnf(source).expect("chart must be decoded");
//! let ForwardOutput { simfile, warnings } =
//!     fnf_to_sm(&[(Difficulty::Medium, chart)], &ForwardConfig::default())
//!         .expect("chart must be converted");
//! assert!(warnings.is_empty());
//! assert_eq!(simfile.blocks[0].measures[0].rows.len(), 4);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod convert;
pub mod diagnostics;
pub mod fnf;
pub mod mixin;
pub mod prelude;
pub mod sm;
pub mod tempo;

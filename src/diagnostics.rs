//! Fancy diagnostics support using `ariadne`.
//!
//! Lex and parse problems of simfiles carry byte spans through
//! [`SourceRangeMixin`](crate::mixin::SourceRangeMixin), so they can be rendered against the
//! source text with `ariadne`, which computes lines and columns from the spans.
//!
//! # Usage Example
//!
//! ```rust
//! # #[cfg(feature = "diagnostics")]
//! # {
//! use fnf_sm_rs::{diagnostics::emit_sm_warnings, sm::parse::parse_sm};
//!
//! let source = "#TITLE:Test;\n#NOTES:dance-single::Hard:1::\n1F00\n;\n";
//! let output = parse_sm(source).unwrap();
//!
//! // Prints the unknown cell `F` with its position to stderr
//! emit_sm_warnings("test.sm", source, &output);
//! # }
//! ```

#[cfg(feature = "diagnostics")]
use ariadne::{Color, Label, Report, ReportKind, Source};

#[cfg(feature = "diagnostics")]
use crate::sm::{
    lex::LexWarningWithRange,
    parse::{SmParseErrorWithRange, SmParseOutput, SmParseWarningWithRange},
};

/// Simple source container that holds the filename and source text.
///
/// ```rust
/// use fnf_sm_rs::diagnostics::SimpleSource;
///
/// let source = SimpleSource::new("song.sm", "#TITLE:Song;\n");
/// assert_eq!(source.name(), "song.sm");
/// ```
#[cfg(feature = "diagnostics")]
pub struct SimpleSource<'a> {
    name: &'a str,
    text: &'a str,
}

#[cfg(feature = "diagnostics")]
impl<'a> SimpleSource<'a> {
    /// Creates a new source container.
    #[must_use]
    pub const fn new(name: &'a str, text: &'a str) -> Self {
        Self { name, text }
    }

    /// Source file name.
    #[must_use]
    pub const fn name(&self) -> &'a str {
        self.name
    }

    /// Report cache entry of this source, for printing reports made against it.
    fn cache(&self) -> (String, Source<&'a str>) {
        (self.name.to_string(), Source::from(self.text))
    }
}

/// Trait for converting positioned problems to `ariadne::Report`.
#[cfg(feature = "diagnostics")]
pub trait ToAriadne {
    /// Converts into a report against `src`.
    fn to_report<'a>(&self, src: &SimpleSource<'a>)
    -> Report<'a, (String, std::ops::Range<usize>)>;
}

/// Helper to build a styled ariadne `Report` consistently.
#[cfg(feature = "diagnostics")]
#[must_use]
pub fn build_report<'a>(
    src: &SimpleSource<'a>,
    kind: ReportKind<'a>,
    range: std::ops::Range<usize>,
    title: &str,
    label_message: impl ToString,
    color: Color,
) -> Report<'a, (String, std::ops::Range<usize>)> {
    let filename = src.name().to_string();
    Report::build(kind, (filename.clone(), range.clone()))
        .with_message(title)
        .with_label(
            Label::new((filename, range))
                .with_message(label_message.to_string())
                .with_color(color),
        )
        .finish()
}

#[cfg(feature = "diagnostics")]
impl ToAriadne for LexWarningWithRange {
    fn to_report<'a>(
        &self,
        src: &SimpleSource<'a>,
    ) -> Report<'a, (String, std::ops::Range<usize>)> {
        build_report(
            src,
            ReportKind::Warning,
            self.range(),
            "lex",
            self.content(),
            Color::Yellow,
        )
    }
}

#[cfg(feature = "diagnostics")]
impl ToAriadne for SmParseWarningWithRange {
    fn to_report<'a>(
        &self,
        src: &SimpleSource<'a>,
    ) -> Report<'a, (String, std::ops::Range<usize>)> {
        build_report(
            src,
            ReportKind::Warning,
            self.range(),
            "parse",
            self.content(),
            Color::Blue,
        )
    }
}

#[cfg(feature = "diagnostics")]
impl ToAriadne for SmParseErrorWithRange {
    fn to_report<'a>(
        &self,
        src: &SimpleSource<'a>,
    ) -> Report<'a, (String, std::ops::Range<usize>)> {
        build_report(
            src,
            ReportKind::Error,
            self.range(),
            "simfile cannot be read",
            self.content(),
            Color::Red,
        )
    }
}

/// Collects reports for every warning of a parse output, lexer warnings first, without
/// printing.
#[cfg(feature = "diagnostics")]
#[must_use]
pub fn collect_sm_reports<'a>(
    name: &'a str,
    source: &'a str,
    output: &SmParseOutput,
) -> Vec<Report<'a, (String, std::ops::Range<usize>)>> {
    let simple = SimpleSource::new(name, source);
    output
        .lex_warnings
        .iter()
        .map(|w| w.to_report(&simple))
        .chain(output.parse_warnings.iter().map(|w| w.to_report(&simple)))
        .collect()
}

/// Prints every warning of a parse output to stderr.
#[cfg(feature = "diagnostics")]
pub fn emit_sm_warnings(name: &str, source: &str, output: &SmParseOutput) {
    let (name, ariadne_source) = SimpleSource::new(name, source).cache();
    for report in collect_sm_reports(&name, source, output) {
        let _ = report.eprint((name.clone(), ariadne_source.clone()));
    }
}

/// Prints a parse error to stderr.
#[cfg(feature = "diagnostics")]
pub fn emit_sm_error(name: &str, source: &str, error: &SmParseErrorWithRange) {
    let simple = SimpleSource::new(name, source);
    let _ = error.to_report(&simple).eprint(simple.cache());
}

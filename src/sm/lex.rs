//! Lexical analyzer of simfiles.
//!
//! A simfile is a sequence of tags `#NAME:value;`. Text from `//` to the end of the line is a
//! comment and is skipped, also inside values. A value whose `;` is missing ends before the next
//! line starting with `#`, and its tag is marked as not terminated.

use std::ops::Range;

use thiserror::Error;

use crate::mixin::{SourceRangeMixin, SourceRangeMixinExt};

/// A problem found on lexing, which does not stop it.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum LexWarning {
    /// Text was found outside of any tag. The rest of its line is skipped.
    #[error("text outside of any tag")]
    StrayText,
}

/// [`LexWarning`] with its position in the source.
pub type LexWarningWithRange = SourceRangeMixin<LexWarning>;

/// A `#NAME:value;` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag<'a> {
    /// Name of the tag without `#`, trimmed.
    pub name: SourceRangeMixin<&'a str>,
    /// Raw value between `:` and `;`, comments included.
    pub value: SourceRangeMixin<&'a str>,
    /// Whether the value was closed by `;`.
    pub terminated: bool,
}

impl<'a> Tag<'a> {
    /// Lines of the value with comments removed, each with its own span.
    pub fn lines(&self) -> impl Iterator<Item = SourceRangeMixin<&'a str>> + use<'a> {
        let value = *self.value.content();
        let mut start = self.value.range().start;
        value.split('\n').map(move |line| {
            let content = strip_comment(line).trim_end_matches('\r');
            let item = content.into_wrapper_range(start..start + content.len());
            start += line.len() + 1;
            item
        })
    }

    /// The value with comments removed and every line trimmed, concatenated.
    #[must_use]
    pub fn flat_text(&self) -> String {
        self.lines().map(|line| line.content().trim()).collect()
    }
}

/// Removes a `//` comment from a line.
fn strip_comment(line: &str) -> &str {
    line.find("//").map_or(line, |i| &line[..i])
}

/// Lexing results, includes tags and warnings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmLexOutput<'a> {
    /// Tags in source order.
    pub tags: Vec<Tag<'a>>,
    /// Warnings.
    pub lex_warnings: Vec<LexWarningWithRange>,
}

/// Splits simfile text into tags.
#[must_use]
pub fn lex(source: &str) -> SmLexOutput<'_> {
    let mut scanner = Scanner::new(source);
    let mut tags = vec![];
    let mut lex_warnings = vec![];
    while !scanner.skip_blank() {
        if scanner.rest().starts_with('#') {
            tags.push(scanner.tag());
        } else {
            let range = scanner.skip_line();
            log::debug!("stray text at {range:?}");
            lex_warnings.push(LexWarning::StrayText.into_wrapper_range(range));
        }
    }
    SmLexOutput { tags, lex_warnings }
}

struct Scanner<'a> {
    source: &'a str,
    index: usize,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            index: source.strip_prefix('\u{feff}').map_or(0, |_| '\u{feff}'.len_utf8()),
        }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.index..]
    }

    /// Skips whitespace and comments, and returns whether the end was reached.
    fn skip_blank(&mut self) -> bool {
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start();
            self.index += rest.len() - trimmed.len();
            if !trimmed.starts_with("//") {
                return trimmed.is_empty();
            }
            self.skip_line();
        }
    }

    /// Skips to the end of the line, and returns the skipped range.
    fn skip_line(&mut self) -> Range<usize> {
        let start = self.index;
        self.index = self
            .rest()
            .find('\n')
            .map_or(self.source.len(), |i| start + i);
        start..self.index
    }

    /// Reads a tag. The cursor must be on `#`.
    fn tag(&mut self) -> Tag<'a> {
        let name_start = self.index + 1;
        let name_len = self.source[name_start..]
            .find([':', ';', '\n'])
            .unwrap_or(self.source.len() - name_start);
        let name_end = name_start + name_len;
        let name = self.source[name_start..name_end]
            .trim()
            .into_wrapper_range(name_start..name_end);
        self.index = name_end;

        if !self.rest().starts_with(':') {
            let terminated = self.rest().starts_with(';');
            if terminated {
                self.index += 1;
            }
            return Tag {
                name,
                value: "".into_wrapper_range(name_end..name_end),
                terminated,
            };
        }

        self.index += 1;
        let value_start = self.index;
        let (value_end, terminated) = self.value_end();
        Tag {
            name,
            value: self.source[value_start..value_end].into_wrapper_range(value_start..value_end),
            terminated,
        }
    }

    /// Finds the end of a value and moves past it.
    fn value_end(&mut self) -> (usize, bool) {
        let bytes = self.source.as_bytes();
        let mut i = self.index;
        while i < bytes.len() {
            match bytes[i] {
                b';' => {
                    self.index = i + 1;
                    return (i, true);
                }
                b'/' if bytes.get(i + 1) == Some(&b'/') => {
                    i = self.source[i..].find('\n').map_or(bytes.len(), |j| i + j);
                }
                b'\n' if self.source[i + 1..].trim_start().starts_with('#') => {
                    self.index = i + 1;
                    return (i, false);
                }
                _ => i += 1,
            }
        }
        self.index = bytes.len();
        (bytes.len(), false)
    }
}

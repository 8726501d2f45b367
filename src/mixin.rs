//! Mixin types for attaching source positions to values.
//!
//! - [`SourceRangeMixin`] wraps a value together with the byte span it came from.
//! - [`SourceRangeMixinExt`] adds convenient constructors to any value.

use std::ops::Range;

/// A generic wrapper that attaches position information (byte span) to a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceRangeMixin<T> {
    content: T,
    /// Start index in the source string (0-based, inclusive)
    start: usize,
    /// End index in the source string (0-based, exclusive)
    end: usize,
}

impl<T> SourceRangeMixin<T> {
    /// Instances a new `SourceRangeMixin`.
    pub const fn new(content: T, start: usize, end: usize) -> Self {
        Self {
            content,
            start,
            end,
        }
    }

    /// Returns the wrapped content.
    pub const fn content(&self) -> &T {
        &self.content
    }

    /// Leans the content out of the wrapper.
    pub fn into_content(self) -> T {
        self.content
    }

    /// Returns the source span as a range of byte indices.
    pub const fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl<T: std::fmt::Display> std::fmt::Display for SourceRangeMixin<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at indices [{}, {})",
            self.content, self.start, self.end
        )
    }
}

impl<T: std::error::Error + 'static> std::error::Error for SourceRangeMixin<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.content)
    }
}

/// Extension methods for wrapping any value into [`SourceRangeMixin`].
pub trait SourceRangeMixinExt {
    /// Instances a new `SourceRangeMixin` with the given byte range.
    fn into_wrapper_range(self, range: Range<usize>) -> SourceRangeMixin<Self>
    where
        Self: Sized,
    {
        SourceRangeMixin::new(self, range.start, range.end)
    }
}

impl<T> SourceRangeMixinExt for T {}

#[test]
fn wrapper_keeps_span() {
    let wrapped = "BPMS".into_wrapper_range(3..8);
    assert_eq!(wrapped.content(), &"BPMS");
    assert_eq!(wrapped.range(), 3..8);
    assert_eq!(wrapped.to_string(), "BPMS at indices [3, 8)");
    assert_eq!(wrapped.into_content(), "BPMS");
}

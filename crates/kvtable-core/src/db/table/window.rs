use std::ops::Range;

///
/// Window
///
/// Half-open `[start, end)` range over the sequence of matching records.
///
/// Only records accepted by the caller's filter advance the window. The
/// default window is `[0, 1)`: the first match only.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Window {
    start: usize,
    end: usize,
}

impl Window {
    /// Build a window; an `end` before `start` collapses to a single record.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        let end = if end < start {
            start.saturating_add(1)
        } else {
            end
        };

        Self { start, end }
    }

    /// Window holding only the match at `start`.
    #[must_use]
    pub const fn at(start: usize) -> Self {
        Self::new(start, start.saturating_add(1))
    }

    /// Window from the first match up to (excluding) `end`.
    #[must_use]
    pub const fn first(end: usize) -> Self {
        Self::new(0, end)
    }

    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Maximum number of records the window can hold.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::at(0)
    }
}

impl From<Range<usize>> for Window {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

///
/// WindowCursor
///
/// Tracks offset/limit progression while a scan feeds it matching records.
///

pub(crate) struct WindowCursor {
    offset_remaining: usize,
    limit_remaining: usize,
}

impl WindowCursor {
    pub(crate) const fn new(window: Window) -> Self {
        Self {
            offset_remaining: window.start,
            limit_remaining: window.len(),
        }
    }

    pub(crate) const fn exhausted(&self) -> bool {
        self.limit_remaining == 0
    }

    // Advance by one matching record and return whether it falls inside the
    // window.
    pub(crate) const fn accept_matching_row(&mut self) -> bool {
        if self.limit_remaining == 0 {
            return false;
        }

        if self.offset_remaining > 0 {
            self.offset_remaining -= 1;
            return false;
        }

        self.limit_remaining -= 1;

        true
    }
}

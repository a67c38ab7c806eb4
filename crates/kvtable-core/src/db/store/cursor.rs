use crate::{
    db::store::{Row, SCAN_CHUNK_ROWS, Store},
    error::InternalError,
};
use std::{collections::VecDeque, ops::Bound};

///
/// ScanCursor
///
/// Ordered iterator over a store range.
///
/// Rows are fetched in chunks; each chunk resumes strictly after the last key
/// returned, so callers may write to the same store between items. Writes
/// landing ahead of the cursor may or may not be observed.
///

pub struct ScanCursor<'a> {
    store: &'a dyn Store,
    resume: Option<Vec<u8>>,
    lower: Vec<u8>,
    upper: Option<Vec<u8>>,
    buffer: VecDeque<Row>,
    exhausted: bool,
}

impl<'a> ScanCursor<'a> {
    pub(crate) fn new(store: &'a dyn Store, lower: Vec<u8>, upper: Option<Vec<u8>>) -> Self {
        Self {
            store,
            resume: None,
            lower,
            upper,
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }

    fn refill(&mut self) -> Result<(), InternalError> {
        let lower = match &self.resume {
            Some(last) => Bound::Excluded(last.as_slice()),
            None => Bound::Included(self.lower.as_slice()),
        };

        let rows = self
            .store
            .read_chunk(lower, self.upper.as_deref(), SCAN_CHUNK_ROWS)?;
        if rows.len() < SCAN_CHUNK_ROWS {
            self.exhausted = true;
        }
        if let Some((last, _)) = rows.last() {
            self.resume = Some(last.clone());
        }
        self.buffer.extend(rows);

        Ok(())
    }
}

impl Iterator for ScanCursor<'_> {
    type Item = Result<Row, InternalError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(err) = self.refill() {
                self.exhausted = true;
                return Some(Err(err));
            }
        }

        self.buffer.pop_front().map(Ok)
    }
}

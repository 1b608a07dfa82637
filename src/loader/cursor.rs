use std::ops::Range;

/// Position of a row in its source list, plus the single in-flight batch guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchCursor {
    offset: usize,
    batch_size: usize,
    len: usize,
    in_flight: Option<Range<usize>>,
    dispatched: usize,
}

impl BatchCursor {
    pub fn new(len: usize, batch_size: usize) -> Self {
        Self {
            offset: 0,
            batch_size: batch_size.max(1),
            len,
            in_flight: None,
            dispatched: 0,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_exhausted(&self) -> bool {
        self.offset >= self.len
    }

    /// Batches started so far.
    pub fn dispatched(&self) -> usize {
        self.dispatched
    }

    pub fn can_dispatch(&self) -> bool {
        !self.is_in_flight() && !self.is_exhausted()
    }

    /// Try to claim the next slice. Returns None if a batch is already in flight
    /// or the list is used up. The offset does not move until `settle`.
    pub fn try_begin(&mut self) -> Option<Range<usize>> {
        if !self.can_dispatch() {
            return None;
        }
        let end = (self.offset + self.batch_size).min(self.len);
        let range = self.offset..end;
        self.in_flight = Some(range.clone());
        self.dispatched += 1;
        Some(range)
    }

    /// Mark the in-flight batch as fully settled: advance past it and clear the guard.
    /// Returns the settled range, or None if nothing was in flight.
    pub fn settle(&mut self) -> Option<Range<usize>> {
        let range = self.in_flight.take()?;
        self.offset = self.offset.max(range.end);
        Some(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(len: usize, batch: usize) -> usize {
        let mut c = BatchCursor::new(len, batch);
        while c.try_begin().is_some() {
            c.settle();
        }
        c.dispatched()
    }

    #[test]
    fn test_dispatch_count_is_ceil_len_over_batch() {
        for len in 0..40 {
            for batch in 1..10 {
                assert_eq!(drain(len, batch), len.div_ceil(batch), "len={len} batch={batch}");
            }
        }
    }

    #[test]
    fn test_second_begin_blocked_while_in_flight() {
        let mut c = BatchCursor::new(12, 6);
        assert_eq!(c.try_begin(), Some(0..6));
        assert!(c.try_begin().is_none());
        assert_eq!(c.offset(), 0);
        assert_eq!(c.dispatched(), 1);
    }

    #[test]
    fn test_offset_advances_only_on_settle() {
        let mut c = BatchCursor::new(12, 6);
        c.try_begin();
        assert_eq!(c.offset(), 0);
        assert_eq!(c.settle(), Some(0..6));
        assert_eq!(c.offset(), 6);
        assert_eq!(c.try_begin(), Some(6..12));
        c.settle();
        assert!(c.is_exhausted());
        assert!(c.try_begin().is_none());
    }

    #[test]
    fn test_last_batch_is_short() {
        let mut c = BatchCursor::new(8, 6);
        c.try_begin();
        c.settle();
        assert_eq!(c.try_begin(), Some(6..8));
    }

    #[test]
    fn test_settle_without_batch_is_noop() {
        let mut c = BatchCursor::new(5, 2);
        assert_eq!(c.settle(), None);
        assert_eq!(c.offset(), 0);
    }

    #[test]
    fn test_empty_list_never_dispatches() {
        let mut c = BatchCursor::new(0, 6);
        assert!(c.is_exhausted());
        assert!(c.try_begin().is_none());
    }

    #[test]
    fn test_zero_batch_size_clamped() {
        let c = BatchCursor::new(3, 0);
        assert_eq!(c.batch_size(), 1);
    }
}

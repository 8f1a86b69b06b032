/// Time-based id source that never hands out the same id twice.
///
/// Ids follow the wall clock in milliseconds, bumped past the last issued
/// id when the clock has not advanced (or went backwards). Once the last
/// issued id is `i64::MAX` the sequence is exhausted and yields `None`.
#[derive(Debug, Default, Clone)]
pub struct IdSequence {
    last: Option<i64>,
}

impl IdSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self, now_ms: i64) -> Option<i64> {
        let id = match self.last {
            Some(last) if now_ms <= last => last.checked_add(1)?,
            _ => now_ms,
        };
        self.last = Some(id);
        Some(id)
    }

    /// Raises the floor so ids already present in `ids` are never reissued.
    pub fn observe<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = i64>,
    {
        if let Some(max) = ids.into_iter().max() {
            self.last = Some(self.last.map_or(max, |last| last.max(max)));
        }
    }
}

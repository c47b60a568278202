use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use tasklist_core::model::TaskId;

/// Hands out placeholder ids for tasks that have not been confirmed yet.
///
/// Ids are the current wall-clock time in milliseconds, bumped past the
/// previously issued id so two creations within one tick stay distinct.
#[derive(Debug, Default)]
pub struct TempIdAllocator {
    last: AtomicI64,
}

impl TempIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> TaskId {
        self.next_at(Utc::now().timestamp_millis())
    }

    fn next_at(&self, now_millis: i64) -> TaskId {
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now_millis.max(last + 1);
            match self
                .last
                .compare_exchange(last, candidate, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return candidate,
                Err(actual) => last = actual,
            }
        }
    }
}

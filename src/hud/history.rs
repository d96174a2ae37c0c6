//! Bounded, ordered history of event ids with a navigation cursor.

use std::collections::VecDeque;

/// Ring of recent event ids, newest last, with a cursor for paging.
///
/// The cursor is `None` exactly when the buffer is empty; otherwise it is a
/// valid index. Navigation clamps at the ends; there is no wraparound.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    entries: VecDeque<String>,
    cursor: Option<usize>,
    capacity: usize,
}

impl HistoryBuffer {
    /// Create a buffer retaining at most `capacity` ids (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: None,
            capacity: capacity.max(1),
        }
    }

    /// Append `id` as the newest entry, evicting the oldest when full, and
    /// move the cursor to it. Ids are not deduplicated.
    pub fn append(&mut self, id: impl Into<String>) {
        self.entries.push_back(id.into());
        if self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.cursor = Some(self.entries.len() - 1);
    }

    /// Remove the first occurrence of `id`; absent ids are a no-op.
    ///
    /// The cursor is clamped into the remaining range, or cleared when the
    /// buffer empties. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(index) = self.entries.iter().position(|entry| entry == id) else {
            return false;
        };
        self.entries.remove(index);

        self.cursor = if self.entries.is_empty() {
            None
        } else {
            self.cursor
                .map(|cursor| cursor.min(self.entries.len() - 1))
        };
        true
    }

    /// Move the cursor by `delta`, clamping at the ends. Returns the id now
    /// under the cursor, or `None` when the buffer is empty.
    pub fn move_cursor(&mut self, delta: i64) -> Option<&str> {
        let cursor = self.cursor?;
        let last = self.entries.len() - 1;

        let step = usize::try_from(delta.unsigned_abs()).unwrap_or(usize::MAX);
        let target = if delta >= 0 {
            cursor.saturating_add(step).min(last)
        } else {
            cursor.saturating_sub(step)
        };

        self.cursor = Some(target);
        self.current()
    }

    /// Id under the cursor.
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.cursor
            .and_then(|cursor| self.entries.get(cursor).map(String::as_str))
    }

    #[must_use]
    pub const fn cursor_index(&self) -> Option<usize> {
        self.cursor
    }

    /// Cursor at the oldest retained entry. Also true when empty, so both
    /// navigation affordances read as disabled.
    #[must_use]
    pub fn is_at_start(&self) -> bool {
        self.cursor.is_none_or(|cursor| cursor == 0)
    }

    /// Cursor at the newest entry. Also true when empty.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.cursor
            .is_none_or(|cursor| cursor + 1 == self.entries.len())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Retained ids, oldest first.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|entry| entry == id)
    }
}

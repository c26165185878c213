//! Question pointer with bounded forward/backward movement.

use std::ops::Range;

use crate::model::Paging;

/// Tracks the current question of an attempt.
///
/// Movement past either end is a no-op. With [`Paging::All`] the navigator
/// degenerates to one fixed page covering the whole set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigator {
    index: usize,
    len: usize,
    paging: Paging,
}

impl Navigator {
    pub fn new(len: usize, paging: Paging) -> Self {
        Self {
            index: 0,
            len,
            paging,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn paging(&self) -> Paging {
        self.paging
    }

    /// Move to the next question. Returns `true` if the index changed.
    pub fn advance(&mut self) -> bool {
        if self.paging == Paging::All || self.is_last() {
            return false;
        }
        self.index += 1;
        true
    }

    /// Move to the previous question. Returns `true` if the index changed.
    pub fn retreat(&mut self) -> bool {
        if self.paging == Paging::All || self.is_first() {
            return false;
        }
        self.index -= 1;
        true
    }

    /// Jump straight to `index`, clamped to the last question.
    pub fn jump_to(&mut self, index: usize) {
        if self.paging == Paging::Sequential {
            self.index = index.min(self.len.saturating_sub(1));
        }
    }

    pub fn is_first(&self) -> bool {
        self.paging == Paging::All || self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.paging == Paging::All || self.index + 1 >= self.len
    }

    /// Question indices visible on the current page.
    pub fn page(&self) -> Range<usize> {
        match self.paging {
            Paging::Sequential if self.len == 0 => 0..0,
            Paging::Sequential => self.index..self.index + 1,
            Paging::All => 0..self.len,
        }
    }
}

//! Offset-based paging over chronologically ordered series.
//!
//! The offset counts how many of the most recent periods are skipped, so a
//! page stays anchored to "now" when the series grows between fetches.

use serde::Serialize;

/// Number of periods shown per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowState {
    pub offset: usize,
    pub page_size: usize,
}

impl Default for WindowState {
    fn default() -> Self {
        Self {
            offset: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Cursor over a series ordered oldest first.
#[derive(Debug, Clone, Default)]
pub struct WindowNavigator {
    state: WindowState,
}

impl WindowNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Page size is at least one period.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            state: WindowState {
                offset: 0,
                page_size: page_size.max(1),
            },
        }
    }

    pub fn from_state(state: WindowState) -> Self {
        Self {
            state: WindowState {
                offset: state.offset,
                page_size: state.page_size.max(1),
            },
        }
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    pub fn offset(&self) -> usize {
        self.state.offset
    }

    pub fn page_size(&self) -> usize {
        self.state.page_size
    }

    /// Whether the window shows the most recent periods.
    pub fn is_latest(&self) -> bool {
        self.state.offset == 0
    }

    /// Number of periods to request from the backend so the current page is
    /// fully covered.
    pub fn periods_to_fetch(&self) -> usize {
        self.state.page_size.saturating_add(self.state.offset)
    }

    /// Returns the visible slice of `series`.
    ///
    /// Offsets past the start of the data give an empty page.
    pub fn page<'a, T>(&self, series: &'a [T]) -> &'a [T] {
        let end = series.len().saturating_sub(self.state.offset);
        let start = end.saturating_sub(self.state.page_size);
        &series[start..end]
    }

    /// Moves the window; positive deltas go back in time. The offset never
    /// drops below zero. Returns the new offset.
    pub fn advance(&mut self, delta: i64) -> usize {
        let step = usize::try_from(delta.unsigned_abs()).unwrap_or(usize::MAX);
        self.state.offset = if delta < 0 {
            self.state.offset.saturating_sub(step)
        } else {
            self.state.offset.saturating_add(step)
        };
        self.state.offset
    }

    pub fn reset(&mut self) {
        self.state.offset = 0;
    }
}

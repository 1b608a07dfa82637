use crate::loader::{RowState, ScrollPosition};
use crate::settings::DebugSettings;
use std::collections::VecDeque;
use std::time::Instant;

/// Columns taken by one card, gap included.
pub const CARD_WIDTH: usize = 24;

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone)]
pub struct AppState {
    pub row: RowState,
    pub debug: DebugSettings,
    pub start_time: Instant,
    /// Index of the highlighted card in the visible list.
    pub selected: usize,
    /// Index of the leftmost card on screen.
    pub first_card: usize,
    pub logs: VecDeque<LogEntry>,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub message: String,
}

impl AppState {
    pub fn new(row: RowState, debug: DebugSettings) -> Self {
        Self {
            row,
            debug,
            start_time: Instant::now(),
            selected: 0,
            first_card: 0,
            logs: VecDeque::with_capacity(MAX_LOGS),
        }
    }

    pub fn push_log(&mut self, level: &str, message: String) {
        let time = chrono::Local::now().format("%H:%M:%S%.3f").to_string();
        if self.logs.len() >= MAX_LOGS {
            self.logs.pop_front();
        }
        self.logs.push_back(LogEntry {
            time,
            level: level.to_string(),
            message,
        });
    }

    /// Replace the row snapshot, logging any batches that settled since the last one.
    pub fn apply_row(&mut self, row: RowState) {
        let before = self.row.stats.clone();
        let after = row.stats.clone();
        self.row = row;
        if after.batches_settled > before.batches_settled {
            self.push_log(
                "INFO",
                format!(
                    "batch {} settled: {} shown, {} without trailer, {} failed",
                    after.batches_settled,
                    after.verified - before.verified,
                    after.no_trailer - before.no_trailer,
                    after.failed - before.failed,
                ),
            );
        }
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let n = self.row.visible.len();
        if n == 0 {
            self.selected = 0;
            self.first_card = 0;
            return;
        }
        self.selected = self.selected.min(n - 1);
        self.first_card = self.first_card.min(self.selected);
    }

    /// Cards that fit in `viewport` columns.
    pub fn cards_per_view(viewport: usize) -> usize {
        (viewport / CARD_WIDTH).max(1)
    }

    pub fn select_next(&mut self, viewport: usize) {
        if self.selected + 1 < self.row.visible.len() {
            self.selected += 1;
        }
        self.follow_selection(viewport);
    }

    pub fn select_prev(&mut self, viewport: usize) {
        self.selected = self.selected.saturating_sub(1);
        self.follow_selection(viewport);
    }

    /// Scroll just enough to keep the selected card on screen.
    fn follow_selection(&mut self, viewport: usize) {
        let per_view = Self::cards_per_view(viewport);
        if self.selected < self.first_card {
            self.first_card = self.selected;
        } else if self.selected >= self.first_card + per_view {
            self.first_card = self.selected + 1 - per_view;
        }
    }

    pub fn scroll_position(&self, viewport: usize) -> ScrollPosition {
        ScrollPosition {
            offset: self.first_card * CARD_WIDTH,
            viewport,
            content: self.row.visible.len() * CARD_WIDTH,
        }
    }

    pub fn uptime(&self) -> String {
        let secs = self.start_time.elapsed().as_secs();
        let m = secs / 60;
        let s = secs % 60;
        format!("{}m {:02}s", m, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::{ContentItem, ItemKey, MediaKind};

    fn state_with(n: usize) -> AppState {
        let mut row = RowState::new("Trending", n, n.max(1));
        row.cursor.try_begin();
        for id in 0..n as u64 {
            row.visible.push_pending(ContentItem::new(id, "x", MediaKind::Movie));
        }
        AppState::new(row, DebugSettings::default())
    }

    #[test]
    fn test_scrolling_right_moves_viewport() {
        let mut s = state_with(10);
        let viewport = CARD_WIDTH * 3;
        for _ in 0..4 {
            s.select_next(viewport);
        }
        assert_eq!(s.selected, 4);
        assert_eq!(s.first_card, 2);
        let pos = s.scroll_position(viewport);
        assert_eq!(pos.offset, 2 * CARD_WIDTH);
        assert_eq!(pos.content, 10 * CARD_WIDTH);
    }

    #[test]
    fn test_selection_stops_at_ends() {
        let mut s = state_with(2);
        s.select_prev(100);
        assert_eq!(s.selected, 0);
        s.select_next(100);
        s.select_next(100);
        assert_eq!(s.selected, 1);
    }

    #[test]
    fn test_apply_row_logs_settled_batch_and_clamps() {
        let mut s = state_with(4);
        s.selected = 3;
        let mut row = s.row.clone();
        row.visible.reject(ItemKey::movie(2), crate::loader::VerificationStatus::RejectedError);
        row.visible.reject(ItemKey::movie(3), crate::loader::VerificationStatus::RejectedNoTrailer);
        row.stats.failed = 1;
        row.stats.no_trailer = 1;
        row.stats.batches_settled = 1;
        row.cursor.settle();
        s.apply_row(row);
        assert_eq!(s.selected, 1);
        assert_eq!(s.logs.len(), 1);
        assert!(s.logs[0].message.contains("1 failed"));
    }
}

use super::cursor::BatchCursor;
use super::trailer::{find_trailer, TrailerRef};
use super::visible::{VerificationStatus, VisibleList};
use crate::catalog::types::{ContentItem, ItemKey};
use crate::catalog::DetailsSource;
use crate::config::RowConfig;
use crate::error::LookupError;
use crate::settings::SettingsHub;
use futures_util::future::join_all;
use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Horizontal scroll geometry of the row, in whatever unit the view uses (columns, px).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollPosition {
    pub offset: usize,
    pub viewport: usize,
    pub content: usize,
}

impl ScrollPosition {
    /// Fraction of the scrollable distance already traversed, 0.0..=1.0.
    /// A row that fits in its viewport cannot be scrolled and reports 0.
    pub fn traversed(&self) -> f64 {
        let max = self.content.saturating_sub(self.viewport);
        if max == 0 {
            return 0.0;
        }
        self.offset.min(max) as f64 / max as f64
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowStats {
    pub verified: usize,
    pub no_trailer: usize,
    pub failed: usize,
    pub batches_settled: usize,
}

/// Everything the view needs to draw one row.
#[derive(Debug, Clone)]
pub struct RowState {
    pub title: String,
    pub cursor: BatchCursor,
    pub visible: VisibleList,
    pub stats: RowStats,
}

impl RowState {
    pub fn new(title: &str, len: usize, batch_size: usize) -> Self {
        Self {
            title: title.to_string(),
            cursor: BatchCursor::new(len, batch_size),
            visible: VisibleList::new(),
            stats: RowStats::default(),
        }
    }

    /// An empty source list, or a settled row with nothing left to show, renders nothing.
    pub fn should_render(&self) -> bool {
        !self.cursor.is_empty() && (!self.visible.is_empty() || self.cursor.is_in_flight())
    }
}

/// Outcome of verifying one item.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Trailer(TrailerRef),
    NoTrailer,
    Failed(LookupError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// 1-based batch number within the session.
    pub batch: usize,
    pub range: Range<usize>,
    pub verified: usize,
    pub no_trailer: usize,
    pub failed: usize,
}

pub struct RowLoader {
    source: Arc<Vec<ContentItem>>,
    details: Arc<dyn DetailsSource>,
    state_tx: watch::Sender<RowState>,
    settings: SettingsHub,
    scroll_threshold: f64,
    load_more_tx: mpsc::Sender<()>,
    cancel: CancellationToken,
}

impl RowLoader {
    /// Build a loader over `items`. The returned receiver yields one message per
    /// accepted scroll trigger; whoever drives the loader should listen on it.
    pub fn new(
        title: &str,
        items: Vec<ContentItem>,
        details: Arc<dyn DetailsSource>,
        row: &RowConfig,
        settings: SettingsHub,
    ) -> (Self, mpsc::Receiver<()>) {
        let (state_tx, _) = watch::channel(RowState::new(title, items.len(), row.batch_size));
        // Capacity 1: repeated triggers before the driver wakes collapse into one.
        let (load_more_tx, load_more_rx) = mpsc::channel(1);
        let loader = Self {
            source: Arc::new(items),
            details,
            state_tx,
            settings,
            scroll_threshold: row.scroll_threshold,
            load_more_tx,
            cancel: CancellationToken::new(),
        };
        (loader, load_more_rx)
    }

    pub fn subscribe(&self) -> watch::Receiver<RowState> {
        self.state_tx.subscribe()
    }

    pub fn snapshot(&self) -> RowState {
        self.state_tx.borrow().clone()
    }

    pub fn is_exhausted(&self) -> bool {
        self.state_tx.borrow().cursor.is_exhausted()
    }

    pub fn is_in_flight(&self) -> bool {
        self.state_tx.borrow().cursor.is_in_flight()
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Claim, verify and settle the next batch. Returns None without doing anything
    /// when a batch is already in flight, the list is used up, or the session is gone.
    pub async fn load_next_batch(&self) -> Option<BatchReport> {
        if self.cancel.is_cancelled() {
            return None;
        }

        let source = &self.source;
        let mut claimed: Option<(Range<usize>, usize, Vec<usize>)> = None;
        self.state_tx.send_if_modified(|s| {
            let Some(range) = s.cursor.try_begin() else { return false };
            // Only items that got a placeholder are looked up; repeats and
            // already-rejected entries are skipped.
            let mut accepted = Vec::with_capacity(range.len());
            for idx in range.clone() {
                if s.visible.push_pending(source[idx].clone()) {
                    accepted.push(idx);
                }
            }
            claimed = Some((range, s.cursor.dispatched(), accepted));
            true
        });
        let (range, batch, accepted) = claimed?;

        tracing::debug!(
            batch,
            start = range.start,
            end = range.end,
            skipped = range.len() - accepted.len(),
            "batch dispatched"
        );

        let verdicts = join_all(accepted.iter().map(|&idx| self.verify(&source[idx]))).await;

        if self.cancel.is_cancelled() {
            tracing::debug!(batch, "session torn down mid-batch, discarding results");
            return None;
        }

        let mut report = BatchReport {
            batch,
            range,
            verified: 0,
            no_trailer: 0,
            failed: 0,
        };
        for verdict in verdicts.iter().flatten() {
            match verdict {
                Verdict::Trailer(_) => report.verified += 1,
                Verdict::NoTrailer => report.no_trailer += 1,
                Verdict::Failed(_) => report.failed += 1,
            }
        }

        self.state_tx.send_modify(|s| {
            s.cursor.settle();
            s.stats.batches_settled += 1;
        });

        tracing::info!(
            batch,
            verified = report.verified,
            no_trailer = report.no_trailer,
            failed = report.failed,
            "batch settled"
        );
        Some(report)
    }

    /// Ask the driver for the next batch right away if the row has been scrolled far
    /// enough. No-op while a batch is in flight or once the list is used up.
    pub fn on_scroll(&self, position: ScrollPosition) -> bool {
        if position.traversed() <= self.scroll_threshold {
            return false;
        }
        if self.cancel.is_cancelled() || !self.state_tx.borrow().cursor.can_dispatch() {
            return false;
        }
        self.load_more_tx.try_send(()).is_ok()
    }

    async fn verify(&self, item: &ContentItem) -> Option<Verdict> {
        let verdict = tokio::select! {
            _ = self.cancel.cancelled() => return None,
            res = self.details.fetch_details(item) => match res {
                Ok(details) => match find_trailer(&details) {
                    Some(trailer) => Verdict::Trailer(trailer),
                    None => Verdict::NoTrailer,
                },
                Err(e) => Verdict::Failed(e),
            },
        };

        // Check-before-apply: results landing after teardown are dropped.
        if self.cancel.is_cancelled() {
            return None;
        }

        self.log_verdict(item, &verdict);
        self.apply(item.key(), &verdict);
        Some(verdict)
    }

    fn apply(&self, key: ItemKey, verdict: &Verdict) {
        self.state_tx.send_modify(|s| match verdict {
            Verdict::Trailer(trailer) => {
                if s.visible.mark_verified(key, trailer.clone()) {
                    s.stats.verified += 1;
                }
            }
            Verdict::NoTrailer => {
                s.visible.reject(key, VerificationStatus::RejectedNoTrailer);
                s.stats.no_trailer += 1;
            }
            Verdict::Failed(_) => {
                s.visible.reject(key, VerificationStatus::RejectedError);
                s.stats.failed += 1;
            }
        });
    }

    fn log_verdict(&self, item: &ContentItem, verdict: &Verdict) {
        let trace = self.settings.current().trace_lookups;
        match verdict {
            Verdict::Failed(e) => {
                tracing::warn!(item_id = e.item_id(), kind = item.media_kind.query_value(), error = %e, "details lookup failed, dropping item");
            }
            Verdict::Trailer(t) if trace => {
                tracing::info!(item_id = item.id, title = %item.title, trailer = t.key(), "trailer found");
            }
            Verdict::Trailer(t) => {
                tracing::debug!(item_id = item.id, title = %item.title, trailer = t.key(), "trailer found");
            }
            Verdict::NoTrailer if trace => {
                tracing::info!(item_id = item.id, title = %item.title, "no trailer, dropping item");
            }
            Verdict::NoTrailer => {
                tracing::debug!(item_id = item.id, title = %item.title, "no trailer, dropping item");
            }
        }
    }
}

/// Self-driving pipeline: load a batch, wait the auto-continue delay (or a scroll
/// trigger, whichever first), repeat until the list is used up or the session ends.
async fn drive(loader: Arc<RowLoader>, mut load_more: mpsc::Receiver<()>, delay: Duration) {
    let cancel = loader.cancel_token();
    loop {
        if cancel.is_cancelled() {
            break;
        }
        loader.load_next_batch().await;
        // Triggers queued before settlement are stale; only a scroll after it skips the delay.
        while load_more.try_recv().is_ok() {}
        if cancel.is_cancelled() || loader.is_exhausted() {
            break;
        }
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
            Some(()) = load_more.recv() => {
                tracing::debug!("scroll trigger, skipping auto-continue delay");
            }
        }
    }
    tracing::debug!(exhausted = loader.is_exhausted(), "row driver stopped");
}

/// One displayed row: the loader plus its driver task. Dropping the session
/// tears it down.
pub struct RowSession {
    loader: Arc<RowLoader>,
    driver: JoinHandle<()>,
}

impl RowSession {
    /// Spawn the driver. Must be called from within a tokio runtime.
    pub fn start(
        title: &str,
        items: Vec<ContentItem>,
        details: Arc<dyn DetailsSource>,
        row: &RowConfig,
        settings: SettingsHub,
    ) -> Self {
        let (loader, load_more_rx) = RowLoader::new(title, items, details, row, settings);
        let loader = Arc::new(loader);
        let driver = tokio::spawn(drive(loader.clone(), load_more_rx, row.auto_continue_delay()));
        Self { loader, driver }
    }

    pub fn loader(&self) -> &Arc<RowLoader> {
        &self.loader
    }

    pub fn subscribe(&self) -> watch::Receiver<RowState> {
        self.loader.subscribe()
    }

    pub fn snapshot(&self) -> RowState {
        self.loader.snapshot()
    }

    pub fn on_scroll(&self, position: ScrollPosition) -> bool {
        self.loader.on_scroll(position)
    }

    /// Wait for the driver to run the list to the end. Returns the final state.
    pub async fn finished(mut self) -> RowState {
        if let Err(e) = (&mut self.driver).await {
            tracing::error!("row driver panicked: {}", e);
        }
        self.loader.snapshot()
    }

    /// Cancel outstanding lookups and stop the driver.
    pub async fn teardown(mut self) {
        self.loader.cancel.cancel();
        if let Err(e) = (&mut self.driver).await {
            tracing::error!("row driver panicked: {}", e);
        }
    }
}

impl Drop for RowSession {
    fn drop(&mut self) {
        self.loader.cancel.cancel();
    }
}

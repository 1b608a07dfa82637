// Scripted stand-in for the details endpoint, shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use trailer_row::catalog::types::{ContentDetails, ContentItem, ItemKey, MediaKind, Video, VideoList};
use trailer_row::catalog::DetailsSource;
use trailer_row::config::RowConfig;
use trailer_row::error::LookupError;

#[derive(Debug, Clone)]
pub enum Reply {
    Trailer(&'static str),
    NoTrailer,
    Http(u16),
    Network,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Start(u64),
    End(u64),
}

pub struct FakeCatalog {
    script: HashMap<ItemKey, Reply>,
    delays: HashMap<u64, Duration>,
    gate: Option<Arc<Semaphore>>,
    pub calls: AtomicUsize,
    pub events: Mutex<Vec<Event>>,
    pub lookups: Mutex<Vec<ItemKey>>,
}

impl FakeCatalog {
    /// Script keyed by movie id.
    pub fn new(script: Vec<(u64, Reply)>) -> Self {
        Self::keyed(script.into_iter().map(|(id, reply)| (ItemKey::movie(id), reply)).collect())
    }

    pub fn keyed(script: Vec<(ItemKey, Reply)>) -> Self {
        Self {
            script: script.into_iter().collect(),
            delays: HashMap::new(),
            gate: None,
            calls: AtomicUsize::new(0),
            events: Mutex::new(Vec::new()),
            lookups: Mutex::new(Vec::new()),
        }
    }

    /// Every id in `ids` answers with a trailer.
    pub fn all_trailers(ids: impl IntoIterator<Item = u64>) -> Self {
        Self::new(ids.into_iter().map(|id| (id, Reply::Trailer("yt-key"))).collect())
    }

    pub fn with_delay(mut self, id: u64, delay: Duration) -> Self {
        self.delays.insert(id, delay);
        self
    }

    /// Hold every lookup until the returned semaphore gets permits.
    pub fn gated(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn lookups_for(&self, key: ItemKey) -> usize {
        self.lookups.lock().unwrap().iter().filter(|k| **k == key).count()
    }
}

fn details_with(videos: Vec<Video>) -> ContentDetails {
    ContentDetails {
        videos: Some(VideoList { results: videos }),
    }
}

#[async_trait]
impl DetailsSource for FakeCatalog {
    async fn fetch_details(&self, item: &ContentItem) -> Result<ContentDetails, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.events.lock().unwrap().push(Event::Start(item.id));
        self.lookups.lock().unwrap().push(item.key());

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        let delay = self.delays.get(&item.id).copied().unwrap_or(Duration::from_millis(2));
        tokio::time::sleep(delay).await;

        self.events.lock().unwrap().push(Event::End(item.id));

        match self.script.get(&item.key()).cloned().unwrap_or(Reply::Http(404)) {
            Reply::Trailer(key) => Ok(details_with(vec![
                Video { kind: "Teaser".into(), site: "YouTube".into(), key: "teaser".into() },
                Video { kind: "Trailer".into(), site: "YouTube".into(), key: key.into() },
            ])),
            Reply::NoTrailer => Ok(details_with(vec![Video {
                kind: "Clip".into(),
                site: "YouTube".into(),
                key: "clip".into(),
            }])),
            Reply::Http(status) => Err(LookupError::Http { item_id: item.id, status }),
            Reply::Network => Err(LookupError::Network {
                item_id: item.id,
                message: "connection reset".into(),
            }),
        }
    }
}

pub fn items(ids: impl IntoIterator<Item = u64>) -> Vec<ContentItem> {
    ids.into_iter()
        .map(|id| ContentItem::new(id, &format!("Title {id}"), MediaKind::Movie))
        .collect()
}

pub fn row_config(batch_size: usize, delay_ms: u64) -> RowConfig {
    RowConfig {
        batch_size,
        auto_continue_delay_ms: delay_ms,
        ..RowConfig::default()
    }
}

/// Poll `cond` until it holds or a second passes.
pub async fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    for _ in 0..1000 {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    cond()
}

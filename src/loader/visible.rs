use super::trailer::TrailerRef;
use crate::catalog::types::{ContentItem, ItemKey};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationStatus {
    Pending,
    VerifiedHasTrailer,
    RejectedNoTrailer,
    RejectedError,
}

impl VerificationStatus {
    pub fn is_visible(self) -> bool {
        matches!(self, VerificationStatus::Pending | VerificationStatus::VerifiedHasTrailer)
    }
}

#[derive(Debug, Clone)]
pub struct EnrichedContentItem {
    pub item: ContentItem,
    pub status: VerificationStatus,
    pub trailer: Option<TrailerRef>,
}

/// Items currently shown in the row. Rejected keys are remembered so they never come back.
#[derive(Debug, Clone, Default)]
pub struct VisibleList {
    entries: Vec<EnrichedContentItem>,
    rejected: HashSet<ItemKey>,
}

impl VisibleList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[EnrichedContentItem] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: ItemKey) -> Option<&EnrichedContentItem> {
        self.entries.iter().find(|e| e.item.key() == key)
    }

    pub fn is_rejected(&self, key: ItemKey) -> bool {
        self.rejected.contains(&key)
    }

    pub fn pending_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status == VerificationStatus::Pending)
            .count()
    }

    pub fn verified_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status == VerificationStatus::VerifiedHasTrailer)
            .count()
    }

    /// Append a placeholder. Returns false if the item is already shown or was rejected.
    pub fn push_pending(&mut self, item: ContentItem) -> bool {
        let key = item.key();
        if self.rejected.contains(&key) || self.get(key).is_some() {
            return false;
        }
        self.entries.push(EnrichedContentItem {
            item,
            status: VerificationStatus::Pending,
            trailer: None,
        });
        true
    }

    /// Pending -> verified. Returns false if the item is not pending.
    pub fn mark_verified(&mut self, key: ItemKey, trailer: TrailerRef) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|e| e.item.key() == key && e.status == VerificationStatus::Pending)
        {
            Some(entry) => {
                entry.status = VerificationStatus::VerifiedHasTrailer;
                entry.trailer = Some(trailer);
                true
            }
            None => false,
        }
    }

    /// Drop an item for good. `reason` must be one of the rejected statuses.
    pub fn reject(&mut self, key: ItemKey, reason: VerificationStatus) -> bool {
        debug_assert!(!reason.is_visible());
        self.rejected.insert(key);
        let before = self.entries.len();
        self.entries.retain(|e| e.item.key() != key);
        self.entries.len() != before
    }
}

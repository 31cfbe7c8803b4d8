//! Conversation Store
//!
//! Canonical, durable, capacity-bounded collection of committed
//! conversations, most-recent-insert-first for new entries.
//!
//! Information Hiding:
//! - Slot serialization layout hidden from store users
//! - Eviction and quota-recovery policy internalized
//! - Consumers outside the commit path get read-only projections

pub mod slot;

use crate::conversation::Conversation;
use chrono::{DateTime, Utc};
use slot::{SlotError, StorageSlot};
use std::sync::Arc;

/// Fixed bound on the number of retained conversations.
pub const CAPACITY: usize = 20;

/// Read-only projection of one stored conversation, for history listings.
#[derive(Debug, Clone)]
pub struct ConversationSummary {
    pub id: String,
    pub title: String,
    pub preview: Option<String>,
    pub turn_count: usize,
    pub updated_at: DateTime<Utc>,
}

pub struct ConversationStore {
    conversations: Vec<Conversation>,
    slot: Arc<dyn StorageSlot>,
    capacity: usize,
}

impl ConversationStore {
    pub fn new(slot: Arc<dyn StorageSlot>) -> Self {
        Self::with_capacity(slot, CAPACITY)
    }

    pub fn with_capacity(slot: Arc<dyn StorageSlot>, capacity: usize) -> Self {
        Self {
            conversations: Vec::new(),
            slot,
            capacity,
        }
    }

    /// Load the persisted collection. Missing or malformed data resets to
    /// empty; neither is surfaced as an error.
    pub async fn load(&mut self) {
        match self.slot.read().await {
            Ok(Some(payload)) => match serde_json::from_str::<Vec<Conversation>>(&payload) {
                Ok(conversations) => {
                    tracing::debug!(
                        "[ConversationStore] Loaded {} conversations",
                        conversations.len()
                    );
                    self.conversations = conversations;
                }
                Err(e) => {
                    tracing::warn!("[ConversationStore] Discarding malformed history: {}", e);
                    self.conversations.clear();
                }
            },
            Ok(None) => {
                self.conversations.clear();
            }
            Err(e) => {
                tracing::warn!("[ConversationStore] Failed to read history slot: {}", e);
                self.conversations.clear();
            }
        }
    }

    /// Insert at the front, or replace in place when the id already exists.
    /// An update never moves the record; eviction is by position, so the
    /// last entry is dropped once the capacity bound is crossed.
    pub fn upsert(&mut self, conversation: Conversation) {
        // Zero-turn conversations are never admitted.
        if conversation.turns.is_empty() {
            tracing::debug!(
                "[ConversationStore] Ignoring empty conversation '{}'",
                conversation.id
            );
            return;
        }

        if let Some(existing) = self
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation.id)
        {
            *existing = conversation;
        } else {
            self.conversations.insert(0, conversation);
        }

        if self.conversations.len() > self.capacity {
            self.conversations.pop();
        }
    }

    pub fn find(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    /// Remove the matching record. Restarting the session when the active
    /// conversation is deleted is the caller's job.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.conversations.len();
        self.conversations.retain(|c| c.id != id);
        self.conversations.len() != before
    }

    /// Serialize the full collection into the slot. Quota exhaustion evicts
    /// the last entry and retries until the write lands or nothing is left,
    /// at which point the failure is logged and abandoned.
    pub async fn persist(&mut self) {
        loop {
            let payload = match serde_json::to_string(&self.conversations) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::warn!("[ConversationStore] Failed to serialize history: {}", e);
                    return;
                }
            };

            match self.slot.write(&payload).await {
                Ok(()) => {
                    tracing::debug!(
                        "[ConversationStore] Persisted {} conversations",
                        self.conversations.len()
                    );
                    return;
                }
                Err(SlotError::QuotaExceeded) => {
                    if self.conversations.pop().is_none() {
                        tracing::warn!(
                            "[ConversationStore] Slot quota exhausted with nothing left to evict"
                        );
                        return;
                    }
                    tracing::warn!(
                        "[ConversationStore] Slot quota exceeded, evicting oldest entry"
                    );
                }
                Err(e) => {
                    tracing::warn!("[ConversationStore] Failed to persist history: {}", e);
                    return;
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Conversation> {
        self.conversations.iter()
    }

    /// Projections for the history list, in store order.
    pub fn summaries(&self) -> Vec<ConversationSummary> {
        self.conversations
            .iter()
            .map(|c| ConversationSummary {
                id: c.id.clone(),
                title: c.title.clone(),
                preview: c.preview().map(str::to_string),
                turn_count: c.turns.len(),
                updated_at: c.updated_at,
            })
            .collect()
    }
}

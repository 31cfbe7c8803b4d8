//! Session Controller - the in-progress conversation draft
//!
//! The controller exclusively owns the draft until commit; after commit the
//! store owns the snapshot and the draft keeps evolving independently.

use crate::conversation::{Conversation, Role, Turn};
use crate::store::ConversationStore;
use chrono::Utc;

pub struct SessionController {
    id: String,
    turns: Vec<Turn>,
}

impl SessionController {
    /// Start with a fresh draft whose id does not collide with anything in
    /// the store.
    pub fn new(store: &ConversationStore) -> Self {
        Self {
            id: fresh_id(store),
            turns: Vec::new(),
        }
    }

    /// Drop the draft and begin a new conversation under a fresh id.
    pub fn start_new(&mut self, store: &ConversationStore) {
        self.id = fresh_id(store);
        self.turns.clear();
        tracing::debug!("[SessionController] Started session '{}'", self.id);
    }

    /// Append a turn stamped now. Nothing is persisted here.
    pub fn append_turn(&mut self, role: Role, content: impl Into<String>) {
        self.turns.push(Turn::new(role, content));
    }

    /// Content of the first user turn, or the fixed placeholder.
    pub fn title(&self) -> String {
        Conversation::derive_title(&self.turns)
    }

    /// Commit the draft into the store as a stable snapshot. Empty drafts
    /// are not committed. Appends after this call never reach the snapshot
    /// until the next commit.
    pub fn commit(&self, store: &mut ConversationStore) {
        if self.turns.is_empty() {
            return;
        }

        store.upsert(Conversation {
            id: self.id.clone(),
            title: self.title(),
            turns: self.turns.clone(),
            updated_at: Utc::now(),
        });
    }

    /// Replace the draft's id and turns with a committed conversation's for
    /// continued editing. No other controller state is touched.
    pub fn load_conversation(&mut self, conversation: &Conversation) {
        self.id = conversation.id.clone();
        self.turns = conversation.turns.clone();
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Most recent assistant turn, the subject of follow-up actions.
    pub fn last_assistant_content(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|t| t.role == Role::Assistant)
            .map(|t| t.content.as_str())
    }
}

/// Millisecond-timestamp id, bumped until it is unused. Collisions inside
/// one store's capacity window are rare but an existing id is never reused.
fn fresh_id(store: &ConversationStore) -> String {
    let mut millis = Utc::now().timestamp_millis();
    loop {
        let id = format!("conv-{}", millis);
        if store.find(&id).is_none() {
            return id;
        }
        millis += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::slot::MemorySlot;
    use std::sync::Arc;

    fn store() -> ConversationStore {
        ConversationStore::new(Arc::new(MemorySlot::new()))
    }

    #[test]
    fn test_title_from_first_user_turn() {
        let store = store();
        let mut controller = SessionController::new(&store);
        controller.append_turn(Role::User, "what is 5G");
        controller.append_turn(Role::Assistant, "a cellular standard");

        assert_eq!(controller.title(), "what is 5G");
    }

    #[test]
    fn test_title_placeholder() {
        let store = store();
        let controller = SessionController::new(&store);
        assert_eq!(controller.title(), "untitled");
    }

    #[test]
    fn test_commit_empty_draft_is_noop() {
        let mut store = store();
        let controller = SessionController::new(&store);

        controller.commit(&mut store);
        assert!(store.is_empty());
    }

    #[test]
    fn test_committed_title_matches_question() {
        let mut store = store();
        let mut controller = SessionController::new(&store);
        controller.append_turn(Role::User, "what is 5G");
        controller.append_turn(Role::Assistant, "a cellular standard");
        controller.commit(&mut store);

        let committed = store.find(controller.id()).unwrap();
        assert_eq!(committed.title, "what is 5G");
        assert_eq!(committed.turns.len(), 2);
    }

    #[test]
    fn test_commit_snapshot_is_stable() {
        let mut store = store();
        let mut controller = SessionController::new(&store);
        controller.append_turn(Role::User, "first question");
        controller.append_turn(Role::Assistant, "first answer");
        controller.commit(&mut store);

        controller.append_turn(Role::User, "second question");

        // The committed snapshot only grows on the next commit.
        assert_eq!(store.find(controller.id()).unwrap().turns.len(), 2);

        controller.append_turn(Role::Assistant, "second answer");
        controller.commit(&mut store);
        assert_eq!(store.find(controller.id()).unwrap().turns.len(), 4);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_fresh_id_skips_stored_ids() {
        let mut store = store();
        let mut controller = SessionController::new(&store);
        controller.append_turn(Role::User, "q");
        controller.commit(&mut store);
        let taken = controller.id().to_string();

        // A new session started immediately afterwards must not collide,
        // even when the clock has not advanced past the taken id.
        controller.start_new(&store);
        assert_ne!(controller.id(), taken);
        assert!(controller.is_empty());
    }

    #[test]
    fn test_load_conversation_replaces_draft() {
        let mut store = store();
        let mut controller = SessionController::new(&store);
        controller.append_turn(Role::User, "original question");
        controller.append_turn(Role::Assistant, "original answer");
        controller.commit(&mut store);
        let committed = store.find(controller.id()).unwrap().clone();

        controller.start_new(&store);
        controller.append_turn(Role::User, "unrelated");

        controller.load_conversation(&committed);
        assert_eq!(controller.id(), committed.id);
        assert_eq!(controller.turns().len(), 2);
        assert_eq!(controller.last_assistant_content(), Some("original answer"));
    }
}

//! Chat sessions and the ordered store that owns them.

use serde::{Deserialize, Serialize};

use crate::core::constants::{HISTORY_KEY, NEW_CHAT_TITLE, WELCOME_ID_PREFIX, WELCOME_MESSAGE};
use crate::core::message::ChatMessage;
use crate::core::storage::LocalStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: String,
    pub title: String,
    pub messages: Vec<ChatMessage>,
    pub bible_version: String,
    pub language: String,
    /// Epoch milliseconds.
    pub created_at: i64,
}

impl ChatSession {
    /// A fresh session seeded with the welcome message.
    pub fn new(
        id: impl Into<String>,
        created_at: i64,
        bible_version: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        let id = id.into();
        let welcome = ChatMessage::model(format!("{WELCOME_ID_PREFIX}{id}"), WELCOME_MESSAGE);
        Self {
            id,
            title: NEW_CHAT_TITLE.to_string(),
            messages: vec![welcome],
            bible_version: bible_version.into(),
            language: language.into(),
            created_at,
        }
    }

    pub fn has_user_messages(&self) -> bool {
        self.messages.iter().any(ChatMessage::is_user)
    }

    /// Prior turns worth sending back to the model.
    ///
    /// The seeded greeting and empty placeholders are skipped.
    pub fn conversation_history(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages
            .iter()
            .filter(|message| !message.is_welcome() && !message.content.is_empty())
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn message_mut(&mut self, id: &str) -> Option<&mut ChatMessage> {
        self.messages.iter_mut().find(|message| message.id == id)
    }

    pub fn remove_message(&mut self, id: &str) -> bool {
        let before = self.messages.len();
        self.messages.retain(|message| message.id != id);
        self.messages.len() != before
    }

    /// Remove model placeholders that never received any text. Returns how
    /// many were dropped.
    pub fn drop_empty_replies(&mut self) -> usize {
        let before = self.messages.len();
        self.messages
            .retain(|message| !(message.is_model() && !message.is_welcome() && message.content.is_empty()));
        before - self.messages.len()
    }

    /// Model replies with content, oldest first, ignoring the greeting.
    pub fn model_replies(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages
            .iter()
            .filter(|message| message.is_model() && !message.is_welcome() && !message.content.is_empty())
    }

    /// Most recent model reply with content, ignoring the greeting.
    pub fn last_model_reply(&self) -> Option<&ChatMessage> {
        self.messages
            .iter()
            .rev()
            .find(|message| message.is_model() && !message.is_welcome() && !message.content.is_empty())
    }
}

/// Result of removing a session from the store.
#[derive(Debug)]
pub struct RemovedSession {
    pub session: ChatSession,
    pub was_active: bool,
}

/// Sessions ordered newest first, plus the active selection.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Vec<ChatSession>,
    active_id: Option<String>,
}

impl SessionStore {
    pub fn from_sessions(mut sessions: Vec<ChatSession>) -> Self {
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        // Replies cut off by an earlier exit leave empty placeholders behind.
        for session in &mut sessions {
            session.drop_empty_replies();
        }
        let active_id = sessions.first().map(|session| session.id.clone());
        Self {
            sessions,
            active_id,
        }
    }

    pub fn load(store: &LocalStore) -> Self {
        Self::from_sessions(store.load_list(HISTORY_KEY))
    }

    /// Persist the list. An empty store is never written so a transient
    /// empty state cannot wipe saved history.
    pub fn save(&self, store: &LocalStore) {
        if !self.sessions.is_empty() {
            store.save_list(HISTORY_KEY, &self.sessions);
        }
    }

    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn active(&self) -> Option<&ChatSession> {
        let id = self.active_id.as_deref()?;
        self.get(id)
    }

    pub fn active_index(&self) -> Option<usize> {
        let id = self.active_id.as_deref()?;
        self.position(id)
    }

    pub fn get(&self, id: &str) -> Option<&ChatSession> {
        self.sessions.iter().find(|session| session.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut ChatSession> {
        self.sessions.iter_mut().find(|session| session.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.sessions.iter().position(|session| session.id == id)
    }

    /// Insert a new session at the front and make it active.
    pub fn insert_front(&mut self, session: ChatSession) {
        self.active_id = Some(session.id.clone());
        self.sessions.insert(0, session);
    }

    pub fn select(&mut self, id: &str) -> bool {
        if self.get(id).is_some() {
            self.active_id = Some(id.to_string());
            true
        } else {
            false
        }
    }

    /// Move the selection by `delta` positions, wrapping around the ends.
    pub fn select_relative(&mut self, delta: isize) -> bool {
        if self.sessions.is_empty() {
            return false;
        }
        let len = self.sessions.len() as isize;
        let current = self.active_index().unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        let id = self.sessions[next].id.clone();
        self.select(&id)
    }

    /// Remove a session. When it was active, the first remaining session
    /// becomes active (or none, if the store is now empty).
    pub fn remove(&mut self, id: &str) -> Option<RemovedSession> {
        let index = self.position(id)?;
        let session = self.sessions.remove(index);
        let was_active = self.active_id.as_deref() == Some(id);
        if was_active {
            self.active_id = self.sessions.first().map(|s| s.id.clone());
        }
        Some(RemovedSession {
            session,
            was_active,
        })
    }

    pub fn set_title(&mut self, id: &str, title: impl Into<String>) -> bool {
        match self.get_mut(id) {
            Some(session) => {
                session.title = title.into();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Role;
    use tempfile::TempDir;

    fn session(id: &str, created_at: i64) -> ChatSession {
        ChatSession::new(id, created_at, "NIV", "en")
    }

    #[test]
    fn new_sessions_are_seeded_with_welcome() {
        let session = session("100", 100);
        assert_eq!(session.title, "New Chat");
        assert_eq!(session.messages.len(), 1);
        assert_eq!(session.messages[0].role, Role::Model);
        assert_eq!(session.messages[0].id, "initial-100");
        assert!(!session.has_user_messages());
        assert_eq!(session.conversation_history().count(), 0);
    }

    #[test]
    fn loaded_sessions_sort_newest_first() {
        let store = SessionStore::from_sessions(vec![session("1", 1), session("3", 3), session("2", 2)]);
        let ids: Vec<&str> = store.sessions().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2", "1"]);
        assert_eq!(store.active_id(), Some("3"));
    }

    #[test]
    fn removing_active_session_selects_first_remaining() {
        let mut store = SessionStore::from_sessions(vec![session("1", 1), session("2", 2)]);
        store.select("1");
        let removed = store.remove("1").expect("removed");
        assert!(removed.was_active);
        assert_eq!(store.active_id(), Some("2"));

        let removed = store.remove("2").expect("removed");
        assert!(removed.was_active);
        assert!(store.active_id().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn removing_inactive_session_keeps_selection() {
        let mut store = SessionStore::from_sessions(vec![session("1", 1), session("2", 2)]);
        let removed = store.remove("1").expect("removed");
        assert!(!removed.was_active);
        assert_eq!(store.active_id(), Some("2"));
        assert!(store.remove("missing").is_none());
    }

    #[test]
    fn relative_selection_wraps() {
        let mut store =
            SessionStore::from_sessions(vec![session("1", 1), session("2", 2), session("3", 3)]);
        assert_eq!(store.active_id(), Some("3"));
        store.select_relative(-1);
        assert_eq!(store.active_id(), Some("1"));
        store.select_relative(1);
        assert_eq!(store.active_id(), Some("3"));
        store.select_relative(1);
        assert_eq!(store.active_id(), Some("2"));
    }

    #[test]
    fn history_skips_welcome_and_placeholders() {
        let mut session = session("9", 9);
        session.push(ChatMessage::user("10", "Who was Ruth?"));
        session.push(ChatMessage::model("11", ""));
        let history: Vec<&str> = session.conversation_history().map(|m| m.id.as_str()).collect();
        assert_eq!(history, vec!["10"]);
        assert!(session.last_model_reply().is_none());
    }

    #[test]
    fn loading_drops_replies_that_never_arrived() {
        let mut interrupted = session("7", 7);
        interrupted.push(ChatMessage::user("8", "Who was Boaz?"));
        interrupted.push(ChatMessage::model("9", ""));

        let store = SessionStore::from_sessions(vec![interrupted]);
        let ids: Vec<&str> = store.sessions()[0]
            .messages
            .iter()
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(ids, vec!["initial-7", "8"]);
    }

    #[test]
    fn model_replies_skip_welcome_and_placeholders() {
        let mut session = session("1", 1);
        session.push(ChatMessage::user("2", "Genesis 1:1"));
        session.push(ChatMessage::model("3", "In the beginning"));
        session.push(ChatMessage::user("4", "John 1:1"));
        session.push(ChatMessage::model("5", "In the beginning was the Word"));
        session.push(ChatMessage::model("6", ""));
        let ids: Vec<&str> = session.model_replies().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "5"]);
    }

    #[test]
    fn persisted_json_uses_camel_case() {
        let dir = TempDir::new().expect("temp dir");
        let local = LocalStore::new(dir.path());
        let store = SessionStore::from_sessions(vec![session("5", 5)]);
        store.save(&local);

        let raw = std::fs::read_to_string(dir.path().join("bible-expert-ai-history.json")).unwrap();
        assert!(raw.contains("\"bibleVersion\""));
        assert!(raw.contains("\"createdAt\""));

        let reloaded = SessionStore::load(&local);
        assert_eq!(reloaded.sessions(), store.sessions());
    }

    #[test]
    fn empty_store_is_not_persisted() {
        let dir = TempDir::new().expect("temp dir");
        let local = LocalStore::new(dir.path());
        SessionStore::default().save(&local);
        assert!(!dir.path().join("bible-expert-ai-history.json").exists());
    }
}

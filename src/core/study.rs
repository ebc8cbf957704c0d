//! Saved study excerpts and their optional AI enrichment.

use serde::{Deserialize, Serialize};

use crate::core::constants::STUDY_KEY;
use crate::core::message::ChatMessage;
use crate::core::storage::LocalStore;
use crate::core::text::collapse_newlines;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossReference {
    pub reference: String,
    pub text: String,
}

/// Structured payload returned by the enrichment call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrichment {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub ai_reflection: String,
    #[serde(default)]
    pub cross_references: Vec<CrossReference>,
}

impl Enrichment {
    /// Collapse newline runs in the prose fields.
    pub fn cleaned(self) -> Self {
        Self {
            keywords: self.keywords,
            ai_reflection: collapse_newlines(&self.ai_reflection),
            cross_references: self
                .cross_references
                .into_iter()
                .map(|cr| CrossReference {
                    reference: cr.reference,
                    text: collapse_newlines(&cr.text),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedItem {
    pub id: String,
    pub message: ChatMessage,
    pub note: String,
    /// Epoch milliseconds.
    pub saved_at: i64,
    pub session_id: String,
    pub session_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_enriching: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_reflection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_references: Option<Vec<CrossReference>>,
}

impl SavedItem {
    pub fn is_enriching(&self) -> bool {
        self.is_enriching.unwrap_or(false)
    }

    pub fn is_enriched(&self) -> bool {
        self.keywords.is_some() || self.ai_reflection.is_some() || self.cross_references.is_some()
    }

    fn apply_enrichment(&mut self, enrichment: Enrichment) {
        let enrichment = enrichment.cleaned();
        self.keywords = Some(enrichment.keywords);
        self.ai_reflection = Some(enrichment.ai_reflection);
        self.cross_references = Some(enrichment.cross_references);
        self.is_enriching = Some(false);
    }
}

/// Study items ordered newest first.
#[derive(Debug, Default)]
pub struct StudyCollection {
    items: Vec<SavedItem>,
}

impl StudyCollection {
    /// Enrichment never outlives the process that requested it, so a
    /// pending flag read back from disk is cleared.
    pub fn from_items(mut items: Vec<SavedItem>) -> Self {
        items.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        for item in items.iter_mut().filter(|item| item.is_enriching()) {
            item.is_enriching = Some(false);
        }
        Self { items }
    }

    pub fn load(store: &LocalStore) -> Self {
        Self::from_items(store.load_list(STUDY_KEY))
    }

    pub fn save(&self, store: &LocalStore) {
        store.save_list(STUDY_KEY, &self.items);
    }

    pub fn items(&self) -> &[SavedItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&SavedItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn prepend(&mut self, item: SavedItem) {
        self.items.insert(0, item);
    }

    /// Merge enrichment into an item and clear its pending flag.
    pub fn complete_enrichment(&mut self, id: &str, enrichment: Enrichment) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.apply_enrichment(enrichment);
                true
            }
            None => false,
        }
    }

    /// Clear the pending flag without touching anything else.
    pub fn fail_enrichment(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.is_enriching = Some(false);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<SavedItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }
}

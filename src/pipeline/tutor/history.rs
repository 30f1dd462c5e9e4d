use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One answered query. Only written after a full success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub query: String,
    pub response: String,
    pub created_at: DateTime<Utc>,
}

/// Append-only, oldest first. Not synchronised; the owning session is.
#[derive(Debug, Default)]
pub struct HistoryStore {
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds at the end and returns the new entry's index.
    pub fn append(&mut self, query: &str, response: &str) -> usize {
        self.entries.push(HistoryEntry {
            query: query.to_string(),
            response: response.to_string(),
            created_at: Utc::now(),
        });
        self.entries.len() - 1
    }

    pub fn all(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What the main area currently shows: the last query and the text shown for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exchange {
    pub query: String,
    pub response: String,
}

/// Per-user state: history plus what is on screen.
#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    history: HistoryStore,
    selected: Option<usize>,
    current: Option<Exchange>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            history: HistoryStore::new(),
            selected: None,
            current: None,
        }
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub(crate) fn history_mut(&mut self) -> &mut HistoryStore {
        &mut self.history
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Marks a history entry as selected and shows it. `None` if out of range.
    pub fn select(&mut self, index: usize) -> Option<&HistoryEntry> {
        let entry = self.history.get(index)?;
        self.selected = Some(index);
        self.current = Some(Exchange {
            query: entry.query.clone(),
            response: entry.response.clone(),
        });
        self.history.get(index)
    }

    pub fn current(&self) -> Option<&Exchange> {
        self.current.as_ref()
    }

    pub(crate) fn show(&mut self, query: &str, response: &str) {
        self.current = Some(Exchange {
            query: query.to_string(),
            response: response.to_string(),
        });
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

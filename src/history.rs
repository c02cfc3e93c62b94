use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::store::PreferenceStore;
use crate::weather::Location;

pub const MAX_ENTRIES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub name: String,
    pub country: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn query(&self) -> String {
        format!("{}, {}", self.name, self.country)
    }

    pub fn when(&self) -> String {
        DateTime::<Local>::from(self.timestamp)
            .format("%b %-d %H:%M")
            .to_string()
    }

    fn same_place(&self, name: &str, country: &str) -> bool {
        self.name == name && self.country == country
    }
}

/// Most-recent-first list of places that were looked up successfully.
///
/// At most [`MAX_ENTRIES`] entries, unique by (name, country). Every
/// mutation writes the whole list back before returning.
#[derive(Debug)]
pub struct History {
    entries: Vec<HistoryEntry>,
    store: PreferenceStore,
}

impl History {
    pub fn load(store: PreferenceStore) -> Self {
        let mut entries = store.load_history();
        // A hand-edited file could break the invariants; repair on load.
        let mut seen = Vec::new();
        entries.retain(|e| {
            let key = (e.name.clone(), e.country.clone());
            let fresh = !seen.contains(&key);
            seen.push(key);
            fresh
        });
        entries.truncate(MAX_ENTRIES);
        Self { entries, store }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn query_for(&self, index: usize) -> Option<String> {
        self.entries.get(index).map(HistoryEntry::query)
    }

    pub fn store(&self) -> &PreferenceStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut PreferenceStore {
        &mut self.store
    }

    pub fn record(&mut self, location: &Location) -> &[HistoryEntry] {
        self.record_at(location, Utc::now())
    }

    pub fn record_at(&mut self, location: &Location, at: DateTime<Utc>) -> &[HistoryEntry] {
        self.entries
            .retain(|e| !e.same_place(&location.name, &location.country));
        self.entries.insert(
            0,
            HistoryEntry {
                name: location.name.clone(),
                country: location.country.clone(),
                timestamp: at,
            },
        );
        self.entries.truncate(MAX_ENTRIES);
        self.persist();
        &self.entries
    }

    /// Out-of-range indices leave the list untouched.
    pub fn remove(&mut self, index: usize) -> &[HistoryEntry] {
        if index < self.entries.len() {
            self.entries.remove(index);
            self.persist();
        }
        &self.entries
    }

    pub fn clear(&mut self) -> &[HistoryEntry] {
        self.entries.clear();
        self.persist();
        &self.entries
    }

    fn persist(&mut self) {
        if let Err(err) = self.store.save_history(&self.entries) {
            tracing::warn!("failed to save search history: {err}");
        }
    }
}

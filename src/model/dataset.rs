use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::MatchRecord;

/// Every match archived for one edition of the tournament, in scrape order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentDataset {
    pub year: i32,
    pub tournament: String,
    #[serde(default)]
    pub matches: Vec<MatchRecord>,
}

impl TournamentDataset {
    /// An empty dataset for `year`, labelled `"<label> <year>"`.
    pub fn new(year: i32, label: &str) -> Self {
        Self {
            year,
            tournament: format!("{label} {year}"),
            matches: Vec::new(),
        }
    }

    /// Identifiers of every archived match. Records without an id are not counted.
    pub fn seen_ids(&self) -> SeenIds {
        SeenIds(
            self.matches
                .iter()
                .filter(|m| !m.id.is_empty())
                .map(|m| m.id.clone())
                .collect(),
        )
    }

    /// Drops later occurrences of repeated ids, returning how many were removed.
    ///
    /// Records without an id are always kept.
    pub fn dedup(&mut self) -> usize {
        let before = self.matches.len();
        let mut seen = HashSet::with_capacity(before);
        self.matches
            .retain(|m| m.id.is_empty() || seen.insert(m.id.clone()));
        before - self.matches.len()
    }

    /// Appends `record` unless its id is already in `seen`. Returns whether it was added.
    pub fn append(&mut self, seen: &mut SeenIds, record: MatchRecord) -> bool {
        if !seen.insert(&record.id) {
            return false;
        }
        self.matches.push(record);
        true
    }
}

/// Membership set of archived record identifiers.
#[derive(Debug, Clone, Default)]
pub struct SeenIds(HashSet<String>);

impl SeenIds {
    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    /// Returns `false` if the id was already present.
    pub fn insert(&mut self, id: &str) -> bool {
        if self.0.contains(id) {
            return false;
        }
        self.0.insert(id.to_owned())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Discovered ids not yet seen, in discovery order and without repeats.
    pub fn unseen<'a, I>(&self, discovered: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut queued = HashSet::new();
        discovered
            .into_iter()
            .filter(|id| !self.contains(id) && queued.insert(*id))
            .cloned()
            .collect()
    }
}

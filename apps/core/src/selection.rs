use crate::model::Record;

/// Chosen records in selection order. Identity is the record id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    records: Vec<Record>,
}

impl Selection {
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn ids(&self) -> Vec<String> {
        self.records.iter().map(|record| record.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.iter().any(|record| record.id == id)
    }

    pub fn is_selection_allowed(&self, multi_select: bool) -> bool {
        multi_select || self.records.is_empty()
    }

    /// Appends `record` when the policy allows it and its id is not already
    /// present.
    pub fn push(&mut self, record: Record, multi_select: bool) -> bool {
        if !self.is_selection_allowed(multi_select) || self.contains(&record.id) {
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|record| record.id != id);
        self.records.len() != before
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Replaces the whole selection with owned copies of `records`, dropping
    /// duplicate ids and, in single-select mode, everything past the first.
    pub fn replace(&mut self, records: Option<&[Record]>, multi_select: bool) {
        self.records.clear();
        for record in records.unwrap_or_default() {
            if !multi_select && !self.records.is_empty() {
                break;
            }
            if !self.contains(&record.id) {
                self.records.push(record.clone());
            }
        }
    }

    /// Drops everything past the first record. Returns true when records were
    /// removed.
    pub fn truncate_to_single(&mut self) -> bool {
        if self.records.len() <= 1 {
            return false;
        }
        self.records.truncate(1);
        true
    }

    pub fn snapshot(&self) -> Vec<Record> {
        self.records.clone()
    }
}

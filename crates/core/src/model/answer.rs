use serde::{Deserialize, Serialize};

/// Per-question answer slots for one attempt.
///
/// The length is fixed at creation. Writes to an index past the end are
/// ignored rather than growing the sheet.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSheet {
    slots: Vec<Option<usize>>,
}

impl AnswerSheet {
    /// Creates a sheet with `len` unanswered slots.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![None; len],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Selected option for `index`, or `None` when unanswered or out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<usize> {
        self.slots.get(index).copied().flatten()
    }

    /// Overwrites the slot at `index`. Returns false if `index` is out of range.
    pub fn set(&mut self, index: usize, option: usize) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                *slot = Some(option);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_answered(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<usize>> + '_ {
        self.slots.iter().copied()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Option<usize>] {
        &self.slots
    }
}

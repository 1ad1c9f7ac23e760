//! Selection state over node and edge identifiers.

use std::collections::HashSet;

use slint::{Model, SharedString, VecModel};

/// Tracks the set of selected element identifiers with O(1) membership
/// checks. The façade applies this set to the stores' `selected` flags after
/// every interaction.
#[derive(Default)]
pub struct SelectionManager {
    selected: HashSet<String>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a click on `id`. A plain click replaces the selection; a
    /// modifier click toggles membership.
    pub fn handle_interaction(&mut self, id: &str, toggle: bool) {
        if toggle {
            if !self.selected.remove(id) {
                self.selected.insert(id.to_string());
            }
            return;
        }
        if self.selected.len() == 1 && self.selected.contains(id) {
            return;
        }
        self.selected.clear();
        self.selected.insert(id.to_string());
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Replace the selection wholesale (box-selection sync).
    pub fn replace_selection<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected.clear();
        self.selected.extend(ids.into_iter().map(Into::into));
    }

    pub fn contains(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Mirror the selection into a slint model for UI binding.
    pub fn sync_to_model(&self, model: &VecModel<SharedString>) {
        while model.row_count() > 0 {
            model.remove(0);
        }
        for id in &self.selected {
            model.push(SharedString::from(id.as_str()));
        }
    }

    /// Adopt the selection held by a slint model.
    pub fn sync_from_model(&mut self, model: &dyn Model<Data = SharedString>) {
        self.selected.clear();
        for i in 0..model.row_count() {
            if let Some(id) = model.row_data(i) {
                self.selected.insert(id.to_string());
            }
        }
    }
}

use std::collections::HashSet;

/// Set of ids that remembers insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    order: Vec<String>,
    members: HashSet<String>,
}

impl SelectionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }

    pub fn insert(&mut self, id: String) -> bool {
        if self.members.insert(id.clone()) {
            self.order.push(id);
            true
        } else {
            false
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        if self.members.remove(id) {
            self.order.retain(|existing| existing != id);
            true
        } else {
            false
        }
    }

    /// Flip membership; returns whether `id` is now selected.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.remove(id) {
            false
        } else {
            self.insert(id.to_string())
        }
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }

    /// Ids in the order they were selected.
    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.order
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl FromIterator<String> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = SelectionSet::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

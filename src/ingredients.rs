use serde::Serialize;

/// Ingredients a fresh session starts with.
pub const DEFAULT_INGREDIENTS: [&str; 3] = ["eggs", "cheese", "tomatoes"];

/// Ordered set of normalized (trimmed, lowercase, non-empty) ingredient names.
///
/// Entries keep their first-insertion order, which is also the order they are
/// listed in the prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngredientSet {
    items: Vec<String>,
}

impl IngredientSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        Self::from_iter(DEFAULT_INGREDIENTS)
    }

    pub fn normalize(raw: &str) -> Option<String> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            None
        } else {
            Some(normalized)
        }
    }

    /// Adds `raw` after normalization. Blank and duplicate entries are ignored.
    /// Returns `true` when the set changed.
    pub fn insert(&mut self, raw: &str) -> bool {
        match Self::normalize(raw) {
            Some(name) if !self.items.contains(&name) => {
                self.items.push(name);
                true
            }
            _ => false,
        }
    }

    /// Removes the entry at `index`. Out-of-range indices are a no-op.
    pub fn remove(&mut self, index: usize) -> Option<String> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    pub fn contains(&self, raw: &str) -> bool {
        Self::normalize(raw).is_some_and(|name| self.items.contains(&name))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for IngredientSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = IngredientSet::new();
        for raw in iter {
            set.insert(raw.as_ref());
        }
        set
    }
}

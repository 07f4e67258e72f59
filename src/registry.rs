//! Step registry for looking up and organizing step kinds.

use crate::core::step::{Category, StepKind};
use crate::core::store::StepDetails;
use indexmap::IndexMap;

/// Registry entry for one step kind.
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    pub kind: StepKind,
    /// Whether new steps of this kind can be created.
    pub enabled: bool,
    /// Tags added on top of the kind's own.
    pub tags: Vec<String>,
}

/// Registry of the step kinds a host offers.
///
/// Kinds are indexed by their stable ID and grouped by category tag. A kind
/// with several category tags appears in each of its groups.
#[derive(Debug, Clone)]
pub struct StepRegistry {
    steps: IndexMap<&'static str, RegistryEntry>,
    categories: IndexMap<Category, Vec<&'static str>>,
}

impl StepRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            steps: IndexMap::new(),
            categories: IndexMap::new(),
        }
    }

    /// Create a registry holding every built-in step kind.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for kind in StepKind::all() {
            registry.register(*kind);
        }
        registry
    }

    /// Register a step kind. Registering a kind twice has no effect.
    pub fn register(&mut self, kind: StepKind) {
        if self.steps.contains_key(kind.id()) {
            return;
        }

        self.steps.insert(
            kind.id(),
            RegistryEntry {
                kind,
                enabled: true,
                tags: Vec::new(),
            },
        );
        for category in kind.categories() {
            self.categories.entry(*category).or_default().push(kind.id());
        }
        log::debug!("Registered step kind '{}'", kind.id());
    }

    /// Look up an enabled step kind by ID.
    pub fn get(&self, id: &str) -> Option<StepKind> {
        self.steps.get(id).filter(|e| e.enabled).map(|e| e.kind)
    }

    /// Create fresh details for a step kind by ID.
    pub fn create(&self, id: &str) -> Option<StepDetails> {
        self.get(id).map(StepDetails::new)
    }

    pub fn get_entry(&self, id: &str) -> Option<&RegistryEntry> {
        self.steps.get(id)
    }

    /// Check if a step kind is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.steps.contains_key(id)
    }

    /// All registered kinds in registration order.
    pub fn kinds(&self) -> impl Iterator<Item = StepKind> + '_ {
        self.steps.values().map(|e| e.kind)
    }

    /// IDs of the kinds tagged with `category`.
    pub fn filters_by_category(&self, category: &Category) -> Vec<&str> {
        self.categories
            .get(category)
            .map(|ids| ids.to_vec())
            .unwrap_or_default()
    }

    /// Categories that hold at least one kind.
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.keys()
    }

    /// Search kinds by ID, name, description or tag.
    pub fn search(&self, query: &str) -> Vec<&str> {
        let query = query.to_lowercase();

        self.steps
            .iter()
            .filter(|(_, entry)| {
                let kind = entry.kind;
                let id_match = kind.id().contains(&query);
                let name_match = kind.display_name().to_lowercase().contains(&query);
                let desc_match = kind.description().to_lowercase().contains(&query);
                let tag_match = kind
                    .tags()
                    .iter()
                    .copied()
                    .chain(entry.tags.iter().map(String::as_str))
                    .any(|t| t.to_lowercase().contains(&query));

                id_match || name_match || desc_match || tag_match
            })
            .map(|(id, _)| *id)
            .collect()
    }

    /// Enable or disable a step kind.
    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> bool {
        if let Some(entry) = self.steps.get_mut(id) {
            entry.enabled = enabled;
            true
        } else {
            false
        }
    }

    /// Add tags to a step kind.
    pub fn add_tags(&mut self, id: &str, tags: Vec<String>) -> bool {
        if let Some(entry) = self.steps.get_mut(id) {
            entry.tags.extend(tags);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Enabled kinds grouped by category, each group sorted by name.
    pub fn grouped_by_category(&self) -> IndexMap<Category, Vec<StepKind>> {
        let mut grouped: IndexMap<Category, Vec<StepKind>> = IndexMap::new();

        for entry in self.steps.values().filter(|e| e.enabled) {
            for category in entry.kind.categories() {
                grouped.entry(*category).or_default().push(entry.kind);
            }
        }

        for kinds in grouped.values_mut() {
            kinds.sort_by_key(|k| k.display_name());
        }

        grouped
    }
}

impl Default for StepRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

//! Category visibility state.

use std::collections::BTreeMap;

use civic_map_asset_models::Category;

/// Which categories are currently shown on the map and counted by
/// catchment analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryFilter {
    enabled: BTreeMap<Category, bool>,
}

impl Default for CategoryFilter {
    /// Starts from each category's `enabled_by_default` flag.
    fn default() -> Self {
        Self {
            enabled: Category::all()
                .iter()
                .map(|category| (*category, category.metadata().enabled_by_default))
                .collect(),
        }
    }
}

impl CategoryFilter {
    /// A filter with exactly the given categories enabled.
    #[must_use]
    pub fn with_enabled(categories: &[Category]) -> Self {
        Self {
            enabled: Category::all()
                .iter()
                .map(|category| (*category, categories.contains(category)))
                .collect(),
        }
    }

    /// A filter with every category disabled.
    #[must_use]
    pub fn none() -> Self {
        Self::with_enabled(&[])
    }

    #[must_use]
    pub fn is_enabled(&self, category: Category) -> bool {
        self.enabled.get(&category).copied().unwrap_or(false)
    }

    /// Flips a category and returns its new state.
    pub fn toggle(&mut self, category: Category) -> bool {
        let state = self.enabled.entry(category).or_insert(false);
        *state = !*state;
        log::debug!("category {category} enabled={state}");
        *state
    }

    /// Enabled categories in declaration order.
    pub fn enabled(&self) -> impl Iterator<Item = Category> + '_ {
        self.enabled
            .iter()
            .filter(|(_, on)| **on)
            .map(|(category, _)| *category)
    }
}

//! Stimulus identifiers and their category partition.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::trial::Category;

/// Opaque stimulus handle (an image stem such as `hammer`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StimulusId(String);

impl StimulusId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StimulusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StimulusId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("stimulus category {0} has no entries")]
    EmptyCategory(Category),
    #[error("stimulus {id} is listed under both {first} and {second}")]
    DuplicateStimulus {
        id: StimulusId,
        first: Category,
        second: Category,
    },
}

/// Immutable partition of stimuli into categories.
///
/// Invariants: every listed category is non-empty, and no stimulus appears
/// under two categories. A catalog may leave a category out entirely; looking
/// that category up yields `None`.
#[derive(Debug, Clone)]
pub struct StimulusCatalog {
    entries: BTreeMap<Category, Vec<StimulusId>>,
}

impl StimulusCatalog {
    pub fn new(
        entries: impl IntoIterator<Item = (Category, Vec<StimulusId>)>,
    ) -> Result<Self, CatalogError> {
        let mut seen: HashMap<StimulusId, Category> = HashMap::new();
        let mut map: BTreeMap<Category, Vec<StimulusId>> = BTreeMap::new();

        for (category, ids) in entries {
            if ids.is_empty() {
                return Err(CatalogError::EmptyCategory(category));
            }
            let slot = map.entry(category).or_default();
            for id in ids {
                if let Some(&first) = seen.get(&id) {
                    if first == category {
                        continue;
                    }
                    return Err(CatalogError::DuplicateStimulus {
                        id,
                        first,
                        second: category,
                    });
                }
                seen.insert(id.clone(), category);
                slot.push(id);
            }
        }

        Ok(Self { entries: map })
    }

    /// Stimuli in `category`, or `None` if the catalog has no such key.
    #[must_use]
    pub fn stimuli(&self, category: Category) -> Option<&[StimulusId]> {
        self.entries.get(&category).map(Vec::as_slice)
    }

    #[must_use]
    pub fn category_of(&self, id: &StimulusId) -> Option<Category> {
        self.entries
            .iter()
            .find(|(_, ids)| ids.contains(id))
            .map(|(category, _)| *category)
    }

    /// Total number of stimuli across all categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

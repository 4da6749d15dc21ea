use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::attribute::MappingId;

/// One picked value: a value id for enumerated controls, raw text, an ISO date
/// or an upload guid for free-form controls.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CustomAttribute {
    pub key: MappingId,
    pub value: String,
}

impl CustomAttribute {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: MappingId(key.into()), value: value.into() }
    }
}

/// The customer's current, possibly partial, attribute picks. Checkbox
/// mappings contribute one entry per chosen value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection {
    entries: Vec<CustomAttribute>,
}

impl Selection {
    pub fn new(entries: Vec<CustomAttribute>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, key: MappingId, value: impl Into<String>) {
        self.entries.push(CustomAttribute { key, value: value.into() });
    }

    pub fn entries(&self) -> &[CustomAttribute] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn values_for<'a>(&'a self, key: &'a MappingId) -> impl Iterator<Item = &'a str> + 'a {
        self.entries.iter().filter(move |entry| &entry.key == key).map(|entry| entry.value.as_str())
    }

    pub fn has_mapping(&self, key: &MappingId) -> bool {
        self.entries.iter().any(|entry| &entry.key == key)
    }

    pub fn contains(&self, key: &MappingId, value: &str) -> bool {
        self.entries.iter().any(|entry| &entry.key == key && entry.value == value)
    }

    pub fn retain(&mut self, keep: impl FnMut(&CustomAttribute) -> bool) {
        self.entries.retain(keep);
    }

    /// Order-insensitive view used for equivalence checks.
    pub fn pair_set(&self) -> BTreeSet<(MappingId, String)> {
        self.entries.iter().map(|entry| (entry.key.clone(), entry.value.clone())).collect()
    }

    pub fn is_equivalent(&self, other: &Selection) -> bool {
        self.pair_set() == other.pair_set()
    }
}

impl FromIterator<CustomAttribute> for Selection {
    fn from_iter<I: IntoIterator<Item = CustomAttribute>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

//! The set of abstract types discovered while mapping a type tree.

use std::collections::BTreeSet;

/// Names of abstract (interface-like) schema types reachable from a mapped
/// type. Owned by the caller and threaded through mapping by `&mut`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbstractTypes(BTreeSet<String>);

impl AbstractTypes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the name was not present yet.
    pub fn insert(&mut self, type_name: impl Into<String>) -> bool {
        self.0.insert(type_name.into())
    }

    #[must_use]
    pub fn contains(&self, type_name: &str) -> bool {
        self.0.contains(type_name)
    }

    pub fn merge(&mut self, other: &AbstractTypes) {
        self.0.extend(other.0.iter().cloned());
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for AbstractTypes {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>> Extend<S> for AbstractTypes {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

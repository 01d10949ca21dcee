//! Selections
//!
//! A [`Selection`] maps attributes to the value chosen for them. It is immutable:
//! choosing or clearing a value produces a new selection, leaving the original
//! untouched. Entries are kept ordered by attribute id, so iteration order (and
//! therefore everything derived from it) is deterministic.

use std::collections::{BTreeMap, btree_map};

use crate::ids::{AttributeId, AttributeValueId};

/// A possibly partial mapping of attributes to chosen values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Selection {
    entries: BTreeMap<AttributeId, AttributeValueId>,
}

impl Selection {
    /// An empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of this selection with `attribute_id` set to `value_id`.
    ///
    /// Replaces any value previously chosen for the attribute.
    #[must_use]
    pub fn with(
        &self,
        attribute_id: impl Into<AttributeId>,
        value_id: impl Into<AttributeValueId>,
    ) -> Self {
        let mut entries = self.entries.clone();
        entries.insert(attribute_id.into(), value_id.into());

        Self { entries }
    }

    /// A copy of this selection with `attribute_id` cleared.
    #[must_use]
    pub fn without(&self, attribute_id: &str) -> Self {
        let mut entries = self.entries.clone();
        entries.remove(attribute_id);

        Self { entries }
    }

    /// Value chosen for `attribute_id`, if any
    pub fn get(&self, attribute_id: &str) -> Option<&AttributeValueId> {
        self.entries.get(attribute_id)
    }

    /// Whether a value has been chosen for `attribute_id`
    pub fn contains(&self, attribute_id: &str) -> bool {
        self.entries.contains_key(attribute_id)
    }

    /// Whether every entry of `self` is also present, with the same value, in `other`
    pub fn is_subset_of(&self, other: &Selection) -> bool {
        self.entries
            .iter()
            .all(|(attribute_id, value_id)| other.entries.get(attribute_id) == Some(value_id))
    }

    /// Number of chosen attributes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been chosen yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries ordered by attribute id
    pub fn iter(&self) -> btree_map::Iter<'_, AttributeId, AttributeValueId> {
        self.entries.iter()
    }
}

impl<A, V> FromIterator<(A, V)> for Selection
where
    A: Into<AttributeId>,
    V: Into<AttributeValueId>,
{
    fn from_iter<I: IntoIterator<Item = (A, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(attribute_id, value_id)| (attribute_id.into(), value_id.into()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Selection {
    type Item = (&'a AttributeId, &'a AttributeValueId);
    type IntoIter = btree_map::Iter<'a, AttributeId, AttributeValueId>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_leaves_original_untouched() {
        let empty = Selection::new();
        let chosen = empty.with("color", "red");

        assert!(empty.is_empty());
        assert_eq!(chosen.get("color"), Some(&AttributeValueId::from("red")));
    }

    #[test]
    fn with_replaces_previous_value() {
        let selection = Selection::new().with("color", "red").with("color", "blue");

        assert_eq!(selection.len(), 1);
        assert_eq!(selection.get("color"), Some(&AttributeValueId::from("blue")));
    }

    #[test]
    fn without_clears_attribute() {
        let selection = Selection::new().with("color", "red").with("size", "L");
        let cleared = selection.without("color");

        assert!(!cleared.contains("color"));
        assert!(cleared.contains("size"));
        assert!(selection.contains("color"));
    }

    #[test]
    fn insertion_order_does_not_affect_equality_or_iteration() {
        let a = Selection::new().with("size", "L").with("color", "red");
        let b = Selection::from_iter([("color", "red"), ("size", "L")]);

        assert_eq!(a, b);

        let keys: Vec<&str> = a.iter().map(|(id, _)| id.as_str()).collect();

        assert_eq!(keys, ["color", "size"]);
    }

    #[test]
    fn subset_requires_matching_values() {
        let partial = Selection::from_iter([("color", "red")]);
        let full = Selection::from_iter([("color", "red"), ("size", "L")]);
        let other = Selection::from_iter([("color", "blue"), ("size", "L")]);

        assert!(partial.is_subset_of(&full));
        assert!(!partial.is_subset_of(&other));
        assert!(!full.is_subset_of(&partial));
    }
}

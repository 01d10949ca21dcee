//! Availability
//!
//! Works out which values of an attribute can still lead to a purchasable
//! combination, given everything else the user has chosen so far.
//!
//! Values are never dropped from the output. Unavailable ones are returned with
//! `is_available == false` so selectors can render them disabled.
//!
//! A value is available only if some combination agreeing with the rest of the
//! selection uses it. This holds for optional attributes too: a value no
//! combination uses is never offered. Combinations are checked against dependency
//! rules when indexed, so choosing an available value never breaks one.
//!
//! Adding an entry to a partial selection can only shrink (or keep) the set of
//! compatible combinations, so the available values of every other attribute can
//! only shrink as well.

use rustc_hash::FxHashSet;
use tracing::trace;

use crate::{
    attributes::{Attribute, AttributeValue},
    catalog::{AttributeCatalog, CatalogError},
    combinations::CombinationIndex,
    ids::AttributeValueId,
    selection::Selection,
};

/// A catalog value tagged with whether it can still be chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueAvailability<'c> {
    /// The catalog value
    pub value: &'c AttributeValue,

    /// Whether at least one combination compatible with the rest of the selection uses it
    pub is_available: bool,
}

/// Availability of every value of one attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeAvailability<'c> {
    /// The catalog attribute
    pub attribute: &'c Attribute,

    /// Its values in declared order
    pub values: Vec<ValueAvailability<'c>>,
}

impl AttributeAvailability<'_> {
    /// Ids of the values that can still be chosen
    pub fn available_ids(&self) -> impl Iterator<Item = &AttributeValueId> {
        self.values
            .iter()
            .filter(|availability| availability.is_available)
            .map(|availability| availability.value.id())
    }
}

/// Resolves availability against one product's catalog and combinations.
#[derive(Debug, Clone, Copy)]
pub struct AvailabilityResolver<'c, 'a> {
    catalog: &'c AttributeCatalog,
    index: &'c CombinationIndex<'a>,
}

impl<'c, 'a> AvailabilityResolver<'c, 'a> {
    /// Create a resolver
    pub fn new(catalog: &'c AttributeCatalog, index: &'c CombinationIndex<'a>) -> Self {
        Self { catalog, index }
    }

    /// Availability of every value of `target`.
    ///
    /// Any value already chosen for `target` in `partial` is ignored, so the result
    /// shows what the user could switch to.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::AttributeNotFound`] if `target` is not in the catalog.
    pub fn available_values(
        &self,
        partial: &Selection,
        target: &str,
    ) -> Result<Vec<ValueAvailability<'c>>, CatalogError> {
        let attribute = self.catalog.attribute(target)?;

        Ok(self.resolve(attribute, partial))
    }

    /// Availability of every attribute in the catalog, in declared order.
    pub fn availability(&self, partial: &Selection) -> Vec<AttributeAvailability<'c>> {
        self.catalog
            .attributes()
            .map(|attribute| AttributeAvailability {
                attribute,
                values: self.resolve(attribute, partial),
            })
            .collect()
    }

    fn resolve(&self, attribute: &'c Attribute, partial: &Selection) -> Vec<ValueAvailability<'c>> {
        let others = partial.without(attribute.id().as_str());
        let candidates = self.index.all_compatible_with(&others);

        trace!(
            attribute = %attribute.id(),
            candidates = candidates.len(),
            "resolved compatible combinations"
        );

        let used: FxHashSet<&AttributeValueId> = candidates
            .iter()
            .filter_map(|combination| combination.value_for(attribute.id().as_str()))
            .collect();

        attribute
            .values()
            .iter()
            .map(|value| ValueAvailability {
                value,
                is_available: used.contains(value.id()),
            })
            .collect()
    }
}

/// Availability of every value of `target` given `partial`.
///
/// See [`AvailabilityResolver::available_values`].
///
/// # Errors
///
/// Returns [`CatalogError::AttributeNotFound`] if `target` is not in the catalog.
pub fn available_values<'c>(
    catalog: &'c AttributeCatalog,
    index: &'c CombinationIndex<'_>,
    partial: &Selection,
    target: &str,
) -> Result<Vec<ValueAvailability<'c>>, CatalogError> {
    AvailabilityResolver::new(catalog, index).available_values(partial, target)
}

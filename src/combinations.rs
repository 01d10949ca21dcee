//! Combinations
//!
//! A [`Combination`] is one purchasable SKU: a choice of value for every required
//! attribute of a product, plus any optional attributes the SKU includes. The
//! [`CombinationIndex`] holds all combinations of a product and answers the two
//! queries the rest of the engine needs: exact lookup of a complete selection and
//! filtering by a partial one.

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::debug;

use crate::{
    catalog::{AttributeCatalog, CatalogError},
    ids::{AttributeId, AttributeValueId, CombinationId},
    selection::Selection,
    validation::{self, ValidationError},
};

/// Errors raised while indexing combinations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CombinationError {
    /// A combination does not choose a value for a required attribute.
    #[error("combination {combination_id} has no value for required attribute {attribute_id}")]
    MissingAttribute {
        /// Offending combination
        combination_id: CombinationId,

        /// Required attribute left out
        attribute_id: AttributeId,
    },

    /// A combination lists the same attribute twice.
    #[error("combination {combination_id} lists attribute {attribute_id} more than once")]
    RepeatedAttribute {
        /// Offending combination
        combination_id: CombinationId,

        /// Repeated attribute
        attribute_id: AttributeId,
    },

    /// A combination references an id the catalog does not define.
    #[error("combination {combination_id} references an unknown id: {source}")]
    UnknownReference {
        /// Offending combination
        combination_id: CombinationId,

        /// Catalog lookup failure
        source: CatalogError,
    },

    /// A combination pairs an attribute with a parent value that does not allow it.
    #[error("combination {combination_id} breaks a dependency: {source}")]
    DependencyViolation {
        /// Offending combination
        combination_id: CombinationId,

        /// The violated rule
        source: ValidationError,
    },

    /// Two combinations share an id.
    #[error("combination id {0} is used more than once")]
    DuplicateId(CombinationId),

    /// Two combinations choose exactly the same values.
    #[error("combinations {existing} and {duplicate} select the same values")]
    DuplicateSelection {
        /// Combination indexed first
        existing: CombinationId,

        /// Combination repeating it
        duplicate: CombinationId,
    },
}

/// One attribute/value pair of a combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelection {
    /// Attribute
    pub attribute_id: AttributeId,

    /// Chosen value
    pub attribute_value_id: AttributeValueId,
}

/// A purchasable set of attribute values (SKU).
#[derive(Debug, Clone, PartialEq)]
pub struct Combination<'a> {
    id: CombinationId,
    attribute_selections: SmallVec<[AttributeSelection; 4]>,
    selection: Selection,
    explicit_price: Option<Money<'a, Currency>>,
}

impl<'a> Combination<'a> {
    /// Create a combination without an explicit price
    pub fn new(
        id: impl Into<CombinationId>,
        attribute_selections: impl IntoIterator<
            Item = (impl Into<AttributeId>, impl Into<AttributeValueId>),
        >,
    ) -> Self {
        let attribute_selections: SmallVec<[AttributeSelection; 4]> = attribute_selections
            .into_iter()
            .map(|(attribute_id, value_id)| AttributeSelection {
                attribute_id: attribute_id.into(),
                attribute_value_id: value_id.into(),
            })
            .collect();

        let selection = attribute_selections
            .iter()
            .map(|pair| (pair.attribute_id.clone(), pair.attribute_value_id.clone()))
            .collect();

        Self {
            id: id.into(),
            attribute_selections,
            selection,
            explicit_price: None,
        }
    }

    /// Set a price that replaces everything computed from modifiers and overrides
    #[must_use]
    pub fn with_explicit_price(mut self, price: Money<'a, Currency>) -> Self {
        self.explicit_price = Some(price);
        self
    }

    /// Combination identifier
    pub fn id(&self) -> &CombinationId {
        &self.id
    }

    /// Attribute/value pairs as declared
    pub fn attribute_selections(&self) -> &[AttributeSelection] {
        &self.attribute_selections
    }

    /// Explicit price, if one was set
    pub fn explicit_price(&self) -> Option<&Money<'a, Currency>> {
        self.explicit_price.as_ref()
    }

    /// The combination's choices as a [`Selection`]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Value this combination fixes for `attribute_id`
    pub fn value_for(&self, attribute_id: &str) -> Option<&AttributeValueId> {
        self.selection.get(attribute_id)
    }
}

/// All valid combinations of one product.
#[derive(Debug, Clone)]
pub struct CombinationIndex<'a> {
    required: SmallVec<[AttributeId; 4]>,
    combinations: Vec<Combination<'a>>,
    by_selection: FxHashMap<Selection, usize>,
}

impl<'a> CombinationIndex<'a> {
    /// Index the combinations of a product against its catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`CombinationError`] if a combination misses a required attribute,
    /// lists an attribute twice, references unknown ids, breaks a dependency rule, or
    /// repeats another combination's id or values.
    pub fn new(
        catalog: &AttributeCatalog,
        combinations: impl IntoIterator<Item = Combination<'a>>,
    ) -> Result<Self, CombinationError> {
        let combinations: Vec<Combination<'a>> = combinations.into_iter().collect();
        let mut by_selection = FxHashMap::default();
        let mut ids = FxHashMap::default();

        for (position, combination) in combinations.iter().enumerate() {
            ensure_well_formed(catalog, combination)?;

            if ids.insert(combination.id(), position).is_some() {
                return Err(CombinationError::DuplicateId(combination.id().clone()));
            }

            if let Some(existing) = by_selection.insert(combination.selection().clone(), position) {
                let existing = combinations
                    .get(existing)
                    .map(|existing| existing.id().clone())
                    .unwrap_or_default();

                return Err(CombinationError::DuplicateSelection {
                    existing,
                    duplicate: combination.id().clone(),
                });
            }
        }

        debug!(
            combinations = combinations.len(),
            "indexed product combinations"
        );

        Ok(Self {
            required: catalog.required_attribute_ids().iter().cloned().collect(),
            combinations,
            by_selection,
        })
    }

    /// The combination whose values are exactly those of `selection`.
    ///
    /// Returns `None` if a required attribute is missing from `selection`, or if no
    /// combination chooses the same set of values. Optional entries take part in the
    /// match like any other.
    pub fn find_exact(&self, selection: &Selection) -> Option<&Combination<'a>> {
        if !self
            .required
            .iter()
            .all(|attribute_id| selection.contains(attribute_id.as_str()))
        {
            return None;
        }

        self.by_selection
            .get(selection)
            .and_then(|&position| self.combinations.get(position))
    }

    /// Every combination that fixes each entry of `partial` to the same value.
    ///
    /// Attributes missing from `partial` are unconstrained.
    pub fn all_compatible_with(&self, partial: &Selection) -> Vec<&Combination<'a>> {
        self.combinations
            .iter()
            .filter(|combination| partial.is_subset_of(combination.selection()))
            .collect()
    }

    /// Iterate all combinations in the order they were supplied
    pub fn iter(&self) -> impl Iterator<Item = &Combination<'a>> {
        self.combinations.iter()
    }

    /// Number of combinations
    pub fn len(&self) -> usize {
        self.combinations.len()
    }

    /// Whether the product has no combinations
    pub fn is_empty(&self) -> bool {
        self.combinations.is_empty()
    }
}

fn ensure_well_formed(
    catalog: &AttributeCatalog,
    combination: &Combination<'_>,
) -> Result<(), CombinationError> {
    let mut seen: SmallVec<[&AttributeId; 4]> = SmallVec::new();

    for pair in combination.attribute_selections() {
        catalog
            .value(pair.attribute_id.as_str(), pair.attribute_value_id.as_str())
            .map_err(|source| CombinationError::UnknownReference {
                combination_id: combination.id().clone(),
                source,
            })?;

        if seen.contains(&&pair.attribute_id) {
            return Err(CombinationError::RepeatedAttribute {
                combination_id: combination.id().clone(),
                attribute_id: pair.attribute_id.clone(),
            });
        }

        seen.push(&pair.attribute_id);
    }

    // Missing attributes are reported before dependency violations.
    let first_error = validation::validate(combination.selection(), catalog)
        .into_errors()
        .into_iter()
        .next();

    match first_error {
        Some(ValidationError::MissingRequiredAttribute(attribute_id)) => {
            Err(CombinationError::MissingAttribute {
                combination_id: combination.id().clone(),
                attribute_id,
            })
        }
        Some(source) => Err(CombinationError::DependencyViolation {
            combination_id: combination.id().clone(),
            source,
        }),
        None => Ok(()),
    }
}

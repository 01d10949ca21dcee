//! Selection Validation
//!
//! Checks a selection for structural completeness and declared dependency rules.
//! Problems are expected while a user is still choosing, so they are returned as
//! data rather than as an `Err`.

use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    catalog::AttributeCatalog,
    ids::{AttributeId, AttributeValueId},
    selection::Selection,
};

/// A reason a selection is not (yet) acceptable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required attribute has no value.
    #[error("attribute {0} is required")]
    MissingRequiredAttribute(AttributeId),

    /// An attribute was chosen while its parent holds a value that does not allow it.
    #[error(
        "attribute {attribute_id} is not available when {parent_attribute_id} is {parent_value_id}"
    )]
    DependencyViolation {
        /// Dependent attribute
        attribute_id: AttributeId,

        /// Parent attribute
        parent_attribute_id: AttributeId,

        /// Value the parent currently holds
        parent_value_id: AttributeValueId,
    },
}

/// Outcome of validating a selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: SmallVec<[ValidationError; 2]>,
}

impl ValidationResult {
    /// Whether no errors were found
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors in the order they were found
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Ids of required attributes still missing
    pub fn missing_attributes(&self) -> impl Iterator<Item = &AttributeId> {
        self.errors.iter().filter_map(|error| match error {
            ValidationError::MissingRequiredAttribute(attribute_id) => Some(attribute_id),
            ValidationError::DependencyViolation { .. } => None,
        })
    }

    /// Consume the result, keeping the errors
    pub fn into_errors(self) -> SmallVec<[ValidationError; 2]> {
        self.errors
    }
}

/// Validates selections against a catalog.
#[derive(Debug, Clone, Copy)]
pub struct SelectionValidator<'c> {
    catalog: &'c AttributeCatalog,
}

impl<'c> SelectionValidator<'c> {
    /// Create a validator for `catalog`
    pub fn new(catalog: &'c AttributeCatalog) -> Self {
        Self { catalog }
    }

    /// Validate `selection`.
    ///
    /// Reports every missing required attribute, then every chosen attribute whose
    /// parent is set to a value its dependency does not allow. Whether a matching
    /// SKU exists is not checked here.
    pub fn validate(&self, selection: &Selection) -> ValidationResult {
        validate(selection, self.catalog)
    }
}

/// Validate `selection` against `catalog`.
///
/// See [`SelectionValidator::validate`].
pub fn validate(selection: &Selection, catalog: &AttributeCatalog) -> ValidationResult {
    let mut errors: SmallVec<[ValidationError; 2]> = catalog
        .required_attribute_ids()
        .iter()
        .filter(|attribute_id| !selection.contains(attribute_id.as_str()))
        .cloned()
        .map(ValidationError::MissingRequiredAttribute)
        .collect();

    for attribute in catalog.attributes() {
        let Some(dependency) = attribute.depends_on() else {
            continue;
        };

        if !selection.contains(attribute.id().as_str()) {
            continue;
        }

        let parent_attribute_id = dependency.attribute_id();

        let Some(parent_value_id) = selection.get(parent_attribute_id.as_str()) else {
            continue;
        };

        if !dependency.allows(parent_value_id) {
            errors.push(ValidationError::DependencyViolation {
                attribute_id: attribute.id().clone(),
                parent_attribute_id: parent_attribute_id.clone(),
                parent_value_id: parent_value_id.clone(),
            });
        }
    }

    ValidationResult { errors }
}

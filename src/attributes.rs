//! Attributes

use std::fmt;

use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::ids::{AttributeId, AttributeValueId};

/// How an attribute value adjusts the running price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceModifier {
    /// Add a fixed amount in major currency units (e.g. `5.00`).
    Flat(Decimal),

    /// Add this many percent of the running price (e.g. `10` for 10%).
    Percentage(Decimal),
}

impl PriceModifier {
    /// A modifier that leaves the price untouched.
    pub const NONE: PriceModifier = PriceModifier::Flat(Decimal::ZERO);
}

impl Default for PriceModifier {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Display for PriceModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flat(amount) if amount.is_sign_negative() => write!(f, "{amount}"),
            Self::Flat(amount) => write!(f, "+{amount}"),
            Self::Percentage(percent) => write!(f, "{percent}%"),
        }
    }
}

/// A single selectable option of an attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeValue {
    id: AttributeValueId,
    price_modifier: Option<PriceModifier>,
}

impl AttributeValue {
    /// Create a value with no price modifier
    pub fn new(id: impl Into<AttributeValueId>) -> Self {
        Self {
            id: id.into(),
            price_modifier: None,
        }
    }

    /// Create a value with a price modifier
    pub fn with_modifier(id: impl Into<AttributeValueId>, modifier: PriceModifier) -> Self {
        Self {
            id: id.into(),
            price_modifier: Some(modifier),
        }
    }

    /// Value identifier
    pub fn id(&self) -> &AttributeValueId {
        &self.id
    }

    /// Price modifier, absent modifiers read as a zero flat amount
    pub fn price_modifier(&self) -> PriceModifier {
        self.price_modifier.unwrap_or_default()
    }
}

/// Restricts an attribute to a subset of its parent attribute's values.
///
/// The dependent attribute may only be chosen while the parent is set to one of
/// `allowed_value_ids`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dependency {
    attribute_id: AttributeId,
    allowed_value_ids: FxHashSet<AttributeValueId>,
}

impl Dependency {
    /// Create a dependency on `attribute_id`
    pub fn new(
        attribute_id: impl Into<AttributeId>,
        allowed_value_ids: impl IntoIterator<Item = impl Into<AttributeValueId>>,
    ) -> Self {
        Self {
            attribute_id: attribute_id.into(),
            allowed_value_ids: allowed_value_ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Parent attribute
    pub fn attribute_id(&self) -> &AttributeId {
        &self.attribute_id
    }

    /// Parent values under which the dependent attribute is allowed
    pub fn allowed_value_ids(&self) -> &FxHashSet<AttributeValueId> {
        &self.allowed_value_ids
    }

    /// Whether the parent being set to `value_id` permits the dependent attribute
    pub fn allows(&self, value_id: &AttributeValueId) -> bool {
        self.allowed_value_ids.contains(value_id)
    }
}

/// A configurable dimension of a product.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    id: AttributeId,
    is_required: bool,
    depends_on: Option<Dependency>,
    values: SmallVec<[AttributeValue; 6]>,
}

impl Attribute {
    /// Create a required attribute with the given values
    pub fn required(
        id: impl Into<AttributeId>,
        values: impl IntoIterator<Item = AttributeValue>,
    ) -> Self {
        Self {
            id: id.into(),
            is_required: true,
            depends_on: None,
            values: values.into_iter().collect(),
        }
    }

    /// Create an optional attribute with the given values
    pub fn optional(
        id: impl Into<AttributeId>,
        values: impl IntoIterator<Item = AttributeValue>,
    ) -> Self {
        Self {
            is_required: false,
            ..Self::required(id, values)
        }
    }

    /// Attach a dependency on another attribute
    #[must_use]
    pub fn depending_on(mut self, dependency: Dependency) -> Self {
        self.depends_on = Some(dependency);
        self
    }

    /// Attribute identifier
    pub fn id(&self) -> &AttributeId {
        &self.id
    }

    /// Whether a selection must contain this attribute
    pub fn is_required(&self) -> bool {
        self.is_required
    }

    /// Dependency on a parent attribute, if any
    pub fn depends_on(&self) -> Option<&Dependency> {
        self.depends_on.as_ref()
    }

    /// Values in declared order
    pub fn values(&self) -> &[AttributeValue] {
        &self.values
    }

    /// Find a value by id
    pub fn value(&self, value_id: &str) -> Option<&AttributeValue> {
        self.values.iter().find(|value| value.id.as_str() == value_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_modifier_reads_as_zero_flat() {
        let value = AttributeValue::new("red");

        assert_eq!(value.price_modifier(), PriceModifier::Flat(Decimal::ZERO));
    }

    #[test]
    fn explicit_modifier_is_returned() {
        let value = AttributeValue::with_modifier("blue", PriceModifier::Percentage(Decimal::TEN));

        assert_eq!(value.price_modifier(), PriceModifier::Percentage(Decimal::TEN));
    }

    #[test]
    fn modifiers_display_like_fixture_strings() {
        assert_eq!(PriceModifier::Flat(Decimal::new(500, 2)).to_string(), "+5.00");
        assert_eq!(PriceModifier::Flat(Decimal::new(-25, 1)).to_string(), "-2.5");
        assert_eq!(PriceModifier::Percentage(Decimal::TEN).to_string(), "10%");
    }

    #[test]
    fn optional_attribute_is_not_required() {
        let attribute = Attribute::optional("engraving", [AttributeValue::new("yes")]);

        assert!(!attribute.is_required());
        assert!(attribute.value("yes").is_some());
        assert!(attribute.value("no").is_none());
    }

    #[test]
    fn dependency_allows_only_listed_parent_values() {
        let dependency = Dependency::new("frame", ["metal"]);

        assert!(dependency.allows(&AttributeValueId::from("metal")));
        assert!(!dependency.allows(&AttributeValueId::from("plastic")));
    }
}

//! Catalog Fixtures

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::{
    attributes::{Attribute, AttributeValue, Dependency},
    catalog::AttributeCatalog,
    combinations::Combination,
    configurator::{Product, ProductConfigurator},
    fixtures::{
        FixtureError,
        prices::{parse_modifier, parse_price},
    },
    ids::ProductId,
    pricing::{ModifierPolicy, ProductOverride},
};

/// Wrapper for a set of product catalogs in YAML
#[derive(Debug, Deserialize)]
pub struct CatalogsFixture {
    /// Map of product key -> product catalog payload
    pub products: FxHashMap<String, ProductFixture>,

    /// Per-product value price overrides
    #[serde(default)]
    pub overrides: Vec<OverrideFixture>,
}

/// One product's catalog payload
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product name
    pub name: String,

    /// List price (e.g., "20.00 EUR")
    pub price: String,

    /// Attributes in declared order
    pub attributes: Vec<AttributeFixture>,

    /// How percentage modifiers stack
    #[serde(default)]
    pub policy: ModifierPolicy,

    /// Valid combinations
    #[serde(default)]
    pub combinations: Vec<CombinationFixture>,
}

/// Attribute payload
#[derive(Debug, Deserialize)]
pub struct AttributeFixture {
    /// Attribute id
    pub id: String,

    /// Whether a value must be chosen
    #[serde(default)]
    pub required: bool,

    /// Parent attribute restriction
    #[serde(default)]
    pub depends_on: Option<DependencyFixture>,

    /// Values in declared order
    pub values: Vec<ValueFixture>,
}

/// Dependency payload
#[derive(Debug, Deserialize)]
pub struct DependencyFixture {
    /// Parent attribute id
    pub attribute: String,

    /// Parent values allowing the attribute
    pub values: Vec<String>,
}

/// Attribute value payload
#[derive(Debug, Deserialize)]
pub struct ValueFixture {
    /// Value id
    pub id: String,

    /// Price modifier (e.g., "10%" or "+5.00")
    #[serde(default)]
    pub modifier: Option<String>,
}

/// Combination payload
#[derive(Debug, Deserialize)]
pub struct CombinationFixture {
    /// Combination id
    pub id: String,

    /// Attribute id -> value id
    pub selections: BTreeMap<String, String>,

    /// Explicit price replacing the computed one (e.g., "24.99 EUR")
    #[serde(default)]
    pub price: Option<String>,
}

/// Override payload
#[derive(Debug, Deserialize)]
pub struct OverrideFixture {
    /// Product key the override applies to
    pub product: String,

    /// Overridden value id
    pub value: String,

    /// Amount added in place of the value's modifier (e.g., "3.00 EUR")
    pub price: String,
}

impl TryFrom<AttributeFixture> for Attribute {
    type Error = FixtureError;

    fn try_from(fixture: AttributeFixture) -> Result<Self, Self::Error> {
        let values = fixture
            .values
            .into_iter()
            .map(|value| match value.modifier {
                Some(modifier) => Ok(AttributeValue::with_modifier(
                    value.id,
                    parse_modifier(&modifier)?,
                )),
                None => Ok(AttributeValue::new(value.id)),
            })
            .collect::<Result<Vec<_>, FixtureError>>()?;

        let attribute = if fixture.required {
            Attribute::required(fixture.id, values)
        } else {
            Attribute::optional(fixture.id, values)
        };

        Ok(match fixture.depends_on {
            Some(dependency) => {
                attribute.depending_on(Dependency::new(dependency.attribute, dependency.values))
            }
            None => attribute,
        })
    }
}

impl TryFrom<CombinationFixture> for Combination<'static> {
    type Error = FixtureError;

    fn try_from(fixture: CombinationFixture) -> Result<Self, Self::Error> {
        let combination = Combination::new(fixture.id, fixture.selections);

        match fixture.price {
            Some(price) => Ok(combination.with_explicit_price(parse_price(&price)?)),
            None => Ok(combination),
        }
    }
}

impl TryFrom<OverrideFixture> for ProductOverride<'static> {
    type Error = FixtureError;

    fn try_from(fixture: OverrideFixture) -> Result<Self, Self::Error> {
        Ok(ProductOverride {
            product_id: fixture.product.into(),
            attribute_value_id: fixture.value.into(),
            override_price: parse_price(&fixture.price)?,
        })
    }
}

impl ProductFixture {
    /// Build a configurator for this product.
    ///
    /// # Errors
    ///
    /// Returns an error if a price or modifier cannot be parsed, or if the catalog or
    /// combinations are invalid.
    pub fn try_into_configurator(
        self,
        key: &str,
        overrides: &[ProductOverride<'static>],
    ) -> Result<ProductConfigurator<'static>, FixtureError> {
        let product = Product {
            id: ProductId::from(key),
            name: self.name,
            base_price: parse_price(&self.price)?,
        };

        let attributes = self
            .attributes
            .into_iter()
            .map(Attribute::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let combinations = self
            .combinations
            .into_iter()
            .map(Combination::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let catalog = AttributeCatalog::new(attributes)?;

        let configurator =
            ProductConfigurator::new(product, catalog, combinations, overrides.iter().cloned())?;

        Ok(configurator.with_policy(self.policy))
    }
}

//! Product Configurator
//!
//! Binds everything known about one product (list price, catalog, combinations and
//! overrides) so a host can validate, filter and price selections without passing
//! the pieces around, and turns a finished selection into an order line.

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    availability::{AttributeAvailability, AvailabilityResolver, ValueAvailability},
    catalog::{AttributeCatalog, CatalogError},
    combinations::{Combination, CombinationError, CombinationIndex},
    ids::{CombinationId, ProductId},
    pricing::{
        ModifierPolicy, PriceBreakdown, PriceResolver, PricingError, ProductOverride,
        ProductOverrides,
    },
    selection::Selection,
    validation::{ValidationError, ValidationResult, validate},
};

/// Errors raised by the configurator.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfiguratorError {
    /// The selection is incomplete or breaks a dependency rule.
    #[error("selection is not valid: {0:?}")]
    InvalidSelection(SmallVec<[ValidationError; 2]>),

    /// A complete, valid selection matches no combination.
    #[error("no combination of product {product_id} matches the selection")]
    NoMatchingCombination {
        /// Product being configured
        product_id: ProductId,

        /// The unmatched selection
        selection: Selection,
    },

    /// A combination carries an explicit price in a different currency.
    #[error("combination {combination_id} is priced in {found}, product is priced in {expected}")]
    CurrencyMismatch {
        /// Offending combination
        combination_id: CombinationId,

        /// Product currency
        expected: &'static str,

        /// Combination currency
        found: &'static str,
    },

    /// Combinations could not be indexed.
    #[error(transparent)]
    Combination(#[from] CombinationError),

    /// A catalog lookup failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Price resolution failed.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// A configurable product
#[derive(Debug, Clone, PartialEq)]
pub struct Product<'a> {
    /// Product identifier
    pub id: ProductId,

    /// Display name
    pub name: String,

    /// List price before any attribute adjustments
    pub base_price: Money<'a, Currency>,
}

/// A resolved SKU and unit price, ready to be added to an order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLine<'a> {
    /// Matched combination
    pub combination_id: CombinationId,

    /// Unit price
    pub resolved_price: Money<'a, Currency>,
}

/// Validation, availability and pricing for one product.
#[derive(Debug, Clone)]
pub struct ProductConfigurator<'a> {
    product: Product<'a>,
    catalog: AttributeCatalog,
    index: CombinationIndex<'a>,
    overrides: ProductOverrides<'a>,
    resolver: PriceResolver,
}

impl<'a> ProductConfigurator<'a> {
    /// Bind a product to its catalog, combinations and overrides.
    ///
    /// Overrides belonging to other products are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ConfiguratorError::Combination`] if the combinations do not fit the
    /// catalog, or [`ConfiguratorError::CurrencyMismatch`] if an explicit price is not
    /// in the product's currency.
    pub fn new(
        product: Product<'a>,
        catalog: AttributeCatalog,
        combinations: impl IntoIterator<Item = Combination<'a>>,
        overrides: impl IntoIterator<Item = ProductOverride<'a>>,
    ) -> Result<Self, ConfiguratorError> {
        let index = CombinationIndex::new(&catalog, combinations)?;
        let currency = product.base_price.currency();

        if let Some((combination, price)) = index.iter().find_map(|combination| {
            combination
                .explicit_price()
                .filter(|price| price.currency() != currency)
                .map(|price| (combination, price))
        }) {
            return Err(ConfiguratorError::CurrencyMismatch {
                combination_id: combination.id().clone(),
                expected: currency.iso_alpha_code,
                found: price.currency().iso_alpha_code,
            });
        }

        let overrides = ProductOverrides::for_product(&product.id, overrides);

        debug!(
            product_id = %product.id,
            attributes = catalog.len(),
            combinations = index.len(),
            overrides = overrides.len(),
            "configured product"
        );

        Ok(Self {
            product,
            catalog,
            index,
            overrides,
            resolver: PriceResolver::default(),
        })
    }

    /// Use a different percentage modifier policy
    #[must_use]
    pub fn with_policy(mut self, policy: ModifierPolicy) -> Self {
        self.resolver = PriceResolver::new(policy);
        self
    }

    /// The percentage modifier policy in use
    pub fn policy(&self) -> ModifierPolicy {
        self.resolver.policy()
    }

    /// The configured product
    pub fn product(&self) -> &Product<'a> {
        &self.product
    }

    /// The product's attribute catalog
    pub fn catalog(&self) -> &AttributeCatalog {
        &self.catalog
    }

    /// The product's combinations
    pub fn index(&self) -> &CombinationIndex<'a> {
        &self.index
    }

    /// Overrides applying to this product
    pub fn overrides(&self) -> &ProductOverrides<'a> {
        &self.overrides
    }

    /// Choose a value, rejecting ids the catalog does not know.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] for unknown attribute or value ids.
    pub fn select(
        &self,
        selection: &Selection,
        attribute_id: &str,
        value_id: &str,
    ) -> Result<Selection, CatalogError> {
        self.catalog.select(selection, attribute_id, value_id)
    }

    /// Check required attributes and dependency rules.
    pub fn validate(&self, selection: &Selection) -> ValidationResult {
        validate(selection, &self.catalog)
    }

    /// Availability of every value of `target`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::AttributeNotFound`] for an unknown attribute.
    pub fn available_values(
        &self,
        selection: &Selection,
        target: &str,
    ) -> Result<Vec<ValueAvailability<'_>>, CatalogError> {
        AvailabilityResolver::new(&self.catalog, &self.index).available_values(selection, target)
    }

    /// Availability of every attribute, in catalog order.
    pub fn availability(&self, selection: &Selection) -> Vec<AttributeAvailability<'_>> {
        AvailabilityResolver::new(&self.catalog, &self.index).availability(selection)
    }

    /// Unit price of a complete selection, without requiring a matching combination.
    ///
    /// # Errors
    ///
    /// See [`PriceResolver::resolve_price`].
    pub fn price(&self, selection: &Selection) -> Result<Money<'a, Currency>, PricingError> {
        self.resolver.resolve_price(
            selection,
            &self.catalog,
            &self.overrides,
            &self.index,
            self.product.base_price,
        )
    }

    /// Every pricing step for a complete selection.
    ///
    /// # Errors
    ///
    /// See [`PriceResolver::resolve_price`].
    pub fn price_breakdown(&self, selection: &Selection) -> Result<PriceBreakdown<'a>, PricingError> {
        self.resolver.breakdown(
            selection,
            &self.catalog,
            &self.overrides,
            &self.index,
            self.product.base_price,
        )
    }

    /// Resolve a finished selection to a combination and unit price.
    ///
    /// # Errors
    ///
    /// - [`ConfiguratorError::InvalidSelection`]: the selection fails validation.
    /// - [`ConfiguratorError::NoMatchingCombination`]: no SKU matches it.
    /// - [`ConfiguratorError::Pricing`]: price resolution failed.
    #[tracing::instrument(
        name = "configurator.resolve",
        skip_all,
        fields(product_id = %self.product.id, selected = selection.len())
    )]
    pub fn resolve(&self, selection: &Selection) -> Result<ResolvedLine<'a>, ConfiguratorError> {
        let validation = self.validate(selection);

        if !validation.is_valid() {
            return Err(ConfiguratorError::InvalidSelection(validation.into_errors()));
        }

        let Some(combination) = self.index.find_exact(selection) else {
            warn!(?selection, "no combination matches a valid selection");

            return Err(ConfiguratorError::NoMatchingCombination {
                product_id: self.product.id.clone(),
                selection: selection.clone(),
            });
        };

        let resolved_price = self.price(selection)?;

        debug!(combination_id = %combination.id(), %resolved_price, "resolved order line");

        Ok(ResolvedLine {
            combination_id: combination.id().clone(),
            resolved_price,
        })
    }
}

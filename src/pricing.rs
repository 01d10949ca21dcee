//! Pricing
//!
//! Resolves the unit price of a complete selection. Three tiers are applied in a
//! fixed order, each one a separate function:
//!
//! 1. the product's list price,
//! 2. a contribution per selected value: its global [`PriceModifier`], or the
//!    product-level [`ProductOverride`] for that value when one exists,
//! 3. the combination's explicit price, which replaces everything above.
//!
//! All arithmetic is done in [`Decimal`]; the result is rounded to the currency's
//! minor units once, at the very end.

use clap::ValueEnum;
use rust_decimal::{Decimal, RoundingStrategy};
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    attributes::PriceModifier,
    catalog::{AttributeCatalog, CatalogError},
    combinations::CombinationIndex,
    ids::{AttributeId, AttributeValueId, CombinationId, ProductId},
    selection::Selection,
};

/// Errors that can occur while resolving a price.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PricingError {
    /// Required attributes have not been chosen yet.
    #[error("selection is incomplete, missing: {missing:?}")]
    IncompleteSelection {
        /// Required attributes without a value
        missing: Vec<AttributeId>,
    },

    /// The selection references an id the catalog does not define.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// An override or explicit price is in a different currency from the base price.
    #[error("price in {found} cannot be combined with base price in {expected}")]
    CurrencyMismatch {
        /// Currency of the base price
        expected: &'static str,

        /// Currency that was found
        found: &'static str,
    },

    /// Decimal arithmetic overflowed.
    #[error("price arithmetic overflowed")]
    Overflow,
}

/// How percentage modifiers are applied when more than one is selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ModifierPolicy {
    /// Each percentage applies to the running price, after earlier attributes.
    #[default]
    Compounding,

    /// Every percentage applies to the list price.
    BasePrice,
}

/// A per-product price for one attribute value, superseding its global modifier.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductOverride<'a> {
    /// Product the override belongs to
    pub product_id: ProductId,

    /// Value whose contribution is replaced
    pub attribute_value_id: AttributeValueId,

    /// Amount added in place of the value's modifier
    pub override_price: Money<'a, Currency>,
}

/// The overrides that apply to a single product.
#[derive(Debug, Clone, Default)]
pub struct ProductOverrides<'a> {
    prices: FxHashMap<AttributeValueId, Money<'a, Currency>>,
}

impl<'a> ProductOverrides<'a> {
    /// No overrides
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the overrides for `product_id`, dropping those of other products.
    ///
    /// If a value is overridden more than once the last entry wins.
    pub fn for_product(
        product_id: &ProductId,
        overrides: impl IntoIterator<Item = ProductOverride<'a>>,
    ) -> Self {
        Self {
            prices: overrides
                .into_iter()
                .filter(|entry| &entry.product_id == product_id)
                .map(|entry| (entry.attribute_value_id, entry.override_price))
                .collect(),
        }
    }

    /// Override price for `value_id`, if any
    pub fn get(&self, value_id: &str) -> Option<&Money<'a, Currency>> {
        self.prices.get(value_id)
    }

    /// Number of overridden values
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Whether no value is overridden
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

/// Where a value's contribution came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustmentSource {
    /// The value's global modifier
    Modifier(PriceModifier),

    /// A product-level override
    Override,
}

/// The amount one selected value added to the running price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjustment {
    /// Attribute of the selected value
    pub attribute_id: AttributeId,

    /// Selected value
    pub value_id: AttributeValueId,

    /// Modifier or override that produced the amount
    pub source: AdjustmentSource,

    /// Unrounded amount added
    pub amount: Decimal,
}

/// Every step of a price resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBreakdown<'a> {
    /// List price
    pub base: Decimal,

    /// Per-value contributions, in catalog order
    pub adjustments: SmallVec<[Adjustment; 4]>,

    /// Price after modifiers and overrides, unrounded
    pub computed: Decimal,

    /// Combination whose explicit price replaced the computed one
    pub explicit: Option<(CombinationId, Decimal)>,

    /// Final, rounded unit price
    pub total: Money<'a, Currency>,
}

/// Resolves unit prices.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceResolver {
    policy: ModifierPolicy,
}

impl PriceResolver {
    /// A resolver using the given modifier policy
    pub fn new(policy: ModifierPolicy) -> Self {
        Self { policy }
    }

    /// The modifier policy in use
    pub fn policy(&self) -> ModifierPolicy {
        self.policy
    }

    /// Resolve the unit price of a complete selection.
    ///
    /// # Errors
    ///
    /// - [`PricingError::IncompleteSelection`]: a required attribute has no value.
    /// - [`PricingError::Catalog`]: the selection references an unknown id.
    /// - [`PricingError::CurrencyMismatch`]: an override or explicit price is not in the
    ///   base price's currency.
    /// - [`PricingError::Overflow`]: decimal arithmetic overflowed.
    pub fn resolve_price<'a>(
        &self,
        selection: &Selection,
        catalog: &AttributeCatalog,
        overrides: &ProductOverrides<'a>,
        index: &CombinationIndex<'a>,
        base_price: Money<'a, Currency>,
    ) -> Result<Money<'a, Currency>, PricingError> {
        self.breakdown(selection, catalog, overrides, index, base_price)
            .map(|breakdown| breakdown.total)
    }

    /// Resolve the unit price, keeping the contribution of every tier.
    ///
    /// # Errors
    ///
    /// See [`PriceResolver::resolve_price`].
    pub fn breakdown<'a>(
        &self,
        selection: &Selection,
        catalog: &AttributeCatalog,
        overrides: &ProductOverrides<'a>,
        index: &CombinationIndex<'a>,
        base_price: Money<'a, Currency>,
    ) -> Result<PriceBreakdown<'a>, PricingError> {
        ensure_complete(selection, catalog)?;

        let currency = base_price.currency();
        let base = list_price(&base_price);
        let adjustments = value_adjustments(selection, catalog, overrides, base, currency, self.policy)?;

        let computed = adjustments
            .iter()
            .try_fold(base, |running, adjustment| running.checked_add(adjustment.amount))
            .ok_or(PricingError::Overflow)?;

        let explicit = index
            .find_exact(selection)
            .and_then(|combination| {
                combination
                    .explicit_price()
                    .map(|price| (combination.id(), price))
            })
            .map(|(id, price)| to_decimal(price, currency).map(|price| (id.clone(), price)))
            .transpose()?;

        let total = round_to_currency(combination_price(computed, explicit.as_ref()), currency)?;

        Ok(PriceBreakdown {
            base,
            adjustments,
            computed,
            explicit,
            total,
        })
    }
}

/// Resolve the unit price of a complete selection with compounding modifiers.
///
/// # Errors
///
/// See [`PriceResolver::resolve_price`].
pub fn resolve_price<'a>(
    selection: &Selection,
    catalog: &AttributeCatalog,
    overrides: &ProductOverrides<'a>,
    index: &CombinationIndex<'a>,
    base_price: Money<'a, Currency>,
) -> Result<Money<'a, Currency>, PricingError> {
    PriceResolver::default().resolve_price(selection, catalog, overrides, index, base_price)
}

/// Tier 1: the list price as a decimal.
pub fn list_price(base_price: &Money<'_, Currency>) -> Decimal {
    *base_price.amount()
}

/// Tier 2: the contribution of every selected value, in catalog order.
///
/// A product override replaces the value's modifier outright; its price is added
/// as a flat amount.
///
/// # Errors
///
/// Returns [`PricingError::Catalog`] for unknown ids, [`PricingError::CurrencyMismatch`]
/// for overrides in another currency and [`PricingError::Overflow`] on overflow.
pub fn value_adjustments(
    selection: &Selection,
    catalog: &AttributeCatalog,
    overrides: &ProductOverrides<'_>,
    base: Decimal,
    currency: &Currency,
    policy: ModifierPolicy,
) -> Result<SmallVec<[Adjustment; 4]>, PricingError> {
    for (attribute_id, _) in selection {
        catalog.attribute(attribute_id.as_str())?;
    }

    let mut running = base;
    let mut adjustments = SmallVec::new();

    for attribute in catalog.attributes() {
        let Some(value_id) = selection.get(attribute.id().as_str()) else {
            continue;
        };

        let value = catalog.value(attribute.id().as_str(), value_id.as_str())?;

        let (source, amount) = match overrides.get(value_id.as_str()) {
            Some(price) => (AdjustmentSource::Override, to_decimal(price, currency)?),
            None => {
                let modifier = value.price_modifier();
                let amount = modifier_amount(modifier, running, base, policy)?;

                (AdjustmentSource::Modifier(modifier), amount)
            }
        };

        running = running.checked_add(amount).ok_or(PricingError::Overflow)?;

        adjustments.push(Adjustment {
            attribute_id: attribute.id().clone(),
            value_id: value_id.clone(),
            source,
            amount,
        });
    }

    Ok(adjustments)
}

/// The amount a modifier adds given the running and list prices.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the percentage cannot be represented.
pub fn modifier_amount(
    modifier: PriceModifier,
    running: Decimal,
    base: Decimal,
    policy: ModifierPolicy,
) -> Result<Decimal, PricingError> {
    match modifier {
        PriceModifier::Flat(amount) => Ok(amount),
        PriceModifier::Percentage(percent) => {
            let basis = match policy {
                ModifierPolicy::Compounding => running,
                ModifierPolicy::BasePrice => base,
            };

            basis
                .checked_mul(percent)
                .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
                .ok_or(PricingError::Overflow)
        }
    }
}

/// Tier 3: an explicit combination price replaces the computed price.
pub fn combination_price(computed: Decimal, explicit: Option<&(CombinationId, Decimal)>) -> Decimal {
    explicit.map_or(computed, |&(_, price)| price)
}

/// Round to the currency's minor units, half away from zero.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the amount does not fit in minor units.
pub fn round_to_currency<'a>(
    amount: Decimal,
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, PricingError> {
    let mut rounded =
        amount.round_dp_with_strategy(currency.exponent, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(currency.exponent);

    let minor = i64::try_from(rounded.mantissa()).map_err(|_err| PricingError::Overflow)?;

    Ok(Money::from_minor(minor, currency))
}

fn ensure_complete(selection: &Selection, catalog: &AttributeCatalog) -> Result<(), PricingError> {
    let missing: Vec<AttributeId> = catalog
        .required_attribute_ids()
        .iter()
        .filter(|attribute_id| !selection.contains(attribute_id.as_str()))
        .cloned()
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(PricingError::IncompleteSelection { missing })
    }
}

fn to_decimal(price: &Money<'_, Currency>, currency: &Currency) -> Result<Decimal, PricingError> {
    if price.currency() != currency {
        return Err(PricingError::CurrencyMismatch {
            expected: currency.iso_alpha_code,
            found: price.currency().iso_alpha_code,
        });
    }

    Ok(*price.amount())
}

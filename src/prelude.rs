//! Varietal prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    attributes::{Attribute, AttributeValue, Dependency, PriceModifier},
    availability::{AttributeAvailability, AvailabilityResolver, ValueAvailability},
    catalog::{AttributeCatalog, CatalogError, InvalidCatalog},
    combinations::{AttributeSelection, Combination, CombinationError, CombinationIndex},
    configurator::{ConfiguratorError, Product, ProductConfigurator, ResolvedLine},
    ids::{AttributeId, AttributeValueId, CombinationId, ProductId},
    pricing::{
        Adjustment, AdjustmentSource, ModifierPolicy, PriceBreakdown, PriceResolver,
        PricingError, ProductOverride, ProductOverrides,
    },
    selection::Selection,
    validation::{SelectionValidator, ValidationError, ValidationResult},
};

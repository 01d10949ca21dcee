//! Property checks over every product in the bundled fixture sets.
//!
//! Catalogs are small enough to enumerate every partial selection, so each property
//! is checked exhaustively rather than sampled.

use rustc_hash::FxHashSet;
use testresult::TestResult;

use varietal::{
    configurator::ProductConfigurator,
    fixtures::Fixture,
    ids::AttributeValueId,
    pricing::ProductOverride,
    selection::Selection,
    validation::ValidationError,
};

const SETS: [&str; 2] = ["apparel", "eyewear"];

fn each_product(mut check: impl FnMut(&ProductConfigurator<'static>) -> TestResult) -> TestResult {
    for set in SETS {
        let fixture = Fixture::from_set(set)?;

        for key in fixture.keys() {
            check(fixture.configurator(key)?)?;
        }
    }

    Ok(())
}

/// Every selection choosing zero or one value per attribute.
fn partial_selections(configurator: &ProductConfigurator<'_>) -> Vec<Selection> {
    let mut partials = vec![Selection::new()];

    for attribute in configurator.catalog().attributes() {
        let extended: Vec<Selection> = partials
            .iter()
            .flat_map(|partial| {
                attribute
                    .values()
                    .iter()
                    .map(|value| partial.with(attribute.id().clone(), value.id().clone()))
            })
            .collect();

        partials.extend(extended);
    }

    partials
}

fn available(
    configurator: &ProductConfigurator<'_>,
    partial: &Selection,
    target: &str,
) -> TestResult<FxHashSet<AttributeValueId>> {
    Ok(configurator
        .available_values(partial, target)?
        .into_iter()
        .filter(|availability| availability.is_available)
        .map(|availability| availability.value.id().clone())
        .collect())
}

#[test]
fn adding_a_choice_never_widens_availability() -> TestResult {
    each_product(|configurator| {
        let catalog = configurator.catalog();

        for partial in partial_selections(configurator) {
            for attribute in catalog.attributes().filter(|other| !partial.contains(other.id().as_str())) {
                for value in attribute.values() {
                    let narrower = partial.with(attribute.id().clone(), value.id().clone());

                    for target in catalog.attributes().filter(|other| other.id() != attribute.id()) {
                        let before = available(configurator, &partial, target.id().as_str())?;
                        let after = available(configurator, &narrower, target.id().as_str())?;

                        assert!(
                            after.is_subset(&before),
                            "{}: choosing {}={} widened {} from {before:?} to {after:?}",
                            configurator.product().id,
                            attribute.id(),
                            value.id(),
                            target.id(),
                        );
                    }
                }
            }
        }

        Ok(())
    })
}

#[test]
fn available_values_lead_to_a_compatible_combination() -> TestResult {
    each_product(|configurator| {
        for partial in partial_selections(configurator) {
            for attribute in configurator.catalog().attributes() {
                for value_id in available(configurator, &partial, attribute.id().as_str())? {
                    let chosen = partial
                        .without(attribute.id().as_str())
                        .with(attribute.id().clone(), value_id.clone());

                    assert!(
                        configurator
                            .index()
                            .iter()
                            .any(|combination| chosen.is_subset_of(combination.selection())),
                        "{}: {}={value_id} is available but leads nowhere",
                        configurator.product().id,
                        attribute.id(),
                    );
                }
            }
        }

        Ok(())
    })
}

#[test]
fn available_values_never_break_a_dependency() -> TestResult {
    each_product(|configurator| {
        for partial in partial_selections(configurator) {
            for attribute in configurator.catalog().attributes() {
                for value_id in available(configurator, &partial, attribute.id().as_str())? {
                    let chosen = partial.with(attribute.id().clone(), value_id.clone());

                    let violations: Vec<_> = configurator
                        .validate(&chosen)
                        .into_errors()
                        .into_iter()
                        .filter(|error| matches!(error, ValidationError::DependencyViolation { .. }))
                        .collect();

                    assert!(
                        violations.is_empty(),
                        "{}: {}={value_id} is available given {partial:?} but gives {violations:?}",
                        configurator.product().id,
                        attribute.id(),
                    );
                }
            }
        }

        Ok(())
    })
}

#[test]
fn every_combination_is_found_from_its_own_selection() -> TestResult {
    each_product(|configurator| {
        for combination in configurator.index().iter() {
            let found = configurator.index().find_exact(combination.selection());

            assert_eq!(found.map(|found| found.id()), Some(combination.id()));
        }

        Ok(())
    })
}

#[test]
fn resolution_is_deterministic() -> TestResult {
    each_product(|configurator| {
        for combination in configurator.index().iter() {
            let forwards: Selection = combination
                .attribute_selections()
                .iter()
                .map(|entry| (entry.attribute_id.clone(), entry.attribute_value_id.clone()))
                .collect();

            let backwards: Selection = combination
                .attribute_selections()
                .iter()
                .rev()
                .map(|entry| (entry.attribute_id.clone(), entry.attribute_value_id.clone()))
                .collect();

            assert_eq!(forwards, backwards);
            assert_eq!(configurator.price(&forwards)?, configurator.price(&backwards)?);
            assert_eq!(configurator.resolve(&forwards)?, configurator.resolve(&forwards)?);
            assert_eq!(
                configurator.availability(&forwards),
                configurator.availability(&backwards)
            );
        }

        Ok(())
    })
}

#[test]
fn explicit_price_wins_over_overrides_and_modifiers() -> TestResult {
    each_product(|configurator| {
        for combination in configurator.index().iter() {
            let Some(explicit) = combination.explicit_price() else {
                continue;
            };

            let product = configurator.product().clone();

            // Override every value of the combination, the explicit price must still win.
            let overrides: Vec<ProductOverride<'static>> = combination
                .attribute_selections()
                .iter()
                .map(|entry| ProductOverride {
                    product_id: product.id.clone(),
                    attribute_value_id: entry.attribute_value_id.clone(),
                    override_price: product.base_price,
                })
                .collect();

            let overridden = ProductConfigurator::new(
                product,
                configurator.catalog().clone(),
                configurator.index().iter().cloned(),
                overrides,
            )?;

            let line = overridden.resolve(combination.selection())?;

            assert_eq!(&line.resolved_price, explicit);
        }

        Ok(())
    })
}

//! Integration tests for loading the bundled fixture sets.

use rusty_money::{
    Money,
    iso::{EUR, USD},
};
use testresult::TestResult;

use varietal::{
    fixtures::{Fixture, FixtureError},
    pricing::ModifierPolicy,
};

#[test]
fn apparel_set_loads_products_and_overrides() -> TestResult {
    let fixture = Fixture::from_set("apparel")?;

    assert_eq!(fixture.keys(), ["hoodie", "tshirt"]);

    let tshirt = fixture.configurator("tshirt")?;

    assert_eq!(tshirt.product().name, "Classic T-Shirt");
    assert_eq!(tshirt.product().base_price, Money::from_minor(2000, EUR));
    assert_eq!(tshirt.catalog().len(), 3);
    assert_eq!(tshirt.catalog().required_attribute_ids().len(), 2);
    assert_eq!(tshirt.index().len(), 8);
    assert_eq!(tshirt.overrides().len(), 1);

    Ok(())
}

#[test]
fn eyewear_set_loads_policies() -> TestResult {
    let fixture = Fixture::from_set("eyewear")?;

    let aviator = fixture.configurator("aviator")?;
    let wayfarer = fixture.configurator("wayfarer")?;

    assert_eq!(aviator.policy(), ModifierPolicy::Compounding);
    assert_eq!(wayfarer.policy(), ModifierPolicy::BasePrice);
    assert_eq!(wayfarer.product().base_price, Money::from_minor(12000, USD));

    Ok(())
}

#[test]
fn sets_load_side_by_side() -> TestResult {
    let mut fixture = Fixture::new();

    fixture.load_catalogs("apparel")?.load_catalogs("eyewear")?;

    assert_eq!(fixture.len(), 4);

    Ok(())
}

#[test]
fn unknown_set_is_an_io_error() {
    let result = Fixture::from_set("does-not-exist");

    assert!(matches!(result, Err(FixtureError::Io(_))));
}

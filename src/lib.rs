//! Varietal
//!
//! Varietal is a product variant configuration engine: it validates attribute
//! selections, works out which values can still lead to a purchasable combination,
//! and resolves the unit price of a finished selection.

pub mod attributes;
pub mod availability;
pub mod catalog;
pub mod combinations;
pub mod configurator;
pub mod fixtures;
pub mod ids;
pub mod prelude;
pub mod pricing;
pub mod report;
pub mod selection;
pub mod utils;
pub mod validation;

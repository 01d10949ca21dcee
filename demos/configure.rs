//! Product Configurator Example
//!
//! This example walks a product through a selection, one choice at a time, showing
//! which values remain available after each step and how the final price is built.
//!
//! Use `-f` to load a fixture set by name
//! Use `-p` to pick a product from the set
//! Use `-s attribute=value` (repeatable) to choose values in order
//! Use `--policy` to override how percentage modifiers stack

use std::{io, io::Write, time::Instant};

use anyhow::Result;
use clap::Parser;
use humanize_duration::{Truncate, prelude::DurationExt};
use tracing_subscriber::EnvFilter;

use varietal::{
    fixtures::Fixture,
    report::{write_availability, write_breakdown},
    selection::Selection,
    utils::ExampleConfiguratorArgs,
};

/// Product Configurator Example
#[expect(clippy::print_stdout, reason = "Example program output to user")]
pub fn main() -> Result<()> {
    let args = ExampleConfiguratorArgs::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_err| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let fixture = Fixture::from_set(&args.fixture)?;

    let mut configurator = fixture.configurator(&args.product)?.clone();

    if let Some(policy) = args.policy {
        configurator = configurator.with_policy(policy);
    }

    let product = configurator.product();

    println!("\n {} ({}), list price {}", product.name, product.id, product.base_price);

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    let start = Instant::now();
    let mut selection = Selection::new();

    for (attribute_id, value_id) in &args.selections {
        selection = configurator.select(&selection, attribute_id, value_id)?;

        writeln!(handle, "\n Chose {attribute_id}={value_id}")?;

        write_availability(&mut handle, &configurator.availability(&selection), &selection)?;
    }

    if args.selections.is_empty() {
        write_availability(&mut handle, &configurator.availability(&selection), &selection)?;
    }

    let validation = configurator.validate(&selection);

    for error in validation.errors() {
        writeln!(handle, " ! {error}")?;
    }

    if validation.is_valid() {
        write_breakdown(&mut handle, &configurator.price_breakdown(&selection)?)?;

        match configurator.resolve(&selection) {
            Ok(line) => writeln!(
                handle,
                " Resolved {} at {}",
                line.combination_id, line.resolved_price
            )?,
            Err(error) => writeln!(handle, " ! {error}")?,
        }
    }

    let elapsed = start.elapsed();

    writeln!(
        handle,
        "\n {} ({}s)",
        elapsed.human(Truncate::Nano),
        elapsed.as_secs_f32()
    )?;

    Ok(())
}

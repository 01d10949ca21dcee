//! Utils

use clap::Parser;

use crate::{pricing::ModifierPolicy, selection::Selection};

/// Arguments for the configurator examples
#[derive(Debug, Parser)]
pub struct ExampleConfiguratorArgs {
    /// Fixture set to load catalogs from
    #[clap(short, long, default_value = "apparel")]
    pub fixture: String,

    /// Product key within the fixture set
    #[clap(short, long, default_value = "tshirt")]
    pub product: String,

    /// Attribute choice as `attribute=value`, applied in order (repeatable)
    #[clap(short, long = "select", value_parser = parse_choice)]
    pub selections: Vec<(String, String)>,

    /// Override the product's percentage modifier policy
    #[clap(long, value_enum)]
    pub policy: Option<ModifierPolicy>,
}

impl ExampleConfiguratorArgs {
    /// Choices collected into a selection
    pub fn selection(&self) -> Selection {
        self.selections
            .iter()
            .map(|(attribute_id, value_id)| (attribute_id.as_str(), value_id.as_str()))
            .collect()
    }
}

/// Parse an `attribute=value` pair.
///
/// # Errors
///
/// Returns an error message if either side of the `=` is missing or empty.
pub fn parse_choice(s: &str) -> Result<(String, String), String> {
    match s.split_once('=').map(|(attribute_id, value_id)| (attribute_id.trim(), value_id.trim())) {
        Some((attribute_id, value_id)) if !attribute_id.is_empty() && !value_id.is_empty() => {
            Ok((attribute_id.to_string(), value_id.to_string()))
        }
        _ => Err(format!("expected ATTRIBUTE=VALUE, got: {s}")),
    }
}

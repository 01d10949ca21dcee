//! Report
//!
//! Terminal tables for a selection in progress: which values can still be chosen,
//! and how the unit price was built up.

use std::io;

use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    availability::AttributeAvailability,
    pricing::{AdjustmentSource, PriceBreakdown, PricingError, round_to_currency},
    selection::Selection,
};

/// Errors that can occur when writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// An amount could not be rounded for display.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// Write one row per attribute value, marking chosen and unavailable values.
///
/// # Errors
///
/// Returns [`ReportError::IO`] if the output cannot be written.
pub fn write_availability(
    mut out: impl io::Write,
    availability: &[AttributeAvailability<'_>],
    selection: &Selection,
) -> Result<(), ReportError> {
    let mut builder = Builder::default();
    let mut boundary_rows: SmallVec<[usize; 8]> = SmallVec::new();
    let mut color_ops: SmallVec<[(usize, usize, Color); 32]> = SmallVec::new();

    builder.push_record(["", "Attribute", "Value", "Modifier", "Available"]);

    let mut row = 1;

    for entry in availability {
        boundary_rows.push(row);

        let chosen = selection.get(entry.attribute.id().as_str());

        for (position, value) in entry.values.iter().enumerate() {
            let is_chosen = chosen == Some(value.value.id());

            let attribute = if position == 0 {
                if entry.attribute.is_required() {
                    format!("{}*", entry.attribute.id())
                } else {
                    entry.attribute.id().to_string()
                }
            } else {
                String::new()
            };

            builder.push_record([
                if is_chosen { "●" } else { "" }.to_string(),
                attribute,
                value.value.id().to_string(),
                value.value.price_modifier().to_string(),
                if value.is_available { "yes" } else { "no" }.to_string(),
            ]);

            if is_chosen {
                color_ops.push((row, 2, Color::FG_GREEN));
            } else if !value.is_available {
                color_ops.push((row, 2, color_dark_grey()));
                color_ops.push((row, 4, color_dark_grey()));
            }

            row += 1;
        }
    }

    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();

    for &boundary in &boundary_rows {
        theme.insert_horizontal_line(boundary, separator);
    }

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..4), Alignment::right());

    for (row, col, color) in color_ops {
        table.modify((row, col), color);
    }

    writeln!(out, "\n{table}").map_err(|_err| ReportError::IO)
}

/// Write each pricing step and the final unit price.
///
/// # Errors
///
/// Returns [`ReportError::Pricing`] if an amount cannot be rounded for display, or
/// [`ReportError::IO`] if the output cannot be written.
pub fn write_breakdown(
    mut out: impl io::Write,
    breakdown: &PriceBreakdown<'_>,
) -> Result<(), ReportError> {
    let currency = breakdown.total.currency();
    let mut builder = Builder::default();

    builder.push_record(["Step", "Source", "Amount"]);
    builder.push_record([
        "List price".to_string(),
        String::new(),
        display(breakdown.base, currency)?,
    ]);

    for adjustment in &breakdown.adjustments {
        let source = match adjustment.source {
            AdjustmentSource::Modifier(modifier) => modifier.to_string(),
            AdjustmentSource::Override => "override".to_string(),
        };

        builder.push_record([
            format!("{}={}", adjustment.attribute_id, adjustment.value_id),
            source,
            display(adjustment.amount, currency)?,
        ]);
    }

    builder.push_record([
        "Computed".to_string(),
        String::new(),
        display(breakdown.computed, currency)?,
    ]);

    if let Some((combination_id, price)) = &breakdown.explicit {
        builder.push_record([
            "Explicit price".to_string(),
            combination_id.to_string(),
            display(*price, currency)?,
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..3), Alignment::right());

    writeln!(out, "\n{table}").map_err(|_err| ReportError::IO)?;
    writeln!(out, " \x1b[1mUnit price:\x1b[0m {}", breakdown.total).map_err(|_err| ReportError::IO)
}

fn display(amount: Decimal, currency: &Currency) -> Result<String, ReportError> {
    Ok(round_to_currency(amount, currency)?.to_string())
}

/// ANSI dark grey foreground.
fn color_dark_grey() -> Color {
    Color::new("\x1b[90m", "\x1b[0m")
}

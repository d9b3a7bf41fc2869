use anyhow::{Context, Result, bail};
use serde::Serialize;

use mealprint_core::models::Selection;

/// Parse `NAME[=OUNCES]` selection arguments into a [`Selection`].
///
/// A bare name defaults to 1 oz. Quantities must be positive finite
/// numbers. The same name given twice accumulates.
pub(crate) fn parse_selection(args: &[String]) -> Result<Selection> {
    let mut selection = Selection::new();

    for arg in args {
        let (name, quantity_oz) = match arg.split_once('=') {
            Some((name, qty)) => {
                let qty: f64 = qty.trim().parse().with_context(|| {
                    format!("Invalid quantity in '{arg}'. Use NAME=OUNCES, e.g. 'Rice=1.5'")
                })?;
                (name.trim(), qty)
            }
            None => (arg.trim(), 1.0),
        };

        if name.is_empty() {
            bail!("Missing food name in '{arg}'");
        }
        if !quantity_oz.is_finite() || quantity_oz <= 0.0 {
            bail!("Quantity must be greater than 0 in '{arg}'");
        }

        selection.add(name, quantity_oz);
    }

    Ok(selection)
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

/// Normalize -0.0 to 0.0 for display.
pub(crate) fn no_neg_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

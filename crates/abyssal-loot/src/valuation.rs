//! Loot valuation
//!
//! Folds parsed `(name, quantity)` pairs into one line per distinct item and
//! prices each line from a [`PriceLookup`].
//!
//! # Rounding
//!
//! Unit prices are rounded to whole ISK when resolved, and each mention's
//! value `unit_price * quantity` is rounded before it is added to the line
//! total. Rounding once at the end would give different totals for
//! fractional prices, so the order matters.
//!
//! # Examples
//!
//! ```
//! use abyssal_core::PriceLookup;
//! use abyssal_loot::aggregate;
//!
//! let prices: PriceLookup = [("Arkonor".to_string(), 100.0)].into_iter().collect();
//! let lines = aggregate([("Arkonor*", 2), ("Arkonor*", 3)], &prices);
//!
//! assert_eq!(lines.len(), 1);
//! assert_eq!(lines[0].name, "Arkonor*");
//! assert_eq!(lines[0].quantity, 5);
//! assert_eq!(lines[0].unit_price, 100.0);
//! assert_eq!(lines[0].total_value, 500.0);
//! ```

use crate::parser::parse_loot_text;
use abyssal_core::PriceLookup;
use serde::Serialize;
use std::collections::HashMap;
use tracing::trace;

/// One distinct item in a run's loot, with its value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LootLine {
    /// Item name as it appeared in the loot list
    pub name: String,
    /// Sum of all mentions
    pub quantity: u64,
    /// Resolved unit price, whole ISK
    pub unit_price: f64,
    /// Sum of the rounded per-mention values
    pub total_value: f64,
}

/// Name used for the fallback price lookup: first `*` removed, trimmed
///
/// # Examples
/// ```
/// use abyssal_loot::lookup_name;
///
/// assert_eq!(lookup_name("Compressed Arkonor*"), "Compressed Arkonor");
/// assert_eq!(lookup_name("Plain Item"), "Plain Item");
/// ```
pub fn lookup_name(name: &str) -> String {
    name.replacen('*', "", 1).trim().to_string()
}

/// Resolve a unit price: exact name, then the stripped name, then zero
///
/// A stored price of zero counts as a miss, so a zero under the exact name
/// still falls through to the stripped name.
fn resolve_unit_price(name: &str, prices: &PriceLookup) -> f64 {
    let priced = |key: &str| prices.get(key).filter(|price| *price != 0.0 && !price.is_nan());

    match priced(name).or_else(|| priced(&lookup_name(name))) {
        Some(price) => price.round(),
        None => {
            trace!("No price for loot item '{}'", name);
            0.0
        }
    }
}

/// Fold loot pairs into valued lines, highest total value first
///
/// Lines are keyed by exact name. Lines with equal totals keep the order in
/// which their names first appeared.
pub fn aggregate<I, S>(pairs: I, prices: &PriceLookup) -> Vec<LootLine>
where
    I: IntoIterator<Item = (S, u32)>,
    S: AsRef<str>,
{
    let mut lines: Vec<LootLine> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (name, quantity) in pairs {
        let name = name.as_ref();
        let slot = match index.get(name) {
            Some(&slot) => slot,
            None => {
                lines.push(LootLine {
                    name: name.to_string(),
                    quantity: 0,
                    unit_price: resolve_unit_price(name, prices),
                    total_value: 0.0,
                });
                index.insert(name.to_string(), lines.len() - 1);
                lines.len() - 1
            }
        };

        let line = &mut lines[slot];
        line.quantity += u64::from(quantity);
        line.total_value += (line.unit_price * f64::from(quantity)).round();
    }

    // `sort_by` is stable, which keeps first-seen order for ties
    lines.sort_by(|a, b| b.total_value.total_cmp(&a.total_value));
    lines
}

/// Parse and value a stored loot list in one step
pub fn value_loot_text(text: &str, prices: &PriceLookup) -> Vec<LootLine> {
    aggregate(parse_loot_text(text), prices)
}

/// Sum of line totals
pub fn total_value(lines: &[LootLine]) -> f64 {
    lines.iter().map(|line| line.total_value).sum()
}

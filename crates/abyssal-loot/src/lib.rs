//! Loot parsing and valuation for abyssal-stats
//!
//! This crate turns the free-text loot list stored on each run into
//! `(name, quantity)` pairs and values them against a price lookup.

pub mod parser;
pub mod valuation;

pub use parser::{LootItems, parse_loot_text};
pub use valuation::{LootLine, aggregate, lookup_name, total_value, value_loot_text};

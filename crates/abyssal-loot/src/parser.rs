//! Loot list parser
//!
//! A stored loot list is a sequence of segments separated by `"; "`. Each
//! segment is an item name, optionally followed by whitespace and a
//! quantity:
//!
//! ```text
//! Compressed Arkonor* 5; Compressed Spodumain* 3; Abyssal Filament
//! ```
//!
//! Parsing never fails. Anything that does not end in a quantity is taken as
//! a name with quantity 1.

use std::str::Split;

/// Separator between loot segments
pub const SEGMENT_SEPARATOR: &str = "; ";

/// Lazy iterator over the `(name, quantity)` pairs of a loot list
///
/// Cloning copies the current position. Clone before iterating to walk the
/// same list twice.
#[derive(Debug, Clone)]
pub struct LootItems<'a> {
    segments: Split<'a, &'static str>,
}

impl<'a> Iterator for LootItems<'a> {
    type Item = (&'a str, u32);

    fn next(&mut self) -> Option<Self::Item> {
        for segment in self.segments.by_ref() {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            return Some(parse_segment(segment));
        }
        None
    }
}

/// Parse a loot list into `(name, quantity)` pairs, in order of appearance
///
/// # Examples
/// ```
/// use abyssal_loot::parse_loot_text;
///
/// let items: Vec<_> = parse_loot_text("Compressed Arkonor* 5; Compressed Spodumain* 3").collect();
/// assert_eq!(items, vec![("Compressed Arkonor*", 5), ("Compressed Spodumain*", 3)]);
///
/// assert_eq!(parse_loot_text("").count(), 0);
/// ```
pub fn parse_loot_text(text: &str) -> LootItems<'_> {
    LootItems {
        segments: text.split(SEGMENT_SEPARATOR),
    }
}

/// Split a trimmed, non-empty segment into name and quantity
fn parse_segment(segment: &str) -> (&str, u32) {
    let head = segment.trim_end_matches(|c: char| c.is_ascii_digit());
    if head.len() == segment.len() || !head.ends_with(char::is_whitespace) {
        return (segment, 1);
    }

    match segment[head.len()..].parse::<u32>() {
        // A zero count still records that the item dropped
        Ok(quantity) => (head.trim_end(), quantity.max(1)),
        Err(_) => (segment, 1),
    }
}

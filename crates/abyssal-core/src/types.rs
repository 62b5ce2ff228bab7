//! Core domain types for abyssal-stats
//!
//! This module contains the run record and the small strongly-typed wrappers
//! around it: the day key used for daily grouping, the two-token category
//! label, the ship class, the record identity, and the externally supplied
//! price lookup.

use crate::error::{AbyssalError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Timestamp format used by the record store and the CLI
pub const LOCAL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Allowed gap between `duration_minutes` and `end_time - start_time`.
///
/// The record store keeps durations rounded to two decimals.
pub const DURATION_TOLERANCE_MINUTES: f64 = 0.01;

/// Parse a local-zone timestamp in `YYYY-MM-DD HH:MM:SS` form
///
/// # Examples
/// ```
/// use abyssal_core::types::parse_local_time;
///
/// let ts = parse_local_time("2024-05-01 20:15:00").unwrap();
/// assert_eq!(ts.format("%H:%M").to_string(), "20:15");
/// assert!(parse_local_time("yesterday").is_err());
/// ```
pub fn parse_local_time(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), LOCAL_TIME_FORMAT)
        .map_err(|e| AbyssalError::InvalidDate(format!("'{s}': {e}")))
}

/// Serde adapter for second-precision local timestamps
pub mod local_time {
    use super::LOCAL_TIME_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        dt: &NaiveDateTime,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&dt.format(LOCAL_TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<NaiveDateTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, LOCAL_TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Calendar day used as the daily rollup key
///
/// # Examples
/// ```
/// use abyssal_core::types::DayKey;
/// use chrono::NaiveDate;
///
/// let day = DayKey::new(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
/// assert_eq!(day.to_string(), "2024-05-01");
/// assert_eq!("2024-05-01".parse::<DayKey>().unwrap(), day);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayKey(NaiveDate);

impl DayKey {
    /// Create a new DayKey
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Day on which a run started
    pub fn from_start(start_time: &NaiveDateTime) -> Self {
        Self(start_time.date())
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl std::str::FromStr for DayKey {
    type Err = AbyssalError;

    fn from_str(s: &str) -> Result<Self> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Self)
            .map_err(|e| AbyssalError::InvalidDate(format!("'{s}': {e}")))
    }
}

/// Two-token run category label, tier then weather (e.g. `"T3 Dark"`)
///
/// Labels are stored verbatim. Only the first two whitespace-delimited
/// tokens matter for the category breakdown; a label with fewer tokens still
/// counts toward global aggregates but has no tier/weather pair.
///
/// # Examples
/// ```
/// use abyssal_core::types::Category;
///
/// let category = Category::new("T4", "Firestorm");
/// assert_eq!(category.as_str(), "T4 Firestorm");
/// assert_eq!(category.tier_weather(), Some(("T4", "Firestorm")));
///
/// assert_eq!(Category::from_label("Unknown").tier_weather(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    /// Build a label from its two tokens, joined by a single space
    pub fn new(tier: &str, weather: &str) -> Self {
        Self(format!("{tier} {weather}"))
    }

    /// Wrap an existing label as-is
    pub fn from_label(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Tier and weather tokens, if the label has at least two
    pub fn tier_weather(&self) -> Option<(&str, &str)> {
        let mut tokens = self.0.split_whitespace();
        match (tokens.next(), tokens.next()) {
            (Some(tier), Some(weather)) => Some((tier, weather)),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hull size a run was flown in; the discriminant is the entry-cost multiplier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipClass {
    /// One pilot, one filament
    #[default]
    Cruiser = 1,
    /// Two pilots
    Destroyer = 2,
    /// Three pilots
    Frigate = 3,
}

impl ShipClass {
    /// Map a stored multiplier back to a ship class
    pub fn from_multiplier(multiplier: u8) -> Option<Self> {
        match multiplier {
            1 => Some(Self::Cruiser),
            2 => Some(Self::Destroyer),
            3 => Some(Self::Frigate),
            _ => None,
        }
    }

    /// Entry-cost multiplier for this class
    pub fn multiplier(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ShipClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cruiser => write!(f, "Cruiser"),
            Self::Destroyer => write!(f, "Destroyer"),
            Self::Frigate => write!(f, "Frigate"),
        }
    }
}

/// Identity of a run: the pair of its start and end timestamps
///
/// There is no surrogate key. Two records with the same pair are the same
/// record for deletion purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId {
    #[serde(with = "local_time")]
    pub start_time: NaiveDateTime,
    #[serde(with = "local_time")]
    pub end_time: NaiveDateTime,
}

impl RunId {
    /// Create a new RunId
    pub fn new(start_time: NaiveDateTime, end_time: NaiveDateTime) -> Self {
        Self {
            start_time,
            end_time,
        }
    }

    /// Day bucket the identified run belongs to
    pub fn day_key(&self) -> DayKey {
        DayKey::from_start(&self.start_time)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ~ {}",
            self.start_time.format(LOCAL_TIME_FORMAT),
            self.end_time.format(LOCAL_TIME_FORMAT)
        )
    }
}

/// One completed run
///
/// Profit, profit-per-hour and entry cost are resolved upstream (they depend
/// on market prices at the time of the run) and are carried here as-is.
///
/// # Examples
/// ```
/// use abyssal_core::types::{parse_local_time, Category, RunRecord, ShipClass};
///
/// let record = RunRecord::new(
///     parse_local_time("2024-05-01 20:00:00").unwrap(),
///     parse_local_time("2024-05-01 20:20:00").unwrap(),
///     Category::new("T5", "Exotic"),
///     45_000_000.0,
///     "Compressed Arkonor* 5",
/// )
/// .with_entry_cost(12_000_000.0);
///
/// assert_eq!(record.duration_minutes, 20.0);
/// assert_eq!(record.profit_per_hour, 135_000_000.0);
/// assert_eq!(record.day_key.to_string(), "2024-05-01");
/// assert_eq!(record.ship_class(), ShipClass::Cruiser);
/// assert!(record.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// When the run started (local zone)
    #[serde(with = "local_time")]
    pub start_time: NaiveDateTime,
    /// When the run ended (local zone)
    #[serde(with = "local_time")]
    pub end_time: NaiveDateTime,
    /// Stored run length in minutes
    pub duration_minutes: f64,
    /// Tier and weather label
    pub category: Category,
    /// Entry-cost multiplier; absent on legacy records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ship_class_multiplier: Option<u8>,
    /// Net profit in ISK, may be negative
    pub net_profit: f64,
    /// Stored ISK per hour
    pub profit_per_hour: f64,
    /// Raw loot list, `"; "` separated
    #[serde(default)]
    pub loot_text: String,
    /// Day of `start_time`
    pub day_key: DayKey,
    /// Entry cost resolved upstream
    #[serde(default)]
    pub entry_cost: f64,
    /// Gross loot value resolved upstream
    #[serde(default)]
    pub drop_value: f64,
}

impl RunRecord {
    /// Create a record, deriving duration, day key and ISK/h from the inputs
    pub fn new(
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
        category: Category,
        net_profit: f64,
        loot_text: impl Into<String>,
    ) -> Self {
        let duration_minutes = (end_time - start_time).num_seconds() as f64 / 60.0;
        let profit_per_hour = if duration_minutes > 0.0 {
            net_profit / (duration_minutes / 60.0)
        } else {
            0.0
        };

        Self {
            start_time,
            end_time,
            duration_minutes,
            category,
            ship_class_multiplier: None,
            net_profit,
            profit_per_hour,
            loot_text: loot_text.into(),
            day_key: DayKey::from_start(&start_time),
            entry_cost: 0.0,
            drop_value: 0.0,
        }
    }

    pub fn with_ship_class(mut self, ship_class: ShipClass) -> Self {
        self.ship_class_multiplier = Some(ship_class.multiplier());
        self
    }

    pub fn with_entry_cost(mut self, entry_cost: f64) -> Self {
        self.entry_cost = entry_cost;
        self
    }

    pub fn with_drop_value(mut self, drop_value: f64) -> Self {
        self.drop_value = drop_value;
        self
    }

    pub fn with_profit_per_hour(mut self, profit_per_hour: f64) -> Self {
        self.profit_per_hour = profit_per_hour;
        self
    }

    /// Identity of this record
    pub fn id(&self) -> RunId {
        RunId::new(self.start_time, self.end_time)
    }

    /// Whether this record carries the given identity
    pub fn matches(&self, id: &RunId) -> bool {
        self.start_time == id.start_time && self.end_time == id.end_time
    }

    /// Ship class, defaulting legacy records without a multiplier to cruiser
    pub fn ship_class(&self) -> ShipClass {
        self.ship_class_multiplier
            .and_then(ShipClass::from_multiplier)
            .unwrap_or_default()
    }

    /// Check the record's internal invariants
    ///
    /// # Errors
    ///
    /// Returns `AbyssalError::InvalidRecord` if the run ends before it
    /// starts, the stored duration disagrees with the timestamps, the day key
    /// is not the start day, or the ship-class multiplier is out of range.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| AbyssalError::InvalidRecord {
            id: self.id(),
            reason,
        };

        if self.end_time < self.start_time {
            return Err(invalid("run ends before it starts".to_string()));
        }

        let elapsed = (self.end_time - self.start_time).num_seconds() as f64 / 60.0;
        if (elapsed - self.duration_minutes).abs() > DURATION_TOLERANCE_MINUTES {
            return Err(invalid(format!(
                "stored duration {:.2} min does not match elapsed {:.2} min",
                self.duration_minutes, elapsed
            )));
        }

        if self.day_key != DayKey::from_start(&self.start_time) {
            return Err(invalid(format!(
                "day key {} is not the start day",
                self.day_key
            )));
        }

        if let Some(multiplier) = self.ship_class_multiplier
            && ShipClass::from_multiplier(multiplier).is_none()
        {
            return Err(invalid(format!(
                "ship class multiplier {multiplier} is not 1, 2 or 3"
            )));
        }

        Ok(())
    }
}

/// Externally supplied item name to unit price mapping
///
/// Keys are exact and case-sensitive. The lookup is read-only from the
/// engine's point of view: a missing name prices at zero and nothing is ever
/// inserted on a miss.
///
/// # Examples
/// ```
/// use abyssal_core::types::PriceLookup;
///
/// let prices: PriceLookup = [("Arkonor".to_string(), 100.0)].into_iter().collect();
/// assert_eq!(prices.get("Arkonor"), Some(100.0));
/// assert_eq!(prices.get("arkonor"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceLookup(HashMap<String, f64>);

impl PriceLookup {
    /// Create an empty lookup
    pub fn new() -> Self {
        Self::default()
    }

    /// Price for an exact name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    /// Number of priced items
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no item is priced
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<HashMap<String, f64>> for PriceLookup {
    fn from(prices: HashMap<String, f64>) -> Self {
        Self(prices)
    }
}

impl FromIterator<(String, f64)> for PriceLookup {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

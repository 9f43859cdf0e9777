//! Raw bookmaker odds feeds, as delivered by the upstream odds API.
//!
//! Parsing is deliberately forgiving: the upstream schema varies between bookmakers, so a record
//! that cannot be understood is dropped rather than failing the whole feed.

use std::fs::File;
use std::io;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{from_reader, Value};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One quoted price for one outcome of one market.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawOddRecord {
    pub market_id: u32,

    #[serde(default, deserialize_with = "textual")]
    pub label: Option<String>,

    #[serde(default, deserialize_with = "textual")]
    pub original_label: Option<String>,

    #[serde(default, deserialize_with = "textual")]
    pub value: Option<String>,

    #[serde(default, deserialize_with = "textual")]
    pub total: Option<String>,

    #[serde(default, deserialize_with = "ordinal")]
    pub sort_order: Option<i64>,

    #[serde(default, deserialize_with = "textual")]
    pub probability: Option<String>,
}
impl RawOddRecord {
    pub fn new(market_id: u32) -> Self {
        Self {
            market_id,
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_original_label(mut self, original_label: impl Into<String>) -> Self {
        self.original_label = Some(original_label.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_total(mut self, total: impl Into<String>) -> Self {
        self.total = Some(total.into());
        self
    }

    pub fn with_sort_order(mut self, sort_order: i64) -> Self {
        self.sort_order = Some(sort_order);
        self
    }

    pub fn with_probability(mut self, probability: impl Into<String>) -> Self {
        self.probability = Some(probability.into());
        self
    }

    /// The decimal price, if present and numeric. A non-positive price is treated as absent.
    pub fn price(&self) -> Option<f64> {
        self.value.as_deref().and_then(parse_decimal)
    }

    /// The bookmaker-supplied probability as a percentage, e.g. `"54.2%"` yields `54.2`.
    pub fn probability_pct(&self) -> Option<f64> {
        self.probability.as_deref().and_then(parse_percentage)
    }

    /// The lowercased, trimmed outcome label. Blank labels count as absent.
    pub fn label_token(&self) -> Option<String> {
        normalise(self.label.as_deref())
    }

    /// The lowercased, trimmed original (code) label.
    pub fn code_token(&self) -> Option<String> {
        normalise(self.original_label.as_deref())
    }
}

fn normalise(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_lowercase)
}

/// Parses a strictly numeric, finite and positive decimal.
pub fn parse_decimal(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value > 0.0)
}

/// Parses a percentage with an optional trailing `%` sign. Zero is a valid percentage.
pub fn parse_percentage(text: &str) -> Option<f64> {
    let text = text.trim();
    let text = text.strip_suffix('%').unwrap_or(text);
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
}

/// Accepts a JSON string or number, keeping the number in its textual form.
fn textual<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

/// Accepts a JSON integer or an integer encoded as a string.
fn ordinal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(number)) => number.as_i64(),
        Some(Value::String(text)) => text.trim().parse().ok(),
        _ => None,
    })
}

/// A single bookmaker's odds for a single fixture: `{ "data": [ ... ] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OddsFeed {
    pub data: Vec<RawOddRecord>,
}
impl OddsFeed {
    /// Leniently extracts the records from an already-parsed payload. A missing or non-array
    /// `data` member yields an empty feed; records that do not deserialise are skipped.
    pub fn from_value(payload: &Value) -> Self {
        let Some(items) = payload.get("data").and_then(Value::as_array) else {
            debug!("odds payload has no record array");
            return Self::default();
        };
        let mut data = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match RawOddRecord::deserialize(item) {
                Ok(record) => data.push(record),
                Err(err) => debug!("skipping odd record {index}: {err}"),
            }
        }
        Self { data }
    }

    pub fn read_json_file(path: impl AsRef<Path>) -> Result<Self, FeedError> {
        Ok(Self::from_value(&read_json(path)?))
    }

    pub fn records(&self) -> &[RawOddRecord] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl FromStr for OddsFeed {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let payload: Value = serde_json::from_str(s)?;
        Ok(Self::from_value(&payload))
    }
}

impl From<Vec<RawOddRecord>> for OddsFeed {
    fn from(data: Vec<RawOddRecord>) -> Self {
        Self { data }
    }
}

/// Reads an arbitrary JSON document from a given file `path`.
pub fn read_json(path: impl AsRef<Path>) -> Result<Value, FeedError> {
    let file = File::open(path)?;
    Ok(from_reader(file)?)
}

#[cfg(test)]
mod tests {
    use assert_float_eq::*;
    use serde_json::json;

    use super::*;

    #[test]
    fn parse_decimal_accepts_positive_numbers_only() {
        assert_eq!(Some(2.1), parse_decimal("2.10"));
        assert_eq!(Some(3.0), parse_decimal(" 3 "));
        assert_eq!(None, parse_decimal("0"));
        assert_eq!(None, parse_decimal("-1.5"));
        assert_eq!(None, parse_decimal("abc"));
        assert_eq!(None, parse_decimal(""));
        assert_eq!(None, parse_decimal("NaN"));
        assert_eq!(None, parse_decimal("inf"));
    }

    #[test]
    fn parse_percentage_strips_sign() {
        assert_float_absolute_eq!(54.2, parse_percentage("54.2%").unwrap());
        assert_float_absolute_eq!(54.2, parse_percentage(" 54.2 % ").unwrap());
        assert_float_absolute_eq!(0.0, parse_percentage("0%").unwrap());
        assert_eq!(None, parse_percentage("%"));
        assert_eq!(None, parse_percentage("-3%"));
    }

    #[test]
    fn record_accessors() {
        let record = RawOddRecord::new(1)
            .with_label("  Home ")
            .with_original_label("1")
            .with_value("2.10")
            .with_probability("47.62%");
        assert_eq!(Some("home".to_owned()), record.label_token());
        assert_eq!(Some("1".to_owned()), record.code_token());
        assert_eq!(Some(2.1), record.price());
        assert_float_absolute_eq!(47.62, record.probability_pct().unwrap());

        let blank = RawOddRecord::new(1).with_label(" ").with_value("n/a");
        assert_eq!(None, blank.label_token());
        assert_eq!(None, blank.price());
    }

    #[test]
    fn from_value_missing_data() {
        assert!(OddsFeed::from_value(&json!({})).is_empty());
        assert!(OddsFeed::from_value(&json!({"data": null})).is_empty());
        assert!(OddsFeed::from_value(&json!({"data": "oops"})).is_empty());
        assert!(OddsFeed::from_value(&json!([1, 2, 3])).is_empty());
    }

    #[test]
    fn from_value_mixed_representations() {
        let feed = OddsFeed::from_value(&json!({
            "data": [
                {"market_id": 1, "label": "Home", "value": "2.10", "sort_order": 0},
                {"market_id": 1, "label": "Draw", "value": 3.4, "original_label": "X", "sort_order": "1"},
                {"market_id": 80, "label": "Over", "value": "1.90", "total": 2.5, "extra": true},
                {"label": "no market id", "value": "1.50"},
                "not even an object"
            ]
        }));
        assert_eq!(3, feed.len());
        assert_eq!(Some(0), feed.records()[0].sort_order);
        assert_eq!(Some("3.4".to_owned()), feed.records()[1].value);
        assert_eq!(Some(1), feed.records()[1].sort_order);
        assert_eq!(Some("2.5".to_owned()), feed.records()[2].total);
    }

    #[test]
    fn from_str_rejects_malformed_json() {
        let err = OddsFeed::from_str("{\"data\": [").unwrap_err();
        assert!(err.to_string().starts_with("malformed JSON: "), "{err}");

        let feed = OddsFeed::from_str(r#"{"data": [{"market_id": 14, "label": "Yes", "value": "1.80"}]}"#).unwrap();
        assert_eq!(1, feed.len());
    }

    #[test]
    fn read_missing_file() {
        let err = OddsFeed::read_json_file("/nonexistent/odds.json").unwrap_err();
        assert!(matches!(err, FeedError::Io(_)));
    }
}

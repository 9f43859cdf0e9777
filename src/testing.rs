//! Testing helpers.

use assert_float_eq::*;
use serde_json::{Map, Value};

use crate::feed::RawOddRecord;
use crate::market::Priced;
use crate::prediction::{Prediction, PredictionType};

pub fn odd(market_id: u32, label: &str, value: &str) -> RawOddRecord {
    RawOddRecord::new(market_id)
        .with_label(label)
        .with_value(value)
}

pub fn odd_at(market_id: u32, label: &str, total: &str, value: &str) -> RawOddRecord {
    odd(market_id, label, value).with_total(total)
}

pub fn assert_prices(expected: &[(&str, f64)], market: &dyn Priced) {
    let actual = market.prices();
    assert_eq!(
        expected.len(),
        actual.len(),
        "outcome counts do not match: {expected:?} ≠ {actual:?}"
    );
    for (&(expected_key, expected_price), &(actual_key, actual_price)) in expected.iter().zip(actual.iter()) {
        assert_eq!(expected_key, actual_key);
        assert_float_relative_eq!(expected_price, actual_price, 1e-9);
    }
}

pub fn prediction(code: &str, predictions: Map<String, Value>) -> Prediction {
    Prediction {
        prediction_type: PredictionType { code: code.into() },
        predictions: Value::Object(predictions),
    }
}

//! Value-bet evaluation: compares the price a bookmaker offers with the fair price implied by a
//! predicted probability.

use std::error::Error;

use anyhow::anyhow;
use serde::Serialize;
use thiserror::Error;
use tracing::trace;

use crate::market::{Line, MarketFamily, Priced};
use crate::prediction::PredictionFeed;
use crate::price::{fair_odds, round_to};
use crate::snapshot::OddsSnapshot;

/// The offered price as a percentage of the fair price, rounded to one decimal place. Above 100
/// the offer beats fair value. Yields the `0.0` sentinel when either price is non-positive or
/// undefined, in particular when there are no fair odds.
pub fn value_ratio(offered: f64, fair: f64) -> f64 {
    if offered.is_nan() || fair.is_nan() || offered <= 0.0 || fair <= 0.0 {
        return 0.0;
    }
    round_to(offered / fair * 100.0, 1)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Value,
    Marginal,
    Fair,
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct InvalidThresholds(#[from] pub Box<dyn Error + Send + Sync>);

impl From<anyhow::Error> for InvalidThresholds {
    fn from(value: anyhow::Error) -> Self {
        InvalidThresholds(value.into())
    }
}

/// Value ratios above `value` are value bets; those above `marginal` (but not above `value`) are
/// marginal.
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds {
    pub value: f64,
    pub marginal: f64,
}
impl Thresholds {
    pub fn validate(&self) -> Result<(), InvalidThresholds> {
        if !self.value.is_finite() || self.value < 0.0 {
            return Err(anyhow!("value threshold ({}) must be a non-negative number", self.value).into());
        }
        if !self.marginal.is_finite() || self.marginal < 0.0 {
            return Err(anyhow!("marginal threshold ({}) must be a non-negative number", self.marginal).into());
        }
        if self.marginal > self.value {
            return Err(anyhow!(
                "marginal threshold ({}) cannot exceed the value threshold ({})",
                self.marginal,
                self.value
            )
            .into());
        }
        Ok(())
    }

    pub fn classify(&self, ratio: f64) -> Verdict {
        if ratio > self.value {
            Verdict::Value
        } else if ratio > self.marginal {
            Verdict::Marginal
        } else {
            Verdict::Fair
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            value: 100.0,
            marginal: 98.0,
        }
    }
}

/// The appraisal of one outcome: the offered price set against the fair price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Appraisal {
    pub key: &'static str,
    pub probability: Option<f64>,
    pub fair: f64,
    pub offered: f64,
    pub ratio: f64,
    pub verdict: Verdict,
}
impl Appraisal {
    pub fn new(key: &'static str, offered: f64, probability: Option<f64>, thresholds: &Thresholds) -> Self {
        let fair = probability.map_or(0.0, fair_odds);
        let ratio = value_ratio(offered, fair);
        Self {
            key,
            probability,
            fair,
            offered,
            ratio,
            verdict: thresholds.classify(ratio),
        }
    }

    pub fn is_value(&self) -> bool {
        self.verdict == Verdict::Value
    }
}

/// Appraises every priced outcome of `market`. A probability quoted by the bookmaker takes
/// precedence over the one supplied by `probability`.
pub fn appraise(
    market: &dyn Priced,
    mut probability: impl FnMut(&str) -> Option<f64>,
    thresholds: &Thresholds,
) -> Vec<Appraisal> {
    market
        .prices()
        .into_iter()
        .map(|(key, offered)| {
            let probability = market.quoted_probability(key).or_else(|| probability(key));
            Appraisal::new(key, offered, probability, thresholds)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketAppraisal {
    pub family: MarketFamily,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
    pub appraisals: Vec<Appraisal>,
}
impl MarketAppraisal {
    pub fn value_bets(&self) -> impl Iterator<Item = &Appraisal> {
        self.appraisals.iter().filter(|appraisal| appraisal.is_value())
    }
}

/// Appraises every market in the snapshot against the predictions. Families that carry the
/// bookmaker's own probabilities are appraised against those alone. Markets for which no outcome has
/// a known probability are left out.
pub fn appraise_snapshot(
    snapshot: &OddsSnapshot,
    predictions: &PredictionFeed,
    thresholds: &Thresholds,
) -> Vec<MarketAppraisal> {
    snapshot
        .entries()
        .into_iter()
        .filter_map(|(family, line, market)| {
            let appraisals = appraise(
                market,
                |key| {
                    if family.has_quoted_probabilities() {
                        None
                    } else {
                        predictions.probability(family, line, key)
                    }
                },
                thresholds,
            );
            if appraisals.iter().all(|appraisal| appraisal.probability.is_none()) {
                trace!("no probabilities for {family} {line:?}");
                return None;
            }
            Some(MarketAppraisal {
                family,
                line,
                appraisals,
            })
        })
        .collect()
}

//! Model predictions for a fixture, as delivered alongside the fixture by the upstream API, and the
//! mapping from canonical market outcomes onto prediction codes and keys.

use std::path::Path;
use std::str::FromStr;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::EnumIter;
use tracing::debug;

use crate::feed::{parse_percentage, read_json, FeedError};
use crate::market::{Line, MarketFamily};

pub const CORRECT_SCORE: &str = "correct-score-probability";
pub const TEAM_TO_SCORE_FIRST: &str = "team_to_score_first-probability";

/// One side of a fixture, for team-specific predictions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Team {
    Home,
    Away,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionType {
    #[serde(default)]
    pub code: String,
}

/// One prediction: a type code and an object of outcome probabilities (percentages).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(rename = "type", default)]
    pub prediction_type: PredictionType,

    #[serde(default)]
    pub predictions: Value,
}
impl Prediction {
    pub fn code(&self) -> &str {
        &self.prediction_type.code
    }

    /// The probability of the outcome under `key`, given either as a number or as a percentage
    /// string.
    pub fn probability(&self, key: &str) -> Option<f64> {
        self.predictions.get(key).and_then(percentage)
    }

    /// Probabilities of the given canonical outcome keys, in that order, omitting those not
    /// predicted.
    pub fn outcomes(&self, keys: &[&str]) -> Vec<(String, f64)> {
        keys.iter()
            .filter_map(|&key| Some((key.to_owned(), self.probability(prediction_key(key))?)))
            .collect()
    }

    /// Correct-score probabilities in key order, skipping the `Other*` catch-all buckets. The scores
    /// may be nested under a `scores` member.
    pub fn correct_score(&self) -> Vec<(String, f64)> {
        let scores = self
            .predictions
            .get("scores")
            .and_then(Value::as_object)
            .or_else(|| self.predictions.as_object());
        scores
            .map(|scores| {
                scores
                    .iter()
                    .filter(|(score, _)| !score.starts_with("Other"))
                    .filter_map(|(score, value)| Some((score.clone(), percentage(value)?)))
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn percentage(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64().filter(|value| value.is_finite()),
        Value::String(text) => parse_percentage(text),
        _ => None,
    }
}

/// All predictions for one fixture, indexed by type code. Where a code repeats, the first
/// occurrence is kept.
#[derive(Debug, Clone, Default)]
pub struct PredictionFeed {
    predictions: Vec<Prediction>,
    index: FxHashMap<String, usize>,
}
impl PredictionFeed {
    /// Leniently extracts the predictions from a fixture payload. The array may sit at the top
    /// level, under `predictions` or under `data.predictions`; entries that do not deserialise are
    /// skipped.
    pub fn from_value(payload: &Value) -> Self {
        let items = payload
            .as_array()
            .or_else(|| payload.get("predictions").and_then(Value::as_array))
            .or_else(|| {
                payload
                    .get("data")
                    .and_then(|data| data.get("predictions"))
                    .and_then(Value::as_array)
            });
        let Some(items) = items else {
            debug!("prediction payload has no prediction array");
            return Self::default();
        };
        items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| match Prediction::deserialize(item) {
                Ok(prediction) => Some(prediction),
                Err(err) => {
                    debug!("skipping prediction {index}: {err}");
                    None
                }
            })
            .collect::<Vec<_>>()
            .into()
    }

    pub fn read_json_file(path: impl AsRef<Path>) -> Result<Self, FeedError> {
        Ok(Self::from_value(&read_json(path)?))
    }

    pub fn find(&self, code: &str) -> Option<&Prediction> {
        self.index.get(code).map(|&index| &self.predictions[index])
    }

    /// The first of the given codes that is present.
    pub fn find_any<S: AsRef<str>>(&self, codes: &[S]) -> Option<&Prediction> {
        codes.iter().find_map(|code| self.find(code.as_ref()))
    }

    /// The predicted probability of a canonical outcome (`key`, as listed by
    /// [`crate::market::Priced::prices`]) of the given market.
    pub fn probability(&self, family: MarketFamily, line: Option<Line>, key: &str) -> Option<f64> {
        self.find_any(&codes(family, line))?
            .probability(prediction_key(key))
    }

    pub fn correct_score(&self) -> Vec<(String, f64)> {
        self.find(CORRECT_SCORE)
            .map(Prediction::correct_score)
            .unwrap_or_default()
    }

    /// Which team scores first; `draw` is the goalless outcome.
    pub fn team_to_score_first(&self) -> Vec<(String, f64)> {
        self.find(TEAM_TO_SCORE_FIRST)
            .map(|prediction| prediction.outcomes(&["home", "draw", "away"]))
            .unwrap_or_default()
    }

    /// Over/under probabilities of the goals scored by one team.
    pub fn team_goals(&self, team: Team, line: Line) -> Vec<(String, f64)> {
        self.find(&team_goals_code(team, line))
            .map(|prediction| prediction.outcomes(&["over", "under"]))
            .unwrap_or_default()
    }

    pub fn predictions(&self) -> &[Prediction] {
        &self.predictions
    }

    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }
}

impl From<Vec<Prediction>> for PredictionFeed {
    fn from(predictions: Vec<Prediction>) -> Self {
        let mut index = FxHashMap::default();
        for (position, prediction) in predictions.iter().enumerate() {
            index.entry(prediction.code().to_owned()).or_insert(position);
        }
        Self { predictions, index }
    }
}

impl FromStr for PredictionFeed {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let payload: Value = serde_json::from_str(s)?;
        Ok(Self::from_value(&payload))
    }
}

/// Renders a line the way prediction codes spell it: `2.5` becomes `2_5`.
fn code_line(line: Line) -> String {
    line.to_string().replace('.', "_")
}

/// Prediction codes that may hold the probabilities of the given market, in order of preference.
/// Families the model does not predict yield no codes; so do line families queried without a line.
pub fn codes(family: MarketFamily, line: Option<Line>) -> Vec<String> {
    match (family, line) {
        (MarketFamily::FulltimeResult, _) => vec!["fulltime-result-probability".into()],
        (MarketFamily::HalfTimeResult, _) => vec!["first-half-winner".into()],
        (MarketFamily::DoubleChance, _) => vec!["double_chance-probability".into()],
        (MarketFamily::HalfTimeFullTime, _) => vec!["half-time-full-time-probability".into()],
        (MarketFamily::BothTeamsToScore, _) => vec!["both-teams-to-score-probability".into()],
        (MarketFamily::GoalsOverUnder, Some(line)) => {
            // both spellings are published
            let line = code_line(line);
            vec![
                format!("over-under-{line}-probability"),
                format!("over-under-{line}_probability"),
            ]
        }
        (MarketFamily::CornersOverUnder, Some(line)) => {
            vec![format!("corners-over-under-{}-probability", code_line(line))]
        }
        _ => vec![],
    }
}

/// The code of a team's goals over/under prediction, e.g. `home-over-under-1_5_probability`.
pub fn team_goals_code(team: Team, line: Line) -> String {
    format!("{team}-over-under-{}_probability", code_line(line))
}

/// Translates a canonical outcome key into the key under which predictions publish it.
pub fn prediction_key(key: &str) -> &str {
    match key {
        "over" => "yes",
        "under" => "no",
        "exactly" => "equal",
        "home_or_draw" => "draw_home",
        "draw_or_away" => "draw_away",
        "home_or_away" => "home_away",
        "tie" => "draw",
        _ => key,
    }
}

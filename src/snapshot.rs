//! The canonical odds snapshot of one bookmaker for one fixture, assembled by running every market
//! extractor over the bookmaker's raw records.

use std::collections::{BTreeMap, HashSet};
use std::error::Error;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use thiserror::Error;
use tracing::debug;

use crate::extract;
use crate::feed::RawOddRecord;
use crate::market::{
    CornerMatchBet, CornersOverUnder, DoubleChance, HalfTimeFullTime, Line, MarketFamily, OverUnder,
    Priced, QuotedOverUnder, ThreeWay, YesNo,
};

#[derive(Debug, Error)]
#[error("{0}")]
pub struct ValidationError(#[from] pub Box<dyn Error + Send + Sync>);

impl From<anyhow::Error> for ValidationError {
    fn from(value: anyhow::Error) -> Self {
        ValidationError(value.into())
    }
}

/// The lines probed for each line-parameterised family.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub goal_lines: Vec<Line>,
    pub corner_lines: Vec<Line>,
    pub team_shot_lines: Vec<Line>,
    pub shots_on_target_lines: Vec<Line>,
}
impl Config {
    /// The configured lines of a family; empty for families that take no line.
    pub fn lines(&self, family: MarketFamily) -> &[Line] {
        match family {
            MarketFamily::GoalsOverUnder => &self.goal_lines,
            MarketFamily::CornersOverUnder => &self.corner_lines,
            MarketFamily::TeamShots => &self.team_shot_lines,
            MarketFamily::TeamShotsOnTarget => &self.shots_on_target_lines,
            _ => &[],
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for family in MarketFamily::iter().filter(MarketFamily::is_line_parameterised) {
            let lines = self.lines(family);
            if lines.is_empty() {
                return Err(anyhow!("no lines configured for {family}").into());
            }
            let mut seen = HashSet::with_capacity(lines.len());
            for line in lines {
                if !seen.insert(line) {
                    return Err(anyhow!("duplicate line {line} configured for {family}").into());
                }
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            goal_lines: [1, 3, 5, 7, 9].map(Line::from_halves).to_vec(),
            corner_lines: Line::range_inclusive(Line::from_halves(8), Line::from_halves(31)),
            team_shot_lines: vec![Line::from_halves(25), Line::from_halves(27)],
            shots_on_target_lines: vec![Line::from_halves(9)],
        }
    }
}

/// Every market extracted from one bookmaker's feed. Markets that could not be fully resolved are
/// absent; line-parameterised markets hold only the lines that resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OddsSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fulltime_result: Option<ThreeWay>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub half_time_result: Option<ThreeWay>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub double_chance: Option<DoubleChance>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub half_time_full_time: Option<HalfTimeFullTime>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub goals_over_under: BTreeMap<Line, OverUnder>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub both_teams_to_score: Option<YesNo>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub corners_over_under: BTreeMap<Line, CornersOverUnder>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_match_bet: Option<CornerMatchBet>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub team_shots: BTreeMap<Line, QuotedOverUnder>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub team_shots_on_target: BTreeMap<Line, QuotedOverUnder>,
}
impl OddsSnapshot {
    /// Runs every extractor over `records`, probing the lines in `config`. The config is assumed
    /// valid; see [`SnapshotBuilder`] for the checked route.
    pub fn build(records: &[RawOddRecord], config: &Config) -> Self {
        let snapshot = Self {
            fulltime_result: extract::fulltime_result(records),
            half_time_result: extract::half_time_result(records),
            double_chance: extract::double_chance(records),
            half_time_full_time: extract::half_time_full_time(records),
            goals_over_under: at_lines(records, &config.goal_lines, extract::goals_over_under),
            both_teams_to_score: extract::both_teams_to_score(records),
            corners_over_under: at_lines(records, &config.corner_lines, extract::corners_over_under),
            corner_match_bet: extract::corner_match_bet(records),
            team_shots: at_lines(records, &config.team_shot_lines, extract::team_shots),
            team_shots_on_target: at_lines(
                records,
                &config.shots_on_target_lines,
                extract::team_shots_on_target,
            ),
        };
        debug!(
            "extracted {} markets from {} records",
            snapshot.entries().len(),
            records.len()
        );
        snapshot
    }

    /// Builds with the default lines.
    pub fn from_records(records: &[RawOddRecord]) -> Self {
        Self::build(records, &Config::default())
    }

    pub fn is_empty(&self) -> bool {
        self.families().is_empty()
    }

    /// The families present, in canonical order.
    pub fn families(&self) -> Vec<MarketFamily> {
        let mut families = self
            .entries()
            .into_iter()
            .map(|(family, _, _)| family)
            .collect::<Vec<_>>();
        families.dedup();
        families
    }

    /// Every market present, in family order and then by ascending line.
    pub fn entries(&self) -> Vec<(MarketFamily, Option<Line>, &dyn Priced)> {
        let mut entries: Vec<(MarketFamily, Option<Line>, &dyn Priced)> = vec![];
        if let Some(market) = &self.fulltime_result {
            entries.push((MarketFamily::FulltimeResult, None, market));
        }
        if let Some(market) = &self.half_time_result {
            entries.push((MarketFamily::HalfTimeResult, None, market));
        }
        if let Some(market) = &self.double_chance {
            entries.push((MarketFamily::DoubleChance, None, market));
        }
        if let Some(market) = &self.half_time_full_time {
            entries.push((MarketFamily::HalfTimeFullTime, None, market));
        }
        for (line, market) in &self.goals_over_under {
            entries.push((MarketFamily::GoalsOverUnder, Some(*line), market));
        }
        if let Some(market) = &self.both_teams_to_score {
            entries.push((MarketFamily::BothTeamsToScore, None, market));
        }
        for (line, market) in &self.corners_over_under {
            entries.push((MarketFamily::CornersOverUnder, Some(*line), market));
        }
        if let Some(market) = &self.corner_match_bet {
            entries.push((MarketFamily::CornerMatchBet, None, market));
        }
        for (line, market) in &self.team_shots {
            entries.push((MarketFamily::TeamShots, Some(*line), market));
        }
        for (line, market) in &self.team_shots_on_target {
            entries.push((MarketFamily::TeamShotsOnTarget, Some(*line), market));
        }
        entries
    }
}

fn at_lines<T>(
    records: &[RawOddRecord],
    lines: &[Line],
    extractor: impl Fn(&[RawOddRecord], Line) -> Option<T>,
) -> BTreeMap<Line, T> {
    lines
        .iter()
        .filter_map(|&line| Some((line, extractor(records, line)?)))
        .collect()
}

/// Builds snapshots against a validated [`Config`].
#[derive(Debug, Clone, Default)]
pub struct SnapshotBuilder {
    config: Config,
}
impl SnapshotBuilder {
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn build(&self, records: &[RawOddRecord]) -> OddsSnapshot {
        OddsSnapshot::build(records, &self.config)
    }
}

impl TryFrom<Config> for SnapshotBuilder {
    type Error = ValidationError;

    fn try_from(config: Config) -> Result<Self, Self::Error> {
        config.validate()?;
        Ok(Self { config })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::testing::{odd, odd_at};

    fn line(text: &str) -> Line {
        text.parse().unwrap()
    }

    fn bookmaker_records() -> Vec<RawOddRecord> {
        vec![
            odd(1, "Home", "2.10"),
            odd(1, "Draw", "3.40"),
            odd(1, "Away", "3.80"),
            odd(31, "Home", "2.90"),
            odd(31, "Draw", "2.10"),
            odd_at(80, "Over", "2.5", "1.90"),
            odd_at(80, "Under", "2.5", "1.95"),
            odd_at(80, "Over", "1.5", "1.30"),
            odd_at(80, "Under", "1.5", "3.40"),
            odd_at(80, "Over", "6.5", "21.00"),
            odd_at(80, "Under", "6.5", "1.01"),
            odd(14, "Yes", "1.72"),
            odd(14, "No", "2.05"),
            odd_at(61, "Over", "10", "2.00"),
            odd_at(61, "Under", "10", "1.80"),
            odd(71, "Arsenal", "1.66").with_sort_order(0),
            odd(71, "Chelsea", "2.30").with_sort_order(2),
            RawOddRecord::new(284)
                .with_total("Over 4.5")
                .with_value("1.61")
                .with_probability("60.3%"),
            RawOddRecord::new(284)
                .with_total("Under 4.5")
                .with_value("2.20")
                .with_probability("39.7%"),
        ]
    }

    #[test]
    fn default_config_lines() {
        let config = Config::default();
        config.validate().unwrap();
        let goals: Vec<_> = config.goal_lines.iter().map(Line::to_string).collect();
        assert_eq!(vec!["0.5", "1.5", "2.5", "3.5", "4.5"], goals);
        assert_eq!(24, config.corner_lines.len());
        assert_eq!(Some(&line("4")), config.corner_lines.first());
        assert_eq!(Some(&line("15.5")), config.corner_lines.last());
        assert_eq!(vec![line("12.5"), line("13.5")], config.team_shot_lines);
        assert_eq!(vec![line("4.5")], config.shots_on_target_lines);
        assert!(config.lines(MarketFamily::FulltimeResult).is_empty());
    }

    #[test]
    fn config_validation() {
        let config = Config {
            corner_lines: vec![],
            ..Config::default()
        };
        assert_eq!(
            "no lines configured for corners_over_under",
            config.validate().unwrap_err().to_string()
        );

        let config = Config {
            goal_lines: vec![line("2.5"), line("3.5"), line("2.50")],
            ..Config::default()
        };
        assert_eq!(
            "duplicate line 2.5 configured for goals_over_under",
            SnapshotBuilder::try_from(config).unwrap_err().to_string()
        );
    }

    #[test]
    fn build_all_families() {
        let snapshot = OddsSnapshot::from_records(&bookmaker_records());
        assert_eq!(
            vec![
                MarketFamily::FulltimeResult,
                MarketFamily::GoalsOverUnder,
                MarketFamily::BothTeamsToScore,
                MarketFamily::CornersOverUnder,
                MarketFamily::CornerMatchBet,
                MarketFamily::TeamShotsOnTarget,
            ],
            snapshot.families()
        );
        assert_eq!(None, snapshot.half_time_result);
        let goal_lines: Vec<_> = snapshot.goals_over_under.keys().copied().collect();
        assert_eq!(vec![line("1.5"), line("2.5")], goal_lines);
        assert_eq!(Some(&line("10")), snapshot.corners_over_under.keys().next());
        assert_eq!(None, snapshot.corner_match_bet.as_ref().unwrap().tie);
        assert!(snapshot.team_shots.is_empty());
        assert_eq!(7, snapshot.entries().len());
    }

    #[test]
    fn builder_probes_configured_lines_only() {
        let config = Config {
            goal_lines: vec![line("6.5")],
            ..Config::default()
        };
        let builder = SnapshotBuilder::try_from(config).unwrap();
        let snapshot = builder.build(&bookmaker_records());
        let goal_lines: Vec<_> = snapshot.goals_over_under.keys().copied().collect();
        assert_eq!(vec![line("6.5")], goal_lines);
    }

    #[test]
    fn empty_records_empty_snapshot() {
        let snapshot = OddsSnapshot::from_records(&[]);
        assert!(snapshot.is_empty());
        assert!(snapshot.entries().is_empty());
        assert_eq!(json!({}), serde_json::to_value(&snapshot).unwrap());
    }

    #[test]
    fn build_is_idempotent() {
        let records = bookmaker_records();
        assert_eq!(OddsSnapshot::from_records(&records), OddsSnapshot::from_records(&records));
    }

    #[test]
    fn serialised_shape() {
        let records = vec![
            odd(14, "Yes", "1.72"),
            odd(14, "No", "2.05"),
            odd_at(67, "Over", "10.5", "2.20"),
            odd_at(67, "Under", "10.5", "1.62"),
            odd_at(67, "Over", "10", "2.00"),
            odd_at(67, "Under", "10", "2.10"),
            odd_at(67, "Exactly", "10", "9.00"),
            RawOddRecord::new(285)
                .with_total("Over 12.5")
                .with_value("1.83")
                .with_probability("52.1%"),
            RawOddRecord::new(285).with_total("Under 12.5").with_value("1.83"),
        ];
        let snapshot = OddsSnapshot::from_records(&records);
        assert_eq!(
            json!({
                "both_teams_to_score": {"yes": 1.72, "no": 2.05},
                "corners_over_under": {
                    "10": {"over": 2.0, "under": 2.1, "exactly": 9.0},
                    "10.5": {"over": 2.2, "under": 1.62}
                },
                "team_shots": {
                    "12.5": {
                        "over": {"price": 1.83, "probability": 52.1},
                        "under": {"price": 1.83}
                    }
                }
            }),
            serde_json::to_value(&snapshot).unwrap()
        );

        let restored: OddsSnapshot = serde_json::from_value(serde_json::to_value(&snapshot).unwrap()).unwrap();
        assert_eq!(snapshot, restored);
    }
}

//! Market families, lines and the canonical per-market odds objects.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::EnumCount;
use strum_macros::{EnumCount, EnumIter};
use thiserror::Error;

/// A logical betting market, possibly quoted under several upstream market ids.
#[derive(
    Clone,
    Copy,
    Debug,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    EnumCount,
    EnumIter,
    strum_macros::Display,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MarketFamily {
    FulltimeResult,
    HalfTimeResult,
    DoubleChance,
    HalfTimeFullTime,
    GoalsOverUnder,
    BothTeamsToScore,
    CornersOverUnder,
    CornerMatchBet,
    TeamShots,
    TeamShotsOnTarget,
}
impl MarketFamily {
    /// Upstream market ids for this family, in probing priority order.
    pub fn candidate_ids(&self) -> &'static [u32] {
        match self {
            MarketFamily::FulltimeResult => &[1],
            MarketFamily::HalfTimeResult => &[31],
            MarketFamily::DoubleChance => &[2],
            MarketFamily::HalfTimeFullTime => &[29],
            MarketFamily::GoalsOverUnder => &[80],
            MarketFamily::BothTeamsToScore => &[14],
            // corners, corners 2-way, asian total corners
            MarketFamily::CornersOverUnder => &[67, 60, 61],
            MarketFamily::CornerMatchBet => &[71],
            MarketFamily::TeamShots => &[285],
            MarketFamily::TeamShotsOnTarget => &[284],
        }
    }

    pub fn is_line_parameterised(&self) -> bool {
        matches!(
            self,
            MarketFamily::GoalsOverUnder
                | MarketFamily::CornersOverUnder
                | MarketFamily::TeamShots
                | MarketFamily::TeamShotsOnTarget
        )
    }

    /// Whether the bookmaker quotes a probability alongside each price.
    pub fn has_quoted_probabilities(&self) -> bool {
        matches!(self, MarketFamily::TeamShots | MarketFamily::TeamShotsOnTarget)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid line '{0}'")]
pub struct InvalidLine(pub String);

/// The threshold of an over/under market, held as a whole number of halves so that `2.5` and
/// `"2.50"` are the same line.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Line(u16);
impl Line {
    pub const fn from_halves(halves: u16) -> Self {
        Self(halves)
    }

    pub fn halves(&self) -> u16 {
        self.0
    }

    pub fn value(&self) -> f64 {
        self.0 as f64 / 2.0
    }

    /// Whether `text` denotes this line, either as a clean value (`"2.5"`) or as a whitespace-separated
    /// token of a composite string (`"Over 2.5"`). Tokens are compared numerically, so `"12.5"`
    /// never matches the line `2.5`.
    pub fn matches(&self, text: &str) -> bool {
        let is_self = |token: &str| token.parse::<Line>().map_or(false, |line| line == *self);
        is_self(text) || text.split_whitespace().any(is_self)
    }

    /// Lines from `from` to `to` inclusive, in half-unit steps.
    pub fn range_inclusive(from: Line, to: Line) -> Vec<Line> {
        (from.0..=to.0).map(Line).collect()
    }
}

impl FromStr for Line {
    type Err = InvalidLine;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<f64>()
            .map_err(|_| InvalidLine(s.to_owned()))?;
        let halves = value * 2.0;
        if !halves.is_finite() || halves < 0.0 || halves.fract() != 0.0 || halves > u16::MAX as f64 {
            return Err(InvalidLine(s.to_owned()));
        }
        Ok(Self(halves as u16))
    }
}

impl TryFrom<f64> for Line {
    type Error = InvalidLine;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_str(&value.to_string())
    }
}

impl Display for Line {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0 % 2 == 0 {
            write!(f, "{}", self.0 / 2)
        } else {
            write!(f, "{}.5", self.0 / 2)
        }
    }
}

impl Serialize for Line {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Line {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Line::from_str(&text).map_err(serde::de::Error::custom)
    }
}

/// One of the three results of a match (or of a half).
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, EnumCount, EnumIter, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum MatchOutcome {
    Home,
    Draw,
    Away,
}
impl MatchOutcome {
    /// Resolves free-text labels, including the `1`/`X`/`2` shorthand. Expects a lowercased token.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "home" | "1" => Some(MatchOutcome::Home),
            "draw" | "x" | "tie" => Some(MatchOutcome::Draw),
            "away" | "2" => Some(MatchOutcome::Away),
            _ => None,
        }
    }

    /// Resolves upstream outcome codes. Expects a lowercased token.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "1" => Some(MatchOutcome::Home),
            "x" => Some(MatchOutcome::Draw),
            "2" => Some(MatchOutcome::Away),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, EnumCount, EnumIter)]
pub enum DoubleChanceOutcome {
    HomeOrDraw,
    DrawOrAway,
    HomeOrAway,
}

/// Double-chance labels do not tell the three combinations apart, so the upstream sort order does.
pub const DOUBLE_CHANCE_POSITIONS: [DoubleChanceOutcome; DoubleChanceOutcome::COUNT] = [
    DoubleChanceOutcome::HomeOrDraw,
    DoubleChanceOutcome::DrawOrAway,
    DoubleChanceOutcome::HomeOrAway,
];

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, EnumCount, EnumIter)]
pub enum CornerOutcome {
    Home,
    Tie,
    Away,
}

pub const CORNER_MATCH_BET_POSITIONS: [CornerOutcome; CornerOutcome::COUNT] =
    [CornerOutcome::Home, CornerOutcome::Tie, CornerOutcome::Away];

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, EnumCount, EnumIter)]
pub enum OverUnderOutcome {
    Over,
    Under,
    Exactly,
}
impl OverUnderOutcome {
    /// Looks for an `over`/`under`/`exactly` word anywhere in `text`, case-insensitively.
    pub fn find_in(text: &str) -> Option<Self> {
        text.split(|c: char| !c.is_alphanumeric())
            .find_map(|word| match word.to_lowercase().as_str() {
                "over" => Some(OverUnderOutcome::Over),
                "under" => Some(OverUnderOutcome::Under),
                "exactly" | "exact" | "equal" => Some(OverUnderOutcome::Exactly),
                _ => None,
            })
    }
}

/// Looks up the positional outcome for an upstream sort order.
pub fn at_position<T: Copy>(positions: &[T], sort_order: i64) -> Option<T> {
    usize::try_from(sort_order)
        .ok()
        .and_then(|index| positions.get(index))
        .copied()
}

/// A canonical market object whose outcomes carry bookmaker prices.
pub trait Priced {
    /// Outcome keys paired with decimal prices, in display order. Optional outcomes are listed
    /// only when quoted.
    fn prices(&self) -> Vec<(&'static str, f64)>;

    /// A probability (percentage) quoted by the bookmaker for the given outcome, if any.
    fn quoted_probability(&self, _key: &str) -> Option<f64> {
        None
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThreeWay {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}
impl ThreeWay {
    pub fn get(&self, outcome: MatchOutcome) -> f64 {
        match outcome {
            MatchOutcome::Home => self.home,
            MatchOutcome::Draw => self.draw,
            MatchOutcome::Away => self.away,
        }
    }
}

impl Priced for ThreeWay {
    fn prices(&self) -> Vec<(&'static str, f64)> {
        vec![("home", self.home), ("draw", self.draw), ("away", self.away)]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DoubleChance {
    pub home_or_draw: f64,
    pub draw_or_away: f64,
    pub home_or_away: f64,
}

impl Priced for DoubleChance {
    fn prices(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("home_or_draw", self.home_or_draw),
            ("home_or_away", self.home_or_away),
            ("draw_or_away", self.draw_or_away),
        ]
    }
}

/// The nine half-time/full-time combinations, named `<half time>_<full time>`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HalfTimeFullTime {
    pub home_home: f64,
    pub home_draw: f64,
    pub home_away: f64,
    pub draw_home: f64,
    pub draw_draw: f64,
    pub draw_away: f64,
    pub away_home: f64,
    pub away_draw: f64,
    pub away_away: f64,
}
impl HalfTimeFullTime {
    pub(crate) const KEYS: [[&'static str; 3]; 3] = [
        ["home_home", "home_draw", "home_away"],
        ["draw_home", "draw_draw", "draw_away"],
        ["away_home", "away_draw", "away_away"],
    ];

    /// Lays out a grid indexed by `[half time][full time]` in [`MatchOutcome`] order.
    pub fn from_grid(grid: [[f64; 3]; 3]) -> Self {
        let [[home_home, home_draw, home_away], [draw_home, draw_draw, draw_away], [away_home, away_draw, away_away]] =
            grid;
        Self {
            home_home,
            home_draw,
            home_away,
            draw_home,
            draw_draw,
            draw_away,
            away_home,
            away_draw,
            away_away,
        }
    }

    pub fn grid(&self) -> [[f64; 3]; 3] {
        [
            [self.home_home, self.home_draw, self.home_away],
            [self.draw_home, self.draw_draw, self.draw_away],
            [self.away_home, self.away_draw, self.away_away],
        ]
    }

    pub fn get(&self, half_time: MatchOutcome, full_time: MatchOutcome) -> f64 {
        self.grid()[half_time as usize][full_time as usize]
    }
}

impl Priced for HalfTimeFullTime {
    fn prices(&self) -> Vec<(&'static str, f64)> {
        let grid = self.grid();
        let mut prices = Vec::with_capacity(9);
        for (half_time, row) in grid.iter().enumerate() {
            for (full_time, &price) in row.iter().enumerate() {
                prices.push((Self::KEYS[half_time][full_time], price));
            }
        }
        prices
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OverUnder {
    pub over: f64,
    pub under: f64,
}

impl Priced for OverUnder {
    fn prices(&self) -> Vec<(&'static str, f64)> {
        vec![("over", self.over), ("under", self.under)]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct YesNo {
    pub yes: f64,
    pub no: f64,
}

impl Priced for YesNo {
    fn prices(&self) -> Vec<(&'static str, f64)> {
        vec![("yes", self.yes), ("no", self.no)]
    }
}

/// Corners over/under; some sources also quote the line being hit exactly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CornersOverUnder {
    pub over: f64,
    pub under: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exactly: Option<f64>,
}

impl Priced for CornersOverUnder {
    fn prices(&self) -> Vec<(&'static str, f64)> {
        let mut prices = vec![("over", self.over), ("under", self.under)];
        if let Some(exactly) = self.exactly {
            prices.push(("exactly", exactly));
        }
        prices
    }
}

/// Which side takes more corners; the tie is not quoted by every source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CornerMatchBet {
    pub home: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tie: Option<f64>,
    pub away: f64,
}

impl Priced for CornerMatchBet {
    fn prices(&self) -> Vec<(&'static str, f64)> {
        let mut prices = vec![("home", self.home)];
        if let Some(tie) = self.tie {
            prices.push(("tie", tie));
        }
        prices.push(("away", self.away));
        prices
    }
}

/// A price together with the probability the bookmaker publishes for it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuotedOverUnder {
    pub over: Quote,
    pub under: Quote,
}

impl Priced for QuotedOverUnder {
    fn prices(&self) -> Vec<(&'static str, f64)> {
        vec![("over", self.over.price), ("under", self.under.price)]
    }

    fn quoted_probability(&self, key: &str) -> Option<f64> {
        match key {
            "over" => self.over.probability,
            "under" => self.under.probability,
            _ => None,
        }
    }
}

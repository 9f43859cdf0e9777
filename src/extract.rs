//! Market extractors. Each maps a flat list of raw odd records onto one canonical market object.
//!
//! An extractor either returns a fully populated object or `None`; a market for which only some of
//! the required outcomes could be resolved is treated as absent. Outcomes are resolved, in order of
//! preference, from the label text, the original (code) label and finally the upstream sort order,
//! for those families that define a positional table. When several records resolve to the same
//! outcome, the last one wins.

use tracing::trace;

use crate::feed::RawOddRecord;
use crate::market::{
    at_position, CornerMatchBet, CornerOutcome, CornersOverUnder, DoubleChance, DoubleChanceOutcome,
    HalfTimeFullTime, Line, MarketFamily, MatchOutcome, OverUnder, OverUnderOutcome, Quote,
    QuotedOverUnder, ThreeWay, YesNo, CORNER_MATCH_BET_POSITIONS, DOUBLE_CHANCE_POSITIONS,
};


/// Fixed-arity accumulator of resolved prices, indexed by outcome ordinal.
#[derive(Debug)]
struct Slots<const N: usize>([Option<f64>; N]);
impl<const N: usize> Slots<N> {
    fn new() -> Self {
        Self([None; N])
    }

    fn fill(&mut self, index: usize, value: f64) {
        self.0[index] = Some(value);
    }

    fn get(&self, index: usize) -> Option<f64> {
        self.0[index]
    }

    /// All of the given outcomes, or nothing.
    fn require<const M: usize>(&self, indexes: [usize; M]) -> Option<[f64; M]> {
        let mut values = [0.0; M];
        for (value, index) in values.iter_mut().zip(indexes) {
            *value = self.0[index]?;
        }
        Some(values)
    }
}

/// Selects the records of the first candidate market id (in priority order) that has any record
/// accepted by `filter`. Records under different ids are never combined.
fn probe<'a>(
    records: &'a [RawOddRecord],
    family: MarketFamily,
    mut filter: impl FnMut(&RawOddRecord) -> bool,
) -> Vec<&'a RawOddRecord> {
    for &market_id in family.candidate_ids() {
        let selected: Vec<_> = records
            .iter()
            .filter(|record| record.market_id == market_id && filter(*record))
            .collect();
        if !selected.is_empty() {
            trace!("{family}: {} records under market id {market_id}", selected.len());
            return selected;
        }
    }
    vec![]
}

fn match_outcome(record: &RawOddRecord) -> Option<MatchOutcome> {
    record
        .label_token()
        .and_then(|label| MatchOutcome::from_label(&label))
        .or_else(|| {
            record
                .code_token()
                .and_then(|code| MatchOutcome::from_code(&code))
        })
}

fn three_way(records: &[RawOddRecord], family: MarketFamily) -> Option<ThreeWay> {
    let mut slots = Slots::<3>::new();
    for record in probe(records, family, |_| true) {
        if let (Some(outcome), Some(price)) = (match_outcome(record), record.price()) {
            slots.fill(outcome as usize, price);
        }
    }
    let [home, draw, away] = slots.require([
        MatchOutcome::Home as usize,
        MatchOutcome::Draw as usize,
        MatchOutcome::Away as usize,
    ])?;
    Some(ThreeWay { home, draw, away })
}

/// Full-time 1X2.
pub fn fulltime_result(records: &[RawOddRecord]) -> Option<ThreeWay> {
    three_way(records, MarketFamily::FulltimeResult)
}

/// Half-time 1X2.
pub fn half_time_result(records: &[RawOddRecord]) -> Option<ThreeWay> {
    three_way(records, MarketFamily::HalfTimeResult)
}

/// Double chance, resolved purely by sort order.
pub fn double_chance(records: &[RawOddRecord]) -> Option<DoubleChance> {
    let mut slots = Slots::<3>::new();
    for record in probe(records, MarketFamily::DoubleChance, |_| true) {
        let outcome = record
            .sort_order
            .and_then(|sort_order| at_position(&DOUBLE_CHANCE_POSITIONS, sort_order));
        if let (Some(outcome), Some(price)) = (outcome, record.price()) {
            slots.fill(outcome as usize, price);
        }
    }
    let [home_or_draw, draw_or_away, home_or_away] = slots.require([
        DoubleChanceOutcome::HomeOrDraw as usize,
        DoubleChanceOutcome::DrawOrAway as usize,
        DoubleChanceOutcome::HomeOrAway as usize,
    ])?;
    Some(DoubleChance {
        home_or_draw,
        draw_or_away,
        home_or_away,
    })
}

/// Splits a composite `"Home/Draw"` or `"1/X"` token into its half-time and full-time outcomes.
fn split_composite(token: &str) -> Option<(MatchOutcome, MatchOutcome)> {
    let (half_time, full_time) = token.split_once(['/', '-'])?;
    Some((
        MatchOutcome::from_label(half_time.trim())?,
        MatchOutcome::from_label(full_time.trim())?,
    ))
}

/// Half-time/full-time; all nine combinations are required.
pub fn half_time_full_time(records: &[RawOddRecord]) -> Option<HalfTimeFullTime> {
    let mut slots = Slots::<9>::new();
    for record in probe(records, MarketFamily::HalfTimeFullTime, |_| true) {
        let outcome = record
            .label_token()
            .and_then(|label| split_composite(&label))
            .or_else(|| record.code_token().and_then(|code| split_composite(&code)));
        if let (Some((half_time, full_time)), Some(price)) = (outcome, record.price()) {
            slots.fill(half_time as usize * 3 + full_time as usize, price);
        }
    }
    let cells = slots.require([0, 1, 2, 3, 4, 5, 6, 7, 8])?;
    Some(HalfTimeFullTime::from_grid([
        [cells[0], cells[1], cells[2]],
        [cells[3], cells[4], cells[5]],
        [cells[6], cells[7], cells[8]],
    ]))
}

/// Whether the record is quoted at `line`. The line is taken from the `total` field, or from the
/// label when no total is supplied.
fn at_line(record: &RawOddRecord, line: Line) -> bool {
    match record.total.as_deref().filter(|total| !total.trim().is_empty()) {
        Some(total) => line.matches(total),
        None => record.label.as_deref().map_or(false, |label| line.matches(label)),
    }
}

/// The direction of an over/under record: from the label, else from the original label, else from a
/// composite total such as `"Over 12.5"`.
fn over_under_outcome(record: &RawOddRecord) -> Option<OverUnderOutcome> {
    [&record.label, &record.original_label, &record.total]
        .into_iter()
        .find_map(|text| text.as_deref().and_then(OverUnderOutcome::find_in))
}

#[derive(Debug)]
struct OverUnderSlots {
    prices: Slots<3>,
    probabilities: Slots<3>,
}

fn over_under_slots(records: &[RawOddRecord], family: MarketFamily, line: Line) -> OverUnderSlots {
    let mut slots = OverUnderSlots {
        prices: Slots::new(),
        probabilities: Slots::new(),
    };
    for record in probe(records, family, |record| at_line(record, line)) {
        if let (Some(outcome), Some(price)) = (over_under_outcome(record), record.price()) {
            slots.prices.fill(outcome as usize, price);
            if let Some(probability) = record.probability_pct() {
                slots.probabilities.fill(outcome as usize, probability);
            }
        }
    }
    slots
}

const OVER_UNDER: [usize; 2] = [OverUnderOutcome::Over as usize, OverUnderOutcome::Under as usize];

/// Total goals over/under at the given line.
pub fn goals_over_under(records: &[RawOddRecord], line: Line) -> Option<OverUnder> {
    let slots = over_under_slots(records, MarketFamily::GoalsOverUnder, line);
    let [over, under] = slots.prices.require(OVER_UNDER)?;
    Some(OverUnder { over, under })
}

/// Both teams to score.
pub fn both_teams_to_score(records: &[RawOddRecord]) -> Option<YesNo> {
    let (mut yes, mut no) = (None, None);
    for record in probe(records, MarketFamily::BothTeamsToScore, |_| true) {
        let answer = record
            .label_token()
            .filter(|label| label == "yes" || label == "no")
            .or_else(|| record.code_token());
        match (answer.as_deref(), record.price()) {
            (Some("yes"), Some(price)) => yes = Some(price),
            (Some("no"), Some(price)) => no = Some(price),
            _ => {}
        }
    }
    Some(YesNo { yes: yes?, no: no? })
}

/// Corners over/under at the given line, probing each corners market id in turn. The `exactly`
/// outcome is optional.
pub fn corners_over_under(records: &[RawOddRecord], line: Line) -> Option<CornersOverUnder> {
    let slots = over_under_slots(records, MarketFamily::CornersOverUnder, line);
    let [over, under] = slots.prices.require(OVER_UNDER)?;
    Some(CornersOverUnder {
        over,
        under,
        exactly: slots.prices.get(OverUnderOutcome::Exactly as usize),
    })
}

fn corner_outcome(record: &RawOddRecord) -> Option<CornerOutcome> {
    let from_match_outcome = |outcome| match outcome {
        MatchOutcome::Home => CornerOutcome::Home,
        MatchOutcome::Draw => CornerOutcome::Tie,
        MatchOutcome::Away => CornerOutcome::Away,
    };
    match_outcome(record)
        .map(from_match_outcome)
        .or_else(|| {
            record
                .sort_order
                .and_then(|sort_order| at_position(&CORNER_MATCH_BET_POSITIONS, sort_order))
        })
}

/// Corner match bet. Sources disagree on labelling: some name the outcomes, others (using team
/// names) can only be told apart by sort order. The tie is optional.
pub fn corner_match_bet(records: &[RawOddRecord]) -> Option<CornerMatchBet> {
    let mut slots = Slots::<3>::new();
    for record in probe(records, MarketFamily::CornerMatchBet, |_| true) {
        if let (Some(outcome), Some(price)) = (corner_outcome(record), record.price()) {
            slots.fill(outcome as usize, price);
        }
    }
    let [home, away] = slots.require([CornerOutcome::Home as usize, CornerOutcome::Away as usize])?;
    Some(CornerMatchBet {
        home,
        tie: slots.get(CornerOutcome::Tie as usize),
        away,
    })
}

fn quoted_over_under(records: &[RawOddRecord], family: MarketFamily, line: Line) -> Option<QuotedOverUnder> {
    let slots = over_under_slots(records, family, line);
    let [over, under] = slots.prices.require(OVER_UNDER)?;
    Some(QuotedOverUnder {
        over: Quote {
            price: over,
            probability: slots.probabilities.get(OverUnderOutcome::Over as usize),
        },
        under: Quote {
            price: under,
            probability: slots.probabilities.get(OverUnderOutcome::Under as usize),
        },
    })
}

/// Team shots over/under, with the bookmaker's own probabilities.
pub fn team_shots(records: &[RawOddRecord], line: Line) -> Option<QuotedOverUnder> {
    quoted_over_under(records, MarketFamily::TeamShots, line)
}

/// Team shots on target over/under, with the bookmaker's own probabilities.
pub fn team_shots_on_target(records: &[RawOddRecord], line: Line) -> Option<QuotedOverUnder> {
    quoted_over_under(records, MarketFamily::TeamShotsOnTarget, line)
}

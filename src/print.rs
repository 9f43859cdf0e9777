use stanza::style::HAlign::Left;
use stanza::style::{HAlign, Header, MinWidth, Separator, Styles};
use stanza::table::{Col, Row, Table};

use crate::price::{fair_odds, format_percentage, ProbabilityTier};
use crate::snapshot::OddsSnapshot;
use crate::value::{MarketAppraisal, Verdict};

fn market_name(appraisal: &MarketAppraisal) -> String {
    match appraisal.line {
        None => appraisal.family.to_string(),
        Some(line) => format!("{} {line}", appraisal.family),
    }
}

fn verdict_marker(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Value => "✓",
        Verdict::Marginal => "~",
        Verdict::Fair => "",
    }
}

pub fn tabulate_appraisals(markets: &[MarketAppraisal]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(20)).with(Left)),
            Col::new(Styles::default().with(MinWidth(12)).with(Left)),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(5)).with(HAlign::Centred)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec![
                "Market".into(),
                "Outcome".into(),
                "Probability".into(),
                "Fair".into(),
                "Offered".into(),
                "Value %".into(),
                "".into(),
            ],
        ));
    for market in markets {
        for (index, appraisal) in market.appraisals.iter().enumerate() {
            let styles = if index + 1 == market.appraisals.len() {
                Styles::default().with(Separator(true))
            } else {
                Styles::default()
            };
            table.push_row(Row::new(
                styles,
                vec![
                    (if index == 0 { market_name(market) } else { String::new() }).into(),
                    appraisal.key.into(),
                    appraisal
                        .probability
                        .map_or_else(|| "-".to_owned(), format_percentage)
                        .into(),
                    format!("{:.2}", appraisal.fair).into(),
                    format!("{:.2}", appraisal.offered).into(),
                    format!("{:.1}", appraisal.ratio).into(),
                    verdict_marker(appraisal.verdict).into(),
                ],
            ));
        }
    }
    table
}

pub fn tabulate_snapshot(snapshot: &OddsSnapshot) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(20)).with(Left)),
            Col::new(Styles::default().with(MinWidth(5)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(40)).with(Left)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec!["Market".into(), "Line".into(), "Prices".into()],
        ));
    for (family, line, market) in snapshot.entries() {
        let prices = market
            .prices()
            .iter()
            .map(|(key, price)| format!("{key} {price:.2}"))
            .collect::<Vec<_>>()
            .join(", ");
        table.push_row(Row::new(
            Styles::default(),
            vec![
                family.to_string().into(),
                line.map(|line| line.to_string()).unwrap_or_default().into(),
                prices.into(),
            ],
        ));
    }
    table
}

/// Prediction-only outcomes (correct score, first scorer, team goals) with their fair odds.
pub fn tabulate_probabilities(heading: &str, outcomes: &[(String, f64)]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(6)).with(HAlign::Centred)),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(6)).with(Left)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec![heading.to_owned().into(), "Probability".into(), "Fair".into(), "Tier".into()],
        ));
    for (outcome, probability) in outcomes {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                outcome.clone().into(),
                format_percentage(*probability).into(),
                format!("{:.2}", fair_odds(*probability)).into(),
                ProbabilityTier::of(*probability).to_string().into(),
            ],
        ));
    }
    table
}

#[cfg(test)]
mod tests {
    use stanza::renderer::console::Console;
    use stanza::renderer::Renderer;

    use super::*;
    use crate::market::{MarketFamily, ThreeWay};
    use crate::value::{appraise, Thresholds};

    #[test]
    fn appraisal_table() {
        let market = ThreeWay {
            home: 2.10,
            draw: 3.40,
            away: 3.80,
        };
        let appraisals = appraise(
            &market,
            |key| match key {
                "home" => Some(55.0),
                "draw" => Some(25.0),
                _ => None,
            },
            &Thresholds::default(),
        );
        let markets = vec![MarketAppraisal {
            family: MarketFamily::FulltimeResult,
            line: None,
            appraisals,
        }];
        let table = tabulate_appraisals(&markets);
        assert_eq!(4, table.num_rows());
        let rendered = Console::default().render(&table).to_string();
        assert!(rendered.contains("fulltime_result"), "{rendered}");
        assert!(rendered.contains("55.0%"), "{rendered}");
        assert!(rendered.contains("115.4"), "{rendered}");
    }

    #[test]
    fn probabilities_table() {
        let scores = vec![("1-0".to_owned(), 11.2), ("0-0".to_owned(), 8.5)];
        let table = tabulate_probabilities("Score", &scores);
        assert_eq!(3, table.num_rows());
        let rendered = Console::default().render(&table).to_string();
        assert!(rendered.contains("8.93"), "{rendered}");
        assert!(rendered.contains("low"), "{rendered}");
        assert!(rendered.contains("Score"), "{rendered}");
    }
}

use std::collections::BTreeMap;
use std::env;
use std::error::Error;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, bail};
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use strum::IntoEnumIterator;
use tracing::{debug, info, warn};

use fairodds::feed::OddsFeed;
use fairodds::market::Line;
use fairodds::prediction::{PredictionFeed, Team};
use fairodds::print;
use fairodds::snapshot::{self, OddsSnapshot, SnapshotBuilder};
use fairodds::value::{appraise_snapshot, Thresholds};

const TEAM_GOAL_LINES: [Line; 4] = [
    Line::from_halves(1),
    Line::from_halves(3),
    Line::from_halves(5),
    Line::from_halves(7),
];

/// A bookmaker's odds file, given as `<bookmaker>=<path>`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BookmakerFile {
    bookmaker: String,
    path: PathBuf,
}

impl FromStr for BookmakerFile {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (bookmaker, path) = s
            .split_once('=')
            .ok_or(anyhow!("odds file should be in the form <bookmaker>=<path>"))?;
        let bookmaker = bookmaker.trim();
        if bookmaker.is_empty() {
            bail!("bookmaker name cannot be empty");
        }
        if path.is_empty() {
            bail!("odds file path cannot be empty");
        }
        Ok(Self {
            bookmaker: bookmaker.into(),
            path: path.into(),
        })
    }
}

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// bookmaker odds file, as <bookmaker>=<path>; may be repeated
    #[clap(short = 'o', long = "odds")]
    odds: Vec<BookmakerFile>,

    /// file to source the fixture predictions from
    #[clap(short = 'p', long)]
    predictions: Option<PathBuf>,

    /// value ratio above which an offer is a value bet
    #[clap(long, default_value_t = 100.0)]
    value: f64,

    /// value ratio above which an offer is a marginal bet
    #[clap(long, default_value_t = 98.0)]
    marginal: f64,

    /// dump the extracted snapshots as JSON instead of tabulating
    #[clap(long)]
    json: bool,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if self.odds.is_empty() {
            bail!("at least one -o flag must be specified");
        }
        let mut bookmakers = self.odds.iter().map(|file| &file.bookmaker).collect::<Vec<_>>();
        bookmakers.sort();
        if bookmakers.windows(2).any(|pair| pair[0] == pair[1]) {
            bail!("each bookmaker may only be specified once");
        }
        Ok(())
    }

    fn thresholds(&self) -> Thresholds {
        Thresholds {
            value: self.value,
            marginal: self.marginal,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    args.validate()?;
    debug!("args: {args:?}");

    let thresholds = args.thresholds();
    thresholds.validate()?;
    let builder = SnapshotBuilder::try_from(snapshot::Config::default())?;

    let mut snapshots = BTreeMap::new();
    for file in &args.odds {
        let feed = OddsFeed::read_json_file(&file.path)?;
        let snapshot = builder.build(feed.records());
        info!(
            "{}: {} records, {} markets",
            file.bookmaker,
            feed.len(),
            snapshot.entries().len()
        );
        if snapshot.is_empty() {
            warn!("{}: no market could be extracted", file.bookmaker);
        }
        snapshots.insert(file.bookmaker.clone(), snapshot);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshots)?);
        return Ok(());
    }

    let predictions = match &args.predictions {
        None => PredictionFeed::default(),
        Some(path) => {
            let predictions = PredictionFeed::read_json_file(path)?;
            info!("sourced {} predictions", predictions.len());
            predictions
        }
    };

    for (bookmaker, snapshot) in &snapshots {
        print_snapshot(bookmaker, snapshot, &predictions, &thresholds);
    }

    print_predictions(&predictions);

    Ok(())
}

fn print_predictions(predictions: &PredictionFeed) {
    let correct_score = predictions.correct_score();
    if !correct_score.is_empty() {
        info!(
            "Correct score:\n{}",
            Console::default().render(&print::tabulate_probabilities("Score", &correct_score))
        );
    }

    let first_scorer = predictions.team_to_score_first();
    if !first_scorer.is_empty() {
        info!(
            "Team to score first:\n{}",
            Console::default().render(&print::tabulate_probabilities("Team", &first_scorer))
        );
    }

    let team_goals = Team::iter()
        .flat_map(move |team| {
            TEAM_GOAL_LINES.into_iter().flat_map(move |line| {
                predictions
                    .team_goals(team, line)
                    .into_iter()
                    .map(move |(outcome, probability)| (format!("{team} {outcome} {line}"), probability))
            })
        })
        .collect::<Vec<_>>();
    if !team_goals.is_empty() {
        info!(
            "Team goals:\n{}",
            Console::default().render(&print::tabulate_probabilities("Outcome", &team_goals))
        );
    }
}

fn print_snapshot(
    bookmaker: &str,
    snapshot: &OddsSnapshot,
    predictions: &PredictionFeed,
    thresholds: &Thresholds,
) {
    info!(
        "{bookmaker} odds:\n{}",
        Console::default().render(&print::tabulate_snapshot(snapshot))
    );

    let appraisals = appraise_snapshot(snapshot, predictions, thresholds);
    if appraisals.is_empty() {
        debug!("{bookmaker}: nothing to appraise");
        return;
    }
    let value_bets = appraisals
        .iter()
        .map(|market| market.value_bets().count())
        .sum::<usize>();
    info!(
        "{bookmaker} appraisals ({value_bets} value bets):\n{}",
        Console::default().render(&print::tabulate_appraisals(&appraisals))
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bookmaker_file() {
        assert_eq!(
            BookmakerFile {
                bookmaker: "bet365".into(),
                path: "odds/bet365.json".into(),
            },
            BookmakerFile::from_str("bet365=odds/bet365.json").unwrap()
        );
        assert_eq!(
            PathBuf::from("a=b.json"),
            BookmakerFile::from_str("unibet=a=b.json").unwrap().path
        );
    }

    #[test]
    fn parse_bookmaker_file_errors() {
        assert_eq!(
            "odds file should be in the form <bookmaker>=<path>",
            BookmakerFile::from_str("bet365").unwrap_err().to_string()
        );
        assert_eq!(
            "bookmaker name cannot be empty",
            BookmakerFile::from_str(" =odds.json").unwrap_err().to_string()
        );
        assert_eq!(
            "odds file path cannot be empty",
            BookmakerFile::from_str("bet365=").unwrap_err().to_string()
        );
    }

    #[test]
    fn args_require_distinct_bookmakers() {
        let args = Args::parse_from(["fairodds", "-o", "a=1.json", "-o", "b=2.json"]);
        args.validate().unwrap();

        let args = Args::parse_from(["fairodds", "-o", "a=1.json", "-o", "a=2.json"]);
        assert!(args.validate().is_err());

        let args = Args::parse_from(["fairodds"]);
        assert!(args.validate().is_err());
    }
}

use criterion::{criterion_group, criterion_main, Criterion};

use fairodds::feed::RawOddRecord;
use fairodds::market::Line;
use fairodds::prediction::PredictionFeed;
use fairodds::snapshot::OddsSnapshot;
use fairodds::value::{appraise_snapshot, Thresholds};

fn sample_records() -> Vec<RawOddRecord> {
    let mut records = vec![];
    for (label, value) in [("Home", "2.10"), ("Draw", "3.40"), ("Away", "3.80")] {
        records.push(RawOddRecord::new(1).with_label(label).with_value(value));
        records.push(RawOddRecord::new(31).with_label(label).with_value(value));
    }
    for halves in [1, 3, 5, 7, 9] {
        let line = Line::from_halves(halves).to_string();
        for label in ["Over", "Under"] {
            records.push(
                RawOddRecord::new(80)
                    .with_label(label)
                    .with_total(line.clone())
                    .with_value("1.90"),
            );
        }
    }
    for halves in 8..=31u16 {
        let line = Line::from_halves(halves).to_string();
        for label in ["Over", "Under", "Exactly"] {
            records.push(
                RawOddRecord::new(67)
                    .with_label(label)
                    .with_total(line.clone())
                    .with_value("2.05"),
            );
        }
    }
    records
}

fn criterion_benchmark(c: &mut Criterion) {
    let records = sample_records();
    {
        let snapshot = OddsSnapshot::from_records(&records);
        assert!(!snapshot.is_empty());
        c.bench_function("cri_snapshot_build", |b| {
            b.iter(|| OddsSnapshot::from_records(&records));
        });
    }
    {
        let snapshot = OddsSnapshot::from_records(&records);
        let predictions: PredictionFeed = r#"{"predictions": [
            {"type": {"code": "fulltime-result-probability"}, "predictions": {"home": 55, "draw": 25, "away": 20}},
            {"type": {"code": "over-under-2_5-probability"}, "predictions": {"yes": 52, "no": 48}},
            {"type": {"code": "corners-over-under-10-probability"}, "predictions": {"yes": 45, "no": 48, "equal": 7}}
        ]}"#
        .parse()
        .unwrap();
        let thresholds = Thresholds::default();
        assert_eq!(3, appraise_snapshot(&snapshot, &predictions, &thresholds).len());
        c.bench_function("cri_snapshot_appraise", |b| {
            b.iter(|| appraise_snapshot(&snapshot, &predictions, &thresholds));
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
